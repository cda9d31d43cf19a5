// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Binding the styles, scripts and html source globs to their tasks.
//! - Wiring up a cross-platform filesystem watcher (`notify`) with a
//!   debounce window.
//! - Optionally hashing watched files so unchanged content does not
//!   trigger a re-run.
//!
//! It does **not** know about the task graph; it only turns filesystem
//! changes into task-level triggers.

pub mod hash;
pub mod patterns;
pub mod watcher;

pub use hash::{HashGate, compute_hash_for_paths};
pub use patterns::{WATCHED, WatchBinding, build_bindings, collect_matching_files, matching_tasks};
pub use watcher::{WatchOptions, WatcherHandle, spawn_watcher};
