// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] is the seam between the runtime and whatever runs tasks.
//! - [`executor_loop`] runs scheduled asset tasks and reports completions
//!   back to the runtime.
//! - [`command`] runs external filter commands (the optional script
//!   pre-filter).

pub mod backend;
pub mod command;
pub mod executor_loop;

pub use backend::{AssetExecutor, ExecutorBackend};
pub use executor_loop::spawn_executor;
