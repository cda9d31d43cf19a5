// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the task scheduler
//! - the trigger queue (what happens when triggers arrive while a run is active)
//! - the runtime event loop that reacts to:
//!   - file-watch triggers
//!   - task completion events
//!   - shutdown signals

pub mod queue;
pub mod runtime;

pub use queue::{TriggerQueue, TriggerWhileRunningBehaviour};
pub use runtime::{BuildSummary, Runtime, RuntimeEvent, TaskOutcome, TriggerReason};
