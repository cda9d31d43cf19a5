// src/dag/mod.rs

//! Task graph and scheduling.
//!
//! - [`plan`] describes which tasks an invocation runs and in what order.
//! - [`graph`] is the adjacency view of a plan.
//! - [`scheduler`] contains the per-run state machine that decides
//!   which tasks are ready to run, and when dependents can be scheduled.

pub mod graph;
pub mod plan;
pub mod scheduler;

pub use graph::DagGraph;
pub use plan::{Plan, PlanStep};
pub use scheduler::{ScheduledTask, Scheduler, TaskRunState};
