// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of running tasks
//! itself. Production uses [`AssetExecutor`], which forwards scheduled tasks
//! to the background loop in [`super::executor_loop`]; tests provide their
//! own backend that records what was scheduled and answers with
//! `TaskCompleted` events directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::tasks::BuildContext;

use super::executor_loop::spawn_executor;

/// How scheduled tasks are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution.
    ///
    /// Completion is reported asynchronously through
    /// `RuntimeEvent::TaskCompleted`, never through the returned future.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Executor backend that runs the real asset tasks.
pub struct AssetExecutor {
    tx: mpsc::Sender<ScheduledTask>,
}

impl AssetExecutor {
    /// Spawns the background executor loop immediately.
    pub fn new(ctx: Arc<BuildContext>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        let tx = spawn_executor(ctx, runtime_tx);
        Self { tx }
    }
}

impl ExecutorBackend for AssetExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task).await?;
            }
            Ok(())
        })
    }
}
