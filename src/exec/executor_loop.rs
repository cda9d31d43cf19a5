// src/exec/executor_loop.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::tasks::{BuildContext, run_task};

/// Spawn the background executor loop.
///
/// Each scheduled task runs in its own Tokio task, so the transforms of one
/// run proceed in parallel. Every task ends in exactly one
/// `RuntimeEvent::TaskCompleted`.
pub fn spawn_executor(
    ctx: Arc<BuildContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        debug!("executor loop started");
        while let Some(scheduled) = rx.recv().await {
            let ctx = Arc::clone(&ctx);
            let runtime_tx = runtime_tx.clone();
            tokio::spawn(async move {
                execute(scheduled, ctx, runtime_tx).await;
            });
        }
        debug!("executor loop finished (channel closed)");
    });

    tx
}

async fn execute(
    scheduled: ScheduledTask,
    ctx: Arc<BuildContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let task = scheduled.task;
    info!(task = %task, run_id = scheduled.run_id, "starting task");

    let outcome = match run_task(task, ctx).await {
        Ok(report) => {
            info!(task = %task, outputs = report.outputs.len(), "task finished");
            TaskOutcome::Success
        }
        Err(err) => TaskOutcome::Failed(err.to_string()),
    };

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TaskCompleted { task, outcome })
        .await
    {
        warn!(task = %task, error = %err, "runtime stopped before task completion was reported");
    }
}
