// src/engine/runtime.rs

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::scheduler::{ScheduledTask, Scheduler, TaskRunState};
use crate::engine::queue::TriggerQueue;
use crate::exec::ExecutorBackend;
use crate::tasks::TaskKind;

/// Reason why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Named on the command line or seeded as a plan root.
    Manual,
    FileWatch,
}

/// Result of one task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// The task's error, rendered for the log and the final report.
    Failed(String),
}

/// Events sent into the runtime from the watcher, the executor, or the
/// Ctrl-C handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskKind,
        reason: TriggerReason,
    },
    TaskCompleted {
        task: TaskKind,
        outcome: TaskOutcome,
    },
    ShutdownRequested,
}

/// What happened during the initial run of an invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub succeeded: Vec<TaskKind>,
    pub failed: Vec<(TaskKind, String)>,
    /// Tasks that never started because a dependency failed.
    pub skipped: Vec<TaskKind>,
    /// Ctrl-C arrived before the run finished.
    pub interrupted: bool,
}

impl BuildSummary {
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// The orchestration runtime.
///
/// Responsibilities:
/// - Consume `RuntimeEvent`s from the watcher, executor and Ctrl-C handler.
/// - Apply queue semantics to triggers for tasks already in the active run.
/// - Drive the scheduler.
/// - Hand ready tasks to the executor backend.
pub struct Runtime<E: ExecutorBackend> {
    scheduler: Scheduler,
    queue: TriggerQueue,

    /// Unified event stream from all producers.
    events_rx: mpsc::Receiver<RuntimeEvent>,

    executor: E,
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        scheduler: Scheduler,
        queue: TriggerQueue,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
    ) -> Self {
        Self {
            scheduler,
            queue,
            events_rx,
            executor,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run `roots` and everything downstream of them once, returning when
    /// every task of the run is terminal.
    ///
    /// Failures do not stop tasks that are already running; the summary
    /// lists every failure once the run is idle.
    pub async fn run_build(&mut self, roots: &[TaskKind]) -> Result<BuildSummary> {
        let mut summary = BuildSummary::default();
        if roots.is_empty() {
            return Ok(summary);
        }

        info!(roots = ?roots, "starting build");
        self.start_new_run(roots.to_vec()).await?;

        while !self.scheduler.is_idle() {
            let Some(event) = self.events_rx.recv().await else {
                bail!("runtime event channel closed during build");
            };
            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    self.handle_task_trigger(task, reason).await?;
                }
                RuntimeEvent::TaskCompleted { task, outcome } => {
                    match &outcome {
                        TaskOutcome::Success => summary.succeeded.push(task),
                        TaskOutcome::Failed(msg) => summary.failed.push((task, msg.clone())),
                    }
                    self.handle_task_completion(task, outcome).await?;
                }
                RuntimeEvent::ShutdownRequested => {
                    warn!("shutdown requested during build");
                    summary.interrupted = true;
                    break;
                }
            }
        }

        summary.skipped = self
            .scheduler
            .task_names()
            .filter(|&t| self.scheduler.run_state_of(t) == Some(TaskRunState::Blocked))
            .collect();

        info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            "build finished"
        );
        Ok(summary)
    }

    /// Watch loop: react to triggers until shutdown.
    ///
    /// Failures of watch-triggered runs are logged and the loop continues.
    pub async fn watch(mut self) -> Result<()> {
        info!("watching for changes (Ctrl-C to stop)");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    self.handle_task_trigger(task, reason).await?;
                }
                RuntimeEvent::TaskCompleted { task, outcome } => {
                    self.handle_task_completion(task, outcome).await?;
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping watch");
                    break;
                }
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// - Idle scheduler: start a new run from this trigger plus anything
    ///   queued.
    /// - Task not in the active run: merge it into that run immediately.
    /// - Task already in the active run: defer to the trigger queue.
    async fn handle_task_trigger(&mut self, task: TaskKind, reason: TriggerReason) -> Result<()> {
        info!(task = %task, ?reason, "task triggered");

        if self.scheduler.is_idle() {
            let mut triggers = self.queue.drain_pending();
            if !triggers.contains(&task) {
                triggers.push(task);
            }
            return self.start_new_run(triggers).await;
        }

        match self.scheduler.run_state_of(task) {
            None => warn!(task = %task, "trigger for task outside the plan; ignoring"),
            Some(TaskRunState::NotInRun) => {
                let ready = self.scheduler.handle_trigger(task);
                self.dispatch(ready).await?;
            }
            Some(_) => {
                self.queue.record_trigger(task);
                debug!(task = %task, "task already in current run; trigger queued");
            }
        }

        Ok(())
    }

    async fn handle_task_completion(&mut self, task: TaskKind, outcome: TaskOutcome) -> Result<()> {
        match &outcome {
            TaskOutcome::Success => info!(task = %task, "task completed successfully"),
            TaskOutcome::Failed(msg) => error!(task = %task, error = %msg, "task failed"),
        }

        let ready = self.scheduler.handle_completion(task, &outcome);
        self.dispatch(ready).await?;
        self.maybe_start_queued_run().await
    }

    /// Start a brand-new run from the given root triggers.
    async fn start_new_run(&mut self, triggers: Vec<TaskKind>) -> Result<()> {
        if triggers.is_empty() {
            return Ok(());
        }

        info!(triggers = ?triggers, "starting new run");
        self.scheduler.start_new_run();

        for task in triggers {
            let ready = self.scheduler.handle_trigger(task);
            self.dispatch(ready).await?;
        }
        Ok(())
    }

    async fn maybe_start_queued_run(&mut self) -> Result<()> {
        if !self.scheduler.is_idle() {
            return Ok(());
        }

        let triggers = self.queue.drain_pending();
        self.start_new_run(triggers).await
    }

    async fn dispatch(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        for task in &tasks {
            debug!(task = %task.task, run_id = task.run_id, "dispatching task to executor");
        }
        self.executor.spawn_ready_tasks(tasks).await
    }
}
