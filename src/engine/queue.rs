// src/engine/queue.rs

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::tasks::TaskKind;

/// Behaviour when a watch trigger arrives for a task that is already part
/// of the active run.
///
/// - `Queue`: remember the trigger and start a new run when the current one
///   finishes (default behaviour).
/// - `Cancel`: drop any previously queued batches and only keep the latest
///   trigger. The running tasks themselves are never interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerWhileRunningBehaviour {
    #[default]
    Queue,
    Cancel,
}

impl fmt::Display for TriggerWhileRunningBehaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerWhileRunningBehaviour::Queue => f.write_str("queue"),
            TriggerWhileRunningBehaviour::Cancel => f.write_str("cancel"),
        }
    }
}

/// Triggers that arrive while a run is already executing.
///
/// - Each queued entry is a *batch* of tasks to trigger together in one
///   future run.
/// - `max_runs` bounds how many batches are kept (default 1: at most one
///   future run is queued).
/// - When the runtime goes idle it calls [`TriggerQueue::drain_pending`],
///   which merges every queued batch into one trigger set.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    max_runs: usize,
    runs: VecDeque<BTreeSet<TaskKind>>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, max_runs: usize) -> Self {
        Self {
            behaviour,
            max_runs: max_runs.max(1),
            runs: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn behaviour(&self) -> TriggerWhileRunningBehaviour {
        self.behaviour
    }

    /// Record that `task` was triggered while a run is in progress.
    ///
    /// - `Queue`: merge into the last batch (or open the first one); drop
    ///   the oldest batches beyond `max_runs`.
    /// - `Cancel`: replace everything queued with a batch holding only
    ///   this task.
    pub fn record_trigger(&mut self, task: TaskKind) {
        match self.behaviour {
            TriggerWhileRunningBehaviour::Queue => {
                if let Some(last_batch) = self.runs.back_mut() {
                    let inserted = last_batch.insert(task);
                    debug!(task = %task, inserted, "merged trigger into last queued batch");
                } else {
                    self.runs.push_back(BTreeSet::from([task]));
                    debug!(task = %task, "created first queued batch");
                }

                if self.runs.len() > self.max_runs {
                    warn!(
                        current_batches = self.runs.len(),
                        max_runs = self.max_runs,
                        "exceeded queue_length; dropping oldest queued batches"
                    );
                    while self.runs.len() > self.max_runs {
                        self.runs.pop_front();
                    }
                }
            }
            TriggerWhileRunningBehaviour::Cancel => {
                debug!(task = %task, "resetting queued batches to this task only");
                self.runs.clear();
                self.runs.push_back(BTreeSet::from([task]));
            }
        }
    }

    /// Drain every queued batch into one sorted trigger list.
    pub fn drain_pending(&mut self) -> Vec<TaskKind> {
        let mut merged = BTreeSet::new();
        while let Some(batch) = self.runs.pop_front() {
            merged.extend(batch);
        }

        let tasks: Vec<TaskKind> = merged.into_iter().collect();
        debug!(drained = tasks.len(), "drained queued triggers into new run");
        tasks
    }
}
