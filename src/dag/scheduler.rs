// src/dag/scheduler.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::plan::Plan;
use crate::engine::TaskOutcome;
use crate::tasks::TaskKind;

/// Per-run state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// Task was triggered for this run but is waiting on dependencies.
    Pending,
    /// Task has been dispatched to the executor and is currently running.
    Running,
    DoneSuccess,
    DoneFailed,
    /// Never started because a dependency failed in this run.
    Blocked,
}

/// Public, read-only view of a task's per-run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// The task is not participating in the current run.
    NotInRun,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
    Blocked,
}

impl From<Option<RunState>> for TaskRunState {
    fn from(state: Option<RunState>) -> Self {
        match state {
            None => TaskRunState::NotInRun,
            Some(RunState::Pending) => TaskRunState::Pending,
            Some(RunState::Running) => TaskRunState::Running,
            Some(RunState::DoneSuccess) => TaskRunState::DoneSuccess,
            Some(RunState::DoneFailed) => TaskRunState::DoneFailed,
            Some(RunState::Blocked) => TaskRunState::Blocked,
        }
    }
}

#[derive(Debug, Clone)]
struct TaskInfo {
    task: TaskKind,
    deps: Vec<TaskKind>,

    /// Per-run state (None if not participating in the current run).
    run_state: Option<RunState>,

    /// Last run in which this task succeeded.
    ///
    /// A dependency that is not part of the current run is satisfied by an
    /// earlier success, so a watch-triggered `maincss` does not re-run
    /// `clean`.
    last_successful_run: Option<u64>,
    last_failed_run: Option<u64>,
}

/// A task the scheduler wants the executor to run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task: TaskKind,
    pub run_id: u64,
}

/// Scheduler holds the immutable DAG plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - deciding when a triggered task is ready to run (deps satisfied)
/// - marking tasks as succeeded or failed
/// - blocking dependents of a failed task
pub struct Scheduler {
    graph: DagGraph,
    tasks: BTreeMap<TaskKind, TaskInfo>,

    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    /// Construct a scheduler from a validated [`Plan`].
    pub fn from_plan(plan: &Plan) -> Self {
        let graph = DagGraph::from_plan(plan);

        let tasks = graph
            .tasks()
            .map(|task| {
                let info = TaskInfo {
                    task,
                    deps: graph.dependencies_of(task).to_vec(),
                    run_state: None,
                    last_successful_run: None,
                    last_failed_run: None,
                };
                (task, info)
            })
            .collect();

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    pub fn current_run_id(&self) -> Option<u64> {
        self.current_run_id
    }

    /// State of `task` in the current (or most recently finished) run.
    ///
    /// `None` if the task is not part of the plan.
    pub fn run_state_of(&self, task: TaskKind) -> Option<TaskRunState> {
        self.tasks.get(&task).map(|info| info.run_state.into())
    }

    /// Tasks blocked by a failed dependency in the current (or most recently
    /// finished) run.
    pub fn blocked_in_run(&self) -> Vec<TaskKind> {
        self.tasks
            .values()
            .filter(|info| info.run_state == Some(RunState::Blocked))
            .map(|info| info.task)
            .collect()
    }

    /// Start a new run, resetting per-run state but keeping historical success
    /// information.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for info in self.tasks.values_mut() {
            info.run_state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Include `task` and everything downstream of it in the current run.
    ///
    /// Returns the tasks that are now ready to be executed.
    pub fn handle_trigger(&mut self, task: TaskKind) -> Vec<ScheduledTask> {
        if self.current_run_id.is_none() {
            warn!(task = %task, "trigger with no active run; implicitly starting a new run");
            self.start_new_run();
        }

        if !self.graph.contains(task) {
            warn!(task = %task, "trigger for task outside the plan; ignoring");
            let ready = self.collect_new_ready_tasks();
            self.maybe_finish_run();
            return ready;
        }

        self.mark_task_and_dependents_pending(task);

        let ready = self.collect_new_ready_tasks();
        self.maybe_finish_run();
        ready
    }

    /// Handle completion of a task with a concrete outcome.
    ///
    /// - On success the task is `DoneSuccess` and dependents may become ready.
    /// - On failure the task is `DoneFailed` and every dependent in this run
    ///   is `Blocked`.
    pub fn handle_completion(&mut self, task: TaskKind, outcome: &TaskOutcome) -> Vec<ScheduledTask> {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return Vec::new();
        };

        let mut newly_ready = Vec::new();

        match self.tasks.get_mut(&task) {
            Some(info) => match outcome {
                TaskOutcome::Success => {
                    info.run_state = Some(RunState::DoneSuccess);
                    info.last_successful_run = Some(run_id);
                    debug!(task = %task, "task completed successfully");
                    newly_ready.extend(self.collect_new_ready_tasks());
                }
                TaskOutcome::Failed(_) => {
                    info.run_state = Some(RunState::DoneFailed);
                    info.last_failed_run = Some(run_id);
                    let blocked = self.block_dependents(task);
                    if !blocked.is_empty() {
                        warn!(task = %task, ?blocked, "task failed; dependents will not run");
                    }
                }
            },
            None => warn!(task = %task, "completion for task outside the plan; ignoring"),
        }

        self.maybe_finish_run();
        newly_ready
    }

    /// All tasks of the plan.
    pub fn task_names(&self) -> impl Iterator<Item = TaskKind> + '_ {
        self.graph.tasks()
    }

    fn mark_task_and_dependents_pending(&mut self, root: TaskKind) {
        let mut stack = vec![root];
        let mut visited = BTreeSet::new();

        while let Some(task) = stack.pop() {
            if !visited.insert(task) {
                continue;
            }

            if let Some(info) = self.tasks.get_mut(&task) {
                if info.run_state.is_none() {
                    info.run_state = Some(RunState::Pending);
                    debug!(task = %task, "marked Pending for this run");
                }
                stack.extend(self.graph.dependents_of(task).iter().copied());
            }
        }
    }

    /// Clear `current_run_id` once every task is terminal.
    fn maybe_finish_run(&mut self) {
        if self.current_run_id.is_none() {
            return;
        }

        let any_active = self.tasks.values().any(|info| {
            matches!(info.run_state, Some(RunState::Pending) | Some(RunState::Running))
        });

        if !any_active {
            info!(run_id = self.current_run_id, "scheduler: all tasks terminal; run finished");
            self.current_run_id = None;
        }
    }

    /// Collect `Pending` tasks whose dependencies are satisfied, mark them
    /// `Running`, and return them in [`TaskKind`] order.
    fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let run_id = self.current_run_id.unwrap_or(0);

        let candidates: Vec<TaskKind> = self
            .tasks
            .values()
            .filter(|info| info.run_state == Some(RunState::Pending) && self.deps_satisfied(info))
            .map(|info| info.task)
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for task in candidates {
            if let Some(info) = self.tasks.get_mut(&task) {
                let rerun = info.last_successful_run.is_some() || info.last_failed_run.is_some();
                debug!(task = %task, run_id, rerun, "dependencies satisfied; marking Running");
                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask { task, run_id });
            }
        }

        ready
    }

    /// A dependency is satisfied if it succeeded in this run, or if it is
    /// not part of this run and succeeded in an earlier one.
    fn deps_satisfied(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep| match self.tasks.get(dep) {
            Some(d) => match d.run_state {
                Some(RunState::DoneSuccess) => true,
                None => d.last_successful_run.is_some(),
                _ => false,
            },
            None => false,
        })
    }

    /// Mark every dependent of `failed` that is still waiting in this run as
    /// `Blocked`, transitively. Returns the newly blocked tasks.
    fn block_dependents(&mut self, failed: TaskKind) -> Vec<TaskKind> {
        let mut stack: Vec<TaskKind> = self.graph.dependents_of(failed).to_vec();
        let mut blocked = Vec::new();

        while let Some(task) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&task) {
                if info.run_state == Some(RunState::Pending) {
                    info.run_state = Some(RunState::Blocked);
                    blocked.push(task);
                    stack.extend(self.graph.dependents_of(task).iter().copied());
                }
            }
        }

        blocked.sort();
        blocked
    }
}
