// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::sources::relative_str;
use crate::tasks::TaskKind;
use crate::watch::hash::{HashGate, compute_hash_for_paths};
use crate::watch::patterns::{WatchBinding, collect_matching_files, matching_tasks};

/// Tuning for the watch loop, taken from `[watch]`.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Window in which events are coalesced into one trigger per task.
    pub debounce: Duration,
    /// Only trigger when the task's files actually changed content.
    pub use_hash: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            use_hash: false,
        }
    }
}

/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send `RuntimeEvent::TaskTriggered` for the
/// tasks whose bindings match changed paths.
///
/// Events are collected for `options.debounce` after the first match, then
/// each affected task is triggered once, in task order.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    options: WatchOptions,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let bindings = Arc::new(bindings);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // Receiver gone means the watch loop ended; nothing to do.
                let _ = event_tx.send(event);
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), bindings = bindings.len(), "file watcher started");

    let mut gate = HashGate::new();
    if options.use_hash {
        for binding in bindings.iter() {
            if let Some(hash) = task_hash(&root, &bindings, binding.task()) {
                gate.seed(binding.task(), hash);
            }
        }
    }

    tokio::spawn(async move {
        let mut pending: BTreeSet<TaskKind> = BTreeSet::new();
        let mut deadline: Option<Instant> = None;

        loop {
            let next = match deadline {
                Some(at) => match timeout_at(at, event_rx.recv()).await {
                    Ok(next) => next,
                    Err(_elapsed) => {
                        deadline = None;
                        let tasks = std::mem::take(&mut pending);
                        if !flush(&root, &bindings, &mut gate, options, tasks, &runtime_tx).await {
                            return;
                        }
                        continue;
                    }
                },
                None => event_rx.recv().await,
            };

            let Some(event) = next else {
                break;
            };

            if event.kind.is_access() {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                let Some(rel) = relative_str(&root, path) else {
                    debug!(path = %path.display(), "event outside the project root");
                    continue;
                };
                for task in matching_tasks(&bindings, &rel) {
                    debug!(task = %task, path = %rel, "watch match");
                    pending.insert(task);
                }
            }

            if !pending.is_empty() && deadline.is_none() {
                deadline = Some(Instant::now() + options.debounce);
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Send one trigger per task. Returns `false` once the runtime is gone.
async fn flush(
    root: &std::path::Path,
    bindings: &[WatchBinding],
    gate: &mut HashGate,
    options: WatchOptions,
    tasks: BTreeSet<TaskKind>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    for task in tasks {
        if options.use_hash {
            if let Some(hash) = task_hash(root, bindings, task) {
                if !gate.changed(task, hash) {
                    debug!(task = %task, "content unchanged; not triggering");
                    continue;
                }
            }
        }

        let event = RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::FileWatch,
        };
        if runtime_tx.send(event).await.is_err() {
            warn!("runtime channel closed; stopping file watcher loop");
            return false;
        }
    }
    true
}

/// Aggregate hash of a task's watched files. `None` (treated as "changed")
/// when the files cannot be listed or read.
fn task_hash(root: &std::path::Path, bindings: &[WatchBinding], task: TaskKind) -> Option<String> {
    let files = match collect_matching_files(root, bindings, task) {
        Ok(files) => files,
        Err(err) => {
            warn!(task = %task, error = %err, "could not list watched files for hashing");
            return None;
        }
    };
    match compute_hash_for_paths(files) {
        Ok(hash) => Some(hash),
        Err(err) => {
            warn!(task = %task, error = %err, "could not hash watched files");
            None
        }
    }
}
