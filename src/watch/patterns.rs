// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::GlobMatcher;

use crate::config::{AssetGroup, PathTable};
use crate::errors::Result;
use crate::sources::{compile_matcher, expand};
use crate::tasks::TaskKind;

/// Source groups the watcher observes and the task each one re-runs.
pub const WATCHED: [(AssetGroup, TaskKind); 3] = [
    (AssetGroup::Styles, TaskKind::MainCss),
    (AssetGroup::Scripts, TaskKind::Scripts),
    (AssetGroup::Html, TaskKind::Html),
];

/// A source glob bound to the task it triggers.
#[derive(Clone)]
pub struct WatchBinding {
    group: AssetGroup,
    pattern: String,
    task: TaskKind,
    matcher: GlobMatcher,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("group", &self.group)
            .field("pattern", &self.pattern)
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(group: AssetGroup, pattern: impl Into<String>, task: TaskKind) -> Result<Self> {
        let pattern = pattern.into();
        let matcher = compile_matcher(&pattern)?;
        Ok(Self {
            group,
            pattern,
            task,
            matcher,
        })
    }

    pub fn group(&self) -> AssetGroup {
        self.group
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// `rel_path` is relative to the project root with forward slashes,
    /// e.g. `"src/sass/_vars.scss"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// Build the watch bindings for a path table.
pub fn build_bindings(paths: &PathTable) -> Result<Vec<WatchBinding>> {
    WATCHED
        .iter()
        .map(|&(group, task)| WatchBinding::new(group, paths.get(group).src.clone(), task))
        .collect()
}

/// Tasks bound to a changed path, in binding order, without duplicates.
pub fn matching_tasks(bindings: &[WatchBinding], rel_path: &str) -> Vec<TaskKind> {
    let mut tasks = Vec::new();
    for binding in bindings {
        if binding.matches(rel_path) && !tasks.contains(&binding.task) {
            tasks.push(binding.task);
        }
    }
    tasks
}

/// Every file currently matched by the bindings of `task`.
pub fn collect_matching_files(
    root: &Path,
    bindings: &[WatchBinding],
    task: TaskKind,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for binding in bindings.iter().filter(|b| b.task == task) {
        files.extend(expand(root, &binding.pattern)?.into_iter().map(|f| f.path));
    }
    Ok(files)
}
