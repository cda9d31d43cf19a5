// src/tasks/mod.rs

//! The build tasks.
//!
//! Each task reads the files named by one path table row, runs a fixed
//! transform chain and writes artifacts. Tasks share no state beyond the
//! read-only [`BuildContext`]; the only ordering constraint (clean before
//! everything that writes into the stylesheet directory) lives in the plan,
//! see [`crate::dag::Plan`].
//!
//! - [`clean`]: remove the stylesheet destination.
//! - [`styles`]: Sass -> prefixed, minified `main.min.css` + map.
//! - [`scripts`]: transpile, minify and concatenate scripts + map.
//! - [`html`]: whitespace-collapse HTML into the project root.
//! - [`images`]: format-preserving recompression.
//! - [`webp`]: raster images -> lossless WebP.
//! - [`favicons`]: icon set + manifest, subset copied to the root.

pub mod clean;
pub mod favicons;
pub mod html;
pub mod images;
pub mod scripts;
pub mod styles;
pub mod webp;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::config::{AssetGroup, SiteConfig};
use crate::errors::{AssetError, Result};

pub use favicons::FaviconStatus;
pub use scripts::ScriptBundle;

/// Every task the tool knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Clean,
    MainCss,
    Scripts,
    Plugins,
    Html,
    Images,
    WebpConv,
    Fav,
}

impl TaskKind {
    /// The transforms that make up the parallel build group.
    pub const TRANSFORMS: [TaskKind; 7] = [
        TaskKind::MainCss,
        TaskKind::Scripts,
        TaskKind::Images,
        TaskKind::WebpConv,
        TaskKind::Fav,
        TaskKind::Plugins,
        TaskKind::Html,
    ];

    /// Public task name, as used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Clean => "clean",
            TaskKind::MainCss => "maincss",
            TaskKind::Scripts => "scripts",
            TaskKind::Plugins => "plugins",
            TaskKind::Html => "html",
            TaskKind::Images => "images",
            TaskKind::WebpConv => "webpconv",
            TaskKind::Fav => "fav",
        }
    }

    /// The path table row this task reads from.
    ///
    /// `clean` operates on the styles destination.
    pub fn group(self) -> AssetGroup {
        match self {
            TaskKind::Clean | TaskKind::MainCss => AssetGroup::Styles,
            TaskKind::Scripts => AssetGroup::Scripts,
            TaskKind::Plugins => AssetGroup::Plugins,
            TaskKind::Html => AssetGroup::Html,
            TaskKind::Images => AssetGroup::Images,
            TaskKind::WebpConv => AssetGroup::Webp,
            TaskKind::Fav => AssetGroup::Favicons,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only state shared by all tasks of a process.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Project root every path in the table is resolved against.
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }
}

/// What a successful task produced.
#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    /// Files written, in write order.
    pub outputs: Vec<PathBuf>,
    /// Status of the favicon generator, only set by `fav`.
    pub favicons: Option<FaviconStatus>,
}

impl TaskReport {
    pub fn with_outputs(outputs: Vec<PathBuf>) -> Self {
        Self {
            outputs,
            favicons: None,
        }
    }
}

/// Run one task to completion.
///
/// CPU-bound transforms run on the blocking pool so parallel tasks do not
/// stall the runtime thread.
pub async fn run_task(task: TaskKind, ctx: Arc<BuildContext>) -> Result<TaskReport> {
    debug!(task = %task, "running task");
    match task {
        TaskKind::Clean => clean::run(&ctx).await,
        TaskKind::Scripts => scripts::build(ctx, ScriptBundle::Main).await,
        TaskKind::Plugins => scripts::build(ctx, ScriptBundle::Plugins).await,
        TaskKind::MainCss => blocking(ctx, styles::build).await,
        TaskKind::Html => blocking(ctx, html::build).await,
        TaskKind::Images => blocking(ctx, images::build).await,
        TaskKind::WebpConv => blocking(ctx, webp::build).await,
        TaskKind::Fav => blocking(ctx, favicons::build).await,
    }
}

async fn blocking<F>(ctx: Arc<BuildContext>, f: F) -> Result<TaskReport>
where
    F: FnOnce(&BuildContext) -> Result<TaskReport> + Send + 'static,
{
    let root = ctx.root.clone();
    tokio::task::spawn_blocking(move || f(ctx.as_ref()))
        .await
        .map_err(|e| AssetError::transform(root, format!("task worker stopped: {e}")))?
}
