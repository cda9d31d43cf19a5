// src/tasks/clean.rs

use std::io::ErrorKind;

use tracing::{debug, info};

use crate::errors::{AssetError, Result};
use crate::tasks::{BuildContext, TaskReport};

/// Remove the stylesheet destination directory and everything below it.
///
/// An already-absent directory counts as success, so running clean twice in
/// a row is fine.
pub async fn run(ctx: &BuildContext) -> Result<TaskReport> {
    let dir = ctx.config.paths.styles.dest_in(&ctx.root);

    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => info!(dir = %dir.display(), "removed stylesheet output"),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "stylesheet output already absent");
        }
        Err(e) => return Err(AssetError::io(&dir, e)),
    }

    Ok(TaskReport::default())
}
