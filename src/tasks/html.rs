// src/tasks/html.rs

//! HTML whitespace collapse.
//!
//! Unlike every other task, the output is written to the path table's
//! `html.dest`, which defaults to the project root itself.

use std::path::Path;

use minify_html::Cfg;
use tracing::{debug, info};

use crate::errors::{AssetError, Result};
use crate::sources::{expand, mirror_path, read_source, write_output};
use crate::tasks::{BuildContext, TaskReport};

pub fn build(ctx: &BuildContext) -> Result<TaskReport> {
    let entry = &ctx.config.paths.html;
    let files = expand(&ctx.root, &entry.src)?;
    let dest = entry.dest_in(&ctx.root);
    let cfg = minify_config();

    let mut outputs = Vec::with_capacity(files.len());
    for file in &files {
        let bytes = read_source(&file.path)?;
        let out = if is_html(&file.path) {
            minify_document(&file.path, &bytes, &cfg)?
        } else {
            debug!(file = %file.path.display(), "not an HTML document; copying unchanged");
            bytes
        };

        let target = mirror_path(&dest, file);
        write_output(&target, &out)?;
        outputs.push(target);
    }

    info!(files = outputs.len(), dest = %dest.display(), "html minified");
    Ok(TaskReport::with_outputs(outputs))
}

/// Collapse whitespace only: comments, optional tags, doctype and embedded
/// CSS/JS are preserved.
pub fn minify_config() -> Cfg {
    let mut cfg = Cfg::new();
    cfg.keep_comments = true;
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_spaces_between_attributes = true;
    cfg.do_not_minify_doctype = true;
    cfg.ensure_spec_compliant_unquoted_attribute_values = true;
    cfg.minify_css = false;
    cfg.minify_js = false;
    cfg
}

pub fn minify_document(path: &Path, bytes: &[u8], cfg: &Cfg) -> Result<Vec<u8>> {
    std::str::from_utf8(bytes)
        .map_err(|e| AssetError::transform(path, format!("HTML is not valid UTF-8: {e}")))?;
    Ok(minify_html::minify(bytes, cfg))
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}
