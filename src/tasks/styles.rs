// src/tasks/styles.rs

//! Stylesheet build: Sass entry -> `main.min.css` + `main.min.css.map`.
//!
//! | Stage | Crate |
//! |---|---|
//! | Sass -> CSS | `grass` |
//! | Vendor prefixes + minify | `lightningcss` with a fixed browser target set |
//! | Source map | `lightningcss` printer into a `parcel_sourcemap::SourceMap` |
//!
//! Prefixes are emitted inline by the printer; there is no cascade
//! (visual alignment) step, matching a `cascade: false` autoprefixer run.

use std::io;
use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use tracing::info;

use crate::errors::{AssetError, Result};
use crate::sources::{map_source_name, relative_str, write_output};
use crate::tasks::{BuildContext, TaskReport};

/// Fixed artifact name.
pub const ARTIFACT: &str = "main.min.css";
pub const SOURCE_MAP: &str = "main.min.css.map";

/// Minified stylesheet plus its source map JSON.
#[derive(Debug, Clone)]
pub struct CompiledStyles {
    pub code: String,
    pub map: String,
}

pub fn build(ctx: &BuildContext) -> Result<TaskReport> {
    let entry_cfg = &ctx.config.paths.styles;
    let entry_rel = entry_cfg.entry.as_ref().ok_or_else(|| {
        AssetError::Config("[paths.styles].entry is not set".to_string())
    })?;
    let entry = ctx.root.join(entry_rel);

    if !entry.is_file() {
        return Err(AssetError::io(
            &entry,
            io::Error::new(io::ErrorKind::NotFound, "stylesheet entry file not found"),
        ));
    }

    let source_name = relative_str(&ctx.root, &entry)
        .map(|rel| map_source_name(&entry_cfg.dest, &rel))
        .unwrap_or_else(|| entry.display().to_string());

    let compiled = compile(&entry, &source_name)?;

    let dest = entry_cfg.dest_in(&ctx.root);
    let css_path = dest.join(ARTIFACT);
    let map_path = dest.join(SOURCE_MAP);

    let mut code = compiled.code;
    code.push_str(&format!("\n/*# sourceMappingURL={SOURCE_MAP} */\n"));

    write_output(&css_path, code.as_bytes())?;
    write_output(&map_path, compiled.map.as_bytes())?;

    info!(output = %css_path.display(), bytes = code.len(), "stylesheet built");
    Ok(TaskReport::with_outputs(vec![css_path, map_path]))
}

/// Compile the Sass entry file and run it through prefixing + minification.
///
/// `source_name` is the name recorded for the input inside the source map.
pub fn compile(entry: &Path, source_name: &str) -> Result<CompiledStyles> {
    let css = compile_sass(entry)?;
    prefix_and_minify(entry, source_name, &css)
}

fn compile_sass(entry: &Path) -> Result<String> {
    let options = grass::Options::default().style(grass::OutputStyle::Expanded);
    grass::from_path(entry, &options).map_err(|e| AssetError::compile(entry, None, e.to_string()))
}

fn prefix_and_minify(entry: &Path, source_name: &str, css: &str) -> Result<CompiledStyles> {
    let targets = Targets::from(browser_targets());

    let mut sheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: source_name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| {
        let line = e.loc.as_ref().map(|l| l.line + 1);
        AssetError::compile(entry, line, e.kind.to_string())
    })?;

    sheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| AssetError::compile(entry, None, e.to_string()))?;

    let mut source_map = SourceMap::new("/");
    let source_index = source_map.add_source(source_name);
    source_map
        .set_source_content(source_index as usize, css)
        .map_err(|e| AssetError::transform(entry, format!("source map: {e:?}")))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: Some(&mut source_map),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| AssetError::compile(entry, None, e.to_string()))?;

    let map = source_map
        .to_json(None)
        .map_err(|e| AssetError::transform(entry, format!("source map: {e:?}")))?;

    Ok(CompiledStyles {
        code: printed.code,
        map,
    })
}

/// Browser versions prefixes are generated for, encoded as
/// `major << 16 | minor << 8`.
fn browser_targets() -> Browsers {
    const fn v(major: u32) -> Option<u32> {
        Some(major << 16)
    }

    Browsers {
        android: v(81),
        chrome: v(80),
        edge: v(80),
        firefox: v(78),
        ios_saf: v(13),
        opera: v(67),
        safari: v(13),
        samsung: v(12),
        ..Browsers::default()
    }
}
