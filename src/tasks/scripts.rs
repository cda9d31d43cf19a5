// src/tasks/scripts.rs

//! Script bundles: `main.min.js` and `plugins.min.js`.
//!
//! Each matched file is optionally passed through the configured filter
//! command, lowered to ES5 and minified with `swc`, and the results are
//! concatenated in glob-expansion order. Every chunk ends with `;` so a file
//! starting with `(` cannot be parsed as a call on the previous one. The
//! source map records every input file as a source and maps the first line of
//! each chunk back to the top of its file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parcel_sourcemap::{OriginalLocation, SourceMap};
use swc::config::{Config, IsModule, JsMinifyOptions, JscConfig, Options};
use swc::{BoolConfig, BoolOrDataConfig, Compiler, HandlerOpts, try_with_handler};
use swc_common::errors::ColorConfig;
use swc_common::sync::Lrc;
use swc_common::{FileName, GLOBALS, Globals};
use swc_ecma_ast::EsVersion;
use tracing::{debug, info, warn};

use crate::config::AssetGroup;
use crate::errors::{AssetError, Result};
use crate::exec::command::run_filter;
use crate::sources::{self, map_source_name, relative_str, write_output};
use crate::tasks::{BuildContext, TaskReport};

/// The two structurally identical script tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptBundle {
    Main,
    Plugins,
}

impl ScriptBundle {
    pub fn group(self) -> AssetGroup {
        match self {
            ScriptBundle::Main => AssetGroup::Scripts,
            ScriptBundle::Plugins => AssetGroup::Plugins,
        }
    }

    /// Fixed artifact name for the bundle.
    pub fn artifact(self) -> &'static str {
        match self {
            ScriptBundle::Main => "main.min.js",
            ScriptBundle::Plugins => "plugins.min.js",
        }
    }
}

/// Syntax level every bundle is lowered to.
pub const TARGET: EsVersion = EsVersion::Es5;

/// One input file after the filter stage.
#[derive(Debug, Clone)]
pub struct ScriptChunk {
    pub path: PathBuf,
    /// Name recorded in the source map.
    pub source_name: String,
    pub code: Vec<u8>,
}

/// Concatenated bundle plus source map JSON.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub code: String,
    pub map: String,
}

pub async fn build(ctx: Arc<BuildContext>, bundle: ScriptBundle) -> Result<TaskReport> {
    let entry = ctx.config.paths.get(bundle.group()).clone();
    let files = sources::expand(&ctx.root, &entry.src)?;

    if files.is_empty() {
        warn!(bundle = bundle.artifact(), pattern = %entry.src, "no scripts matched; nothing written");
        return Ok(TaskReport::default());
    }

    let mut chunks = Vec::with_capacity(files.len());
    for file in files {
        let source = tokio::fs::read(&file.path)
            .await
            .map_err(|e| AssetError::io(&file.path, e))?;

        let code = match &ctx.config.scripts.transpile_cmd {
            Some(cmd) => {
                debug!(file = %file.path.display(), cmd = %cmd, "running script filter");
                run_filter(cmd, &source, &ctx.root)
                    .await
                    .map_err(|e| AssetError::compile(&file.path, None, format!("{e:#}")))?
            }
            None => source,
        };

        let source_name = relative_str(&ctx.root, &file.path)
            .map(|rel| map_source_name(&entry.dest, &rel))
            .unwrap_or_else(|| file.path.display().to_string());

        chunks.push(ScriptChunk {
            path: file.path,
            source_name,
            code,
        });
    }

    let dest = entry.dest_in(&ctx.root);
    let artifact = bundle.artifact();

    tokio::task::spawn_blocking(move || write_bundle(&dest, artifact, &chunks))
        .await
        .map_err(|e| AssetError::transform(&ctx.root, format!("bundle worker stopped: {e}")))?
}

fn write_bundle(dest: &Path, artifact: &str, chunks: &[ScriptChunk]) -> Result<TaskReport> {
    let map_name = format!("{artifact}.map");
    let mut bundle = bundle_chunks(chunks)?;
    bundle
        .code
        .push_str(&format!("//# sourceMappingURL={map_name}\n"));

    let js_path = dest.join(artifact);
    let map_path = dest.join(&map_name);
    write_output(&js_path, bundle.code.as_bytes())?;
    write_output(&map_path, bundle.map.as_bytes())?;

    info!(
        output = %js_path.display(),
        files = chunks.len(),
        bytes = bundle.code.len(),
        "script bundle built"
    );
    Ok(TaskReport::with_outputs(vec![js_path, map_path]))
}

/// Compile each chunk and concatenate them in order, one statement
/// terminator and newline after each.
pub fn bundle_chunks(chunks: &[ScriptChunk]) -> Result<Bundle> {
    let mut source_map = SourceMap::new("/");
    let mut code = String::new();
    let mut line: u32 = 0;

    for chunk in chunks {
        let mut minified = compile(&chunk.path, &chunk.code)?;
        let trimmed_len = minified.trim_end().len();
        minified.truncate(trimmed_len);
        if !minified.is_empty() && !minified.ends_with(';') {
            minified.push(';');
        }

        let source = source_map.add_source(&chunk.source_name);
        source_map
            .set_source_content(source as usize, &String::from_utf8_lossy(&chunk.code))
            .map_err(|e| AssetError::transform(&chunk.path, format!("source map: {e:?}")))?;
        source_map.add_mapping(
            line,
            0,
            Some(OriginalLocation {
                original_line: 0,
                original_column: 0,
                source,
                name: None,
            }),
        );

        code.push_str(&minified);
        code.push('\n');
        line += minified.matches('\n').count() as u32 + 1;
    }

    let map = source_map
        .to_json(None)
        .map_err(|e| AssetError::transform(Path::new("."), format!("source map: {e:?}")))?;

    Ok(Bundle { code, map })
}

/// Lower one script to [`TARGET`] and minify it. Malformed input is a
/// compile error for that file.
pub fn compile(path: &Path, source: &[u8]) -> Result<String> {
    let source = String::from_utf8(source.to_vec())
        .map_err(|e| AssetError::transform(path, format!("script is not valid UTF-8: {e}")))?;

    let cm: Lrc<swc_common::SourceMap> = Default::default();
    let compiler = Compiler::new(cm.clone());
    let options = compile_options(path);
    let handler_opts = HandlerOpts {
        color: ColorConfig::Never,
        skip_filename: false,
    };

    let output = GLOBALS
        .set(&Globals::new(), || {
            try_with_handler(cm.clone(), handler_opts, |handler| {
                let fm = cm.new_source_file(Lrc::new(FileName::Real(path.to_path_buf())), source);
                compiler.process_js_file(fm, handler, &options)
            })
        })
        .map_err(|e| AssetError::compile(path, None, e.to_string()))?;

    Ok(output.code)
}

/// Classic-script ES5 output: globals keep their names, locals are mangled.
fn compile_options(path: &Path) -> Options {
    Options {
        config: Config {
            jsc: JscConfig {
                target: Some(TARGET),
                minify: Some(JsMinifyOptions {
                    compress: BoolOrDataConfig::from_bool(true),
                    mangle: BoolOrDataConfig::from_bool(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
            minify: BoolConfig::new(Some(true)),
            is_module: Some(IsModule::Bool(false)),
            ..Default::default()
        },
        filename: path.display().to_string(),
        ..Default::default()
    }
}
