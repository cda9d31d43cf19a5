// src/cli.rs

//! CLI argument parsing using `clap`.

use std::fmt;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetflow",
    version,
    about = "Build static-site assets (styles, scripts, images, favicons, HTML) and watch for changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run. `default` and `build` run clean, then every transform in
    /// parallel, then watch.
    #[arg(value_enum, default_value_t = TaskArg::Default)]
    pub task: TaskArg,

    /// Project root; all source globs and destinations are relative to it.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: String,

    /// Optional TOML file overriding the built-in path table and settings.
    ///
    /// Nothing is read unless this flag is given.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Stop after the parallel build group instead of entering watch mode.
    #[arg(long)]
    pub no_watch: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the path table, task plan and watch bindings without running.
    #[arg(long)]
    pub dry_run: bool,
}

/// Task names as exposed on the command line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TaskArg {
    Default,
    Build,
    Clean,
    Maincss,
    Scripts,
    Plugins,
    Html,
    Images,
    Webpconv,
    Fav,
    Watch,
}

impl fmt::Display for TaskArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(v) => f.write_str(v.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
