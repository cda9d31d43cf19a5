// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sources;
pub mod tasks;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, TaskArg};
use crate::config::SiteConfig;
use crate::dag::{Plan, Scheduler};
use crate::engine::{BuildSummary, Runtime, RuntimeEvent, TriggerQueue};
use crate::exec::AssetExecutor;
use crate::tasks::{BuildContext, TaskKind};
use crate::watch::{WatchBinding, WatchOptions, build_bindings, spawn_watcher};

/// What one command-line task expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub plan: Plan,
    /// Tasks triggered at startup; everything downstream runs with them.
    pub roots: Vec<TaskKind>,
    /// Enter the watch loop once the initial run succeeded.
    pub watch: bool,
}

impl Invocation {
    pub fn for_task(task: TaskArg, no_watch: bool) -> Self {
        let single = |kind: TaskKind| Self {
            plan: Plan::single(kind),
            roots: vec![kind],
            watch: false,
        };

        match task {
            TaskArg::Default | TaskArg::Build => Self {
                plan: Plan::build(),
                roots: vec![TaskKind::Clean],
                watch: !no_watch,
            },
            TaskArg::Watch => Self {
                plan: Plan::watch_targets(),
                roots: Vec::new(),
                watch: true,
            },
            TaskArg::Clean => single(TaskKind::Clean),
            TaskArg::Maincss => single(TaskKind::MainCss),
            TaskArg::Scripts => single(TaskKind::Scripts),
            TaskArg::Plugins => single(TaskKind::Plugins),
            TaskArg::Html => single(TaskKind::Html),
            TaskArg::Images => single(TaskKind::Images),
            TaskArg::Webpconv => single(TaskKind::WebpConv),
            TaskArg::Fav => single(TaskKind::Fav),
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - scheduler / queue / runtime
/// - executor
/// - the file watcher (build and watch invocations)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config = config::resolve(args.config.as_deref().map(Path::new))?;

    let root = PathBuf::from(&args.root);
    let root = root
        .canonicalize()
        .with_context(|| format!("resolving project root {:?}", root))?;

    let invocation = Invocation::for_task(args.task, args.no_watch);
    invocation.plan.validate()?;

    let bindings = if invocation.watch {
        build_bindings(&config.paths)?
    } else {
        Vec::new()
    };

    if args.dry_run {
        print_dry_run(&root, &config, &invocation, &bindings)?;
        return Ok(());
    }

    info!(task = %args.task, root = %root.display(), "assetflow starting");

    let watch_options = WatchOptions {
        debounce: Duration::from_millis(config.watch.debounce_ms),
        use_hash: config.watch.use_hash,
    };
    let queue = TriggerQueue::new(
        config.watch.triggered_while_running_behaviour,
        config.watch.queue_length,
    );
    let ctx = Arc::new(BuildContext::new(root.clone(), config));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = AssetExecutor::new(Arc::clone(&ctx), rt_tx.clone());
    let scheduler = Scheduler::from_plan(&invocation.plan);

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let mut runtime = Runtime::new(scheduler, queue, rt_rx, executor);

    let summary = runtime.run_build(&invocation.roots).await?;
    ensure_build_succeeded(&summary)?;

    if !invocation.watch {
        return Ok(());
    }

    let _watcher_handle = spawn_watcher(&root, bindings, rt_tx.clone(), watch_options)?;
    runtime.watch().await
}

/// Turn a failed or interrupted initial run into an error listing every
/// failure.
pub fn ensure_build_succeeded(summary: &BuildSummary) -> Result<()> {
    if summary.interrupted {
        bail!("build interrupted");
    }
    if summary.is_success() {
        return Ok(());
    }

    let mut lines: Vec<String> = summary
        .failed
        .iter()
        .map(|(task, msg)| format!("  {task}: {msg}"))
        .collect();
    if !summary.skipped.is_empty() {
        let skipped: Vec<&str> = summary.skipped.iter().map(|t| t.name()).collect();
        lines.push(format!("  skipped after failure: {}", skipped.join(", ")));
    }

    bail!(
        "{} task(s) failed:\n{}",
        summary.failed.len(),
        lines.join("\n")
    )
}

/// Print the path table, the plan and the watch bindings.
fn print_dry_run(
    root: &Path,
    config: &SiteConfig,
    invocation: &Invocation,
    bindings: &[WatchBinding],
) -> Result<()> {
    println!("assetflow dry-run");
    println!("  root = {}", root.display());
    println!();

    println!("paths:");
    for (group, entry) in config.paths.iter() {
        print!("  {group:<9} {} -> {}", entry.src, entry.dest.display());
        if let Some(file) = &entry.entry {
            print!(" (entry {})", file.display());
        }
        println!();
    }
    println!();

    println!("plan:");
    for task in invocation.plan.topo_order()? {
        let after: Vec<&str> = invocation
            .plan
            .steps()
            .iter()
            .find(|s| s.task == task)
            .map(|s| s.after.iter().map(|t| t.name()).collect())
            .unwrap_or_default();

        let root_marker = if invocation.roots.contains(&task) { " *" } else { "" };
        if after.is_empty() {
            println!("  - {task}{root_marker}");
        } else {
            println!("  - {task}{root_marker} (after {})", after.join(", "));
        }
    }
    println!();

    if invocation.watch {
        println!("watch:");
        for binding in bindings {
            println!("  {} -> {}", binding.pattern(), binding.task());
        }
        println!(
            "  debounce_ms = {}, use_hash = {}, triggered_while_running_behaviour = {}, queue_length = {}",
            config.watch.debounce_ms,
            config.watch.use_hash,
            config.watch.triggered_while_running_behaviour,
            config.watch.queue_length
        );
    } else {
        println!("watch: off");
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
