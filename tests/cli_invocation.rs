mod common;

use clap::Parser;

use assetflow::cli::{CliArgs, TaskArg};
use assetflow::tasks::TaskKind;
use assetflow::{Invocation, run};

use common::{TestResult, write};

#[test]
fn default_task_builds_then_watches() -> TestResult {
    let args = CliArgs::try_parse_from(["assetflow"])?;
    assert_eq!(args.task, TaskArg::Default);
    assert_eq!(args.root, ".");

    let inv = Invocation::for_task(args.task, args.no_watch);
    assert_eq!(inv.roots, vec![TaskKind::Clean]);
    assert!(inv.watch);
    assert_eq!(inv.plan.steps().len(), 8);
    Ok(())
}

#[test]
fn no_watch_stops_after_the_build() -> TestResult {
    let args = CliArgs::try_parse_from(["assetflow", "build", "--no-watch"])?;
    let inv = Invocation::for_task(args.task, args.no_watch);
    assert!(!inv.watch);
    Ok(())
}

#[test]
fn single_tasks_run_alone_without_watch() -> TestResult {
    for (name, kind) in [
        ("clean", TaskKind::Clean),
        ("maincss", TaskKind::MainCss),
        ("scripts", TaskKind::Scripts),
        ("plugins", TaskKind::Plugins),
        ("html", TaskKind::Html),
        ("images", TaskKind::Images),
        ("webpconv", TaskKind::WebpConv),
        ("fav", TaskKind::Fav),
    ] {
        let args = CliArgs::try_parse_from(["assetflow", name])?;
        assert_eq!(args.task.to_string(), name);
        assert_eq!(kind.name(), name);

        let inv = Invocation::for_task(args.task, false);
        assert_eq!(inv.roots, vec![kind]);
        assert!(!inv.watch);
        assert_eq!(inv.plan.steps().len(), 1);
    }
    Ok(())
}

#[test]
fn watch_task_starts_without_a_build() -> TestResult {
    let inv = Invocation::for_task(TaskArg::Watch, false);
    assert!(inv.roots.is_empty());
    assert!(inv.watch);
    Ok(())
}

#[test]
fn unknown_task_is_rejected() {
    assert!(CliArgs::try_parse_from(["assetflow", "deploy"]).is_err());
}

#[tokio::test]
async fn html_task_end_to_end() -> TestResult {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "src/html/index.html", "<p>\n  hi\n</p>\n");

    let root = dir.path().to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from(["assetflow", "html", "--root", root.as_str()])?;
    run(args).await?;

    assert!(dir.path().join("index.html").is_file());
    Ok(())
}

#[tokio::test]
async fn dry_run_touches_nothing() -> TestResult {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "f/css/main.min.css", "keep");

    let root = dir.path().to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from(["assetflow", "--root", root.as_str(), "--dry-run"])?;
    run(args).await?;

    assert!(dir.path().join("f/css/main.min.css").is_file());
    Ok(())
}

#[tokio::test]
async fn failed_single_task_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    write(dir.path(), "src/i/webp/notes.txt", "not an image");

    let root = dir.path().to_string_lossy().into_owned();
    let args = CliArgs::try_parse_from(["assetflow", "webpconv", "--root", root.as_str()])?;
    let err = run(args).await.unwrap_err();

    assert!(err.to_string().contains("webpconv"), "{err:#}");
    Ok(())
}

#[test]
fn log_filter_prefers_flag_then_env_then_info() {
    use assetflow::cli::LogLevel;
    use assetflow::logging::build_filter;

    assert_eq!(build_filter(Some(LogLevel::Debug), Some("trace")).to_string(), "debug");
    assert_eq!(build_filter(None, Some("warn")).to_string(), "warn");
    assert_eq!(build_filter(None, Some("  ")).to_string(), "info");
    assert_eq!(build_filter(None, None).to_string(), "info");
}
