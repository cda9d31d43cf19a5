mod common;

use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio::time::timeout;

use assetflow::config::PathTable;
use assetflow::engine::{RuntimeEvent, TriggerReason};
use assetflow::tasks::TaskKind;
use assetflow::watch::{
    HashGate, WatchOptions, build_bindings, collect_matching_files, compute_hash_for_paths,
    matching_tasks, spawn_watcher,
};

use common::{TestResult, write};

#[test]
fn default_bindings_cover_styles_scripts_and_html() -> TestResult {
    let bindings = build_bindings(&PathTable::default())?;
    assert_eq!(bindings.len(), 3);

    assert_eq!(matching_tasks(&bindings, "src/sass/blocks/_card.scss"), vec![TaskKind::MainCss]);
    assert_eq!(matching_tasks(&bindings, "src/js/main/app.js"), vec![TaskKind::Scripts]);
    assert_eq!(matching_tasks(&bindings, "src/html/about/index.html"), vec![TaskKind::Html]);

    // Plugins, images and outputs are not watched.
    assert!(matching_tasks(&bindings, "src/js/plugins/slider.js").is_empty());
    assert!(matching_tasks(&bindings, "src/i/images/a.png").is_empty());
    assert!(matching_tasks(&bindings, "f/css/main.min.css").is_empty());
    assert!(matching_tasks(&bindings, "index.html").is_empty());
    Ok(())
}

#[test]
fn hash_is_order_insensitive_and_tracks_content_changes() -> TestResult {
    let dir = tempdir()?;
    let f1 = write(dir.path(), "a.txt", "hello");
    let f2 = write(dir.path(), "b.txt", "world");

    let h1 = compute_hash_for_paths([&f1, &f2])?;
    let h2 = compute_hash_for_paths([&f2, &f1])?;
    assert_eq!(h1, h2);

    std::fs::write(&f1, "HELLO")?;
    let h3 = compute_hash_for_paths([&f1, &f2])?;
    assert_ne!(h1, h3);
    Ok(())
}

#[test]
fn hash_gate_only_passes_real_changes() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/html/index.html", "<p>a</p>");
    let bindings = build_bindings(&PathTable::default())?;

    let files = collect_matching_files(root, &bindings, TaskKind::Html)?;
    assert_eq!(files.len(), 1);

    let mut gate = HashGate::new();
    gate.seed(TaskKind::Html, compute_hash_for_paths(&files)?);
    assert!(!gate.changed(TaskKind::Html, compute_hash_for_paths(&files)?));

    write(root, "src/html/index.html", "<p>b</p>");
    assert!(gate.changed(TaskKind::Html, compute_hash_for_paths(&files)?));
    Ok(())
}

#[tokio::test]
async fn burst_of_changes_triggers_each_task_once() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/sass/main.scss", "a{}");
    write(root, "src/js/main/app.js", "var a;");

    let bindings = build_bindings(&PathTable::default())?;
    let (tx, mut rx) = mpsc::channel(16);
    let options = WatchOptions {
        debounce: Duration::from_millis(300),
        use_hash: false,
    };
    let _handle = spawn_watcher(root, bindings, tx, options)?;

    // Give the backend a moment to register the watch.
    tokio::time::sleep(Duration::from_millis(200)).await;

    write(root, "src/sass/main.scss", "a{color:red}");
    write(root, "src/sass/_vars.scss", "$x: 1;");
    write(root, "src/js/main/app.js", "var b;");
    write(root, "f/css/main.min.css", "ignored");

    let mut triggered = Vec::new();
    while let Ok(Some(event)) = timeout(Duration::from_secs(3), rx.recv()).await {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                assert_eq!(reason, TriggerReason::FileWatch);
                triggered.push(task);
            }
            other => panic!("unexpected event {other:?}"),
        }
        if triggered.len() == 2 {
            break;
        }
    }

    assert_eq!(triggered, vec![TaskKind::MainCss, TaskKind::Scripts]);

    // Nothing else arrives once the burst has been flushed.
    let extra = timeout(Duration::from_millis(600), rx.recv()).await;
    assert!(extra.is_err(), "unexpected extra trigger: {extra:?}");
    Ok(())
}
