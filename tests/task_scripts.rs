mod common;

use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use assetflow::config::SiteConfig;
use assetflow::errors::AssetError;
use assetflow::tasks::scripts::{ScriptChunk, bundle_chunks};
use assetflow::tasks::{BuildContext, TaskKind, run_task};

use common::{TestResult, context, write};

#[tokio::test]
async fn scripts_are_minified_and_concatenated_in_path_order() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/js/main/b.js", "var second = 2;\n");
    write(
        root,
        "src/js/main/a.js",
        "// leading comment\nvar first = 1;\nfunction   greet( name ) {\n  return 'hi ' + name;\n}\n",
    );

    let report = run_task(TaskKind::Scripts, context(root)).await?;
    assert_eq!(report.outputs.len(), 2);

    let js = fs::read_to_string(root.join("f/js/main.min.js"))?;
    let first = js.find("first").ok_or("first missing")?;
    let second = js.find("second").ok_or("second missing")?;
    assert!(first < second, "{js}");
    assert!(!js.contains("leading comment"), "{js}");
    assert!(js.ends_with("//# sourceMappingURL=main.min.js.map\n"), "{js}");

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("f/js/main.min.js.map"))?)?;
    let sources: Vec<String> = map["sources"]
        .as_array()
        .ok_or("sources missing")?
        .iter()
        .filter_map(|s| s.as_str().map(str::to_string))
        .collect();
    assert_eq!(sources.len(), 2);
    assert!(sources[0].ends_with("src/js/main/a.js"), "{sources:?}");
    assert!(sources[1].ends_with("src/js/main/b.js"), "{sources:?}");
    Ok(())
}

#[tokio::test]
async fn plugins_write_their_own_artifact_next_to_main() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/js/main/app.js", "var app = 1;\n");
    write(root, "src/js/plugins/slider.js", "var slider = 2;\n");

    run_task(TaskKind::Scripts, context(root)).await?;
    run_task(TaskKind::Plugins, context(root)).await?;

    let main = fs::read_to_string(root.join("f/js/main.min.js"))?;
    let plugins = fs::read_to_string(root.join("f/js/plugins.min.js"))?;
    assert!(main.contains("app") && !main.contains("slider"));
    assert!(plugins.contains("slider") && !plugins.contains("app"));
    Ok(())
}

#[tokio::test]
async fn syntax_error_fails_the_task_naming_the_file() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/js/main/ok.js", "var ok = 1;\n");
    write(root, "src/js/main/broken.js", "function (\n");

    let err = run_task(TaskKind::Scripts, context(root)).await.unwrap_err();
    match err {
        AssetError::Compile { file, .. } => assert!(file.ends_with("broken.js")),
        other => panic!("expected compile error, got {other:?}"),
    }
    assert!(!root.join("f/js/main.min.js").exists());
    Ok(())
}

#[tokio::test]
async fn empty_glob_writes_nothing_and_succeeds() -> TestResult {
    let dir = tempdir()?;
    let report = run_task(TaskKind::Plugins, context(dir.path())).await?;

    assert!(report.outputs.is_empty());
    assert!(!dir.path().join("f/js/plugins.min.js").exists());
    Ok(())
}

#[test]
fn chunks_are_newline_separated() -> TestResult {
    let chunks = vec![
        ScriptChunk {
            path: "a.js".into(),
            source_name: "a.js".into(),
            code: b"var a = 1;".to_vec(),
        },
        ScriptChunk {
            path: "b.js".into(),
            source_name: "b.js".into(),
            code: b"var b = 2;".to_vec(),
        },
    ];

    let bundle = bundle_chunks(&chunks)?;
    assert_eq!(bundle.code.lines().count(), 2);
    assert!(bundle.map.contains("\"a.js\""));
    Ok(())
}

#[test]
fn each_chunk_is_terminated_before_the_next_file() -> TestResult {
    let chunks = vec![
        ScriptChunk {
            path: "a.js".into(),
            source_name: "a.js".into(),
            code: b"var a = function(){ return 1 }".to_vec(),
        },
        ScriptChunk {
            path: "b.js".into(),
            source_name: "b.js".into(),
            code: b"(function(){ console.log(2) })()".to_vec(),
        },
    ];

    let bundle = bundle_chunks(&chunks)?;
    let lines: Vec<&str> = bundle.code.lines().collect();
    assert_eq!(lines.len(), 2, "{}", bundle.code);
    assert!(lines.iter().all(|l| l.ends_with(';')), "{}", bundle.code);
    assert!(lines[1].contains("console.log(2)"), "{}", bundle.code);
    Ok(())
}

#[tokio::test]
async fn bundles_are_lowered_to_es5() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(
        root,
        "src/js/main/modern.js",
        "const sq = (a) => a ** 2;\nclass Point { constructor(x) { this.x = x; } }\nlet { p, q } = { p: sq(2), q: new Point(3) };\nvar total = p + q.x;\n",
    );
    write(root, "src/js/main/plain.js", "var a = function () { return 1; };\n");

    run_task(TaskKind::Scripts, context(root)).await?;
    let js = fs::read_to_string(root.join("f/js/main.min.js"))?;

    assert!(!js.contains("=>"), "{js}");
    assert!(!js.contains("**"), "{js}");
    assert!(!js.contains("const "), "{js}");
    assert!(!js.contains("let "), "{js}");
    assert!(!js.contains("class Point"), "{js}");
    assert!(js.contains("total"), "{js}");
    assert!(js.contains("function"), "{js}");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn transpile_command_filters_each_file() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/js/main/a.js", "var answer = 42;\n");

    let mut config = SiteConfig::default();
    config.scripts.transpile_cmd = Some("sed s/answer/result/".to_string());
    let ctx = Arc::new(BuildContext::new(root, config));

    run_task(TaskKind::Scripts, ctx).await?;
    let js = fs::read_to_string(root.join("f/js/main.min.js"))?;
    assert!(js.contains("result") && !js.contains("answer"), "{js}");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failing_transpile_command_is_a_compile_error() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/js/main/a.js", "var a = 1;\n");

    let mut config = SiteConfig::default();
    config.scripts.transpile_cmd = Some("echo 'unexpected token' >&2; exit 3".to_string());
    let ctx = Arc::new(BuildContext::new(root, config));

    let err = run_task(TaskKind::Scripts, ctx).await.unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, AssetError::Compile { .. }), "{msg}");
    assert!(msg.contains("unexpected token"), "{msg}");
    Ok(())
}
