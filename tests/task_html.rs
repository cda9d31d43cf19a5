mod common;

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use assetflow::tasks::html::{minify_config, minify_document};
use assetflow::tasks::{TaskKind, run_task};

use common::{TestResult, context, write};

const PAGE: &str = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>  Home  </title>\n  </head>\n  <body>\n    <!-- keep me -->\n    <p>\n      Hello\n    </p>\n  </body>\n</html>\n";

#[tokio::test]
async fn html_is_collapsed_into_the_project_root() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/html/index.html", PAGE);
    write(root, "src/html/blog/post.html", "<p>\n  Post\n</p>\n");

    let report = run_task(TaskKind::Html, context(root)).await?;
    assert_eq!(report.outputs.len(), 2);

    let index = fs::read_to_string(root.join("index.html"))?;
    assert!(index.len() < PAGE.len());
    assert!(!index.contains("\n    <p>"), "{index}");
    assert!(index.contains("<!-- keep me -->"), "{index}");
    assert!(index.contains("</body>"), "{index}");
    assert!(index.to_ascii_lowercase().starts_with("<!doctype html>"), "{index}");

    assert!(root.join("blog/post.html").is_file());
    Ok(())
}

#[tokio::test]
async fn rerunning_html_overwrites_with_identical_output() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    write(root, "src/html/index.html", PAGE);

    run_task(TaskKind::Html, context(root)).await?;
    let first = fs::read(root.join("index.html"))?;
    run_task(TaskKind::Html, context(root)).await?;
    let second = fs::read(root.join("index.html"))?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn minifying_minified_output_is_a_no_op() -> TestResult {
    let page = "<!DOCTYPE html>\n<html>\n<head><title> Docs </title></head>\n<body>\n  <!-- nav -->\n  <p>Read   the <em>fine</em>  <a href=\"/m\">manual</a> .</p>\n  <pre>\n  keep   this\n    layout\n  </pre>\n</body>\n</html>\n";
    let path = Path::new("docs.html");
    let cfg = minify_config();

    let once = minify_document(path, page.as_bytes(), &cfg)?;
    let twice = minify_document(path, &once, &cfg)?;

    assert_eq!(String::from_utf8(twice)?, String::from_utf8(once.clone())?);
    let once = String::from_utf8(once)?;
    assert!(once.contains("<!-- nav -->"), "{once}");
    assert!(once.contains("keep   this\n    layout"), "{once}");
    Ok(())
}

#[tokio::test]
async fn non_html_files_are_copied_unchanged() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path();
    let body = "User-agent: *\n\n\nDisallow:\n";
    write(root, "src/html/robots.txt", body);

    run_task(TaskKind::Html, context(root)).await?;
    assert_eq!(fs::read_to_string(root.join("robots.txt"))?, body);
    Ok(())
}

#[test]
fn invalid_utf8_is_a_transform_error() {
    let err = minify_document("bad.html".as_ref(), &[0xff, 0xfe, b'<'], &minify_config());
    assert!(err.is_err());
}
