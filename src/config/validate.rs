// src/config/validate.rs

use std::path::{Component, Path};

use crate::config::model::SiteConfig;
use crate::config::paths::AssetGroup;
use crate::errors::{AssetError, Result};
use crate::sources::compile_matcher;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - every source glob compiles
/// - destinations are non-empty (only `html` may target the project root)
/// - destinations and the styles entry stay inside the project root
/// - the styles group names an entry file
/// - image quality, watch queue length and colour strings are in range
/// - no unsupported favicon variant is switched on
pub fn validate_config(cfg: &SiteConfig) -> Result<()> {
    validate_paths(cfg)?;
    validate_images(cfg)?;
    validate_watch(cfg)?;
    validate_favicons(cfg)?;
    Ok(())
}

fn validate_paths(cfg: &SiteConfig) -> Result<()> {
    for (group, entry) in cfg.paths.iter() {
        compile_matcher(&entry.src)?;

        let dest = entry.dest.as_os_str();
        let is_root = dest.is_empty() || dest == "." || dest == "./";
        if is_root && group != AssetGroup::Html {
            return Err(AssetError::Config(format!(
                "[paths.{group}].dest must name a directory below the project root"
            )));
        }
        if escapes_root(&entry.dest) {
            return Err(AssetError::Config(format!(
                "[paths.{group}].dest must be relative and stay inside the project root (got {:?})",
                entry.dest
            )));
        }
        if let Some(file) = entry.entry.as_deref().filter(|f| escapes_root(f)) {
            return Err(AssetError::Config(format!(
                "[paths.{group}].entry must be relative and stay inside the project root (got {file:?})"
            )));
        }
    }

    if cfg.paths.styles.entry.is_none() {
        return Err(AssetError::Config(
            "[paths.styles].entry is required (the stylesheet compiled into main.min.css)"
                .to_string(),
        ));
    }

    Ok(())
}

/// Absolute, rooted or `..`-containing paths resolve outside the project.
fn escapes_root(path: &Path) -> bool {
    path.is_absolute()
        || path.components().any(|c| {
            matches!(
                c,
                Component::RootDir | Component::Prefix(_) | Component::ParentDir
            )
        })
}

fn validate_images(cfg: &SiteConfig) -> Result<()> {
    let q = cfg.images.jpeg_quality;
    if !(1..=100).contains(&q) {
        return Err(AssetError::Config(format!(
            "[images].jpeg_quality must be in 1..=100 (got {q})"
        )));
    }
    Ok(())
}

fn validate_watch(cfg: &SiteConfig) -> Result<()> {
    if cfg.watch.queue_length == 0 {
        return Err(AssetError::Config(
            "[watch].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_favicons(cfg: &SiteConfig) -> Result<()> {
    let fav = &cfg.favicons;

    for (key, value) in [("background", &fav.background), ("theme_color", &fav.theme_color)] {
        if parse_hex_color(value).is_none() {
            return Err(AssetError::Config(format!(
                "[favicons].{key} must be a #rgb or #rrggbb colour (got '{value}')"
            )));
        }
    }

    let unsupported = fav.icons.unsupported_enabled();
    if !unsupported.is_empty() {
        return Err(AssetError::Config(format!(
            "[favicons.icons] variants not supported: {}",
            unsupported.join(", ")
        )));
    }

    Ok(())
}

/// Parse `#rgb` / `#rrggbb` into RGB bytes.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => {
            let mut out = [0u8; 3];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(out)
        }
        _ => None,
    }
}
