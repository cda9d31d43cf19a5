// src/tasks/favicons.rs

//! Favicon set and web app manifest.
//!
//! One source image (the largest matched) is resized into every icon the
//! enabled families need, written to the favicons destination, and a small
//! subset is copied into the project root where browsers look for it.

use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::FaviconSettings;
use crate::config::validate::parse_hex_color;
use crate::errors::{AssetError, Result};
use crate::sources::{SourceFile, expand, read_source, write_output};
use crate::tasks::{BuildContext, TaskReport};

/// Files copied from the favicons destination into the project root.
pub const ROOT_FILES: [&str; 4] = [
    "favicon.ico",
    "favicon-48x48.png",
    "apple-touch-icon.png",
    "manifest.json",
];

const ICO_SIZES: [u32; 5] = [16, 24, 32, 48, 64];
const FAVICON_PNG_SIZES: [u32; 3] = [16, 32, 48];
const APPLE_SIZES: [u32; 11] = [57, 60, 72, 76, 114, 120, 144, 152, 167, 180, 1024];
const ANDROID_SIZES: [u32; 9] = [36, 48, 72, 96, 144, 192, 256, 384, 512];

/// Completion status of one generator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaviconStatus {
    /// Files written to the favicons destination, manifest included.
    pub generated: usize,
    /// Root copies, in [`ROOT_FILES`] order.
    pub copied_to_root: Vec<PathBuf>,
}

/// `manifest.json` as browsers read it.
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'a str,
    short_name: &'a str,
    description: &'a str,
    dir: &'static str,
    lang: &'a str,
    display: &'static str,
    orientation: &'static str,
    start_url: &'static str,
    background_color: &'a str,
    theme_color: &'a str,
    icons: Vec<ManifestIcon>,
}

#[derive(Debug, Serialize)]
struct ManifestIcon {
    src: String,
    sizes: String,
    #[serde(rename = "type")]
    mime: &'static str,
}

pub fn build(ctx: &BuildContext) -> Result<TaskReport> {
    let entry = &ctx.config.paths.favicons;
    let settings = &ctx.config.favicons;
    let dest = entry.dest_in(&ctx.root);

    let files = expand(&ctx.root, &entry.src)?;
    let source = pick_largest(&files).ok_or_else(|| {
        AssetError::io(
            ctx.root.join(&entry.src),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no favicon source image"),
        )
    })?;
    debug!(source = %source.1.path.display(), "favicon source selected");
    let img = source.0;

    let background = parse_hex_color(&settings.background)
        .ok_or_else(|| AssetError::Config(format!("invalid background colour '{}'", settings.background)))?;

    let mut outputs = Vec::new();
    let mut manifest_icons = Vec::new();

    if settings.icons.favicons {
        let ico = encode_ico(&img).map_err(|e| AssetError::transform(&source.1.path, e.to_string()))?;
        outputs.push(write_icon(&dest, "favicon.ico", &ico)?);

        for size in FAVICON_PNG_SIZES {
            let png = encode_png(&square(&img, size, None))
                .map_err(|e| AssetError::transform(&source.1.path, e.to_string()))?;
            outputs.push(write_icon(&dest, &format!("favicon-{size}x{size}.png"), &png)?);
        }
    }

    if settings.icons.apple_icon {
        let flat = |size| {
            encode_png(&square(&img, size, Some(background)))
                .map_err(|e| AssetError::transform(&source.1.path, e.to_string()))
        };

        let largest = flat(180)?;
        outputs.push(write_icon(&dest, "apple-touch-icon.png", &largest)?);
        outputs.push(write_icon(&dest, "apple-touch-icon-precomposed.png", &largest)?);
        for size in APPLE_SIZES {
            let png = flat(size)?;
            outputs.push(write_icon(&dest, &format!("apple-touch-icon-{size}x{size}.png"), &png)?);
        }
    }

    if settings.icons.android {
        for size in ANDROID_SIZES {
            let name = format!("android-chrome-{size}x{size}.png");
            let png = encode_png(&square(&img, size, None))
                .map_err(|e| AssetError::transform(&source.1.path, e.to_string()))?;
            outputs.push(write_icon(&dest, &name, &png)?);
            manifest_icons.push(ManifestIcon {
                src: icon_href(&entry.dest, &name),
                sizes: format!("{size}x{size}"),
                mime: "image/png",
            });
        }
    }

    let manifest = manifest_json(settings, manifest_icons)?;
    outputs.push(write_icon(&dest, "manifest.json", manifest.as_bytes())?);

    let mut status = FaviconStatus {
        generated: outputs.len(),
        copied_to_root: Vec::new(),
    };

    for name in ROOT_FILES {
        let from = dest.join(name);
        if !from.exists() {
            debug!(file = name, "icon family disabled; nothing to copy to root");
            continue;
        }
        let to = ctx.root.join(name);
        std::fs::copy(&from, &to).map_err(|e| AssetError::io(&from, e))?;
        status.copied_to_root.push(to);
    }

    info!(
        generated = status.generated,
        copied_to_root = status.copied_to_root.len(),
        "favicons generated"
    );

    let mut report = TaskReport::with_outputs(outputs);
    report.outputs.extend(status.copied_to_root.iter().cloned());
    report.favicons = Some(status);
    Ok(report)
}

/// Decode every candidate and keep the one with the most pixels.
///
/// Files that fail to decode are skipped.
fn pick_largest(files: &[SourceFile]) -> Option<(DynamicImage, &SourceFile)> {
    let mut best: Option<(DynamicImage, &SourceFile)> = None;
    for file in files {
        let bytes = match read_source(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(file = %file.path.display(), error = %e, "skipping unreadable favicon source");
                continue;
            }
        };
        let img = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                debug!(file = %file.path.display(), error = %e, "skipping undecodable favicon source");
                continue;
            }
        };

        let area = u64::from(img.width()) * u64::from(img.height());
        let better = best
            .as_ref()
            .is_none_or(|(b, _)| area > u64::from(b.width()) * u64::from(b.height()));
        if better {
            best = Some((img, file));
        }
    }
    best
}

/// Fit `img` into a `size`x`size` square, centred, aspect ratio preserved.
///
/// With a background the result is opaque; otherwise the padding is
/// transparent.
pub fn square(img: &DynamicImage, size: u32, background: Option<[u8; 3]>) -> RgbaImage {
    let fitted = img.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let fill = match background {
        Some([r, g, b]) => Rgba([r, g, b, 255]),
        None => Rgba([0, 0, 0, 0]),
    };

    let mut canvas = RgbaImage::from_pixel(size, size, fill);
    let x = i64::from((size - fitted.width()) / 2);
    let y = i64::from((size - fitted.height()) / 2);
    imageops::overlay(&mut canvas, &fitted, x, y);
    canvas
}

fn encode_png(img: &RgbaImage) -> image::ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

fn encode_ico(img: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let frames = ICO_SIZES
        .iter()
        .map(|&size| {
            let icon = square(img, size, None);
            IcoFrame::as_png(icon.as_raw(), size, size, ExtendedColorType::Rgba8)
        })
        .collect::<image::ImageResult<Vec<_>>>()?;

    let mut out = Vec::new();
    IcoEncoder::new(&mut out).encode_images(&frames)?;
    Ok(out)
}

fn write_icon(dest: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dest.join(name);
    write_output(&path, bytes)?;
    Ok(path)
}

/// Manifest href for an icon: the favicons destination, forward slashes.
fn icon_href(dest_rel: &Path, name: &str) -> String {
    let mut parts: Vec<String> = dest_rel
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.push(name.to_string());
    format!("/{}", parts.join("/"))
}

fn manifest_json(settings: &FaviconSettings, icons: Vec<ManifestIcon>) -> Result<String> {
    let manifest = Manifest {
        name: &settings.app_name,
        short_name: &settings.app_name,
        description: &settings.app_description,
        dir: "auto",
        lang: &settings.lang,
        display: "standalone",
        orientation: "any",
        start_url: "/?homescreen=1",
        background_color: &settings.background,
        theme_color: &settings.theme_color,
        icons,
    };

    serde_json::to_string_pretty(&manifest)
        .map_err(|e| AssetError::transform(Path::new("manifest.json"), e.to_string()))
}
