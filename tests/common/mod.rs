#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use assetflow::config::SiteConfig;
use assetflow::tasks::BuildContext;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Write `contents` at `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Context over `root` with the built-in configuration.
pub fn context(root: &Path) -> Arc<BuildContext> {
    Arc::new(BuildContext::new(root, SiteConfig::default()))
}

/// A noisy RGBA image, so encoders have something to chew on.
pub fn sample_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = (x * 31 + y * 17) % 256;
        Rgba([v as u8, (255 - v) as u8, ((x ^ y) % 256) as u8, 255])
    })
}

/// PNG bytes written with the fastest (largest) settings.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = sample_image(width, height);
    let mut out = Vec::new();
    PngEncoder::new_with_quality(
        &mut out,
        image::codecs::png::CompressionType::Fast,
        image::codecs::png::FilterType::NoFilter,
    )
    .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
    .unwrap();
    out
}
