// src/tasks/images.rs

//! Format-preserving image recompression.
//!
//! | Input | Treatment |
//! |---|---|
//! | PNG | lossless re-encode, best compression, adaptive filtering |
//! | JPEG | re-encode at `[images].jpeg_quality` |
//! | anything else | copied unchanged |
//!
//! A re-encode that does not shrink the file is discarded in favour of the
//! original bytes, as is any input the decoder rejects.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageFormat, ImageResult};
use tracing::{debug, info};

use crate::errors::Result;
use crate::sources::{expand, mirror_path, read_source, write_output};
use crate::tasks::{BuildContext, TaskReport};

pub fn build(ctx: &BuildContext) -> Result<TaskReport> {
    let entry = &ctx.config.paths.images;
    let files = expand(&ctx.root, &entry.src)?;
    let dest = entry.dest_in(&ctx.root);
    let quality = ctx.config.images.jpeg_quality;

    let mut outputs = Vec::with_capacity(files.len());
    let mut saved: u64 = 0;

    for file in &files {
        let original = read_source(&file.path)?;
        let out = compress(&file.path, &original, quality);
        saved += original.len().saturating_sub(out.len()) as u64;

        let target = mirror_path(&dest, file);
        write_output(&target, &out)?;
        outputs.push(target);
    }

    info!(files = outputs.len(), saved_bytes = saved, "images compressed");
    Ok(TaskReport::with_outputs(outputs))
}

/// Compress one image, never returning something larger than the input.
pub fn compress(path: &Path, original: &[u8], jpeg_quality: u8) -> Vec<u8> {
    let Some(format) = supported_format(path) else {
        debug!(file = %path.display(), "unsupported image type; passing through");
        return original.to_vec();
    };

    match reencode(original, format, jpeg_quality) {
        Ok(encoded) if encoded.len() < original.len() => encoded,
        Ok(_) => {
            debug!(file = %path.display(), "re-encode did not shrink file; keeping original");
            original.to_vec()
        }
        Err(e) => {
            debug!(file = %path.display(), error = %e, "could not decode image; passing through");
            original.to_vec()
        }
    }
}

fn supported_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        _ => None,
    }
}

fn reencode(bytes: &[u8], format: ImageFormat, jpeg_quality: u8) -> ImageResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, format)?;
    let mut out = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut out, jpeg_quality);
            img.write_with_encoder(encoder)?;
        }
        _ => {
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)?;
        }
    }

    Ok(out)
}
