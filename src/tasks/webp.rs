// src/tasks/webp.rs

use std::path::Path;

use image::DynamicImage;
use image::codecs::webp::WebPEncoder;
use tracing::info;

use crate::errors::{AssetError, Result};
use crate::sources::{expand, mirror_path, read_source, write_output};
use crate::tasks::{BuildContext, TaskReport};

/// Re-encode every raster image under the webp source tree as lossless WebP.
///
/// Output mirrors the source tree with the extension replaced by `.webp`.
/// Inputs that are not decodable images fail the task.
pub fn build(ctx: &BuildContext) -> Result<TaskReport> {
    let entry = &ctx.config.paths.webp;
    let files = expand(&ctx.root, &entry.src)?;
    let dest = entry.dest_in(&ctx.root);

    let mut outputs = Vec::with_capacity(files.len());
    for file in &files {
        let bytes = read_source(&file.path)?;
        let encoded = convert(&file.path, &bytes)?;

        let target = mirror_path(&dest, file).with_extension("webp");
        write_output(&target, &encoded)?;
        outputs.push(target);
    }

    info!(files = outputs.len(), dest = %dest.display(), "webp conversion done");
    Ok(TaskReport::with_outputs(outputs))
}

pub fn convert(path: &Path, bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AssetError::transform(path, format!("not a decodable raster image: {e}")))?;

    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut out = Vec::new();
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut out))
        .map_err(|e| AssetError::transform(path, format!("WebP encode failed: {e}")))?;

    Ok(out)
}
