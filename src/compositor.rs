//! Sprite Compositing
//!
//! Stamps each icon onto a transparent RGBA canvas at its rectangle.
//! Icon pixels replace the background; nothing is blended.

use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};

use crate::catalog::IconCatalog;
use crate::codec::{ImageCodec, SpriteFormat};
use crate::layout::SpriteLayout;
use crate::pipeline::{ensure_parent_dir, PipelineError};

/// Render the sprite pixels for `layout`.
pub fn compose(
    layout: &SpriteLayout,
    catalog: &IconCatalog,
    codec: &dyn ImageCodec,
) -> Result<RgbaImage, PipelineError> {
    let canvas_spec = layout.canvas;
    if canvas_spec.area() == 0 {
        return Err(PipelineError::EmptySprite);
    }

    // Zero-initialised RGBA is fully transparent.
    let mut canvas = RgbaImage::new(canvas_spec.width, canvas_spec.height);

    for rect in &layout.rects {
        if !canvas_spec.contains(rect) {
            return Err(PipelineError::OutOfBounds {
                name: rect.name.clone(),
                right: rect.right(),
                bottom: rect.bottom(),
                width: canvas_spec.width,
                height: canvas_spec.height,
            });
        }

        let icon = catalog
            .icons()
            .get(rect.icon)
            .ok_or_else(|| PipelineError::UnknownIcon(rect.name.clone()))?;
        if icon.is_empty() {
            continue;
        }
        let pixels = codec
            .decode(&icon.source_path)
            .map_err(|source| PipelineError::Decode {
                path: icon.source_path.clone(),
                source,
            })?;
        if pixels.dimensions() != (rect.width, rect.height) {
            return Err(PipelineError::SizeMismatch {
                name: rect.name.clone(),
                expected: (rect.width, rect.height),
                actual: pixels.dimensions(),
            });
        }

        imageops::replace(&mut canvas, &pixels, rect.left as i64, rect.top as i64);
    }

    Ok(canvas)
}

/// Encode `pixels` to every requested file under `output_root`.
///
/// The format of each file follows its extension.
pub fn write_sprite(
    pixels: &RgbaImage,
    output_root: &Path,
    files: &[String],
    codec: &dyn ImageCodec,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = output_root.join(file);
        let format = SpriteFormat::from_path(&path).ok_or_else(|| {
            PipelineError::Configuration(format!("cannot encode sprite as {}", file))
        })?;
        ensure_parent_dir(&path)?;
        codec
            .encode(pixels, &path, format)
            .map_err(|source| PipelineError::Encode {
                path: path.clone(),
                source,
            })?;
        written.push(path);
    }
    Ok(written)
}
