//! Codec Boundary - Measure, Decode, Encode
//!
//! Pixel placement lives in the compositor. Everything that touches an
//! encoded file goes through `ImageCodec`.

use image::{ImageFormat, ImageResult, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Encodings a sprite can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteFormat {
    Png,
    Webp,
    Avif,
}

impl SpriteFormat {
    /// Pick the format from a file name's extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        Self::from_extension(path.as_ref().extension()?.to_str()?)
    }

    /// Accepts `"png"` as well as `".png"`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Whether `RasterCodec` can read icons in this format. AVIF is
    /// write-only: decoding needs the native dav1d library.
    pub fn is_decodable(self) -> bool {
        !matches!(self, Self::Avif)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Webp => ImageFormat::WebP,
            Self::Avif => ImageFormat::Avif,
        }
    }
}

/// Codec collaborator. Metadata reads run concurrently, hence `Sync`.
pub trait ImageCodec: Send + Sync {
    /// Intrinsic pixel size without decoding the whole image.
    fn dimensions(&self, path: &Path) -> ImageResult<(u32, u32)>;

    /// Full decode to 8-bit RGBA.
    fn decode(&self, path: &Path) -> ImageResult<RgbaImage>;

    fn encode(&self, image: &RgbaImage, path: &Path, format: SpriteFormat) -> ImageResult<()>;
}

/// Default codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn dimensions(&self, path: &Path) -> ImageResult<(u32, u32)> {
        image::image_dimensions(path)
    }

    fn decode(&self, path: &Path) -> ImageResult<RgbaImage> {
        Ok(image::open(path)?.into_rgba8())
    }

    fn encode(&self, image: &RgbaImage, path: &Path, format: SpriteFormat) -> ImageResult<()> {
        image.save_with_format(path, format.image_format())
    }
}
