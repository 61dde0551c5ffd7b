//! Hashing System - SHA-256 over Decoded Pixels
//!
//! The cache-busting token must change exactly when the pixels change.
//! Encoded bytes, encoder settings and timestamps never reach the hasher.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex characters kept from the full digest.
pub const HASH_PREFIX_LEN: usize = 6;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Short content token appended to sprite URLs as `?v=<hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a composited sprite.
///
/// The canvas size is fed ahead of the RGBA samples so that a 2x1 and a
/// 1x2 canvas with the same bytes do not collide.
pub fn hash_pixels(pixels: &RgbaImage) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(pixels.width().to_be_bytes());
    hasher.update(pixels.height().to_be_bytes());
    hasher.update(pixels.as_raw());
    let digest = hex::encode(hasher.finalize());
    ContentHash::new(&digest[..HASH_PREFIX_LEN])
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
