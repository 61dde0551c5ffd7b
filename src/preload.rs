//! Preload hint for the sprite, so pages can fetch it before the CSS arrives.

use std::fmt;

use crate::config::SpriteConfig;
use crate::hashing::ContentHash;
use crate::stylesheet::versioned_sprite_url;
use crate::GENERATOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadFragment {
    /// Destination, relative to the source root.
    pub file: String,
    pub href: String,
}

impl fmt::Display for PreloadFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!-- Auto-generated by {} -->", GENERATOR)?;
        writeln!(
            f,
            r#"<link rel="preload" href="{}" as="image" media="all"/>"#,
            self.href
        )
    }
}

/// `None` when `dst.preloadFile` is unset.
pub fn build_preload(config: &SpriteConfig, hash: &ContentHash) -> Option<PreloadFragment> {
    let file = config.dst.preload_file.clone()?;
    Some(PreloadFragment {
        file,
        href: versioned_sprite_url(config, hash),
    })
}
