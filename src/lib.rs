//! cssprite Core - CSS Sprite Compiler
//!
//! # Guarantees
//! 1. Discovery Order Is Layout Order
//! 2. Rectangles Never Overlap Or Leave The Canvas
//! 3. The Hash Depends On Pixels Only
//! 4. No Stylesheet Without Its Sprite
//! 5. Defaults Are Never Mutated

/// Stage progress: `info!` when the run is verbose, `debug!` otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            log::info!($($arg)+)
        } else {
            log::debug!($($arg)+)
        }
    };
}

pub mod catalog;
pub mod codec;
pub mod compositor;
pub mod config;
pub mod hashing;
pub mod layout;
pub mod pipeline;
pub mod preload;
pub mod stylesheet;
pub mod validation;

pub use catalog::{DiscoveryMode, Icon, IconCatalog};
pub use codec::{ImageCodec, RasterCodec, SpriteFormat};
pub use config::{Correspondence, PartialSpriteConfig, SpriteConfig};
pub use hashing::{hash_pixels, sha256_hex, ContentHash, HASH_PREFIX_LEN};
pub use layout::{CanvasSpec, LayoutEngine, Rectangle, SpriteLayout, StripLayout};
pub use pipeline::{PipelineError, RunReport, SpritePipeline, SpritePlan};
pub use preload::{build_preload, PreloadFragment};
pub use stylesheet::{build_stylesheet, CssRule, Stylesheet};
pub use validation::{ConfigValidator, ConfigViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name written into generated file headers.
pub const GENERATOR: &str = "cssprite";
