//! Sprite Pipeline - Single Entry Point
//!
//! validate -> discover -> layout -> compose -> hash -> write sprite
//! -> write stylesheet -> write preload.
//!
//! CRITICAL: the stylesheet embeds the hash, so it is only written once every
//! sprite file is on disk. A failed sprite write leaves no stylesheet behind.

use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::IconCatalog;
use crate::codec::{ImageCodec, RasterCodec};
use crate::compositor::{compose, write_sprite};
use crate::config::SpriteConfig;
use crate::hashing::{hash_pixels, ContentHash};
use crate::layout::{CanvasSpec, LayoutEngine, SpriteLayout, StripLayout};
use crate::preload::build_preload;
use crate::stylesheet::build_stylesheet;
use crate::validation::{ConfigValidator, ConfigViolation};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Cannot parse configuration: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Nothing to draw: the sprite canvas has zero area")]
    EmptySprite,

    #[error("Layout invariant violated: {0}")]
    Layout(String),

    #[error("Layout references unknown icon {0:?}")]
    UnknownIcon(String),

    #[error("Cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Icon {name:?} decoded as {actual:?}, expected {expected:?}")]
    SizeMismatch {
        name: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Icon {name:?} ends at ({right}, {bottom}) outside the {width}x{height} canvas")]
    OutOfBounds {
        name: String,
        right: u32,
        bottom: u32,
        width: u32,
        height: u32,
    },

    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Everything decided before the first write.
#[derive(Debug, Clone, Serialize)]
pub struct SpritePlan {
    pub catalog: IconCatalog,
    pub layout: SpriteLayout,
    pub warnings: Vec<ConfigViolation>,
}

/// What a run wrote. `generated_at` is informational and never reaches an
/// artifact.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub hash: ContentHash,
    pub engine_version: String,
    pub icon_count: usize,
    pub canvas: CanvasSpec,
    pub sprite_files: Vec<PathBuf>,
    pub stylesheet_file: PathBuf,
    pub rule_count: usize,
    pub preload_file: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
}

/// The sprite pipeline. Holds no state between runs.
pub struct SpritePipeline {
    codec: Box<dyn ImageCodec>,
    layout: Box<dyn LayoutEngine>,
    validator: ConfigValidator,
}

impl SpritePipeline {
    pub fn new(codec: Box<dyn ImageCodec>, layout: Box<dyn LayoutEngine>) -> Self {
        Self {
            codec,
            layout,
            validator: ConfigValidator::new(),
        }
    }

    /// Check a configuration without touching the file system.
    pub fn validate(&self, config: &SpriteConfig) -> Result<Vec<ConfigViolation>, PipelineError> {
        let report = self.validator.validate(config);
        if !report.valid {
            return Err(PipelineError::Configuration(report.error_summary()));
        }
        for warning in report.warnings() {
            warn!("{}: {}", warning.rule, warning.message);
        }
        Ok(report.violations)
    }

    /// Validate, discover and lay out. Nothing is written.
    pub fn plan(&self, config: &SpriteConfig, source_root: &Path) -> Result<SpritePlan, PipelineError> {
        let warnings = self.validate(config)?;

        let catalog = IconCatalog::discover(config, source_root, self.codec.as_ref())?;
        progress!(
            config.verbose,
            "found {} icons in {}",
            catalog.len(),
            catalog.source_dir.display()
        );

        let layout = self.layout.layout(catalog.icons());
        check_layout(self.layout.name(), &layout, catalog.len())?;

        Ok(SpritePlan {
            catalog,
            layout,
            warnings,
        })
    }

    /// Run once for a build.
    ///
    /// The sprite goes under `output_root`; the stylesheet and the preload
    /// fragment go under `source_root`.
    pub fn run(
        &self,
        config: &SpriteConfig,
        source_root: &Path,
        output_root: &Path,
    ) -> Result<RunReport, PipelineError> {
        let plan = self.plan(config, source_root)?;

        let pixels = compose(&plan.layout, &plan.catalog, self.codec.as_ref())?;
        let hash = hash_pixels(&pixels);

        let outputs: Vec<String> = std::iter::once(config.dst.sprite_file.clone())
            .chain(config.dst.extra_sprite_files.iter().cloned())
            .collect();
        let sprite_files = write_sprite(&pixels, output_root, &outputs, self.codec.as_ref())?;
        for file in &sprite_files {
            progress!(config.verbose, "generated {}", file.display());
        }
        progress!(config.verbose, "sprite hash={}", hash);

        let stylesheet = build_stylesheet(&plan.layout, config, &hash);
        let stylesheet_file = source_root.join(&config.dst.css_file);
        write_text(&stylesheet_file, &stylesheet.to_string())?;
        progress!(config.verbose, "generated {}", stylesheet_file.display());

        let preload_file = match build_preload(config, &hash) {
            Some(fragment) => {
                let path = source_root.join(&fragment.file);
                write_text(&path, &fragment.to_string())?;
                progress!(config.verbose, "generated {}", path.display());
                Some(path)
            }
            None => {
                progress!(config.verbose, "no preload fragment configured");
                None
            }
        };

        Ok(RunReport {
            hash,
            engine_version: ENGINE_VERSION.to_string(),
            icon_count: plan.catalog.len(),
            canvas: plan.layout.canvas,
            sprite_files,
            stylesheet_file,
            rule_count: stylesheet.rule_count(),
            preload_file,
            generated_at: Utc::now(),
        })
    }
}

impl Default for SpritePipeline {
    fn default() -> Self {
        Self::new(Box::new(RasterCodec), Box::new(StripLayout))
    }
}

/// One rectangle per icon, all inside the canvas, none overlapping.
fn check_layout(engine: &str, layout: &SpriteLayout, icons: usize) -> Result<(), PipelineError> {
    if layout.rects.len() != icons {
        return Err(PipelineError::Layout(format!(
            "{} layout placed {} of {} icons",
            engine,
            layout.rects.len(),
            icons
        )));
    }
    for (i, rect) in layout.rects.iter().enumerate() {
        if !layout.canvas.contains(rect) {
            return Err(PipelineError::Layout(format!(
                "{} layout put {:?} outside the {}x{} canvas",
                engine, rect.name, layout.canvas.width, layout.canvas.height
            )));
        }
        if let Some(other) = layout.rects[i + 1..].iter().find(|o| rect.overlaps(o)) {
            return Err(PipelineError::Layout(format!(
                "{} layout overlaps {:?} and {:?}",
                engine, rect.name, other.name
            )));
        }
    }
    Ok(())
}

/// `create_dir_all` on the parent; succeeds if it already exists.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    fs::write(path, text).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}
