//! Icon Discovery
//!
//! Builds the ordered icon sequence every later stage consumes. The index
//! assigned here is the icon's position in the sprite.

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::ImageCodec;
use crate::config::SpriteConfig;
use crate::pipeline::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    Correspondence,
    DirectoryScan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// Position in discovery order.
    pub index: usize,
    pub name: String,
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Icon {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Ordered, immutable result of discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCatalog {
    pub mode: DiscoveryMode,
    pub source_dir: PathBuf,
    icons: Vec<Icon>,
}

struct Candidate {
    name: String,
    path: PathBuf,
}

impl IconCatalog {
    /// Discover icons under `source_root/config.src.dir`.
    ///
    /// Missing manifest files are skipped. Unreadable metadata falls back to
    /// a 0x0 icon with a warning. Only a missing source directory is fatal.
    pub fn discover(
        config: &SpriteConfig,
        source_root: &Path,
        codec: &dyn ImageCodec,
    ) -> Result<Self, PipelineError> {
        let source_dir = source_root.join(&config.src.dir);
        if !source_dir.is_dir() {
            return Err(PipelineError::SourceNotFound(source_dir));
        }

        let (mode, candidates) = match &config.src.correspondence {
            Some(entries) => {
                let candidates: Vec<Candidate> = entries
                    .iter()
                    .filter_map(|entry| {
                        let path = source_dir.join(&entry.file_name);
                        if path.is_file() {
                            Some(Candidate {
                                name: entry.icon_name.clone(),
                                path,
                            })
                        } else {
                            warn!(
                                "icon {:?}: {} does not exist, skipped",
                                entry.icon_name,
                                path.display()
                            );
                            None
                        }
                    })
                    .collect();
                (DiscoveryMode::Correspondence, candidates)
            }
            None => (
                DiscoveryMode::DirectoryScan,
                scan_dir(&source_dir, &config.src.extension)?,
            ),
        };

        // Indexed parallel iterator: output order is input order.
        let icons = candidates
            .into_par_iter()
            .enumerate()
            .map(|(index, candidate)| read_icon(index, candidate, codec))
            .collect();

        Ok(Self {
            mode,
            source_dir,
            icons,
        })
    }

    pub fn from_icons(mode: DiscoveryMode, source_dir: PathBuf, icons: Vec<Icon>) -> Self {
        Self {
            mode,
            source_dir,
            icons,
        }
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Icon> {
        self.icons.iter()
    }
}

/// Regular files ending in `extension`, ordered by file name.
fn scan_dir(dir: &Path, extension: &str) -> Result<Vec<Candidate>, PipelineError> {
    let read_err = |source| PipelineError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = vec![];
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !path.is_file() || !file_name.ends_with(extension) {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name.as_str())
            .to_string();
        candidates.push((file_name, Candidate { name, path }));
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(candidates.into_iter().map(|(_, c)| c).collect())
}

fn read_icon(index: usize, candidate: Candidate, codec: &dyn ImageCodec) -> Icon {
    let (width, height) = match codec.dimensions(&candidate.path) {
        Ok(dims) => dims,
        Err(e) => {
            warn!(
                "icon {:?}: cannot read dimensions of {} ({}), using 0x0",
                candidate.name,
                candidate.path.display(),
                e
            );
            (0, 0)
        }
    };
    Icon {
        index,
        name: candidate.name,
        source_path: candidate.path,
        width,
        height,
    }
}
