//! Configuration - Immutable Defaults, Field-Level Overrides
//!
//! A run is driven by one resolved `SpriteConfig`. Users only ever supply a
//! `PartialSpriteConfig`; it is merged onto a fresh default, never onto a
//! shared instance.

use serde::{Deserialize, Deserializer, Serialize};

use crate::pipeline::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correspondence {
    pub icon_name: String,
    pub file_name: String,
}

impl Correspondence {
    pub fn new(icon_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            icon_name: icon_name.into(),
            file_name: file_name.into(),
        }
    }
}

/// Where the single icons come from, relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SrcConfig {
    pub dir: String,
    /// Used only when `correspondence` is `None`.
    pub extension: String,
    /// When set, only the listed files are used, in this order.
    pub correspondence: Option<Vec<Correspondence>>,
}

impl Default for SrcConfig {
    fn default() -> Self {
        Self {
            dir: "assets/sprite".to_string(),
            extension: ".png".to_string(),
            correspondence: None,
        }
    }
}

/// Output artifacts. `sprite_file` and `extra_sprite_files` are relative to
/// the output root; `css_file` and `preload_file` to the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DstConfig {
    pub sprite_file: String,
    pub css_main_class: String,
    pub css_file: String,
    pub css_prefix: String,
    /// Appended to every selector, e.g. `::before`.
    pub css_selector: String,
    pub preload_file: Option<String>,
    pub use_in_span: bool,
    /// Same pixels, other encodings. Never referenced by the stylesheet.
    pub extra_sprite_files: Vec<String>,
}

impl Default for DstConfig {
    fn default() -> Self {
        Self {
            sprite_file: "img/sprite.png".to_string(),
            css_main_class: ".sprite".to_string(),
            css_file: "css/sprite.css".to_string(),
            css_prefix: ".sprite-".to_string(),
            css_selector: String::new(),
            preload_file: Some("components/SpritePreload.html".to_string()),
            use_in_span: false,
            extra_sprite_files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpriteConfig {
    pub src: SrcConfig,
    pub dst: DstConfig,
    pub verbose: bool,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            src: SrcConfig::default(),
            dst: DstConfig::default(),
            verbose: true,
        }
    }
}

impl SpriteConfig {
    /// Merge a partial override onto a copy of `self`.
    pub fn merged(&self, partial: &PartialSpriteConfig) -> Self {
        let mut out = self.clone();
        if let Some(src) = &partial.src {
            src.apply(&mut out.src);
        }
        if let Some(dst) = &partial.dst {
            dst.apply(&mut out.dst);
        }
        if let Some(verbose) = partial.verbose {
            out.verbose = verbose;
        }
        out
    }

    /// Resolve a JSON override document against the fixed defaults.
    ///
    /// Unknown keys are rejected, so a misspelt field cannot be silently
    /// ignored.
    pub fn from_json_override(json: &str) -> Result<Self, PipelineError> {
        let partial: PartialSpriteConfig = serde_json::from_str(json)?;
        Ok(Self::default().merged(&partial))
    }

    /// Public URL of the sprite, as referenced from CSS and markup.
    pub fn sprite_url(&self) -> String {
        let path = self.dst.sprite_file.replace('\\', "/");
        format!("/{}", path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialSpriteConfig {
    #[serde(default)]
    pub src: Option<PartialSrcConfig>,
    #[serde(default)]
    pub dst: Option<PartialDstConfig>,
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialSrcConfig {
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    /// `null` switches back to directory scanning.
    #[serde(default, deserialize_with = "explicit_null")]
    pub correspondence: Option<Option<Vec<Correspondence>>>,
}

impl PartialSrcConfig {
    fn apply(&self, src: &mut SrcConfig) {
        if let Some(dir) = &self.dir {
            src.dir = dir.clone();
        }
        if let Some(extension) = &self.extension {
            src.extension = extension.clone();
        }
        if let Some(correspondence) = &self.correspondence {
            src.correspondence = correspondence.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialDstConfig {
    #[serde(default)]
    pub sprite_file: Option<String>,
    #[serde(default)]
    pub css_main_class: Option<String>,
    #[serde(default)]
    pub css_file: Option<String>,
    #[serde(default)]
    pub css_prefix: Option<String>,
    #[serde(default)]
    pub css_selector: Option<String>,
    /// `null` disables the preload fragment.
    #[serde(default, deserialize_with = "explicit_null")]
    pub preload_file: Option<Option<String>>,
    #[serde(default)]
    pub use_in_span: Option<bool>,
    #[serde(default)]
    pub extra_sprite_files: Option<Vec<String>>,
}

impl PartialDstConfig {
    fn apply(&self, dst: &mut DstConfig) {
        if let Some(v) = &self.sprite_file {
            dst.sprite_file = v.clone();
        }
        if let Some(v) = &self.css_main_class {
            dst.css_main_class = v.clone();
        }
        if let Some(v) = &self.css_file {
            dst.css_file = v.clone();
        }
        if let Some(v) = &self.css_prefix {
            dst.css_prefix = v.clone();
        }
        if let Some(v) = &self.css_selector {
            dst.css_selector = v.clone();
        }
        if let Some(v) = &self.preload_file {
            dst.preload_file = v.clone();
        }
        if let Some(v) = self.use_in_span {
            dst.use_in_span = v;
        }
        if let Some(v) = &self.extra_sprite_files {
            dst.extra_sprite_files = v.clone();
        }
    }
}

// Absent key -> None (keep default), `null` -> Some(None), value -> Some(Some(v)).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_override_is_default() {
        let config = SpriteConfig::from_json_override("{}").unwrap();
        assert_eq!(config, SpriteConfig::default());
    }

    #[test]
    fn test_nested_fields_merge_not_replace() {
        let config =
            SpriteConfig::from_json_override(r#"{"dst": {"cssPrefix": ".icon-"}}"#).unwrap();
        assert_eq!(config.dst.css_prefix, ".icon-");
        // Siblings keep their defaults
        assert_eq!(config.dst.sprite_file, "img/sprite.png");
        assert_eq!(config.dst.css_main_class, ".sprite");
        assert_eq!(config.src, SrcConfig::default());
    }

    #[test]
    fn test_merge_does_not_touch_base() {
        let base = SpriteConfig::default();
        let partial = PartialSpriteConfig {
            verbose: Some(false),
            src: Some(PartialSrcConfig {
                dir: Some("icons".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = base.merged(&partial);
        assert_eq!(merged.src.dir, "icons");
        assert!(!merged.verbose);
        assert_eq!(base, SpriteConfig::default());
    }

    #[test]
    fn test_preload_null_disables() {
        let config =
            SpriteConfig::from_json_override(r#"{"dst": {"preloadFile": null}}"#).unwrap();
        assert_eq!(config.dst.preload_file, None);

        let config = SpriteConfig::from_json_override(r#"{"dst": {}}"#).unwrap();
        assert!(config.dst.preload_file.is_some());
    }

    #[test]
    fn test_correspondence_override() {
        let json = r#"{"src": {"correspondence": [
            {"iconName": "home", "fileName": "house.png"},
            {"iconName": "mail", "fileName": "envelope.png"}
        ]}}"#;
        let config = SpriteConfig::from_json_override(json).unwrap();
        assert!(config.src.correspondence.is_some());
        let entries = config.src.correspondence.unwrap();
        assert_eq!(entries[0], Correspondence::new("home", "house.png"));
        assert_eq!(entries[1].icon_name, "mail");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = SpriteConfig::from_json_override(r#"{"dst": {"cssPrefx": ".icon-"}}"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Serialization(_)));
        assert!(err.to_string().contains("cssPrefx"));

        assert!(SpriteConfig::from_json_override(r#"{"source": {}}"#).is_err());
        assert!(SpriteConfig::from_json_override(r#"{"src": {"ext": ".png"}}"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = SpriteConfig::from_json_override(r#"{"verbose": "yes"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Serialization(_)));
    }

    #[test]
    fn test_sprite_url() {
        let mut config = SpriteConfig::default();
        assert_eq!(config.sprite_url(), "/img/sprite.png");
        config.dst.sprite_file = "img\\icons.webp".into();
        assert_eq!(config.sprite_url(), "/img/icons.webp");
    }
}
