//! Configuration Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Any `Error` violation aborts the run before the first byte is read.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::codec::SpriteFormat;
use crate::config::SpriteConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub remediation: Vec<String>,
}

impl ConfigViolation {
    fn error(rule: &str, message: impl Into<String>, remediation: &str) -> Self {
        Self {
            rule: rule.to_string(),
            severity: ViolationSeverity::Error,
            message: message.into(),
            remediation: vec![remediation.to_string()],
        }
    }

    fn warning(rule: &str, message: impl Into<String>, remediation: &str) -> Self {
        Self {
            severity: ViolationSeverity::Warning,
            ..Self::error(rule, message, remediation)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<ConfigViolation>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ConfigViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Warning)
    }

    /// "rule: message; rule: message" over the errors only.
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Configuration rule trait - produces violations
pub trait ConfigRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, config: &SpriteConfig) -> Vec<ConfigViolation>;
}

// --- Concrete Rules ---

pub struct PathsRule;

impl ConfigRule for PathsRule {
    fn name(&self) -> &'static str { "paths" }

    fn check(&self, config: &SpriteConfig) -> Vec<ConfigViolation> {
        let mut violations = vec![];
        let mut required = vec![
            ("src.dir".to_string(), Some(&config.src.dir)),
            ("dst.spriteFile".to_string(), Some(&config.dst.sprite_file)),
            ("dst.cssFile".to_string(), Some(&config.dst.css_file)),
            ("dst.preloadFile".to_string(), config.dst.preload_file.as_ref()),
        ];
        for (i, extra) in config.dst.extra_sprite_files.iter().enumerate() {
            required.push((format!("dst.extraSpriteFiles[{}]", i), Some(extra)));
        }

        for (field, value) in required {
            let Some(value) = value else { continue };
            if value.trim().is_empty() {
                violations.push(ConfigViolation::error(
                    self.name(),
                    format!("{} is empty", field),
                    "Provide a relative path or remove the override",
                ));
            } else if field.starts_with("dst.") && Path::new(value).is_absolute() {
                violations.push(ConfigViolation::error(
                    self.name(),
                    format!("{} must be relative, got {}", field, value),
                    "Output paths are resolved against the source or output root",
                ));
            }
        }
        violations
    }
}

pub struct DiscoveryRule;

impl ConfigRule for DiscoveryRule {
    fn name(&self) -> &'static str { "discovery" }

    fn check(&self, config: &SpriteConfig) -> Vec<ConfigViolation> {
        let mut violations = vec![];
        match &config.src.correspondence {
            None => {
                let extension = &config.src.extension;
                if !extension.starts_with('.') || extension.len() < 2 {
                    violations.push(ConfigViolation::error(
                        self.name(),
                        format!("src.extension must look like \".png\", got {:?}", extension),
                        "Set src.extension to a dotted file extension",
                    ));
                } else if !input_readable(extension) {
                    violations.push(self.unreadable("src.extension", extension));
                }
            }
            Some(entries) if entries.is_empty() => violations.push(ConfigViolation::error(
                self.name(),
                "src.correspondence is empty",
                "List at least one icon, or set correspondence to null to scan src.dir",
            )),
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if entry.icon_name.trim().is_empty() || entry.file_name.trim().is_empty() {
                        violations.push(ConfigViolation::error(
                            self.name(),
                            format!("src.correspondence[{}] has an empty iconName or fileName", i),
                            "Every entry needs both iconName and fileName",
                        ));
                    } else if let Some(ext) = Path::new(&entry.file_name).extension() {
                        if !input_readable(&ext.to_string_lossy()) {
                            let field = format!("src.correspondence[{}].fileName", i);
                            violations.push(self.unreadable(&field, &entry.file_name));
                        }
                    }
                }
            }
        }
        violations
    }
}

impl DiscoveryRule {
    fn unreadable(&self, field: &str, value: &str) -> ConfigViolation {
        ConfigViolation::error(
            self.name(),
            format!("{} {:?}: AVIF icons cannot be decoded", field, value),
            "Convert the icons to PNG or WEBP; AVIF is supported as a sprite output only",
        )
    }
}

// Unknown extensions are left to the codec; only known write-only formats fail here.
fn input_readable(extension: &str) -> bool {
    SpriteFormat::from_extension(extension).map_or(true, SpriteFormat::is_decodable)
}

pub struct UniqueNamesRule;

impl ConfigRule for UniqueNamesRule {
    fn name(&self) -> &'static str { "unique_names" }

    fn check(&self, config: &SpriteConfig) -> Vec<ConfigViolation> {
        let Some(entries) = &config.src.correspondence else {
            return vec![];
        };
        let mut seen = HashSet::new();
        entries
            .iter()
            .filter(|e| !seen.insert(e.icon_name.as_str()))
            .map(|e| {
                ConfigViolation::error(
                    self.name(),
                    format!("icon name {:?} is listed more than once", e.icon_name),
                    "Give each icon a distinct iconName",
                )
            })
            .collect()
    }
}

pub struct SpriteFormatRule;

impl ConfigRule for SpriteFormatRule {
    fn name(&self) -> &'static str { "sprite_format" }

    fn check(&self, config: &SpriteConfig) -> Vec<ConfigViolation> {
        std::iter::once(&config.dst.sprite_file)
            .chain(config.dst.extra_sprite_files.iter())
            .filter(|file| !file.trim().is_empty() && SpriteFormat::from_path(file).is_none())
            .map(|file| {
                ConfigViolation::error(
                    self.name(),
                    format!("cannot encode sprite as {}", file),
                    "Use a .png, .webp or .avif file name",
                )
            })
            .collect()
    }
}

pub struct CssIdentifierRule;

impl ConfigRule for CssIdentifierRule {
    fn name(&self) -> &'static str { "css_identifiers" }

    fn check(&self, config: &SpriteConfig) -> Vec<ConfigViolation> {
        let mut violations = vec![];
        for (field, value) in [
            ("dst.cssMainClass", &config.dst.css_main_class),
            ("dst.cssPrefix", &config.dst.css_prefix),
        ] {
            match value.chars().next() {
                None => violations.push(ConfigViolation::error(
                    self.name(),
                    format!("{} is empty", field),
                    "Use a selector such as \".sprite\"",
                )),
                Some(c) if c != '.' && c != '#' && !c.is_ascii_alphabetic() => {
                    violations.push(ConfigViolation::warning(
                        self.name(),
                        format!("{} {:?} does not look like a selector", field, value),
                        "Selectors usually start with '.', '#' or an element name",
                    ))
                }
                Some(_) => {}
            }
        }
        violations
    }
}

/// Validator orchestrates rules
pub struct ConfigValidator {
    rules: Vec<Box<dyn ConfigRule>>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(PathsRule),
                Box::new(DiscoveryRule),
                Box::new(UniqueNamesRule),
                Box::new(SpriteFormatRule),
                Box::new(CssIdentifierRule),
            ],
        }
    }

    pub fn validate(&self, config: &SpriteConfig) -> ValidationReport {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(config))
            .collect();

        // Warnings never block
        let valid = !violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        ValidationReport { valid, violations }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
