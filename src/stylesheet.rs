//! Stylesheet Emission
//!
//! One main rule carrying the sprite URL, then one rule per icon in layout
//! order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SpriteConfig;
use crate::hashing::ContentHash;
use crate::layout::SpriteLayout;
use crate::GENERATOR;

/// Declarations added to the main rule when icons are rendered in `<span>`s.
const SPAN_DECLARATIONS: [(&str, &str); 3] = [
    ("display", "inline-block"),
    ("vertical-align", "middle"),
    ("content", "\" \""),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.selector)?;
        for decl in &self.declarations {
            write!(f, " {}: {};", decl.property, decl.value)?;
        }
        write!(f, " }}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/* Auto-generated by {} */", GENERATOR)?;
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// `<sprite url>?v=<hash>`, shared by the stylesheet and the preload hint.
pub fn versioned_sprite_url(config: &SpriteConfig, hash: &ContentHash) -> String {
    format!("{}?v={}", config.sprite_url(), hash)
}

pub fn build_stylesheet(
    layout: &SpriteLayout,
    config: &SpriteConfig,
    hash: &ContentHash,
) -> Stylesheet {
    let dst = &config.dst;
    let mut rules = Vec::with_capacity(layout.rects.len() + 1);

    let mut main = Vec::new();
    if dst.use_in_span {
        main.extend(
            SPAN_DECLARATIONS
                .iter()
                .map(|(p, v)| Declaration::new(*p, *v)),
        );
    }
    main.push(Declaration::new(
        "background-image",
        format!("url({})", versioned_sprite_url(config, hash)),
    ));
    rules.push(CssRule {
        selector: format!("{}{}", dst.css_main_class, dst.css_selector),
        declarations: main,
    });

    for rect in &layout.rects {
        rules.push(CssRule {
            selector: format!("{}{}{}", dst.css_prefix, rect.name, dst.css_selector),
            declarations: vec![
                Declaration::new(
                    "background-position",
                    format!("-{}px -{}px", rect.left, rect.top),
                ),
                Declaration::new("width", format!("{}px", rect.width)),
                Declaration::new("height", format!("{}px", rect.height)),
            ],
        });
    }

    Stylesheet { rules }
}
