//! Sprite Layout
//!
//! A `LayoutEngine` places every icon on the canvas. Rectangles must not
//! overlap, must stay inside the canvas, and come back in icon order.

use serde::{Deserialize, Serialize};

use crate::catalog::Icon;

/// Placement of one icon inside the sprite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Index of the icon in the catalog.
    pub icon: usize,
    pub name: String,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Derived canvas size. Never set independently of the rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
}

impl CanvasSpec {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, rect: &Rectangle) -> bool {
        rect.right() <= self.width && rect.bottom() <= self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteLayout {
    pub canvas: CanvasSpec,
    pub rects: Vec<Rectangle>,
}

impl SpriteLayout {
    /// Bounding box of a set of rectangles.
    pub fn enclosing(rects: Vec<Rectangle>) -> Self {
        let canvas = CanvasSpec {
            width: rects.iter().map(Rectangle::right).max().unwrap_or(0),
            height: rects.iter().map(Rectangle::bottom).max().unwrap_or(0),
        };
        Self { canvas, rects }
    }
}

pub trait LayoutEngine: Send + Sync {
    fn name(&self) -> &'static str;
    fn layout(&self, icons: &[Icon]) -> SpriteLayout;
}

/// Single-row strip packing: left to right, all tops at 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripLayout;

impl LayoutEngine for StripLayout {
    fn name(&self) -> &'static str { "strip" }

    fn layout(&self, icons: &[Icon]) -> SpriteLayout {
        let mut left = 0;
        let rects = icons
            .iter()
            .map(|icon| {
                let rect = Rectangle {
                    icon: icon.index,
                    name: icon.name.clone(),
                    left,
                    top: 0,
                    width: icon.width,
                    height: icon.height,
                };
                left += icon.width;
                rect
            })
            .collect();

        SpriteLayout::enclosing(rects)
    }
}
