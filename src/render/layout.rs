use serde::{Deserialize, Serialize};

use crate::model::{Column, Layout, Position, Row};

/// Distance from the video edge for anchors without an explicit position.
pub const DEFAULT_EDGE_MARGIN: f64 = 0.05;
/// Font size as a fraction of the container height.
pub const DEFAULT_FONT_SCALE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest rectangle of the given aspect ratio that fits inside.
    pub fn fit_aspect(self, ratio: f64) -> Self {
        if self.width <= 0.0 || self.height <= 0.0 || ratio <= 0.0 {
            return self;
        }
        if self.width / self.height > ratio {
            Self::new(self.height * ratio, self.height)
        } else {
            Self::new(self.width, self.width / ratio)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizing {
    pub scale: f64,
    /// User preference applied on top of `scale`.
    pub multiplier: f64,
}

impl Default for FontSizing {
    fn default() -> Self {
        Self {
            scale: DEFAULT_FONT_SCALE,
            multiplier: 1.0,
        }
    }
}

impl FontSizing {
    pub fn font_size_px(&self, container: Dimensions) -> f64 {
        container.height * self.scale * self.multiplier
    }
}

/// Where a caption box goes, in the terms an overlay element takes:
/// offsets from the top-left corner in percent of the container, plus a
/// translate that moves the box's own anchor point onto that offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left_pct: f64,
    pub top_pct: f64,
    pub translate_x_pct: f64,
    pub translate_y_pct: f64,
    pub text_align: TextAlign,
    pub font_size_px: f64,
}

impl Placement {
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}%, {}%)",
            self.translate_x_pct, self.translate_y_pct
        )
    }
}

fn default_position(layout: &Layout) -> Position {
    let x = match layout.alignment.column() {
        Column::Left => DEFAULT_EDGE_MARGIN,
        Column::Center => 0.5,
        Column::Right => 1.0 - DEFAULT_EDGE_MARGIN,
    };
    let y = match layout.alignment.row() {
        Row::Top => DEFAULT_EDGE_MARGIN,
        Row::Middle => 0.5,
        Row::Bottom => 1.0 - DEFAULT_EDGE_MARGIN,
    };
    Position { x, y }
}

pub fn place(layout: &Layout, container: Dimensions, fonts: &FontSizing) -> Placement {
    let pos = layout.position.unwrap_or_else(|| default_position(layout));
    let (translate_x_pct, text_align) = match layout.alignment.column() {
        Column::Left => (0.0, TextAlign::Left),
        Column::Center => (-50.0, TextAlign::Center),
        Column::Right => (-100.0, TextAlign::Right),
    };
    let translate_y_pct = match layout.alignment.row() {
        Row::Top => 0.0,
        Row::Middle => -50.0,
        Row::Bottom => -100.0,
    };

    Placement {
        left_pct: pos.x.clamp(0.0, 1.0) * 100.0,
        top_pct: pos.y.clamp(0.0, 1.0) * 100.0,
        translate_x_pct,
        translate_y_pct,
        text_align,
        font_size_px: fonts.font_size_px(container),
    }
}
