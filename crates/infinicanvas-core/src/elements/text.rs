//! Text element payload.
//!
//! Editing of the content happens in an external rich-text widget; the engine only
//! stores what that widget reports.

use super::style::SerializableColor;
use serde::{Deserialize, Serialize};

/// Default box size of a newly placed text element.
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
pub const DEFAULT_TEXT_HEIGHT: f64 = 50.0;

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Line decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

/// Content and typography of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    pub color: SerializableColor,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub decoration: TextDecoration,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            content: "Click to edit".to_string(),
            font_size: 16.0,
            font_family: "Arial".to_string(),
            color: SerializableColor::new(0x33, 0x33, 0x33, 255),
            bold: false,
            italic: false,
            align: TextAlign::Left,
            decoration: TextDecoration::None,
        }
    }
}

impl TextContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}
