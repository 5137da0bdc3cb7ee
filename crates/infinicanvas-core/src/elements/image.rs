//! Image element payload and decoded-image metadata.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload of an image element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Image source (URL or data URL).
    pub src: String,
    /// Optional CSS filter string, e.g. `grayscale(100%)`.
    #[serde(default)]
    pub filter: Option<String>,
}

impl ImageContent {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filter: None,
        }
    }
}

/// An image the presentation layer finished loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedImage {
    pub src: String,
    /// Natural width in pixels.
    pub width: f64,
    /// Natural height in pixels.
    pub height: f64,
}

impl LoadedImage {
    /// Natural size scaled down proportionally to fit within `max` on both axes.
    ///
    /// Returns `None` for degenerate dimensions.
    pub fn fitted_size(&self, max: f64) -> Option<Size> {
        let (w, h) = (self.width, self.height);
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return None;
        }
        let scale = (max / w).min(max / h).min(1.0);
        Some(Size::new(w * scale, h * scale))
    }
}

/// Asynchronous image failures; the pending placement is dropped.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Image load cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitted_size_keeps_aspect_ratio() {
        let image = LoadedImage {
            src: "a.png".into(),
            width: 1000.0,
            height: 500.0,
        };
        let size = image.fitted_size(500.0).unwrap();
        assert!((size.width - 500.0).abs() < f64::EPSILON);
        assert!((size.height - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fitted_size_does_not_upscale() {
        let image = LoadedImage {
            src: "a.png".into(),
            width: 120.0,
            height: 80.0,
        };
        let size = image.fitted_size(500.0).unwrap();
        assert!((size.width - 120.0).abs() < f64::EPSILON);
        assert!((size.height - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fitted_size_rejects_degenerate() {
        let image = LoadedImage {
            src: "a.png".into(),
            width: 0.0,
            height: 80.0,
        };
        assert!(image.fitted_size(500.0).is_none());
    }
}
