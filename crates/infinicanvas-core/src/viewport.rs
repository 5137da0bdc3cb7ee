//! Viewport pan/zoom transform between screen space and canvas space.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom scale.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom scale.
pub const MAX_ZOOM: f64 = 5.0;

/// Clamp a zoom scale into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input maps to 1.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// The pan offset and zoom scale that map canvas space onto the screen.
///
/// `screen = canvas * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Translation in screen pixels.
    pub pan: Vec2,
    /// Zoom scale, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport, clamping the zoom.
    pub fn new(pan: Vec2, zoom: f64) -> Self {
        Self {
            pan,
            zoom: clamp_zoom(zoom),
        }
    }

    /// Canvas-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen-to-canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.pan.x) / self.zoom,
            (screen_point.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        Point::new(
            canvas_point.x * self.zoom + self.pan.x,
            canvas_point.y * self.zoom + self.pan.y,
        )
    }

    /// Convert a screen-space delta into canvas units.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Viewport panned by a screen-space delta.
    pub fn panned(&self, delta: Vec2) -> Self {
        Self {
            pan: self.pan + delta,
            zoom: self.zoom,
        }
    }

    /// Viewport zoomed by `factor`, keeping the canvas point under `screen_pivot` fixed.
    ///
    /// The resulting zoom is clamped. Non-finite or non-positive factors leave the viewport unchanged.
    pub fn zoomed_about(&self, screen_pivot: Point, factor: f64) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return *self;
        }
        let new_zoom = clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return *self;
        }

        // Canvas point under the pivot before zooming
        let anchor = self.screen_to_canvas(screen_pivot);
        let pan = Vec2::new(
            screen_pivot.x - anchor.x * new_zoom,
            screen_pivot.y - anchor.y * new_zoom,
        );
        Self {
            pan,
            zoom: new_zoom,
        }
    }

    /// Apply a partial update, clamping the zoom.
    pub fn patched(&self, patch: &ViewportPatch) -> Self {
        let pan = match patch.pan {
            Some(pan) if pan.x.is_finite() && pan.y.is_finite() => pan,
            _ => self.pan,
        };
        let zoom = match patch.zoom {
            Some(zoom) if zoom.is_finite() => clamp_zoom(zoom),
            _ => self.zoom,
        };
        Self { pan, zoom }
    }

    /// Repair non-finite or out-of-range fields.
    pub fn sanitized(&self) -> Self {
        let pan = if self.pan.x.is_finite() && self.pan.y.is_finite() {
            self.pan
        } else {
            Vec2::ZERO
        };
        Self::new(pan, self.zoom)
    }
}

/// Partial viewport update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportPatch {
    #[serde(default)]
    pub pan: Option<Vec2>,
    #[serde(default)]
    pub zoom: Option<f64>,
}

impl ViewportPatch {
    /// Patch that restores the default pan and zoom.
    pub fn reset() -> Self {
        Self {
            pan: Some(Vec2::ZERO),
            zoom: Some(1.0),
        }
    }
}

impl From<Viewport> for ViewportPatch {
    fn from(viewport: Viewport) -> Self {
        Self {
            pan: Some(viewport.pan),
            zoom: Some(viewport.zoom),
        }
    }
}
