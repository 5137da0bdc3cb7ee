//! Rubber-band (marquee) selection.
//!
//! The marquee is tracked in screen space while dragging and converted to canvas space
//! once, on release, with the viewport of that moment. Overlap is AABB-only: element
//! rotation is ignored.

use crate::elements::ElementId;
use crate::geometry::aabb_overlap;
use crate::scene::{Scene, SceneStore};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// How a finished marquee combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarqueeMode {
    /// Replace the selection; an empty hit set clears it.
    #[default]
    Replace,
    /// Add hits to the selection; an empty hit set leaves it alone.
    Add,
}

/// A marquee being dragged, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marquee {
    pub origin: Point,
    pub current: Point,
    pub mode: MarqueeMode,
}

impl Marquee {
    pub fn new(origin: Point, mode: MarqueeMode) -> Self {
        Self {
            origin,
            current: origin,
            mode,
        }
    }

    /// Move the live corner.
    pub fn update(&mut self, current: Point) {
        self.current = current;
    }

    /// Normalized rectangle in screen space.
    pub fn screen_rect(&self) -> Rect {
        Rect::from_points(self.origin, self.current)
    }

    /// Normalized rectangle in canvas space under `viewport`.
    pub fn canvas_rect(&self, viewport: &Viewport) -> Rect {
        Rect::from_points(
            viewport.screen_to_canvas(self.origin),
            viewport.screen_to_canvas(self.current),
        )
    }

    /// Whether the marquee is too small on both axes to count as a drag.
    pub fn is_click_through(&self, threshold: f64) -> bool {
        let rect = self.screen_rect();
        rect.width() <= threshold && rect.height() <= threshold
    }
}

/// Ids of elements whose AABB overlaps `rect` (canvas space), in paint order.
pub fn elements_in_rect(scene: &Scene, rect: Rect) -> Vec<ElementId> {
    scene
        .elements()
        .iter()
        .filter(|e| aabb_overlap(e.bounds(), rect))
        .map(|e| e.id)
        .collect()
}

/// Apply a finished marquee to the store. Returns the ids it hit.
pub fn apply_marquee(store: &mut SceneStore, marquee: &Marquee) -> Vec<ElementId> {
    let rect = marquee.canvas_rect(store.scene().viewport());
    let hits = elements_in_rect(store.scene(), rect);
    log::debug!("marquee {:?} hit {} element(s)", rect, hits.len());
    match (marquee.mode, hits.is_empty()) {
        (MarqueeMode::Replace, true) => store.clear_selection(),
        (MarqueeMode::Replace, false) => store.set_selection(hits.iter().copied()),
        (MarqueeMode::Add, _) => store.extend_selection(hits.iter().copied()),
    }
    hits
}
