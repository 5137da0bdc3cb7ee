//! Selection handles: corner resize handles and the rotate handle.
//!
//! Handles are laid out on each selected element's rotated box and live in screen space,
//! so their hit radius does not change with zoom.

use crate::elements::{Element, ElementId};
use crate::geometry::Corner;
use crate::scene::Scene;
use crate::viewport::Viewport;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels, for presentation.
pub const HANDLE_SIZE: f64 = 10.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner resize handle.
    Corner(Corner),
    /// Rotation handle above the top edge.
    Rotate,
}

/// A selection handle of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in screen coordinates.
    pub position: Point,
    pub kind: HandleKind,
    /// Element the handle belongs to.
    pub element: ElementId,
}

impl Handle {
    /// Check if a screen point lies within `radius` of this handle.
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        (point - self.position).hypot2() <= radius * radius
    }
}

/// Handles of one element: four corners then the rotate handle.
///
/// `rotate_offset` is the screen distance of the rotate handle above the top edge.
pub fn element_handles(element: &Element, viewport: &Viewport, rotate_offset: f64) -> Vec<Handle> {
    let g = &element.geometry;
    let to_screen = viewport.transform() * g.transform();
    let mut handles: Vec<Handle> = Corner::all()
        .into_iter()
        .map(|corner| Handle {
            position: to_screen * corner.local_position(g.size()),
            kind: HandleKind::Corner(corner),
            element: element.id,
        })
        .collect();

    // Local units per screen pixel along the element's axes
    let local_per_px = 1.0 / (viewport.zoom * g.scale);
    let rotate_local = Point::new(g.width / 2.0, -rotate_offset * local_per_px);
    handles.push(Handle {
        position: to_screen * rotate_local,
        kind: HandleKind::Rotate,
        element: element.id,
    });
    handles
}

/// Handles of every selected element, topmost element first.
pub fn selection_handles(scene: &Scene, rotate_offset: f64) -> Vec<Handle> {
    let selected: Vec<&Element> = scene.selection().collect();
    selected
        .into_iter()
        .rev()
        .flat_map(|e| element_handles(e, scene.viewport(), rotate_offset))
        .collect()
}

/// Find the handle of the current selection under a screen point.
pub fn hit_test_handles(
    scene: &Scene,
    screen_point: Point,
    radius: f64,
    rotate_offset: f64,
) -> Option<Handle> {
    selection_handles(scene, rotate_offset)
        .into_iter()
        .find(|h| h.hit_test(screen_point, radius))
}
