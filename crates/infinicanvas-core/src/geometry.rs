//! Pure geometry helpers: rotation math, handle-driven resize and AABB overlap.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width or height an element may have, in canvas units.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    #[serde(rename = "nw")]
    TopLeft,
    #[serde(rename = "ne")]
    TopRight,
    #[serde(rename = "sw")]
    BottomLeft,
    #[serde(rename = "se")]
    BottomRight,
}

impl Corner {
    /// All corners, in handle order.
    pub fn all() -> [Corner; 4] {
        [
            Corner::TopLeft,
            Corner::TopRight,
            Corner::BottomLeft,
            Corner::BottomRight,
        ]
    }

    /// Signs mapping a pointer delta (dx, dy) onto a (width, height) delta.
    pub fn resize_signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    /// Position of this corner on a box of the given size with its origin at (0, 0).
    pub fn local_position(self, size: Size) -> Point {
        match self {
            Corner::TopLeft => Point::new(0.0, 0.0),
            Corner::TopRight => Point::new(size.width, 0.0),
            Corner::BottomLeft => Point::new(0.0, size.height),
            Corner::BottomRight => Point::new(size.width, size.height),
        }
    }
}

/// Normalize an angle in degrees into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Clamp a width or height to the minimum element size.
pub fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.max(MIN_ELEMENT_SIZE)
    } else {
        MIN_ELEMENT_SIZE
    }
}

/// Width/height delta produced by dragging `corner` by `delta` (canvas units).
pub fn handle_resize_delta(corner: Corner, delta: Vec2) -> Vec2 {
    let (sx, sy) = corner.resize_signs();
    Vec2::new(sx * delta.x, sy * delta.y)
}

/// Resize a box by dragging one of its corner handles.
///
/// The result never falls below [`MIN_ELEMENT_SIZE`] on either axis.
pub fn resize_by_handle(size: Size, corner: Corner, delta: Vec2) -> Size {
    let d = handle_resize_delta(corner, delta);
    Size::new(
        clamp_dimension(size.width + d.x),
        clamp_dimension(size.height + d.y),
    )
}

/// Signed angle in degrees swept from `from` to `to` around `center`.
///
/// The result lies in `(-180, 180]`, positive meaning clockwise on screen (y down).
/// Returns 0 when either point coincides with the center.
pub fn rotation_delta(center: Point, from: Point, to: Point) -> f64 {
    let a = from - center;
    let b = to - center;
    if a.hypot2() == 0.0 || b.hypot2() == 0.0 {
        return 0.0;
    }
    let mut delta = (b.y.atan2(b.x) - a.y.atan2(a.x)).to_degrees() % 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// Rotation after adding `delta` degrees, normalized into `[0, 360)`.
pub fn rotate_about_center(rotation: f64, delta: f64) -> f64 {
    normalize_degrees(rotation + delta)
}

/// Axis-aligned overlap test. Rectangles that merely touch do not overlap.
pub fn aabb_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_se_grows() {
        let size = resize_by_handle(
            Size::new(100.0, 100.0),
            Corner::BottomRight,
            Vec2::new(20.0, 20.0),
        );
        assert!((size.width - 120.0).abs() < f64::EPSILON);
        assert!((size.height - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_nw_clamps_to_minimum() {
        let size = resize_by_handle(
            Size::new(100.0, 100.0),
            Corner::TopLeft,
            Vec2::new(200.0, 200.0),
        );
        assert!((size.width - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!((size.height - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_sign_table() {
        let base = Size::new(100.0, 100.0);
        let delta = Vec2::new(5.0, 7.0);

        let ne = resize_by_handle(base, Corner::TopRight, delta);
        assert!((ne.width - 105.0).abs() < f64::EPSILON);
        assert!((ne.height - 93.0).abs() < f64::EPSILON);

        let sw = resize_by_handle(base, Corner::BottomLeft, delta);
        assert!((sw.width - 95.0).abs() < f64::EPSILON);
        assert!((sw.height - 107.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-9);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-9);
        assert!((normalize_degrees(360.0)).abs() < f64::EPSILON);
        assert!((normalize_degrees(f64::NAN)).abs() < f64::EPSILON);
        let tiny = normalize_degrees(-1e-20);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_rotation_delta_quarter_turn() {
        let center = Point::new(50.0, 50.0);
        let from = Point::new(100.0, 50.0);
        let to = Point::new(50.0, 100.0);
        assert!((rotation_delta(center, from, to) - 90.0).abs() < 1e-9);
        assert!((rotation_delta(center, to, from) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_delta_wraps_across_pi() {
        let center = Point::ZERO;
        let from = Point::new(-10.0, -0.1);
        let to = Point::new(-10.0, 0.1);
        let delta = rotation_delta(center, from, to);
        assert!(delta < 0.0 && delta > -2.0);
    }

    #[test]
    fn test_rotation_delta_degenerate() {
        let center = Point::new(5.0, 5.0);
        assert!(rotation_delta(center, center, Point::new(10.0, 5.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(aabb_overlap(a, Rect::new(50.0, 50.0, 150.0, 150.0)));
        // Touching edges do not count.
        assert!(!aabb_overlap(a, Rect::new(100.0, 0.0, 200.0, 100.0)));
        assert!(!aabb_overlap(a, Rect::new(300.0, 300.0, 400.0, 400.0)));
    }
}
