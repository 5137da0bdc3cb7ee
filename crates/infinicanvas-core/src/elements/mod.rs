//! Scene elements: shared geometry plus a closed set of kind payloads.

mod image;
mod style;
mod text;

pub use image::{ImageContent, ImageLoadError, LoadedImage};
pub use style::{PolygonKind, PolygonShape, SerializableColor, ShapeStyle};
pub use text::{DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, TextAlign, TextContent, TextDecoration};

use crate::geometry::{clamp_dimension, normalize_degrees};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

fn default_scale() -> f64 {
    1.0
}

/// Position, size and transform shared by every element kind.
///
/// `x`/`y` is the top-left corner in canvas space. Rotation is in degrees about the
/// box center and the uniform scale is applied about the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: clamp_dimension(width),
            height: clamp_dimension(height),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Geometry of the given size whose box is centered on `center`.
    pub fn centered_on(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Axis-aligned bounds in canvas space, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.width * self.scale,
            self.y + self.height * self.scale,
        )
    }

    /// Rotation pivot in canvas space.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Local-to-canvas transform; local space spans `(0, 0)..(width, height)`.
    pub fn transform(&self) -> Affine {
        let local_center = Point::new(self.width / 2.0, self.height / 2.0);
        Affine::translate((self.x, self.y))
            * Affine::scale(self.scale)
            * Affine::rotate_about(self.rotation.to_radians(), local_center)
    }

    /// Rotation-aware containment test for a canvas point.
    pub fn contains(&self, point: Point) -> bool {
        let local = self.transform().inverse() * point;
        local.x >= 0.0 && local.x <= self.width && local.y >= 0.0 && local.y <= self.height
    }

    pub fn is_finite(&self) -> bool {
        [
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation,
            self.scale,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Copy with every field forced into its valid range.
    pub fn sanitized(&self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            x: finite_or(self.x, 0.0),
            y: finite_or(self.y, 0.0),
            width: clamp_dimension(self.width),
            height: clamp_dimension(self.height),
            rotation: normalize_degrees(self.rotation),
            scale: if self.scale.is_finite() && self.scale > 0.0 {
                self.scale
            } else {
                1.0
            },
        }
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Rectangle(ShapeStyle),
    Ellipse(ShapeStyle),
    Polygon(PolygonShape),
    Image(ImageContent),
    Text(TextContent),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Rectangle(_) => "rectangle",
            ElementKind::Ellipse(_) => "ellipse",
            ElementKind::Polygon(_) => "polygon",
            ElementKind::Image(_) => "image",
            ElementKind::Text(_) => "text",
        }
    }

    /// Fill/stroke style, for the kinds that have one.
    pub fn style(&self) -> Option<&ShapeStyle> {
        match self {
            ElementKind::Rectangle(style) | ElementKind::Ellipse(style) => Some(style),
            ElementKind::Polygon(polygon) => Some(&polygon.style),
            ElementKind::Image(_) | ElementKind::Text(_) => None,
        }
    }

    fn style_mut(&mut self) -> Option<&mut ShapeStyle> {
        match self {
            ElementKind::Rectangle(style) | ElementKind::Ellipse(style) => Some(style),
            ElementKind::Polygon(polygon) => Some(&mut polygon.style),
            ElementKind::Image(_) | ElementKind::Text(_) => None,
        }
    }
}

/// An element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub z_index: u64,
    #[serde(default)]
    pub selected: bool,
    #[serde(skip)]
    pub is_dragging: bool,
    #[serde(skip)]
    pub is_highlighted: bool,
    pub kind: ElementKind,
}

impl Element {
    pub(crate) fn from_draft(draft: ElementDraft, id: ElementId, z_index: u64) -> Self {
        Self {
            id,
            geometry: draft.geometry.sanitized(),
            z_index,
            selected: false,
            is_dragging: false,
            is_highlighted: false,
            kind: draft.kind,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    /// Copy without transient interaction flags.
    pub fn persisted(&self) -> Self {
        Self {
            is_dragging: false,
            is_highlighted: false,
            ..self.clone()
        }
    }

    /// Description for creating an equivalent element elsewhere.
    pub fn to_draft(&self) -> ElementDraft {
        ElementDraft {
            geometry: self.geometry,
            kind: self.kind.clone(),
        }
    }
}

/// Everything needed to add an element; the store assigns id and z-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDraft {
    #[serde(flatten)]
    pub geometry: Geometry,
    pub kind: ElementKind,
}

impl ElementDraft {
    pub fn new(geometry: Geometry, kind: ElementKind) -> Self {
        Self { geometry, kind }
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Geometry::new(x, y, width, height),
            ElementKind::Rectangle(ShapeStyle::default()),
        )
    }
}

/// Partial update merged into an element. `None` leaves a field untouched.
///
/// Geometry values are clamped and normalized on apply; style fields only touch kinds that
/// carry them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
    pub fill: Option<Option<SerializableColor>>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub filter: Option<Option<String>>,
    pub text: Option<TextContent>,
}

impl ElementPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn fill(fill: Option<SerializableColor>) -> Self {
        Self {
            fill: Some(fill),
            ..Self::default()
        }
    }

    pub fn stroke(stroke: SerializableColor, width: f64) -> Self {
        Self {
            stroke: Some(stroke),
            stroke_width: Some(width),
            ..Self::default()
        }
    }

    pub fn filter(filter: Option<String>) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn text(text: TextContent) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    /// Merge into `element`. Returns whether anything changed.
    pub(crate) fn apply(&self, element: &mut Element) -> bool {
        let before = element.clone();
        let g = &mut element.geometry;
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());

        if let Some(x) = finite(self.x) {
            g.x = x;
        }
        if let Some(y) = finite(self.y) {
            g.y = y;
        }
        if let Some(width) = finite(self.width) {
            g.width = clamp_dimension(width);
        }
        if let Some(height) = finite(self.height) {
            g.height = clamp_dimension(height);
        }
        if let Some(rotation) = finite(self.rotation) {
            g.rotation = normalize_degrees(rotation);
        }
        if let Some(scale) = finite(self.scale).filter(|s| *s > 0.0) {
            g.scale = scale;
        }

        if let Some(style) = element.kind.style_mut() {
            if let Some(fill) = self.fill {
                style.fill = fill;
            }
            if let Some(stroke) = self.stroke {
                style.stroke = stroke;
            }
            if let Some(width) = finite(self.stroke_width).filter(|w| *w >= 0.0) {
                style.stroke_width = width;
            }
        }
        match &mut element.kind {
            ElementKind::Image(image) => {
                if let Some(filter) = &self.filter {
                    image.filter = filter.clone();
                }
            }
            ElementKind::Text(text) => {
                if let Some(content) = &self.text {
                    *text = content.clone();
                }
            }
            _ => {}
        }

        *element != before
    }
}
