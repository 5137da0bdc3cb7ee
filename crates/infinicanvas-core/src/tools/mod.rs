//! Creation tools and their default placement.

use crate::elements::{
    DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, ElementDraft, ElementKind, Geometry, PolygonKind,
    PolygonShape, ShapeStyle, TextContent,
};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Default box of a newly placed shape.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Outline produced by the shape tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Polygon(PolygonKind),
}

/// Shape tool payload chosen in the pattern picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeTemplate {
    pub shape: ShapeKind,
    #[serde(default)]
    pub style: ShapeStyle,
    #[serde(default = "ShapeTemplate::default_size")]
    pub size: Size,
}

impl ShapeTemplate {
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            style: ShapeStyle::default(),
            size: Self::default_size(),
        }
    }

    fn default_size() -> Size {
        Size::new(DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE)
    }

    fn kind(&self) -> ElementKind {
        let style = self.style.clone();
        match self.shape {
            ShapeKind::Rectangle => ElementKind::Rectangle(style),
            ShapeKind::Ellipse => ElementKind::Ellipse(style),
            ShapeKind::Polygon(polygon) => ElementKind::Polygon(PolygonShape { polygon, style }),
        }
    }
}

/// Active creation tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Tool {
    #[default]
    Select,
    Shape(ShapeTemplate),
    Text(TextContent),
    /// Placement waits for an image to be picked and decoded.
    Image,
}

impl Tool {
    pub fn text() -> Self {
        Tool::Text(TextContent::default())
    }

    pub fn shape(shape: ShapeKind) -> Self {
        Tool::Shape(ShapeTemplate::new(shape))
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Tool::Select)
    }

    /// Element created by clicking at `center` (canvas space), if this tool places one
    /// synchronously.
    pub fn draft_at(&self, center: Point) -> Option<ElementDraft> {
        match self {
            Tool::Select | Tool::Image => None,
            Tool::Shape(template) => Some(ElementDraft::new(
                Geometry::centered_on(center, template.size),
                template.kind(),
            )),
            Tool::Text(text) => Some(ElementDraft::new(
                Geometry::centered_on(center, Size::new(DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT)),
                ElementKind::Text(text.clone()),
            )),
        }
    }
}
