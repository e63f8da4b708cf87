use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Color;
use crate::constants::TEXT_ALIGN_VALUES;
use crate::fonts::Face;
use crate::surface::Bitmap;
use crate::validation::{self, ValidationError};

/// Identifier of a live scene in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(Uuid);

impl SceneId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SceneId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of an element, unique within its scene and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Element kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Text,
    Image,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::Circle => "circle",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal text anchoring relative to the element's `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// `x` is the left edge
    #[default]
    Left,
    /// `x` is the midpoint
    Center,
    /// `x` is the right edge
    Right,
}

impl TextAlign {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(ValidationError::Invalid {
                field: "align",
                reason: format!("expected {}, got {:?}", TEXT_ALIGN_VALUES, other),
            }),
        }
    }
}

/// Axis-aligned box at `(x, y)`
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub filled: bool,
}

/// Full circle centered at `(x, y)`
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
    pub filled: bool,
}

/// Text drawing parameters, before a font face is attached
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// May be empty
    pub content: String,
    pub x: f32,
    /// Alphabetic baseline
    pub y: f32,
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    pub align: TextAlign,
}

/// A single line of text with its resolved font face
#[derive(Debug, Clone)]
pub struct Text {
    params: TextParams,
    face: Face,
}

impl Text {
    pub fn new(params: TextParams, face: Face) -> Self {
        Self { params, face }
    }

    pub fn params(&self) -> &TextParams {
        &self.params
    }

    pub fn face(&self) -> &Face {
        &self.face
    }
}

/// Where an image goes; a missing size falls back to the bitmap's natural size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl ImagePlacement {
    /// Check the placement before any bitmap is acquired
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require_finite("x", self.x)?;
        validation::require_finite("y", self.y)?;
        if let Some(width) = self.width {
            validation::require_positive("width", width)?;
        }
        if let Some(height) = self.height {
            validation::require_positive("height", height)?;
        }
        Ok(())
    }

    /// Attach a decoded bitmap, resolving the destination size
    pub fn into_image(self, bitmap: Arc<Bitmap>) -> Image {
        let width = self.width.unwrap_or(bitmap.width() as f32);
        let height = self.height.unwrap_or(bitmap.height() as f32);
        Image {
            bitmap,
            x: self.x,
            y: self.y,
            width,
            height,
        }
    }
}

/// Decoded bitmap blitted into the box `(x, y, width, height)`
///
/// The bitmap is decoded once when the element is created and shared
/// with every later replay.
#[derive(Debug, Clone)]
pub struct Image {
    pub bitmap: Arc<Bitmap>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Drawing parameters of an element, one case per kind
#[derive(Debug, Clone)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Text(Text),
    Image(Image),
}

impl Shape {
    pub fn kind(&self) -> ElementKind {
        match self {
            Shape::Rectangle(_) => ElementKind::Rectangle,
            Shape::Circle(_) => ElementKind::Circle,
            Shape::Text(_) => ElementKind::Text,
            Shape::Image(_) => ElementKind::Image,
        }
    }
}

/// A validated drawable unit with immutable parameters
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    shape: Shape,
}

impl Element {
    /// Validate the shape and assign a fresh id
    pub fn new(shape: Shape) -> Result<Self, ValidationError> {
        validation::validate_shape(&shape)?;
        Ok(Self {
            id: ElementId::new(),
            shape,
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Build an element without validation, for exercising failure paths
    #[cfg(test)]
    pub(crate) fn unchecked(shape: Shape) -> Self {
        Self {
            id: ElementId::new(),
            shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_strings() {
        let id = ElementId::new();
        let parsed: ElementId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<SceneId>().is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_text_align_parse() {
        assert_eq!(TextAlign::parse("center").unwrap(), TextAlign::Center);
        let err = TextAlign::parse("justify").unwrap_err();
        assert_eq!(err.field(), "align");
    }

    #[test]
    fn test_element_new_assigns_id_and_kind() {
        let element = Element::new(Shape::Circle(Circle {
            x: 0.0,
            y: 0.0,
            radius: 4.0,
            color: Color::BLACK,
            filled: true,
        }))
        .unwrap();
        assert_eq!(element.kind(), ElementKind::Circle);
    }

    #[test]
    fn test_placement_uses_natural_size() {
        let bitmap = Arc::new(Bitmap::from_rgba8(3, 2, &[255; 24]).unwrap());
        let placement = ImagePlacement {
            x: 1.0,
            y: 1.0,
            width: None,
            height: Some(10.0),
        };
        placement.validate().unwrap();
        let image = placement.into_image(bitmap);
        assert_eq!(image.width, 3.0);
        assert_eq!(image.height, 10.0);
    }

    #[test]
    fn test_placement_rejects_zero_width() {
        let placement = ImagePlacement {
            x: 0.0,
            y: 0.0,
            width: Some(0.0),
            height: None,
        };
        assert_eq!(placement.validate().unwrap_err().field(), "width");
    }
}
