//! Element specs as they arrive at the boundary.
//!
//! Every field is optional on the wire. [`ElementSpec::validate`] checks
//! presence (a zero coordinate is present, an absent one is not), fills in
//! the drawing defaults and hands the values to the painting crate, which
//! checks ranges.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use canvas_config::DrawingConfig;
use canvas_imaging::ImageSource;
use painting::{
    Circle, Color, ImagePlacement, Rectangle, Shape, TextAlign, TextParams, ValidationError,
};
use serde::{Deserialize, Serialize};

/// An element to add, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementSpec {
    Rectangle(RectangleSpec),
    Circle(CircleSpec),
    Text(TextSpec),
    Image(ImageSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleSpec {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<String>,
    #[serde(alias = "isFilled")]
    pub filled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleSpec {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius: Option<f64>,
    pub color: Option<String>,
    #[serde(alias = "isFilled")]
    pub filled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpec {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    pub align: Option<String>,
}

/// An image, either by URL or as base64 encoded bytes in `data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub url: Option<String>,
    pub data: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A presence-checked element, ready for the last step of construction
///
/// Text still needs a font face and images still need their bitmap; both
/// are attached by the caller before the element is built.
#[derive(Debug, Clone)]
pub enum ElementDraft {
    Shape(Shape),
    Text(TextParams),
    Image {
        source: ImageSource,
        placement: ImagePlacement,
    },
}

impl ElementSpec {
    /// Kind name as used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            ElementSpec::Rectangle(_) => "rectangle",
            ElementSpec::Circle(_) => "circle",
            ElementSpec::Text(_) => "text",
            ElementSpec::Image(_) => "image",
        }
    }

    /// Check presence of required fields and apply defaults
    pub fn validate(self, defaults: &DrawingConfig) -> Result<ElementDraft, ValidationError> {
        match self {
            ElementSpec::Rectangle(spec) => Ok(ElementDraft::Shape(Shape::Rectangle(Rectangle {
                x: required("x", spec.x)?,
                y: required("y", spec.y)?,
                width: required("width", spec.width)?,
                height: required("height", spec.height)?,
                color: color_or(spec.color, &defaults.default_color),
                filled: spec.filled.unwrap_or(true),
            }))),
            ElementSpec::Circle(spec) => Ok(ElementDraft::Shape(Shape::Circle(Circle {
                x: required("x", spec.x)?,
                y: required("y", spec.y)?,
                radius: required("radius", spec.radius)?,
                color: color_or(spec.color, &defaults.default_color),
                filled: spec.filled.unwrap_or(true),
            }))),
            ElementSpec::Text(spec) => {
                let align = match spec.align.as_deref() {
                    Some(align) => TextAlign::parse(align)?,
                    None => TextAlign::default(),
                };
                Ok(ElementDraft::Text(TextParams {
                    content: spec.content.ok_or(ValidationError::Missing("content"))?,
                    x: required("x", spec.x)?,
                    y: required("y", spec.y)?,
                    font_size: spec
                        .font_size
                        .map(|size| size as f32)
                        .unwrap_or(defaults.default_font_size),
                    font_family: spec
                        .font_family
                        .unwrap_or_else(|| defaults.default_font_family.clone()),
                    color: color_or(spec.color, &defaults.default_text_color),
                    align,
                }))
            }
            ElementSpec::Image(spec) => {
                let source = image_source(spec.url, spec.data)?;
                let placement = ImagePlacement {
                    x: required("x", spec.x)?,
                    y: required("y", spec.y)?,
                    width: spec.width.map(|w| w as f32),
                    height: spec.height.map(|h| h as f32),
                };
                placement.validate()?;
                Ok(ElementDraft::Image { source, placement })
            }
        }
    }
}

fn required(field: &'static str, value: Option<f64>) -> Result<f32, ValidationError> {
    value
        .map(|v| v as f32)
        .ok_or(ValidationError::Missing(field))
}

fn color_or(token: Option<String>, default: &str) -> Color {
    Color::from_token(token.as_deref().unwrap_or(default))
}

fn image_source(url: Option<String>, data: Option<String>) -> Result<ImageSource, ValidationError> {
    match (url, data) {
        (Some(url), None) if !url.trim().is_empty() => Ok(ImageSource::Url(url)),
        (None, Some(data)) => {
            let bytes = STANDARD
                .decode(data.trim())
                .map_err(|e| ValidationError::Invalid {
                    field: "image",
                    reason: format!("data is not valid base64: {}", e),
                })?;
            if bytes.is_empty() {
                return Err(ValidationError::Missing("image"));
            }
            Ok(ImageSource::Bytes(bytes))
        }
        (Some(_), Some(_)) => Err(ValidationError::Invalid {
            field: "image",
            reason: "give either url or data, not both".to_string(),
        }),
        _ => Err(ValidationError::Missing("image")),
    }
}

/// Validate and truncate requested scene dimensions
///
/// Fractional sizes are truncated to whole pixels; anything below one
/// pixel is rejected.
pub fn scene_dimensions(width: Option<f64>, height: Option<f64>) -> Result<(u32, u32), ValidationError> {
    Ok((dimension("width", width)?, dimension("height", height)?))
}

fn dimension(field: &'static str, value: Option<f64>) -> Result<u32, ValidationError> {
    let value = value.ok_or(ValidationError::Missing(field))?;
    if !value.is_finite() || value < 1.0 {
        return Err(ValidationError::OutOfRange {
            field,
            expected: "a positive number",
            value,
        });
    }
    if value > u32::MAX as f64 {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("{} is too large", value),
        });
    }
    Ok(value.trunc() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ElementSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rectangle_defaults() {
        let draft = parse(r#"{"type":"rectangle","x":0,"y":0,"width":10,"height":5}"#)
            .validate(&DrawingConfig::default())
            .unwrap();
        let ElementDraft::Shape(Shape::Rectangle(rect)) = draft else {
            panic!("expected a rectangle");
        };
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.color, Color::BLACK);
        assert!(rect.filled);
    }

    #[test]
    fn test_zero_is_present_absent_is_missing() {
        let err = parse(r#"{"type":"circle","x":0,"radius":3}"#)
            .validate(&DrawingConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::Missing("y"));
    }

    #[test]
    fn test_is_filled_alias() {
        let spec = parse(r##"{"type":"circle","x":1,"y":2,"radius":3,"color":"#ff0000","isFilled":false}"##);
        let ElementDraft::Shape(Shape::Circle(circle)) = spec.validate(&DrawingConfig::default()).unwrap() else {
            panic!("expected a circle");
        };
        assert!(!circle.filled);
        assert_eq!(circle.color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_text_defaults_and_align() {
        let draft = parse(r#"{"type":"text","content":"","x":5,"y":20}"#)
            .validate(&DrawingConfig::default())
            .unwrap();
        let ElementDraft::Text(params) = draft else {
            panic!("expected text");
        };
        assert_eq!(params.content, "");
        assert_eq!(params.font_size, 16.0);
        assert_eq!(params.font_family, "Arial");
        assert_eq!(params.align, TextAlign::Left);

        let err = parse(r#"{"type":"text","content":"hi","x":5,"y":20,"align":"justify"}"#)
            .validate(&DrawingConfig::default())
            .unwrap_err();
        assert_eq!(err.field(), "align");

        let err = parse(r#"{"type":"text","x":5,"y":20}"#)
            .validate(&DrawingConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::Missing("content"));
    }

    #[test]
    fn test_image_sources() {
        let draft = parse(r#"{"type":"image","url":"https://img.test/a.png","x":0,"y":0}"#)
            .validate(&DrawingConfig::default())
            .unwrap();
        let ElementDraft::Image { source, placement } = draft else {
            panic!("expected an image");
        };
        assert_eq!(source, ImageSource::Url("https://img.test/a.png".into()));
        assert_eq!(
            placement,
            ImagePlacement {
                x: 0.0,
                y: 0.0,
                width: None,
                height: None,
            }
        );

        let draft = parse(r#"{"type":"image","data":"AQID","x":1,"y":1,"width":4,"height":4}"#)
            .validate(&DrawingConfig::default())
            .unwrap();
        let ElementDraft::Image { source, .. } = draft else {
            panic!("expected an image");
        };
        assert_eq!(source, ImageSource::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_image_without_bytes_is_rejected() {
        for json in [
            r#"{"type":"image","x":0,"y":0}"#,
            r#"{"type":"image","data":"","x":0,"y":0}"#,
            r#"{"type":"image","url":"  ","x":0,"y":0}"#,
        ] {
            let err = parse(json).validate(&DrawingConfig::default()).unwrap_err();
            assert_eq!(err.field(), "image", "{}", json);
        }
    }

    #[test]
    fn test_image_size_must_be_positive() {
        let err = parse(r#"{"type":"image","url":"u","x":0,"y":0,"width":0}"#)
            .validate(&DrawingConfig::default())
            .unwrap_err();
        assert_eq!(err.field(), "width");
    }

    #[test]
    fn test_scene_dimensions() {
        assert_eq!(scene_dimensions(Some(800.0), Some(600.0)).unwrap(), (800, 600));
        assert_eq!(scene_dimensions(Some(10.9), Some(1.0)).unwrap(), (10, 1));
        assert_eq!(
            scene_dimensions(None, Some(1.0)).unwrap_err(),
            ValidationError::Missing("width")
        );
        assert_eq!(scene_dimensions(Some(5.0), Some(0.5)).unwrap_err().field(), "height");
        assert_eq!(scene_dimensions(Some(-5.0), Some(5.0)).unwrap_err().field(), "width");
    }
}
