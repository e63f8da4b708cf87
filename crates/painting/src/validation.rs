//! Per-kind element constraints.
//!
//! Presence of a field is checked where requests are parsed; this module
//! checks values. Zero is a legal coordinate, only sizes must be positive.

use thiserror::Error;

use crate::types::{Shape, TextParams};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field `{0}`")]
    Missing(&'static str),
    #[error("Field `{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("Field `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field) => field,
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::Invalid { field, .. } => field,
        }
    }
}

/// Require a finite number (any sign, zero included)
pub fn require_finite(field: &'static str, value: f32) -> Result<f32, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            expected: "a finite number",
            value: value as f64,
        })
    }
}

/// Require a finite, strictly positive number
pub fn require_positive(field: &'static str, value: f32) -> Result<f32, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            expected: "a positive number",
            value: value as f64,
        })
    }
}

/// Require a number no larger than `max`
pub fn require_at_most(field: &'static str, value: f32, max: f32) -> Result<f32, ValidationError> {
    if value <= max {
        Ok(value)
    } else {
        Err(ValidationError::Invalid {
            field,
            reason: format!("{} exceeds the maximum of {}", value, max),
        })
    }
}

/// Validate scene dimensions against the configured maximum
pub fn validate_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> Result<(), ValidationError> {
    for (field, value, max) in [("width", width, max_width), ("height", height, max_height)] {
        if value == 0 {
            return Err(ValidationError::OutOfRange {
                field,
                expected: "a positive number",
                value: 0.0,
            });
        }
        if value > max {
            return Err(ValidationError::Invalid {
                field,
                reason: format!("{} exceeds the maximum of {}", value, max),
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_shape(shape: &Shape) -> Result<(), ValidationError> {
    match shape {
        Shape::Rectangle(rect) => {
            require_finite("x", rect.x)?;
            require_finite("y", rect.y)?;
            require_positive("width", rect.width)?;
            require_positive("height", rect.height)?;
        }
        Shape::Circle(circle) => {
            require_finite("x", circle.x)?;
            require_finite("y", circle.y)?;
            require_positive("radius", circle.radius)?;
        }
        Shape::Text(text) => validate_text(text.params())?,
        Shape::Image(image) => {
            require_finite("x", image.x)?;
            require_finite("y", image.y)?;
            require_positive("width", image.width)?;
            require_positive("height", image.height)?;
        }
    }
    Ok(())
}

/// Validate text parameters; an empty `content` is legal
pub fn validate_text(params: &TextParams) -> Result<(), ValidationError> {
    require_finite("x", params.x)?;
    require_finite("y", params.y)?;
    require_positive("fontSize", params.font_size)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::types::{Circle, Element, Rectangle, TextAlign};

    fn rect(x: f32, y: f32, width: f32, height: f32) -> Shape {
        Shape::Rectangle(Rectangle {
            x,
            y,
            width,
            height,
            color: Color::BLACK,
            filled: true,
        })
    }

    #[test]
    fn test_zero_coordinates_are_valid() {
        assert!(Element::new(rect(0.0, 0.0, 10.0, 10.0)).is_ok());
        assert!(Element::new(rect(-5.0, -5.0, 10.0, 10.0)).is_ok());
    }

    #[test]
    fn test_non_positive_size_names_field() {
        let err = Element::new(rect(0.0, 0.0, 0.0, 10.0)).unwrap_err();
        assert_eq!(err.field(), "width");

        let err = Element::new(rect(0.0, 0.0, 10.0, -1.0)).unwrap_err();
        assert_eq!(err.field(), "height");
    }

    #[test]
    fn test_non_finite_coordinate() {
        let err = Element::new(rect(f32::NAN, 0.0, 1.0, 1.0)).unwrap_err();
        assert_eq!(err.field(), "x");
    }

    #[test]
    fn test_circle_radius() {
        let err = Element::new(Shape::Circle(Circle {
            x: 1.0,
            y: 1.0,
            radius: 0.0,
            color: Color::BLACK,
            filled: false,
        }))
        .unwrap_err();
        assert_eq!(err.field(), "radius");
    }

    #[test]
    fn test_text_allows_empty_content() {
        let params = TextParams {
            content: String::new(),
            x: 0.0,
            y: 0.0,
            font_size: 12.0,
            font_family: "Arial".to_string(),
            color: Color::BLACK,
            align: TextAlign::Left,
        };
        assert!(validate_text(&params).is_ok());

        let bad = TextParams {
            font_size: 0.0,
            ..params
        };
        assert_eq!(validate_text(&bad).unwrap_err().field(), "fontSize");
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(require_at_most("fontSize", 1024.0, 1024.0), Ok(1024.0));
        let err = require_at_most("fontSize", 1e6, 1024.0).unwrap_err();
        assert_eq!(err.field(), "fontSize");
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_dimensions() {
        assert!(validate_dimensions(200, 100, 8192, 8192).is_ok());
        assert_eq!(validate_dimensions(0, 100, 8192, 8192).unwrap_err().field(), "width");
        assert_eq!(validate_dimensions(10, 9000, 8192, 8192).unwrap_err().field(), "height");
    }
}
