//! Rasterizer: one deterministic drawing routine per element kind
//!
//! Drawing is split into two phases. [`Rasterizer::plan`] turns an element
//! into a [`DrawPlan`] and is the only step that can fail; painting a plan
//! cannot fail. A failed draw therefore never leaves a half-painted
//! surface behind.
//!
//! Shapes are either filled or stroked with their color, never both.

mod text;

use canvas_config::DEFAULT_STROKE_WIDTH;
use thiserror::Error;
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, Path, PathBuilder, Pattern, Pixmap, Rect, SpreadMode,
    Stroke, Transform,
};
use tracing::debug;

use crate::color::Color;
use crate::surface::Surface;
use crate::types::{Circle, Element, ElementKind, Image, Rectangle, Shape, Text};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    #[error("No font available for family {0:?}")]
    FontUnavailable(String),
    #[error("Font {family:?} could not be parsed: {reason}")]
    FontParse { family: String, reason: String },
    #[error("{0} geometry cannot be rasterized")]
    Geometry(ElementKind),
    #[error("Failed to allocate {0}")]
    Allocation(&'static str),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Drawing settings shared by every element of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterizer {
    stroke_width: f32,
    anti_alias: bool,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            anti_alias: true,
        }
    }
}

impl Rasterizer {
    /// Create a rasterizer; a non-positive stroke width falls back to the default
    pub fn new(stroke_width: f32, anti_alias: bool) -> Self {
        let stroke_width = if stroke_width.is_finite() && stroke_width > 0.0 {
            stroke_width
        } else {
            DEFAULT_STROKE_WIDTH
        };
        Self {
            stroke_width,
            anti_alias,
        }
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    /// Draw one element onto the surface
    ///
    /// On error the surface is left untouched.
    pub fn draw(&self, surface: &mut Surface, element: &Element) -> Result<(), RasterError> {
        let plan = self.plan(surface.width(), surface.height(), element.shape())?;
        debug!("Drawing {} {}", element.kind(), element.id());
        plan.paint(surface.pixmap_mut());
        Ok(())
    }

    /// Build the draw plan for a shape on a `width`x`height` surface
    pub(crate) fn plan<'a>(
        &self,
        width: u32,
        height: u32,
        shape: &'a Shape,
    ) -> Result<DrawPlan<'a>, RasterError> {
        match shape {
            Shape::Rectangle(rect) => self.plan_rectangle(rect),
            Shape::Circle(circle) => self.plan_circle(circle),
            Shape::Text(text) => self.plan_text(width, height, text),
            Shape::Image(image) => self.plan_image(image),
        }
    }

    fn plan_rectangle(&self, rect: &Rectangle) -> Result<DrawPlan<'static>, RasterError> {
        let bounds = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
            .ok_or(RasterError::Geometry(ElementKind::Rectangle))?;
        Ok(self.fill_or_stroke(PathBuilder::from_rect(bounds), rect.color, rect.filled))
    }

    fn plan_circle(&self, circle: &Circle) -> Result<DrawPlan<'static>, RasterError> {
        let path = PathBuilder::from_circle(circle.x, circle.y, circle.radius)
            .ok_or(RasterError::Geometry(ElementKind::Circle))?;
        Ok(self.fill_or_stroke(path, circle.color, circle.filled))
    }

    fn plan_text(&self, width: u32, height: u32, text: &Text) -> Result<DrawPlan<'static>, RasterError> {
        let Some(mask) = text::coverage_mask(text, width, height)? else {
            return Ok(DrawPlan::Empty);
        };
        let area = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
            .ok_or(RasterError::Geometry(ElementKind::Text))?;
        Ok(DrawPlan::Masked {
            area,
            mask,
            paint: self.solid(text.params().color),
        })
    }

    fn plan_image<'a>(&self, image: &'a Image) -> Result<DrawPlan<'a>, RasterError> {
        let area = Rect::from_xywh(image.x, image.y, image.width, image.height)
            .ok_or(RasterError::Geometry(ElementKind::Image))?;

        let source = image.bitmap.pixmap();
        let scale_x = image.width / source.width() as f32;
        let scale_y = image.height / source.height() as f32;
        if !scale_x.is_finite() || !scale_y.is_finite() {
            return Err(RasterError::Geometry(ElementKind::Image));
        }

        // Unscaled blits at whole-pixel offsets copy pixels exactly
        let exact = scale_x == 1.0
            && scale_y == 1.0
            && image.x.fract() == 0.0
            && image.y.fract() == 0.0;
        let quality = if exact {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };

        let paint = Paint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                quality,
                1.0,
                Transform::from_row(scale_x, 0.0, 0.0, scale_y, image.x, image.y),
            ),
            anti_alias: self.anti_alias && !exact,
            ..Paint::default()
        };
        Ok(DrawPlan::Blit { area, paint })
    }

    fn fill_or_stroke(&self, path: Path, color: Color, filled: bool) -> DrawPlan<'static> {
        let paint = self.solid(color);
        if filled {
            DrawPlan::Fill { path, paint }
        } else {
            DrawPlan::Stroke {
                path,
                paint,
                stroke: Stroke {
                    width: self.stroke_width,
                    ..Stroke::default()
                },
            }
        }
    }

    fn solid(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = self.anti_alias;
        paint
    }
}

/// A fully prepared draw operation
pub(crate) enum DrawPlan<'a> {
    Fill {
        path: Path,
        paint: Paint<'a>,
    },
    Stroke {
        path: Path,
        paint: Paint<'a>,
        stroke: Stroke,
    },
    /// Solid paint through a coverage mask (text)
    Masked {
        area: Rect,
        mask: Mask,
        paint: Paint<'a>,
    },
    /// Pattern fill of the destination box (images)
    Blit {
        area: Rect,
        paint: Paint<'a>,
    },
    Empty,
}

impl DrawPlan<'_> {
    pub(crate) fn paint(self, pixmap: &mut Pixmap) {
        let identity = Transform::identity();
        match self {
            DrawPlan::Fill { path, paint } => {
                pixmap.fill_path(&path, &paint, FillRule::Winding, identity, None);
            }
            DrawPlan::Stroke {
                path,
                paint,
                stroke,
            } => {
                pixmap.stroke_path(&path, &paint, &stroke, identity, None);
            }
            DrawPlan::Masked { area, mask, paint } => {
                pixmap.fill_rect(area, &paint, identity, Some(&mask));
            }
            DrawPlan::Blit { area, paint } => {
                pixmap.fill_rect(area, &paint, identity, None);
            }
            DrawPlan::Empty => {}
        }
    }
}
