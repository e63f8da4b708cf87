//! Single-line text layout and glyph coverage

use tiny_skia::Mask;

use super::RasterError;
use crate::types::{Text, TextAlign};

struct PlacedGlyph {
    ch: char,
    pen_x: f32,
}

/// Lay out `content` on one line, returning glyph pen positions and the total advance
fn layout(font: &fontdue::Font, content: &str, px: f32) -> (Vec<PlacedGlyph>, f32) {
    let mut glyphs = Vec::with_capacity(content.len());
    let mut pen_x = 0.0;
    let mut previous: Option<char> = None;

    for ch in content.chars() {
        // Line breaks and other control characters render as spaces
        let ch = if ch.is_control() { ' ' } else { ch };
        if let Some(prev) = previous {
            pen_x += font.horizontal_kern(prev, ch, px).unwrap_or(0.0);
        }
        glyphs.push(PlacedGlyph { ch, pen_x });
        pen_x += font.metrics(ch, px).advance_width;
        previous = Some(ch);
    }

    (glyphs, pen_x)
}

/// Left edge of the line for the given anchor
fn line_origin(x: f32, advance: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - advance / 2.0,
        TextAlign::Right => x - advance,
    }
}

/// Build a surface-sized coverage mask for a text element
///
/// Returns `Ok(None)` when nothing would be painted.
pub(super) fn coverage_mask(text: &Text, width: u32, height: u32) -> Result<Option<Mask>, RasterError> {
    let params = text.params();
    if params.content.trim().is_empty() {
        return Ok(None);
    }

    let font = text.face().font();
    let px = params.font_size;
    let (glyphs, advance) = layout(font, &params.content, px);
    let origin = line_origin(params.x, advance, params.align);
    let baseline = params.y.round() as i64;

    let mut mask = Mask::new(width, height).ok_or(RasterError::Allocation("text mask"))?;
    let stride = width as i64;
    let mut painted = false;

    {
        let data = mask.data_mut();
        for glyph in &glyphs {
            let (metrics, coverage) = font.rasterize(glyph.ch, px);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }

            let left = (origin + glyph.pen_x).round() as i64 + metrics.xmin as i64;
            let top = baseline - metrics.ymin as i64 - metrics.height as i64;

            for row in 0..metrics.height {
                let y = top + row as i64;
                if y < 0 || y >= height as i64 {
                    continue;
                }
                for col in 0..metrics.width {
                    let x = left + col as i64;
                    if x < 0 || x >= stride {
                        continue;
                    }
                    let value = coverage[row * metrics.width + col];
                    if value == 0 {
                        continue;
                    }
                    let index = (y * stride + x) as usize;
                    data[index] = data[index].max(value);
                    painted = true;
                }
            }
        }
    }

    Ok(painted.then_some(mask))
}
