//! Raster surface and decoded bitmaps, both backed by `tiny_skia::Pixmap`

use std::fmt;

use tiny_skia::{ColorU8, Pixmap};

use crate::raster::RasterError;
use crate::validation::ValidationError;

/// The pixel buffer of a scene
///
/// Pixels are stored premultiplied RGBA8. A blank surface is fully
/// transparent.
#[derive(Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a blank surface
    pub fn new(width: u32, height: u32) -> Result<Self, ValidationError> {
        if width == 0 {
            return Err(ValidationError::OutOfRange {
                field: "width",
                expected: "a positive number",
                value: 0.0,
            });
        }
        if height == 0 {
            return Err(ValidationError::OutOfRange {
                field: "height",
                expected: "a positive number",
                value: 0.0,
            });
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| ValidationError::Invalid {
            field: "width",
            reason: format!("a {}x{} surface cannot be allocated", width, height),
        })?;
        Ok(Self { pixmap })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Whether no pixel has been painted
    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|&b| b == 0)
    }

    /// Get a pixel as straight RGBA
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Raw premultiplied RGBA bytes in row-major order
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight (demultiplied) RGBA bytes in row-major order
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Encode the surface as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.pixmap.data() == other.pixmap.data()
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// A decoded image, ready to be blitted
pub struct Bitmap {
    pixmap: Pixmap,
}

impl Bitmap {
    /// Build from straight RGBA8 data
    /// Returns None for empty dimensions or a short buffer
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        let mut pixmap = Pixmap::new(width, height)?;
        if data.len() < pixmap.data().len() {
            return None;
        }
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Some(Self { pixmap })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
