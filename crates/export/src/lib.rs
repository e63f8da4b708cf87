//! Single-page PDF export of a canvas surface
//!
//! The page is sized exactly to the surface, one point per pixel, and
//! holds the surface as an RGB image with its alpha channel attached as a
//! soft mask.

use std::io::Write;

use canvas_config::ExportConfig;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use painting::Surface;
use thiserror::Error;
use tracing::debug;

/// MIME type of exported documents
pub const CONTENT_TYPE: &str = "application/pdf";

const IMAGE_NAME: &str = "Im0";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF encoding failed: {0}")]
    Encode(String),

    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        ExportError::Encode(err.to_string())
    }
}

/// Encodes surfaces as single-page PDF documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfExporter {
    compress: bool,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl PdfExporter {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.compress)
    }

    /// Encode `surface` into a complete PDF document
    pub fn encode(&self, surface: &Surface) -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        self.write_to(surface, &mut out)?;
        Ok(out)
    }

    /// Encode `surface` and write the document to `target`
    pub fn write_to<W: Write>(&self, surface: &Surface, target: &mut W) -> Result<(), ExportError> {
        let mut doc = self.build(surface)?;
        if self.compress {
            doc.compress();
        }
        doc.save_to(target)?;
        Ok(())
    }

    fn build(&self, surface: &Surface) -> Result<Document, ExportError> {
        let width = surface.width() as i64;
        let height = surface.height() as i64;
        let (rgb, alpha) = split_channels(&surface.to_rgba8());

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "SMask" => mask_id,
            },
            rgb,
        ));

        // Scale the unit image square up to the full page
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.into(),
                        0.into(),
                        height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let resources_id = doc.add_object(dictionary! {
            "XObject" => dictionary! { IMAGE_NAME => image_id },
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, pages_dict.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        debug!("Built {}x{} PDF page", width, height);
        Ok(doc)
    }
}

/// Split straight RGBA into packed RGB and alpha planes
fn split_channels(rgba: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let pixels = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }
    (rgb, alpha)
}
