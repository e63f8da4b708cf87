//! Image acquisition for canvas image elements
//!
//! An image enters a scene either by reference (a URL fetched through an
//! [`ImageFetcher`]) or as uploaded bytes. Both paths end in [`decode`],
//! which produces the bitmap an image element keeps for its whole life.

mod http;
mod memory;

pub use http::HttpFetcher;
pub use memory::StaticFetcher;

use std::time::Duration;

use painting::Bitmap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Fetch returned HTTP status {0}")]
    Status(u16),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Decode failed: {0}")]
    Decode(String),
}

impl ImageError {
    /// True for errors raised while acquiring bytes, false for decode errors
    pub fn is_fetch(&self) -> bool {
        !matches!(self, ImageError::Decode(_))
    }
}

/// Trait for byte sources that resolve an image URL
#[allow(async_fn_in_trait)]
pub trait ImageFetcher {
    /// Fetch the raw bytes behind `url`
    ///
    /// Non-2xx responses must fail with [`ImageError::Status`].
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError>;
}

/// Where an image element's pixels come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(String),
    Bytes(Vec<u8>),
}

/// Turns an [`ImageSource`] into a decoded bitmap
#[derive(Debug, Clone)]
pub struct ImageResolver<F> {
    fetcher: F,
    max_bytes: usize,
}

impl<F: ImageFetcher> ImageResolver<F> {
    pub fn new(fetcher: F, max_bytes: usize) -> Self {
        Self { fetcher, max_bytes }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Acquire and decode an image
    pub async fn resolve(&self, source: ImageSource) -> Result<Bitmap, ImageError> {
        let bytes = match source {
            ImageSource::Url(url) => {
                debug!("Fetching image from {}", url);
                self.fetcher.fetch(&url).await?
            }
            ImageSource::Bytes(bytes) => bytes,
        };

        if bytes.len() > self.max_bytes {
            return Err(ImageError::TooLarge {
                limit: self.max_bytes,
            });
        }

        // Decoding is CPU bound; keep it off the async workers
        tokio::task::spawn_blocking(move || decode(&bytes))
            .await
            .map_err(|e| ImageError::Decode(e.to_string()))?
    }
}

/// Decode encoded image bytes (PNG, JPEG, GIF, ...) into a bitmap
pub fn decode(bytes: &[u8]) -> Result<Bitmap, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("Decoded {}x{} image", width, height);

    Bitmap::from_rgba8(width, height, rgba.as_raw())
        .ok_or_else(|| ImageError::Decode(format!("unusable image size {}x{}", width, height)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bitmap = decode(&png_bytes(3, 2, [10, 20, 30, 255])).unwrap();
        assert_eq!(bitmap.width(), 3);
        assert_eq!(bitmap.height(), 2);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode(b"not an image"), Err(ImageError::Decode(_))));
        assert!(matches!(decode(&[]), Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_error_classes() {
        assert!(ImageError::Status(404).is_fetch());
        assert!(ImageError::TooLarge { limit: 1 }.is_fetch());
        assert!(!ImageError::Decode("bad".into()).is_fetch());
    }

    #[tokio::test]
    async fn test_resolve_bytes() {
        let resolver = ImageResolver::new(StaticFetcher::new(), 1024 * 1024);
        let bitmap = resolver
            .resolve(ImageSource::Bytes(png_bytes(4, 4, [0, 0, 0, 255])))
            .await
            .unwrap();
        assert_eq!(bitmap.width(), 4);
        assert_eq!(resolver.fetcher().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_url() {
        let fetcher = StaticFetcher::new()
            .with_body("https://img.test/a.png", png_bytes(2, 5, [255, 0, 0, 255]))
            .with_status("https://img.test/missing.png", 404);
        let resolver = ImageResolver::new(fetcher, 1024 * 1024);

        let bitmap = resolver
            .resolve(ImageSource::Url("https://img.test/a.png".into()))
            .await
            .unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (2, 5));

        let err = resolver
            .resolve(ImageSource::Url("https://img.test/missing.png".into()))
            .await
            .unwrap_err();
        assert_eq!(err, ImageError::Status(404));

        let err = resolver
            .resolve(ImageSource::Url("https://img.test/unknown.png".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Fetch(_)));
        assert_eq!(resolver.fetcher().fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_resolve_rejects_oversized_input() {
        let resolver = ImageResolver::new(StaticFetcher::new(), 16);
        let err = resolver
            .resolve(ImageSource::Bytes(png_bytes(8, 8, [1, 2, 3, 4])))
            .await
            .unwrap_err();
        assert_eq!(err, ImageError::TooLarge { limit: 16 });
    }
}
