//! HTTP image fetcher

use std::time::Duration;

use canvas_config::FetchConfig;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::{ImageError, ImageFetcher};

/// Fetches images over HTTP(S) with a timeout and a body size cap
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig, max_bytes: usize) -> Result<Self, ImageError> {
        Self::with_builder(reqwest::Client::builder(), config, max_bytes)
    }

    fn with_builder(
        builder: reqwest::ClientBuilder,
        config: &FetchConfig,
        max_bytes: usize,
    ) -> Result<Self, ImageError> {
        let timeout = config.timeout();
        let client = builder
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ImageError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            timeout,
            max_bytes,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> ImageError {
        if error.is_timeout() {
            ImageError::Timeout(self.timeout)
        } else {
            ImageError::Fetch(error.to_string())
        }
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Image fetch for {} returned {}", url, status);
            return Err(ImageError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(ImageError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        // Stream the body so an oversized response is cut off early
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.map_error(e))?;
            if body.len() + chunk.len() > self.max_bytes {
                return Err(ImageError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
