//! In-memory fetcher with canned responses

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::{ImageError, ImageFetcher};

#[derive(Debug, Clone)]
enum Canned {
    Body(Vec<u8>),
    Status(u16),
}

/// Fetcher that serves registered URLs from memory
///
/// Unregistered URLs fail as unreachable. Every call is counted, which
/// makes it easy to check that a caller did not fetch more than it should.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: RwLock<HashMap<String, Canned>>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with a 200 status for `url`
    pub fn with_body(self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.insert(url, body);
        self
    }

    /// Answer `url` with a bare status code
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.responses.write().insert(url.into(), Canned::Status(status));
        self
    }

    pub fn insert(&self, url: impl Into<String>, body: Vec<u8>) {
        self.responses.write().insert(url.into(), Canned::Body(body));
    }

    /// Forget `url`, so later fetches fail as unreachable
    pub fn remove(&self, url: &str) {
        self.responses.write().remove(url);
    }

    /// Number of fetches attempted so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.responses.read().get(url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) if (200..300).contains(status) => Ok(Vec::new()),
            Some(Canned::Status(status)) => Err(ImageError::Status(*status)),
            None => Err(ImageError::Fetch(format!("{} is unreachable", url))),
        }
    }
}
