//! Shared configuration for the canvas builder
//!
//! This crate provides the single source of truth for scene limits, image
//! fetching, drawing defaults, font discovery and document export settings.
//! Every section deserializes with defaults, so a partial JSON file only
//! overrides the keys it names.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default maximum scene width/height in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Default maximum number of elements held by one scene
pub const DEFAULT_MAX_ELEMENTS: usize = 10_000;

/// Default maximum size of a fetched or uploaded image (20 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Default timeout for fetching an image by URL
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Default maximum font size in pixels; glyph buffers grow with its square
pub const DEFAULT_MAX_FONT_SIZE: f32 = 1024.0;

/// Default line width for stroked shapes (the 2D canvas default)
pub const DEFAULT_STROKE_WIDTH: f32 = 1.0;

/// Environment variable overriding `fetch.timeout_ms`
pub const ENV_FETCH_TIMEOUT_MS: &str = "CANVAS_FETCH_TIMEOUT_MS";

/// Environment variable overriding both `limits.max_width` and `limits.max_height`
pub const ENV_MAX_DIMENSION: &str = "CANVAS_MAX_DIMENSION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Size limits applied to scenes and their inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub max_elements: usize,
    pub max_image_bytes: usize,
    pub max_font_size: f32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
            max_elements: DEFAULT_MAX_ELEMENTS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_font_size: DEFAULT_MAX_FONT_SIZE,
        }
    }
}

/// Settings for resolving images by URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            user_agent: concat!("canvas-builder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Drawing defaults, used when a request leaves an optional field out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    pub stroke_width: f32,
    pub anti_alias: bool,
    pub default_color: String,
    pub default_text_color: String,
    pub default_font_size: f32,
    pub default_font_family: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            anti_alias: true,
            default_color: "#000000".to_string(),
            default_text_color: "#000".to_string(),
            default_font_size: 16.0,
            default_font_family: "Arial".to_string(),
        }
    }
}

/// Font discovery settings for text elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub load_system_fonts: bool,
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Document export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Flate-compress the document streams
    pub compress: bool,
    /// Suggested file name returned with the exported document
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            compress: true,
            file_name: "canvas.pdf".to_string(),
        }
    }
}

/// Top-level configuration, constructed once at startup and shared by reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub limits: LimitsConfig,
    pub fetch: FetchConfig,
    pub drawing: DrawingConfig,
    pub fonts: FontConfig,
    pub export: ExportConfig,
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_json_str(&text)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT_MS) {
            self.fetch.timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_FETCH_TIMEOUT_MS,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(ENV_MAX_DIMENSION) {
            let max: u32 = value
                .trim()
                .parse()
                .ok()
                .filter(|max| *max > 0)
                .ok_or_else(|| ConfigError::InvalidEnv {
                    var: ENV_MAX_DIMENSION,
                    value: value.clone(),
                })?;
            self.limits.max_width = max;
            self.limits.max_height = max;
        }

        Ok(())
    }
}
