//! Canvas painting core - elements, rasterization and replay
//!
//! This crate provides the drawing model behind a canvas scene:
//! - [`types::Element`] - A validated, immutable drawable unit
//! - [`color`] - Color token parsing
//! - [`validation`] - Parameter and dimension checks
//! - [`surface`] - CPU RGBA surface and decoded bitmaps
//! - [`fonts`] - Font discovery for text elements
//! - [`raster`] - Deterministic per-kind drawing routines
//! - [`record`] - Ordered element storage with change events
//! - [`scene`] - Surface and record kept consistent, plus replay

pub mod color;
pub mod constants;
pub mod fonts;
pub mod raster;
pub mod record;
pub mod scene;
pub mod surface;
pub mod types;
pub mod validation;

pub use color::*;
pub use constants::*;
pub use fonts::*;
pub use raster::{RasterError, Rasterizer};
pub use record::*;
pub use scene::*;
pub use surface::*;
pub use types::*;
pub use validation::*;
