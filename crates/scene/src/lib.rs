//! Canvas scenes: the keyed scene registry and the service operations
//!
//! - [`SceneStore`] - Registry of live scenes, one lock per scene
//! - [`CanvasService`] - Create, add, delete, list, snapshot, export, destroy
//! - [`SceneError`] - Errors with stable protocol codes

mod error;
mod service;
mod store;

pub use error::SceneError;
pub use service::{CanvasService, ExportedDocument, load_fonts};
pub use store::{SceneHandle, SceneSlot, SceneStore};
