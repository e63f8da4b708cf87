//! Events emitted when a scene's element record changes.

use crate::types::{ElementId, ElementKind};

/// Events emitted when a scene's element record changes.
///
/// These let a mirror of the record (for example a client that shows an
/// element list or its own preview) follow appends and removals in the
/// same order the scene applies them.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    /// An element was rasterized and appended at `index`.
    Appended {
        element_id: ElementId,
        kind: ElementKind,
        index: usize,
    },
    /// An element was removed from `index`; later elements shifted down by one.
    Removed { element_id: ElementId, index: usize },
    /// The surface was rebuilt from the record.
    Replayed { drawn: usize, failed: Vec<ElementId> },
}
