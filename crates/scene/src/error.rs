//! Errors reported by scene operations.

use canvas_export::ExportError;
use canvas_imaging::ImageError;
use canvas_protocol::{ErrorCode, ProtocolError};
use painting::{ElementId, RasterError, ReplayError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Element cannot be drawn: {0}")]
    Render(#[from] RasterError),

    #[error("Element {removed} removed but {} element(s) could not be redrawn", .failed.len())]
    Replay {
        removed: ElementId,
        failed: Vec<ElementId>,
    },

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl SceneError {
    pub fn scene_not_found(id: impl ToString) -> Self {
        SceneError::NotFound {
            kind: "Scene",
            id: id.to_string(),
        }
    }

    pub fn element_not_found(id: impl ToString) -> Self {
        SceneError::NotFound {
            kind: "Element",
            id: id.to_string(),
        }
    }

    /// Stable code reported to callers
    pub fn code(&self) -> ErrorCode {
        match self {
            SceneError::Validation(_) => ErrorCode::ValidationError,
            SceneError::NotFound { .. } => ErrorCode::NotFound,
            SceneError::Image(err) if err.is_fetch() => ErrorCode::FetchError,
            SceneError::Image(_) => ErrorCode::DecodeError,
            SceneError::Render(_) => ErrorCode::RenderError,
            SceneError::Replay { .. } => ErrorCode::ReplayFailure,
            SceneError::Export(_) => ErrorCode::ExportError,
        }
    }
}

impl From<ReplayError> for SceneError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::ElementNotFound(id) => SceneError::element_not_found(id),
            ReplayError::Incomplete { removed, failures } => SceneError::Replay {
                removed,
                failed: failures.into_iter().map(|f| f.element_id).collect(),
            },
        }
    }
}

impl From<ProtocolError> for SceneError {
    fn from(err: ProtocolError) -> Self {
        match err {
            // An id that does not parse cannot name anything that exists
            ProtocolError::InvalidId { kind, value } => SceneError::NotFound {
                kind: if kind == "scene" { "Scene" } else { "Element" },
                id: value,
            },
            ProtocolError::Json(err) => SceneError::Validation(ValidationError::Invalid {
                field: "request",
                reason: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use painting::{ElementKind, ReplayFailure};

    #[test]
    fn test_codes() {
        assert_eq!(
            SceneError::from(ValidationError::Missing("x")).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(SceneError::scene_not_found("abc").code(), ErrorCode::NotFound);
        assert_eq!(
            SceneError::from(ImageError::Status(404)).code(),
            ErrorCode::FetchError
        );
        assert_eq!(
            SceneError::from(ImageError::Decode("bad".into())).code(),
            ErrorCode::DecodeError
        );
        assert_eq!(
            SceneError::from(RasterError::FontUnavailable("Arial".into())).code(),
            ErrorCode::RenderError
        );
    }

    #[test]
    fn test_replay_error_conversion() {
        let removed = ElementId::new();
        let bad = ElementId::new();
        let err = SceneError::from(ReplayError::Incomplete {
            removed,
            failures: vec![ReplayFailure {
                element_id: bad,
                kind: ElementKind::Rectangle,
                error: RasterError::Geometry(ElementKind::Rectangle),
            }],
        });
        assert_eq!(err.code(), ErrorCode::ReplayFailure);
        let SceneError::Replay { failed, .. } = err else {
            panic!("expected a replay error");
        };
        assert_eq!(failed, vec![bad]);

        let missing = ElementId::new();
        assert_eq!(
            SceneError::from(ReplayError::ElementNotFound(missing)).code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn test_unparseable_ids_are_not_found() {
        let err = SceneError::from(ProtocolError::InvalidId {
            kind: "scene",
            value: "nope".into(),
        });
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "Scene nope not found");
    }
}
