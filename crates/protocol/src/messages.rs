//! Request and response enums exchanged at the system boundary.

use painting::{Element, ElementId, ElementKind, SceneId};
use serde::{Deserialize, Serialize};

use crate::elements::ElementSpec;
use crate::error::ProtocolError;

/// Operations a caller can request.
///
/// Ids travel as strings; an id that does not parse names no scene or
/// element and is reported as not found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum Request {
    /// Allocate a blank scene
    CreateScene {
        width: Option<f64>,
        height: Option<f64>,
    },

    /// Validate, draw and append one element
    AddElement {
        scene_id: String,
        element: ElementSpec,
    },

    /// Remove one element and rebuild the surface
    DeleteElement { scene_id: String, element_id: String },

    /// The ordered element record
    ListElements { scene_id: String },

    /// Current surface as PNG, without consuming the scene
    SnapshotPng { scene_id: String },

    /// Encode the surface as a PDF and destroy the scene
    ExportDocument { scene_id: String },

    /// Destroy the scene without exporting
    DestroyScene { scene_id: String },
}

impl Request {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Scene the request addresses, if any
    pub fn scene_id(&self) -> Option<&str> {
        match self {
            Request::CreateScene { .. } => None,
            Request::AddElement { scene_id, .. }
            | Request::DeleteElement { scene_id, .. }
            | Request::ListElements { scene_id }
            | Request::SnapshotPng { scene_id }
            | Request::ExportDocument { scene_id }
            | Request::DestroyScene { scene_id } => Some(scene_id),
        }
    }
}

/// Responses, one per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum Response {
    SceneCreated {
        scene_id: String,
        width: u32,
        height: u32,
    },

    ElementAdded { element_id: String },

    ElementDeleted { element_id: String },

    Elements { elements: Vec<ElementSummary> },

    /// Base64 encoded PNG
    Snapshot { data: String },

    /// Base64 encoded document with its suggested file name
    Document {
        file_name: String,
        content_type: String,
        data: String,
    },

    SceneDestroyed { scene_id: String },

    Error {
        code: ErrorCode,
        message: String,
        /// Elements a replay could not redraw
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        failed: Vec<String>,
    },
}

impl Response {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

/// One entry of the element list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub element_id: String,
    pub kind: ElementKind,
}

impl From<&Element> for ElementSummary {
    fn from(element: &Element) -> Self {
        Self {
            element_id: element.id().to_string(),
            kind: element.kind(),
        }
    }
}

/// Stable error codes reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    FetchError,
    DecodeError,
    ReplayFailure,
    RenderError,
    ExportError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::FetchError => "fetch_error",
            ErrorCode::DecodeError => "decode_error",
            ErrorCode::ReplayFailure => "replay_failure",
            ErrorCode::RenderError => "render_error",
            ErrorCode::ExportError => "export_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn parse_scene_id(value: &str) -> Result<SceneId, ProtocolError> {
    value.trim().parse().map_err(|_| ProtocolError::InvalidId {
        kind: "scene",
        value: value.to_string(),
    })
}

pub fn parse_element_id(value: &str) -> Result<ElementId, ProtocolError> {
    value.trim().parse().map_err(|_| ProtocolError::InvalidId {
        kind: "element",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::RectangleSpec;

    #[test]
    fn test_request_wire_format() {
        let request = Request::from_json(
            r#"{"type":"AddElement","data":{"sceneId":"abc","element":{"type":"rectangle","x":1,"y":2,"width":3,"height":4}}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::AddElement {
                scene_id: "abc".to_string(),
                element: ElementSpec::Rectangle(RectangleSpec {
                    x: Some(1.0),
                    y: Some(2.0),
                    width: Some(3.0),
                    height: Some(4.0),
                    ..Default::default()
                }),
            }
        );
        assert_eq!(request.scene_id(), Some("abc"));
    }

    #[test]
    fn test_create_scene_allows_missing_dimensions() {
        let request = Request::from_json(r#"{"type":"CreateScene","data":{"width":800}}"#).unwrap();
        assert_eq!(
            request,
            Request::CreateScene {
                width: Some(800.0),
                height: None,
            }
        );
    }

    #[test]
    fn test_unknown_request_type() {
        assert!(matches!(
            Request::from_json(r#"{"type":"Resize","data":{}}"#),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn test_error_response_format() {
        let response = Response::Error {
            code: ErrorCode::NotFound,
            message: "Scene not found".to_string(),
            failed: vec![],
        };
        let json = response.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"Error","data":{"code":"not_found","message":"Scene not found"}}"#
        );
        assert!(response.is_error());
    }

    #[test]
    fn test_error_codes_match_serde_names() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::FetchError,
            ErrorCode::DecodeError,
            ErrorCode::ReplayFailure,
            ErrorCode::RenderError,
            ErrorCode::ExportError,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code));
        }
    }

    #[test]
    fn test_id_parsing() {
        let id = SceneId::new();
        assert_eq!(parse_scene_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_element_id("nope"),
            Err(ProtocolError::InvalidId { kind: "element", .. })
        ));
    }
}
