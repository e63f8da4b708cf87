//! Canvas service: the operations exposed at the system boundary.
//!
//! Image elements are resolved (fetched and decoded) before the scene lock
//! is taken, so a slow fetch never blocks other work on the same scene.
//! Everything after that runs under the scene's lock.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use canvas_config::{CanvasConfig, FontConfig};
use canvas_export::{CONTENT_TYPE, PdfExporter};
use canvas_imaging::{HttpFetcher, ImageFetcher, ImageResolver};
use canvas_protocol::{
    ElementDraft, ElementSpec, ElementSummary, Request, Response, parse_element_id,
    parse_scene_id, scene_dimensions,
};
use painting::{
    Element, ElementId, FontBook, Rasterizer, RecordEvent, SceneId, Shape, Text, ValidationError,
    require_at_most, validate_text,
};
use tracing::{info, warn};

use crate::error::SceneError;
use crate::store::SceneStore;

/// An exported document and how to present it
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

/// Build a font book from the font settings
pub fn load_fonts(config: &FontConfig) -> FontBook {
    let fonts = FontBook::new();
    if config.load_system_fonts {
        fonts.load_system_fonts();
    }
    for dir in &config.font_dirs {
        fonts.load_fonts_dir(dir);
    }
    fonts
}

pub struct CanvasService<F = HttpFetcher> {
    store: SceneStore,
    resolver: ImageResolver<F>,
    fonts: FontBook,
    exporter: PdfExporter,
    config: CanvasConfig,
}

impl CanvasService<HttpFetcher> {
    /// Service with an HTTP fetcher and fonts discovered per the config
    pub fn from_config(config: CanvasConfig) -> Result<Self, SceneError> {
        let fetcher = HttpFetcher::new(&config.fetch, config.limits.max_image_bytes)?;
        let fonts = load_fonts(&config.fonts);
        Ok(Self::new(config, fetcher, fonts))
    }
}

impl<F: ImageFetcher> CanvasService<F> {
    pub fn new(config: CanvasConfig, fetcher: F, fonts: FontBook) -> Self {
        let rasterizer = Rasterizer::new(config.drawing.stroke_width, config.drawing.anti_alias);
        Self {
            store: SceneStore::new(config.limits.clone(), rasterizer),
            resolver: ImageResolver::new(fetcher, config.limits.max_image_bytes),
            fonts,
            exporter: PdfExporter::from_config(&config.export),
            config,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fetcher(&self) -> &F {
        self.resolver.fetcher()
    }

    pub fn create_scene(&self, width: u32, height: u32) -> Result<SceneId, SceneError> {
        self.store.create(width, height)
    }

    /// Validate, draw and append one element
    ///
    /// On any error the scene's record and surface are unchanged.
    pub async fn add_element(&self, scene_id: SceneId, spec: ElementSpec) -> Result<ElementId, SceneError> {
        if !self.store.contains(scene_id) {
            return Err(SceneError::scene_not_found(scene_id));
        }

        let kind = spec.kind();
        let element = self.build_element(spec).await.inspect_err(|err| {
            warn!("Rejected {} for scene {}: {}", kind, scene_id, err);
        })?;

        let max_elements = self.config.limits.max_elements;
        self.store.with_scene(scene_id, |scene| {
            if scene.elements().len() >= max_elements {
                return Err(ValidationError::Invalid {
                    field: "elements",
                    reason: format!("scene already holds the maximum of {}", max_elements),
                }
                .into());
            }
            Ok(scene.add(element)?)
        })
    }

    async fn build_element(&self, spec: ElementSpec) -> Result<Element, SceneError> {
        let shape = match spec.validate(&self.config.drawing)? {
            ElementDraft::Shape(shape) => shape,
            ElementDraft::Text(params) => {
                validate_text(&params)?;
                require_at_most("fontSize", params.font_size, self.config.limits.max_font_size)?;
                let face = self.fonts.resolve(&params.font_family)?;
                Shape::Text(Text::new(params, face))
            }
            ElementDraft::Image { source, placement } => {
                let bitmap = self.resolver.resolve(source).await?;
                Shape::Image(placement.into_image(Arc::new(bitmap)))
            }
        };
        Ok(Element::new(shape)?)
    }

    /// Remove an element and rebuild the scene's surface
    pub fn delete_element(&self, scene_id: SceneId, element_id: ElementId) -> Result<(), SceneError> {
        self.store.with_scene(scene_id, |scene| {
            scene.remove(element_id)?;
            Ok(())
        })
    }

    pub fn list_elements(&self, scene_id: SceneId) -> Result<Vec<ElementSummary>, SceneError> {
        self.store.with_scene(scene_id, |scene| {
            Ok(scene.elements().iter().map(ElementSummary::from).collect())
        })
    }

    /// Encode the current surface as PNG without consuming the scene
    pub fn snapshot_png(&self, scene_id: SceneId) -> Result<Vec<u8>, SceneError> {
        self.store
            .with_scene(scene_id, |scene| Ok(scene.surface().encode_png()?))
    }

    /// Encode the scene as a single-page PDF; the scene is gone afterwards
    pub fn export_document(&self, scene_id: SceneId) -> Result<ExportedDocument, SceneError> {
        let scene = self.store.take(scene_id)?;
        let bytes = self.exporter.encode(scene.surface())?;
        info!(
            "Exported scene {} ({} element(s), {} bytes)",
            scene_id,
            scene.elements().len(),
            bytes.len()
        );
        Ok(ExportedDocument {
            bytes,
            file_name: self.config.export.file_name.clone(),
            content_type: CONTENT_TYPE,
        })
    }

    pub fn destroy_scene(&self, scene_id: SceneId) -> Result<(), SceneError> {
        self.store.destroy(scene_id)
    }

    /// Follow a scene's record changes
    ///
    /// `listener` sees every later append, removal and replay in the order
    /// the scene applies them, which is what a client-side mirror of the
    /// element list needs to stay in step.
    pub fn watch_scene<L>(&self, scene_id: SceneId, listener: L) -> Result<(), SceneError>
    where
        L: Fn(&RecordEvent) + Send + Sync + 'static,
    {
        self.store.with_scene(scene_id, |scene| {
            scene.add_listener(listener);
            Ok(())
        })
    }

    /// Run one boundary request
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(err) => {
                let failed = match &err {
                    SceneError::Replay { failed, .. } => failed.iter().map(ToString::to_string).collect(),
                    _ => Vec::new(),
                };
                Response::Error {
                    code: err.code(),
                    message: err.to_string(),
                    failed,
                }
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response, SceneError> {
        match request {
            Request::CreateScene { width, height } => {
                let (width, height) = scene_dimensions(width, height)?;
                let scene_id = self.create_scene(width, height)?;
                Ok(Response::SceneCreated {
                    scene_id: scene_id.to_string(),
                    width,
                    height,
                })
            }
            Request::AddElement { scene_id, element } => {
                let element_id = self.add_element(parse_scene_id(&scene_id)?, element).await?;
                Ok(Response::ElementAdded {
                    element_id: element_id.to_string(),
                })
            }
            Request::DeleteElement {
                scene_id,
                element_id,
            } => {
                let scene_id = parse_scene_id(&scene_id)?;
                // An unparseable element id on a missing scene reports the scene
                if !self.store.contains(scene_id) {
                    return Err(SceneError::scene_not_found(scene_id));
                }
                self.delete_element(scene_id, parse_element_id(&element_id)?)?;
                Ok(Response::ElementDeleted { element_id })
            }
            Request::ListElements { scene_id } => Ok(Response::Elements {
                elements: self.list_elements(parse_scene_id(&scene_id)?)?,
            }),
            Request::SnapshotPng { scene_id } => Ok(Response::Snapshot {
                data: STANDARD.encode(self.snapshot_png(parse_scene_id(&scene_id)?)?),
            }),
            Request::ExportDocument { scene_id } => {
                let document = self.export_document(parse_scene_id(&scene_id)?)?;
                Ok(Response::Document {
                    file_name: document.file_name,
                    content_type: document.content_type.to_string(),
                    data: STANDARD.encode(&document.bytes),
                })
            }
            Request::DestroyScene { scene_id } => {
                self.destroy_scene(parse_scene_id(&scene_id)?)?;
                Ok(Response::SceneDestroyed { scene_id })
            }
        }
    }
}
