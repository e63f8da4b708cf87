//! Font discovery and face caching for text elements
//!
//! Faces are discovered with `fontdb` and parsed into `fontdue` fonts on
//! first use. A parsed face is attached to every text element that uses
//! it, so replays never touch the font database.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, ID};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::constants::FALLBACK_FONT_FAMILY;
use crate::raster::RasterError;

/// A parsed font face shared between text elements
#[derive(Clone)]
pub struct Face {
    family: String,
    font: Arc<fontdue::Font>,
}

impl Face {
    /// Family name the face was resolved to
    pub fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn font(&self) -> &fontdue::Font {
        &self.font
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face").field("family", &self.family).finish()
    }
}

/// Registry of available fonts
#[derive(Default)]
pub struct FontBook {
    db: RwLock<Database>,
    parsed: Mutex<HashMap<ID, Face>>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.face_count())
            .field("parsed", &self.parsed.lock().len())
            .finish()
    }
}

impl FontBook {
    /// Create an empty font book
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_system_fonts(&self) {
        let mut db = self.db.write();
        db.load_system_fonts();
        debug!("Loaded system fonts, {} faces available", db.len());
    }

    pub fn load_fonts_dir(&self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref();
        let mut db = self.db.write();
        db.load_fonts_dir(dir);
        debug!("Loaded fonts from {}, {} faces available", dir.display(), db.len());
    }

    /// Register a font from memory (TTF, OTF or a collection)
    pub fn load_font_data(&self, data: Vec<u8>) {
        self.db.write().load_font_data(data);
    }

    pub fn face_count(&self) -> usize {
        self.db.read().len()
    }

    /// Resolve a CSS-style family list such as `"Helvetica, Arial, sans-serif"`
    ///
    /// Families are tried in order, then the generic sans-serif family, then
    /// the first face in the database.
    pub fn resolve(&self, families: &str) -> Result<Face, RasterError> {
        let id = {
            let db = self.db.read();
            let names = parse_family_list(families);
            let mut candidates: Vec<Family<'_>> = names.iter().map(|name| generic_or_named(name)).collect();
            candidates.push(generic_or_named(FALLBACK_FONT_FAMILY));

            let query = Query {
                families: &candidates,
                ..Default::default()
            };
            db.query(&query).or_else(|| {
                let first = db.faces().next().map(|face| face.id);
                if first.is_some() {
                    warn!("No face matches {:?}, using the first available font", families);
                }
                first
            })
        };

        let id = id.ok_or_else(|| RasterError::FontUnavailable(families.to_string()))?;
        self.load_face(id, families)
    }

    fn load_face(&self, id: ID, requested: &str) -> Result<Face, RasterError> {
        let mut parsed = self.parsed.lock();
        if let Some(face) = parsed.get(&id) {
            return Ok(face.clone());
        }

        let db = self.db.read();
        let family = db
            .face(id)
            .and_then(|info| info.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| requested.to_string());

        let font = db
            .with_face_data(id, |data, index| {
                let settings = fontdue::FontSettings {
                    collection_index: index,
                    ..fontdue::FontSettings::default()
                };
                fontdue::Font::from_bytes(data, settings)
            })
            .ok_or_else(|| RasterError::FontUnavailable(requested.to_string()))?
            .map_err(|reason| RasterError::FontParse {
                family: family.clone(),
                reason: reason.to_string(),
            })?;

        debug!("Parsed font face {:?} for {:?}", family, requested);
        let face = Face {
            family,
            font: Arc::new(font),
        };
        parsed.insert(id, face.clone());
        Ok(face)
    }
}

fn parse_family_list(families: &str) -> Vec<String> {
    families
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn generic_or_named(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}
