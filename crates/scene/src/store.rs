//! Keyed registry of live scenes.
//!
//! Each scene sits behind its own mutex so mutations of one scene are
//! serialized while different scenes proceed in parallel. The registry
//! lock is only held to look up, insert or remove a handle.

use std::collections::HashMap;
use std::sync::Arc;

use canvas_config::LimitsConfig;
use painting::{Rasterizer, Scene, SceneId, validate_dimensions};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::error::SceneError;

/// A scene slot; `None` once the scene has been taken for export or destroyed
#[derive(Debug)]
pub struct SceneSlot {
    scene: Option<Scene>,
}

pub type SceneHandle = Arc<Mutex<SceneSlot>>;

#[derive(Debug)]
pub struct SceneStore {
    scenes: RwLock<HashMap<SceneId, SceneHandle>>,
    limits: LimitsConfig,
    rasterizer: Rasterizer,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(LimitsConfig::default(), Rasterizer::default())
    }
}

impl SceneStore {
    pub fn new(limits: LimitsConfig, rasterizer: Rasterizer) -> Self {
        Self {
            scenes: RwLock::new(HashMap::new()),
            limits,
            rasterizer,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Allocate a blank scene and register it under a fresh id
    pub fn create(&self, width: u32, height: u32) -> Result<SceneId, SceneError> {
        validate_dimensions(width, height, self.limits.max_width, self.limits.max_height)?;
        let scene = Scene::new(width, height, self.rasterizer)?;
        let id = SceneId::new();
        self.scenes
            .write()
            .insert(id, Arc::new(Mutex::new(SceneSlot { scene: Some(scene) })));
        info!("Created scene {} ({}x{})", id, width, height);
        Ok(id)
    }

    /// Look up a scene handle; never creates one
    pub fn get(&self, id: SceneId) -> Option<SceneHandle> {
        self.scenes.read().get(&id).cloned()
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.scenes.read().contains_key(&id)
    }

    /// Run `f` with exclusive access to a scene
    ///
    /// The scene's lock is held for the whole call, so `f` sees and leaves
    /// the scene in a state between complete mutations.
    pub fn with_scene<R, F>(&self, id: SceneId, f: F) -> Result<R, SceneError>
    where
        F: FnOnce(&mut Scene) -> Result<R, SceneError>,
    {
        let handle = self.get(id).ok_or_else(|| SceneError::scene_not_found(id))?;
        let mut slot = handle.lock();
        let scene = slot
            .scene
            .as_mut()
            .ok_or_else(|| SceneError::scene_not_found(id))?;
        f(scene)
    }

    /// Remove a scene from the registry and hand it to the caller
    ///
    /// A caller that looked the handle up earlier and is waiting on its lock
    /// finds the slot empty and fails as not found.
    pub fn take(&self, id: SceneId) -> Result<Scene, SceneError> {
        let handle = self
            .scenes
            .write()
            .remove(&id)
            .ok_or_else(|| SceneError::scene_not_found(id))?;
        let mut slot = handle.lock();
        slot.scene.take().ok_or_else(|| SceneError::scene_not_found(id))
    }

    /// Drop a scene and everything it owns
    pub fn destroy(&self, id: SceneId) -> Result<(), SceneError> {
        let scene = self.take(id)?;
        info!(
            "Destroyed scene {} with {} element(s)",
            id,
            scene.elements().len()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scenes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.read().is_empty()
    }

    pub fn ids(&self) -> Vec<SceneId> {
        self.scenes.read().keys().copied().collect()
    }
}
