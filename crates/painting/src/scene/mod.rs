//! Scene: a raster surface kept consistent with its element record
//!
//! The scene is the unit every mutation goes through:
//! 1. `add` plans the element, paints it and appends it to the record
//! 2. `remove` drops an element from the record and replays the rest
//!
//! After every call the surface equals [`render`] of the record. Callers
//! that share a scene between tasks must serialize these calls.

mod replay;

pub use replay::{render, replay, ReplayError, ReplayFailure, ReplayReport};

use tracing::debug;

use crate::raster::{RasterError, Rasterizer};
use crate::record::{ElementRecord, RecordEvent};
use crate::surface::Surface;
use crate::types::{Element, ElementId};
use crate::validation::ValidationError;

/// A drawing surface and the ordered elements that produced it
#[derive(Debug)]
pub struct Scene {
    surface: Surface,
    record: ElementRecord,
    rasterizer: Rasterizer,
}

impl Scene {
    /// Create a scene with a blank `width`x`height` surface
    pub fn new(width: u32, height: u32, rasterizer: Rasterizer) -> Result<Self, ValidationError> {
        Ok(Self {
            surface: Surface::new(width, height)?,
            record: ElementRecord::new(),
            rasterizer,
        })
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn record(&self) -> &ElementRecord {
        &self.record
    }

    pub fn elements(&self) -> &[Element] {
        self.record.as_slice()
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Register a listener for record changes on this scene
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&RecordEvent) + Send + Sync + 'static,
    {
        self.record.add_listener(listener);
    }

    /// Draw an element and append it to the record
    ///
    /// Either both the surface and the record change, or neither does.
    pub fn add(&mut self, element: Element) -> Result<ElementId, RasterError> {
        let plan = self
            .rasterizer
            .plan(self.surface.width(), self.surface.height(), element.shape())?;
        plan.paint(self.surface.pixmap_mut());
        debug!("Added {} {} at index {}", element.kind(), element.id(), self.record.len());
        Ok(self.record.append(element))
    }

    /// Remove an element and rebuild the surface from the remaining record
    ///
    /// If some survivors cannot be redrawn the element stays removed, the
    /// surface holds everything that could be drawn, and the failures are
    /// returned as [`ReplayError::Incomplete`].
    pub fn remove(&mut self, element_id: ElementId) -> Result<Element, ReplayError> {
        let (index, element) = self
            .record
            .remove(element_id)
            .ok_or(ReplayError::ElementNotFound(element_id))?;
        debug!("Removed {} {} from index {}", element.kind(), element_id, index);

        let report = self.rebuild();
        if report.is_complete() {
            Ok(element)
        } else {
            Err(ReplayError::Incomplete {
                removed: element_id,
                failures: report.failures,
            })
        }
    }

    /// Clear the surface and redraw the whole record
    pub fn rebuild(&mut self) -> ReplayReport {
        let report = replay(&self.rasterizer, &mut self.surface, self.record.as_slice());
        self.record.emit(RecordEvent::Replayed {
            drawn: report.drawn,
            failed: report.failed_ids(),
        });
        report
    }

    /// Consume the scene, keeping only its surface
    pub fn into_surface(self) -> Surface {
        self.surface
    }

    /// Append without drawing, for exercising replay failures
    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, element: Element) -> ElementId {
        self.record.append(element)
    }
}
