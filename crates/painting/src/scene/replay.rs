//! Replay: rebuild a surface from an ordered element record

use thiserror::Error;
use tracing::{debug, warn};

use crate::raster::{RasterError, Rasterizer};
use crate::surface::Surface;
use crate::types::{Element, ElementId, ElementKind};
use crate::validation::ValidationError;

/// An element that could not be redrawn during a replay
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFailure {
    pub element_id: ElementId,
    pub kind: ElementKind,
    pub error: RasterError,
}

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// Number of elements drawn successfully
    pub drawn: usize,
    /// Elements that failed, in record order
    pub failures: Vec<ReplayFailure>,
}

impl ReplayReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<ElementId> {
        self.failures.iter().map(|f| f.element_id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    #[error("Element {0} not found")]
    ElementNotFound(ElementId),
    /// The element was removed but the rebuild could not redraw everything
    #[error("Element {removed} removed but {} element(s) could not be redrawn", .failures.len())]
    Incomplete {
        removed: ElementId,
        failures: Vec<ReplayFailure>,
    },
}

/// Clear `surface` and redraw `elements` in order
///
/// Elements that fail to draw are skipped and reported; everything else is
/// still drawn, so the surface holds as much of the record as possible.
pub fn replay(rasterizer: &Rasterizer, surface: &mut Surface, elements: &[Element]) -> ReplayReport {
    surface.clear();

    let report = elements
        .iter()
        .fold(ReplayReport::default(), |mut report, element| {
            match rasterizer.draw(surface, element) {
                Ok(()) => report.drawn += 1,
                Err(error) => {
                    warn!("Replay could not redraw {} {}: {}", element.kind(), element.id(), error);
                    report.failures.push(ReplayFailure {
                        element_id: element.id(),
                        kind: element.kind(),
                        error,
                    });
                }
            }
            report
        });

    debug!(
        "Replayed {} element(s), {} failure(s)",
        report.drawn,
        report.failures.len()
    );
    report
}

/// Render `elements` onto a fresh blank surface
///
/// This is the reference the maintained surface of a scene must match.
pub fn render(
    width: u32,
    height: u32,
    elements: &[Element],
    rasterizer: &Rasterizer,
) -> Result<(Surface, ReplayReport), ValidationError> {
    let mut surface = Surface::new(width, height)?;
    let report = replay(rasterizer, &mut surface, elements);
    Ok((surface, report))
}
