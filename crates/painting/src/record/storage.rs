//! Ordered element storage for a single scene.

use std::fmt;

use crate::types::{Element, ElementId};

use super::events::RecordEvent;

type Listener = Box<dyn Fn(&RecordEvent) + Send + Sync>;

/// Ordered, append-only record of a scene's elements.
///
/// The only other mutation is removing a single element, which keeps the
/// relative order of the survivors. The record is owned by its scene and
/// is guarded by the scene's lock, so it needs no locking of its own.
#[derive(Default)]
pub struct ElementRecord {
    elements: Vec<Element>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for ElementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRecord")
            .field("element_count", &self.elements.len())
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl ElementRecord {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element to the end of the record.
    ///
    /// Emits an `Appended` event to all registered listeners.
    pub fn append(&mut self, element: Element) -> ElementId {
        let element_id = element.id();
        let kind = element.kind();
        let index = self.elements.len();
        self.elements.push(element);
        self.emit(RecordEvent::Appended {
            element_id,
            kind,
            index,
        });
        element_id
    }

    /// Remove an element by id, returning its former index and the element.
    ///
    /// Returns None (and emits nothing) if the id is unknown.
    pub fn remove(&mut self, element_id: ElementId) -> Option<(usize, Element)> {
        let index = self.position(element_id)?;
        let element = self.elements.remove(index);
        self.emit(RecordEvent::Removed { element_id, index });
        Some((index, element))
    }

    pub fn position(&self, element_id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == element_id)
    }

    pub fn get(&self, element_id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == element_id)
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    /// Element ids in record order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(Element::id).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Register a listener that receives every subsequent event.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&RecordEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Emit an event to all registered listeners.
    pub(crate) fn emit(&self, event: RecordEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }
}
