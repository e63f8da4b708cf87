//! Element record for a scene
//!
//! This module provides:
//! - [`ElementRecord`] - Ordered storage of every element drawn on a scene
//! - [`RecordEvent`] - Events for observers of record changes
//!
//! The record is the source of truth for a scene's content. The surface is
//! always reproducible by replaying the record in order onto a cleared
//! surface.

mod events;
mod storage;

pub use events::RecordEvent;
pub use storage::ElementRecord;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::color::Color;
    use crate::types::{Circle, Element, ElementKind, Rectangle, Shape};

    fn rect() -> Element {
        Element::new(Shape::Rectangle(Rectangle {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
            color: Color::BLACK,
            filled: true,
        }))
        .unwrap()
    }

    fn circle() -> Element {
        Element::new(Shape::Circle(Circle {
            x: 2.0,
            y: 2.0,
            radius: 1.0,
            color: Color::BLACK,
            filled: false,
        }))
        .unwrap()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut record = ElementRecord::new();
        let a = record.append(rect());
        let b = record.append(circle());
        let c = record.append(rect());

        assert_eq!(record.ids(), vec![a, b, c]);
        assert_eq!(record.position(b), Some(1));
        assert_eq!(record.get(b).map(Element::kind), Some(ElementKind::Circle));
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut record = ElementRecord::new();
        let a = record.append(rect());
        let b = record.append(circle());
        let c = record.append(rect());

        let (index, removed) = record.remove(b).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.id(), b);
        assert_eq!(record.ids(), vec![a, c]);

        // Unknown ids are not an error at this level
        assert!(record.remove(b).is_none());
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_listeners_see_events_in_order() {
        let mut record = ElementRecord::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        record.add_listener(move |event| sink.lock().push(event.clone()));

        let a = record.append(rect());
        let b = record.append(circle());
        record.remove(a);

        let events = seen.lock();
        assert_eq!(
            *events,
            vec![
                RecordEvent::Appended {
                    element_id: a,
                    kind: ElementKind::Rectangle,
                    index: 0,
                },
                RecordEvent::Appended {
                    element_id: b,
                    kind: ElementKind::Circle,
                    index: 1,
                },
                RecordEvent::Removed {
                    element_id: a,
                    index: 0,
                },
            ]
        );
    }
}
