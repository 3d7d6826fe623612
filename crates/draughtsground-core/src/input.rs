//! Pointer input as delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A pointer press, in host pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    /// Came from a touch screen rather than a mouse.
    pub touch: bool,
}

impl Pointer {
    /// A plain left-button mouse press.
    pub fn left(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
            touch: false,
        }
    }

    /// Only the primary button starts gestures.
    pub fn is_primary(&self) -> bool {
        self.button == MouseButton::Left
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Pointer),
    Move { position: Point },
    Up {
        position: Point,
        modifiers: Modifiers,
    },
    /// The platform took the pointer away (e.g. a scroll gesture started).
    Cancel,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down(pointer) => Some(pointer.position),
            PointerEvent::Move { position } | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::Cancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_button() {
        let mut pointer = Pointer::left(Point::new(1.0, 2.0));
        assert!(pointer.is_primary());
        pointer.button = MouseButton::Right;
        assert!(!pointer.is_primary());
    }

    #[test]
    fn test_event_position() {
        let p = Point::new(5.0, 7.0);
        assert_eq!(PointerEvent::Down(Pointer::left(p)).position(), Some(p));
        assert_eq!(PointerEvent::Move { position: p }.position(), Some(p));
        assert_eq!(PointerEvent::Cancel.position(), None);
    }

    #[test]
    fn test_pointer_event_serde() {
        let event = PointerEvent::Up {
            position: Point::new(3.0, 4.0),
            modifiers: Modifiers { ctrl: true, ..Default::default() },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PointerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
