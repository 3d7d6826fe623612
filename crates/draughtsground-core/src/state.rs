//! Board state owned by one board instance.

use crate::anim::AnimCurrent;
use crate::coords::CoordSystem;
use crate::drag::DragCurrent;
use crate::notify::{Notification, NotificationQueue};
use crate::types::{BoardSize, Color, Key, Pieces, Role};
use crate::variant::Variant;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Legal destinations per origin square, as supplied by the rules engine.
pub type Dests = BTreeMap<Key, Vec<Key>>;

/// Which side the user may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovableColor {
    White,
    Black,
    Both,
}

impl MovableColor {
    pub fn allows(self, color: Color) -> bool {
        match self {
            MovableColor::Both => true,
            MovableColor::White => color == Color::White,
            MovableColor::Black => color == Color::Black,
        }
    }

    /// The single colour, if this is not `Both`.
    pub fn color(self) -> Option<Color> {
        match self {
            MovableColor::White => Some(Color::White),
            MovableColor::Black => Some(Color::Black),
            MovableColor::Both => None,
        }
    }
}

impl From<Color> for MovableColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => MovableColor::White,
            Color::Black => MovableColor::Black,
        }
    }
}

/// Legality inputs for user moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Movable {
    /// Any move by the movable colour is allowed.
    pub free: bool,
    /// `None` means nobody may move.
    pub color: Option<MovableColor>,
    pub dests: Option<Dests>,
    pub show_dests: bool,
    /// Capture legs available from the current position, including the next one.
    pub capt_len: Option<u8>,
}

impl Movable {
    /// Whether the next move continues a capture chain.
    pub fn chain_continues(&self) -> bool {
        self.capt_len.is_some_and(|n| n > 1)
    }
}

impl Default for Movable {
    fn default() -> Self {
        Self {
            free: true,
            color: Some(MovableColor::Both),
            dests: None,
            show_dests: true,
            capt_len: None,
        }
    }
}

/// Moves staged while it is not the mover's turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Premovable {
    pub enabled: bool,
    pub show_dests: bool,
    /// Geometry used for premove candidates; defaults to the board variant.
    pub variant: Option<Variant>,
    /// Candidates for the selected piece.
    pub dests: Option<Vec<Key>>,
    pub current: Option<(Key, Key)>,
}

impl Default for Premovable {
    fn default() -> Self {
        Self {
            enabled: true,
            show_dests: true,
            variant: None,
            dests: None,
            current: None,
        }
    }
}

/// A placement staged while it is not the placer's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predrop {
    pub role: Role,
    pub key: Key,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predroppable {
    pub enabled: bool,
    pub current: Option<Predrop>,
}

/// Drag behaviour and the drag in progress.
#[derive(Debug, Clone)]
pub struct Draggable {
    pub enabled: bool,
    /// Pointer travel in pixels before a press becomes a drag.
    pub distance: f64,
    /// Skip the travel threshold once the user has dragged before.
    pub auto_distance: bool,
    /// Lift the piece above the pointer (touch screens).
    pub magnified: bool,
    /// Center the piece under the pointer.
    pub center_piece: bool,
    /// Host should suppress the platform's default pointer action.
    pub prevent_default: bool,
    /// Leave a ghost of the piece on its origin square.
    pub show_ghost: bool,
    /// Remove pieces dropped outside the board.
    pub delete_on_drop_off: bool,
    pub current: Option<DragCurrent>,
}

impl Default for Draggable {
    fn default() -> Self {
        Self {
            enabled: true,
            distance: 3.0,
            auto_distance: true,
            magnified: false,
            center_piece: true,
            prevent_default: true,
            show_ghost: true,
            delete_on_drop_off: false,
            current: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selectable {
    /// Click a piece, then a destination.
    pub enabled: bool,
}

impl Default for Selectable {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Animation settings and the plan being played.
#[derive(Debug, Clone)]
pub struct Animation {
    pub enabled: bool,
    /// Milliseconds for a single-leg move.
    pub duration: f64,
    pub current: Option<AnimCurrent>,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 200.0,
            current: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    /// Mark the squares of the last move.
    pub last_move: bool,
    /// Mark squares holding ghosts of an unfinished capture.
    pub ghosts: bool,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            last_move: true,
            ghosts: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub show: bool,
    pub system: CoordSystem,
}

impl Default for Coordinates {
    fn default() -> Self {
        Self {
            show: true,
            system: CoordSystem::FieldNumbers,
        }
    }
}

/// Interaction bookkeeping carried between gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// The last completed move was made by dragging.
    pub dragged: bool,
    pub ctrl_key: bool,
}

/// Geometry used by the last render, for change detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrevRender {
    pub orientation: Color,
    pub board_size: BoardSize,
    pub bounds: Option<Rect>,
}

/// Everything one board knows. Engine functions take it explicitly.
#[derive(Debug, Clone)]
pub struct State {
    pub pieces: Pieces,
    pub board_size: BoardSize,
    pub variant: Variant,
    pub orientation: Color,
    pub turn_color: Color,
    pub selected: Option<Key>,
    /// First key is the origin, last the destination, the rest hop landings.
    pub last_move: Option<Vec<Key>>,
    /// No interaction at all.
    pub view_only: bool,
    /// Static snapshot: no animation, orientation locked.
    pub fixed: bool,
    pub coordinates: Coordinates,
    pub highlight: Highlight,
    pub animation: Animation,
    pub movable: Movable,
    pub premovable: Premovable,
    pub predroppable: Predroppable,
    pub draggable: Draggable,
    pub selectable: Selectable,
    pub stats: Stats,
    /// Board rectangle in host pixels, once measured.
    pub bounds: Option<Rect>,
    pub prev: Option<PrevRender>,
    pub notifications: NotificationQueue,
}

impl Default for State {
    fn default() -> Self {
        Self {
            pieces: Pieces::new(),
            board_size: BoardSize::default(),
            variant: Variant::default(),
            orientation: Color::White,
            turn_color: Color::White,
            selected: None,
            last_move: None,
            view_only: false,
            fixed: false,
            coordinates: Coordinates::default(),
            highlight: Highlight::default(),
            animation: Animation::default(),
            movable: Movable::default(),
            premovable: Premovable::default(),
            predroppable: Predroppable::default(),
            draggable: Draggable::default(),
            selectable: Selectable::default(),
            stats: Stats::default(),
            bounds: None,
            prev: None,
            notifications: NotificationQueue::new(),
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Variant whose geometry premove candidates follow.
    pub fn premove_variant(&self) -> Variant {
        self.premovable.variant.unwrap_or(self.variant)
    }

    /// Whether any ghost is on the board, i.e. a capture chain is open.
    pub fn has_ghosts(&self) -> bool {
        self.pieces.values().any(|p| p.role.is_ghost())
    }

    /// Whether orientation, size or bounds differ from the last render.
    pub fn geometry_changed(&self) -> bool {
        match self.prev {
            Some(prev) => {
                prev.orientation != self.orientation
                    || prev.board_size != self.board_size
                    || prev.bounds != self.bounds
            }
            None => true,
        }
    }

    /// Whether orientation or size differ from the last render.
    pub fn layout_changed(&self) -> bool {
        self.prev.is_none_or(|prev| {
            prev.orientation != self.orientation || prev.board_size != self.board_size
        })
    }

    /// Record the geometry just rendered.
    pub fn mark_rendered(&mut self) {
        self.prev = Some(PrevRender {
            orientation: self.orientation,
            board_size: self.board_size,
            bounds: self.bounds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_change_detection() {
        let mut state = State::new();
        assert!(state.geometry_changed());
        state.mark_rendered();
        assert!(!state.geometry_changed());
        state.bounds = Some(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(state.geometry_changed());
        assert!(!state.layout_changed());
        state.orientation = Color::Black;
        assert!(state.layout_changed());
    }

    #[test]
    fn test_movable_color() {
        assert!(MovableColor::Both.allows(Color::Black));
        assert!(!MovableColor::White.allows(Color::Black));
        assert_eq!(MovableColor::from(Color::Black).color(), Some(Color::Black));
    }
}
