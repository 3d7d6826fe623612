//! Draughtsground Core Library
//!
//! Board-widget engine for draughts: live board state, move and capture
//! application, multi-hop capture animation planning and drag gestures.
//! Rendering backends live in `draughtsground-render`.

pub mod anim;
pub mod api;
pub mod board;
pub mod capture;
pub mod config;
pub mod coords;
pub mod drag;
pub mod fen;
pub mod input;
pub mod notify;
pub mod premove;
pub mod state;
pub mod types;
pub mod variant;

pub use anim::{AnimCurrent, AnimPlan, AnimStep, AnimVector};
pub use api::{Draughtsground, FrameStatus};
pub use config::{Config, ConfigError};
pub use coords::CoordSystem;
pub use drag::{DragCurrent, DragEnd, DragPhase};
pub use input::{Modifiers, MouseButton, Pointer, PointerEvent};
pub use notify::{Hooks, MoveMetadata, Notification, NotificationQueue};
pub use state::{Dests, MovableColor, State};
pub use types::{BoardSize, Color, Key, KeyError, Piece, Pieces, PiecesDiff, Pos, Role};
pub use variant::{DirectionTable, Variant};
