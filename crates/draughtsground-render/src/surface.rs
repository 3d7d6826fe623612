//! Rendering backend seam.

use draughtsground_core::Key;
use kurbo::{Point, Size};
use peniko::Color;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Element creation failed: {0}")]
    CreateFailed(String),
    #[error("Surface error: {0}")]
    Other(String),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Backend-assigned element identifier.
pub type SurfaceId = u64;

/// What an element stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Highlighted square.
    Square,
    Piece,
    /// Captured piece still shown while its capture animates.
    Capture,
    /// Faded copy of a dragged piece left on its origin square.
    DragGhost,
    /// Coordinate label.
    Coord,
}

/// Everything a backend needs to create an element.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub kind: ElementKind,
    pub key: Option<Key>,
    /// Space-separated visual classes, e.g. `"white king"` or `"last-move"`.
    pub class: String,
    /// Top-left corner, in pixels when the board is measured, otherwise in
    /// percent of one square.
    pub origin: Point,
    pub size: Size,
    pub fill: Option<Color>,
    pub text: Option<String>,
}

/// Trait for rendering backends.
///
/// Elements are created once and then moved around; the renderer never asks
/// a backend to change an element's class.
pub trait Surface {
    fn create(&mut self, spec: &ElementSpec) -> SurfaceResult<SurfaceId>;

    /// Move an element to another square, top-left corner and size.
    fn relocate(&mut self, id: SurfaceId, key: Option<Key>, origin: Point, size: Size);

    fn remove(&mut self, id: SurfaceId);
}
