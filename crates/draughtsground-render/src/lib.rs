//! Draughtsground Render Library
//!
//! Surface abstraction and the reconciling board renderer.
//! An in-memory surface is always available; the Vello surface sits behind
//! the `vello-surface` feature.

pub mod arena;
pub mod classes;
pub mod coords;
mod memory;
mod renderer;
mod surface;
pub mod theme;

#[cfg(feature = "vello-surface")]
mod vello_surface;

pub use memory::MemorySurface;
pub use renderer::{BoardRenderer, RenderStats};
pub use surface::{ElementKind, ElementSpec, Surface, SurfaceError, SurfaceId, SurfaceResult};
pub use theme::Theme;

#[cfg(feature = "vello-surface")]
pub use vello_surface::VelloSurface;
