//! Vello-backed surface.
//!
//! Keeps the element set in memory and paints it into a `vello::Scene` on
//! demand. Text labels are kept but not painted.

use crate::surface::{ElementKind, ElementSpec, Surface, SurfaceId, SurfaceResult};
use crate::theme::Theme;
use draughtsground_core::coords::{all_keys, square_bounds};
use draughtsground_core::{Key, State};
use kurbo::{Affine, Circle, Point, Rect, Size, Stroke};
use peniko::Fill;
use std::collections::BTreeMap;
use vello::Scene;

/// Draw order, bottom first.
const LAYERS: [ElementKind; 4] = [
    ElementKind::Square,
    ElementKind::Capture,
    ElementKind::DragGhost,
    ElementKind::Piece,
];

pub struct VelloSurface {
    scene: Scene,
    next_id: SurfaceId,
    elements: BTreeMap<SurfaceId, ElementSpec>,
    theme: Theme,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl VelloSurface {
    pub fn new(theme: Theme) -> Self {
        Self {
            scene: Scene::new(),
            next_id: 0,
            elements: BTreeMap::new(),
            theme,
        }
    }

    /// The scene built by the last [`paint`](Self::paint).
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Rebuild the scene: board first, then elements by layer.
    pub fn paint(&mut self, state: &State) {
        self.scene.reset();
        let Some(bounds) = state.bounds else {
            log::debug!("Board not measured, nothing painted");
            return;
        };
        let transform = Affine::IDENTITY;
        self.scene.fill(Fill::NonZero, transform, self.theme.light_square, None, &bounds);
        for key in all_keys(state.board_size) {
            let rect = square_bounds(key, state.orientation, state.board_size, bounds);
            self.scene.fill(Fill::NonZero, transform, self.theme.dark_square, None, &rect);
        }
        for layer in LAYERS {
            for spec in self.elements.values().filter(|e| e.kind == layer) {
                let rect = Rect::from_origin_size(spec.origin, spec.size);
                let Some(fill) = spec.fill else {
                    continue;
                };
                match layer {
                    ElementKind::Square => {
                        self.scene.fill(Fill::NonZero, transform, fill, None, &rect);
                    }
                    _ => {
                        let faded = matches!(layer, ElementKind::Capture | ElementKind::DragGhost)
                            || spec.class.contains("ghost");
                        let fill = if faded { fill.with_alpha(0.4) } else { fill };
                        let center: Point = rect.center();
                        let radius = rect.width().min(rect.height()) * 0.4;
                        let disc = Circle::new(center, radius);
                        self.scene.fill(Fill::NonZero, transform, fill, None, &disc);
                        let outline = Stroke::new(radius * 0.08);
                        self.scene.stroke(&outline, transform, self.theme.coord_text, None, &disc);
                        if spec.class.contains("king") {
                            let crown = Circle::new(center, radius * 0.55);
                            self.scene.stroke(&outline, transform, self.theme.coord_text, None, &crown);
                        }
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Surface for VelloSurface {
    fn create(&mut self, spec: &ElementSpec) -> SurfaceResult<SurfaceId> {
        self.next_id += 1;
        self.elements.insert(self.next_id, spec.clone());
        Ok(self.next_id)
    }

    fn relocate(&mut self, id: SurfaceId, key: Option<Key>, origin: Point, size: Size) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.key = key;
            element.origin = origin;
            element.size = size;
        }
    }

    fn remove(&mut self, id: SurfaceId) {
        self.elements.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoardRenderer;
    use draughtsground_core::fen;

    #[test]
    fn test_renderer_drives_vello_surface() {
        let mut state = State::new();
        state.pieces = fen::read(fen::START, state.board_size);
        state.bounds = Some(Rect::new(0.0, 0.0, 400.0, 400.0));
        state.coordinates.show = false;
        let mut surface = VelloSurface::default();
        BoardRenderer::new().render(&mut state, &mut surface);
        assert_eq!(surface.len(), 40);
        surface.paint(&state);
    }
}
