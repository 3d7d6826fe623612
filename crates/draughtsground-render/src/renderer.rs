//! Board renderer: reconciles state against a surface.
//!
//! Every render walks the elements already on the surface. Those whose key,
//! class and position are unchanged stay untouched; the others go into a
//! free-list bucket for their class. The desired squares and pieces are then
//! matched against the buckets, so a moved piece is relocated rather than
//! recreated, and only what is left unclaimed is removed.

use crate::arena::{Arena, ClassPools};
use crate::classes::square_classes;
use crate::coords::labels;
use crate::surface::{ElementKind, ElementSpec, Surface, SurfaceId};
use crate::theme::Theme;
use draughtsground_core::coords::{key_to_pos, orient_offset, pos_to_translate, pos_to_translate_rel, square_size};
use draughtsground_core::drag::{DragPhase, dragged_piece};
use draughtsground_core::{BoardSize, Color as Side, CoordSystem, Key, State};
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use std::collections::{BTreeMap, BTreeSet};

/// Element churn of one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub created: usize,
    pub reused: usize,
    pub same: usize,
    pub removed: usize,
}

/// Where squares are on the surface: pixels once the board is measured,
/// percent of a square before that.
#[derive(Debug, Clone, Copy)]
struct Layout {
    bounds: Option<Rect>,
    orientation: Side,
    bs: BoardSize,
}

impl Layout {
    fn of(state: &State) -> Self {
        Self {
            bounds: state.bounds,
            orientation: state.orientation,
            bs: state.board_size,
        }
    }

    fn square(&self) -> Size {
        match self.bounds {
            Some(bounds) => square_size(self.bs, bounds.size()),
            None => Size::new(100.0, 100.0),
        }
    }

    fn translate(&self, key: Key) -> Point {
        let pos = key_to_pos(key, self.bs);
        match self.bounds {
            Some(b) => b.origin() + pos_to_translate(pos, self.orientation, self.bs, b.size()).to_vec2(),
            None => pos_to_translate_rel(pos, self.orientation, self.bs),
        }
    }

    /// A cell-unit offset measured from white's side, in surface units.
    fn offset(&self, cells: Vec2) -> Vec2 {
        let v = orient_offset(cells, self.orientation);
        let sq = self.square();
        Vec2::new(v.x * sq.width, v.y * sq.height)
    }

    /// Scale a percent-of-square position to surface units.
    fn scale_rel(&self, rel: Point) -> Point {
        let sq = self.square();
        let origin = self.bounds.map_or(Point::ZERO, |b| b.origin());
        origin + Vec2::new(rel.x / 100.0 * sq.width, rel.y / 100.0 * sq.height)
    }
}

type ElementId = (ElementKind, Option<Key>);

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    key: Option<Key>,
    class: String,
    origin: Point,
    size: Size,
    surface: SurfaceId,
}

#[derive(Debug, Clone)]
struct Desired {
    class: String,
    origin: Point,
    fill: Option<Color>,
}

/// Keeps one surface in sync with one board.
#[derive(Debug, Clone, Default)]
pub struct BoardRenderer {
    theme: Theme,
    elements: Arena<Element>,
    /// Label elements with the index of the label they show.
    labels: Vec<(SurfaceId, usize)>,
    label_settings: Option<(bool, CoordSystem)>,
}

impl BoardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the colour theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Number of square, piece and overlay elements on the surface.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn desired(&self, state: &State, layout: &Layout) -> BTreeMap<ElementId, Desired> {
        let mut out = BTreeMap::new();
        for (key, class) in square_classes(state) {
            let fill = Some(self.theme.square_fill(&class));
            out.insert(
                (ElementKind::Square, Some(key)),
                Desired {
                    class,
                    origin: layout.translate(key),
                    fill,
                },
            );
        }

        let plan = state.animation.current.as_ref().map(|a| &a.plan);
        let drag = state
            .draggable
            .current
            .as_ref()
            .filter(|d| d.phase == DragPhase::Dragging);
        let drag_origin = dragged_piece(state).map(|(_, at)| at);

        for (key, piece) in &state.pieces {
            let mut shown = *piece;
            if let Some(role) = plan.and_then(|p| p.temp_role.get(key)) {
                shown.role = *role;
            }
            let mut origin = layout.translate(*key);
            if let Some(v) = plan.and_then(|p| p.anims.get(key)) {
                origin += layout.offset(v.current);
            }
            let fill = Some(self.theme.piece_fill(piece.color));
            if drag.is_some_and(|d| d.orig == Some(*key)) {
                if state.draggable.show_ghost {
                    out.insert(
                        (ElementKind::DragGhost, Some(*key)),
                        Desired {
                            class: format!("ghost {}", shown.class_name()),
                            origin,
                            fill,
                        },
                    );
                }
                origin = drag_origin.unwrap_or(origin);
            }
            out.insert(
                (ElementKind::Piece, Some(*key)),
                Desired {
                    class: shown.class_name(),
                    origin,
                    fill,
                },
            );
        }

        if let (Some(d), Some(origin)) = (drag.filter(|d| d.orig.is_none()), drag_origin) {
            out.insert(
                (ElementKind::Piece, None),
                Desired {
                    class: d.piece.class_name(),
                    origin,
                    fill: Some(self.theme.piece_fill(d.piece.color)),
                },
            );
        }

        for (key, piece) in plan.into_iter().flat_map(|p| &p.captures) {
            out.insert(
                (ElementKind::Capture, Some(*key)),
                Desired {
                    class: format!("{} fading", piece.class_name()),
                    origin: layout.translate(*key),
                    fill: Some(self.theme.piece_fill(piece.color)),
                },
            );
        }
        out
    }

    fn render_labels(&mut self, state: &State, layout: &Layout, surface: &mut dyn Surface) {
        let settings = (state.coordinates.show, state.coordinates.system);
        let rebuild = state.layout_changed() || self.label_settings != Some(settings);
        if !rebuild && !state.geometry_changed() {
            return;
        }
        let wanted = labels(state);
        if !rebuild {
            for &(id, index) in &self.labels {
                if let Some(label) = wanted.get(index) {
                    surface.relocate(id, None, layout.scale_rel(label.origin), layout.square());
                }
            }
            return;
        }

        for (id, _) in self.labels.drain(..) {
            surface.remove(id);
        }
        for (index, label) in wanted.iter().enumerate() {
            let spec = ElementSpec {
                kind: ElementKind::Coord,
                key: None,
                class: label.class.to_string(),
                origin: layout.scale_rel(label.origin),
                size: layout.square(),
                fill: Some(self.theme.coord_text),
                text: Some(label.text.clone()),
            };
            match surface.create(&spec) {
                Ok(id) => self.labels.push((id, index)),
                Err(err) => log::warn!("Skipping coordinate label {}: {err}", label.text),
            }
        }
        self.label_settings = Some(settings);
        log::debug!("Rebuilt {} coordinate labels", self.labels.len());
    }

    /// Bring the surface in line with the state.
    ///
    /// Records the rendered geometry in the state so the next render can tell
    /// what changed.
    pub fn render(&mut self, state: &mut State, surface: &mut dyn Surface) -> RenderStats {
        let layout = Layout::of(state);
        let size = layout.square();
        let geometry_changed = state.geometry_changed();
        self.render_labels(state, &layout, surface);
        let desired = self.desired(state, &layout);

        let mut stats = RenderStats::default();
        let mut done: BTreeSet<ElementId> = BTreeSet::new();
        let mut pools = ClassPools::default();
        for handle in self.elements.handles() {
            let Some(el) = self.elements.get(handle) else {
                continue;
            };
            let id = (el.kind, el.key);
            let same = !geometry_changed
                && !done.contains(&id)
                && desired
                    .get(&id)
                    .is_some_and(|d| d.class == el.class && d.origin == el.origin && el.size == size);
            if same {
                done.insert(id);
                stats.same += 1;
            } else {
                pools.push(&el.class, handle);
            }
        }

        for (&(kind, key), want) in &desired {
            if done.contains(&(kind, key)) {
                continue;
            }
            if let Some(el) = pools.pop(&want.class).and_then(|h| self.elements.get_mut(h)) {
                surface.relocate(el.surface, key, want.origin, size);
                el.kind = kind;
                el.key = key;
                el.origin = want.origin;
                el.size = size;
                stats.reused += 1;
                continue;
            }
            let spec = ElementSpec {
                kind,
                key,
                class: want.class.clone(),
                origin: want.origin,
                size,
                fill: want.fill,
                text: None,
            };
            match surface.create(&spec) {
                Ok(id) => {
                    self.elements.insert(Element {
                        kind,
                        key,
                        class: want.class.clone(),
                        origin: want.origin,
                        size,
                        surface: id,
                    });
                    stats.created += 1;
                }
                Err(err) => log::warn!("Skipping {} element: {err}", want.class),
            }
        }

        for handle in pools.drain() {
            if let Some(el) = self.elements.remove(handle) {
                surface.remove(el.surface);
                stats.removed += 1;
            }
        }

        state.mark_rendered();
        log::debug!(
            "Rendered: {} created, {} reused, {} same, {} removed",
            stats.created,
            stats.reused,
            stats.same,
            stats.removed
        );
        stats
    }
}
