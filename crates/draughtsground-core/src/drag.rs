//! Drag gestures: press, lift, hover and drop.
//!
//! A press arms a drag on a draggable piece. The drag starts once the pointer
//! travels past `draggable.distance` (immediately in drag-only mode). Pointer
//! moves only record the position; the hovered square is hit-tested at most
//! once per frame in [`process_frame`].

use crate::anim::anim;
use crate::board::{
    can_move, drop_new_piece, is_draggable, select_square, set_selected, unselect, unset_predrop,
    unset_premove, user_move,
};
use crate::coords::{key_at_point, square_bounds, square_size};
use crate::input::{Modifiers, Pointer};
use crate::notify::Notification;
use crate::state::State;
use crate::types::{Key, Piece};
use kurbo::{Point, Rect, Vec2};

/// Fraction of the remaining lift offset applied per frame.
const LIFT_EASE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Pressed, not yet past the travel threshold.
    Armed,
    Dragging,
}

/// The drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCurrent {
    /// Origin square; `None` for a piece dragged in from outside the board.
    pub orig: Option<Key>,
    pub piece: Piece,
    /// Pointer position at press time.
    pub orig_pos: Point,
    /// Latest pointer position.
    pub epos: Point,
    /// Pointer travel since the press.
    pub pos: Vec2,
    /// Lift offset applied on top of `pos`, easing toward `dec_target`.
    pub dec: Vec2,
    pub dec_target: Vec2,
    pub phase: DragPhase,
    pub previously_selected: Option<Key>,
    /// Place even on an occupied square (new pieces only).
    pub force: bool,
    /// Hovered square as of the last frame.
    pub over: Option<Key>,
    /// The pointer left the origin square at some point.
    pub key_has_changed: bool,
    needs_hit_test: bool,
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEnd {
    /// No drag was in progress.
    Idle,
    /// Released over `dest`; `moved` tells whether the board changed.
    Dropped { dest: Option<Key>, moved: bool },
    /// Abandoned without touching the board.
    Cancelled,
}

fn hit_test(state: &State, point: Point) -> Option<Key> {
    key_at_point(
        point,
        state.orientation,
        state.board_size,
        state.bounds.unwrap_or(Rect::ZERO),
    )
}

/// Lift offset that puts the piece center under the pointer, raised by one
/// square when magnified.
fn lift_target(state: &State, orig: Key, press: Point) -> Vec2 {
    let Some(bounds) = state.bounds else {
        return Vec2::ZERO;
    };
    let square = square_bounds(orig, state.orientation, state.board_size, bounds);
    let mut target = if state.draggable.center_piece {
        press - square.center()
    } else {
        Vec2::ZERO
    };
    if state.draggable.magnified {
        target.y -= square.height();
    }
    target
}

/// Handle a pointer press on the board.
///
/// Selects (or moves to) the pressed square, then arms a drag if the piece
/// there is draggable. Staged premoves and predrops are dropped when the press
/// does not pick up a piece.
///
/// # Panics
///
/// Panics if the board bounds have not been set.
pub fn start(state: &mut State, pointer: &Pointer, now: f64) {
    if state.view_only || !pointer.is_primary() {
        return;
    }
    let Some(orig) = hit_test(state, pointer.position) else {
        return;
    };
    let piece = state.pieces.get(&orig).copied();
    let previously_selected = state.selected;
    let had_premove = state.premovable.current.is_some();
    let had_predrop = state.predroppable.current.is_some();
    state.stats.ctrl_key = pointer.modifiers.ctrl;

    let moves_selected = state.selected.is_some_and(|sel| can_move(state, sel, orig));
    if moves_selected {
        anim(state, now, |s| select_square(s, orig, false));
    } else {
        select_square(state, orig, false);
    }

    let still_selected = state.selected == Some(orig);
    match piece {
        Some(piece) if still_selected && is_draggable(state, orig) => {
            let immediate = !state.selectable.enabled
                || (state.draggable.auto_distance && state.stats.dragged);
            state.draggable.current = Some(DragCurrent {
                orig: Some(orig),
                piece,
                orig_pos: pointer.position,
                epos: pointer.position,
                pos: Vec2::ZERO,
                dec: Vec2::ZERO,
                dec_target: lift_target(state, orig, pointer.position),
                phase: if immediate {
                    DragPhase::Dragging
                } else {
                    DragPhase::Armed
                },
                previously_selected,
                force: false,
                over: Some(orig),
                key_has_changed: false,
                needs_hit_test: false,
            });
            log::debug!("Drag armed on {orig}");
        }
        _ => {
            if had_premove {
                unset_premove(state);
            }
            if had_predrop {
                unset_predrop(state);
            }
        }
    }
}

/// Start dragging a piece that is not on the board yet.
pub fn drag_new_piece(state: &mut State, piece: Piece, position: Point, force: bool) {
    state.draggable.current = Some(DragCurrent {
        orig: None,
        piece,
        orig_pos: position,
        epos: position,
        pos: Vec2::ZERO,
        dec: Vec2::ZERO,
        dec_target: Vec2::ZERO,
        phase: DragPhase::Dragging,
        previously_selected: state.selected,
        force,
        over: None,
        key_has_changed: true,
        needs_hit_test: true,
    });
}

/// Record a pointer move. Hit-testing waits for the next frame.
pub fn pointer_move(state: &mut State, position: Point) {
    if let Some(cur) = state.draggable.current.as_mut() {
        cur.epos = position;
        cur.pos = position - cur.orig_pos;
        cur.needs_hit_test = true;
    }
}

/// Advance the drag by one frame. Returns whether a drag is still active.
///
/// Cancels the drag when its piece was removed or replaced underneath it.
pub fn process_frame(state: &mut State) -> bool {
    let Some(cur) = state.draggable.current.as_ref() else {
        return false;
    };
    if let Some(orig) = cur.orig {
        let still_there = state.pieces.get(&orig).is_some_and(|p| p.same(&cur.piece));
        if !still_there {
            log::debug!("Dragged piece vanished from {orig}");
            cancel(state);
            return false;
        }
        if state
            .animation
            .current
            .as_ref()
            .is_some_and(|a| a.plan.anims.contains_key(&orig))
        {
            state.animation.current = None;
        }
    }

    let (orientation, bs, bounds) = (state.orientation, state.board_size, state.bounds);
    let threshold = state.draggable.distance;
    let Some(cur) = state.draggable.current.as_mut() else {
        return false;
    };
    if cur.phase == DragPhase::Armed && cur.pos.hypot2() >= threshold * threshold {
        cur.phase = DragPhase::Dragging;
    }
    if cur.phase == DragPhase::Dragging {
        let remaining = cur.dec_target - cur.dec;
        cur.dec = if remaining.hypot() < 0.5 {
            cur.dec_target
        } else {
            cur.dec + remaining * LIFT_EASE
        };
        if cur.needs_hit_test {
            cur.needs_hit_test = false;
            cur.over = key_at_point(cur.epos, orientation, bs, bounds.unwrap_or(Rect::ZERO));
            if cur.over != cur.orig {
                cur.key_has_changed = true;
            }
        }
    }
    true
}

/// Release the dragged piece at `position` (or where it was last seen).
///
/// # Panics
///
/// Panics if the board bounds have not been set.
pub fn end(state: &mut State, position: Option<Point>, modifiers: Modifiers) -> DragEnd {
    let Some(cur) = state.draggable.current.take() else {
        return DragEnd::Idle;
    };
    unset_premove(state);
    unset_predrop(state);

    let dest = hit_test(state, position.unwrap_or(cur.epos));
    let dragging = cur.phase == DragPhase::Dragging;
    let mut moved = false;
    match (cur.orig, dest) {
        (None, Some(dest)) => {
            moved = drop_new_piece(state, cur.piece, dest, cur.force);
        }
        (Some(orig), Some(dest)) if dragging && orig != dest => {
            state.stats.ctrl_key = modifiers.ctrl;
            if user_move(state, orig, dest) {
                state.stats.dragged = true;
                moved = true;
            }
        }
        (Some(orig), None) if dragging && state.draggable.delete_on_drop_off => {
            state.pieces.remove(&orig);
            state.notify(Notification::Change);
            moved = true;
        }
        _ => {}
    }

    let toggled_off = cur.orig.is_some() && cur.orig == cur.previously_selected;
    if dest.is_none() && !moved {
        // Released with no target: same as a cancel.
        restore_selection(state, cur.previously_selected);
    } else if (toggled_off || cur.key_has_changed) && (dest.is_none() || dest == cur.orig) {
        unselect(state);
    } else if !state.selectable.enabled {
        unselect(state);
    }
    // A capture with legs left keeps the capturing piece selected.
    if let Some(dest) = dest {
        if moved && state.movable.chain_continues() && state.has_ghosts() {
            set_selected(state, dest);
        }
    }
    log::debug!("Drag ended over {dest:?}, moved: {moved}");
    DragEnd::Dropped { dest, moved }
}

/// Abandon the drag and restore the selection it started from.
pub fn cancel(state: &mut State) -> DragEnd {
    let Some(cur) = state.draggable.current.take() else {
        return DragEnd::Idle;
    };
    restore_selection(state, cur.previously_selected);
    log::debug!("Drag cancelled");
    DragEnd::Cancelled
}

fn restore_selection(state: &mut State, previously_selected: Option<Key>) {
    match previously_selected {
        Some(key) if state.pieces.contains_key(&key) => set_selected(state, key),
        _ => unselect(state),
    }
}

/// Piece being dragged and the top-left pixel to draw it at.
pub fn dragged_piece(state: &State) -> Option<(Piece, Point)> {
    let cur = state
        .draggable
        .current
        .as_ref()
        .filter(|c| c.phase == DragPhase::Dragging)?;
    let bounds = state.bounds?;
    let origin = match cur.orig {
        Some(orig) => {
            square_bounds(orig, state.orientation, state.board_size, bounds).origin() + cur.pos + cur.dec
        }
        None => {
            let sq = square_size(state.board_size, bounds.size());
            cur.epos - Vec2::new(sq.width / 2.0, sq.height / 2.0)
        }
    };
    Some((cur.piece, origin))
}
