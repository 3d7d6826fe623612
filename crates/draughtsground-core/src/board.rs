//! Board mutations: selection, moves, drops, captures, premoves and promotion.
//!
//! Nothing here decides what is legal. User moves are checked against the
//! destinations supplied in [`crate::state::Movable`] (or free mode); API moves
//! are applied as given. Every failed operation leaves the state untouched
//! and reports `false`. Listeners are never called from here, only queued.

use crate::capture::calc_capt_key;
use crate::coords::key_to_pos;
use crate::notify::{MoveMetadata, Notification};
use crate::premove::premove_dests;
use crate::state::{MovableColor, Predrop, State};
use crate::types::{BoardSize, Color, Key, Piece, PiecesDiff, Role};

/// What a successful move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The piece captured (removed or ghosted), if any.
    pub captured: Option<Piece>,
}

/// Rank on which men of `color` are crowned.
pub fn promotion_rank(color: Color, bs: BoardSize) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => i32::from(bs.rows),
    }
}

/// Whether a man of `color` reaching `key` is crowned.
pub fn is_promotion_square(key: Key, color: Color, bs: BoardSize) -> bool {
    key_to_pos(key, bs).rank == promotion_rank(color, bs)
}

/// Flip the board. Ongoing animation, drag and selection are dropped.
pub fn toggle_orientation(state: &mut State) {
    if state.fixed {
        return;
    }
    state.orientation = state.orientation.opposite();
    state.animation.current = None;
    state.draggable.current = None;
    state.selected = None;
}

/// Forget the last move, selection and staged actions.
pub fn reset(state: &mut State) {
    state.last_move = None;
    unselect(state);
    unset_premove(state);
    unset_predrop(state);
}

/// Apply a partial piece update. Keys off the board are ignored.
pub fn set_pieces(state: &mut State, diff: PiecesDiff) {
    for (key, piece) in diff {
        if !state.board_size.contains(key) {
            log::warn!("Ignoring piece update for {key}, not on a {:?} board", state.board_size);
            continue;
        }
        match piece {
            Some(piece) => {
                state.pieces.insert(key, piece);
            }
            None => {
                state.pieces.remove(&key);
            }
        }
    }
}

pub fn set_premove(state: &mut State, orig: Key, dest: Key, ctrl_key: bool) {
    unset_predrop(state);
    state.premovable.current = Some((orig, dest));
    state.notify(Notification::PremoveSet {
        orig,
        dest,
        ctrl_key,
    });
}

pub fn unset_premove(state: &mut State) {
    if state.premovable.current.take().is_some() {
        state.notify(Notification::PremoveUnset);
    }
}

pub fn set_predrop(state: &mut State, role: Role, key: Key) {
    unset_premove(state);
    state.predroppable.current = Some(Predrop { role, key });
    state.notify(Notification::PredropSet { role, key });
}

pub fn unset_predrop(state: &mut State) {
    if state.predroppable.current.take().is_some() {
        state.notify(Notification::PredropUnset);
    }
}

/// Move a piece without any legality check.
///
/// Resolves the captured square along the path, ghosts it while the capture
/// chain continues (`capt_len > 1`) or removes it and purges every ghost once
/// the chain ends, crowns men on their last rank, extends or replaces
/// `last_move`, and passes the turn when the chain is over.
pub fn base_move(state: &mut State, orig: Key, dest: Key) -> Option<MoveOutcome> {
    if orig == dest || state.pieces.contains_key(&dest) {
        return None;
    }
    let mut piece = *state.pieces.get(&orig)?;
    if piece.role.is_ghost() {
        return None;
    }
    let bs = state.board_size;
    let chain_open = state.has_ghosts();
    let continues = state.movable.chain_continues();
    let capt_key = if state.movable.capt_len == Some(0) {
        None
    } else {
        calc_capt_key(&state.pieces, orig, dest, bs, state.variant.directions())
    };
    let captured = capt_key.and_then(|k| state.pieces.get(&k).copied());

    if state.selected == Some(dest) {
        unselect(state);
    }
    state.notify(Notification::Move {
        orig,
        dest,
        captured,
    });

    state.pieces.remove(&orig);
    if let (Some(key), Some(victim)) = (capt_key, captured) {
        if continues {
            state.pieces.insert(key, Piece::new(victim.role.ghost(), victim.color));
        } else {
            state.pieces.remove(&key);
        }
    }
    if !continues {
        state.pieces.retain(|_, p| !p.role.is_ghost());
    }

    if state.variant.tracks_king_moves() {
        if piece.role == Role::King && capt_key.is_none() {
            piece.king_moves = piece.king_moves.saturating_add(1);
        } else {
            piece.king_moves = 0;
            for other in state.pieces.values_mut().filter(|p| p.color == piece.color) {
                other.king_moves = 0;
            }
        }
    }

    if piece.role == Role::Man && !continues && is_promotion_square(dest, piece.color, bs) {
        piece.role = Role::King;
        piece.promoted = true;
    }
    state.pieces.insert(dest, piece);

    let extends_chain = capt_key.is_some()
        && chain_open
        && state.last_move.as_ref().and_then(|m| m.last()) == Some(&orig);
    match state.last_move.as_mut() {
        Some(keys) if extends_chain => keys.push(dest),
        _ => state.last_move = Some(vec![orig, dest]),
    }

    state.turn_color = if continues {
        piece.color
    } else {
        piece.color.opposite()
    };
    state.notify(Notification::Change);
    Some(MoveOutcome { captured })
}

fn base_user_move(state: &mut State, orig: Key, dest: Key) -> Option<MoveOutcome> {
    let outcome = base_move(state, orig, dest)?;
    state.movable.dests = None;
    state.animation.current = None;
    Some(outcome)
}

/// Keep the capturing piece selected for its next leg, or clear selection.
fn select_after_move(state: &mut State, dest: Key, outcome: MoveOutcome) {
    if outcome.captured.is_some() && state.movable.chain_continues() {
        set_selected(state, dest);
    } else {
        unselect(state);
    }
}

/// Move on the user's behalf, if the supplied destinations allow it.
///
/// Stages a premove when it is the opponent's turn, and otherwise falls back
/// to selecting `dest`. Returns whether a move was applied.
pub fn user_move(state: &mut State, orig: Key, dest: Key) -> bool {
    if can_move(state, orig, dest) {
        if let Some(outcome) = base_user_move(state, orig, dest) {
            select_after_move(state, dest, outcome);
            let meta = MoveMetadata {
                premove: false,
                ctrl_key: state.stats.ctrl_key,
                captured: outcome.captured,
            };
            state.notify(Notification::After { orig, dest, meta });
            return true;
        }
    } else if can_premove(state, orig, dest) {
        let ctrl_key = state.stats.ctrl_key;
        set_premove(state, orig, dest, ctrl_key);
        unselect(state);
    } else if is_movable(state, dest) || is_premovable(state, dest) {
        set_selected(state, dest);
    } else {
        unselect(state);
    }
    false
}

/// Move through the public API: no legality check.
pub fn api_move(state: &mut State, orig: Key, dest: Key) -> bool {
    base_move(state, orig, dest).is_some()
}

/// Place a piece. Occupied squares are refused unless `force` is set.
pub fn base_new_piece(state: &mut State, piece: Piece, key: Key, force: bool) -> bool {
    if !state.board_size.contains(key) {
        return false;
    }
    if state.pieces.contains_key(&key) {
        if !force {
            return false;
        }
        state.pieces.remove(&key);
    }
    state.notify(Notification::DropNewPiece { piece, key });
    state.pieces.insert(key, piece);
    state.last_move = Some(vec![key]);
    state.movable.dests = None;
    state.turn_color = state.turn_color.opposite();
    state.notify(Notification::Change);
    true
}

/// Place a piece through the public API.
pub fn api_new_piece(state: &mut State, piece: Piece, key: Key) -> bool {
    base_new_piece(state, piece, key, false)
}

/// Drop a piece the user dragged in from outside the board.
///
/// Stages a predrop when it is the opponent's turn. Returns whether the piece
/// was placed.
pub fn drop_new_piece(state: &mut State, piece: Piece, dest: Key, force: bool) -> bool {
    let mut placed = false;
    if can_drop(state, &piece, dest) || force {
        if base_new_piece(state, piece, dest, force) {
            state.notify(Notification::AfterNewPiece {
                role: piece.role,
                key: dest,
                predrop: false,
            });
            placed = true;
        }
    } else if can_predrop(state, &piece, dest) {
        set_predrop(state, piece.role, dest);
    } else {
        unset_premove(state);
        unset_predrop(state);
    }
    unselect(state);
    placed
}

/// Tap on a square: select, move the selected piece there, or clear.
pub fn select_square(state: &mut State, key: Key, force: bool) {
    state.notify(Notification::Select { key });
    if let Some(selected) = state.selected {
        if selected == key && !state.draggable.enabled {
            unselect(state);
            return;
        }
        if (state.selectable.enabled || force) && selected != key && user_move(state, selected, key) {
            state.stats.dragged = false;
            return;
        }
    }
    if is_movable(state, key) || is_premovable(state, key) {
        set_selected(state, key);
    } else {
        unselect(state);
    }
}

pub fn set_selected(state: &mut State, key: Key) {
    state.selected = Some(key);
    if is_premovable(state, key) {
        if state.premovable.dests.is_none() {
            let table = state.premove_variant().directions();
            state.premovable.dests = Some(premove_dests(&state.pieces, key, state.board_size, table));
        }
    } else {
        state.premovable.dests = None;
    }
}

pub fn unselect(state: &mut State) {
    state.selected = None;
    state.premovable.dests = None;
}

fn live_piece(state: &State, key: Key) -> Option<Piece> {
    state.pieces.get(&key).copied().filter(|p| !p.role.is_ghost())
}

/// The piece on `key` may be moved right now.
pub fn is_movable(state: &State, key: Key) -> bool {
    let Some(piece) = live_piece(state, key) else {
        return false;
    };
    match state.movable.color {
        Some(MovableColor::Both) => true,
        Some(color) => color.allows(piece.color) && state.turn_color == piece.color,
        None => false,
    }
}

pub fn can_move(state: &State, orig: Key, dest: Key) -> bool {
    orig != dest
        && is_movable(state, orig)
        && (state.movable.free
            || state
                .movable
                .dests
                .as_ref()
                .and_then(|d| d.get(&orig))
                .is_some_and(|d| d.contains(&dest)))
}

fn can_drop(state: &State, piece: &Piece, dest: Key) -> bool {
    !state.pieces.contains_key(&dest)
        && match state.movable.color {
            Some(MovableColor::Both) => true,
            Some(color) => color.allows(piece.color) && state.turn_color == piece.color,
            None => false,
        }
}

/// The piece on `key` belongs to the user but it is the opponent's turn.
pub fn is_premovable(state: &State, key: Key) -> bool {
    let Some(piece) = live_piece(state, key) else {
        return false;
    };
    state.premovable.enabled
        && state.movable.color == Some(MovableColor::from(piece.color))
        && state.turn_color != piece.color
}

pub fn can_premove(state: &State, orig: Key, dest: Key) -> bool {
    orig != dest
        && is_premovable(state, orig)
        && premove_dests(
            &state.pieces,
            orig,
            state.board_size,
            state.premove_variant().directions(),
        )
        .contains(&dest)
}

fn can_predrop(state: &State, piece: &Piece, dest: Key) -> bool {
    let movable = state.movable.color.and_then(MovableColor::color);
    let dest_ok = state
        .pieces
        .get(&dest)
        .is_none_or(|p| Some(p.color) != movable);
    dest_ok
        && state.predroppable.enabled
        && movable == Some(piece.color)
        && state.turn_color != piece.color
}

/// The piece on `key` may be picked up.
pub fn is_draggable(state: &State, key: Key) -> bool {
    let Some(piece) = live_piece(state, key) else {
        return false;
    };
    state.draggable.enabled
        && match state.movable.color {
            Some(MovableColor::Both) => true,
            Some(color) => {
                color.allows(piece.color)
                    && (state.turn_color == piece.color || state.premovable.enabled)
            }
            None => false,
        }
}

/// Try the staged premove. It is unset whether or not it applied.
pub fn play_premove(state: &mut State) -> bool {
    let Some((orig, dest)) = state.premovable.current else {
        return false;
    };
    let mut success = false;
    if can_move(state, orig, dest) {
        if let Some(outcome) = base_user_move(state, orig, dest) {
            select_after_move(state, dest, outcome);
            let meta = MoveMetadata {
                premove: true,
                ctrl_key: false,
                captured: outcome.captured,
            };
            state.notify(Notification::After { orig, dest, meta });
            success = true;
        }
    }
    unset_premove(state);
    success
}

/// Try the staged predrop if `validate` accepts it. It is unset either way.
pub fn play_predrop(state: &mut State, validate: impl FnOnce(&Predrop) -> bool) -> bool {
    let Some(drop) = state.predroppable.current else {
        return false;
    };
    let mut success = false;
    if let Some(color) = state.movable.color.and_then(MovableColor::color) {
        if validate(&drop) && base_new_piece(state, Piece::new(drop.role, color), drop.key, false) {
            state.notify(Notification::AfterNewPiece {
                role: drop.role,
                key: drop.key,
                predrop: true,
            });
            success = true;
        }
    }
    unset_predrop(state);
    success
}

pub fn cancel_move(state: &mut State) {
    unset_premove(state);
    unset_predrop(state);
    unselect(state);
}

/// Freeze the board: nobody may move and nothing is animating.
pub fn stop(state: &mut State) {
    state.movable.color = None;
    state.movable.dests = None;
    state.animation.current = None;
    cancel_move(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use crate::state::Dests;
    use crate::variant::Variant;

    fn key(n: u8) -> Key {
        Key::new(n).unwrap()
    }

    fn state_from(position: &str) -> State {
        let mut state = State::new();
        state.pieces = fen::read(position, state.board_size);
        state
    }

    fn dests(entries: &[(u8, &[u8])]) -> Dests {
        entries
            .iter()
            .map(|(o, ds)| (key(*o), ds.iter().map(|d| key(*d)).collect()))
            .collect()
    }

    #[test]
    fn test_user_move_with_dests() {
        let mut state = state_from("W:W32:B1");
        state.movable.free = false;
        state.movable.color = Some(MovableColor::White);
        state.movable.dests = Some(dests(&[(32, &[27, 28])]));

        assert!(!user_move(&mut state, key(32), key(22)));
        assert!(state.pieces.contains_key(&key(32)));

        assert!(user_move(&mut state, key(32), key(28)));
        assert!(state.pieces.contains_key(&key(28)));
        assert_eq!(state.turn_color, Color::Black);
        assert_eq!(state.last_move, Some(vec![key(32), key(28)]));
        assert_eq!(state.movable.dests, None);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_wrong_color_cannot_move() {
        let mut state = state_from("W:W32:B1");
        state.movable.color = Some(MovableColor::White);
        state.premovable.enabled = false;
        assert!(!user_move(&mut state, key(1), key(7)));
        assert!(state.pieces.contains_key(&key(1)));
    }

    #[test]
    fn test_move_to_occupied_square_is_noop() {
        let mut state = state_from("W:W32,28:B1");
        assert!(!api_move(&mut state, key(32), key(28)));
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_single_capture_removes_piece() {
        let mut state = state_from("W:W32:B27");
        state.movable.capt_len = Some(1);
        let outcome = base_move(&mut state, key(32), key(21)).unwrap();
        assert_eq!(outcome.captured, Some(Piece::man(Color::Black)));
        assert!(!state.pieces.contains_key(&key(27)));
        assert_eq!(state.turn_color, Color::Black);
    }

    #[test]
    fn test_capture_chain_ghosts_then_purges() {
        // White man on 37 takes 32 and then 22: 37 → 28 → 17.
        let mut state = state_from("W:W37:B32,22");
        state.movable.color = Some(MovableColor::White);
        state.movable.capt_len = Some(2);
        state.movable.dests = Some(dests(&[(37, &[28])]));

        assert!(user_move(&mut state, key(37), key(28)));
        assert_eq!(state.pieces[&key(32)].role, Role::GhostMan);
        assert_eq!(state.turn_color, Color::White);
        assert_eq!(state.selected, Some(key(28)));
        assert_eq!(state.last_move, Some(vec![key(37), key(28)]));

        state.movable.capt_len = Some(1);
        state.movable.dests = Some(dests(&[(28, &[17])]));
        assert!(user_move(&mut state, key(28), key(17)));
        assert!(!state.has_ghosts());
        assert!(!state.pieces.contains_key(&key(22)));
        assert_eq!(state.last_move, Some(vec![key(37), key(28), key(17)]));
        assert_eq!(state.turn_color, Color::Black);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_finishing_move_without_capture_purges_ghosts() {
        let mut state = state_from("W:W28,45:BG32,1");
        assert!(state.has_ghosts());
        state.movable.capt_len = Some(1);
        assert!(api_move(&mut state, key(45), key(40)));
        assert!(!state.has_ghosts());
        assert!(!state.pieces.contains_key(&key(32)));
        assert!(state.pieces.contains_key(&key(1)));
    }

    #[test]
    fn test_turn_passes_only_when_chain_ends() {
        for capt_len in [None, Some(0), Some(1), Some(2), Some(3)] {
            let mut state = state_from("W:W37:B32");
            state.movable.capt_len = capt_len;
            assert!(api_move(&mut state, key(37), key(28)));
            let passed = state.turn_color != Color::White;
            assert_eq!(passed, capt_len.is_none_or(|n| n <= 1), "{capt_len:?}");
        }
    }

    #[test]
    fn test_promotion_on_last_rank() {
        let mut state = state_from("W:W7:B46");
        assert!(api_move(&mut state, key(7), key(1)));
        assert_eq!(state.pieces[&key(1)].role, Role::King);
        assert!(state.pieces[&key(1)].promoted);

        // Black crowns on the bottom rank.
        assert!(api_move(&mut state, key(46), key(41)));
        assert_eq!(state.pieces[&key(41)].role, Role::Man);
        let mut state = state_from("W:W1:B44");
        assert!(api_move(&mut state, key(44), key(49)));
        assert_eq!(state.pieces[&key(49)].role, Role::King);
    }

    #[test]
    fn test_no_promotion_mid_chain() {
        let mut state = state_from("W:W12:B7,9");
        state.movable.capt_len = Some(2);
        assert!(api_move(&mut state, key(12), key(1)));
        assert_eq!(state.pieces[&key(1)].role, Role::Man);
        assert_eq!(state.pieces[&key(7)].role, Role::GhostMan);
    }

    #[test]
    fn test_select_then_move() {
        let mut state = state_from("W:W32:B1");
        select_square(&mut state, key(32), false);
        assert_eq!(state.selected, Some(key(32)));
        select_square(&mut state, key(28), false);
        assert!(state.pieces.contains_key(&key(28)));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_select_is_notified_before_a_tap_move() {
        let mut state = state_from("W:W32:B1");
        select_square(&mut state, key(32), false);
        select_square(&mut state, key(28), false);
        let notes = state.notifications.drain();
        assert_eq!(notes[0], Notification::Select { key: key(32) });
        assert_eq!(notes[1], Notification::Select { key: key(28) });
        assert!(matches!(notes[2], Notification::Move { .. }));
    }

    #[test]
    fn test_select_empty_square_clears() {
        let mut state = state_from("W:W32:B1");
        state.movable.free = false;
        state.movable.dests = Some(Dests::new());
        state.movable.color = Some(MovableColor::White);
        select_square(&mut state, key(32), false);
        select_square(&mut state, key(22), false);
        assert_eq!(state.selected, None);
        assert!(state.pieces.contains_key(&key(32)));
    }

    #[test]
    fn test_premove_staging_and_play() {
        let mut state = state_from("B:W32:B1");
        state.turn_color = Color::Black;
        state.movable.color = Some(MovableColor::White);

        assert!(!user_move(&mut state, key(32), key(28)));
        assert_eq!(state.premovable.current, Some((key(32), key(28))));
        assert!(state.pieces.contains_key(&key(32)));

        // Still black's turn: playing fails and unsets.
        assert!(!play_premove(&mut state));
        assert_eq!(state.premovable.current, None);

        set_premove(&mut state, key(32), key(28), false);
        state.turn_color = Color::White;
        assert!(play_premove(&mut state));
        assert!(state.pieces.contains_key(&key(28)));
        let notes = state.notifications.drain();
        assert!(notes.iter().any(|n| matches!(
            n,
            Notification::After { meta: MoveMetadata { premove: true, .. }, .. }
        )));
    }

    #[test]
    fn test_premove_and_predrop_are_exclusive() {
        let mut state = State::new();
        set_premove(&mut state, key(32), key(28), false);
        set_predrop(&mut state, Role::Man, key(30));
        assert_eq!(state.premovable.current, None);
        assert!(state.predroppable.current.is_some());
        set_premove(&mut state, key(32), key(28), false);
        assert_eq!(state.predroppable.current, None);
    }

    #[test]
    fn test_play_predrop() {
        let mut state = State::new();
        state.movable.color = Some(MovableColor::White);
        state.turn_color = Color::Black;
        state.predroppable.enabled = true;
        assert!(!drop_new_piece(&mut state, Piece::man(Color::White), key(30), false));
        assert_eq!(state.predroppable.current, Some(Predrop { role: Role::Man, key: key(30) }));

        state.turn_color = Color::White;
        assert!(!play_predrop(&mut state.clone(), |_| false));
        assert!(play_predrop(&mut state, |d| d.key == key(30)));
        assert_eq!(state.pieces[&key(30)], Piece::man(Color::White));
        assert_eq!(state.turn_color, Color::Black);
    }

    #[test]
    fn test_new_piece_refuses_occupied() {
        let mut state = state_from("W:W32:B1");
        assert!(!api_new_piece(&mut state, Piece::king(Color::White), key(32)));
        assert!(base_new_piece(&mut state, Piece::king(Color::White), key(32), true));
        assert_eq!(state.pieces[&key(32)].role, Role::King);
        assert_eq!(state.last_move, Some(vec![key(32)]));
    }

    #[test]
    fn test_notifications_are_queued_not_called() {
        let mut state = state_from("W:W32:B1");
        assert!(api_move(&mut state, key(32), key(28)));
        let notes = state.notifications.drain();
        assert_eq!(
            notes,
            vec![
                Notification::Move { orig: key(32), dest: key(28), captured: None },
                Notification::Change,
            ]
        );
    }

    #[test]
    fn test_frisian_king_move_counter() {
        let mut state = state_from("W:WK46,31:B1");
        state.variant = Variant::Frisian;
        state.movable.capt_len = Some(0);
        assert!(api_move(&mut state, key(46), key(41)));
        assert!(api_move(&mut state, key(41), key(37)));
        assert_eq!(state.pieces[&key(37)].king_moves, 2);
        assert!(api_move(&mut state, key(31), key(26)));
        assert_eq!(state.pieces[&key(37)].king_moves, 0);
    }

    #[test]
    fn test_stop_freezes_board() {
        let mut state = state_from("W:W32:B1");
        select_square(&mut state, key(32), false);
        stop(&mut state);
        assert_eq!(state.selected, None);
        assert!(!user_move(&mut state, key(32), key(28)));
    }

    #[test]
    fn test_set_pieces_ignores_off_board_keys() {
        let mut state = State::new();
        state.board_size = BoardSize::SMALL;
        let diff: PiecesDiff = [
            (key(10), Some(Piece::man(Color::White))),
            (key(40), Some(Piece::man(Color::White))),
        ]
        .into_iter()
        .collect();
        set_pieces(&mut state, diff);
        assert_eq!(state.pieces.len(), 1);
        set_pieces(&mut state, [(key(10), None)].into_iter().collect());
        assert!(state.pieces.is_empty());
    }
}
