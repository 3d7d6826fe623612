//! Animation planning and the frame driver.
//!
//! A plan is computed from the pieces before a mutation and the state after
//! it. Disappeared pieces are paired with appeared ones so moves slide instead
//! of blinking; unpaired disappearances become capture overlays that fade with
//! the move. Multi-hop capture chains get one linked sub-plan per hop so the
//! piece visibly lands on every intermediate square.
//!
//! The planner never reads the clock. [`step`] is called by the host's frame
//! scheduler with the current time and eases every vector toward its goal.

use crate::board::is_promotion_square;
use crate::capture::calc_capt_key;
use crate::coords::{all_keys, key_to_cell, key_to_pos, row_shift};
use crate::state::State;
use crate::types::{Key, Piece, Pieces, Role};
use kurbo::Vec2;
use std::collections::BTreeMap;

/// Chains run each hop at `duration * CHAIN_DURATION_FACTOR / hops`.
pub const CHAIN_DURATION_FACTOR: f64 = 1.5;

/// Motion of one piece toward its square, in cell units, white orientation.
///
/// The piece is drawn on its goal square, offset by `current`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimVector {
    /// Origin file minus goal file.
    pub d_file: i32,
    /// Origin rank minus goal rank.
    pub d_rank: i32,
    /// Half-cell row offset of the origin rank minus that of the goal rank.
    pub row_shift: i32,
    pub from: Vec2,
    pub to: Vec2,
    pub current: Vec2,
}

impl AnimVector {
    fn between(orig: Key, dest: Key, anchor: Key, state: &State) -> Self {
        let bs = state.board_size;
        let (o, d) = (key_to_pos(orig, bs), key_to_pos(dest, bs));
        let anchor = key_to_cell(anchor, bs);
        let from = key_to_cell(orig, bs) - anchor;
        let to = key_to_cell(dest, bs) - anchor;
        Self {
            d_file: o.file - d.file,
            d_rank: o.rank - d.rank,
            row_shift: row_shift(o.rank) - row_shift(d.rank),
            from,
            to,
            current: from,
        }
    }
}

/// What to animate for one leg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimPlan {
    /// Moving pieces, by the key they now stand on.
    pub anims: BTreeMap<Key, AnimVector>,
    /// Captured pieces still drawn while this leg plays.
    pub captures: BTreeMap<Key, Piece>,
    /// Role to show instead of the real one until the plan ends (promotion).
    pub temp_role: BTreeMap<Key, Role>,
    /// The next hop of a capture chain.
    pub next_plan: Option<Box<AnimPlan>>,
}

impl AnimPlan {
    pub fn is_empty(&self) -> bool {
        self.anims.is_empty() && self.captures.is_empty() && self.next_plan.is_none()
    }

    /// Number of plans linked after this one.
    pub fn chain_len(&self) -> usize {
        let mut len = 0;
        let mut next = self.next_plan.as_deref();
        while let Some(plan) = next {
            len += 1;
            next = plan.next_plan.as_deref();
        }
        len
    }
}

/// The plan being played.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimCurrent {
    /// Timestamp (ms) the current leg started.
    pub start: f64,
    /// Inverse of the leg duration.
    pub frequency: f64,
    pub plan: AnimPlan,
}

/// Outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimStep {
    /// Nothing to animate.
    Idle,
    Running,
    /// A chain hop finished and the next one started.
    NextLeg,
    /// The last leg reached its goal and the plan was cleared.
    Finished,
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    key: Key,
    piece: Piece,
}

fn can_pair(missing: &Candidate, new: &Candidate, state: &State) -> bool {
    let (old, now) = (missing.piece, new.piece);
    if old.role.is_ghost() || old.color != now.color {
        return false;
    }
    let bs = state.board_size;
    match (old.role, now.role) {
        (a, b) if a == b => true,
        (Role::Man, Role::King) => is_promotion_square(new.key, now.color, bs),
        (Role::King, Role::Man) => is_promotion_square(missing.key, old.color, bs),
        _ => false,
    }
}

/// Diff two piece maps into disappeared and appeared pieces, by key.
fn partition(prev: &Pieces, state: &State) -> (Vec<Candidate>, Vec<Candidate>) {
    let mut missing = Vec::new();
    let mut new = Vec::new();
    for key in all_keys(state.board_size) {
        let before = prev.get(&key).copied();
        let after = state.pieces.get(&key).copied();
        match (before, after) {
            (Some(b), Some(a)) if b.same(&a) => {}
            (Some(b), Some(a)) if !b.role.is_ghost() && a.role == b.role.ghost() && a.color == b.color => {}
            _ => {
                if let Some(piece) = before {
                    missing.push(Candidate { key, piece });
                }
                if let Some(piece) = after.filter(|p| !p.role.is_ghost()) {
                    new.push(Candidate { key, piece });
                }
            }
        }
    }
    // A chain that loops back to its origin leaves the same piece on the same
    // square, which the diff above cannot see.
    let looped = state
        .last_move
        .as_ref()
        .filter(|m| m.len() > 2 && m.first() == m.last())
        .and_then(|m| m.first().copied());
    if let Some(key) = looped {
        if let (Some(&b), Some(&a)) = (prev.get(&key), state.pieces.get(&key)) {
            if b.same(&a) {
                missing.push(Candidate { key, piece: b });
                new.push(Candidate { key, piece: a });
            }
        }
    }
    (missing, new)
}

/// Compute the plan that animates `prev` into `state.pieces`.
pub fn compute_plan(prev: &Pieces, state: &State) -> AnimPlan {
    let bs = state.board_size;
    let (missing, new) = partition(prev, state);

    let mut claimed = vec![false; missing.len()];
    let mut pairs: Vec<(Key, Key)> = Vec::new();
    let mut temp_role = BTreeMap::new();
    for n in &new {
        let goal = key_to_cell(n.key, bs);
        let nearest = missing
            .iter()
            .enumerate()
            .filter(|(i, m)| !claimed[*i] && can_pair(m, n, state))
            .min_by(|(_, a), (_, b)| {
                let da = (key_to_cell(a.key, bs) - goal).hypot2();
                let db = (key_to_cell(b.key, bs) - goal).hypot2();
                da.total_cmp(&db)
            });
        if let Some((i, m)) = nearest {
            claimed[i] = true;
            pairs.push((m.key, n.key));
            if m.piece.role != n.piece.role {
                temp_role.insert(n.key, m.piece.role);
            }
        }
    }

    let captures: BTreeMap<Key, Piece> = missing
        .iter()
        .zip(&claimed)
        .filter(|(_, c)| !**c)
        .map(|(m, _)| (m.key, m.piece))
        .collect();

    if let Some(hops) = chain_hops(state, &pairs) {
        return chain_plan(prev, state, &hops, &pairs, captures, temp_role);
    }

    AnimPlan {
        anims: pairs
            .iter()
            .map(|&(orig, dest)| (dest, AnimVector::between(orig, dest, dest, state)))
            .collect(),
        captures,
        temp_role,
        next_plan: None,
    }
}

/// The hop keys when the last move is a multi-hop chain by a paired mover.
fn chain_hops(state: &State, pairs: &[(Key, Key)]) -> Option<Vec<Key>> {
    let hops = state.last_move.as_ref().filter(|m| m.len() > 2)?;
    let (first, last) = (*hops.first()?, *hops.last()?);
    pairs
        .iter()
        .any(|&(orig, dest)| orig == first && dest == last)
        .then(|| hops.clone())
}

fn chain_plan(
    prev: &Pieces,
    state: &State,
    hops: &[Key],
    pairs: &[(Key, Key)],
    captures: BTreeMap<Key, Piece>,
    temp_role: BTreeMap<Key, Role>,
) -> AnimPlan {
    let bs = state.board_size;
    let table = state.variant.directions();
    let (first, last) = (hops[0], hops[hops.len() - 1]);
    let legs = hops.len() - 1;

    // Attribute each capture to the hop whose path crosses it.
    let mut scan = prev.clone();
    scan.remove(&first);
    let mut captured_in = BTreeMap::new();
    for (leg, hop) in hops.windows(2).enumerate() {
        if let Some(victim) = calc_capt_key(&scan, hop[0], hop[1], bs, table) {
            if captures.contains_key(&victim) {
                captured_in.insert(victim, leg);
            }
            if let Some(piece) = scan.get_mut(&victim) {
                piece.role = piece.role.ghost();
            }
        }
    }

    let mut next: Option<AnimPlan> = None;
    for (leg, hop) in hops.windows(2).enumerate().rev() {
        let mut anims = BTreeMap::new();
        anims.insert(last, AnimVector::between(hop[0], hop[1], last, state));
        if leg == 0 {
            for &(orig, dest) in pairs.iter().filter(|&&(o, d)| o != first || d != last) {
                anims.insert(dest, AnimVector::between(orig, dest, dest, state));
            }
        }
        let overlay = captures
            .iter()
            .filter(|(k, _)| captured_in.get(*k).copied().unwrap_or(0) >= leg)
            .map(|(k, p)| (*k, *p))
            .collect();
        next = Some(AnimPlan {
            anims,
            captures: overlay,
            temp_role: temp_role.clone(),
            next_plan: next.map(Box::new),
        });
    }
    log::debug!("Planned {legs}-hop capture chain from {first} to {last}");
    next.unwrap_or_default()
}

/// Run `mutation` and animate its effect on the pieces.
///
/// A mutation that moves nothing leaves any running plan untouched.
pub fn render_anim<R>(state: &mut State, now: f64, mutation: impl FnOnce(&mut State) -> R) -> R {
    let prev = state.pieces.clone();
    let result = mutation(state);
    let plan = compute_plan(&prev, state);
    if !plan.is_empty() {
        let legs = plan.chain_len() + 1;
        let duration = if legs > 1 {
            state.animation.duration * CHAIN_DURATION_FACTOR / legs as f64
        } else {
            state.animation.duration
        };
        log::debug!(
            "Animating {} piece(s), {} capture(s), {legs} leg(s) of {duration:.0}ms",
            plan.anims.len(),
            plan.captures.len()
        );
        state.animation.current = Some(AnimCurrent {
            start: now,
            frequency: 1.0 / duration.max(1.0),
            plan,
        });
    }
    result
}

/// Run `mutation` with no animation.
pub fn without_anim<R>(state: &mut State, mutation: impl FnOnce(&mut State) -> R) -> R {
    let result = mutation(state);
    state.animation.current = None;
    result
}

/// Animate `mutation` when the board allows it.
pub fn anim<R>(state: &mut State, now: f64, mutation: impl FnOnce(&mut State) -> R) -> R {
    if state.animation.enabled && !state.fixed {
        render_anim(state, now, mutation)
    } else {
        without_anim(state, mutation)
    }
}

/// Advance the running plan to `now`.
///
/// When a leg's remaining fraction reaches zero every vector snaps to its
/// goal and the next hop starts, or the plan is cleared. A frame that fires
/// after the plan was cleared is a no-op.
pub fn step(state: &mut State, now: f64) -> AnimStep {
    let Some(current) = state.animation.current.as_mut() else {
        return AnimStep::Idle;
    };
    let rest = 1.0 - (now - current.start) * current.frequency;
    if rest > 0.0 {
        let ease = ease_in_out_cubic(rest);
        for v in current.plan.anims.values_mut() {
            v.current = v.to + (v.from - v.to) * ease;
        }
        log::trace!("Animation frame, {rest:.3} remaining");
        return AnimStep::Running;
    }
    for v in current.plan.anims.values_mut() {
        v.current = v.to;
    }
    if let Some(next) = current.plan.next_plan.take() {
        current.plan = *next;
        current.start = now;
        return AnimStep::NextLeg;
    }
    state.animation.current = None;
    AnimStep::Finished
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::api_move;
    use crate::fen;
    use crate::types::Color;

    fn key(n: u8) -> Key {
        Key::new(n).unwrap()
    }

    fn state_from(position: &str) -> State {
        let mut state = State::new();
        state.pieces = fen::read(position, state.board_size);
        state
    }

    #[test]
    fn test_move_vector_equals_delta() {
        let prev = fen::read("W:W32:B1", Default::default());
        let state = state_from("W:W28:B1");
        let plan = compute_plan(&prev, &state);
        let bs = state.board_size;
        let v = plan.anims[&key(28)];
        let (a, b) = (key_to_pos(key(32), bs), key_to_pos(key(28), bs));
        assert_eq!((v.d_file, v.d_rank), (a.file - b.file, a.rank - b.rank));
        assert_eq!(v.from, key_to_cell(key(32), bs) - key_to_cell(key(28), bs));
        assert_eq!(v.to, Vec2::ZERO);
        assert_eq!(v.current, v.from);
        assert!(plan.captures.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let prev = fen::read("W:W31,35,K46:B1,2,3", Default::default());
        let state = state_from("W:W26,30,K5:B2,3,7");
        let first = compute_plan(&prev, &state);
        for _ in 0..10 {
            assert_eq!(compute_plan(&prev, &state), first);
        }
    }

    #[test]
    fn test_nearest_missing_piece_wins() {
        let prev = fen::read("W:W31,35:B1", Default::default());
        let state = state_from("W:W26,30:B1");
        let plan = compute_plan(&prev, &state);
        assert_eq!(plan.anims[&key(26)].from, key_to_cell(key(31), state.board_size) - key_to_cell(key(26), state.board_size));
        assert_eq!(plan.anims[&key(30)].from, key_to_cell(key(35), state.board_size) - key_to_cell(key(30), state.board_size));
    }

    #[test]
    fn test_capture_becomes_overlay() {
        let prev = fen::read("W:W32:B27", Default::default());
        let state = state_from("W:W21:B");
        let plan = compute_plan(&prev, &state);
        assert!(plan.anims.contains_key(&key(21)));
        assert_eq!(plan.captures.get(&key(27)), Some(&Piece::man(Color::Black)));
    }

    #[test]
    fn test_unmatched_pieces_get_no_vector() {
        let prev = fen::read("W:W32:B1", Default::default());
        let state = state_from("W:W32:B1,K22");
        let plan = compute_plan(&prev, &state);
        assert!(plan.anims.is_empty());
        assert!(plan.captures.is_empty());
    }

    #[test]
    fn test_promotion_keeps_old_role_while_moving() {
        let mut state = state_from("W:W7:B46");
        let prev = state.pieces.clone();
        assert!(api_move(&mut state, key(7), key(1)));
        let plan = compute_plan(&prev, &state);
        assert!(plan.anims.contains_key(&key(1)));
        assert_eq!(plan.temp_role.get(&key(1)), Some(&Role::Man));
    }

    #[test]
    fn test_ghosted_piece_stays_put() {
        let prev = fen::read("W:W37:B32", Default::default());
        let state = state_from("W:W28:BG32");
        let plan = compute_plan(&prev, &state);
        assert_eq!(plan.anims.len(), 1);
        assert!(plan.captures.is_empty());
    }

    #[test]
    fn test_looping_chain_links_every_hop() {
        let prev = fen::read("W:W3:B9,20", Default::default());
        let mut state = state_from("W:W3:B");
        state.last_move = Some(vec![key(3), key(14), key(25), key(3)]);
        let plan = compute_plan(&prev, &state);

        assert_eq!(plan.chain_len(), 2);
        assert!(plan.anims.contains_key(&key(3)));
        let bs = state.board_size;
        let origin = key_to_cell(key(3), bs);
        assert_eq!(plan.anims[&key(3)].to, key_to_cell(key(14), bs) - origin);
        assert_eq!(plan.captures.len(), 2);

        let second = plan.next_plan.as_deref().unwrap();
        assert_eq!(second.anims[&key(3)].from, key_to_cell(key(14), bs) - origin);
        assert!(second.captures.contains_key(&key(20)));
        assert!(!second.captures.contains_key(&key(9)));

        let third = second.next_plan.as_deref().unwrap();
        assert_eq!(third.anims[&key(3)].to, Vec2::ZERO);
        assert!(third.captures.is_empty());
    }

    #[test]
    fn test_step_eases_then_finishes() {
        let mut state = state_from("W:W32:B1");
        assert_eq!(step(&mut state, 0.0), AnimStep::Idle);

        anim(&mut state, 1000.0, |s| api_move(s, key(32), key(28)));
        let from = state.animation.current.as_ref().unwrap().plan.anims[&key(28)].from;

        assert_eq!(step(&mut state, 1100.0), AnimStep::Running);
        let mid = state.animation.current.as_ref().unwrap().plan.anims[&key(28)].current;
        assert!((mid - from * 0.5).hypot() < 1e-9);

        assert_eq!(step(&mut state, 1201.0), AnimStep::Finished);
        assert!(state.animation.current.is_none());
        assert_eq!(step(&mut state, 1300.0), AnimStep::Idle);
    }

    #[test]
    fn test_chain_steps_through_legs() {
        let mut state = state_from("W:W3:B9,20");
        anim(&mut state, 0.0, |s| {
            s.pieces = fen::read("W:W3:B", s.board_size);
            s.last_move = Some(vec![key(3), key(14), key(25), key(3)]);
        });
        let frequency = state.animation.current.as_ref().unwrap().frequency;
        assert!((frequency - 3.0 / 300.0).abs() < 1e-12);
        assert_eq!(step(&mut state, 50.0), AnimStep::Running);
        assert_eq!(step(&mut state, 101.0), AnimStep::NextLeg);
        assert_eq!(step(&mut state, 202.0), AnimStep::NextLeg);
        assert_eq!(step(&mut state, 303.0), AnimStep::Finished);
    }

    #[test]
    fn test_disabled_animation_applies_immediately() {
        let mut state = state_from("W:W32:B1");
        state.animation.enabled = false;
        assert!(anim(&mut state, 0.0, |s| api_move(s, key(32), key(28))));
        assert!(state.animation.current.is_none());
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
    }
}
