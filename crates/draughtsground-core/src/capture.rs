//! Captured-square resolution for diagonal and orthogonal jumps.

use crate::coords::{key_to_pos, pos_to_key};
use crate::types::{BoardSize, Key, Pieces, Pos};
use crate::variant::DirectionTable;

/// One step from `from` toward `target`, as a `(file, rank)` delta.
///
/// Diagonal steps change the rank by one; the file changes or not depending
/// on the parity of the current rank, because odd ranks are shifted half a
/// file. Orthogonal steps move two ranks along a column (same parity) or one
/// file along a rank. Returns `None` when the two squares do not share a line
/// the table allows.
pub fn capture_step(from: Pos, target: Pos, table: DirectionTable) -> Option<(i32, i32)> {
    let dx = target.file - from.file;
    let dy = target.rank - from.rank;
    if dx == 0 && dy == 0 {
        return None;
    }
    if dy == 0 {
        return table.orthogonal.then_some((dx.signum(), 0));
    }
    if dx == 0 && dy.abs() >= 2 {
        return (table.orthogonal && dy % 2 == 0).then_some((0, 2 * dy.signum()));
    }
    if !table.diagonal {
        return None;
    }
    let x_step = if from.rank % 2 == 0 {
        if dx < 0 { -1 } else { 0 }
    } else if dx > 0 {
        1
    } else {
        0
    };
    Some((x_step, dy.signum()))
}

/// The square captured by jumping from `orig` to `dest`.
///
/// Walks from `orig` toward `dest` one square at a time, skipping empty
/// squares and ghosts, and returns the first live piece found before the
/// destination. Returns `None` for plain moves.
pub fn calc_capt_key(
    pieces: &Pieces,
    orig: Key,
    dest: Key,
    bs: BoardSize,
    table: DirectionTable,
) -> Option<Key> {
    let target = key_to_pos(dest, bs);
    let mut cur = key_to_pos(orig, bs);
    for _ in 0..bs.fields() {
        let (sx, sy) = capture_step(cur, target, table)?;
        cur = Pos::new(cur.file + sx, cur.rank + sy);
        if cur == target {
            return None;
        }
        let key = pos_to_key(cur, bs)?;
        match pieces.get(&key) {
            Some(piece) if !piece.role.is_ghost() => return Some(key),
            _ => {}
        }
    }
    None
}
