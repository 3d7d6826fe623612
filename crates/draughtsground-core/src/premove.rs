//! Geometric destination candidates for premoves.
//!
//! Premoves are staged while the opponent is thinking, so occupancy is
//! unknown by the time they are played. Candidates only depend on the piece
//! and the board shape; the legality oracle decides later.

use crate::coords::{cell_to_pos, key_to_pos, pos_to_cell, pos_to_key};
use crate::types::{BoardSize, Color, Key, Pieces, Role};
use crate::variant::DirectionTable;
use std::collections::BTreeSet;

static DIAGONALS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
static ORTHOGONALS: [(i32, i32); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

fn key_at_cell(column: i32, row: i32, bs: BoardSize) -> Option<Key> {
    if column < 0 || column >= i32::from(bs.columns) || row < 0 || row >= i32::from(bs.rows) {
        return None;
    }
    cell_to_pos(column, row).and_then(|pos| pos_to_key(pos, bs))
}

fn lines(table: DirectionTable) -> impl Iterator<Item = (i32, i32)> {
    let diagonal: &[(i32, i32)] = if table.diagonal { &DIAGONALS[..] } else { &[] };
    let orthogonal: &[(i32, i32)] = if table.orthogonal { &ORTHOGONALS[..] } else { &[] };
    diagonal.iter().chain(orthogonal.iter()).copied()
}

/// Candidate premove destinations for the piece on `key`.
pub fn premove_dests(pieces: &Pieces, key: Key, bs: BoardSize, table: DirectionTable) -> Vec<Key> {
    let Some(piece) = pieces.get(&key) else {
        return Vec::new();
    };
    let (c, r) = pos_to_cell(key_to_pos(key, bs));
    let forward = match piece.color {
        Color::White => -1,
        Color::Black => 1,
    };
    let mut dests = BTreeSet::new();
    match piece.role {
        Role::Man => {
            for (dx, dy) in lines(table) {
                let is_diagonal = dx.abs() == 1;
                if is_diagonal && dy == forward {
                    dests.extend(key_at_cell(c + dx, r + dy, bs));
                }
                dests.extend(key_at_cell(c + 2 * dx, r + 2 * dy, bs));
            }
        }
        Role::King => {
            for (dx, dy) in lines(table) {
                let mut step = 1;
                while let Some(dest) = key_at_cell(c + step * dx, r + step * dy, bs) {
                    dests.insert(dest);
                    step += 1;
                }
            }
        }
        Role::GhostMan | Role::GhostKing => {}
    }
    dests.into_iter().collect()
}
