//! Coordinate labels.
//!
//! Field numbers label every playable square; algebraic names label the
//! files along the bottom edge and the ranks along the left edge.

use draughtsground_core::coords::{all_keys, file_letter, key_to_display, key_to_pos, pos_to_translate_rel};
use draughtsground_core::{BoardSize, Color, CoordSystem, State};
use kurbo::Point;

/// One label, positioned in percent of a square from the board's top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub class: &'static str,
    pub origin: Point,
}

fn field_labels(bs: BoardSize, orientation: Color) -> Vec<Label> {
    all_keys(bs)
        .map(|key| Label {
            text: key_to_display(key, bs, CoordSystem::FieldNumbers),
            class: "coord field",
            origin: pos_to_translate_rel(key_to_pos(key, bs), orientation, bs),
        })
        .collect()
}

fn algebraic_labels(bs: BoardSize, orientation: Color) -> Vec<Label> {
    let (columns, rows) = (i32::from(bs.columns), i32::from(bs.rows));
    let flip = |i: i32, n: i32| match orientation {
        Color::White => i,
        Color::Black => n - 1 - i,
    };
    let files = (0..columns).filter_map(|c| {
        Some(Label {
            text: file_letter(c)?.to_string(),
            class: "coord file",
            origin: Point::new(f64::from(flip(c, columns)) * 100.0, f64::from(rows - 1) * 100.0),
        })
    });
    let ranks = (0..rows).map(|r| Label {
        text: (rows - r).to_string(),
        class: "coord rank",
        origin: Point::new(0.0, f64::from(flip(r, rows)) * 100.0),
    });
    files.chain(ranks).collect()
}

/// Labels for the board as currently oriented, or none when hidden.
pub fn labels(state: &State) -> Vec<Label> {
    if !state.coordinates.show {
        return Vec::new();
    }
    match state.coordinates.system {
        CoordSystem::FieldNumbers => field_labels(state.board_size, state.orientation),
        CoordSystem::Algebraic => algebraic_labels(state.board_size, state.orientation),
    }
}
