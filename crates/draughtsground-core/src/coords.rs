//! Coordinate transforms between keys, board positions, grid cells and pixels.
//!
//! Only dark squares carry keys. Row `rank` of the board holds `columns / 2`
//! playable squares; odd ranks start one cell to the right, which is the
//! half-file offset every diagonal-layout board has. Everything here is pure.

use crate::types::{BoardSize, Color, Key, Pos};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// How square names are shown to the user. Keys never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoordSystem {
    /// Field numbers, `1..=fields`.
    #[default]
    FieldNumbers,
    /// File letter and rank number with `a1` at white's bottom-left.
    Algebraic,
}

/// Convert a key to its board position.
pub fn key_to_pos(key: Key, bs: BoardSize) -> Pos {
    let files = i32::from(bs.files().max(1));
    let shift = i32::from(key.field()) - 1;
    Pos::new(shift % files + 1, shift / files + 1)
}

/// Convert a board position to a key, if the position is on the board.
pub fn pos_to_key(pos: Pos, bs: BoardSize) -> Option<Key> {
    let files = i32::from(bs.files());
    if pos.file < 1 || pos.file > files || pos.rank < 1 || pos.rank > i32::from(bs.rows) {
        return None;
    }
    let field = pos.file + (pos.rank - 1) * files;
    u8::try_from(field).ok().and_then(|f| bs.key(f))
}

/// Every key of the board in ascending order.
pub fn all_keys(bs: BoardSize) -> impl Iterator<Item = Key> {
    (1..=bs.fields()).filter_map(Key::new)
}

/// Cell offset of a rank: odd ranks are shifted one cell right.
pub fn row_shift(rank: i32) -> i32 {
    rank.rem_euclid(2)
}

/// Grid cell `(column, row)` of a position, 0-based, white at the bottom.
pub fn pos_to_cell(pos: Pos) -> (i32, i32) {
    ((pos.file - 1) * 2 + row_shift(pos.rank), pos.rank - 1)
}

/// Position of a grid cell; `None` for light squares.
pub fn cell_to_pos(column: i32, row: i32) -> Option<Pos> {
    let rank = row + 1;
    let offset = column - row_shift(rank);
    if offset < 0 || offset % 2 != 0 {
        return None;
    }
    Some(Pos::new(offset / 2 + 1, rank))
}

/// Grid cell of a key as a point, for distance measurements.
pub fn key_to_cell(key: Key, bs: BoardSize) -> Point {
    let (c, r) = pos_to_cell(key_to_pos(key, bs));
    Point::new(f64::from(c), f64::from(r))
}

/// Cell as seen from the given orientation.
fn oriented_cell(pos: Pos, orientation: Color, bs: BoardSize) -> (i32, i32) {
    let (c, r) = pos_to_cell(pos);
    match orientation {
        Color::White => (c, r),
        Color::Black => (i32::from(bs.columns) - 1 - c, i32::from(bs.rows) - 1 - r),
    }
}

/// Undo [`oriented_cell`].
fn unorient_cell(column: i32, row: i32, orientation: Color, bs: BoardSize) -> (i32, i32) {
    match orientation {
        Color::White => (column, row),
        Color::Black => (i32::from(bs.columns) - 1 - column, i32::from(bs.rows) - 1 - row),
    }
}

/// Size of one cell inside a board of the given pixel size.
pub fn square_size(bs: BoardSize, board: Size) -> Size {
    Size::new(
        board.width / f64::from(bs.columns.max(1)),
        board.height / f64::from(bs.rows.max(1)),
    )
}

/// Top-left pixel of a position inside a board of the given size.
pub fn pos_to_translate(pos: Pos, orientation: Color, bs: BoardSize, board: Size) -> Point {
    let (c, r) = oriented_cell(pos, orientation, bs);
    let sq = square_size(bs, board);
    Point::new(f64::from(c) * sq.width, f64::from(r) * sq.height)
}

/// Translation in percent of one square (`100.0` = one cell), for surfaces
/// that lay squares out relative to their own size.
pub fn pos_to_translate_rel(pos: Pos, orientation: Color, bs: BoardSize) -> Point {
    let (c, r) = oriented_cell(pos, orientation, bs);
    Point::new(f64::from(c) * 100.0, f64::from(r) * 100.0)
}

/// Turn a cell-unit offset measured in white orientation into the given
/// orientation.
pub fn orient_offset(offset: Vec2, orientation: Color) -> Vec2 {
    match orientation {
        Color::White => offset,
        Color::Black => -offset,
    }
}

/// Pixel rectangle of a square inside `bounds`.
pub fn square_bounds(key: Key, orientation: Color, bs: BoardSize, bounds: Rect) -> Rect {
    let sq = square_size(bs, bounds.size());
    let origin = pos_to_translate(key_to_pos(key, bs), orientation, bs, bounds.size());
    Rect::from_origin_size(
        Point::new(bounds.x0 + origin.x, bounds.y0 + origin.y),
        sq,
    )
}

/// Key of the dark square under `point`.
///
/// Returns `None` for points off the board or on light squares.
///
/// # Panics
///
/// Panics if `bounds` has zero area. Hit-testing needs the board to have
/// been measured; calling it earlier is an integration bug.
pub fn key_at_point(point: Point, orientation: Color, bs: BoardSize, bounds: Rect) -> Option<Key> {
    assert!(
        !bounds.is_zero_area(),
        "hit-test requires measured board bounds, got {bounds:?}"
    );
    let sq = square_size(bs, bounds.size());
    let column = ((point.x - bounds.x0) / sq.width).floor();
    let row = ((point.y - bounds.y0) / sq.height).floor();
    if column < 0.0 || row < 0.0 || column >= f64::from(bs.columns) || row >= f64::from(bs.rows) {
        return None;
    }
    let (c, r) = unorient_cell(column as i32, row as i32, orientation, bs);
    cell_to_pos(c, r).and_then(|pos| pos_to_key(pos, bs))
}

/// Letter of an algebraic file. Columns past `z` have none.
pub fn file_letter(column: i32) -> Option<char> {
    u8::try_from(column)
        .ok()
        .filter(|c| *c < 26)
        .map(|c| char::from(b'a' + c))
}

/// Display name of a key in the given coordinate system.
///
/// Algebraic names fall back to the field number on columns without a
/// file letter.
pub fn key_to_display(key: Key, bs: BoardSize, system: CoordSystem) -> String {
    match system {
        CoordSystem::FieldNumbers => key.field().to_string(),
        CoordSystem::Algebraic => {
            let (c, r) = pos_to_cell(key_to_pos(key, bs));
            match file_letter(c) {
                Some(file) => format!("{}{}", file, i32::from(bs.rows) - r),
                None => key.field().to_string(),
            }
        }
    }
}

/// Parse a display name back to a key.
pub fn display_to_key(name: &str, bs: BoardSize, system: CoordSystem) -> Option<Key> {
    match system {
        CoordSystem::FieldNumbers => name.parse::<Key>().ok().filter(|k| bs.contains(*k)),
        CoordSystem::Algebraic => {
            let name = name.trim();
            let mut chars = name.chars();
            let file = chars.next()?.to_ascii_lowercase();
            if file.is_ascii_digit() {
                let key = display_to_key(name, bs, CoordSystem::FieldNumbers)?;
                let (c, _) = pos_to_cell(key_to_pos(key, bs));
                return file_letter(c).is_none().then_some(key);
            }
            if !file.is_ascii_lowercase() {
                return None;
            }
            let rank: i32 = chars.as_str().parse().ok()?;
            let column = i32::from(file as u8 - b'a');
            let row = i32::from(bs.rows).checked_sub(rank)?;
            if column >= i32::from(bs.columns) || row < 0 || row >= i32::from(bs.rows) {
                return None;
            }
            cell_to_pos(column, row).and_then(|pos| pos_to_key(pos, bs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Key {
        Key::new(n).unwrap()
    }

    #[test]
    fn test_pos_key_roundtrip() {
        for bs in [BoardSize::INTERNATIONAL, BoardSize::SMALL, BoardSize::new(12, 12)] {
            for k in all_keys(bs) {
                assert_eq!(pos_to_key(key_to_pos(k, bs), bs), Some(k));
            }
        }
    }

    #[test]
    fn test_key_to_pos() {
        let bs = BoardSize::INTERNATIONAL;
        assert_eq!(key_to_pos(key(1), bs), Pos::new(1, 1));
        assert_eq!(key_to_pos(key(5), bs), Pos::new(5, 1));
        assert_eq!(key_to_pos(key(6), bs), Pos::new(1, 2));
        assert_eq!(key_to_pos(key(50), bs), Pos::new(5, 10));
        assert_eq!(pos_to_key(Pos::new(6, 1), bs), None);
        assert_eq!(pos_to_key(Pos::new(1, 11), bs), None);
    }

    #[test]
    fn test_cell_layout() {
        // Square 1 sits on the second cell of the top row, 6 on the first cell of the next.
        assert_eq!(pos_to_cell(Pos::new(1, 1)), (1, 0));
        assert_eq!(pos_to_cell(Pos::new(1, 2)), (0, 1));
        assert_eq!(cell_to_pos(0, 0), None);
        assert_eq!(cell_to_pos(3, 0), Some(Pos::new(2, 1)));
        assert_eq!(cell_to_pos(2, 1), Some(Pos::new(2, 2)));
    }

    #[test]
    fn test_translate_flips_for_black() {
        let bs = BoardSize::INTERNATIONAL;
        let board = Size::new(500.0, 500.0);
        let p = key_to_pos(key(1), bs);
        assert_eq!(pos_to_translate(p, Color::White, bs, board), Point::new(50.0, 0.0));
        assert_eq!(pos_to_translate(p, Color::Black, bs, board), Point::new(400.0, 450.0));
        assert_eq!(pos_to_translate_rel(p, Color::White, bs), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_key_at_point() {
        let bs = BoardSize::INTERNATIONAL;
        let bounds = Rect::new(10.0, 10.0, 510.0, 510.0);
        assert_eq!(key_at_point(Point::new(85.0, 35.0), Color::White, bs, bounds), Some(key(1)));
        // Light square.
        assert_eq!(key_at_point(Point::new(35.0, 35.0), Color::White, bs, bounds), None);
        // Off board.
        assert_eq!(key_at_point(Point::new(600.0, 35.0), Color::White, bs, bounds), None);
        // Bottom-left cell is square 1 when viewed from black... mirrored.
        assert_eq!(key_at_point(Point::new(435.0, 485.0), Color::Black, bs, bounds), Some(key(1)));
    }

    #[test]
    fn test_square_bounds_hit_test_agree() {
        let bs = BoardSize::SMALL;
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        for orientation in [Color::White, Color::Black] {
            for k in all_keys(bs) {
                let center = square_bounds(k, orientation, bs, bounds).center();
                assert_eq!(key_at_point(center, orientation, bs, bounds), Some(k));
            }
        }
    }

    #[test]
    #[should_panic(expected = "hit-test requires measured board bounds")]
    fn test_key_at_point_without_bounds_panics() {
        key_at_point(Point::ZERO, Color::White, BoardSize::INTERNATIONAL, Rect::ZERO);
    }

    #[test]
    fn test_algebraic_names() {
        assert_eq!(key_to_display(key(46), BoardSize::INTERNATIONAL, CoordSystem::Algebraic), "a1");
        assert_eq!(key_to_display(key(1), BoardSize::INTERNATIONAL, CoordSystem::Algebraic), "b10");
        assert_eq!(key_to_display(key(29), BoardSize::SMALL, CoordSystem::Algebraic), "a1");
        assert_eq!(key_to_display(key(1), BoardSize::SMALL, CoordSystem::Algebraic), "b8");
        assert_eq!(key_to_display(key(7), BoardSize::SMALL, CoordSystem::FieldNumbers), "7");
    }

    #[test]
    fn test_display_roundtrip() {
        for bs in [BoardSize::INTERNATIONAL, BoardSize::SMALL] {
            for system in [CoordSystem::FieldNumbers, CoordSystem::Algebraic] {
                for k in all_keys(bs) {
                    let name = key_to_display(k, bs, system);
                    assert_eq!(display_to_key(&name, bs, system), Some(k), "{name}");
                }
            }
        }
        assert_eq!(display_to_key("a2", BoardSize::SMALL, CoordSystem::Algebraic), None);
        assert_eq!(display_to_key("7", BoardSize::SMALL, CoordSystem::Algebraic), None);
    }

    #[test]
    fn test_malformed_algebraic_names_are_rejected() {
        let bs = BoardSize::SMALL;
        for name in ["a-2147483648", "a2147483647", "b0", "b-1", "", "a", "?3"] {
            assert_eq!(display_to_key(name, bs, CoordSystem::Algebraic), None, "{name}");
        }
    }

    #[test]
    fn test_wide_board_falls_back_to_field_numbers() {
        let bs = BoardSize::new(30, 2);
        for k in all_keys(bs) {
            let name = key_to_display(k, bs, CoordSystem::Algebraic);
            assert_eq!(display_to_key(&name, bs, CoordSystem::Algebraic), Some(k), "{name}");
        }
        assert_eq!(file_letter(25), Some('z'));
        assert_eq!(file_letter(26), None);
        assert_eq!(file_letter(-1), None);
    }
}
