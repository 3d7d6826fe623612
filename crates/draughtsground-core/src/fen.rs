//! Position string codec.
//!
//! Format: `W:W31,32,K45:B1,2,G17`: an optional turn part, then one side
//! list per colour. Entries are field numbers prefixed `K` (king), `G` (ghost
//! man) or `P` (ghost king); `N-M` expands to a range. A trailing part
//! `+<n><key>+<n><key>` carries consecutive king move counters for white and
//! black.

use crate::types::{BoardSize, Color, Key, Piece, Pieces, Role};

/// Alias accepted by [`read`] for the initial position.
pub const START: &str = "start";

/// Initial position for a board size: the top two-fifths of the rows hold
/// black men, the bottom two-fifths white men.
pub fn initial(bs: BoardSize) -> Pieces {
    let files = bs.files();
    let filled_rows = bs.rows.saturating_sub(2) / 2;
    let black_last = files * filled_rows;
    let white_first = bs.fields() - black_last + 1;
    let mut pieces = Pieces::new();
    for field in 1..=black_last {
        pieces.extend(bs.key(field).map(|k| (k, Piece::man(Color::Black))));
    }
    for field in white_first..=bs.fields() {
        pieces.extend(bs.key(field).map(|k| (k, Piece::man(Color::White))));
    }
    pieces
}

/// Side to move, when the first part names one.
pub fn read_turn(fen: &str) -> Option<Color> {
    match fen.trim().split(':').next().map(str::trim) {
        Some("W") => Some(Color::White),
        Some("B") => Some(Color::Black),
        _ => None,
    }
}

/// Parse a position string. Malformed entries are skipped individually.
pub fn read(fen: &str, bs: BoardSize) -> Pieces {
    let fen = fen.trim();
    if fen == START {
        return initial(bs);
    }
    let mut pieces = Pieces::new();
    let mut counters = None;
    for part in fen.split(':').map(str::trim) {
        if part.starts_with('+') {
            counters = Some(part);
            continue;
        }
        if part.len() <= 1 {
            continue;
        }
        let color = match part.as_bytes()[0] {
            b'W' => Color::White,
            b'B' => Color::Black,
            _ => continue,
        };
        for token in part[1..].split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match parse_entry(token, bs) {
                Some((role, keys)) => {
                    for key in keys {
                        pieces.insert(key, Piece::new(role, color));
                    }
                }
                None => log::warn!("Skipping malformed position entry {token:?}"),
            }
        }
    }
    if let Some(counters) = counters {
        apply_king_moves(&mut pieces, counters, bs);
    }
    pieces
}

fn parse_entry(token: &str, bs: BoardSize) -> Option<(Role, Vec<Key>)> {
    let (role, rest) = match token.as_bytes()[0] {
        b'K' => (Role::King, &token[1..]),
        b'G' => (Role::GhostMan, &token[1..]),
        b'P' => (Role::GhostKing, &token[1..]),
        _ => (Role::Man, token),
    };
    let parse = |s: &str| s.parse::<Key>().ok().filter(|k| bs.contains(*k));
    let keys = match rest.split_once('-') {
        Some((from, to)) => {
            let (from, to) = (parse(from)?, parse(to)?);
            if from > to {
                return None;
            }
            (from.field()..=to.field()).filter_map(|f| bs.key(f)).collect()
        }
        None => vec![parse(rest)?],
    };
    Some((role, keys))
}

fn apply_king_moves(pieces: &mut Pieces, segment: &str, bs: BoardSize) {
    let sides = [Color::White, Color::Black];
    for (color, token) in sides.into_iter().zip(segment.split('+').skip(1)) {
        let token = token.trim();
        if token.len() < 2 {
            continue;
        }
        let mut chars = token.chars();
        let count = chars.next().and_then(|c| c.to_digit(10)).map(|d| d as u8);
        let key = chars.as_str().parse::<Key>().ok().filter(|k| bs.contains(*k));
        match (count, key) {
            (Some(count), Some(key)) => {
                if let Some(piece) = pieces.get_mut(&key) {
                    if piece.role == Role::King && piece.color == color {
                        piece.king_moves = count;
                    }
                }
            }
            _ => log::warn!("Skipping malformed king move counter {token:?}"),
        }
    }
}

fn entry(key: Key, piece: &Piece) -> String {
    let prefix = match piece.role {
        Role::Man => "",
        Role::King => "K",
        Role::GhostMan => "G",
        Role::GhostKing => "P",
    };
    format!("{prefix}{}", key.field())
}

fn king_counter(pieces: &Pieces, color: Color) -> Option<String> {
    pieces
        .iter()
        .find(|(_, p)| p.color == color && p.role == Role::King && p.king_moves > 0)
        .map(|(k, p)| format!("{}{}", p.king_moves, k.field()))
}

/// Write both side lists. Both prefixes are always present.
pub fn write(pieces: &Pieces) -> String {
    let side = |color: Color| {
        pieces
            .iter()
            .filter(|(_, p)| p.color == color)
            .map(|(k, p)| entry(*k, p))
            .collect::<Vec<_>>()
            .join(",")
    };
    let mut fen = format!("W{}:B{}", side(Color::White), side(Color::Black));
    let white = king_counter(pieces, Color::White);
    let black = king_counter(pieces, Color::Black);
    if white.is_some() || black.is_some() {
        fen.push_str(&format!(
            ":+{}+{}",
            white.unwrap_or_default(),
            black.unwrap_or_default()
        ));
    }
    fen
}

/// Write a full position string including the side to move.
pub fn write_with_turn(turn: Color, pieces: &Pieces) -> String {
    let prefix = match turn {
        Color::White => "W",
        Color::Black => "B",
    };
    format!("{prefix}:{}", write(pieces))
}
