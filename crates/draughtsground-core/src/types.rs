//! Board primitives: squares, pieces and board dimensions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a square identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Not a field number: {0:?}")]
    NotANumber(String),
    #[error("Field number out of range: {0}")]
    OutOfRange(u32),
}

/// Identifier of one playable (dark) square.
///
/// Internally the 1-based field number; displayed zero-padded to two digits
/// (`"03"`). Whether a key exists on a given board is decided by
/// [`BoardSize::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(u8);

impl Key {
    /// Create a key from a 1-based field number.
    pub fn new(field: u8) -> Option<Self> {
        (field >= 1).then_some(Self(field))
    }

    /// The 1-based field number.
    pub fn field(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyError::NotANumber(s.to_string()));
        }
        let n: u32 = trimmed
            .parse()
            .map_err(|_| KeyError::NotANumber(s.to_string()))?;
        match u8::try_from(n) {
            Ok(field) if field >= 1 => Ok(Self(field)),
            _ => Err(KeyError::OutOfRange(n)),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// Board coordinate derived from a key.
///
/// `file` counts playable squares within a row (1-based), `rank` counts rows
/// from the top of the board as seen from white (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub file: i32,
    pub rank: i32,
}

impl Pos {
    pub const fn new(file: i32, rank: i32) -> Self {
        Self { file, rank }
    }
}

/// Side colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

/// Piece role. Ghost roles stand in for pieces captured during an unfinished
/// capture chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Man,
    King,
    GhostMan,
    GhostKing,
}

impl Role {
    pub fn is_ghost(self) -> bool {
        matches!(self, Role::GhostMan | Role::GhostKing)
    }

    /// The ghost counterpart of a live role; ghosts map to themselves.
    pub fn ghost(self) -> Self {
        match self {
            Role::Man | Role::GhostMan => Role::GhostMan,
            Role::King | Role::GhostKing => Role::GhostKing,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Man => "man",
            Role::King => "king",
            Role::GhostMan => "ghostman",
            Role::GhostKing => "ghostking",
        }
    }
}

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub role: Role,
    pub color: Color,
    /// Set when a man was crowned on this board.
    #[serde(default)]
    pub promoted: bool,
    /// Consecutive non-capturing king moves (Frisian bookkeeping).
    #[serde(default)]
    pub king_moves: u8,
}

impl Piece {
    pub fn new(role: Role, color: Color) -> Self {
        Self {
            role,
            color,
            promoted: false,
            king_moves: 0,
        }
    }

    pub fn man(color: Color) -> Self {
        Self::new(Role::Man, color)
    }

    pub fn king(color: Color) -> Self {
        Self::new(Role::King, color)
    }

    /// Role and colour match; bookkeeping fields are ignored.
    pub fn same(&self, other: &Piece) -> bool {
        self.role == other.role && self.color == other.color
    }

    /// Visual class name, e.g. `"white king"`.
    pub fn class_name(&self) -> String {
        format!("{} {}", self.color.name(), self.role.name())
    }
}

/// Sparse square → piece map; absent key means an empty square.
pub type Pieces = BTreeMap<Key, Piece>;

/// Partial update for [`crate::board::set_pieces`]: `None` removes.
pub type PiecesDiff = BTreeMap<Key, Option<Piece>>;

/// Board dimensions in cells. Half the cells are playable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    pub columns: u8,
    pub rows: u8,
}

impl BoardSize {
    /// 10×10 international board.
    pub const INTERNATIONAL: BoardSize = BoardSize::new(10, 10);
    /// 8×8 board used by Russian and Brazilian draughts.
    pub const SMALL: BoardSize = BoardSize::new(8, 8);

    pub const fn new(columns: u8, rows: u8) -> Self {
        Self { columns, rows }
    }

    /// Playable squares per row.
    pub fn files(self) -> u8 {
        self.columns / 2
    }

    /// Number of playable squares.
    pub fn fields(self) -> u8 {
        self.files() * self.rows
    }

    pub fn contains(self, key: Key) -> bool {
        key.field() <= self.fields()
    }

    /// Key for a 1-based field number, if it exists on this board.
    pub fn key(self, field: u8) -> Option<Key> {
        Key::new(field).filter(|k| self.contains(*k))
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::INTERNATIONAL
    }
}
