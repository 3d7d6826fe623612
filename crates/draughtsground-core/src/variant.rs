//! Variant configuration: capture geometries and per-variant bookkeeping.

use crate::types::BoardSize;
use serde::{Deserialize, Serialize};

/// Which lines a capture may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionTable {
    /// Diagonal jumps, the standard geometry.
    pub diagonal: bool,
    /// Orthogonal jumps along files and ranks (Frisian).
    pub orthogonal: bool,
}

impl DirectionTable {
    pub const DIAGONAL: DirectionTable = DirectionTable {
        diagonal: true,
        orthogonal: false,
    };
    pub const DIAGONAL_AND_ORTHOGONAL: DirectionTable = DirectionTable {
        diagonal: true,
        orthogonal: true,
    };
}

impl Default for DirectionTable {
    fn default() -> Self {
        Self::DIAGONAL
    }
}

/// Draughts variant the board is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    #[default]
    Standard,
    Frisian,
    Russian,
    Brazilian,
}

impl Variant {
    pub fn directions(self) -> DirectionTable {
        match self {
            Variant::Frisian => DirectionTable::DIAGONAL_AND_ORTHOGONAL,
            Variant::Standard | Variant::Russian | Variant::Brazilian => DirectionTable::DIAGONAL,
        }
    }

    /// Whether consecutive king moves are counted.
    pub fn tracks_king_moves(self) -> bool {
        self == Variant::Frisian
    }

    pub fn board_size(self) -> BoardSize {
        match self {
            Variant::Standard | Variant::Frisian => BoardSize::INTERNATIONAL,
            Variant::Russian | Variant::Brazilian => BoardSize::SMALL,
        }
    }
}
