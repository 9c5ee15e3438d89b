//! Checkers sides and pieces.

use serde::{Deserialize, Serialize};

use crate::side_enum;

/// Checkers side. Black moves first, from the top rows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

side_enum!(Color, Black => "black", White => "white");

impl Color {
    /// Row direction a man of this colour advances in.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }

    /// Row on which a man of this colour is crowned.
    #[must_use]
    pub const fn crown_row(self) -> u8 {
        match self {
            Color::Black => 7,
            Color::White => 0,
        }
    }
}

/// Man or king.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Man,
    King,
}

/// A checkers piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckersPiece {
    pub kind: PieceKind,
    pub owner: Color,
}

const KING_DIRECTIONS: [(i8, i8); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];
const BLACK_MAN_DIRECTIONS: [(i8, i8); 2] = [(1, -1), (1, 1)];
const WHITE_MAN_DIRECTIONS: [(i8, i8); 2] = [(-1, -1), (-1, 1)];

impl CheckersPiece {
    /// An uncrowned piece.
    #[must_use]
    pub const fn man(owner: Color) -> Self {
        Self { kind: PieceKind::Man, owner }
    }

    /// A crowned piece.
    #[must_use]
    pub const fn king(owner: Color) -> Self {
        Self { kind: PieceKind::King, owner }
    }

    /// Check if crowned.
    #[must_use]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Every checkers piece can move.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        true
    }

    /// Diagonal directions this piece may step or jump in.
    #[must_use]
    pub fn directions(&self) -> &'static [(i8, i8)] {
        match (self.kind, self.owner) {
            (PieceKind::King, _) => &KING_DIRECTIONS,
            (PieceKind::Man, Color::Black) => &BLACK_MAN_DIRECTIONS,
            (PieceKind::Man, Color::White) => &WHITE_MAN_DIRECTIONS,
        }
    }
}
