//! Chess sides and pieces.

use serde::{Deserialize, Serialize};

use crate::side_enum;

/// Chess side. White moves first and starts on rows 6–7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

side_enum!(Color, White => "white", Black => "black");

impl Color {
    /// Row direction pawns advance in.
    #[must_use]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row holding this side's king and rooks at the start.
    #[must_use]
    pub const fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row pawns start on (and may double-step from).
    #[must_use]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row on which pawns promote.
    #[must_use]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

/// Chess piece types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// SAN letter; pawns have none.
    #[must_use]
    pub const fn letter(self) -> Option<char> {
        match self {
            PieceKind::Pawn => None,
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
        }
    }

    /// Check if a pawn may promote to this kind.
    #[must_use]
    pub const fn is_promotion_choice(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

/// A chess piece.
///
/// `has_moved` feeds castling legality and is set on every move of the piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessPiece {
    pub kind: PieceKind,
    pub owner: Color,
    #[serde(default)]
    pub has_moved: bool,
}

impl ChessPiece {
    /// An unmoved piece.
    #[must_use]
    pub const fn new(kind: PieceKind, owner: Color) -> Self {
        Self { kind, owner, has_moved: false }
    }

    /// Every chess piece can move.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        true
    }
}
