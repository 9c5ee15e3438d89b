//! Chess state document.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::piece::{ChessPiece, Color, PieceKind};
use crate::core::{Board, GameStatus, Square};
use crate::rules::{GameResult, TurnState};

/// Board edge length.
pub const SIZE: u8 = 8;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Which rook a king castles with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// Column of the rook's starting corner.
    #[must_use]
    pub const fn rook_col(self) -> u8 {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    /// Column the king lands on.
    #[must_use]
    pub const fn king_target_col(self) -> u8 {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    /// Column the rook lands on.
    #[must_use]
    pub const fn rook_target_col(self) -> u8 {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }
}

/// The four castling flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    /// All four rights, as at the start of a game.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }

    /// No rights.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            white_king_side: false,
            white_queen_side: false,
            black_king_side: false,
            black_queen_side: false,
        }
    }

    /// Check a single right.
    #[must_use]
    pub const fn allows(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side,
        }
    }

    /// Revoke a single right.
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        let flag = match (color, side) {
            (Color::White, CastleSide::KingSide) => &mut self.white_king_side,
            (Color::White, CastleSide::QueenSide) => &mut self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => &mut self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => &mut self.black_queen_side,
        };
        *flag = false;
    }

    /// Revoke both rights of a side.
    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }

    /// Revoke the right tied to a rook corner, if `square` is one.
    pub fn revoke_corner(&mut self, square: Square) {
        for color in [Color::White, Color::Black] {
            if square.row != color.back_row() {
                continue;
            }
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if square.col == side.rook_col() {
                    self.revoke(color, side);
                }
            }
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

/// A proposed chess move.
///
/// `promotion` is required when a pawn reaches the far rank and must be
/// absent otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }

    #[must_use]
    pub const fn promoting(from: Square, to: Square, kind: PieceKind) -> Self {
        Self { from, to, promotion: Some(kind) }
    }

    /// Parse coordinate notation such as `e2e4` or `e7e8q`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let from = Square::parse(text.get(0..2)?)?;
        let to = Square::parse(text.get(2..4)?)?;
        let promotion = match text.get(4..) {
            None | Some("") => None,
            Some("q") => Some(PieceKind::Queen),
            Some("r") => Some(PieceKind::Rook),
            Some("b") => Some(PieceKind::Bishop),
            Some("n") => Some(PieceKind::Knight),
            Some(_) => return None,
        };
        Some(Self { from, to, promotion })
    }
}

/// The most recently applied ply, for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessLastMove {
    pub by: Color,
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub castle: Option<CastleSide>,
    pub en_passant: bool,
    pub check: bool,
}

/// Authoritative Chess state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessState {
    pub board: Board<ChessPiece>,
    pub current_player: Color,
    pub status: GameStatus,
    pub winner: Option<GameResult<Color>>,
    pub last_move: Option<ChessLastMove>,
    pub castling: CastlingRights,
    /// Square a pawn passed over on its double step last ply.
    pub en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub half_move_clock: u32,
    pub full_move_number: u32,
    /// SAN of every ply, for display.
    pub history: Vector<String>,
}

impl ChessState {
    /// Standard starting position, `waiting`.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty(SIZE, SIZE);
        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            let col = col as u8;
            board.set(Square::new(Color::Black.back_row(), col), ChessPiece::new(kind, Color::Black));
            board.set(Square::new(Color::White.back_row(), col), ChessPiece::new(kind, Color::White));
            board.set(
                Square::new(Color::Black.pawn_row(), col),
                ChessPiece::new(PieceKind::Pawn, Color::Black),
            );
            board.set(
                Square::new(Color::White.pawn_row(), col),
                ChessPiece::new(PieceKind::Pawn, Color::White),
            );
        }
        Self::from_board(board, Color::White, GameStatus::Waiting, CastlingRights::all())
    }

    /// Build a state from an arbitrary position.
    #[must_use]
    pub fn from_board(
        board: Board<ChessPiece>,
        current_player: Color,
        status: GameStatus,
        castling: CastlingRights,
    ) -> Self {
        Self {
            board,
            current_player,
            status,
            winner: None,
            last_move: None,
            castling,
            en_passant: None,
            half_move_clock: 0,
            full_move_number: 1,
            history: Vector::new(),
        }
    }

    /// Active position with only the listed pieces, no castling rights.
    ///
    /// Pieces off their home squares are marked as moved.
    #[must_use]
    pub fn with_pieces(current_player: Color, pieces: &[(&str, PieceKind, Color)]) -> Self {
        let mut board = Board::empty(SIZE, SIZE);
        for &(name, kind, owner) in pieces {
            if let Some(square) = Square::parse(name) {
                board.set(square, ChessPiece { kind, owner, has_moved: true });
            }
        }
        Self::from_board(board, current_player, GameStatus::Active, CastlingRights::none())
    }

    /// Where a side's king stands.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.board
            .pieces()
            .find(|(_, p)| p.kind == PieceKind::King && p.owner == color)
            .map(|(square, _)| square)
    }
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState for ChessState {
    type Side = Color;

    fn status(&self) -> GameStatus {
        self.status
    }

    fn current_player(&self) -> Color {
        self.current_player
    }

    fn winner(&self) -> Option<GameResult<Color>> {
        self.winner
    }

    fn conclude(&mut self, result: GameResult<Color>) {
        self.status = GameStatus::Finished;
        self.winner = Some(result);
    }
}
