//! Chess rule engine: move application and termination.

use super::movegen::{board_after, castle_side, has_any_move, in_check, legal_destinations};
use super::notation::san;
use super::piece::{ChessPiece, Color, PieceKind};
use super::state::{ChessLastMove, ChessMove, ChessState};
use crate::core::{GameKind, GameStatus, RuleError, RuleResult, Side, Square, SquareSet};
use crate::rules::{ensure_turn, GameResult, Ply, RuleEngine};

/// Half-moves without a pawn move or capture after which the game is drawn.
pub const FIFTY_MOVE_LIMIT: u32 = 100;

/// Chess rule engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Chess;

impl Chess {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Check if the piece is a pawn landing on its promotion row.
    fn promotes(piece: &ChessPiece, to: Square) -> bool {
        piece.kind == PieceKind::Pawn && to.row == piece.owner.promotion_row()
    }

    /// Neither side can possibly deliver mate.
    #[must_use]
    pub fn insufficient_material(state: &ChessState) -> bool {
        let mut minors = Vec::new();
        for (square, piece) in state.board.pieces() {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Bishop | PieceKind::Knight => minors.push((square, piece.kind)),
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            many => {
                // Bishops only, all on the same square colour.
                let first_colour = many[0].0.is_dark();
                many.iter()
                    .all(|&(square, kind)| kind == PieceKind::Bishop && square.is_dark() == first_colour)
            }
        }
    }
}

impl RuleEngine for Chess {
    type State = ChessState;
    type Move = ChessMove;

    fn kind(&self) -> GameKind {
        GameKind::Chess
    }

    fn initial_state(&self) -> ChessState {
        ChessState::new()
    }

    fn begin(&self, state: &ChessState) -> RuleResult<ChessState> {
        match state.status {
            GameStatus::Waiting => {
                let mut next = state.clone();
                next.status = GameStatus::Active;
                next.current_player = Color::FIRST;
                Ok(next)
            }
            GameStatus::Finished => Err(RuleError::GameFinished),
            other => Err(RuleError::NotActive(other)),
        }
    }

    fn legal_moves(&self, state: &ChessState, from: Square) -> SquareSet {
        if !state.status.is_active() {
            return SquareSet::new();
        }
        match state.board.get(from) {
            Some(piece) if piece.owner == state.current_player => legal_destinations(state, from),
            _ => SquareSet::new(),
        }
    }

    fn apply_move(&self, state: &ChessState, side: Color, mv: &ChessMove) -> RuleResult<Ply<ChessState>> {
        ensure_turn(state, side)?;
        if !state.board.contains(mv.from) || !state.board.contains(mv.to) {
            return Err(RuleError::IllegalMove { from: mv.from, to: mv.to });
        }
        let piece = match state.board.get(mv.from) {
            Some(piece) if piece.owner == side => *piece,
            _ => return Err(RuleError::NoPiece(mv.from)),
        };
        if !self.legal_moves(state, mv.from).contains(mv.to) {
            return Err(RuleError::IllegalMove { from: mv.from, to: mv.to });
        }

        let promotion = if Self::promotes(&piece, mv.to) {
            match mv.promotion {
                None => return Ok(Ply::PromotionPending { from: mv.from, to: mv.to }),
                Some(kind) if kind.is_promotion_choice() => Some(kind),
                Some(_) => return Err(RuleError::InvalidPromotion),
            }
        } else if mv.promotion.is_some() {
            return Err(RuleError::InvalidPromotion);
        } else {
            None
        };

        let en_passant = piece.kind == PieceKind::Pawn
            && mv.from.col != mv.to.col
            && state.board.get(mv.to).is_none();
        let captured = if en_passant {
            Some(PieceKind::Pawn)
        } else {
            state.board.get(mv.to).map(|p| p.kind)
        };
        let castle = castle_side(&piece, mv.from, mv.to);
        let mut notation = san(state, mv.from, mv.to, promotion, captured.is_some(), castle);

        let mut next = state.clone();
        next.board = board_after(state, mv.from, mv.to);
        if let Some(moved) = next.board.get_mut(mv.to) {
            moved.has_moved = true;
            if let Some(kind) = promotion {
                moved.kind = kind;
            }
        }
        if let Some(castled) = castle {
            let rook_square = Square::new(mv.from.row, castled.rook_target_col());
            if let Some(rook) = next.board.get_mut(rook_square) {
                rook.has_moved = true;
            }
        }

        if piece.kind == PieceKind::King {
            next.castling.revoke_all(side);
        }
        next.castling.revoke_corner(mv.from);
        next.castling.revoke_corner(mv.to);

        next.en_passant = (piece.kind == PieceKind::Pawn && mv.from.row.abs_diff(mv.to.row) == 2)
            .then(|| Square::new(mv.from.row.min(mv.to.row) + 1, mv.from.col));

        if piece.kind == PieceKind::Pawn || captured.is_some() {
            next.half_move_clock = 0;
        } else {
            next.half_move_clock += 1;
        }
        if side == Color::Black {
            next.full_move_number += 1;
        }
        next.current_player = side.opponent();

        let check = in_check(&next.board, side.opponent());
        next.last_move = Some(ChessLastMove {
            by: side,
            from: mv.from,
            to: mv.to,
            piece: piece.kind,
            captured,
            promotion,
            castle,
            en_passant,
            check,
        });

        let outcome = self.settle(&mut next);
        if matches!(outcome, Some(GameResult::Winner(_))) {
            notation.push('#');
        } else if check {
            notation.push('+');
        }
        next.history.push_back(notation);

        Ok(Ply::Complete { state: next, outcome })
    }

    fn check_termination(&self, state: &ChessState) -> Option<GameResult<Color>> {
        if !state.status.is_active() {
            return None;
        }
        let to_move = state.current_player;
        if !has_any_move(state, to_move) {
            return Some(if in_check(&state.board, to_move) {
                GameResult::loss_for(to_move)
            } else {
                GameResult::Draw
            });
        }
        if Self::insufficient_material(state) || state.half_move_clock >= FIFTY_MOVE_LIMIT {
            return Some(GameResult::Draw);
        }
        None
    }

    fn all_moves(&self, state: &ChessState) -> Vec<ChessMove> {
        let side = state.current_player;
        let mut moves = Vec::new();
        for (from, piece) in state.board.pieces().filter(|(_, p)| p.owner == side) {
            for to in self.legal_moves(state, from).iter() {
                moves.push(if Self::promotes(piece, to) {
                    ChessMove::promoting(from, to, PieceKind::Queen)
                } else {
                    ChessMove::new(from, to)
                });
            }
        }
        moves
    }
}
