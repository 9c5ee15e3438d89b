//! Checkers state and rules.

use serde::{Deserialize, Serialize};

use super::piece::{CheckersPiece, Color};
use crate::core::{Board, GameKind, GameStatus, RuleError, RuleResult, Side, Square, SquareSet};
use crate::rules::{ensure_turn, GameResult, Ply, RuleEngine, TurnState};

/// Board edge length.
pub const SIZE: u8 = 8;

/// Rows each side starts on.
const BLACK_ROWS: std::ops::Range<u8> = 0..3;
const WHITE_ROWS: std::ops::Range<u8> = 5..8;

/// A single step or jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckersMove {
    pub from: Square,
    pub to: Square,
}

impl CheckersMove {
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Check if this move jumps a piece.
    #[must_use]
    pub fn is_jump(&self) -> bool {
        self.from.row.abs_diff(self.to.row) == 2
    }

    /// Square jumped over, for jumps.
    #[must_use]
    pub fn jumped(&self) -> Option<Square> {
        self.is_jump().then(|| {
            Square::new(
                self.from.row.min(self.to.row) + 1,
                self.from.col.min(self.to.col) + self.from.col.abs_diff(self.to.col) / 2,
            )
        })
    }
}

/// The most recently applied ply, for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckersLastMove {
    pub by: Color,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Square>,
    pub crowned: bool,
}

/// Authoritative Checkers state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckersState {
    pub board: Board<CheckersPiece>,
    pub current_player: Color,
    pub status: GameStatus,
    pub winner: Option<GameResult<Color>>,
    pub last_move: Option<CheckersLastMove>,
    /// Square of the piece that must keep capturing before the turn passes.
    pub pending_capture: Option<Square>,
}

impl CheckersState {
    /// Standard opening layout, `waiting`.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty(SIZE, SIZE);
        let squares: Vec<Square> = board.squares().collect();
        for square in squares {
            if !square.is_dark() {
                continue;
            }
            if BLACK_ROWS.contains(&square.row) {
                board.set(square, CheckersPiece::man(Color::Black));
            } else if WHITE_ROWS.contains(&square.row) {
                board.set(square, CheckersPiece::man(Color::White));
            }
        }
        Self::from_board(board, Color::FIRST, GameStatus::Waiting)
    }

    /// Build a state from an arbitrary board.
    #[must_use]
    pub fn from_board(board: Board<CheckersPiece>, current_player: Color, status: GameStatus) -> Self {
        Self {
            board,
            current_player,
            status,
            winner: None,
            last_move: None,
            pending_capture: None,
        }
    }

    /// Active state with the given pieces and nothing else on the board.
    #[must_use]
    pub fn with_pieces(current_player: Color, pieces: &[(Square, CheckersPiece)]) -> Self {
        let mut board = Board::empty(SIZE, SIZE);
        for &(square, piece) in pieces {
            board.set(square, piece);
        }
        Self::from_board(board, current_player, GameStatus::Active)
    }

    /// Number of pieces a side has left.
    #[must_use]
    pub fn piece_count(&self, side: Color) -> usize {
        self.board.pieces().filter(|(_, p)| p.owner == side).count()
    }
}

impl Default for CheckersState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState for CheckersState {
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
        self.pending_capture = None;
    }
}

/// Checkers rule engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Checkers;

impl Checkers {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Jumps available to the piece on `from`, ignoring whose turn it is.
    fn jumps(board: &Board<CheckersPiece>, from: Square, piece: &CheckersPiece) -> SquareSet {
        let mut out = SquareSet::new();
        for &(dr, dc) in piece.directions() {
            let Some(over) = from.offset(dr, dc, SIZE, SIZE) else { continue };
            let Some(landing) = from.offset(dr * 2, dc * 2, SIZE, SIZE) else { continue };
            let jumps_enemy = board.get(over).is_some_and(|p| p.owner != piece.owner);
            if jumps_enemy && board.is_empty_at(landing) {
                out.insert(landing);
            }
        }
        out
    }

    /// Single diagonal steps available to the piece on `from`.
    fn steps(board: &Board<CheckersPiece>, from: Square, piece: &CheckersPiece) -> SquareSet {
        piece
            .directions()
            .iter()
            .filter_map(|&(dr, dc)| from.offset(dr, dc, SIZE, SIZE))
            .filter(|&to| board.is_empty_at(to))
            .collect()
    }
}

impl RuleEngine for Checkers {
    type State = CheckersState;
    type Move = CheckersMove;

    fn kind(&self) -> GameKind {
        GameKind::Checkers
    }

    fn initial_state(&self) -> CheckersState {
        CheckersState::new()
    }

    fn begin(&self, state: &CheckersState) -> RuleResult<CheckersState> {
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

    fn legal_moves(&self, state: &CheckersState, from: Square) -> SquareSet {
        if !state.status.is_active() {
            return SquareSet::new();
        }
        let Some(piece) = state.board.get(from) else {
            return SquareSet::new();
        };
        if piece.owner != state.current_player {
            return SquareSet::new();
        }
        match state.pending_capture {
            Some(chain) if chain != from => SquareSet::new(),
            Some(_) => Self::jumps(&state.board, from, piece),
            None => {
                let mut moves = Self::steps(&state.board, from, piece);
                for landing in Self::jumps(&state.board, from, piece).iter() {
                    moves.insert(landing);
                }
                moves
            }
        }
    }

    fn apply_move(
        &self,
        state: &CheckersState,
        side: Color,
        mv: &CheckersMove,
    ) -> RuleResult<Ply<CheckersState>> {
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

        let mut next = state.clone();
        next.board.relocate(mv.from, mv.to);

        let captured = mv.jumped();
        if let Some(square) = captured {
            next.board.take(square);
        }

        let crowned = !piece.is_king() && mv.to.row == side.crown_row();
        if crowned {
            next.board.set(mv.to, CheckersPiece::king(side));
        }

        // A capture chain continues with the same piece unless it was just crowned.
        let continues = captured.is_some()
            && !crowned
            && next
                .board
                .get(mv.to)
                .is_some_and(|moved| !Self::jumps(&next.board, mv.to, moved).is_empty());

        if continues {
            next.pending_capture = Some(mv.to);
        } else {
            next.pending_capture = None;
            next.current_player = side.opponent();
        }

        next.last_move = Some(CheckersLastMove {
            by: side,
            from: mv.from,
            to: mv.to,
            captured,
            crowned,
        });

        let outcome = self.settle(&mut next);
        Ok(Ply::Complete { state: next, outcome })
    }

    fn check_termination(&self, state: &CheckersState) -> Option<GameResult<Color>> {
        if !state.status.is_active() {
            return None;
        }
        for side in Color::both() {
            if state.piece_count(side) == 0 {
                return Some(GameResult::loss_for(side));
            }
        }
        if self.all_moves(state).is_empty() {
            return Some(GameResult::loss_for(state.current_player));
        }
        None
    }

    fn all_moves(&self, state: &CheckersState) -> Vec<CheckersMove> {
        let side = state.current_player;
        state
            .board
            .pieces()
            .filter(|(_, piece)| piece.owner == side)
            .flat_map(|(from, _)| {
                self.legal_moves(state, from)
                    .iter()
                    .map(move |to| CheckersMove::new(from, to))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
