//! Rule engine trait for game implementations.
//!
//! Games implement `RuleEngine` to define their rules:
//! - Which destinations are legal for a selected piece
//! - How a move (or setup action) produces the next state
//! - Win/loss/draw conditions
//!
//! Game states implement `TurnState` so the timer and sync layers can read
//! status, side to move and winner without knowing the game.

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

use crate::core::config::GameKind;
use crate::core::error::{RuleError, RuleResult};
use crate::core::rng::GameRng;
use crate::core::side::Side;
use crate::core::square::{Square, SquareSet};
use crate::core::status::GameStatus;

/// JSON marker used for a drawn game in the `winner` field.
pub const DRAW_MARKER: &str = "draw";

/// Result of a completed game.
///
/// Serializes as the winning side's name, or `"draw"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameResult<S> {
    /// Single winner.
    Winner(S),
    /// Draw (no winner).
    Draw,
}

impl<S: Side> GameResult<S> {
    /// Check if a side won.
    #[must_use]
    pub fn is_winner(&self, side: S) -> bool {
        matches!(self, GameResult::Winner(winner) if *winner == side)
    }

    /// Result in which `side` loses.
    #[must_use]
    pub fn loss_for(side: S) -> Self {
        GameResult::Winner(side.opponent())
    }
}

impl<S: Side> Serialize for GameResult<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        match self {
            GameResult::Winner(side) => side.serialize(serializer),
            GameResult::Draw => serializer.serialize_str(DRAW_MARKER),
        }
    }
}

impl<'de, S: Side> Deserialize<'de> for GameResult<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == DRAW_MARKER {
            return Ok(GameResult::Draw);
        }
        let side: serde::de::value::StrDeserializer<'_, D::Error> = text.as_str().into_deserializer();
        S::deserialize(side).map(GameResult::Winner)
    }
}

/// Status and turn accessors every game state provides.
pub trait TurnState: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync {
    /// The game's seat type.
    type Side: Side;

    /// Lifecycle status.
    fn status(&self) -> GameStatus;

    /// Side allowed to produce the next transition.
    fn current_player(&self) -> Self::Side;

    /// Final result, once finished.
    fn winner(&self) -> Option<GameResult<Self::Side>>;

    /// Mark the game finished with the given result.
    fn conclude(&mut self, result: GameResult<Self::Side>);
}

/// Side type of an engine's state.
pub type SideOf<E> = <<E as RuleEngine>::State as TurnState>::Side;

/// Outcome of `apply_move`.
#[derive(Clone, Debug, PartialEq)]
pub enum Ply<S: TurnState> {
    /// The move was applied. `outcome` is set when it ended the game.
    Complete {
        state: S,
        outcome: Option<GameResult<S::Side>>,
    },
    /// A pawn move needs a promotion choice before it can be applied.
    PromotionPending { from: Square, to: Square },
}

impl<S: TurnState> Ply<S> {
    /// The next state, if the ply completed.
    #[must_use]
    pub fn into_state(self) -> Option<S> {
        match self {
            Ply::Complete { state, .. } => Some(state),
            Ply::PromotionPending { .. } => None,
        }
    }

    /// Check if a promotion choice is still required.
    #[must_use]
    pub fn is_promotion_pending(&self) -> bool {
        matches!(self, Ply::PromotionPending { .. })
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_moves`: empty unless the game is active and the piece belongs to
///   the side to move
/// - `apply_move`: pure; returns a new state, never mutates the input
/// - `check_termination`: must return `None` outside `active`
/// - `all_moves`: every complete move for the side to move, promotions as Queen
pub trait RuleEngine {
    /// Authoritative state document.
    type State: TurnState;

    /// A proposed transition (move, or setup action for games that have one).
    type Move: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Which game this engine plays.
    fn kind(&self) -> GameKind;

    /// Fresh state in `waiting` status.
    fn initial_state(&self) -> Self::State;

    /// Leave `waiting`: enter `setup` or `active`.
    fn begin(&self, state: &Self::State) -> RuleResult<Self::State>;

    /// Legal destinations for the piece on `from`.
    fn legal_moves(&self, state: &Self::State, from: Square) -> SquareSet;

    /// Validate and apply one transition for `side`.
    fn apply_move(
        &self,
        state: &Self::State,
        side: SideOf<Self>,
        mv: &Self::Move,
    ) -> RuleResult<Ply<Self::State>>;

    /// Evaluate end-of-game conditions. Only meaningful while `active`.
    fn check_termination(&self, state: &Self::State) -> Option<GameResult<SideOf<Self>>>;

    /// Every complete move available to the side to move.
    fn all_moves(&self, state: &Self::State) -> Vec<Self::Move>;

    /// Sides that still have setup work outstanding.
    fn setup_pending(&self, _state: &Self::State) -> Vec<SideOf<Self>> {
        Vec::new()
    }

    /// Finish `side`'s setup automatically.
    fn complete_setup(
        &self,
        _state: &Self::State,
        _side: SideOf<Self>,
        _rng: &mut GameRng,
    ) -> RuleResult<Self::State> {
        Err(RuleError::NotInSetup)
    }

    // === Convenience Methods ===

    /// Pick a uniformly random move for the side to move.
    fn forced_move(&self, state: &Self::State, rng: &mut GameRng) -> Option<Self::Move> {
        let moves = self.all_moves(state);
        rng.choose(&moves).cloned()
    }

    /// Evaluate termination and, if the game is over, conclude it.
    ///
    /// Does nothing unless the state is `active`, so a half-built setup board
    /// can never end the game.
    fn settle(&self, state: &mut Self::State) -> Option<GameResult<SideOf<Self>>> {
        if !state.status().is_active() {
            return None;
        }
        let result = self.check_termination(state)?;
        state.conclude(result);
        Some(result)
    }
}

/// Reject transitions outside `active` or by the side not to move.
pub fn ensure_turn<S: TurnState>(state: &S, side: S::Side) -> RuleResult<()> {
    match state.status() {
        GameStatus::Active => {}
        GameStatus::Finished => return Err(RuleError::GameFinished),
        other => return Err(RuleError::NotActive(other)),
    }
    if state.current_player() != side {
        return Err(RuleError::NotYourTurn);
    }
    Ok(())
}
