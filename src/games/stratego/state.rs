//! Stratego state document, setup pools and actions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rank::{Army, CombatResult, Rank, StrategoPiece};
use crate::core::{Board, GameStatus, Square};
use crate::rules::{GameResult, TurnState};

/// Board edge length.
pub const SIZE: u8 = 10;

/// Lake squares: two 2×2 blocks in the middle rows.
#[must_use]
pub const fn is_lake(square: Square) -> bool {
    matches!(square.row, 4 | 5) && matches!(square.col, 2 | 3 | 6 | 7)
}

/// Check if `square` is inside `army`'s setup zone.
#[must_use]
pub const fn in_setup_zone(army: Army, square: Square) -> bool {
    match army {
        Army::Red => square.row >= 6 && square.row < SIZE && square.col < SIZE,
        Army::Blue => square.row <= 3 && square.col < SIZE,
    }
}

/// A value per army.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerArmy<T> {
    pub red: T,
    pub blue: T,
}

impl<T> PerArmy<T> {
    #[must_use]
    pub fn get(&self, army: Army) -> &T {
        match army {
            Army::Red => &self.red,
            Army::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, army: Army) -> &mut T {
        match army {
            Army::Red => &mut self.red,
            Army::Blue => &mut self.blue,
        }
    }
}

/// Pieces an army still has to place, by rank.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiecePool(BTreeMap<Rank, u8>);

impl PiecePool {
    /// A complete 40-piece army.
    #[must_use]
    pub fn full() -> Self {
        Self(Rank::ALL.iter().map(|&rank| (rank, rank.initial_count())).collect())
    }

    /// Nothing left to place.
    #[must_use]
    pub fn empty() -> Self {
        Self(Rank::ALL.iter().map(|&rank| (rank, 0)).collect())
    }

    /// Pieces of a rank still unplaced.
    #[must_use]
    pub fn remaining(&self, rank: Rank) -> u8 {
        self.0.get(&rank).copied().unwrap_or(0)
    }

    /// Total unplaced pieces.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(|&n| n as usize).sum()
    }

    /// Check if everything has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Take one piece of a rank. Returns false if none are left.
    pub fn take(&mut self, rank: Rank) -> bool {
        match self.0.get_mut(&rank) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Return one piece of a rank.
    pub fn put_back(&mut self, rank: Rank) {
        *self.0.entry(rank).or_insert(0) += 1;
    }

    /// Every unplaced piece as an individual rank.
    #[must_use]
    pub fn units(&self) -> Vec<Rank> {
        self.0
            .iter()
            .flat_map(|(&rank, &count)| std::iter::repeat(rank).take(count as usize))
            .collect()
    }

    /// Empty the pool.
    pub fn clear(&mut self) {
        for count in self.0.values_mut() {
            *count = 0;
        }
    }
}

impl Default for PiecePool {
    fn default() -> Self {
        Self::full()
    }
}

/// A setup action or a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum StrategoAction {
    /// Move (and possibly attack) during play.
    Move { from: Square, to: Square },
    /// Put a piece from the pool on a setup square.
    Place { square: Square, rank: Rank },
    /// Take a placed piece back into the pool.
    Remove { square: Square },
    /// Declare setup complete.
    Ready,
}

/// Combat details carried on the last move for reveal animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combat {
    pub attacker: Rank,
    pub defender: Rank,
    pub result: CombatResult,
}

/// The most recently applied ply, for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategoLastMove {
    pub by: Army,
    pub from: Square,
    pub to: Square,
    pub combat: Option<Combat>,
}

/// Authoritative Stratego state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategoState {
    pub board: Board<StrategoPiece>,
    pub current_player: Army,
    pub status: GameStatus,
    pub winner: Option<GameResult<Army>>,
    pub last_move: Option<StrategoLastMove>,
    pub setup_phase: bool,
    pub ready: PerArmy<bool>,
    pub pools: PerArmy<PiecePool>,
}

impl StrategoState {
    /// Empty board, `waiting`, full pools.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::empty(SIZE, SIZE),
            current_player: Army::Red,
            status: GameStatus::Waiting,
            winner: None,
            last_move: None,
            setup_phase: false,
            ready: PerArmy::default(),
            pools: PerArmy {
                red: PiecePool::full(),
                blue: PiecePool::full(),
            },
        }
    }

    /// Active game with exactly the listed pieces and empty pools.
    #[must_use]
    pub fn with_pieces(current_player: Army, pieces: &[(Square, Rank, Army)]) -> Self {
        let mut state = Self::new();
        for &(square, rank, owner) in pieces {
            state.board.set(square, StrategoPiece::new(rank, owner));
        }
        state.current_player = current_player;
        state.status = GameStatus::Active;
        state.ready = PerArmy { red: true, blue: true };
        state.pools = PerArmy {
            red: PiecePool::empty(),
            blue: PiecePool::empty(),
        };
        state
    }

    /// Check if an army still has its flag.
    #[must_use]
    pub fn has_flag(&self, army: Army) -> bool {
        self.board
            .pieces()
            .any(|(_, p)| p.owner == army && p.rank == Rank::Flag)
    }
}

impl Default for StrategoState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState for StrategoState {
    type Side = Army;

    fn status(&self) -> GameStatus {
        self.status
    }

    fn current_player(&self) -> Army {
        self.current_player
    }

    fn winner(&self) -> Option<GameResult<Army>> {
        self.winner
    }

    fn conclude(&mut self, result: GameResult<Army>) {
        self.status = GameStatus::Finished;
        self.winner = Some(result);
        self.setup_phase = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lakes() {
        let lakes: Vec<_> = Board::<StrategoPiece>::empty(SIZE, SIZE)
            .squares()
            .filter(|&s| is_lake(s))
            .collect();
        assert_eq!(lakes.len(), 8);
        assert!(is_lake(Square::new(4, 2)));
        assert!(!is_lake(Square::new(4, 4)));
    }

    #[test]
    fn test_setup_zones() {
        assert!(in_setup_zone(Army::Red, Square::new(9, 0)));
        assert!(in_setup_zone(Army::Red, Square::new(6, 9)));
        assert!(!in_setup_zone(Army::Red, Square::new(5, 0)));
        assert!(in_setup_zone(Army::Blue, Square::new(3, 4)));
        assert!(!in_setup_zone(Army::Blue, Square::new(4, 4)));
    }

    #[test]
    fn test_pool_take_and_return() {
        let mut pool = PiecePool::full();
        assert_eq!(pool.total(), 40);
        assert!(pool.take(Rank::Marshal));
        assert!(!pool.take(Rank::Marshal));
        pool.put_back(Rank::Marshal);
        assert_eq!(pool.remaining(Rank::Marshal), 1);
        assert_eq!(pool.units().len(), 40);

        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_action_json_shape() {
        let place = StrategoAction::Place { square: Square::new(6, 0), rank: Rank::Scout };
        let json = serde_json::to_string(&place).unwrap();
        assert_eq!(json, r#"{"action":"place","square":{"row":6,"col":0},"rank":"scout"}"#);

        let ready: StrategoAction = serde_json::from_str(r#"{"action":"ready"}"#).unwrap();
        assert_eq!(ready, StrategoAction::Ready);
    }

    #[test]
    fn test_state_json_field_names() {
        let json = serde_json::to_string(&StrategoState::new()).unwrap();
        for field in ["setupPhase", "ready", "pools", "\"marshal\":1", "currentPlayer"] {
            assert!(json.contains(field), "missing {field}");
        }
        let back: StrategoState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StrategoState::new());
    }
}
