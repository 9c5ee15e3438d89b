//! Stratego armies, ranks and combat resolution.

use serde::{Deserialize, Serialize};

use crate::side_enum;

/// Stratego side. Red sets up on the bottom four rows and moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Army {
    Red,
    Blue,
}

side_enum!(Army, Red => "red", Blue => "blue");

/// Piece ranks, weakest mobile rank first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Flag,
    Spy,
    Scout,
    Miner,
    Sergeant,
    Lieutenant,
    Captain,
    Major,
    Colonel,
    General,
    Marshal,
    Bomb,
}

impl Rank {
    /// Every rank, in declaration order.
    pub const ALL: [Rank; 12] = [
        Rank::Flag,
        Rank::Spy,
        Rank::Scout,
        Rank::Miner,
        Rank::Sergeant,
        Rank::Lieutenant,
        Rank::Captain,
        Rank::Major,
        Rank::Colonel,
        Rank::General,
        Rank::Marshal,
        Rank::Bomb,
    ];

    /// Pieces of this rank in a full army.
    #[must_use]
    pub const fn initial_count(self) -> u8 {
        match self {
            Rank::Flag | Rank::Spy | Rank::General | Rank::Marshal => 1,
            Rank::Colonel => 2,
            Rank::Major => 3,
            Rank::Sergeant | Rank::Lieutenant | Rank::Captain => 4,
            Rank::Miner => 5,
            Rank::Bomb => 6,
            Rank::Scout => 8,
        }
    }

    /// Fighting strength of mobile ranks (Spy 1 … Marshal 10).
    #[must_use]
    pub const fn strength(self) -> Option<u8> {
        match self {
            Rank::Spy => Some(1),
            Rank::Scout => Some(2),
            Rank::Miner => Some(3),
            Rank::Sergeant => Some(4),
            Rank::Lieutenant => Some(5),
            Rank::Captain => Some(6),
            Rank::Major => Some(7),
            Rank::Colonel => Some(8),
            Rank::General => Some(9),
            Rank::Marshal => Some(10),
            Rank::Flag | Rank::Bomb => None,
        }
    }

    /// Bombs and flags never move.
    #[must_use]
    pub const fn can_move(self) -> bool {
        !matches!(self, Rank::Flag | Rank::Bomb)
    }
}

/// How a single combat ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatResult {
    AttackerWins,
    DefenderWins,
    BothDestroyed,
}

/// Resolve an attack. Deterministic, purely from the two ranks.
///
/// - Anything captures the flag
/// - Only a miner survives attacking a bomb
/// - A spy beats the marshal, but only when the spy attacks
/// - Otherwise the higher strength wins and equal ranks trade
#[must_use]
pub fn resolve(attacker: Rank, defender: Rank) -> CombatResult {
    match (attacker, defender) {
        (_, Rank::Flag) => CombatResult::AttackerWins,
        (Rank::Miner, Rank::Bomb) => CombatResult::AttackerWins,
        (_, Rank::Bomb) => CombatResult::DefenderWins,
        (Rank::Spy, Rank::Marshal) => CombatResult::AttackerWins,
        _ if attacker == defender => CombatResult::BothDestroyed,
        _ => {
            let attack = attacker.strength().unwrap_or(0);
            let defence = defender.strength().unwrap_or(0);
            if attack > defence {
                CombatResult::AttackerWins
            } else {
                CombatResult::DefenderWins
            }
        }
    }
}

/// A Stratego piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategoPiece {
    pub rank: Rank,
    pub owner: Army,
    /// Set once the piece has fought; its rank is then public.
    #[serde(default)]
    pub revealed: bool,
}

impl StrategoPiece {
    /// A hidden piece.
    #[must_use]
    pub const fn new(rank: Rank, owner: Army) -> Self {
        Self { rank, owner, revealed: false }
    }

    /// Derived from rank.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.rank.can_move()
    }
}
