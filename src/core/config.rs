//! Configuration types.
//!
//! - `GameKind`: which rule engine a document belongs to
//! - `TimerConfig`: per-game turn and setup durations
//! - `PollConfig`: client polling cadence
//! - `SyncConfig`: acceptor behaviour, combining the above
//!
//! All configs are plain serde structs with `Default` values and `with_*`
//! builder methods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::status::GameStatus;

/// The supported games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Checkers,
    Chess,
    Stratego,
}

impl GameKind {
    /// Check if the game has a piece-placement phase before play.
    #[must_use]
    pub const fn has_setup(self) -> bool {
        matches!(self, GameKind::Stratego)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameKind::Checkers => "checkers",
            GameKind::Chess => "chess",
            GameKind::Stratego => "stratego",
        })
    }
}

/// Turn timer durations, in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    /// Seconds per Chess ply.
    pub chess_turn_secs: u64,

    /// Seconds per Checkers ply (a whole capture chain shares one deadline).
    pub checkers_turn_secs: u64,

    /// Seconds per Stratego ply.
    pub stratego_turn_secs: u64,

    /// Seconds both sides get to place their Stratego army.
    pub stratego_setup_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            chess_turn_secs: 60,
            checkers_turn_secs: 60,
            stratego_turn_secs: 60,
            stratego_setup_secs: 300,
        }
    }
}

impl TimerConfig {
    /// Set the Chess turn duration.
    #[must_use]
    pub fn with_chess_turn(mut self, secs: u64) -> Self {
        self.chess_turn_secs = secs;
        self
    }

    /// Set the Checkers turn duration.
    #[must_use]
    pub fn with_checkers_turn(mut self, secs: u64) -> Self {
        self.checkers_turn_secs = secs;
        self
    }

    /// Set the Stratego turn duration.
    #[must_use]
    pub fn with_stratego_turn(mut self, secs: u64) -> Self {
        self.stratego_turn_secs = secs;
        self
    }

    /// Set the Stratego setup window.
    #[must_use]
    pub fn with_stratego_setup(mut self, secs: u64) -> Self {
        self.stratego_setup_secs = secs;
        self
    }

    /// Time allowed in the given game and status.
    ///
    /// `None` when no clock runs (`waiting`, `finished`, or a setup phase
    /// the game does not have).
    #[must_use]
    pub fn duration(&self, kind: GameKind, status: GameStatus) -> Option<Duration> {
        let secs = match (kind, status) {
            (GameKind::Chess, GameStatus::Active) => self.chess_turn_secs,
            (GameKind::Checkers, GameStatus::Active) => self.checkers_turn_secs,
            (GameKind::Stratego, GameStatus::Active) => self.stratego_turn_secs,
            (GameKind::Stratego, GameStatus::Setup) => self.stratego_setup_secs,
            _ => return None,
        };
        Some(Duration::from_secs(secs))
    }
}

/// Client polling cadence, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollConfig {
    /// Interval while the game is active.
    pub active_interval_ms: u64,

    /// Interval while waiting, in setup, or finished.
    pub idle_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            active_interval_ms: 1_000,
            idle_interval_ms: 3_000,
        }
    }
}

impl PollConfig {
    /// Set the active polling interval.
    #[must_use]
    pub fn with_active_interval(mut self, ms: u64) -> Self {
        self.active_interval_ms = ms;
        self
    }

    /// Set the idle polling interval.
    #[must_use]
    pub fn with_idle_interval(mut self, ms: u64) -> Self {
        self.idle_interval_ms = ms;
        self
    }

    /// Interval to use for a game in the given status.
    #[must_use]
    pub fn interval(&self, status: GameStatus) -> Duration {
        if status.is_active() {
            Duration::from_millis(self.active_interval_ms)
        } else {
            Duration::from_millis(self.idle_interval_ms)
        }
    }
}

/// Acceptor configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Read-validate-write attempts before a lost race is reported as stale.
    pub max_write_attempts: u32,

    /// Seed for forced-move and auto-placement randomness.
    pub seed: u64,

    /// Turn timer durations.
    pub timer: TimerConfig,

    /// Client polling cadence.
    pub poll: PollConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: 3,
            seed: 42,
            timer: TimerConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Set the maximum write attempts (at least one).
    #[must_use]
    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the timer configuration.
    #[must_use]
    pub fn with_timer(mut self, timer: TimerConfig) -> Self {
        self.timer = timer;
        self
    }

    /// Set the polling configuration.
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}
