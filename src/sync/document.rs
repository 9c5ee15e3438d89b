//! The persisted game document.
//!
//! A `GameDocument` wraps one game's state with the metadata the protocol
//! needs: identity, seats, stake and the two timestamps.
//!
//! ## JSON shape
//!
//! ```text
//! {
//!   "gameId": "g-1",
//!   "kind": "chess",
//!   "seats": { "first": "alice", "second": "bob" },
//!   "stake": 100,
//!   "lastUpdated": "2024-06-01T10:00:00Z",
//!   "turnStartedAt": "2024-06-01T10:00:00Z",
//!   "state": { "board": [[...]], "currentPlayer": "white", ... }
//! }
//! ```
//!
//! Field names are stable: documents are read back by later deployments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{GameKind, Side};

/// Identifies one game document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player's stable identifier, supplied by the lobby.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two players. `first` plays the side that moves first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seats {
    pub first: SeatId,
    pub second: SeatId,
}

impl Seats {
    #[must_use]
    pub fn new(first: SeatId, second: SeatId) -> Self {
        Self { first, second }
    }

    /// Seat playing `side`.
    #[must_use]
    pub fn seat<S: Side>(&self, side: S) -> &SeatId {
        if side.seat_index() == 0 {
            &self.first
        } else {
            &self.second
        }
    }

    /// Side played by `seat`, if it belongs to this game.
    #[must_use]
    pub fn side_of<S: Side>(&self, seat: &SeatId) -> Option<S> {
        S::both().into_iter().find(|&side| self.seat(side) == seat)
    }
}

/// What the lobby hands over when a match starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStart {
    pub game_id: GameId,
    pub seats: Seats,
    /// Display only; the escrow holds the authoritative amount.
    pub stake: Option<u64>,
}

impl MatchStart {
    #[must_use]
    pub fn new(game_id: GameId, seats: Seats) -> Self {
        Self { game_id, seats, stake: None }
    }

    #[must_use]
    pub fn with_stake(mut self, stake: u64) -> Self {
        self.stake = Some(stake);
        self
    }
}

/// The authoritative, versioned game document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument<S> {
    pub game_id: GameId,
    pub kind: GameKind,
    pub seats: Seats,
    pub stake: Option<u64>,
    /// Version stamp. Strictly increases with every accepted write.
    pub last_updated: DateTime<Utc>,
    /// Start of the current ply's clock, if one is running.
    pub turn_started_at: Option<DateTime<Utc>>,
    pub state: S,
}

impl<S: Serialize> GameDocument<S> {
    /// Serialize for storage.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<S: serde::de::DeserializeOwned> GameDocument<S> {
    /// Parse a stored document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::{ChessState, Color};
    use chrono::TimeZone;

    fn seats() -> Seats {
        Seats::new(SeatId::new("alice"), SeatId::new("bob"))
    }

    #[test]
    fn test_seat_mapping() {
        let seats = seats();
        assert_eq!(seats.seat(Color::White).as_str(), "alice");
        assert_eq!(seats.seat(Color::Black).as_str(), "bob");
        assert_eq!(seats.side_of::<Color>(&SeatId::new("bob")), Some(Color::Black));
        assert_eq!(seats.side_of::<Color>(&SeatId::new("carol")), None);
    }

    #[test]
    fn test_document_json_shape() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let doc = GameDocument {
            game_id: GameId::new("g-1"),
            kind: GameKind::Chess,
            seats: seats(),
            stake: Some(100),
            last_updated: at,
            turn_started_at: None,
            state: ChessState::new(),
        };
        let json = doc.to_json().unwrap();
        for field in [
            r#""gameId":"g-1""#,
            r#""kind":"chess""#,
            r#""seats":{"first":"alice","second":"bob"}"#,
            r#""lastUpdated":"2024-06-01T10:00:00"#,
            r#""turnStartedAt":null"#,
            r#""currentPlayer":"white""#,
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }

        let back: GameDocument<ChessState> = GameDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_match_start_builder() {
        let start = MatchStart::new(GameId::new("g-2"), seats()).with_stake(25);
        assert_eq!(start.stake, Some(25));
        assert_eq!(start.game_id.to_string(), "g-2");
    }
}
