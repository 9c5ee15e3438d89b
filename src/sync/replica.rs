//! Client-side read replica.
//!
//! A `Replica` is what one seat's client holds: the last document it fetched,
//! an optional optimistic state for a move it has sent but not yet seen
//! confirmed, and the start time of its local turn countdown. It never
//! writes; mutations go through the acceptor.
//!
//! ## Polling
//!
//! - every `activeIntervalMs` while the game is active, `idleIntervalMs`
//!   otherwise
//! - the view is replaced only when `lastUpdated` differs from the last one
//!   observed
//! - any replacement discards the optimistic state, which is how a move that
//!   lost a race gets rolled back
//! - the countdown restarts on first observation and whenever
//!   `currentPlayer` changes

use chrono::{DateTime, Duration, Utc};

use super::document::{GameDocument, GameId, SeatId};
use super::error::{SyncError, SyncResult};
use super::store::GameStore;
use crate::core::{GameStatus, PollConfig, TimerConfig};
use crate::rules::TurnState;
use crate::timer::TurnTimer;

/// What a poll observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollEvent {
    /// Same `lastUpdated` as before; nothing replaced.
    Unchanged,
    /// A new document replaced the view.
    Updated {
        /// The first document this replica has seen.
        first: bool,
        /// The side to move (or the status) changed; the countdown restarted.
        turn_changed: bool,
        /// Optimistic local state was discarded.
        rolled_back: bool,
    },
}

/// One client's view of a game.
#[derive(Clone, Debug)]
pub struct Replica<S: TurnState> {
    game_id: GameId,
    seat: SeatId,
    poll: PollConfig,
    timer: TurnTimer,
    view: Option<GameDocument<S>>,
    optimistic: Option<S>,
    countdown_from: Option<DateTime<Utc>>,
}

impl<S: TurnState> Replica<S> {
    #[must_use]
    pub fn new(game_id: GameId, seat: SeatId) -> Self {
        Self {
            game_id,
            seat,
            poll: PollConfig::default(),
            timer: TurnTimer::default(),
            view: None,
            optimistic: None,
            countdown_from: None,
        }
    }

    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn with_timer(mut self, timer: TimerConfig) -> Self {
        self.timer = TurnTimer::new(timer);
        self
    }

    #[must_use]
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    #[must_use]
    pub fn seat(&self) -> &SeatId {
        &self.seat
    }

    /// The last authoritative document observed.
    #[must_use]
    pub fn document(&self) -> Option<&GameDocument<S>> {
        self.view.as_ref()
    }

    /// State to render: the optimistic state if one is pending, else the view.
    #[must_use]
    pub fn state(&self) -> Option<&S> {
        self.optimistic
            .as_ref()
            .or_else(|| self.view.as_ref().map(|doc| &doc.state))
    }

    /// Check if an optimistic state is pending confirmation.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.optimistic.is_some()
    }

    /// Check if the authoritative view says it is this seat's turn.
    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        self.view.as_ref().is_some_and(|doc| {
            doc.state.status().is_active() && doc.seats.seat(doc.state.current_player()) == &self.seat
        })
    }

    /// Show a locally computed state until the next authoritative change.
    pub fn apply_optimistic(&mut self, state: S) {
        self.optimistic = Some(state);
    }

    /// Drop the optimistic state after the acceptor refused the move.
    pub fn reject(&mut self) {
        if self.optimistic.take().is_some() {
            tracing::debug!(game = %self.game_id, seat = %self.seat, "optimistic move rolled back");
        }
    }

    /// How long to wait before the next poll.
    #[must_use]
    pub fn next_poll_in(&self) -> std::time::Duration {
        let status = self
            .view
            .as_ref()
            .map_or(GameStatus::Waiting, |doc| doc.state.status());
        self.poll.interval(status)
    }

    /// Fetch the document and replace the view if it changed.
    ///
    /// A store failure leaves the current view untouched; the caller simply
    /// polls again on the next tick.
    pub fn poll<St: GameStore + ?Sized>(&mut self, store: &St) -> SyncResult<PollEvent> {
        let record = match store.get(&self.game_id) {
            Ok(record) => record,
            Err(err) => {
                let err = SyncError::from(err);
                tracing::warn!(game = %self.game_id, %err, "poll failed");
                return Err(err);
            }
        };
        if self
            .view
            .as_ref()
            .is_some_and(|doc| doc.last_updated == record.last_updated)
        {
            return Ok(PollEvent::Unchanged);
        }

        let next: GameDocument<S> = GameDocument::from_json(&record.json)?;
        Ok(self.observe(next))
    }

    /// Replace the view with a document known to be newer.
    pub fn observe(&mut self, next: GameDocument<S>) -> PollEvent {
        let first = self.view.is_none();
        let turn_changed = self.view.as_ref().map_or(true, |prev| {
            prev.state.current_player() != next.state.current_player()
                || prev.state.status() != next.state.status()
        });
        if turn_changed {
            self.countdown_from = next.turn_started_at;
        }
        let rolled_back = self.optimistic.take().is_some();
        tracing::debug!(
            game = %self.game_id,
            seat = %self.seat,
            first,
            turn_changed,
            rolled_back,
            "replica updated"
        );
        self.view = Some(next);
        PollEvent::Updated {
            first,
            turn_changed,
            rolled_back,
        }
    }

    /// Start of the local countdown, as last reset.
    #[must_use]
    pub fn countdown_from(&self) -> Option<DateTime<Utc>> {
        self.countdown_from
    }

    /// Time left on the current ply.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let doc = self.view.as_ref()?;
        self.timer
            .remaining(doc.kind, doc.state.status(), self.countdown_from?, now)
    }

    /// If the countdown has run out, the turn start to hand to
    /// `Acceptor::expire`.
    #[must_use]
    pub fn expired(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let doc = self.view.as_ref()?;
        let started = self.countdown_from?;
        self.timer
            .is_expired(doc.kind, doc.state.status(), started, now)
            .then_some(started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameKind, SyncConfig};
    use crate::games::checkers::{Checkers, CheckersMove, CheckersState};
    use crate::rules::RuleEngine;
    use crate::sync::document::Seats;
    use crate::sync::store::{MemoryStore, PutRequest};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn document(state: CheckersState, version: i64) -> GameDocument<CheckersState> {
        GameDocument {
            game_id: GameId::new("g"),
            kind: GameKind::Checkers,
            seats: Seats::new(SeatId::new("ann"), SeatId::new("ben")),
            stake: None,
            last_updated: at(version),
            turn_started_at: Some(at(version)),
            state,
        }
    }

    fn write(store: &MemoryStore, doc: &GameDocument<CheckersState>, expected: Option<i64>) {
        store
            .put(PutRequest {
                game_id: doc.game_id.clone(),
                json: doc.to_json().unwrap(),
                acting_seat: None,
                expected: expected.map(at),
                last_updated: doc.last_updated,
                finished: false,
            })
            .unwrap();
    }

    fn replica() -> Replica<CheckersState> {
        Replica::new(GameId::new("g"), SeatId::new("ann"))
    }

    #[test]
    fn test_first_poll_resets_countdown() {
        let store = MemoryStore::new();
        let active = Checkers.begin(&CheckersState::new()).unwrap();
        write(&store, &document(active, 0), None);

        let mut replica = replica();
        let event = replica.poll(&store).unwrap();
        assert_eq!(
            event,
            PollEvent::Updated { first: true, turn_changed: true, rolled_back: false }
        );
        assert_eq!(replica.countdown_from(), Some(at(0)));
        assert!(replica.is_my_turn());
        assert_eq!(replica.poll(&store).unwrap(), PollEvent::Unchanged);
    }

    #[test]
    fn test_poll_interval_follows_status() {
        let store = MemoryStore::new();
        let mut replica = replica();
        assert_eq!(replica.next_poll_in(), std::time::Duration::from_millis(3_000));

        let active = Checkers.begin(&CheckersState::new()).unwrap();
        write(&store, &document(active, 0), None);
        replica.poll(&store).unwrap();
        assert_eq!(replica.next_poll_in(), std::time::Duration::from_millis(1_000));
    }

    #[test]
    fn test_opponent_move_detected_and_optimistic_dropped() {
        let store = MemoryStore::new();
        let active = Checkers.begin(&CheckersState::new()).unwrap();
        write(&store, &document(active.clone(), 0), None);

        let mut replica = replica();
        replica.poll(&store).unwrap();

        let mv = CheckersMove::new(crate::core::Square::new(2, 1), crate::core::Square::new(3, 2));
        let local = Checkers
            .apply_move(&active, crate::games::checkers::Color::Black, &mv)
            .unwrap()
            .into_state()
            .unwrap();
        replica.apply_optimistic(local.clone());
        assert_eq!(replica.state(), Some(&local));
        assert!(replica.has_pending());

        write(&store, &document(local, 5), Some(0));
        let event = replica.poll(&store).unwrap();
        assert_eq!(
            event,
            PollEvent::Updated { first: false, turn_changed: true, rolled_back: true }
        );
        assert!(!replica.is_my_turn());
        assert_eq!(replica.countdown_from(), Some(at(5)));
    }

    #[test]
    fn test_failed_poll_keeps_view() {
        let store = MemoryStore::new();
        let active = Checkers.begin(&CheckersState::new()).unwrap();
        write(&store, &document(active, 0), None);

        let mut replica = replica();
        replica.poll(&store).unwrap();
        store.fail_next_reads(1);
        let err = replica.poll(&store).unwrap_err();
        assert!(err.is_transient());
        assert!(replica.document().is_some());
    }

    #[test]
    fn test_expiry_from_countdown() {
        let store = MemoryStore::new();
        let active = Checkers.begin(&CheckersState::new()).unwrap();
        write(&store, &document(active, 0), None);

        let mut replica = replica().with_timer(SyncConfig::default().timer.with_checkers_turn(10));
        replica.poll(&store).unwrap();
        assert_eq!(replica.remaining(at(4)), Some(Duration::seconds(6)));
        assert_eq!(replica.expired(at(9)), None);
        assert_eq!(replica.expired(at(10)), Some(at(0)));
    }

    #[test]
    fn test_reject_rolls_back() {
        let mut replica = replica();
        replica.apply_optimistic(CheckersState::new());
        replica.reject();
        assert!(!replica.has_pending());
        assert_eq!(replica.state(), None);
    }
}
