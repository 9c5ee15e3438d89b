//! The acceptor: validates and commits transitions to the authoritative document.
//!
//! ## Transaction
//!
//! Every mutation is one read-validate-write cycle against the store:
//!
//! 1. `get` the current document (never trust a client's cached copy)
//! 2. re-derive the transition with the rule engine
//! 3. `put` with compare-and-swap on `lastUpdated`
//!
//! If the swap loses to a concurrent writer, the cycle starts over from a
//! fresh read. The second of two racing proposals is therefore re-validated
//! against the state the first one produced, and is refused by the rule
//! engine (usually `NotYourTurn`) rather than merged. Only when every
//! attempt loses does the caller see `StaleWrite`.
//!
//! ## Settlement
//!
//! The write that moves a game to `finished` triggers exactly one settlement
//! call. A failed settlement is logged and queued for `retry_settlements`; the
//! game stays finished.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use super::document::{GameDocument, GameId, MatchStart, SeatId};
use super::error::{SyncError, SyncResult};
use super::settlement::{SettlementError, SettlementHook, SettlementOutcome, SettlementRequest};
use super::store::{GameStore, PutOutcome, PutRequest, RejectReason};
use crate::core::{GameRng, Square, SyncConfig};
use crate::rules::{GameResult, Ply, RuleEngine, SideOf, TurnState};
use crate::timer::{resolve_expiry, Clock, Expiry, TurnTimer};

/// A committed write.
#[derive(Clone, Debug, PartialEq)]
pub struct Commit<S: TurnState> {
    /// The document as written.
    pub document: GameDocument<S>,
    /// Set when this write finished the game.
    pub outcome: Option<GameResult<S::Side>>,
    /// Result of the settlement call, when this write finished the game.
    pub settlement: Option<Result<(), SettlementError>>,
}

/// Result of submitting a move.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission<S: TurnState> {
    Committed(Commit<S>),
    /// The move needs a promotion choice; nothing was written.
    PromotionPending { from: Square, to: Square },
}

impl<S: TurnState> Submission<S> {
    /// The committed write, if any.
    #[must_use]
    pub fn commit(self) -> Option<Commit<S>> {
        match self {
            Submission::Committed(commit) => Some(commit),
            Submission::PromotionPending { .. } => None,
        }
    }
}

/// What one validation pass decided.
enum Step<S> {
    Write(S),
    Skip,
    Promotion { from: Square, to: Square },
}

/// What a transaction did.
enum Transaction<S: TurnState> {
    Committed(Commit<S>),
    Unchanged,
    Promotion { from: Square, to: Square },
}

/// Validates transitions for one game type and commits them to a store.
pub struct Acceptor<E: RuleEngine, St: GameStore, C: Clock> {
    engine: E,
    store: St,
    clock: C,
    config: SyncConfig,
    timer: TurnTimer,
    rng: Mutex<GameRng>,
    settlement: Arc<dyn SettlementHook>,
    unsettled: Mutex<Vec<SettlementRequest>>,
}

impl<E: RuleEngine, St: GameStore, C: Clock> Acceptor<E, St, C> {
    #[must_use]
    pub fn new(
        engine: E,
        store: St,
        clock: C,
        settlement: Arc<dyn SettlementHook>,
        config: SyncConfig,
    ) -> Self {
        Self {
            timer: TurnTimer::new(config.timer.clone()),
            rng: Mutex::new(GameRng::new(config.seed)),
            engine,
            store,
            clock,
            config,
            settlement,
            unsettled: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn store(&self) -> &St {
        &self.store
    }

    #[must_use]
    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    /// Create the document for a new match in `waiting`.
    pub fn create(&self, start: MatchStart) -> SyncResult<GameDocument<E::State>> {
        let now = self.clock.now();
        let document = GameDocument {
            game_id: start.game_id,
            kind: self.engine.kind(),
            seats: start.seats,
            stake: start.stake,
            last_updated: now,
            turn_started_at: None,
            state: self.engine.initial_state(),
        };
        let request = PutRequest {
            game_id: document.game_id.clone(),
            json: document.to_json()?,
            acting_seat: None,
            expected: None,
            last_updated: now,
            finished: false,
        };
        match self.store.put(request)? {
            PutOutcome::Ack => {
                tracing::info!(game = %document.game_id, kind = %document.kind, "game created");
                Ok(document)
            }
            PutOutcome::Rejected(_) => Err(SyncError::AlreadyExists(document.game_id)),
        }
    }

    /// Read the authoritative document.
    pub fn fetch(&self, game_id: &GameId) -> SyncResult<GameDocument<E::State>> {
        let record = self.store.get(game_id)?;
        Ok(GameDocument::from_json(&record.json)?)
    }

    /// Leave `waiting`: enter setup or start play.
    pub fn start(&self, game_id: &GameId) -> SyncResult<Commit<E::State>> {
        let tx = self.transact(game_id, None, |doc, _| {
            Ok(Step::Write(self.engine.begin(&doc.state)?))
        })?;
        match tx {
            Transaction::Committed(commit) => Ok(commit),
            Transaction::Unchanged | Transaction::Promotion { .. } => Err(SyncError::StaleWrite),
        }
    }

    /// Validate and commit a move (or setup action) proposed by `seat`.
    pub fn submit(
        &self,
        game_id: &GameId,
        seat: &SeatId,
        mv: &E::Move,
    ) -> SyncResult<Submission<E::State>> {
        let tx = self.transact(game_id, Some(seat), |doc, _| {
            let side: SideOf<E> = doc.seats.side_of(seat).ok_or(SyncError::UnknownSeat)?;
            match self.engine.apply_move(&doc.state, side, mv) {
                Ok(Ply::Complete { state, .. }) => Ok(Step::Write(state)),
                Ok(Ply::PromotionPending { from, to }) => Ok(Step::Promotion { from, to }),
                Err(err) => {
                    tracing::debug!(game = %game_id, %seat, %err, "move rejected");
                    Err(err.into())
                }
            }
        })?;
        match tx {
            Transaction::Committed(commit) => Ok(Submission::Committed(commit)),
            Transaction::Promotion { from, to } => Ok(Submission::PromotionPending { from, to }),
            Transaction::Unchanged => Err(SyncError::StaleWrite),
        }
    }

    /// Resolve an expired turn deadline.
    ///
    /// `observed_turn_start` is the `turnStartedAt` the caller's countdown ran
    /// from. If the document has moved on, or the deadline has not passed,
    /// nothing is written and `None` is returned, so any number of clients
    /// may trigger the same expiry.
    pub fn expire(
        &self,
        game_id: &GameId,
        observed_turn_start: Option<DateTime<Utc>>,
    ) -> SyncResult<Option<Commit<E::State>>> {
        let tx = self.transact(game_id, None, |doc, now| {
            let Some(started) = doc.turn_started_at else {
                return Ok(Step::Skip);
            };
            if doc.turn_started_at != observed_turn_start
                || !self.timer.is_expired(doc.kind, doc.state.status(), started, now)
            {
                return Ok(Step::Skip);
            }
            let mut rng = self.rng.lock().fork().for_game(game_id.as_str());
            match resolve_expiry(&self.engine, &doc.state, &mut rng)? {
                Expiry::Idle => Ok(Step::Skip),
                expiry => Ok(expiry.into_state().map_or(Step::Skip, Step::Write)),
            }
        })?;
        match tx {
            Transaction::Committed(commit) => {
                tracing::info!(game = %game_id, "turn expiry resolved");
                Ok(Some(commit))
            }
            Transaction::Unchanged | Transaction::Promotion { .. } => Ok(None),
        }
    }

    /// Settlements that failed and are waiting for a retry.
    #[must_use]
    pub fn pending_settlements(&self) -> Vec<SettlementRequest> {
        self.unsettled.lock().clone()
    }

    /// Retry failed settlements. Returns how many were released.
    pub fn retry_settlements(&self) -> usize {
        let pending = std::mem::take(&mut *self.unsettled.lock());
        let mut released = 0;
        for request in pending {
            match self.settlement.release(&request) {
                Ok(()) => {
                    tracing::info!(game = %request.game_id, "settlement released on retry");
                    released += 1;
                }
                Err(err) => {
                    tracing::warn!(game = %request.game_id, %err, "settlement retry failed");
                    self.unsettled.lock().push(request);
                }
            }
        }
        released
    }

    /// One read-validate-write transaction, retried on lost races.
    fn transact<F>(
        &self,
        game_id: &GameId,
        acting_seat: Option<&SeatId>,
        mut validate: F,
    ) -> SyncResult<Transaction<E::State>>
    where
        F: FnMut(&GameDocument<E::State>, DateTime<Utc>) -> SyncResult<Step<E::State>>,
    {
        for attempt in 1..=self.config.max_write_attempts {
            let record = self.store.get(game_id)?;
            let current: GameDocument<E::State> = GameDocument::from_json(&record.json)?;
            let now = self.clock.now();

            let state = match validate(&current, now)? {
                Step::Write(state) => state,
                Step::Skip => return Ok(Transaction::Unchanged),
                Step::Promotion { from, to } => return Ok(Transaction::Promotion { from, to }),
            };

            let next = self.next_document(&current, state, now);
            let finished = next.state.status().is_finished();
            let request = PutRequest {
                game_id: game_id.clone(),
                json: next.to_json()?,
                acting_seat: acting_seat.cloned(),
                expected: Some(record.last_updated),
                last_updated: next.last_updated,
                finished,
            };

            match self.store.put(request)? {
                PutOutcome::Ack => {
                    tracing::debug!(
                        game = %game_id,
                        attempt,
                        status = %next.state.status(),
                        to_move = %next.state.current_player(),
                        "write accepted"
                    );
                    let outcome = if finished && !current.state.status().is_finished() {
                        next.state.winner()
                    } else {
                        None
                    };
                    let settlement = outcome.map(|result| self.settle(&next, result));
                    return Ok(Transaction::Committed(Commit {
                        document: next,
                        outcome,
                        settlement,
                    }));
                }
                PutOutcome::Rejected(RejectReason::StaleVersion) => {
                    tracing::warn!(game = %game_id, attempt, "lost write race, revalidating");
                }
                PutOutcome::Rejected(RejectReason::Archived) => {
                    return Err(crate::core::RuleError::GameFinished.into());
                }
                PutOutcome::Rejected(RejectReason::AlreadyExists) => {
                    return Err(SyncError::AlreadyExists(game_id.clone()));
                }
            }
        }
        tracing::warn!(game = %game_id, "write attempts exhausted");
        Err(SyncError::StaleWrite)
    }

    /// Stamp a new version and restart the clock when the turn or phase changed.
    fn next_document(
        &self,
        current: &GameDocument<E::State>,
        state: E::State,
        now: DateTime<Utc>,
    ) -> GameDocument<E::State> {
        let last_updated = if now > current.last_updated {
            now
        } else {
            current.last_updated + Duration::milliseconds(1)
        };
        let turn_changed = state.current_player() != current.state.current_player()
            || state.status() != current.state.status();
        let turn_started_at = if state.status().is_finished() {
            None
        } else if turn_changed || current.turn_started_at.is_none() {
            Some(last_updated)
        } else {
            current.turn_started_at
        };
        GameDocument {
            last_updated,
            turn_started_at,
            state,
            ..current.clone()
        }
    }

    fn settle(
        &self,
        document: &GameDocument<E::State>,
        result: GameResult<SideOf<E>>,
    ) -> Result<(), SettlementError> {
        let outcome = match result {
            GameResult::Winner(side) => SettlementOutcome::Winner(document.seats.seat(side).clone()),
            GameResult::Draw => SettlementOutcome::Draw,
        };
        let request = SettlementRequest {
            game_id: document.game_id.clone(),
            outcome,
            stake: document.stake,
        };
        match self.settlement.release(&request) {
            Ok(()) => {
                tracing::info!(game = %request.game_id, outcome = ?request.outcome, "settlement released");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(game = %request.game_id, %err, "settlement failed, queued for retry");
                self.unsettled.lock().push(request);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameStatus;
    use crate::games::chess::{Chess, ChessMove, ChessState, Color, PieceKind};
    use crate::sync::document::Seats;
    use crate::sync::settlement::RecordingSettlement;
    use crate::sync::store::MemoryStore;
    use crate::timer::ManualClock;
    use chrono::TimeZone;

    type ChessAcceptor = Acceptor<Chess, Arc<MemoryStore>, Arc<ManualClock>>;

    struct Fixture {
        acceptor: ChessAcceptor,
        clock: Arc<ManualClock>,
        store: Arc<MemoryStore>,
        hook: Arc<RecordingSettlement>,
        id: GameId,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()));
        let store = Arc::new(MemoryStore::new());
        let hook = Arc::new(RecordingSettlement::new());
        let acceptor = Acceptor::new(
            Chess,
            Arc::clone(&store),
            Arc::clone(&clock),
            hook.clone(),
            SyncConfig::default(),
        );
        let id = GameId::new("g-1");
        let seats = Seats::new(SeatId::new("alice"), SeatId::new("bob"));
        acceptor
            .create(MatchStart::new(id.clone(), seats).with_stake(50))
            .unwrap();
        Fixture { acceptor, clock, store, hook, id }
    }

    fn mv(text: &str) -> ChessMove {
        ChessMove::parse(text).unwrap()
    }

    #[test]
    fn test_create_twice_rejected() {
        let f = fixture();
        let seats = Seats::new(SeatId::new("x"), SeatId::new("y"));
        let err = f.acceptor.create(MatchStart::new(f.id.clone(), seats)).unwrap_err();
        assert!(matches!(err, SyncError::AlreadyExists(_)));
    }

    #[test]
    fn test_start_sets_turn_clock() {
        let f = fixture();
        let commit = f.acceptor.start(&f.id).unwrap();
        assert_eq!(commit.document.state.status, GameStatus::Active);
        assert!(commit.document.turn_started_at.is_some());
        assert_eq!(commit.document.turn_started_at, Some(commit.document.last_updated));
    }

    #[test]
    fn test_version_strictly_increases_without_clock_movement() {
        let f = fixture();
        let created = f.acceptor.fetch(&f.id).unwrap();
        let started = f.acceptor.start(&f.id).unwrap().document;
        assert!(started.last_updated > created.last_updated);

        let next = f
            .acceptor
            .submit(&f.id, &SeatId::new("alice"), &mv("e2e4"))
            .unwrap()
            .commit()
            .unwrap()
            .document;
        assert!(next.last_updated > started.last_updated);
    }

    #[test]
    fn test_submit_validates_seat_and_turn() {
        let f = fixture();
        f.acceptor.start(&f.id).unwrap();

        let err = f.acceptor.submit(&f.id, &SeatId::new("mallory"), &mv("e2e4")).unwrap_err();
        assert!(matches!(err, SyncError::UnknownSeat));

        let err = f.acceptor.submit(&f.id, &SeatId::new("bob"), &mv("e7e5")).unwrap_err();
        assert_eq!(err.rule(), Some(&crate::core::RuleError::NotYourTurn));

        let doc = f.acceptor.fetch(&f.id).unwrap();
        assert_eq!(doc.state.current_player, Color::White);
        assert_eq!(f.store.last_writer(&f.id), None);
    }

    #[test]
    fn test_expire_requires_deadline() {
        let f = fixture();
        let started = f.acceptor.start(&f.id).unwrap().document;
        f.clock.advance(Duration::seconds(30));
        assert_eq!(f.acceptor.expire(&f.id, started.turn_started_at).unwrap(), None);

        f.clock.advance(Duration::seconds(31));
        let commit = f.acceptor.expire(&f.id, started.turn_started_at).unwrap().unwrap();
        assert_eq!(commit.document.state.current_player, Color::Black);
        assert_eq!(commit.document.state.history.len(), 1);
    }

    #[test]
    fn test_checkmate_settles_once() {
        let f = fixture();
        f.acceptor.start(&f.id).unwrap();
        let alice = SeatId::new("alice");
        let bob = SeatId::new("bob");
        f.acceptor.submit(&f.id, &alice, &mv("f2f3")).unwrap();
        f.acceptor.submit(&f.id, &bob, &mv("e7e5")).unwrap();
        f.acceptor.submit(&f.id, &alice, &mv("g2g4")).unwrap();
        let commit = f
            .acceptor
            .submit(&f.id, &bob, &mv("d8h4"))
            .unwrap()
            .commit()
            .unwrap();

        assert_eq!(commit.outcome, Some(GameResult::Winner(Color::Black)));
        assert_eq!(commit.settlement, Some(Ok(())));
        assert_eq!(commit.document.turn_started_at, None);
        let released = f.hook.released();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].outcome, SettlementOutcome::Winner(bob));
        assert_eq!(released[0].stake, Some(50));
        assert!(f.store.is_archived(&f.id));
    }

    #[test]
    fn test_promotion_pending_writes_nothing() {
        let f = fixture();
        let record = f.store.get(&f.id).unwrap();
        let mut doc: GameDocument<ChessState> = GameDocument::from_json(&record.json).unwrap();
        doc.state = ChessState::with_pieces(
            Color::White,
            &[
                ("g7", PieceKind::Pawn, Color::White),
                ("e1", PieceKind::King, Color::White),
                ("a8", PieceKind::King, Color::Black),
                ("h5", PieceKind::Pawn, Color::Black),
            ],
        );
        f.store
            .put(PutRequest {
                game_id: f.id.clone(),
                json: doc.to_json().unwrap(),
                acting_seat: None,
                expected: Some(record.last_updated),
                last_updated: record.last_updated + Duration::seconds(1),
                finished: false,
            })
            .unwrap();
        let before = f.store.get(&f.id).unwrap();

        let alice = SeatId::new("alice");
        let pending = f.acceptor.submit(&f.id, &alice, &mv("g7g8")).unwrap();
        assert_eq!(
            pending,
            Submission::PromotionPending {
                from: crate::core::Square::parse("g7").unwrap(),
                to: crate::core::Square::parse("g8").unwrap(),
            }
        );
        assert_eq!(f.store.get(&f.id).unwrap().last_updated, before.last_updated);

        let commit = f.acceptor.submit(&f.id, &alice, &mv("g7g8q")).unwrap().commit().unwrap();
        assert_eq!(commit.document.state.current_player, Color::Black);
        assert!(commit.document.last_updated > before.last_updated);
    }

    #[test]
    fn test_state_is_checked_against_store_not_caller() {
        let f = fixture();
        f.acceptor.start(&f.id).unwrap();
        let stale: ChessState = f.acceptor.fetch(&f.id).unwrap().state;
        f.acceptor.submit(&f.id, &SeatId::new("alice"), &mv("e2e4")).unwrap();

        // A client still holding `stale` believes white is to move.
        assert_eq!(stale.current_player, Color::White);
        let err = f.acceptor.submit(&f.id, &SeatId::new("alice"), &mv("d2d4")).unwrap_err();
        assert_eq!(err.rule(), Some(&crate::core::RuleError::NotYourTurn));
    }
}
