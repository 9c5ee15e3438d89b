//! Turn timer integration tests.
//!
//! Expiry is driven through the acceptor the way clients trigger it: with
//! the `turnStartedAt` their countdown ran from.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use stakeboard::core::{GameStatus, RuleError, SyncConfig};
use stakeboard::games::chess::{Chess, ChessMove, Color};
use stakeboard::games::stratego::{Army, Rank, Stratego, StrategoAction};
use stakeboard::rules::RuleEngine;
use stakeboard::sync::{
    Acceptor, GameId, MatchStart, MemoryStore, RecordingSettlement, SeatId, Seats,
};
use stakeboard::timer::ManualClock;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()))
}

fn seats() -> Seats {
    Seats::new(SeatId::new("alice"), SeatId::new("bob"))
}

fn acceptor<E: RuleEngine>(
    engine: E,
    clock: &Arc<ManualClock>,
) -> Acceptor<E, Arc<MemoryStore>, Arc<ManualClock>> {
    Acceptor::new(
        engine,
        Arc::new(MemoryStore::new()),
        Arc::clone(clock),
        Arc::new(RecordingSettlement::new()),
        SyncConfig::default(),
    )
}

// =============================================================================
// Active Play Expiry
// =============================================================================

/// Two clients triggering the same expiry produce exactly one forced move.
#[test]
fn test_expiry_is_idempotent() {
    let clock = clock();
    let acceptor = acceptor(Chess, &clock);
    let id = GameId::new("timed");
    acceptor.create(MatchStart::new(id.clone(), seats())).unwrap();
    let started = acceptor.start(&id).unwrap().document;

    clock.advance(Duration::seconds(61));
    let first = acceptor.expire(&id, started.turn_started_at).unwrap();
    let second = acceptor.expire(&id, started.turn_started_at).unwrap();

    let first = first.expect("first trigger forces a move");
    assert_eq!(second, None);
    assert_eq!(first.document.state.current_player, Color::Black);

    let stored = acceptor.fetch(&id).unwrap();
    assert_eq!(stored.state.history.len(), 1);
    assert_eq!(stored.last_updated, first.document.last_updated);
}

/// A move sent after the forced move for that ply is refused.
#[test]
fn test_late_move_rejected_after_forced_move() {
    let clock = clock();
    let acceptor = acceptor(Chess, &clock);
    let id = GameId::new("late");
    acceptor.create(MatchStart::new(id.clone(), seats())).unwrap();
    let started = acceptor.start(&id).unwrap().document;

    clock.advance(Duration::seconds(75));
    acceptor.expire(&id, started.turn_started_at).unwrap().unwrap();

    let err = acceptor
        .submit(&id, &SeatId::new("alice"), &ChessMove::parse("e2e4").unwrap())
        .unwrap_err();
    assert_eq!(err.rule(), Some(&RuleError::NotYourTurn));
}

/// The new ply gets a fresh deadline.
#[test]
fn test_forced_move_restarts_clock() {
    let clock = clock();
    let acceptor = acceptor(Chess, &clock);
    let id = GameId::new("restart");
    acceptor.create(MatchStart::new(id.clone(), seats())).unwrap();
    let started = acceptor.start(&id).unwrap().document;

    clock.advance(Duration::seconds(60));
    let forced = acceptor.expire(&id, started.turn_started_at).unwrap().unwrap();
    let restarted = forced.document.turn_started_at.unwrap();
    assert!(restarted > started.turn_started_at.unwrap());

    // Black's clock has only just started.
    clock.advance(Duration::seconds(10));
    assert_eq!(acceptor.expire(&id, Some(restarted)).unwrap(), None);
}

// =============================================================================
// Setup Expiry
// =============================================================================

/// Stratego setup completes automatically once the setup window closes.
#[test]
fn test_setup_window_expiry() {
    let clock = clock();
    let acceptor = acceptor(Stratego, &clock);
    let id = GameId::new("setup");
    acceptor.create(MatchStart::new(id.clone(), seats())).unwrap();
    let setup = acceptor.start(&id).unwrap().document;
    assert_eq!(setup.state.status, GameStatus::Setup);

    // Blue places one piece by hand; the setup clock keeps running.
    let placed = acceptor
        .submit(
            &id,
            &SeatId::new("bob"),
            &StrategoAction::Place { square: stakeboard::core::Square::new(0, 0), rank: Rank::Flag },
        )
        .unwrap()
        .commit()
        .unwrap();
    assert_eq!(placed.document.turn_started_at, setup.turn_started_at);

    clock.advance(Duration::seconds(120));
    assert_eq!(acceptor.expire(&id, setup.turn_started_at).unwrap(), None);

    clock.advance(Duration::seconds(181));
    let done = acceptor.expire(&id, setup.turn_started_at).unwrap().unwrap();
    let state = &done.document.state;
    assert_eq!(state.status, GameStatus::Active);
    assert_eq!(state.current_player, Army::Red);
    assert_eq!(state.board.pieces().count(), 80);
    assert_eq!(
        state.board.get(stakeboard::core::Square::new(0, 0)).map(|p| p.rank),
        Some(Rank::Flag)
    );
    assert_ne!(done.document.turn_started_at, setup.turn_started_at);
}
