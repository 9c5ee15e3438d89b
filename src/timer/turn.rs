//! Deadlines and expiry resolution.

use chrono::{DateTime, Duration, Utc};

use crate::core::{GameKind, GameRng, GameStatus, RuleError, RuleResult, TimerConfig};
use crate::rules::{GameResult, Ply, RuleEngine, SideOf, TurnState};

/// Computes per-ply deadlines from a `TimerConfig`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnTimer {
    config: TimerConfig,
}

impl TurnTimer {
    #[must_use]
    pub fn new(config: TimerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Deadline for a ply that started at `started_at`.
    ///
    /// `None` when no clock runs in this status.
    #[must_use]
    pub fn deadline(
        &self,
        kind: GameKind,
        status: GameStatus,
        started_at: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let window = self.config.duration(kind, status)?;
        let window = Duration::from_std(window).ok()?;
        started_at.checked_add_signed(window)
    }

    /// Check if the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired(
        &self,
        kind: GameKind,
        status: GameStatus,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        self.deadline(kind, status, started_at)
            .is_some_and(|deadline| now >= deadline)
    }

    /// Time left before the deadline, clamped at zero.
    #[must_use]
    pub fn remaining(
        &self,
        kind: GameKind,
        status: GameStatus,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        let deadline = self.deadline(kind, status, started_at)?;
        Some((deadline - now).max(Duration::zero()))
    }
}

/// What resolving an expired deadline did.
#[derive(Clone, Debug, PartialEq)]
pub enum Expiry<S: TurnState, M> {
    /// No clock was running; nothing changed.
    Idle,
    /// Random moves were played for the side that ran out of time.
    Forced {
        state: S,
        moves: Vec<M>,
        outcome: Option<GameResult<S::Side>>,
    },
    /// The side to move had no legal move; termination was evaluated.
    Terminated {
        state: S,
        outcome: GameResult<S::Side>,
    },
    /// Tardy sides had their setup completed automatically.
    SetupCompleted { state: S, sides: Vec<S::Side> },
}

impl<S: TurnState, M> Expiry<S, M> {
    /// The resulting state, if anything changed.
    #[must_use]
    pub fn into_state(self) -> Option<S> {
        match self {
            Expiry::Idle => None,
            Expiry::Forced { state, .. }
            | Expiry::Terminated { state, .. }
            | Expiry::SetupCompleted { state, .. } => Some(state),
        }
    }
}

/// Resolve an expired deadline.
///
/// While `active`, plays uniformly random legal moves for the side to move
/// until the turn passes or the game ends, so a Checkers capture chain is
/// finished in one resolution. Pawn promotions are played as Queen. If the
/// side to move has no legal move the position is settled instead, which
/// tells checkmate apart from stalemate.
///
/// While in `setup`, completes every side still placing pieces.
///
/// Callers are responsible for checking that the deadline has actually
/// passed; this function only looks at the state.
pub fn resolve_expiry<E: RuleEngine>(
    engine: &E,
    state: &E::State,
    rng: &mut GameRng,
) -> RuleResult<Expiry<E::State, E::Move>> {
    match state.status() {
        GameStatus::Active => force_turn(engine, state, rng),
        GameStatus::Setup => complete_pending_setup(engine, state, rng),
        GameStatus::Waiting | GameStatus::Finished => Ok(Expiry::Idle),
    }
}

fn force_turn<E: RuleEngine>(
    engine: &E,
    state: &E::State,
    rng: &mut GameRng,
) -> RuleResult<Expiry<E::State, E::Move>> {
    let side = state.current_player();
    let mut next = state.clone();
    let mut moves = Vec::new();

    loop {
        let Some(mv) = engine.forced_move(&next, rng) else {
            if !moves.is_empty() {
                // A chain ran dry without passing the turn; the engine settles it.
                break;
            }
            let mut settled = next;
            return Ok(match engine.settle(&mut settled) {
                Some(outcome) => {
                    tracing::info!(kind = %engine.kind(), %side, ?outcome, "no legal move at expiry");
                    Expiry::Terminated { state: settled, outcome }
                }
                None => Expiry::Idle,
            });
        };

        let (after, outcome) = match engine.apply_move(&next, side, &mv)? {
            Ply::Complete { state, outcome } => (state, outcome),
            Ply::PromotionPending { .. } => return Err(RuleError::InvalidPromotion),
        };
        next = after;
        moves.push(mv);

        if outcome.is_some() || next.current_player() != side || !next.status().is_active() {
            break;
        }
    }

    tracing::info!(
        kind = %engine.kind(),
        %side,
        moves = moves.len(),
        "forced move on turn expiry"
    );
    let outcome = next.winner();
    Ok(Expiry::Forced { state: next, moves, outcome })
}

fn complete_pending_setup<E: RuleEngine>(
    engine: &E,
    state: &E::State,
    rng: &mut GameRng,
) -> RuleResult<Expiry<E::State, E::Move>> {
    let sides: Vec<SideOf<E>> = engine.setup_pending(state);
    if sides.is_empty() {
        return Ok(Expiry::Idle);
    }
    let mut next = state.clone();
    for &side in &sides {
        next = engine.complete_setup(&next, side, rng)?;
    }
    tracing::info!(kind = %engine.kind(), pending = sides.len(), "setup completed on expiry");
    Ok(Expiry::SetupCompleted { state: next, sides })
}
