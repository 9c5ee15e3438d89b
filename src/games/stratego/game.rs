//! Stratego rule engine: setup phase, movement, combat and termination.

use super::rank::{resolve, Army, CombatResult, Rank, StrategoPiece};
use super::state::{
    in_setup_zone, is_lake, Combat, PerArmy, StrategoAction, StrategoLastMove, StrategoState, SIZE,
};
use crate::core::{GameKind, GameRng, GameStatus, RuleError, RuleResult, Side, Square, SquareSet};
use crate::rules::{ensure_turn, GameResult, Ply, RuleEngine, TurnState};

const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Setup actions never end the game.
fn complete(state: StrategoState) -> RuleResult<Ply<StrategoState>> {
    Ok(Ply::Complete { state, outcome: None })
}

/// Stratego rule engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stratego;

impl Stratego {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Destinations for the piece on `from`, ignoring whose turn it is.
    ///
    /// Scouts slide any distance through empty squares and may finish on the
    /// first enemy they meet. Everything else steps one square. Lakes block.
    fn destinations(state: &StrategoState, from: Square, piece: &StrategoPiece) -> SquareSet {
        let mut out = SquareSet::new();
        if !piece.can_move() {
            return out;
        }
        let reach = if piece.rank == Rank::Scout { SIZE } else { 1 };
        for (dr, dc) in ORTHOGONAL {
            let mut current = from;
            for _ in 0..reach {
                let Some(next) = current.offset(dr, dc, SIZE, SIZE) else { break };
                if is_lake(next) {
                    break;
                }
                match state.board.get(next) {
                    None => {
                        out.insert(next);
                        current = next;
                    }
                    Some(other) => {
                        if other.owner != piece.owner {
                            out.insert(next);
                        }
                        break;
                    }
                }
            }
        }
        out
    }

    /// Check if an army has at least one piece that can legally move.
    fn can_maneuver(state: &StrategoState, army: Army) -> bool {
        state
            .board
            .pieces()
            .filter(|(_, p)| p.owner == army)
            .any(|(square, piece)| !Self::destinations(state, square, piece).is_empty())
    }

    /// Reject setup actions outside `setup` or from an army already ready.
    fn ensure_setup(state: &StrategoState, army: Army) -> RuleResult<()> {
        match state.status {
            GameStatus::Setup => {}
            GameStatus::Finished => return Err(RuleError::GameFinished),
            _ => return Err(RuleError::NotInSetup),
        }
        if *state.ready.get(army) {
            return Err(RuleError::AlreadyReady);
        }
        Ok(())
    }

    /// Flip to `active` once both armies are ready. Red moves first.
    fn start_if_ready(state: &mut StrategoState) {
        if state.ready.red && state.ready.blue {
            state.status = GameStatus::Active;
            state.setup_phase = false;
            state.current_player = Army::FIRST;
            tracing::debug!("stratego setup complete, play begins");
        }
    }

    fn place(state: &StrategoState, army: Army, square: Square, rank: Rank) -> RuleResult<StrategoState> {
        Self::ensure_setup(state, army)?;
        if !in_setup_zone(army, square) || is_lake(square) || !state.board.is_empty_at(square) {
            return Err(RuleError::InvalidPlacement(square));
        }
        let mut next = state.clone();
        if !next.pools.get_mut(army).take(rank) {
            return Err(RuleError::PoolExhausted);
        }
        next.board.set(square, StrategoPiece::new(rank, army));
        Ok(next)
    }

    fn remove(state: &StrategoState, army: Army, square: Square) -> RuleResult<StrategoState> {
        Self::ensure_setup(state, army)?;
        match state.board.get(square) {
            Some(piece) if piece.owner == army => {}
            _ => return Err(RuleError::NoPiece(square)),
        }
        let mut next = state.clone();
        if let Some(piece) = next.board.take(square) {
            next.pools.get_mut(army).put_back(piece.rank);
        }
        Ok(next)
    }

    fn declare_ready(state: &StrategoState, army: Army) -> RuleResult<StrategoState> {
        Self::ensure_setup(state, army)?;
        if !state.pools.get(army).is_empty() {
            return Err(RuleError::SetupIncomplete);
        }
        let mut next = state.clone();
        *next.ready.get_mut(army) = true;
        Self::start_if_ready(&mut next);
        Ok(next)
    }

    fn play(
        &self,
        state: &StrategoState,
        army: Army,
        from: Square,
        to: Square,
    ) -> RuleResult<Ply<StrategoState>> {
        ensure_turn(state, army)?;
        if !state.board.contains(from) || !state.board.contains(to) {
            return Err(RuleError::IllegalMove { from, to });
        }
        let attacker = match state.board.get(from) {
            Some(piece) if piece.owner == army && piece.can_move() => *piece,
            _ => return Err(RuleError::NoPiece(from)),
        };
        if !Self::destinations(state, from, &attacker).contains(to) {
            return Err(RuleError::IllegalMove { from, to });
        }

        let mut next = state.clone();
        let mut combat = None;
        match next.board.take(to) {
            None => {
                next.board.relocate(from, to);
            }
            Some(defender) => {
                let result = resolve(attacker.rank, defender.rank);
                next.board.take(from);
                match result {
                    CombatResult::AttackerWins => {
                        next.board.set(to, StrategoPiece { revealed: true, ..attacker });
                    }
                    CombatResult::DefenderWins => {
                        next.board.set(to, StrategoPiece { revealed: true, ..defender });
                    }
                    CombatResult::BothDestroyed => {}
                }
                tracing::debug!(
                    attacker = ?attacker.rank,
                    defender = ?defender.rank,
                    ?result,
                    "stratego combat"
                );
                combat = Some(Combat {
                    attacker: attacker.rank,
                    defender: defender.rank,
                    result,
                });
            }
        }

        next.last_move = Some(StrategoLastMove { by: army, from, to, combat });

        // Capturing the flag ends the game before anything else is evaluated.
        if combat.is_some_and(|c| c.defender == Rank::Flag) {
            let outcome = GameResult::Winner(army);
            next.conclude(outcome);
            return Ok(Ply::Complete { state: next, outcome: Some(outcome) });
        }

        next.current_player = army.opponent();
        let outcome = self.settle(&mut next);
        Ok(Ply::Complete { state: next, outcome })
    }
}

impl RuleEngine for Stratego {
    type State = StrategoState;
    type Move = StrategoAction;

    fn kind(&self) -> GameKind {
        GameKind::Stratego
    }

    fn initial_state(&self) -> StrategoState {
        StrategoState::new()
    }

    fn begin(&self, state: &StrategoState) -> RuleResult<StrategoState> {
        match state.status {
            GameStatus::Waiting => {
                let mut next = StrategoState::new();
                next.status = GameStatus::Setup;
                next.setup_phase = true;
                next.ready = PerArmy::default();
                Ok(next)
            }
            GameStatus::Finished => Err(RuleError::GameFinished),
            other => Err(RuleError::NotActive(other)),
        }
    }

    fn legal_moves(&self, state: &StrategoState, from: Square) -> SquareSet {
        if !state.status.is_active() {
            return SquareSet::new();
        }
        match state.board.get(from) {
            Some(piece) if piece.owner == state.current_player => {
                Self::destinations(state, from, piece)
            }
            _ => SquareSet::new(),
        }
    }

    fn apply_move(
        &self,
        state: &StrategoState,
        side: Army,
        mv: &StrategoAction,
    ) -> RuleResult<Ply<StrategoState>> {
        match *mv {
            StrategoAction::Move { from, to } => self.play(state, side, from, to),
            StrategoAction::Place { square, rank } => complete(Self::place(state, side, square, rank)?),
            StrategoAction::Remove { square } => complete(Self::remove(state, side, square)?),
            StrategoAction::Ready => complete(Self::declare_ready(state, side)?),
        }
    }

    fn check_termination(&self, state: &StrategoState) -> Option<GameResult<Army>> {
        if !state.status.is_active() {
            return None;
        }
        for army in Army::both() {
            if !state.has_flag(army) {
                return Some(GameResult::loss_for(army));
            }
        }
        match (Self::can_maneuver(state, Army::Red), Self::can_maneuver(state, Army::Blue)) {
            (true, true) => None,
            (false, false) => Some(GameResult::Draw),
            (false, true) => Some(GameResult::loss_for(Army::Red)),
            (true, false) => Some(GameResult::loss_for(Army::Blue)),
        }
    }

    fn all_moves(&self, state: &StrategoState) -> Vec<StrategoAction> {
        let army = state.current_player;
        state
            .board
            .pieces()
            .filter(|(_, piece)| piece.owner == army)
            .flat_map(|(from, _)| {
                self.legal_moves(state, from)
                    .iter()
                    .map(move |to| StrategoAction::Move { from, to })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn setup_pending(&self, state: &StrategoState) -> Vec<Army> {
        if state.status != GameStatus::Setup {
            return Vec::new();
        }
        Army::both()
            .into_iter()
            .filter(|&army| !*state.ready.get(army))
            .collect()
    }

    /// Place every remaining pool piece on a random free square of the army's
    /// zone, then mark it ready.
    fn complete_setup(
        &self,
        state: &StrategoState,
        side: Army,
        rng: &mut GameRng,
    ) -> RuleResult<StrategoState> {
        Self::ensure_setup(state, side)?;
        let mut next = state.clone();
        let units = next.pools.get(side).units();
        let mut free: Vec<Square> = next
            .board
            .squares()
            .filter(|&s| in_setup_zone(side, s) && !is_lake(s) && next.board.is_empty_at(s))
            .collect();
        if free.len() < units.len() {
            return Err(RuleError::SetupIncomplete);
        }
        rng.shuffle(&mut free);
        for (rank, square) in units.into_iter().zip(free) {
            next.board.set(square, StrategoPiece::new(rank, side));
        }
        next.pools.get_mut(side).clear();
        *next.ready.get_mut(side) = true;
        tracing::info!(army = %side, "stratego setup completed automatically");
        Self::start_if_ready(&mut next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: u8, col: u8) -> Square {
        Square::new(row, col)
    }

    fn setup_state() -> StrategoState {
        Stratego.begin(&StrategoState::new()).unwrap()
    }

    /// Both flags tucked away plus a spare mobile piece each, so a test's
    /// focal exchange does not end the game on its own.
    fn backdrop() -> Vec<(Square, Rank, Army)> {
        vec![
            (sq(9, 0), Rank::Flag, Army::Red),
            (sq(9, 9), Rank::Sergeant, Army::Red),
            (sq(0, 0), Rank::Flag, Army::Blue),
            (sq(0, 9), Rank::Sergeant, Army::Blue),
        ]
    }

    fn with(extra: &[(Square, Rank, Army)]) -> StrategoState {
        let mut pieces = backdrop();
        pieces.extend_from_slice(extra);
        StrategoState::with_pieces(Army::Red, &pieces)
    }

    fn play(state: &StrategoState, army: Army, from: Square, to: Square) -> Ply<StrategoState> {
        Stratego
            .apply_move(state, army, &StrategoAction::Move { from, to })
            .unwrap()
    }

    #[test]
    fn test_begin_enters_setup() {
        let state = setup_state();
        assert_eq!(state.status, GameStatus::Setup);
        assert!(state.setup_phase);
        assert_eq!(state.pools.red.total(), 40);
        assert_eq!(Stratego.setup_pending(&state), vec![Army::Red, Army::Blue]);
    }

    #[test]
    fn test_place_validates_zone() {
        let state = setup_state();
        let bad = Stratego.apply_move(
            &state,
            Army::Red,
            &StrategoAction::Place { square: sq(2, 0), rank: Rank::Flag },
        );
        assert_eq!(bad.unwrap_err(), RuleError::InvalidPlacement(sq(2, 0)));

        let ok = Stratego
            .apply_move(
                &state,
                Army::Blue,
                &StrategoAction::Place { square: sq(2, 0), rank: Rank::Flag },
            )
            .unwrap()
            .into_state()
            .unwrap();
        assert_eq!(ok.pools.blue.remaining(Rank::Flag), 0);

        let again = Stratego.apply_move(
            &ok,
            Army::Blue,
            &StrategoAction::Place { square: sq(2, 1), rank: Rank::Flag },
        );
        assert_eq!(again.unwrap_err(), RuleError::PoolExhausted);
    }

    #[test]
    fn test_remove_returns_to_pool() {
        let state = setup_state();
        let placed = Stratego
            .apply_move(&state, Army::Red, &StrategoAction::Place { square: sq(7, 7), rank: Rank::Spy })
            .unwrap()
            .into_state()
            .unwrap();
        let removed = Stratego
            .apply_move(&placed, Army::Red, &StrategoAction::Remove { square: sq(7, 7) })
            .unwrap()
            .into_state()
            .unwrap();
        assert!(removed.board.is_empty_at(sq(7, 7)));
        assert_eq!(removed.pools.red.remaining(Rank::Spy), 1);
    }

    #[test]
    fn test_ready_requires_empty_pool() {
        let state = setup_state();
        let err = Stratego.apply_move(&state, Army::Red, &StrategoAction::Ready).unwrap_err();
        assert_eq!(err, RuleError::SetupIncomplete);
    }

    #[test]
    fn test_setup_never_terminates() {
        // A board with no flags at all is still mid-setup, not a loss.
        let mut state = setup_state();
        let placed = Stratego
            .apply_move(&state, Army::Red, &StrategoAction::Place { square: sq(6, 0), rank: Rank::Scout })
            .unwrap();
        assert!(matches!(placed, Ply::Complete { outcome: None, .. }));
        assert_eq!(Stratego.check_termination(&state), None);
        assert_eq!(Stratego.settle(&mut state), None);
        assert_eq!(state.status, GameStatus::Setup);
    }

    #[test]
    fn test_auto_setup_starts_game() {
        let mut rng = GameRng::new(7);
        let state = setup_state();
        let red_done = Stratego.complete_setup(&state, Army::Red, &mut rng).unwrap();
        assert!(red_done.ready.red);
        assert_eq!(red_done.status, GameStatus::Setup);
        assert_eq!(Stratego.setup_pending(&red_done), vec![Army::Blue]);

        let both = Stratego.complete_setup(&red_done, Army::Blue, &mut rng).unwrap();
        assert_eq!(both.status, GameStatus::Active);
        assert!(!both.setup_phase);
        assert_eq!(both.current_player, Army::Red);
        assert_eq!(both.board.pieces().count(), 80);
        assert!(both
            .board
            .pieces()
            .all(|(square, piece)| in_setup_zone(piece.owner, square)));
        assert!(Stratego.setup_pending(&both).is_empty());
    }

    #[test]
    fn test_auto_setup_keeps_manual_placements() {
        let mut rng = GameRng::new(1);
        let state = Stratego
            .apply_move(&setup_state(), Army::Red, &StrategoAction::Place { square: sq(9, 4), rank: Rank::Flag })
            .unwrap()
            .into_state()
            .unwrap();
        let done = Stratego.complete_setup(&state, Army::Red, &mut rng).unwrap();
        assert_eq!(done.board.get(sq(9, 4)).map(|p| p.rank), Some(Rank::Flag));
        assert_eq!(done.board.pieces().filter(|(_, p)| p.rank == Rank::Flag).count(), 1);
    }

    #[test]
    fn test_scout_slides_and_stops() {
        let state = with(&[
            (sq(8, 4), Rank::Scout, Army::Red),
            (sq(3, 4), Rank::Captain, Army::Blue),
            (sq(8, 1), Rank::Bomb, Army::Red),
        ]);
        let moves = Stratego.legal_moves(&state, sq(8, 4));
        assert!(moves.contains(sq(4, 4)));
        assert!(moves.contains(sq(3, 4)));
        assert!(!moves.contains(sq(2, 4)));
        // Own bomb blocks to the left.
        assert!(moves.contains(sq(8, 2)));
        assert!(!moves.contains(sq(8, 1)));
    }

    #[test]
    fn test_lakes_block() {
        let state = with(&[(sq(6, 2), Rank::Scout, Army::Red)]);
        let moves = Stratego.legal_moves(&state, sq(6, 2));
        assert!(!moves.contains(sq(5, 2)));
        assert!(!moves.contains(sq(3, 2)));
    }

    #[test]
    fn test_bombs_and_flags_immobile() {
        let state = with(&[(sq(8, 4), Rank::Bomb, Army::Red)]);
        assert!(Stratego.legal_moves(&state, sq(8, 4)).is_empty());
        assert!(Stratego.legal_moves(&state, sq(9, 0)).is_empty());
    }

    #[test]
    fn test_spy_attacking_marshal_wins() {
        let state = with(&[
            (sq(5, 4), Rank::Spy, Army::Red),
            (sq(4, 4), Rank::Marshal, Army::Blue),
        ]);
        let next = play(&state, Army::Red, sq(5, 4), sq(4, 4)).into_state().unwrap();
        let survivor = next.board.get(sq(4, 4)).unwrap();
        assert_eq!(survivor.rank, Rank::Spy);
        assert!(survivor.revealed);
        assert!(next.board.is_empty_at(sq(5, 4)));
        assert_eq!(next.last_move.unwrap().combat.unwrap().result, CombatResult::AttackerWins);
    }

    #[test]
    fn test_marshal_attacking_spy_wins() {
        let state = StrategoState {
            current_player: Army::Blue,
            ..with(&[
                (sq(5, 4), Rank::Spy, Army::Red),
                (sq(4, 4), Rank::Marshal, Army::Blue),
            ])
        };
        let next = play(&state, Army::Blue, sq(4, 4), sq(5, 4)).into_state().unwrap();
        assert_eq!(next.board.get(sq(5, 4)).unwrap().rank, Rank::Marshal);
        assert!(next.board.is_empty_at(sq(4, 4)));
    }

    #[test]
    fn test_failed_attack_reveals_defender() {
        let state = with(&[
            (sq(5, 4), Rank::Scout, Army::Red),
            (sq(4, 4), Rank::Major, Army::Blue),
        ]);
        let next = play(&state, Army::Red, sq(5, 4), sq(4, 4)).into_state().unwrap();
        let defender = next.board.get(sq(4, 4)).unwrap();
        assert_eq!(defender.rank, Rank::Major);
        assert!(defender.revealed);
        assert!(next.board.is_empty_at(sq(5, 4)));
    }

    #[test]
    fn test_equal_ranks_both_removed() {
        let state = with(&[
            (sq(5, 4), Rank::Colonel, Army::Red),
            (sq(4, 4), Rank::Colonel, Army::Blue),
        ]);
        let next = play(&state, Army::Red, sq(5, 4), sq(4, 4)).into_state().unwrap();
        assert!(next.board.is_empty_at(sq(5, 4)));
        assert!(next.board.is_empty_at(sq(4, 4)));
        assert_eq!(next.current_player, Army::Blue);
    }

    #[test]
    fn test_flag_capture_ends_game() {
        let state = with(&[(sq(1, 0), Rank::Lieutenant, Army::Red)]);
        let ply = play(&state, Army::Red, sq(1, 0), sq(0, 0));
        let Ply::Complete { state: next, outcome } = ply else { panic!("expected complete") };
        assert_eq!(outcome, Some(GameResult::Winner(Army::Red)));
        assert_eq!(next.status, GameStatus::Finished);
        assert_eq!(Stratego.legal_moves(&next, sq(0, 0)).len(), 0);
    }

    #[test]
    fn test_no_mobile_pieces_is_loss() {
        let state = StrategoState::with_pieces(
            Army::Blue,
            &[
                (sq(9, 0), Rank::Flag, Army::Red),
                (sq(8, 0), Rank::Bomb, Army::Red),
                (sq(5, 5), Rank::Sergeant, Army::Red),
                (sq(0, 0), Rank::Flag, Army::Blue),
                (sq(4, 5), Rank::Captain, Army::Blue),
            ],
        );
        let Ply::Complete { state: done, outcome } = play(&state, Army::Blue, sq(4, 5), sq(5, 5)) else {
            panic!("expected complete");
        };
        assert_eq!(outcome, Some(GameResult::Winner(Army::Blue)));
        assert_eq!(done.winner, Some(GameResult::Winner(Army::Blue)));
    }

    #[test]
    fn test_mutual_immobility_is_draw() {
        let state = StrategoState::with_pieces(
            Army::Red,
            &[
                (sq(9, 0), Rank::Flag, Army::Red),
                (sq(5, 5), Rank::Sergeant, Army::Red),
                (sq(0, 0), Rank::Flag, Army::Blue),
                (sq(4, 5), Rank::Sergeant, Army::Blue),
            ],
        );
        let Ply::Complete { outcome, .. } = play(&state, Army::Red, sq(5, 5), sq(4, 5)) else {
            panic!("expected complete");
        };
        assert_eq!(outcome, Some(GameResult::Draw));
    }

    #[test]
    fn test_setup_action_rejected_during_play() {
        let state = with(&[]);
        let err = Stratego
            .apply_move(&state, Army::Red, &StrategoAction::Place { square: sq(7, 0), rank: Rank::Spy })
            .unwrap_err();
        assert_eq!(err, RuleError::NotInSetup);
    }

    #[test]
    fn test_out_of_turn_move() {
        let state = with(&[(sq(4, 4), Rank::Scout, Army::Blue)]);
        let err = Stratego
            .apply_move(&state, Army::Blue, &StrategoAction::Move { from: sq(4, 4), to: sq(4, 5) })
            .unwrap_err();
        assert_eq!(err, RuleError::NotYourTurn);
    }
}
