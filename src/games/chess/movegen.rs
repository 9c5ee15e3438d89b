//! Chess move generation.
//!
//! Destinations are produced in two passes:
//! 1. Movement templates (steps, rays, pawn pushes/captures, en passant)
//! 2. Self-check filter: each candidate is played on a scratch board and
//!    dropped if the mover's king is then attacked
//!
//! Castling is generated separately because its conditions look at squares
//! the king passes through, not just where it lands.

use super::piece::{ChessPiece, Color, PieceKind};
use super::state::{CastleSide, ChessState, SIZE};
use crate::core::{Board, Side, Square, SquareSet};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_RAYS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_RAYS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

fn step(square: Square, d_row: i8, d_col: i8) -> Option<Square> {
    square.offset(d_row, d_col, SIZE, SIZE)
}

/// Walk a ray, collecting empty squares and stopping on the first occupied
/// one (included only if it holds an enemy).
fn slide(board: &Board<ChessPiece>, from: Square, owner: Color, rays: &[(i8, i8)], out: &mut SquareSet) {
    for &(dr, dc) in rays {
        let mut cursor = from;
        while let Some(next) = step(cursor, dr, dc) {
            match board.get(next) {
                None => out.insert(next),
                Some(other) => {
                    if other.owner != owner {
                        out.insert(next);
                    }
                    break;
                }
            }
            cursor = next;
        }
    }
}

fn jump(board: &Board<ChessPiece>, from: Square, owner: Color, offsets: &[(i8, i8)], out: &mut SquareSet) {
    for &(dr, dc) in offsets {
        if let Some(to) = step(from, dr, dc) {
            if board.get(to).map_or(true, |other| other.owner != owner) {
                out.insert(to);
            }
        }
    }
}

fn pawn_moves(board: &Board<ChessPiece>, from: Square, owner: Color, en_passant: Option<Square>, out: &mut SquareSet) {
    let dir = owner.pawn_direction();
    if let Some(one) = step(from, dir, 0) {
        if board.get(one).is_none() {
            out.insert(one);
            if from.row == owner.pawn_row() {
                if let Some(two) = step(from, dir * 2, 0) {
                    if board.get(two).is_none() {
                        out.insert(two);
                    }
                }
            }
        }
    }
    for dc in [-1, 1] {
        let Some(target) = step(from, dir, dc) else { continue };
        let enemy = board.get(target).is_some_and(|p| p.owner != owner);
        if enemy || en_passant == Some(target) {
            out.insert(target);
        }
    }
}

/// Destinations from movement templates alone, without the self-check filter
/// and without castling.
#[must_use]
pub fn pseudo_destinations(state: &ChessState, from: Square) -> SquareSet {
    let mut out = SquareSet::new();
    let Some(piece) = state.board.get(from) else {
        return out;
    };
    let board = &state.board;
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.owner, state.en_passant, &mut out),
        PieceKind::Knight => jump(board, from, piece.owner, &KNIGHT_OFFSETS, &mut out),
        PieceKind::King => jump(board, from, piece.owner, &KING_OFFSETS, &mut out),
        PieceKind::Bishop => slide(board, from, piece.owner, &BISHOP_RAYS, &mut out),
        PieceKind::Rook => slide(board, from, piece.owner, &ROOK_RAYS, &mut out),
        PieceKind::Queen => {
            slide(board, from, piece.owner, &ROOK_RAYS, &mut out);
            slide(board, from, piece.owner, &BISHOP_RAYS, &mut out);
        }
    }
    out
}

/// Check if any piece of `by` attacks `target`.
#[must_use]
pub fn is_attacked(board: &Board<ChessPiece>, target: Square, by: Color) -> bool {
    let holds = |square: Option<Square>, kinds: &[PieceKind]| {
        square
            .and_then(|sq| board.get(sq))
            .is_some_and(|p| p.owner == by && kinds.contains(&p.kind))
    };

    // A pawn of `by` attacks diagonally forward, so look one row behind it.
    let back = -by.pawn_direction();
    if holds(step(target, back, -1), &[PieceKind::Pawn]) || holds(step(target, back, 1), &[PieceKind::Pawn]) {
        return true;
    }
    if KNIGHT_OFFSETS
        .iter()
        .any(|&(dr, dc)| holds(step(target, dr, dc), &[PieceKind::Knight]))
    {
        return true;
    }
    if KING_OFFSETS
        .iter()
        .any(|&(dr, dc)| holds(step(target, dr, dc), &[PieceKind::King]))
    {
        return true;
    }

    let ray_hits = |rays: &[(i8, i8)], kinds: &[PieceKind]| {
        rays.iter().any(|&(dr, dc)| {
            let mut cursor = target;
            while let Some(next) = step(cursor, dr, dc) {
                if let Some(piece) = board.get(next) {
                    return piece.owner == by && kinds.contains(&piece.kind);
                }
                cursor = next;
            }
            false
        })
    };
    ray_hits(&ROOK_RAYS, &[PieceKind::Rook, PieceKind::Queen])
        || ray_hits(&BISHOP_RAYS, &[PieceKind::Bishop, PieceKind::Queen])
}

/// Check if `color`'s king is attacked on this board.
#[must_use]
pub fn in_check(board: &Board<ChessPiece>, color: Color) -> bool {
    board
        .pieces()
        .find(|(_, p)| p.kind == PieceKind::King && p.owner == color)
        .is_some_and(|(square, _)| is_attacked(board, square, color.opponent()))
}

/// Play a move on a copy of the board: the piece relocates, an en passant
/// victim disappears, and a castling rook jumps over.
#[must_use]
pub fn board_after(state: &ChessState, from: Square, to: Square) -> Board<ChessPiece> {
    let mut board = state.board.clone();
    let Some(piece) = board.get(from).copied() else {
        return board;
    };
    if piece.kind == PieceKind::Pawn && from.col != to.col && board.get(to).is_none() {
        board.take(Square::new(from.row, to.col));
    }
    if let Some(side) = castle_side(&piece, from, to) {
        board.relocate(
            Square::new(from.row, side.rook_col()),
            Square::new(from.row, side.rook_target_col()),
        );
    }
    board.relocate(from, to);
    board
}

/// Which castle a king move performs, if it moves two files.
#[must_use]
pub fn castle_side(piece: &ChessPiece, from: Square, to: Square) -> Option<CastleSide> {
    if piece.kind != PieceKind::King || from.row != to.row || from.col.abs_diff(to.col) != 2 {
        return None;
    }
    Some(if to.col > from.col {
        CastleSide::KingSide
    } else {
        CastleSide::QueenSide
    })
}

/// Castling destinations for the king on `from`.
fn castling_destinations(state: &ChessState, from: Square, king: &ChessPiece) -> SquareSet {
    let mut out = SquareSet::new();
    let owner = king.owner;
    let row = owner.back_row();
    if king.kind != PieceKind::King || king.has_moved || from != Square::new(row, 4) {
        return out;
    }
    let enemy = owner.opponent();
    if is_attacked(&state.board, from, enemy) {
        return out;
    }

    for side in [CastleSide::KingSide, CastleSide::QueenSide] {
        if !state.castling.allows(owner, side) {
            continue;
        }
        let rook_ok = state
            .board
            .get(Square::new(row, side.rook_col()))
            .is_some_and(|p| p.kind == PieceKind::Rook && p.owner == owner && !p.has_moved);
        if !rook_ok {
            continue;
        }

        let (lo, hi) = match side {
            CastleSide::KingSide => (5, 6),
            CastleSide::QueenSide => (1, 3),
        };
        if !(lo..=hi).all(|col| state.board.get(Square::new(row, col)).is_none()) {
            continue;
        }

        // The king crosses the rook's landing square and stops on its target.
        let path = [side.rook_target_col(), side.king_target_col()];
        if path
            .iter()
            .any(|&col| is_attacked(&state.board, Square::new(row, col), enemy))
        {
            continue;
        }
        out.insert(Square::new(row, side.king_target_col()));
    }
    out
}

/// Fully legal destinations for the piece on `from`, whoever's turn it is.
#[must_use]
pub fn legal_destinations(state: &ChessState, from: Square) -> SquareSet {
    let Some(piece) = state.board.get(from).copied() else {
        return SquareSet::new();
    };
    let mut out: SquareSet = pseudo_destinations(state, from)
        .iter()
        .filter(|&to| !in_check(&board_after(state, from, to), piece.owner))
        .collect();
    for to in castling_destinations(state, from, &piece).iter() {
        out.insert(to);
    }
    out
}

/// Check if `color` has any legal move at all.
#[must_use]
pub fn has_any_move(state: &ChessState, color: Color) -> bool {
    state
        .board
        .pieces()
        .filter(|(_, p)| p.owner == color)
        .any(|(from, _)| !legal_destinations(state, from).is_empty())
}
