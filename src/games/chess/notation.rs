//! Standard algebraic notation for the move history.

use smallvec::SmallVec;

use super::movegen::legal_destinations;
use super::piece::PieceKind;
use super::state::{CastleSide, ChessState};
use crate::core::Square;

/// SAN for a move about to be played on `before`, without check suffix.
#[must_use]
pub fn san(
    before: &ChessState,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
    capture: bool,
    castle: Option<CastleSide>,
) -> String {
    match castle {
        Some(CastleSide::KingSide) => return "O-O".to_string(),
        Some(CastleSide::QueenSide) => return "O-O-O".to_string(),
        None => {}
    }
    let Some(piece) = before.board.get(from) else {
        return format!("{from}{to}");
    };

    let mut out = String::new();
    match piece.kind.letter() {
        None => {
            if capture {
                out.extend(from.file_char());
            }
        }
        Some(letter) => {
            out.push(letter);
            out.push_str(&disambiguation(before, from, to));
        }
    }
    if capture {
        out.push('x');
    }
    out.push_str(&to.to_string());
    if let Some(letter) = promotion.and_then(PieceKind::letter) {
        out.push('=');
        out.push(letter);
    }
    out
}

/// File, rank, or both, when another piece of the same kind can reach `to`.
fn disambiguation(before: &ChessState, from: Square, to: Square) -> String {
    let Some(piece) = before.board.get(from) else {
        return String::new();
    };
    let rivals: SmallVec<[Square; 4]> = before
        .board
        .pieces()
        .filter(|&(square, other)| {
            square != from && other.kind == piece.kind && other.owner == piece.owner
        })
        .filter(|&(square, _)| legal_destinations(before, square).contains(to))
        .map(|(square, _)| square)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|r| r.col != from.col) {
        from.file_char().map(String::from).unwrap_or_default()
    } else if rivals.iter().all(|r| r.row != from.row) {
        from.rank_char().map(String::from).unwrap_or_default()
    } else {
        from.to_string()
    }
}
