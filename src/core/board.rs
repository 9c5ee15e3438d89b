//! Rectangular board grid shared by every game.
//!
//! A `Board<P>` is a `rows × cols` grid of `Option<P>`. Each game supplies its
//! own piece type; the grid itself knows nothing about rules. It serializes as
//! a plain JSON 2-D array, which is the persisted `board` field.

use serde::{Deserialize, Serialize};

use super::square::Square;

/// A 2-D grid of optional pieces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board<P> {
    cells: Vec<Vec<Option<P>>>,
}

impl<P> Board<P> {
    /// Create an empty board.
    #[must_use]
    pub fn empty(rows: u8, cols: u8) -> Self {
        let cells = (0..rows)
            .map(|_| (0..cols).map(|_| None).collect())
            .collect();
        Self { cells }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> u8 {
        self.cells.len() as u8
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> u8 {
        self.cells.first().map_or(0, |row| row.len() as u8)
    }

    /// Check that a square lies on the board.
    #[must_use]
    pub fn contains(&self, square: Square) -> bool {
        square.row < self.rows() && square.col < self.cols()
    }

    /// Get the piece on a square, if any.
    #[must_use]
    pub fn get(&self, square: Square) -> Option<&P> {
        self.cells
            .get(square.row as usize)
            .and_then(|row| row.get(square.col as usize))
            .and_then(Option::as_ref)
    }

    /// Get a mutable reference to the piece on a square.
    pub fn get_mut(&mut self, square: Square) -> Option<&mut P> {
        self.cells
            .get_mut(square.row as usize)
            .and_then(|row| row.get_mut(square.col as usize))
            .and_then(Option::as_mut)
    }

    /// Check if a square is empty (off-board squares are not empty).
    #[must_use]
    pub fn is_empty_at(&self, square: Square) -> bool {
        self.contains(square) && self.get(square).is_none()
    }

    /// Put a piece on a square, returning whatever was there.
    ///
    /// Off-board squares are ignored and hand the piece back.
    pub fn set(&mut self, square: Square, piece: P) -> Option<P> {
        match self
            .cells
            .get_mut(square.row as usize)
            .and_then(|row| row.get_mut(square.col as usize))
        {
            Some(cell) => cell.replace(piece),
            None => Some(piece),
        }
    }

    /// Remove and return the piece on a square.
    pub fn take(&mut self, square: Square) -> Option<P> {
        self.cells
            .get_mut(square.row as usize)
            .and_then(|row| row.get_mut(square.col as usize))
            .and_then(Option::take)
    }

    /// Move a piece, returning any piece that was on the destination.
    ///
    /// Does nothing if the origin is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<P> {
        match self.take(from) {
            Some(piece) => self.set(to, piece),
            None => None,
        }
    }

    /// Iterate every square on the board in row-major order.
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |row| (0..cols).map(move |col| Square::new(row, col)))
    }

    /// Iterate occupied squares with their pieces.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, &P)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.as_ref()
                    .map(|piece| (Square::new(row as u8, col as u8), piece))
            })
        })
    }
}
