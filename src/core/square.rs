//! Board coordinates and square sets.
//!
//! ## Square
//!
//! `(row, col)` with row 0 at the top edge as the board is rendered.
//! On 8×8 boards row 0 is Chess rank 8, so `e2` is `(6, 4)`.
//!
//! ## SquareSet
//!
//! Legal destinations are returned as a `SquareSet`: a 128-bit set indexed
//! by `row * 10 + col`, large enough for the 10×10 Stratego board.
//!
//! ```
//! use stakeboard::core::{Square, SquareSet};
//!
//! let e4 = Square::parse("e4").unwrap();
//! assert_eq!(e4, Square::new(4, 4));
//!
//! let mut set = SquareSet::new();
//! set.insert(e4);
//! assert!(set.contains(e4));
//! assert_eq!(set.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest board edge supported by `SquareSet` indexing.
pub const MAX_EDGE: u8 = 10;

/// A board coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    /// Create a square from row and column.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Parse algebraic notation (`a1`..`h8`) for 8×8 boards.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].checked_sub(b'a')?;
        let rank = bytes[1].checked_sub(b'1')?;
        if file >= 8 || rank >= 8 {
            return None;
        }
        Some(Self::new(7 - rank, file))
    }

    /// Step by a signed offset, staying within a `rows × cols` board.
    #[must_use]
    pub fn offset(self, d_row: i8, d_col: i8, rows: u8, cols: u8) -> Option<Self> {
        let row = self.row as i16 + d_row as i16;
        let col = self.col as i16 + d_col as i16;
        if row < 0 || col < 0 || row >= rows as i16 || col >= cols as i16 {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }

    /// Index into a `SquareSet`; `None` outside the 10×10 index space.
    #[must_use]
    pub const fn set_index(self) -> Option<u32> {
        if self.row >= MAX_EDGE || self.col >= MAX_EDGE {
            return None;
        }
        Some(self.row as u32 * MAX_EDGE as u32 + self.col as u32)
    }

    /// Chess file letter (`a`..`h`); `None` off an 8×8 board.
    #[must_use]
    pub fn file_char(self) -> Option<char> {
        (self.col < 8).then(|| (b'a' + self.col) as char)
    }

    /// Chess rank digit (`1`..`8`); `None` off an 8×8 board.
    #[must_use]
    pub fn rank_char(self) -> Option<char> {
        (self.row < 8).then(|| (b'8' - self.row) as char)
    }

    /// Whether the square is a dark square (`(row + col)` odd).
    #[must_use]
    pub const fn is_dark(self) -> bool {
        (self.row ^ self.col) & 1 == 1
    }
}

/// Algebraic form, meaningful on 8×8 boards.
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.file_char(), self.rank_char()) {
            (Some(file), Some(rank)) => write!(f, "{file}{rank}"),
            _ => write!(f, "({},{})", self.row, self.col),
        }
    }
}

/// Set of squares on a board of at most 10×10.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(u128);

impl SquareSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Single-bit mask for `square`, zero when it has no index.
    const fn bit(square: Square) -> u128 {
        match square.set_index() {
            Some(index) => 1u128 << index,
            None => 0,
        }
    }

    /// Add a square. Squares outside the index space are ignored.
    pub fn insert(&mut self, square: Square) {
        self.0 |= Self::bit(square);
    }

    /// Remove a square.
    pub fn remove(&mut self, square: Square) {
        self.0 &= !Self::bit(square);
    }

    /// Check membership; always false outside the index space.
    #[must_use]
    pub const fn contains(&self, square: Square) -> bool {
        self.0 & Self::bit(square) != 0
    }

    /// Number of squares in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate squares in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(Square::new(index / MAX_EDGE, index % MAX_EDGE))
        })
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = Self::new();
        for square in iter {
            set.insert(square);
        }
        set
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algebraic() {
        assert_eq!(Square::parse("a8"), Some(Square::new(0, 0)));
        assert_eq!(Square::parse("h1"), Some(Square::new(7, 7)));
        assert_eq!(Square::parse("e2"), Some(Square::new(6, 4)));
        assert_eq!(Square::parse("i1"), None);
        assert_eq!(Square::parse("a9"), None);
        assert_eq!(Square::parse("e"), None);
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["a1", "d4", "h8", "c7"] {
            let square = Square::parse(text).unwrap();
            assert_eq!(square.to_string(), text);
        }
        assert_eq!(Square::new(9, 9).to_string(), "(9,9)");
    }

    #[test]
    fn test_offset_bounds() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0, 8, 8), None);
        assert_eq!(corner.offset(1, 1, 8, 8), Some(Square::new(1, 1)));
        assert_eq!(Square::new(9, 9).offset(0, 1, 10, 10), None);
    }

    #[test]
    fn test_set_iteration_order() {
        let set: SquareSet = [Square::new(9, 9), Square::new(0, 3), Square::new(4, 0)]
            .into_iter()
            .collect();

        let squares: Vec<_> = set.iter().collect();
        assert_eq!(squares, vec![Square::new(0, 3), Square::new(4, 0), Square::new(9, 9)]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_set_remove() {
        let mut set = SquareSet::new();
        set.insert(Square::new(2, 2));
        set.remove(Square::new(2, 2));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_ignores_unindexable_squares() {
        // (16, 0) would be bit 160, which wraps onto (3, 2) if unchecked.
        let far = Square::new(16, 0);
        let wide = Square::new(0, 12);
        let mut set = SquareSet::new();
        set.insert(Square::new(3, 2));
        assert!(!set.contains(far));
        assert!(!set.contains(wide));

        set.insert(far);
        set.remove(Square::new(255, 255));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Square::new(3, 2)]);
        assert_eq!(far.set_index(), None);
    }

    #[test]
    fn test_dark_squares() {
        assert!(Square::new(0, 1).is_dark());
        assert!(!Square::new(7, 7).is_dark());
        assert!(Square::new(255, 254).is_dark());
    }

    #[test]
    fn test_algebraic_chars_off_board() {
        assert_eq!(Square::new(7, 0).file_char(), Some('a'));
        assert_eq!(Square::new(7, 0).rank_char(), Some('1'));
        assert_eq!(Square::new(9, 3).rank_char(), None);
        assert_eq!(Square::new(2, 200).file_char(), None);
        assert_eq!(Square::new(200, 200).to_string(), "(200,200)");
    }

    #[test]
    fn test_square_serialization() {
        let square = Square::new(3, 5);
        let json = serde_json::to_string(&square).unwrap();
        assert_eq!(json, r#"{"row":3,"col":5}"#);
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square);
    }
}
