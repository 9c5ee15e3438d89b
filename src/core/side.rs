//! The two seats of a game.
//!
//! Every supported game is played by exactly two sides, but each names them
//! differently (white/black, black/white, red/blue). Games define their own
//! enum and implement `Side` so the timer and sync layers can stay generic.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A game's seat identifier.
pub trait Side:
    Copy + Eq + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The side that moves first.
    const FIRST: Self;

    /// The other side.
    #[must_use]
    fn opponent(self) -> Self;

    /// Both sides, first mover first.
    #[must_use]
    fn both() -> [Self; 2] {
        [Self::FIRST, Self::FIRST.opponent()]
    }

    /// Seat index: 0 for the first mover, 1 for the other.
    #[must_use]
    fn seat_index(self) -> usize {
        usize::from(self != Self::FIRST)
    }
}

/// Implement `Side` and a lower-case `Display` for a two-variant side enum.
#[macro_export]
macro_rules! side_enum {
    ($name:ident, $first:ident => $first_str:literal, $second:ident => $second_str:literal) => {
        impl $crate::core::Side for $name {
            const FIRST: Self = $name::$first;

            fn opponent(self) -> Self {
                match self {
                    $name::$first => $name::$second,
                    $name::$second => $name::$first,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(match self {
                    $name::$first => $first_str,
                    $name::$second => $second_str,
                })
            }
        }
    };
}
