//! Seeded randomness for timer-forced moves and automatic Stratego setup.
//!
//! The acceptor owns one root `GameRng`. Every expiry forks it and then
//! narrows the fork to the game being resolved, so two games never share a
//! stream and a replayed seed reproduces the same forced choices.
//!
//! ```
//! use stakeboard::core::GameRng;
//!
//! let root = GameRng::new(42);
//! let mut a = root.for_game("game-1");
//! let mut b = root.for_game("game-1");
//! assert_eq!(a.below(64), b.below(64));
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

const FORK_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// ChaCha8 stream that remembers its seed so it can be forked and narrowed.
#[derive(Clone, Debug)]
pub struct GameRng {
    stream: ChaCha8Rng,
    seed: u64,
    forks: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            stream: ChaCha8Rng::seed_from_u64(seed),
            seed,
            forks: 0,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Branch off a fresh stream. Successive forks differ; the sequence of
    /// forks is fixed by the seed.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.forks += 1;
        Self::new(self.seed.wrapping_add(self.forks.wrapping_mul(FORK_STEP)))
    }

    /// Stream dedicated to one game. `FxHasher` keeps the derived seed stable
    /// across toolchains.
    #[must_use]
    pub fn for_game(&self, game_id: &str) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        game_id.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        self.stream.gen_range(0..bound)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.stream);
    }

    /// Uniform pick; `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.stream)
    }
}
