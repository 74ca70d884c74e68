//! Card sources for the simulation.
//! Every draw is an independent uniform rank in 1..=13 (infinite deck).

use std::collections::VecDeque;

use crate::error::{Error, Result};

pub const ACE: u8 = 1;
pub const KING: u8 = 13;

/// Point value of a rank with aces counted hard (1).
#[inline(always)]
pub fn card_value(rank: u8) -> u8 {
    match rank {
        11..=13 => 10,
        _ => rank,
    }
}

#[inline(always)]
pub fn is_valid_rank(rank: u8) -> bool {
    (ACE..=KING).contains(&rank)
}

pub fn check_rank(rank: u8) -> Result<u8> {
    if is_valid_rank(rank) {
        Ok(rank)
    } else {
        Err(Error::Invariant(format!(
            "card rank {} outside {}..={}",
            rank, ACE, KING
        )))
    }
}

/// Anything that can hand out one card rank per call.
///
/// The hand player never validates or retries a draw itself; an out-of-range
/// rank is rejected when it is added to the hand.
pub trait CardSource {
    fn draw(&mut self) -> u8;
}

impl<F: FnMut() -> u8> CardSource for F {
    #[inline(always)]
    fn draw(&mut self) -> u8 {
        self()
    }
}

/// Infinite deck - each rank drawn independently with probability 1/13.
/// Owns its generator, so one instance must never be shared between workers.
#[derive(Clone)]
pub struct InfiniteDeck {
    rng: fastrand::Rng,
}

impl InfiniteDeck {
    /// Seeded from system entropy.
    pub fn new() -> Self {
        InfiniteDeck {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        InfiniteDeck {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for InfiniteDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSource for InfiniteDeck {
    #[inline(always)]
    fn draw(&mut self) -> u8 {
        self.rng.u8(ACE..=KING)
    }
}

/// Deals a fixed sequence of ranks in order. Once exhausted it yields 0,
/// which the hand rejects as an invalid rank.
#[derive(Debug, Clone, Default)]
pub struct StackedDeck {
    cards: VecDeque<u8>,
}

impl StackedDeck {
    pub fn new(cards: &[u8]) -> Self {
        StackedDeck {
            cards: cards.iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl CardSource for StackedDeck {
    fn draw(&mut self) -> u8 {
        self.cards.pop_front().unwrap_or(0)
    }
}
