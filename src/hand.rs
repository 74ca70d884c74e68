//! Hand scoring.
//! Totals are always rescored from the full card list; nothing patches them
//! incrementally.

use std::fmt;

use crate::deck::{card_value, check_rank, ACE};
use crate::error::{Error, Result};

/// A hand is only offered another card while its total is at most 21, and
/// every card is worth at least 1, so the play loop never exceeds 22 cards.
pub const MAX_CARDS: usize = 24;

const BLACKJACK: u8 = 21;

/// Result of hand value calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandValue {
    pub total: u8,
    pub is_soft: bool,
}

impl HandValue {
    #[inline(always)]
    pub fn soft_ace_count(&self) -> u8 {
        self.is_soft as u8
    }
}

/// Score a sequence of ranks. At most one ace is ever counted as 11.
#[inline]
pub fn hand_value(cards: &[u8]) -> HandValue {
    let hard: u16 = cards.iter().map(|&c| card_value(c) as u16).sum();
    let has_ace = cards.contains(&ACE);

    if has_ace && hard + 10 <= BLACKJACK as u16 {
        HandValue {
            total: (hard + 10) as u8,
            is_soft: true,
        }
    } else {
        HandValue {
            total: hard.min(u8::MAX as u16) as u8,
            is_soft: false,
        }
    }
}

/// Ordered, append-only card list with its derived score.
/// Fixed capacity, so a hand lives on the stack.
#[derive(Clone, Copy)]
pub struct Hand {
    cards: [u8; MAX_CARDS],
    len: usize,
    value: HandValue,
}

impl Hand {
    pub fn new() -> Self {
        Hand {
            cards: [0; MAX_CARDS],
            len: 0,
            value: HandValue {
                total: 0,
                is_soft: false,
            },
        }
    }

    pub fn from_cards(cards: &[u8]) -> Result<Self> {
        let mut hand = Hand::new();
        for &card in cards {
            hand.push(card)?;
        }
        Ok(hand)
    }

    /// The only way to change a hand. Rescores after every card.
    #[inline]
    pub fn push(&mut self, rank: u8) -> Result<()> {
        let rank = check_rank(rank)?;
        if self.len == MAX_CARDS {
            return Err(Error::Invariant(format!(
                "hand exceeded {} cards",
                MAX_CARDS
            )));
        }
        self.cards[self.len] = rank;
        self.len += 1;
        self.value = hand_value(self.cards());
        Ok(())
    }

    #[inline(always)]
    pub fn cards(&self) -> &[u8] {
        &self.cards[..self.len]
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn value(&self) -> HandValue {
        self.value
    }

    #[inline(always)]
    pub fn total(&self) -> u8 {
        self.value.total
    }

    #[inline(always)]
    pub fn soft_ace_count(&self) -> u8 {
        self.value.soft_ace_count()
    }

    #[inline(always)]
    pub fn is_soft(&self) -> bool {
        self.value.is_soft
    }

    #[inline(always)]
    pub fn is_bust(&self) -> bool {
        self.value.total > BLACKJACK
    }

    /// Two cards, 21, via a soft ace. Three-card 21s never qualify.
    #[inline(always)]
    pub fn is_blackjack(&self) -> bool {
        self.len == 2 && self.value.total == BLACKJACK && self.value.is_soft
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Hand {
    fn eq(&self, other: &Self) -> bool {
        self.cards() == other.cards()
    }
}

impl Eq for Hand {}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hand")
            .field("cards", &self.cards())
            .field("total", &self.value.total)
            .field("soft_ace_count", &self.soft_ace_count())
            .finish()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards: Vec<String> = self.cards().iter().map(|c| c.to_string()).collect();
        write!(f, "[{}] = {}", cards.join(","), self.value.total)?;
        if self.value.is_soft {
            write!(f, " (soft)")?;
        }
        Ok(())
    }
}
