//! Threshold hit/stand policies and the strategy space they form.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::hand::Hand;

pub const MIN_THRESHOLD: u8 = 1;
pub const MAX_THRESHOLD: u8 = 21;

/// Possible player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Hit,
    Stand,
}

/// Stand once the total reaches `stand_on_value`. On a soft total exactly at
/// the threshold, `stand_on_soft` decides; above it the hand always stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Strategy {
    stand_on_value: u8,
    stand_on_soft: bool,
}

impl Strategy {
    pub fn new(stand_on_value: u8, stand_on_soft: bool) -> Result<Self> {
        check_threshold(stand_on_value)?;
        Ok(Strategy {
            stand_on_value,
            stand_on_soft,
        })
    }

    /// `H{n}`: hit a soft n.
    pub fn hit_soft(stand_on_value: u8) -> Result<Self> {
        Self::new(stand_on_value, false)
    }

    /// `S{n}`: stand on a soft n.
    pub fn stand_soft(stand_on_value: u8) -> Result<Self> {
        Self::new(stand_on_value, true)
    }

    #[inline(always)]
    pub fn stand_on_value(&self) -> u8 {
        self.stand_on_value
    }

    #[inline(always)]
    pub fn stand_on_soft(&self) -> bool {
        self.stand_on_soft
    }

    #[inline]
    pub fn decide(&self, hand: &Hand) -> Action {
        decide(self, hand)
    }

    /// Stable identifier independent of where the strategy sits in a table.
    #[inline(always)]
    pub fn key(&self) -> u64 {
        ((self.stand_on_value as u64) << 1) | self.stand_on_soft as u64
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// Hard totals at the threshold always stand; only a soft total at the
/// threshold looks at `stand_on_soft`.
#[inline(always)]
pub fn decide(strategy: &Strategy, hand: &Hand) -> Action {
    let total = hand.total();
    if total < strategy.stand_on_value {
        Action::Hit
    } else if total > strategy.stand_on_value {
        Action::Stand
    } else if !hand.is_soft() || strategy.stand_on_soft {
        Action::Stand
    } else {
        Action::Hit
    }
}

fn check_threshold(value: u8) -> Result<u8> {
    if (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "stand-on value {} outside {}..={}",
            value, MIN_THRESHOLD, MAX_THRESHOLD
        )))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.stand_on_soft { "S" } else { "H" };
        write!(f, "{}{}", mode, self.stand_on_value)
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid =
            || Error::InvalidInput(format!("'{s}' is not a strategy label like H17 or S18"));
        let mut chars = s.chars();
        let stand_on_soft = match chars.next() {
            Some('H') | Some('h') => false,
            Some('S') | Some('s') => true,
            _ => return Err(invalid()),
        };
        let value: u8 = chars.as_str().parse().map_err(|_| invalid())?;
        Strategy::new(value, stand_on_soft)
    }
}

/// Every strategy with a threshold in `min..=max`, ascending threshold,
/// hit-on-soft before stand-on-soft.
pub fn strategy_space(min: u8, max: u8) -> Result<Vec<Strategy>> {
    check_threshold(min)?;
    check_threshold(max)?;
    if min > max {
        return Err(Error::InvalidInput(format!(
            "threshold range {}..={} is empty",
            min, max
        )));
    }

    let mut strategies = Vec::with_capacity(2 * (max - min + 1) as usize);
    for value in min..=max {
        strategies.push(Strategy::hit_soft(value)?);
        strategies.push(Strategy::stand_soft(value)?);
    }
    Ok(strategies)
}
