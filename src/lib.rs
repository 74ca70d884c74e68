//! Blackjack strategy simulator.
//! Monte Carlo win rates for every pairing of threshold hit/stand strategies.

pub mod deck;
pub mod engine;
pub mod error;
pub mod hand;
pub mod report;
pub mod simulation;
pub mod strategy;

pub use deck::{CardSource, InfiniteDeck, StackedDeck};
pub use engine::{play_hand, play_trial, resolve, CellStats, Outcome};
pub use error::{Error, Result};
pub use hand::{hand_value, Hand, HandValue};
pub use simulation::{parse_trials, SimConfig, Simulator, StrategyTable, TotalsTable};
pub use strategy::{decide, strategy_space, Action, Strategy};
