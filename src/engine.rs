//! Monte Carlo blackjack simulation engine.
//! Hands live on the stack; nothing in a trial allocates.

use std::cmp::Ordering;

use crate::deck::CardSource;
use crate::error::Result;
use crate::hand::Hand;
use crate::strategy::{Action, Strategy};

/// Result of one player-vs-dealer round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    PlayerWin,
    DealerWin,
    Tie,
}

/// Deal two cards, then draw under `strategy` until it stands or busts.
/// A bust hand is returned as is and never consulted again.
#[inline]
pub fn play_hand<D: CardSource + ?Sized>(strategy: &Strategy, deck: &mut D) -> Result<Hand> {
    let mut hand = Hand::new();
    hand.push(deck.draw())?;
    hand.push(deck.draw())?;

    while !hand.is_bust() && strategy.decide(&hand) == Action::Hit {
        hand.push(deck.draw())?;
    }

    Ok(hand)
}

/// First matching rule wins: player bust, dealer bust, a lone blackjack,
/// then totals. Two blackjacks are a tie.
#[inline]
pub fn resolve(player: &Hand, dealer: &Hand) -> Outcome {
    if player.is_bust() {
        return Outcome::DealerWin;
    }
    if dealer.is_bust() {
        return Outcome::PlayerWin;
    }

    match (player.is_blackjack(), dealer.is_blackjack()) {
        (true, false) => return Outcome::PlayerWin,
        (false, true) => return Outcome::DealerWin,
        _ => {}
    }

    match player.total().cmp(&dealer.total()) {
        Ordering::Greater => Outcome::PlayerWin,
        Ordering::Less => Outcome::DealerWin,
        Ordering::Equal => Outcome::Tie,
    }
}

/// Counters for one (player strategy, dealer strategy) cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStats {
    pub trials: u64,
    pub player_wins: u64,
    pub dealer_wins: u64,
    pub ties: u64,
    pub player_busts: u64,
    pub dealer_busts: u64,
}

impl CellStats {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record(&mut self, player: &Hand, dealer: &Hand, outcome: Outcome) {
        self.trials += 1;
        match outcome {
            Outcome::PlayerWin => self.player_wins += 1,
            Outcome::DealerWin => self.dealer_wins += 1,
            Outcome::Tie => self.ties += 1,
        }
        self.player_busts += player.is_bust() as u64;
        self.dealer_busts += dealer.is_bust() as u64;
    }

    #[inline(always)]
    pub fn merge(&mut self, other: &CellStats) {
        self.trials += other.trials;
        self.player_wins += other.player_wins;
        self.dealer_wins += other.dealer_wins;
        self.ties += other.ties;
        self.player_busts += other.player_busts;
        self.dealer_busts += other.dealer_busts;
    }

    pub fn merged(mut self, other: CellStats) -> Self {
        self.merge(&other);
        self
    }

    /// Ties count in the denominator; nothing is renormalized.
    pub fn win_rate(&self) -> f64 {
        percent(self.player_wins, self.trials)
    }

    pub fn loss_rate(&self) -> f64 {
        percent(self.dealer_wins, self.trials)
    }

    pub fn tie_rate(&self) -> f64 {
        percent(self.ties, self.trials)
    }
}

/// `100 * count / total`, rounded to two decimals. Zero when `total` is zero.
#[inline]
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (10_000.0 * count as f64 / total as f64).round() / 100.0
}

/// Play one round: player hand first, then dealer hand, both from `deck`.
#[inline]
pub fn play_trial<D: CardSource + ?Sized>(
    player: &Strategy,
    dealer: &Strategy,
    deck: &mut D,
) -> Result<(Hand, Hand, Outcome)> {
    let player_hand = play_hand(player, deck)?;
    let dealer_hand = play_hand(dealer, deck)?;
    let outcome = resolve(&player_hand, &dealer_hand);
    Ok((player_hand, dealer_hand, outcome))
}

/// Run `trials` rounds on one deck and count them.
pub fn simulate_batch<D: CardSource + ?Sized>(
    player: &Strategy,
    dealer: &Strategy,
    deck: &mut D,
    trials: u64,
) -> Result<CellStats> {
    let mut stats = CellStats::new();
    for _ in 0..trials {
        let (player_hand, dealer_hand, outcome) = play_trial(player, dealer, deck)?;
        stats.record(&player_hand, &dealer_hand, outcome);
    }
    Ok(stats)
}
