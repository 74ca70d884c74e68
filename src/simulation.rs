//! Simulation driver: runs every (player, dealer) strategy pair of the
//! configured space and aggregates the counts into tables.
//!
//! Trials of a cell are cut into fixed-size batches. Each batch gets its own
//! generator, seeded from the base seed, a per-cell stream key and the batch
//! index, so the numbers never depend on how rayon schedules the batches.
//! Without a base seed every batch is seeded from system entropy, and runs
//! only agree in distribution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::deck::InfiniteDeck;
use crate::engine::{percent, play_hand, simulate_batch, CellStats};
use crate::error::{Error, Result};
use crate::strategy::{strategy_space, Strategy};

pub const DEFAULT_TRIALS: u64 = 10_000;
pub const DEFAULT_MIN_THRESHOLD: u8 = 13;
pub const DEFAULT_MAX_THRESHOLD: u8 = 20;
pub const BATCH_SIZE: u32 = 10_000;

const BUST_TOTAL: u8 = 22;

// Stream tags keep the matchup and totals draws independent.
const MATCHUP_STREAM: u64 = 0x4d41_5443_4855_5000;
const TOTALS_STREAM: u64 = 0x544f_5441_4c53_0000;

/// Parse a trial count. Anything that is not a positive integer is rejected.
pub fn parse_trials(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let value: i128 = trimmed.parse().map_err(|_| {
        Error::InvalidInput(format!("trial count '{trimmed}' is not an integer"))
    })?;
    if value <= 0 {
        return Err(Error::InvalidInput(format!(
            "trial count must be positive, got {value}"
        )));
    }
    u64::try_from(value)
        .map_err(|_| Error::InvalidInput(format!("trial count {value} is too large")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub trials: u64,
    pub min_threshold: u8,
    pub max_threshold: u8,
    pub seed: Option<u64>,
    pub batch_size: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            trials: DEFAULT_TRIALS,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            max_threshold: DEFAULT_MAX_THRESHOLD,
            seed: None,
            batch_size: BATCH_SIZE,
        }
    }
}

impl SimConfig {
    pub fn new(trials: u64) -> Self {
        SimConfig {
            trials,
            ..Self::default()
        }
    }

    pub fn with_thresholds(mut self, min: u8, max: u8) -> Self {
        self.min_threshold = min;
        self.max_threshold = max;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::InvalidInput(
                "trial count must be positive, got 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidInput(
                "batch size must be positive".to_string(),
            ));
        }
        strategy_space(self.min_threshold, self.max_threshold).map(|_| ())
    }

    fn batch_count(&self) -> u64 {
        self.trials.div_ceil(self.batch_size as u64)
    }

    fn batch_len(&self, batch: u64) -> u64 {
        let start = batch * self.batch_size as u64;
        (self.trials - start).min(self.batch_size as u64)
    }

    fn deck_for(&self, stream: u64, batch: u64) -> InfiniteDeck {
        InfiniteDeck::from_seed(self.seed.map(|base| stream_seed(base, stream, batch)))
    }
}

/// SplitMix64 finalizer
#[inline(always)]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

#[inline(always)]
fn stream_seed(base: u64, stream: u64, batch: u64) -> u64 {
    splitmix64(base ^ splitmix64(stream ^ splitmix64(batch)))
}

#[inline(always)]
fn matchup_stream(player: &Strategy, dealer: &Strategy) -> u64 {
    MATCHUP_STREAM ^ ((player.key() << 8) | dealer.key())
}

/// Win percentages for every player strategy against every dealer strategy.
/// Rows are player strategies, columns dealer strategies, same order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyTable {
    strategies: Vec<Strategy>,
    cells: Vec<CellStats>,
}

impl StrategyTable {
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn labels(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn stats(&self, row: usize, col: usize) -> Option<&CellStats> {
        if row >= self.len() || col >= self.len() {
            return None;
        }
        self.cells.get(row * self.len() + col)
    }

    pub fn win_rate(&self, player: &Strategy, dealer: &Strategy) -> Option<f64> {
        let row = self.strategies.iter().position(|s| s == player)?;
        let col = self.strategies.iter().position(|s| s == dealer)?;
        self.stats(row, col).map(|s| s.win_rate())
    }

    /// One `(player label, win rates)` entry per player strategy.
    pub fn rows(&self) -> Vec<(String, Vec<f64>)> {
        let n = self.len();
        self.strategies
            .iter()
            .enumerate()
            .map(|(row, s)| {
                let rates = self.cells[row * n..(row + 1) * n]
                    .iter()
                    .map(|c| c.win_rate())
                    .collect();
                (s.label(), rates)
            })
            .collect()
    }
}

/// Distribution of final totals per strategy, `min..=21` plus bust.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsTable {
    strategies: Vec<Strategy>,
    min_total: u8,
    trials: u64,
    counts: Vec<Vec<u64>>,
}

impl TotalsTable {
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> =
            (self.min_total..BUST_TOTAL).map(|t| t.to_string()).collect();
        columns.push("BUST".to_string());
        columns
    }

    pub fn counts(&self, row: usize) -> Option<&[u64]> {
        self.counts.get(row).map(|c| c.as_slice())
    }

    pub fn bust_rate(&self, row: usize) -> Option<f64> {
        self.counts(row)
            .and_then(|c| c.last())
            .map(|&busts| percent(busts, self.trials))
    }

    pub fn rows(&self) -> Vec<(String, Vec<f64>)> {
        self.strategies
            .iter()
            .zip(&self.counts)
            .map(|(s, counts)| {
                let rates = counts.iter().map(|&c| percent(c, self.trials)).collect();
                (s.label(), rates)
            })
            .collect()
    }
}

pub struct Simulator {
    config: SimConfig,
    strategies: Vec<Strategy>,
}

impl Simulator {
    /// Validates the whole configuration before anything runs.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let strategies = strategy_space(config.min_threshold, config.max_threshold)?;
        Ok(Simulator { config, strategies })
    }

    /// `trials` rounds of one pairing. Seeded runs reproduce the matching
    /// cell of [`Simulator::run`] exactly.
    pub fn matchup(&self, player: &Strategy, dealer: &Strategy) -> Result<CellStats> {
        let stream = matchup_stream(player, dealer);
        let stats = (0..self.config.batch_count())
            .into_par_iter()
            .map(|batch| {
                let mut deck = self.config.deck_for(stream, batch);
                simulate_batch(player, dealer, &mut deck, self.config.batch_len(batch))
            })
            .try_reduce(CellStats::new, |a, b| Ok(a.merged(b)))?;

        if stats.trials != self.config.trials
            || stats.player_wins + stats.dealer_wins + stats.ties != stats.trials
        {
            return Err(Error::Invariant(format!(
                "{player} vs {dealer}: counted {stats:?} for {} trials",
                self.config.trials
            )));
        }
        Ok(stats)
    }

    /// The full cross product of the strategy space.
    pub fn run(&self) -> Result<StrategyTable> {
        let n = self.strategies.len();
        let total_cells = n * n;
        let done = AtomicUsize::new(0);
        let start_time = Instant::now();

        info!(
            "Simulating {} strategies ({} cells) x {} trials, seed: {}",
            n,
            total_cells,
            self.config.trials,
            self.config
                .seed
                .map_or_else(|| "entropy".to_string(), |s| s.to_string())
        );

        let cells = (0..total_cells)
            .into_par_iter()
            .map(|cell| -> Result<CellStats> {
                let player = &self.strategies[cell / n];
                let dealer = &self.strategies[cell % n];
                let stats = self.matchup(player, dealer)?;
                debug!("{} vs {}: {:.2}%", player, dealer, stats.win_rate());

                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % n == 0 {
                    info!(
                        "{}/{} cells complete ({:.1}%), elapsed: {:.1}s",
                        finished,
                        total_cells,
                        100.0 * finished as f64 / total_cells as f64,
                        start_time.elapsed().as_secs_f64()
                    );
                }
                Ok(stats)
            })
            .collect::<Result<Vec<CellStats>>>()?;

        info!(
            "Simulation complete in {:.1} seconds",
            start_time.elapsed().as_secs_f64()
        );

        Ok(StrategyTable {
            strategies: self.strategies.clone(),
            cells,
        })
    }

    /// Play `trials` hands per strategy and histogram where they finish.
    pub fn final_totals(&self) -> Result<TotalsTable> {
        let min_total = self.config.min_threshold;
        let width = (BUST_TOTAL - min_total + 1) as usize;
        let start_time = Instant::now();

        let counts = self
            .strategies
            .par_iter()
            .map(|strategy| {
                let stream = TOTALS_STREAM ^ strategy.key();
                (0..self.config.batch_count())
                    .into_par_iter()
                    .map(|batch| -> Result<Vec<u64>> {
                        let mut deck = self.config.deck_for(stream, batch);
                        let mut counts = vec![0u64; width];
                        for _ in 0..self.config.batch_len(batch) {
                            let hand = play_hand(strategy, &mut deck)?;
                            let total = hand.total().min(BUST_TOTAL);
                            if total < min_total {
                                return Err(Error::Invariant(format!(
                                    "{strategy} stood on {total}, below {min_total}"
                                )));
                            }
                            counts[(total - min_total) as usize] += 1;
                        }
                        Ok(counts)
                    })
                    .try_reduce(
                        || vec![0u64; width],
                        |mut a, b| {
                            a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                            Ok(a)
                        },
                    )
            })
            .collect::<Result<Vec<Vec<u64>>>>()?;

        info!(
            "Final totals for {} strategies in {:.1} seconds",
            self.strategies.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(TotalsTable {
            strategies: self.strategies.clone(),
            min_total,
            trials: self.config.trials,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(trials: u64, min: u8, max: u8) -> Simulator {
        let config = SimConfig::new(trials)
            .with_thresholds(min, max)
            .with_seed(Some(42))
            .with_batch_size(1_000);
        Simulator::new(config).unwrap()
    }

    #[test]
    fn test_parse_trials() {
        assert_eq!(parse_trials("100"), Ok(100));
        assert_eq!(parse_trials(" 7 "), Ok(7));
        for bad in ["0", "-5", "abc", "1.5", ""] {
            assert!(
                matches!(parse_trials(bad), Err(Error::InvalidInput(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(SimConfig::new(0).validate().is_err());
        assert!(SimConfig::new(10).with_batch_size(0).validate().is_err());
        assert!(SimConfig::new(10).with_thresholds(0, 20).validate().is_err());
        assert!(SimConfig::new(10).with_thresholds(13, 22).validate().is_err());
        assert!(SimConfig::new(10).with_thresholds(20, 13).validate().is_err());
        assert!(Simulator::new(SimConfig::new(0)).is_err());
    }

    #[test]
    fn test_batches_cover_all_trials() {
        let config = SimConfig::new(2_500).with_batch_size(1_000);
        assert_eq!(config.batch_count(), 3);
        let lens: Vec<u64> = (0..3).map(|b| config.batch_len(b)).collect();
        assert_eq!(lens, vec![1_000, 1_000, 500]);
        assert_eq!(SimConfig::new(1).batch_count(), 1);
    }

    #[test]
    fn test_stream_seeds_differ() {
        assert_ne!(stream_seed(1, 2, 0), stream_seed(1, 2, 1));
        assert_ne!(stream_seed(1, 2, 0), stream_seed(1, 3, 0));
        assert_ne!(stream_seed(1, 2, 0), stream_seed(2, 2, 0));
        let h17 = Strategy::hit_soft(17).unwrap();
        let s17 = Strategy::stand_soft(17).unwrap();
        assert_ne!(matchup_stream(&h17, &s17), matchup_stream(&s17, &h17));
    }

    #[test]
    fn test_table_shape_and_bounds() {
        let table = seeded(200, 16, 18).run().unwrap();
        assert_eq!(table.len(), 6);
        let rows = table.rows();
        assert_eq!(rows.len(), 6);
        for (label, rates) in &rows {
            assert_eq!(rates.len(), 6, "row {label}");
            for &rate in rates {
                assert!((0.0..=100.0).contains(&rate));
            }
        }
        assert_eq!(table.labels(), vec!["H16", "S16", "H17", "S17", "H18", "S18"]);
        assert!(table.stats(6, 0).is_none());
    }

    #[test]
    fn test_matchup_matches_table_cell() {
        let sim = seeded(3_000, 17, 18);
        let table = sim.run().unwrap();
        let s18 = Strategy::stand_soft(18).unwrap();
        let h17 = Strategy::hit_soft(17).unwrap();
        let stats = sim.matchup(&s18, &h17).unwrap();
        assert_eq!(table.win_rate(&s18, &h17), Some(stats.win_rate()));
        assert_eq!(table.stats(3, 0), Some(&stats));
    }

    #[test]
    fn test_matchup_counts_are_consistent() {
        let sim = seeded(5_000, 13, 20);
        let stats = sim
            .matchup(&"S18".parse().unwrap(), &"H17".parse().unwrap())
            .unwrap();
        assert_eq!(stats.trials, 5_000);
        assert_eq!(stats.player_wins + stats.dealer_wins + stats.ties, 5_000);
        assert!(stats.player_busts <= stats.dealer_wins);
        assert!(stats.win_rate() + stats.loss_rate() + stats.tie_rate() <= 100.02);
    }

    #[test]
    fn test_final_totals_rows_sum_to_all_hands() {
        let totals = seeded(2_000, 15, 17).final_totals().unwrap();
        assert_eq!(totals.columns(), vec!["15", "16", "17", "18", "19", "20", "21", "BUST"]);
        for row in 0..totals.strategies().len() {
            let counts = totals.counts(row).unwrap();
            assert_eq!(counts.iter().sum::<u64>(), 2_000);
            let strategy = totals.strategies()[row];
            let below = (strategy.stand_on_value() - 15) as usize;
            assert!(counts[..below].iter().all(|&c| c == 0));
        }
        let h15 = totals.bust_rate(0).unwrap();
        let s17 = totals.bust_rate(5).unwrap();
        assert!(h15 < s17, "standing earlier should bust less: {h15} vs {s17}");
    }

    #[test]
    fn test_unseeded_run_is_still_valid() {
        let config = SimConfig::new(500).with_thresholds(17, 17);
        let table = Simulator::new(config).unwrap().run().unwrap();
        assert_eq!(table.len(), 2);
        for (_, rates) in table.rows() {
            assert!(rates.iter().all(|r| (0.0..=100.0).contains(r)));
        }
    }
}
