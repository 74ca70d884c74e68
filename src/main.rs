//! Blackjack Strategy Simulator
//! Win-rate table for every player strategy against every dealer strategy.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use blackjack_sim::report::{
    format_matchup, format_totals, format_win_rates, totals_csv, win_rates_csv,
};
use blackjack_sim::simulation::{BATCH_SIZE, DEFAULT_MAX_THRESHOLD, DEFAULT_MIN_THRESHOLD};
use blackjack_sim::{parse_trials, SimConfig, Simulator, Strategy};

#[derive(Parser, Debug)]
#[command(
    name = "blackjack-sim",
    version,
    about = "Simulate threshold blackjack strategies against each other"
)]
struct Args {
    /// Number of hands to simulate per strategy pair
    #[arg(allow_negative_numbers = true)]
    trials: String,

    /// Lowest stand-on value in the strategy space
    #[arg(long, default_value_t = DEFAULT_MIN_THRESHOLD)]
    min: u8,

    /// Highest stand-on value in the strategy space
    #[arg(long, default_value_t = DEFAULT_MAX_THRESHOLD)]
    max: u8,

    /// Seed for reproducible runs (system entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Trials per worker batch
    #[arg(long, default_value_t = BATCH_SIZE)]
    batch_size: u32,

    /// Worker threads (rayon default when omitted)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Where to write the win-rate table
    #[arg(short, long, default_value = "output.csv")]
    output: PathBuf,

    /// Also write the final-total distribution to this file
    #[arg(long)]
    totals: Option<PathBuf>,

    /// Player strategy for a single matchup, e.g. S18
    #[arg(long, requires = "dealer")]
    player: Option<String>,

    /// Dealer strategy for a single matchup, e.g. H17
    #[arg(long, requires = "player")]
    dealer: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let trials = parse_trials(&args.trials)?;
    let config = SimConfig::new(trials)
        .with_thresholds(args.min, args.max)
        .with_seed(args.seed)
        .with_batch_size(args.batch_size);
    let simulator = Simulator::new(config)?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }
    info!("Starting Monte Carlo simulation with {} threads", rayon::current_num_threads());

    if let (Some(player), Some(dealer)) = (&args.player, &args.dealer) {
        let player: Strategy = player.parse()?;
        let dealer: Strategy = dealer.parse()?;
        let stats = simulator.matchup(&player, &dealer)?;
        println!("{}", format_matchup(&player, &dealer, &stats));
        return Ok(());
    }

    let table = simulator.run()?;
    println!();
    println!("{}", format_win_rates(&table));
    fs::write(&args.output, win_rates_csv(&table)).map_err(|e| write_error(&args.output, e))?;
    info!("Win rates saved to: {}", args.output.display());

    if let Some(path) = &args.totals {
        let totals = simulator.final_totals()?;
        println!("{}", format_totals(&totals));
        fs::write(path, totals_csv(&totals)).map_err(|e| write_error(path, e))?;
        info!("Final totals saved to: {}", path.display());
    }

    Ok(())
}

fn write_error(path: &std::path::Path, e: std::io::Error) -> Box<dyn std::error::Error> {
    format!("Failed to write {}: {}", path.display(), e).into()
}
