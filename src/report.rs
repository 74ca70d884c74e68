//! Table rendering. Everything here returns a `String`; writing it anywhere
//! is the caller's job.

use crate::engine::CellStats;
use crate::simulation::{StrategyTable, TotalsTable};
use crate::strategy::Strategy;

const CORNER: &str = "P-Strategy";

/// Header row of dealer labels, then one row per player strategy.
pub fn win_rates_csv(table: &StrategyTable) -> String {
    let mut output = String::new();
    output.push_str(CORNER);
    for label in table.labels() {
        output.push(',');
        output.push_str(&label);
    }
    output.push('\n');

    for (label, rates) in table.rows() {
        output.push_str(&label);
        for rate in rates {
            output.push_str(&format!(",{:.2}", rate));
        }
        output.push('\n');
    }
    output
}

pub fn totals_csv(table: &TotalsTable) -> String {
    let mut output = String::from("Strategy");
    for column in table.columns() {
        output.push(',');
        output.push_str(&column);
    }
    output.push('\n');

    for (label, rates) in table.rows() {
        output.push_str(&label);
        for rate in rates {
            output.push_str(&format!(",{:.2}", rate));
        }
        output.push('\n');
    }
    output
}

fn markdown_table(corner: &str, columns: &[String], rows: &[(String, Vec<f64>)]) -> String {
    let mut output = String::new();
    output.push_str(&format!("| {} | ", corner));
    output.push_str(&columns.join(" | "));
    output.push_str(" |\n");
    output.push_str(&format!("|{}|", "-".repeat(corner.len() + 2)));
    output.push_str(&vec!["---"; columns.len()].join("|"));
    output.push_str("|\n");

    for (label, rates) in rows {
        output.push_str(&format!("| **{}** |", label));
        for rate in rates {
            output.push_str(&format!(" {:.2} |", rate));
        }
        output.push('\n');
    }
    output
}

pub fn format_win_rates(table: &StrategyTable) -> String {
    let mut output = String::new();
    output.push_str("## Player Win % (rows: player, columns: dealer)\n\n");
    output.push_str(&markdown_table(CORNER, &table.labels(), &table.rows()));
    output.push('\n');
    output.push_str("## Legend\n\n");
    output.push_str("- **H{n}** = stand on n, hit a soft n\n");
    output.push_str("- **S{n}** = stand on n, soft or hard\n");
    output.push_str("- Ties count as non-wins\n");
    output
}

pub fn format_totals(table: &TotalsTable) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "## Final Totals % ({} hands per strategy)\n\n",
        table.trials()
    ));
    output.push_str(&markdown_table("Strategy", &table.columns(), &table.rows()));
    output
}

pub fn format_matchup(player: &Strategy, dealer: &Strategy, stats: &CellStats) -> String {
    format!(
        "{} vs {} over {} trials\n\
         {:<14} {:>8.2}%\n\
         {:<14} {:>8.2}%\n\
         {:<14} {:>8.2}%\n\
         {:<14} {:>8}\n\
         {:<14} {:>8}\n",
        player,
        dealer,
        stats.trials,
        "Player wins",
        stats.win_rate(),
        "Dealer wins",
        stats.loss_rate(),
        "Ties",
        stats.tie_rate(),
        "Player busts",
        stats.player_busts,
        "Dealer busts",
        stats.dealer_busts
    )
}
