use clap::Subcommand;
use wodtimer_core::storage::Database;

use super::CliResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate statistics over all completed workouts
    Summary,
    /// Most recent completed workouts
    Recent {
        /// Maximum number of rows
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;
    match action {
        StatsAction::Summary => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Recent { limit } => {
            let records = db.recent_results(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
