// League statistics entry point.
//
// Batch pipeline:
// 1. Initialize tracing (stderr)
// 2. Load config (path from argv[1], default config/league.toml)
// 3. Load event log + schedule manifest (fatal if either is missing)
// 4. Regular-season standings, player stats, efficiency
// 5. Playoff standings + series tables when the manifest has playoff games
// 6. Write all tables under the configured output directory

use dmhl_stats::config::Config;
use dmhl_stats::events::EventLog;
use dmhl_stats::output;
use dmhl_stats::schedule::{GameType, Schedule};
use dmhl_stats::stats::{efficiency, gwg, players, playoffs, standings};

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/league.toml".to_string());
    let config = Config::load(Path::new(&config_path))
        .with_context(|| format!("failed to load configuration from {config_path}"))?;
    info!(
        "{} (division {}), season starting {}",
        config.league.name, config.league.division, config.league.season_start_year
    );

    let log = EventLog::load(Path::new(&config.data.details))
        .context("failed to load event log")?;
    let schedule = Schedule::load(Path::new(&config.data.manifest))
        .context("failed to load schedule manifest")?;
    info!(
        "loaded {} events across {} scheduled games",
        log.len(),
        schedule.len()
    );

    let out_dir = PathBuf::from(&config.output.dir);

    // Regular-season tables are computed over the regular-season slice of
    // the log so late-season playoff games never leak into them.
    let regular = schedule.of_type(GameType::RegularSeason);
    let regular_ids = regular.game_ids();
    let regular_log = EventLog::new(log.in_games(&regular_ids).cloned().collect());

    let table = standings::compute_standings(&regular_log, Some(&regular));
    output::write_standings(&out_dir.join("standings.csv"), &table)?;

    let winners = gwg::resolve_gwg(&regular_log);
    let leaderboard = players::compute_player_stats(&regular_log, &winners);
    output::write_player_stats(&out_dir.join("player_stats.csv"), &leaderboard)?;

    let team_efficiency = efficiency::compute_efficiency(&regular_log, &table);
    output::write_efficiency(&out_dir.join("efficiency.csv"), &team_efficiency)?;

    let playoff = schedule.of_type(GameType::Playoffs);
    if playoff.is_empty() {
        info!("no playoff games in the manifest; skipping playoff tables");
    } else {
        let (ranked, series) = playoffs::compute_playoff_series(&log, &playoff);
        output::write_standings(&out_dir.join("playoff_standings.csv"), &ranked)?;
        output::write_playoff_series(&out_dir.join("playoff_series.csv"), &series)?;
        if let Some(team) = playoffs::lucky_loser(&ranked, &series) {
            info!("lucky loser (best-ranked trailing team): {team}");
        }
    }

    info!("all tables written to {}", out_dir.display());
    Ok(())
}

/// Initialize tracing to stderr so CSV output and diagnostics never mix.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dmhl_stats=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
