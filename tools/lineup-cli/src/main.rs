//! DFS Lineup CLI
//!
//! Pulls Sleeper projections and a DraftKings NFL classic slate (or reads
//! saved copies from disk), solves for the highest-projected legal lineup and
//! prints it as a table or JSON.

mod display;
mod fetcher;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use lineup_optimizer::{LineupOptimizer, LineupResult, OptimizerError};
use player_pool::Position;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fetcher::{read_feed_file, FeedFetcher};
use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "lineup-cli")]
#[command(about = "Build the highest-projected DraftKings NFL classic lineup for a slate")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// NFL season used for projections
    #[arg(long)]
    season: Option<u32>,

    /// NFL week used for projections
    #[arg(long)]
    week: Option<u32>,

    /// DraftKings draft group id of the slate
    #[arg(long)]
    draft_group: Option<u64>,

    /// Read the projection feed from a file instead of the network
    #[arg(long)]
    projections_file: Option<PathBuf>,

    /// Read the slate feed from a file instead of the network
    #[arg(long)]
    slate_file: Option<PathBuf>,

    /// Player id that must be in the lineup (repeatable)
    #[arg(long = "include", value_name = "PLAYER_ID")]
    include: Vec<String>,

    /// Player id that must not be in the lineup (repeatable)
    #[arg(long = "exclude", value_name = "PLAYER_ID")]
    exclude: Vec<String>,

    /// Position the FLEX slot must hold (RB, WR or TE)
    #[arg(long, value_name = "POSITION")]
    flex: Option<Position>,

    /// Positions that must be stacked with the QB, e.g. WR,TE
    #[arg(long, value_delimiter = ',', value_name = "POSITIONS")]
    stack: Vec<Position>,

    /// Require an RB from the same team as the DST
    #[arg(long)]
    dst_rb_stack: bool,

    /// Forbid offensive players facing the rostered DST
    #[arg(long)]
    no_opposing_dst: bool,

    /// Solver time limit in seconds
    #[arg(long)]
    solver_timeout: Option<u64>,

    /// Print the lineup as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Command-line flags win over every settings layer
    fn apply(&self, settings: &mut Settings) {
        let feeds = &mut settings.feeds;
        if let Some(season) = self.season {
            feeds.season = season;
        }
        if let Some(week) = self.week {
            feeds.week = week;
        }
        if let Some(draft_group) = self.draft_group {
            feeds.draft_group_id = Some(draft_group);
        }
        if let Some(secs) = self.solver_timeout {
            settings.solver.timeout_secs = secs;
        }

        let optimization = &mut settings.optimization;
        optimization.forced_include.extend(self.include.iter().cloned());
        optimization.forced_exclude.extend(self.exclude.iter().cloned());
        if self.flex.is_some() {
            optimization.flex_position_preference = self.flex;
        }
        optimization.qb_stack_positions.extend(self.stack.iter().copied());
        optimization.require_dst_rb_stack |= self.dst_rb_stack;
        optimization.exclude_opponents_of_starting_dst |= self.no_opposing_dst;

        if settings.resolver.draft_group_id.is_none() {
            settings.resolver.draft_group_id = feeds.draft_group_id;
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn load_feeds(cli: &Cli, settings: &Settings) -> Result<(String, String)> {
    let fetcher = FeedFetcher::new(settings.feeds.clone())?;

    let projections = match &cli.projections_file {
        Some(path) => read_feed_file(path).await?,
        None => fetcher.fetch_projections().await?,
    };
    let slate = match &cli.slate_file {
        Some(path) => read_feed_file(path).await?,
        None => fetcher.fetch_slate().await?,
    };

    Ok((projections, slate))
}

/// Run `job` on a blocking thread; running out of time fails the run
async fn run_with_deadline<T, F>(limit: Duration, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> lineup_optimizer::Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(job);
    let joined = tokio::time::timeout(limit, task)
        .await
        .map_err(|_| OptimizerError::Solver(format!("no solution within {limit:?}")))?;

    Ok(joined.context("Optimizer task panicked")??)
}

async fn solve(settings: &Settings, projections: String, slate: String) -> Result<LineupResult> {
    let optimizer = LineupOptimizer::new(settings.optimization.clone(), settings.resolver.clone());
    let limit = Duration::from_secs(settings.solver.timeout_secs);

    run_with_deadline(limit, move || optimizer.optimize_feeds(&projections, &slate)).await
}

/// Drive `future` on a fresh runtime and tear it down without joining
/// blocking threads, so an abandoned solve cannot hold the process open
fn block_on_detached<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

fn main() -> Result<()> {
    block_on_detached(run())?
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    cli.apply(&mut settings);
    init_logging(&settings.logging.level);

    info!("🏈 Starting lineup optimization");
    info!("Loaded settings: {:?}", settings);

    let (projections, slate) = load_feeds(&cli, &settings).await?;

    match solve(&settings, projections, slate).await {
        Ok(result) => {
            let salary_cap = settings.optimization.rules.salary_cap;
            if cli.json {
                println!("{}", display::roster_json(&result, salary_cap)?);
            } else {
                display::print_roster(&result, salary_cap);
            }
            Ok(())
        }
        Err(e) => {
            error!("Optimization failed: {:#}", e);
            if e.downcast_ref::<OptimizerError>().is_some_and(OptimizerError::is_infeasible) {
                let hint = "No legal lineup exists; relax the options listed above.";
                eprintln!("{}", hint.yellow());
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "lineup-cli",
            "--week",
            "5",
            "--draft-group",
            "98582",
            "--include",
            "829",
            "--include",
            "11370",
            "--exclude",
            "1001",
            "--flex",
            "te",
            "--stack",
            "WR,TE",
            "--no-opposing-dst",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.feeds.week, 5);
        assert_eq!(settings.feeds.season, 2023);
        assert_eq!(settings.feeds.draft_group_id, Some(98582));
        assert_eq!(settings.resolver.draft_group_id, Some(98582));

        let optimization = &settings.optimization;
        assert_eq!(optimization.forced_include.len(), 2);
        assert!(optimization.forced_exclude.contains("1001"));
        assert_eq!(optimization.flex_position_preference, Some(Position::TE));
        assert_eq!(
            optimization.qb_stack_positions.iter().copied().collect::<Vec<_>>(),
            vec![Position::WR, Position::TE]
        );
        assert!(optimization.exclude_opponents_of_starting_dst);
        assert!(!optimization.require_dst_rb_stack);
    }

    #[test]
    fn test_flags_keep_file_settings_when_absent() {
        let mut settings = Settings::default();
        settings.optimization.require_dst_rb_stack = true;
        settings.optimization.flex_position_preference = Some(Position::RB);
        settings.solver.timeout_secs = 10;

        Cli::parse_from(["lineup-cli"]).apply(&mut settings);

        assert!(settings.optimization.require_dst_rb_stack);
        assert_eq!(settings.optimization.flex_position_preference, Some(Position::RB));
        assert_eq!(settings.solver.timeout_secs, 10);
    }

    #[test]
    fn test_bad_flex_position_is_rejected() {
        assert!(Cli::try_parse_from(["lineup-cli", "--flex", "K"]).is_err());
    }

    #[test]
    fn test_timed_out_solve_does_not_outlive_the_deadline() {
        let started = Instant::now();
        let result = block_on_detached(run_with_deadline(Duration::from_millis(200), || {
            std::thread::sleep(Duration::from_secs(4));
            Ok(())
        }))
        .unwrap();
        let elapsed = started.elapsed();

        let err = result.unwrap_err();
        assert!(
            matches!(err.downcast_ref::<OptimizerError>(), Some(OptimizerError::Solver(_))),
            "{err}"
        );
        assert!(elapsed < Duration::from_secs(2), "run lasted {elapsed:?}");
    }

    #[test]
    fn test_solve_within_deadline_returns_its_value() {
        let result = block_on_detached(run_with_deadline(Duration::from_secs(5), || Ok(7)));
        assert_eq!(result.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_solve_from_saved_feeds() {
        let projections = r#"[
            { "player": { "first_name": "Jalen", "last_name": "Hurts", "position": "QB" },
              "stats": { "pts_ppr": 24.1 } }
        ]"#;
        let slate = r#"{ "draftables": [] }"#;

        let err = solve(&Settings::default(), projections.to_string(), slate.to_string())
            .await
            .unwrap_err();
        let err = err.downcast::<OptimizerError>().unwrap();
        assert!(err.is_infeasible(), "{err}");
    }
}
