use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use fantasy_week::api::league_api::{InMemoryLeagueStore, NoLeagueStore, RestLeagueStore};
use fantasy_week::api::projections_api::{NoProjections, RpcProjectionClient};
use fantasy_week::api::schedule_api::NhlScheduleClient;
use fantasy_week::clock::{Clock, FixedClock, SystemClock};
use fantasy_week::config::Settings;
use fantasy_week::data::{load_from_cache, load_players, save_maximizer_to_csv, save_to_cache};
use fantasy_week::dates::{format_date, parse_date};
use fantasy_week::error::ProviderError;
use fantasy_week::{
    DraftStatus, Game, League, LeagueId, LeagueStore, ProjectionProvider, ScheduleProvider,
    TeamId, WeekPlanner,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cli", about = "Fantasy hockey week windows and schedule maximizer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the resolved week window, current week and available weeks
    Week(LeagueArgs),
    /// Rank free agents by games remaining this week
    Maximizer {
        #[command(flatten)]
        league: LeagueArgs,
        /// JSON array of players to rank
        #[arg(long)]
        players: PathBuf,
        /// JSON array of the team's roster, for the projected matchup score
        #[arg(long)]
        roster: Option<PathBuf>,
        /// Only print the top N players
        #[arg(long, default_value_t = 25)]
        top: usize,
        /// Write the full ranking to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Args)]
struct LeagueArgs {
    /// League id in the backend
    #[arg(long, default_value = "local")]
    league: String,
    /// Fantasy team id, used to pick that team's matchup
    #[arg(long)]
    team: Option<String>,
    /// Draft completion instant (RFC 3339); skips the league lookup
    #[arg(long)]
    draft_completed_at: Option<DateTime<Utc>>,
    /// Week number; defaults to the current week
    #[arg(long)]
    week: Option<u32>,
    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got {:?}", raw))
}

/// Team schedules read from and written to the cache directory
struct CachedSchedules {
    inner: NhlScheduleClient,
    dir: PathBuf,
}

#[async_trait]
impl ScheduleProvider for CachedSchedules {
    async fn team_schedule(
        &self,
        team_abbrev: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Game>, ProviderError> {
        let cache_file = self.dir.join(format!(
            "schedule_{}_{}_{}.json",
            team_abbrev,
            format_date(start),
            format_date(end)
        ));
        if cache_file.exists() {
            info!(file = %cache_file.display(), "Loading schedule from cache");
            return load_from_cache(&cache_file)
                .map_err(|e| ProviderError::Unavailable(e.to_string()));
        }

        let games = self.inner.team_schedule(team_abbrev, start, end).await?;
        if let Err(e) = save_to_cache(&games, &cache_file) {
            warn!(file = %cache_file.display(), error = %e, "Failed to cache schedule");
        }
        Ok(games)
    }
}

fn build_planner(settings: &Settings, args: &LeagueArgs) -> WeekPlanner {
    let clock: Arc<dyn Clock> = match args.date {
        Some(date) => Arc::new(FixedClock::at_date(date, settings.timezone)),
        None => Arc::new(SystemClock::new(settings.timezone)),
    };

    let leagues: Arc<dyn LeagueStore> = match (args.draft_completed_at, settings.baas()) {
        (Some(completed_at), _) => Arc::new(InMemoryLeagueStore::new().with_league(League {
            id: LeagueId(args.league.clone()),
            name: args.league.clone(),
            draft_status: DraftStatus::Completed,
            draft_completed_at: Some(completed_at),
        })),
        (None, Some((url, key))) => Arc::new(RestLeagueStore::new(url, key.to_string())),
        (None, None) => Arc::new(NoLeagueStore),
    };

    let projections: Arc<dyn ProjectionProvider> = match settings.baas() {
        Some((url, key)) => Arc::new(RpcProjectionClient::new(url, key.to_string())),
        None => Arc::new(NoProjections),
    };

    let client = NhlScheduleClient::new(settings.nhl_api_base_url.clone(), settings.timezone);
    let schedules: Arc<dyn ScheduleProvider> = if settings.use_cache {
        Arc::new(CachedSchedules {
            inner: client,
            dir: settings.cache_dir.clone(),
        })
    } else {
        Arc::new(client)
    };

    WeekPlanner::new(settings, clock, leagues, schedules, projections)
}

async fn run_week(settings: &Settings, args: &LeagueArgs) -> Result<()> {
    let planner = build_planner(settings, args);
    let team = args.team.clone().map(TeamId);

    let report = planner
        .week_report(&LeagueId(args.league.clone()), team.as_ref(), args.week, &[], &[])
        .await
        .context("Failed to resolve week window")?;

    println!("Today: {}", format_date(report.today));
    println!(
        "Week {}: {} to {} ({:?})",
        report.window.week_number,
        format_date(report.window.start),
        format_date(report.window.end),
        report.window.source
    );
    println!("Current week: {}", report.current_week);

    if !report.available_weeks.is_empty() {
        let weeks: Vec<String> = report.available_weeks.iter().map(|w| w.to_string()).collect();
        println!("Available weeks: {}", weeks.join(", "));
    }

    Ok(())
}

async fn run_maximizer(
    settings: &Settings,
    args: &LeagueArgs,
    players_file: &Path,
    roster_file: Option<&Path>,
    top: usize,
    csv: Option<&Path>,
) -> Result<()> {
    let planner = build_planner(settings, args);
    let players = load_players(players_file)?;
    let roster = match roster_file {
        Some(path) => load_players(path)?,
        None => Vec::new(),
    };
    info!(players = players.len(), roster = roster.len(), "Loaded players");

    let team = args.team.clone().map(TeamId);
    let report = planner
        .week_report(
            &LeagueId(args.league.clone()),
            team.as_ref(),
            args.week,
            &players,
            &roster,
        )
        .await
        .context("Failed to build week report")?;

    println!(
        "SCHEDULE MAXIMIZER - Week {} ({} to {})\n",
        report.window.week_number,
        format_date(report.window.start),
        format_date(report.window.end)
    );
    if report.maximizer.is_empty() {
        println!("No players to rank.");
    } else {
        for (i, entry) in report.maximizer.iter().take(top).enumerate() {
            println!("{}. {}", i + 1, entry.format());
        }
    }

    if !roster.is_empty() {
        println!(
            "\nRoster projection: {:.1} pts ({} of {} players estimated from season points)",
            report.roster_projection.total_points,
            report.roster_projection.heuristic_players,
            report.roster_projection.players
        );
    }

    if let Some(path) = csv {
        save_maximizer_to_csv(&report.maximizer, path)?;
        println!("\nSaved ranking to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("Invalid configuration")?;

    match &cli.command {
        Command::Week(args) => run_week(&settings, args).await,
        Command::Maximizer {
            league,
            players,
            roster,
            top,
            csv,
        } => {
            run_maximizer(&settings, league, players, roster.as_deref(), *top, csv.as_deref()).await
        },
    }
}
