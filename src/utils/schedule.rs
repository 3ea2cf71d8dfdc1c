use crate::api::ScheduleProvider;
use crate::models::{Game, Player};
use crate::utils::week_calculator::WeekWindow;
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Games per NHL team abbreviation (upper case)
pub type TeamSchedules = HashMap<String, Vec<Game>>;

/// Games `team` plays inside the window, compared by calendar date only.
pub fn games_in_window(team: &str, window: &WeekWindow, games: &[Game]) -> Vec<Game> {
    games
        .iter()
        .filter(|g| g.involves(team) && window.contains(g.date))
        .cloned()
        .collect()
}

/// Games on or after `today` that have not finished. Live games today count.
pub fn games_remaining(games: &[Game], today: NaiveDate) -> usize {
    games
        .iter()
        .filter(|g| g.date >= today && !g.status.is_finished())
        .count()
}

/// Distinct days with a game, ascending
pub fn play_days(games: &[Game]) -> Vec<NaiveDate> {
    games
        .iter()
        .map(|g| g.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fetch every distinct team's schedule for the window concurrently.
///
/// A team whose fetch fails gets an empty schedule and a warning.
pub async fn fetch_team_schedules<'a, I>(
    provider: &dyn ScheduleProvider,
    teams: I,
    window: &WeekWindow,
) -> TeamSchedules
where
    I: IntoIterator<Item = &'a str>,
{
    let teams: BTreeSet<String> = teams
        .into_iter()
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    debug!(teams = teams.len(), start = %window.start, end = %window.end, "Fetching team schedules");

    let fetches = teams.iter().map(|team| async move {
        let games = match provider.team_schedule(team, window.start, window.end).await {
            Ok(games) => games,
            Err(e) => {
                warn!(team = %team, error = %e, "Schedule fetch failed, treating as no games");
                Vec::new()
            }
        };
        (team.clone(), games)
    });

    join_all(fetches).await.into_iter().collect()
}

/// Per-player view of the week's schedule
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSchedule {
    pub games_in_window: usize,
    pub games_remaining: usize,
    pub play_days: Vec<NaiveDate>,
}

pub fn player_schedule(
    player: &Player,
    window: &WeekWindow,
    schedules: &TeamSchedules,
    today: NaiveDate,
) -> PlayerSchedule {
    let team = player.team_abbrev.trim().to_ascii_uppercase();
    let games = schedules
        .get(&team)
        .map(|games| games_in_window(&team, window, games))
        .unwrap_or_default();

    PlayerSchedule {
        games_in_window: games.len(),
        games_remaining: games_remaining(&games, today),
        play_days: play_days(&games),
    }
}
