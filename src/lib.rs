pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use api::*;
pub use models::*;
pub use utils::*;

use chrono::NaiveDate;
use chrono_tz::Tz;
use clock::Clock;
use config::Settings;
use error::WeekError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utils::maximizer::{rank_schedule_maximizer, MaximizerEntry};
use utils::projections::{
    fetch_daily_projections, projection_days, weekly_projection, DailyProjections,
    FallbackVariant, ProjectionEstimate,
};
use utils::request_gate::{RequestGate, RequestKey};
use utils::schedule::{fetch_team_schedules, player_schedule, TeamSchedules};
use utils::week_calculator::{calendar_week, WeekCalculator, WeekWindow};

/// Projected score for one side of a matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProjection {
    pub total_points: f64,
    pub players: usize,
    /// Players whose estimate came from the season-points heuristic
    pub heuristic_players: usize,
}

/// Everything a page needs for one week, computed against a single window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekReport {
    pub window: WeekWindow,
    pub today: NaiveDate,
    pub current_week: u32,
    pub available_weeks: Vec<u32>,
    pub maximizer: Vec<MaximizerEntry>,
    pub roster_projection: TeamProjection,
}

/// Resolves the week window and runs the schedule/projection aggregation
/// against the configured collaborators.
pub struct WeekPlanner {
    clock: Arc<dyn Clock>,
    leagues: Arc<dyn LeagueStore>,
    schedules: Arc<dyn ScheduleProvider>,
    projections: Arc<dyn ProjectionProvider>,
    tz: Tz,
    season_end: Option<NaiveDate>,
    fallback: FallbackVariant,
}

impl WeekPlanner {
    pub fn new(
        settings: &Settings,
        clock: Arc<dyn Clock>,
        leagues: Arc<dyn LeagueStore>,
        schedules: Arc<dyn ScheduleProvider>,
        projections: Arc<dyn ProjectionProvider>,
    ) -> Self {
        Self {
            clock,
            leagues,
            schedules,
            projections,
            tz: settings.timezone,
            season_end: settings.season_end,
            fallback: settings.fallback_variant,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Resolve the window for `week` (or the current week):
    /// stored matchup, then the league's draft calendar, then the ISO week.
    pub async fn resolve_window(
        &self,
        league_id: &LeagueId,
        team: Option<&TeamId>,
        week: Option<u32>,
    ) -> Result<WeekWindow, WeekError> {
        Ok(self.resolve(league_id, team, week, self.today()).await?.0)
    }

    async fn resolve(
        &self,
        league_id: &LeagueId,
        team: Option<&TeamId>,
        week: Option<u32>,
        today: NaiveDate,
    ) -> Result<(WeekWindow, Option<WeekCalculator>), WeekError> {
        if week == Some(0) {
            return Err(WeekError::InvalidWeek(0));
        }

        let league = match self.leagues.league(league_id).await {
            Ok(Some(league)) => Some(league),
            Ok(None) => return Err(WeekError::LeagueNotFound(league_id.clone())),
            Err(e) => {
                warn!(league = %league_id, error = %e, "League lookup failed");
                None
            }
        };

        let calculator =
            league.and_then(|league| match WeekCalculator::from_league(&league, self.tz) {
                Ok(calculator) => Some(calculator),
                Err(e) => {
                    warn!(league = %league_id, error = %e, "Cannot derive league weeks");
                    None
                }
            });

        let week_number = week.or_else(|| calculator.map(|c| c.current_week_number(today)));
        if let Some(week_number) = week_number {
            match self.leagues.matchup_for_week(league_id, team, week_number).await {
                Ok(Some(matchup)) => return Ok((WeekWindow::from_matchup(&matchup), calculator)),
                Ok(None) => {}
                Err(e) => {
                    warn!(league = %league_id, week = week_number, error = %e, "Matchup lookup failed")
                }
            }
        }

        let window = match (calculator, week_number) {
            (Some(calculator), Some(week_number)) => calculator.window(week_number)?,
            _ => {
                let fallback = calendar_week(today);
                warn!(
                    league = %league_id,
                    requested_week = ?week,
                    calendar_week = fallback.week_number,
                    "Falling back to the calendar week"
                );
                fallback
            }
        };
        Ok((window, calculator))
    }

    /// Week numbers a league can display, up to the configured season end
    pub fn available_weeks(&self, calculator: &WeekCalculator) -> Vec<u32> {
        let season_end = self
            .season_end
            .unwrap_or_else(|| calculator.default_season_end());
        calculator.available_weeks(season_end).collect()
    }

    async fn gather(
        &self,
        window: &WeekWindow,
        players: &[&Player],
        today: NaiveDate,
    ) -> (TeamSchedules, DailyProjections) {
        let teams = players.iter().map(|p| p.team_abbrev.as_str());
        let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        let days = projection_days(window, today);

        let (schedules, projections) = futures::join!(
            fetch_team_schedules(self.schedules.as_ref(), teams, window),
            fetch_daily_projections(self.projections.as_ref(), &ids, &days),
        );
        if !projections.failed_days().is_empty() {
            warn!(
                week = window.week_number,
                failed = projections.failed_days().len(),
                days = days.len(),
                "Some projection days failed to load"
            );
        }
        (schedules, projections)
    }

    fn entries(
        &self,
        window: &WeekWindow,
        players: &[Player],
        schedules: &TeamSchedules,
        projections: &DailyProjections,
        today: NaiveDate,
    ) -> Vec<MaximizerEntry> {
        let days = projection_days(window, today);
        let mut entries: Vec<MaximizerEntry> = players
            .iter()
            .map(|player| {
                MaximizerEntry::new(
                    player,
                    player_schedule(player, window, schedules, today),
                    weekly_projection(player, &days, projections, self.fallback),
                )
            })
            .collect();
        rank_schedule_maximizer(&mut entries);
        entries
    }

    fn sum_team(
        &self,
        roster: &[Player],
        days: &[NaiveDate],
        projections: &DailyProjections,
    ) -> TeamProjection {
        let estimates: Vec<ProjectionEstimate> = roster
            .iter()
            .map(|player| weekly_projection(player, days, projections, self.fallback))
            .collect();
        TeamProjection {
            total_points: estimates.iter().map(|e| e.points).sum(),
            players: estimates.len(),
            heuristic_players: estimates.iter().filter(|e| e.is_heuristic()).count(),
        }
    }

    /// Rank `players` by games remaining in `window`, then season points.
    pub async fn schedule_maximizer(
        &self,
        window: &WeekWindow,
        players: &[Player],
    ) -> Vec<MaximizerEntry> {
        let today = self.today();
        let refs: Vec<&Player> = players.iter().collect();
        let (schedules, projections) = self.gather(window, &refs, today).await;
        self.entries(window, players, &schedules, &projections, today)
    }

    /// Projected points for a roster over the rest of `window`
    pub async fn team_projection(&self, window: &WeekWindow, roster: &[Player]) -> TeamProjection {
        let ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();
        let days = projection_days(window, self.today());
        let projections = fetch_daily_projections(self.projections.as_ref(), &ids, &days).await;
        self.sum_team(roster, &days, &projections)
    }

    /// Resolve the window once and compute every derived view against it.
    pub async fn week_report(
        &self,
        league_id: &LeagueId,
        team: Option<&TeamId>,
        week: Option<u32>,
        free_agents: &[Player],
        roster: &[Player],
    ) -> Result<WeekReport, WeekError> {
        let today = self.today();
        let (window, calculator) = self.resolve(league_id, team, week, today).await?;
        info!(
            league = %league_id,
            week = window.week_number,
            start = %window.start,
            end = %window.end,
            source = ?window.source,
            "Resolved week window"
        );

        let everyone: Vec<&Player> = free_agents.iter().chain(roster.iter()).collect();
        let (schedules, projections) = self.gather(&window, &everyone, today).await;

        Ok(WeekReport {
            window,
            today,
            current_week: calculator
                .map(|c| c.current_week_number(today))
                .unwrap_or(window.week_number),
            available_weeks: calculator
                .map(|c| self.available_weeks(&c))
                .unwrap_or_default(),
            maximizer: self.entries(&window, free_agents, &schedules, &projections, today),
            roster_projection: self.sum_team(
                roster,
                &projection_days(&window, today),
                &projections,
            ),
        })
    }

    /// Compute a report for `league_id`/`week` and publish it through `gate`.
    /// Returns `Ok(false)` when a newer request started before this one
    /// finished, in which case the result was dropped.
    pub async fn refresh_report(
        &self,
        gate: &RequestGate<WeekReport>,
        league_id: &LeagueId,
        team: Option<&TeamId>,
        week: Option<u32>,
        free_agents: &[Player],
        roster: &[Player],
    ) -> Result<bool, WeekError> {
        let ticket = gate
            .begin(RequestKey {
                league_id: league_id.clone(),
                week_number: week,
            })
            .await;
        let report = self
            .week_report(league_id, team, week, free_agents, roster)
            .await?;
        Ok(gate.publish(&ticket, report).await)
    }
}
