pub mod league_api;
pub mod projections_api;
pub mod schedule_api;

use crate::error::ProviderError;
use crate::models::{Game, League, LeagueId, Matchup, PlayerId, TeamId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Read access to leagues and their matchups
#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn league(&self, league_id: &LeagueId) -> Result<Option<League>, ProviderError>;

    /// The matchup for `week_number`, restricted to `team` when given
    async fn matchup_for_week(
        &self,
        league_id: &LeagueId,
        team: Option<&TeamId>,
        week_number: u32,
    ) -> Result<Option<Matchup>, ProviderError>;
}

/// Games for one NHL team between two dates (inclusive)
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn team_schedule(
        &self,
        team_abbrev: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Game>, ProviderError>;
}

/// Projected fantasy points per player for a single date
#[async_trait]
pub trait ProjectionProvider: Send + Sync {
    async fn daily_projections(
        &self,
        player_ids: &[PlayerId],
        date: NaiveDate,
    ) -> Result<HashMap<PlayerId, f64>, ProviderError>;
}
