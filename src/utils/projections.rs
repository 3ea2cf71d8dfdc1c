use crate::api::ProjectionProvider;
use crate::models::{DailyProjectionRow, Player, PlayerId};
use crate::utils::week_calculator::WeekWindow;
use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Which season-points heuristic stands in for a missing projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackVariant {
    /// Season points / 20
    #[default]
    FullWeek,
    /// Season points / 10
    RemainingWeek,
}

impl FallbackVariant {
    pub fn divisor(&self) -> f64 {
        match self {
            FallbackVariant::FullWeek => 20.0,
            FallbackVariant::RemainingWeek => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionSource {
    /// Sum of daily projection rows
    Projected,
    /// Season points heuristic
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionEstimate {
    pub points: f64,
    pub source: ProjectionSource,
}

impl ProjectionEstimate {
    pub fn is_heuristic(&self) -> bool {
        self.source == ProjectionSource::Heuristic
    }
}

/// Projection rows fetched for each day of a window
#[derive(Debug, Clone, Default)]
pub struct DailyProjections {
    by_date: BTreeMap<NaiveDate, HashMap<PlayerId, f64>>,
    failed_days: Vec<NaiveDate>,
}

impl DailyProjections {
    /// Group already-fetched rows by date
    pub fn from_rows(rows: impl IntoIterator<Item = DailyProjectionRow>) -> Self {
        let mut projections = Self::default();
        for row in rows {
            projections
                .by_date
                .entry(row.date)
                .or_default()
                .insert(row.player_id, row.projected_points);
        }
        projections
    }

    pub fn insert_day(&mut self, date: NaiveDate, rows: HashMap<PlayerId, f64>) {
        self.by_date.insert(date, rows);
    }

    pub fn mark_failed(&mut self, date: NaiveDate) {
        self.failed_days.push(date);
        self.failed_days.sort();
    }

    pub fn failed_days(&self) -> &[NaiveDate] {
        &self.failed_days
    }

    pub fn points_on(&self, date: NaiveDate, player_id: PlayerId) -> Option<f64> {
        self.by_date.get(&date)?.get(&player_id).copied()
    }
}

/// Days still to be projected: from the later of today and the week start
/// through the week end. Empty once the week is over.
pub fn projection_days(window: &WeekWindow, today: NaiveDate) -> Vec<NaiveDate> {
    window.days().filter(|day| *day >= today).collect()
}

/// One projection fetch per day, all issued at once. A failed day is logged
/// and recorded; it never cancels the other days.
pub async fn fetch_daily_projections(
    provider: &dyn ProjectionProvider,
    player_ids: &[PlayerId],
    days: &[NaiveDate],
) -> DailyProjections {
    let fetches = days.iter().map(|&day| async move {
        (day, provider.daily_projections(player_ids, day).await)
    });

    let mut projections = DailyProjections::default();
    for (day, result) in join_all(fetches).await {
        match result {
            Ok(rows) => {
                debug!(date = %day, rows = rows.len(), "Loaded daily projections");
                projections.insert_day(day, rows);
            }
            Err(e) => {
                warn!(date = %day, error = %e, "Projection fetch failed, day contributes zero");
                projections.mark_failed(day);
            }
        }
    }
    projections
}

/// Sum of a player's projected points over `days`; days without a row count
/// as zero. `None` when no day in `days` has a row for the player.
pub fn sum_projection(
    player_id: PlayerId,
    days: &[NaiveDate],
    projections: &DailyProjections,
) -> Option<f64> {
    let mut rows = days
        .iter()
        .filter_map(|&day| projections.points_on(day, player_id))
        .peekable();
    rows.peek()?;
    Some(rows.sum())
}

pub fn heuristic_projection(player: &Player, variant: FallbackVariant) -> ProjectionEstimate {
    ProjectionEstimate {
        points: player.stats.points as f64 / variant.divisor(),
        source: ProjectionSource::Heuristic,
    }
}

/// Weekly projection for one player over `days` (see [`projection_days`]).
/// Falls back to the season-points heuristic when there are no rows or the
/// rows sum to exactly zero; any other sum, negative included, is kept.
pub fn weekly_projection(
    player: &Player,
    days: &[NaiveDate],
    projections: &DailyProjections,
    variant: FallbackVariant,
) -> ProjectionEstimate {
    match sum_projection(player.id, days, projections) {
        Some(points) if points != 0.0 => ProjectionEstimate {
            points,
            source: ProjectionSource::Projected,
        },
        _ => heuristic_projection(player, variant),
    }
}
