use crate::models::{Player, PlayerId, Position};
use crate::utils::projections::{ProjectionEstimate, ProjectionSource};
use crate::utils::schedule::PlayerSchedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the schedule maximizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaximizerEntry {
    pub player_id: PlayerId,
    pub full_name: String,
    pub position: Position,
    pub team_abbrev: String,
    pub season_points: u32,
    pub games_in_window: usize,
    pub games_remaining: usize,
    pub play_days: Vec<NaiveDate>,
    pub projection: ProjectionEstimate,
}

impl MaximizerEntry {
    pub fn new(player: &Player, schedule: PlayerSchedule, projection: ProjectionEstimate) -> Self {
        Self {
            player_id: player.id,
            full_name: player.full_name.clone(),
            position: player.position,
            team_abbrev: player.team_abbrev.to_ascii_uppercase(),
            season_points: player.stats.points,
            games_in_window: schedule.games_in_window,
            games_remaining: schedule.games_remaining,
            play_days: schedule.play_days,
            projection,
        }
    }

    /// Format the entry as a readable line
    pub fn format(&self) -> String {
        let tag = match self.projection.source {
            ProjectionSource::Projected => "proj",
            ProjectionSource::Heuristic => "est",
        };
        format!(
            "{} ({:?}, {}) | Games: {} left / {} this week | Season pts: {} | Week {}: {:.1}",
            self.full_name,
            self.position,
            self.team_abbrev,
            self.games_remaining,
            self.games_in_window,
            self.season_points,
            tag,
            self.projection.points
        )
    }
}

/// Games remaining descending, then season points descending.
pub fn compare_entries(a: &MaximizerEntry, b: &MaximizerEntry) -> Ordering {
    b.games_remaining
        .cmp(&a.games_remaining)
        .then_with(|| b.season_points.cmp(&a.season_points))
}

/// Stable sort, so full ties keep their input order.
pub fn rank_schedule_maximizer(entries: &mut [MaximizerEntry]) {
    entries.sort_by(compare_entries);
}
