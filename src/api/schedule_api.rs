use crate::api::ScheduleProvider;
use crate::error::ProviderError;
use crate::models::{Game, GameStatus};
use crate::utils::dates::{format_date, local_date, parse_date};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

pub const NHL_API_BASE_URL: &str = "https://api-web.nhle.com/v1";

// A two-week window never needs more than a handful of weekly pages
const MAX_PAGES: usize = 8;

/// Response from the NHL web API weekly club schedule
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubScheduleWeek {
    next_start_date: Option<String>,
    #[serde(default)]
    games: Vec<ClubScheduleGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubScheduleGame {
    id: i64,
    game_date: Option<String>,
    #[serde(rename = "startTimeUTC")]
    start_time_utc: Option<DateTime<Utc>>,
    game_state: String,
    home_team: ClubScheduleTeam,
    away_team: ClubScheduleTeam,
}

#[derive(Debug, Deserialize)]
struct ClubScheduleTeam {
    abbrev: String,
}

pub struct NhlScheduleClient {
    client: Client,
    base_url: String,
    tz: Tz,
}

impl NhlScheduleClient {
    pub fn new(base_url: impl Into<String>, tz: Tz) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tz,
        }
    }

    async fn fetch_week(&self, team_abbrev: &str, date: NaiveDate) -> Result<ClubScheduleWeek, ProviderError> {
        let url = format!(
            "{}/club-schedule/{}/week/{}",
            self.base_url,
            team_abbrev.to_ascii_uppercase(),
            format_date(date)
        );
        debug!(team = team_abbrev, url = %url, "Fetching club schedule");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Calendar date of a game in the canonical timezone. The start instant
    /// is preferred; `gameDate` is the venue's local date.
    fn game_date(&self, game: &ClubScheduleGame) -> Option<NaiveDate> {
        match game.start_time_utc {
            Some(start) => Some(local_date(start, self.tz)),
            None => game.game_date.as_deref().and_then(parse_date),
        }
    }
}

#[async_trait]
impl ScheduleProvider for NhlScheduleClient {
    async fn team_schedule(
        &self,
        team_abbrev: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Game>, ProviderError> {
        let mut games = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = start;

        for _ in 0..MAX_PAGES {
            if cursor > end {
                break;
            }
            let week = self.fetch_week(team_abbrev, cursor).await?;

            for api_game in &week.games {
                let Some(date) = self.game_date(api_game) else {
                    continue;
                };
                if date < start || date > end || !seen.insert(api_game.id) {
                    continue;
                }
                games.push(Game {
                    id: api_game.id,
                    date,
                    home_team: api_game.home_team.abbrev.clone(),
                    away_team: api_game.away_team.abbrev.clone(),
                    status: GameStatus::from_nhl_state(&api_game.game_state),
                });
            }

            match week.next_start_date.as_deref().and_then(parse_date) {
                Some(next) if next > cursor => cursor = next,
                _ => break,
            }
        }

        games.sort_by_key(|g| (g.date, g.id));
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    #[test]
    fn test_parse_club_schedule_week() {
        let json = r#"{
            "previousStartDate": "2025-12-01",
            "nextStartDate": "2025-12-15",
            "games": [
                {
                    "id": 2025020450,
                    "gameDate": "2025-12-08",
                    "startTimeUTC": "2025-12-09T00:00:00Z",
                    "gameState": "OFF",
                    "homeTeam": {"id": 10, "abbrev": "TOR"},
                    "awayTeam": {"id": 6, "abbrev": "BOS"}
                },
                {
                    "id": 2025020470,
                    "gameDate": "2025-12-10",
                    "gameState": "FUT",
                    "homeTeam": {"abbrev": "MTL"},
                    "awayTeam": {"abbrev": "TOR"}
                }
            ]
        }"#;
        let week: ClubScheduleWeek = serde_json::from_str(json).unwrap();
        assert_eq!(week.games.len(), 2);
        assert_eq!(week.next_start_date.as_deref(), Some("2025-12-15"));

        let client = NhlScheduleClient::new(NHL_API_BASE_URL, New_York);
        // 00:00 UTC Dec 9th is the evening of Dec 8th in New York
        assert_eq!(
            client.game_date(&week.games[0]),
            NaiveDate::from_ymd_opt(2025, 12, 8)
        );
        assert_eq!(
            client.game_date(&week.games[1]),
            NaiveDate::from_ymd_opt(2025, 12, 10)
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_team_schedule() {
        let client = NhlScheduleClient::new(NHL_API_BASE_URL, New_York);
        let today = Utc::now().date_naive();
        let games = client
            .team_schedule("TOR", today, today + chrono::Duration::days(13))
            .await
            .unwrap();
        assert!(games.iter().all(|g| g.involves("TOR")));
    }
}
