use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical player identifier.
///
/// Upstream sources hand out player ids as either JSON numbers or numeric
/// strings. Both are accepted here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl PlayerId {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(PlayerId(n)),
            RawId::Text(s) => PlayerId::parse(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid player id: {:?}", s))),
        }
    }
}

/// League identifier (a UUID string in the league store)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueId(pub String);

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fantasy team identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// A fantasy league as stored by the league store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub draft_status: DraftStatus,
    pub draft_completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// A head-to-head pairing for one fantasy week.
/// `team2_id` is `None` when `team1_id` has a bye.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub id: String,
    pub league_id: LeagueId,
    pub week_number: u32,
    pub team1_id: TeamId,
    pub team2_id: Option<TeamId>,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub status: MatchupStatus,
}

impl Matchup {
    pub fn involves(&self, team: &TeamId) -> bool {
        &self.team1_id == team || self.team2_id.as_ref() == Some(team)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    C,
    LW,
    RW,
    D,
    G,
}

impl Position {
    /// Map the raw position strings found in roster feeds onto a position.
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "C" | "CENTER" | "CENTRE" => Some(Position::C),
            "L" | "LW" | "LEFT WING" | "LEFT_WING" => Some(Position::LW),
            "R" | "RW" | "RIGHT WING" | "RIGHT_WING" => Some(Position::RW),
            "D" | "DEFENSE" | "DEFENCE" | "DEFENSEMAN" | "DEFENCEMAN" => Some(Position::D),
            "G" | "GOALIE" | "GOALTENDER" => Some(Position::G),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Position::normalize(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown position: {:?}", raw)))
    }
}

/// Season-to-date totals. Goalie fields are `None` for skaters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub hits: u32,
    #[serde(default)]
    pub blocks: u32,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub goals_against_average: Option<f64>,
    #[serde(default)]
    pub save_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub full_name: String,
    pub position: Position,
    pub team_abbrev: String, // NHL team, e.g. "TOR"
    #[serde(default)]
    pub stats: SeasonStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    Live,
    Intermission,
    Final,
    Off,
}

impl GameStatus {
    /// Map an NHL web API `gameState` code.
    pub fn from_nhl_state(state: &str) -> Self {
        match state {
            "LIVE" | "CRIT" => GameStatus::Live,
            "FINAL" => GameStatus::Final,
            "OFF" => GameStatus::Off,
            _ => GameStatus::Scheduled, // FUT, PRE
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Final | GameStatus::Off)
    }
}

/// A scheduled NHL game. `date` is the calendar date in the canonical timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub status: GameStatus,
}

impl Game {
    pub fn involves(&self, team_abbrev: &str) -> bool {
        self.home_team.eq_ignore_ascii_case(team_abbrev)
            || self.away_team.eq_ignore_ascii_case(team_abbrev)
    }
}

/// One projected scoring value for a player on a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProjectionRow {
    pub player_id: PlayerId,
    pub date: NaiveDate,
    pub projected_points: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_accepts_number_or_string() {
        let a: PlayerId = serde_json::from_str("8478402").unwrap();
        let b: PlayerId = serde_json::from_str("\"8478402\"").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<PlayerId>("\"mcdavid\"").is_err());
    }

    #[test]
    fn test_position_normalize() {
        assert_eq!(Position::normalize("L"), Some(Position::LW));
        assert_eq!(Position::normalize("right wing"), Some(Position::RW));
        assert_eq!(Position::normalize(" Defenseman "), Some(Position::D));
        assert_eq!(Position::normalize("G"), Some(Position::G));
        assert_eq!(Position::normalize("UTIL"), None);

        let p: Position = serde_json::from_str("\"Center\"").unwrap();
        assert_eq!(p, Position::C);
    }

    #[test]
    fn test_game_status_from_nhl_state() {
        assert_eq!(GameStatus::from_nhl_state("FUT"), GameStatus::Scheduled);
        assert_eq!(GameStatus::from_nhl_state("CRIT"), GameStatus::Live);
        assert!(GameStatus::from_nhl_state("OFF").is_finished());
        assert!(!GameStatus::Intermission.is_finished());
    }
}
