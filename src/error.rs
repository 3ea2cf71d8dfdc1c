//! Error types for week resolution and the data providers

use crate::models::{DraftStatus, LeagueId};
use thiserror::Error;

/// Precondition failures the caller has to surface to the user
#[derive(Error, Debug)]
pub enum WeekError {
    #[error("League {0} not found")]
    LeagueNotFound(LeagueId),

    #[error("League {league_id} draft is not completed (status: {status:?})")]
    DraftNotCompleted {
        league_id: LeagueId,
        status: DraftStatus,
    },

    #[error("League {0} has a completed draft but no completion timestamp")]
    MissingDraftTimestamp(LeagueId),

    #[error("Week {0} is outside the league calendar")]
    InvalidWeek(u32),
}

/// Failures from the league store, schedule or projection providers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid timezone {name:?}: {reason}")]
    InvalidTimezone { name: String, reason: String },

    #[error("Invalid date in {var}: {value:?}")]
    InvalidDate { var: String, value: String },

    #[error("Invalid value in {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}
