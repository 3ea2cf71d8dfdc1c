use crate::api::ProjectionProvider;
use crate::error::ProviderError;
use crate::models::PlayerId;
use crate::utils::dates::format_date;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const DAILY_PROJECTIONS_RPC: &str = "get_daily_projections";

#[derive(Debug, Serialize)]
struct DailyProjectionsRequest<'a> {
    player_ids: &'a [PlayerId],
    target_date: String,
}

/// Row returned by the daily projections RPC
#[derive(Debug, Deserialize)]
struct DailyProjectionRecord {
    player_id: PlayerId,
    #[serde(default)]
    projected_points: Option<f64>,
}

/// Daily projections from the backend's `get_daily_projections` RPC
pub struct RpcProjectionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RpcProjectionClient {
    pub fn new(base_url: impl Into<String>, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ProjectionProvider for RpcProjectionClient {
    async fn daily_projections(
        &self,
        player_ids: &[PlayerId],
        date: NaiveDate,
    ) -> Result<HashMap<PlayerId, f64>, ProviderError> {
        if player_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/rest/v1/rpc/{}", self.base_url, DAILY_PROJECTIONS_RPC);
        let body = DailyProjectionsRequest {
            player_ids,
            target_date: format_date(date),
        };
        debug!(date = %body.target_date, players = player_ids.len(), "Fetching daily projections");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let text = response.text().await?;
        let records: Vec<DailyProjectionRecord> = serde_json::from_str(&text)?;

        Ok(records
            .into_iter()
            .filter_map(|r| r.projected_points.map(|points| (r.player_id, points)))
            .collect())
    }
}

/// Provider used when no projection backend is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProjections;

#[async_trait]
impl ProjectionProvider for NoProjections {
    async fn daily_projections(
        &self,
        _player_ids: &[PlayerId],
        _date: NaiveDate,
    ) -> Result<HashMap<PlayerId, f64>, ProviderError> {
        Ok(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_projection_records() {
        let json = r#"[
            {"player_id": 8478402, "projected_points": 3.4},
            {"player_id": "8477934", "projected_points": 1.25},
            {"player_id": 8471214, "projected_points": null}
        ]"#;
        let records: Vec<DailyProjectionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].player_id, PlayerId(8477934));
        assert!(records[2].projected_points.is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let ids = [PlayerId(1), PlayerId(2)];
        let body = DailyProjectionsRequest {
            player_ids: &ids,
            target_date: format_date(NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["player_ids"], serde_json::json!([1, 2]));
        assert_eq!(json["target_date"], "2025-12-10");
    }

    #[tokio::test]
    async fn test_no_projections_is_empty() {
        let rows = NoProjections
            .daily_projections(&[PlayerId(1)], NaiveDate::from_ymd_opt(2025, 12, 10).unwrap())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
