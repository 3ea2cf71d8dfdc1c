use crate::models::Player;
use crate::utils::dates::format_date;
use crate::utils::maximizer::MaximizerEntry;
use crate::utils::projections::ProjectionSource;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Save any serializable value to a JSON cache file
pub fn save_to_cache<T: Serialize + ?Sized>(value: &T, cache_file: impl AsRef<Path>) -> Result<()> {
    let cache_file = cache_file.as_ref();
    if let Some(parent) = cache_file.parent() {
        std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize cache data")?;
    std::fs::write(cache_file, json)
        .with_context(|| format!("Failed to write cache file {}", cache_file.display()))?;
    Ok(())
}

/// Load a value from a JSON cache file
pub fn load_from_cache<T: DeserializeOwned>(cache_file: impl AsRef<Path>) -> Result<T> {
    let cache_file = cache_file.as_ref();
    let json = std::fs::read_to_string(cache_file)
        .with_context(|| format!("Failed to read cache file {}", cache_file.display()))?;
    serde_json::from_str(&json).context("Failed to deserialize cache data")
}

/// Load a player list (JSON array) exported from the league store
pub fn load_players(path: impl AsRef<Path>) -> Result<Vec<Player>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read players file {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse players file")
}

#[derive(Debug, Serialize)]
struct MaximizerCsvRow<'a> {
    rank: usize,
    player_id: i64,
    player: &'a str,
    position: String,
    team: &'a str,
    games_remaining: usize,
    games_in_window: usize,
    season_points: u32,
    weekly_projection: String,
    projection_source: &'static str,
    play_days: String,
}

/// Save a ranked schedule maximizer to CSV
pub fn save_maximizer_to_csv(entries: &[MaximizerEntry], filename: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename.as_ref()).context("Failed to create CSV file")?;

    for (i, entry) in entries.iter().enumerate() {
        writer
            .serialize(MaximizerCsvRow {
                rank: i + 1,
                player_id: entry.player_id.0,
                player: &entry.full_name,
                position: format!("{:?}", entry.position),
                team: &entry.team_abbrev,
                games_remaining: entry.games_remaining,
                games_in_window: entry.games_in_window,
                season_points: entry.season_points,
                weekly_projection: format!("{:.2}", entry.projection.points),
                projection_source: match entry.projection.source {
                    ProjectionSource::Projected => "projected",
                    ProjectionSource::Heuristic => "heuristic",
                },
                play_days: entry
                    .play_days
                    .iter()
                    .map(|d| format_date(*d))
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
