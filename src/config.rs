use crate::api::schedule_api::NHL_API_BASE_URL;
use crate::error::ConfigError;
use crate::utils::dates::parse_date;
use crate::utils::projections::FallbackVariant;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::path::PathBuf;

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Settings {
    /// The one timezone "today" and game dates are expressed in
    pub timezone: Tz,
    /// Last day a fantasy week may start on
    pub season_end: Option<NaiveDate>,
    pub nhl_api_base_url: String,
    /// Backend (REST + RPC) base URL and anon key
    pub baas_url: Option<String>,
    pub baas_anon_key: Option<String>,
    pub fallback_variant: FallbackVariant,
    pub use_cache: bool,
    pub cache_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tz_name = var("CANONICAL_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = tz_name
            .trim()
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidTimezone {
                name: tz_name.clone(),
                reason: e.to_string(),
            })?;

        let season_end = match var("SEASON_END") {
            Some(raw) => Some(parse_date(&raw).ok_or(ConfigError::InvalidDate {
                var: "SEASON_END".to_string(),
                value: raw,
            })?),
            None => None,
        };

        let fallback_variant = match var("FALLBACK_VARIANT").as_deref().map(str::trim) {
            None | Some("week") => FallbackVariant::FullWeek,
            Some("remaining") => FallbackVariant::RemainingWeek,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "FALLBACK_VARIANT".to_string(),
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            timezone,
            season_end,
            nhl_api_base_url: var("NHL_API_BASE_URL").unwrap_or_else(|| NHL_API_BASE_URL.to_string()),
            baas_url: var("BAAS_URL"),
            baas_anon_key: var("BAAS_ANON_KEY"),
            fallback_variant,
            use_cache: var("USE_CACHE").as_deref() == Some("1"),
            cache_dir: var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
        })
    }

    /// Backend URL and key, when both are configured
    pub fn baas(&self) -> Option<(&str, &str)> {
        match (&self.baas_url, &self.baas_anon_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.timezone, chrono_tz::America::New_York);
        assert_eq!(s.nhl_api_base_url, NHL_API_BASE_URL);
        assert_eq!(s.fallback_variant, FallbackVariant::FullWeek);
        assert!(s.season_end.is_none());
        assert!(s.baas().is_none());
        assert!(!s.use_cache);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("CANONICAL_TIMEZONE", "America/Toronto"),
            ("SEASON_END", "2026-04-16"),
            ("FALLBACK_VARIANT", "remaining"),
            ("BAAS_URL", "https://example.supabase.co"),
            ("BAAS_ANON_KEY", "anon"),
            ("USE_CACHE", "1"),
        ])
        .unwrap();
        assert_eq!(s.timezone, chrono_tz::America::Toronto);
        assert_eq!(s.season_end, NaiveDate::from_ymd_opt(2026, 4, 16));
        assert_eq!(s.fallback_variant, FallbackVariant::RemainingWeek);
        assert_eq!(s.baas(), Some(("https://example.supabase.co", "anon")));
        assert!(s.use_cache);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            settings(&[("CANONICAL_TIMEZONE", "Mars/Olympus")]),
            Err(ConfigError::InvalidTimezone { .. })
        ));
        assert!(matches!(
            settings(&[("SEASON_END", "April")]),
            Err(ConfigError::InvalidDate { .. })
        ));
        assert!(matches!(
            settings(&[("FALLBACK_VARIANT", "month")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
