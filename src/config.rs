//! Application-level configuration loading: public links, roster key and draw limits.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TEAM_SORTER_CONFIG_PATH";

const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5173/";
const DEFAULT_ROSTER_ID: &str = "team-sorter-players";
const DEFAULT_MAX_TEAM_COUNT: usize = 16;
const DEFAULT_EVENT_HISTORY_LIMIT: usize = 5;
const DEFAULT_CHECKIN_TITLE: &str = "🏆 FOOTBALL - CONFIRM YOUR ATTENDANCE! 🏆";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Frontend origin used to build check-in links. Always ends with a slash.
    pub public_base_url: Url,
    /// Storage key of the organizer roster.
    pub roster_id: String,
    /// Upper bound accepted for a draw request.
    pub max_team_count: usize,
    /// Number of shared check-in events remembered.
    pub event_history_limit: usize,
    /// First line of the invitation message.
    pub checkin_title: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        base_url = %app_config.public_base_url,
                        roster_id = %app_config.roster_id,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    public_base_url: Option<String>,
    roster_id: Option<String>,
    max_team_count: Option<usize>,
    event_history_limit: Option<usize>,
    checkin_title: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let public_base_url = value
            .public_base_url
            .as_deref()
            .and_then(|raw| match parse_base_url(raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(url = raw, error = %err, "invalid public base URL; using default");
                    None
                }
            })
            .unwrap_or_else(default_base_url);

        Self {
            public_base_url,
            roster_id: value
                .roster_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROSTER_ID.into()),
            max_team_count: value
                .max_team_count
                .filter(|max| *max >= 2)
                .unwrap_or(DEFAULT_MAX_TEAM_COUNT),
            event_history_limit: value
                .event_history_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_EVENT_HISTORY_LIMIT),
            checkin_title: value
                .checkin_title
                .unwrap_or_else(|| DEFAULT_CHECKIN_TITLE.into()),
        }
    }
}

/// Parse a base URL, forcing a trailing slash so relative query links stay under its path.
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_PUBLIC_BASE_URL).expect("default base URL is valid")
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.public_base_url.as_str(), DEFAULT_PUBLIC_BASE_URL);
        assert_eq!(config.roster_id, DEFAULT_ROSTER_ID);
        assert_eq!(config.max_team_count, DEFAULT_MAX_TEAM_COUNT);
        assert_eq!(config.event_history_limit, DEFAULT_EVENT_HISTORY_LIMIT);
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = parse_base_url("https://example.org/sorter").unwrap();
        assert_eq!(url.as_str(), "https://example.org/sorter/");
    }

    #[test]
    fn invalid_values_fall_back() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"public_base_url": "not a url", "max_team_count": 1, "event_history_limit": 0}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.public_base_url.as_str(), DEFAULT_PUBLIC_BASE_URL);
        assert_eq!(config.max_team_count, DEFAULT_MAX_TEAM_COUNT);
        assert_eq!(config.event_history_limit, DEFAULT_EVENT_HISTORY_LIMIT);
    }
}
