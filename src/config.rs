use crate::data::snapshot::ColorScheme;
use crate::data::collector::REQUEST_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_RESOLVER_URL: &str =
    "https://raw.githubusercontent.com/TkZJZ/Server_Thesis/main/config.json";

const APP_DIR: &str = "power-monitor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Document that names the telemetry service
    pub resolver_url: String,
    pub color_scheme: ColorScheme,
    /// Append-only CSV written by the persister
    pub log_path: PathBuf,
    pub poll_interval_ms: u64,
    pub save_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub history_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resolver_url: DEFAULT_RESOLVER_URL.to_string(),
            color_scheme: ColorScheme::Default,
            log_path: PathBuf::from("power_log.csv"),
            poll_interval_ms: 1000,
            save_interval_ms: 5000,
            request_timeout_ms: REQUEST_TIMEOUT.as_millis() as u64,
            history_capacity: 200,
        }
    }
}

impl AppConfig {
    pub fn load() -> Option<Self> {
        let path = Self::config_path()?;
        let content = fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Option<Self> {
        match toml::from_str(content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("ignoring unreadable config: {}", err);
                None
            }
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("config directory not available")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_millis(self.save_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Where the diagnostic log goes; the terminal itself is taken by the UI.
    pub fn diagnostics_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .filter(|dir| fs::create_dir_all(dir).is_ok())
            .unwrap_or_default()
            .join("power-monitor.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::parse(
            r#"
resolver_url = "http://localhost:8000/config.json"
poll_interval_ms = 250
"#,
        )
        .unwrap();
        assert_eq!(config.resolver_url, "http://localhost:8000/config.json");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.save_interval(), Duration::from_secs(5));
        assert_eq!(config.history_capacity, 200);
        assert_eq!(config.color_scheme, ColorScheme::Default);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = AppConfig {
            color_scheme: ColorScheme::Gruvbox,
            log_path: PathBuf::from("/tmp/bess.csv"),
            ..AppConfig::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(AppConfig::parse(&text), Some(config));
    }

    #[test]
    fn test_garbage_config_is_ignored() {
        assert_eq!(AppConfig::parse("resolver_url = [1, 2"), None);
    }
}
