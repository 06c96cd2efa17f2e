use crate::error::{AppError, Result};
use crate::metrics::collector::PollingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "servers.toml";
const LOG_FILE_NAME: &str = "srvmon.log";

/// Refresh steps offered by the dashboard, filtered by the configured minimum.
pub const INTERVAL_CHOICES_MS: [u64; 4] = [5_000, 10_000, 30_000, 60_000];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerEntry>,

    #[serde(default)]
    pub default_server: Option<String>,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_min_refresh_interval_ms")]
    pub min_refresh_interval_ms: u64,

    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_hardware_refresh_interval_ms")]
    pub hardware_refresh_interval_ms: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            default_server: None,
            refresh_interval_ms: default_refresh_interval_ms(),
            min_refresh_interval_ms: default_min_refresh_interval_ms(),
            history_size: default_history_size(),
            hardware_refresh_interval_ms: default_hardware_refresh_interval_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Reads the server list from `path`, or from the platform config
    /// directory when no path is given. Only an explicit path has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => {
                let expanded = expand_path(explicit);
                if !expanded.exists() {
                    return Err(AppError::Config(format!(
                        "config file {} does not exist",
                        expanded.display()
                    )));
                }
                expanded
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("no config file found, using built-in server list");
                    return Ok(Self::default());
                }
            },
        };

        tracing::debug!(path = %path.display(), "loading config");
        let raw = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(AppError::Config("server list is empty".to_string()));
        }

        for (i, server) in self.servers.iter().enumerate() {
            if server.url.trim().is_empty() {
                return Err(AppError::Config(format!("server '{}' has no url", server.id)));
            }
            if self.servers[..i].iter().any(|s| s.id == server.id) {
                return Err(AppError::Config(format!(
                    "duplicate server id '{}'",
                    server.id
                )));
            }
        }

        if let Some(id) = &self.default_server {
            if self.find_server(id).is_none() {
                return Err(AppError::Config(format!(
                    "default_server '{}' is not in the server list",
                    id
                )));
            }
        }

        if self.hardware_refresh_interval_ms == 0 {
            return Err(AppError::Config(
                "hardware_refresh_interval_ms must be positive".to_string(),
            ));
        }

        if self.min_refresh_interval_ms == 0 {
            return Err(AppError::Config(
                "min_refresh_interval_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.min_refresh_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.clamp_interval(Duration::from_millis(self.refresh_interval_ms))
    }

    pub fn hardware_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.hardware_refresh_interval_ms)
    }

    /// Raises an interval to the configured minimum.
    pub fn clamp_interval(&self, interval: Duration) -> Duration {
        interval.max(self.min_refresh_interval())
    }

    pub fn interval_choices(&self) -> Vec<Duration> {
        let min = self.min_refresh_interval();
        let mut choices: Vec<Duration> = INTERVAL_CHOICES_MS
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .filter(|d| *d >= min)
            .collect();

        if choices.is_empty() {
            choices.push(min);
        }
        choices
    }

    pub fn find_server(&self, id: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// The configured default, falling back to the first entry.
    pub fn default_server(&self) -> Option<&ServerEntry> {
        self.default_server
            .as_deref()
            .and_then(|id| self.find_server(id))
            .or_else(|| self.servers.first())
    }

    pub fn polling_config(&self, endpoint: &str, interval: Duration) -> Result<PollingConfig> {
        PollingConfig::new(
            endpoint,
            self.clamp_interval(interval),
            self.min_refresh_interval(),
        )
    }

    pub fn log_file(&self) -> PathBuf {
        match &self.logging.file {
            Some(file) => expand_path(file),
            None => default_data_dir().join(LOG_FILE_NAME),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "srvmon", "srvmon")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "srvmon", "srvmon")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

fn default_servers() -> Vec<ServerEntry> {
    vec![ServerEntry {
        id: "local".to_string(),
        name: "Local server".to_string(),
        url: "http://localhost:48877/api/status".to_string(),
        description: "Local development".to_string(),
    }]
}

fn default_refresh_interval_ms() -> u64 {
    5_000
}

fn default_min_refresh_interval_ms() -> u64 {
    5_000
}

fn default_history_size() -> usize {
    60
}

fn default_hardware_refresh_interval_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_server = "prod"
refresh_interval_ms = 10000
min_refresh_interval_ms = 10000
history_size = 120

[[servers]]
id = "local"
name = "Local"
url = "http://localhost:48877/api/status"

[[servers]]
id = "prod"
name = "Production"
url = "http://10.0.0.5:48877/api/status"
description = "Main cluster"

[logging]
level = "debug"
"#;

    #[test]
    fn test_parse_server_list() {
        let config = Config::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[0].description, "");
        assert_eq!(config.default_server().unwrap().name, "Production");
        assert_eq!(config.history_size, 120);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.interval_choices(),
            vec![
                Duration::from_secs(10),
                Duration::from_secs(30),
                Duration::from_secs(60)
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.hardware_refresh_interval(), Duration::from_secs(30));
        assert_eq!(
            config.default_server().unwrap().url,
            "http://localhost:48877/api/status"
        );
    }

    #[test]
    fn test_unknown_default_falls_back_to_first() {
        let mut config = Config::default();
        config.default_server = Some("missing".to_string());
        assert_eq!(config.default_server().unwrap().id, "local");
    }

    #[test]
    fn test_interval_is_clamped_to_minimum() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        let polling = config
            .polling_config("http://a/api/status", Duration::from_secs(1))
            .unwrap();
        assert_eq!(polling.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let raw = r#"
[[servers]]
id = "a"
name = "A"
url = "http://a"

[[servers]]
id = "a"
name = "B"
url = "http://b"
"#;
        assert!(matches!(Config::from_toml_str(raw), Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_default_server() {
        let raw = r#"
default_server = "prdo"

[[servers]]
id = "prod"
name = "Production"
url = "http://10.0.0.5:48877/api/status"
"#;
        let result = Config::from_toml_str(raw);
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("prdo")));
    }

    #[test]
    fn test_rejects_zero_hardware_interval() {
        let result = Config::from_toml_str("hardware_refresh_interval_ms = 0");
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("hardware")));
    }

    #[test]
    fn test_rejects_invalid_toml() {
        let result = Config::from_toml_str("servers = 5");
        assert!(matches!(result, Err(AppError::ConfigParse(_))));
    }

    #[test]
    fn test_example_file_is_valid() {
        let config =
            Config::from_toml_str(include_str!("../assets/servers.example.toml")).unwrap();
        assert_eq!(config.default_server().unwrap().id, "local");
        assert_eq!(config.find_server("staging").unwrap().description, "");
        assert_eq!(config.hardware_refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/srvmon/servers.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
