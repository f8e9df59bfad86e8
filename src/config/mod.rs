//! Configuration management
//!
//! Layered: built-in defaults, then an optional `dialer.toml` (or the file
//! named by `DIALER_CONFIG`), then `DIALER__<SECTION>__<KEY>` environment
//! variables.

use crate::domain::call_control::VoiceParams;
use ::config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "dialer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub log_level: String,
    pub session: SessionConfig,
    pub voice: VoiceParams,
    pub meeting: MeetingConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session record
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingConfig {
    pub media_region: String,
    /// Caller id for participant paging calls
    pub from_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Session records stay in memory when unset
    pub url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            log_level: "info".to_string(),
            session: SessionConfig { ttl_secs: 86_400 },
            voice: VoiceParams::default(),
            meeting: MeetingConfig {
                media_region: "us-east-1".to_string(),
                from_number: None,
            },
            database: DatabaseConfig { url: None },
        }
    }
}

impl Config {
    /// Load from `DIALER_CONFIG` or `dialer.toml` plus the environment
    pub fn load() -> Result<Self, ConfigError> {
        let file =
            std::env::var("DIALER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(&file, Environment::with_prefix("DIALER"))
    }

    fn from_sources(file: &str, environment: Environment) -> Result<Self, ConfigError> {
        let defaults = ::config::Config::try_from(&Config::default())?;

        ::config::Config::builder()
            .add_source(defaults)
            .add_source(File::with_name(file).required(false))
            .add_source(environment.prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.session.ttl_secs).unwrap_or(i64::MAX))
    }

    /// `tracing` directive for the configured level, `info` when unknown
    pub fn log_directive(&self) -> &'static str {
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" => "error",
            _ => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("DIALER").source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources("does-not-exist", environment(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.ttl_secs, 86_400);
        assert_eq!(config.voice.voice_id, "Joanna");
        assert_eq!(config.database.url, None);
        assert_eq!(config.session_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_sources(
            "does-not-exist",
            environment(&[
                ("DIALER__SERVER__PORT", "9090"),
                ("DIALER__SESSION__TTL_SECS", "60"),
                ("DIALER__VOICE__VOICE_ID", "Matthew"),
                ("DIALER__MEETING__FROM_NUMBER", "+15550009999"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.session.ttl_secs, 60);
        assert_eq!(config.voice.voice_id, "Matthew");
        assert_eq!(config.meeting.from_number.as_deref(), Some("+15550009999"));
    }

    #[test]
    fn test_log_directive_falls_back_to_info() {
        let mut config = Config::default();
        config.log_level = "DEBUG".to_string();
        assert_eq!(config.log_directive(), "debug");
        config.log_level = "verbose".to_string();
        assert_eq!(config.log_directive(), "info");
    }
}
