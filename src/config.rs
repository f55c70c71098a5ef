use crate::types::Config;
use anyhow::Result;
use std::fs;
use tracing::warn;

/// Where the configuration came from, so startup logging can say so after
/// the logger exists (the logger's own settings live in the config).
#[derive(Debug)]
pub enum ConfigSource {
    File(String),
    Defaults(String),
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default(path: &str) -> (Self, ConfigSource) {
        match Self::load(path) {
            Ok(config) => (config, ConfigSource::File(path.to_string())),
            Err(e) => (Config::default(), ConfigSource::Defaults(e.to_string())),
        }
    }

    /// Sanity-check cross-field constraints. Warns, never fails: a
    /// misconfigured timeout degrades freshness, it does not break the app.
    pub fn validate(&self) {
        let shortest = self
            .polling
            .live_interval_ms
            .min(self.polling.analytics_interval_ms);
        if self.server.request_timeout_ms > shortest {
            warn!(
                "request timeout ({} ms) exceeds the shortest poll interval ({} ms); \
                 slow responses will overlap the next cycle",
                self.server.request_timeout_ms, shortest
            );
        }
        if self.polling.live_interval_ms == 0 || self.polling.analytics_interval_ms == 0 {
            warn!("poll interval of 0 ms configured; clamping to 1 ms at spawn time");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_cadences() {
        let config = Config::default();
        assert_eq!(config.polling.live_interval_ms, 1000);
        assert_eq!(config.polling.analytics_interval_ms, 3000);
        assert!(config.server.request_timeout_ms <= config.polling.live_interval_ms);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "server:\n  base_url: \"http://traffic.example:8080\"\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.base_url, "http://traffic.example:8080");
        assert_eq!(config.server.request_timeout_ms, 900);
        assert_eq!(config.polling.analytics_interval_ms, 3000);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let (config, source) = Config::load_or_default("/nonexistent/lanewatch.yaml");
        assert_eq!(config.polling.live_interval_ms, 1000);
        assert!(matches!(source, ConfigSource::Defaults(_)));
    }
}
