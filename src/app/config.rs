//! Process configuration read from the environment.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::api::router::RateLimitConfig;
use crate::domain::ConfigError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub log_format: LogFormat,
    pub request_timeout: Duration,
    /// `None` serves without rate limiting.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            log_format: LogFormat::default(),
            request_timeout: Duration::from_secs(30),
            rate_limit: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Unset keys take their defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = parse_or(&lookup, "HOST", defaults.host)?;
        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let log_format = parse_or(&lookup, "LOG_FORMAT", defaults.log_format)?;
        let timeout_secs = parse_or(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let rate_limit = if parse_or(&lookup, "RATE_LIMIT_ENABLED", false)? {
            let base = RateLimitConfig::default();
            let config = RateLimitConfig {
                general_rps: parse_or(&lookup, "RATE_LIMIT_RPS", base.general_rps)?,
                general_burst: parse_or(&lookup, "RATE_LIMIT_BURST", base.general_burst)?,
                health_rps: parse_or(&lookup, "RATE_LIMIT_HEALTH_RPS", base.health_rps)?,
                health_burst: parse_or(&lookup, "RATE_LIMIT_HEALTH_BURST", base.health_burst)?,
            };
            config.validate()?;
            Some(config)
        } else {
            None
        };

        Ok(Self {
            host,
            port,
            log_format,
            request_timeout: Duration::from_secs(timeout_secs),
            rate_limit,
        })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("LOG_FORMAT", "JSON"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_rate_limit_enabled() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RATE_LIMIT_ENABLED", "true"),
            ("RATE_LIMIT_RPS", "50"),
        ]))
        .unwrap();

        let rate_limit = config.rate_limit.unwrap();
        assert_eq!(rate_limit.general_rps, 50);
        assert_eq!(rate_limit.general_burst, 20);
    }

    #[test]
    fn test_rate_limit_reads_meta_route_quota() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RATE_LIMIT_ENABLED", "true"),
            ("RATE_LIMIT_HEALTH_RPS", "5"),
            ("RATE_LIMIT_HEALTH_BURST", "7"),
        ]))
        .unwrap();

        let rate_limit = config.rate_limit.unwrap();
        assert_eq!(rate_limit.health_rps, 5);
        assert_eq!(rate_limit.health_burst, 7);
        assert_eq!(rate_limit.general_rps, 10);
    }

    #[test]
    fn test_rate_limit_rejects_zero_meta_route_burst() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("RATE_LIMIT_ENABLED", "true"),
            ("RATE_LIMIT_HEALTH_BURST", "0"),
        ]))
        .unwrap_err();

        assert!(
            matches!(err, ConfigError::InvalidValue { key, .. } if key == "RATE_LIMIT_HEALTH_BURST")
        );
    }

    #[test]
    fn test_rate_limit_rejects_zero_quota() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("RATE_LIMIT_ENABLED", "true"),
            ("RATE_LIMIT_RPS", "0"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "RATE_LIMIT_RPS"));
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "PORT"));
    }

    #[test]
    fn test_invalid_log_format() {
        let err = AppConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'LOG_FORMAT': expected 'pretty' or 'json', got 'xml'"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err =
            AppConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "REQUEST_TIMEOUT_SECS"));
    }
}
