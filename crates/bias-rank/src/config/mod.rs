use crate::ranking::scoring::{DimensionWeights, ScoringConfig, ScoringConfigError};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Loads `.env` and the process environment. Scoring weights are validated here so a
    /// misconfigured deployment fails before any ranking is produced.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scoring = load_scoring()?;
        scoring.validate()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
        })
    }
}

fn load_scoring() -> Result<ScoringConfig, ConfigError> {
    let defaults = ScoringConfig::default();
    let weights = defaults.dimension_weights;

    let dimension_weights = DimensionWeights::from_percentages(
        env_f64("SCORING_WEIGHT_SECTOR", weights.sector * 100.0)?,
        env_f64("SCORING_WEIGHT_FUNCTION", weights.function * 100.0)?,
        env_f64("SCORING_WEIGHT_ASSET_CLASS", weights.asset_class * 100.0)?,
        env_f64("SCORING_WEIGHT_GEOGRAPHY", weights.geography * 100.0)?,
        env_f64("SCORING_WEIGHT_SENIORITY", weights.seniority * 100.0)?,
    );

    Ok(ScoringConfig {
        dimension_weights,
        similarity_cap_margin: env_f64(
            "SCORING_SIMILARITY_CAP_MARGIN",
            defaults.similarity_cap_margin,
        )?,
        shrinkage_strength: env_f64("SCORING_SHRINKAGE_K", defaults.shrinkage_strength)?,
        prior_mean: env_f64("SCORING_PRIOR_MEAN", defaults.prior_mean)?,
        ..defaults
    })
}

fn env_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    Scoring(ScoringConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a number (found '{value}')")
            }
            ConfigError::Scoring(err) => write!(f, "invalid scoring configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Scoring(err) => Some(err),
        }
    }
}

impl From<ScoringConfigError> for ConfigError {
    fn from(value: ScoringConfigError) -> Self {
        Self::Scoring(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "SCORING_WEIGHT_SECTOR",
            "SCORING_WEIGHT_FUNCTION",
            "SCORING_WEIGHT_ASSET_CLASS",
            "SCORING_WEIGHT_GEOGRAPHY",
            "SCORING_WEIGHT_SENIORITY",
            "SCORING_SIMILARITY_CAP_MARGIN",
            "SCORING_SHRINKAGE_K",
            "SCORING_PRIOR_MEAN",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring.shrinkage_strength, 5.0);
        assert!((config.scoring.dimension_weights.sector - 0.4).abs() < 1e-9);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_weights_that_do_not_sum_to_one_hundred() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_WEIGHT_SECTOR", "50");
        let result = AppConfig::load();
        reset_env();

        match result {
            Err(ConfigError::Scoring(ScoringConfigError::DimensionWeightsSum { sum })) => {
                assert!((sum - 1.1).abs() < 1e-9);
            }
            other => panic!("expected weight validation failure, got {other:?}"),
        }
    }

    #[test]
    fn policy_dials_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_SHRINKAGE_K", "10");
        env::set_var("SCORING_SIMILARITY_CAP_MARGIN", "0.2");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.scoring.shrinkage_strength, 10.0);
        assert_eq!(config.scoring.similarity_cap_margin, 0.2);
    }

    #[test]
    fn non_numeric_weight_is_reported_with_its_key() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_WEIGHT_GEOGRAPHY", "ten");
        let result = AppConfig::load();
        reset_env();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber {
                key: "SCORING_WEIGHT_GEOGRAPHY",
                ..
            })
        ));
    }
}
