use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_FACTOR_BASE_URL: &str = "https://api.greenpt.io/v1";
const DEFAULT_PROJECTION_BASE_URL: &str = "https://api.wolframalpha.com/v2/query";
const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 2_000;

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
    pub providers: ProviderConfig,
}

impl AppConfig {
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            providers: ProviderConfig::from_env()?,
        })
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

/// Credentials and endpoints for the optional live data providers.
///
/// A provider whose credential is absent (or blank) stays on its fallback path; the
/// sources receive this value at construction and never consult the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub factor_api_key: Option<String>,
    pub factor_base_url: String,
    pub projection_app_id: Option<String>,
    pub projection_base_url: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Configuration with no live providers, suitable for tests and offline demos.
    pub fn offline() -> Self {
        Self {
            factor_api_key: None,
            factor_base_url: DEFAULT_FACTOR_BASE_URL.to_string(),
            projection_app_id: None,
            projection_base_url: DEFAULT_PROJECTION_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let timeout_ms = match env::var("PROVIDER_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_PROVIDER_TIMEOUT_MS,
        };

        Ok(Self {
            factor_api_key: non_blank_var("GREENPT_API_KEY"),
            factor_base_url: non_blank_var("GREENPT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FACTOR_BASE_URL.to_string()),
            projection_app_id: non_blank_var("WOLFRAM_APP_ID"),
            projection_base_url: non_blank_var("WOLFRAM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PROJECTION_BASE_URL.to_string()),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn factor_provider_enabled(&self) -> bool {
        self.factor_api_key.is_some()
    }

    pub fn projection_provider_enabled(&self) -> bool {
        self.projection_app_id.is_some()
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "PROVIDER_TIMEOUT_MS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
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
            "GREENPT_API_KEY",
            "GREENPT_BASE_URL",
            "WOLFRAM_APP_ID",
            "WOLFRAM_BASE_URL",
            "PROVIDER_TIMEOUT_MS",
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
        assert!(!config.providers.factor_provider_enabled());
        assert!(!config.providers.projection_provider_enabled());
        assert_eq!(config.providers.timeout, Duration::from_secs(2));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn blank_credentials_leave_providers_disabled() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GREENPT_API_KEY", "   ");
        env::set_var("WOLFRAM_APP_ID", "demo-app");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.providers.factor_provider_enabled());
        assert_eq!(config.providers.projection_app_id.as_deref(), Some("demo-app"));
    }

    #[test]
    fn rejects_zero_provider_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PROVIDER_TIMEOUT_MS", "0");
        let err = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(err, ConfigError::InvalidTimeout));
        reset_env();
    }
}
