use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAPIT_URL: &str = "https://mapit.mysociety.org";
pub const DEFAULT_MAPIT_GENERATION: &str = "41";

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

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Top-level configuration for the bridge, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub mapit: MapitConfig,
    pub access: AccessConfig,
    pub resources: ResourceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let production = env::var("SERVER_PRODUCTION")
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let environment = if production {
            AppEnvironment::Production
        } else {
            AppEnvironment::from_str(
                &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            )
        };

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let default_level = if environment.is_production() {
            "info"
        } else {
            "debug"
        };
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());

        let base_url = env::var("MAPIT_URL").unwrap_or_else(|_| DEFAULT_MAPIT_URL.to_string());
        let base_url = Url::parse(base_url.trim())
            .map_err(|source| ConfigError::InvalidMapitUrl { source })?;
        let generation = env::var("MAPIT_GENERATION")
            .unwrap_or_else(|_| DEFAULT_MAPIT_GENERATION.to_string());
        let api_key = non_empty_var("MAPIT_KEY");
        let timeout_secs = env::var("MAPIT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let access_key = non_empty_var("ACCESS_KEY");
        let resources_dir = env::var("RESOURCES_DIR").unwrap_or_else(|_| "resources".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: !environment.is_production(),
            },
            mapit: MapitConfig {
                base_url,
                generation,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            access: AccessConfig { access_key },
            resources: ResourceConfig {
                dir: PathBuf::from(resources_dir),
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
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
    pub ansi: bool,
}

/// Connection settings for the MapIt postcode service.
#[derive(Debug, Clone)]
pub struct MapitConfig {
    pub base_url: Url,
    pub generation: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Optional shared secret callers must present as `access_key`.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub access_key: Option<String>,
}

/// Location of the pre-fetched reference files.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub dir: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidTimeout,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMapitUrl { source: url::ParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid u16"),
            ConfigError::InvalidTimeout => {
                write!(f, "MAPIT_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMapitUrl { .. } => write!(f, "MAPIT_URL must be an absolute URL"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidMapitUrl { source } => Some(source),
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
        for name in [
            "SERVER_PRODUCTION",
            "APP_ENV",
            "APP_HOST",
            "PORT",
            "APP_LOG_LEVEL",
            "MAPIT_URL",
            "MAPIT_GENERATION",
            "MAPIT_KEY",
            "MAPIT_TIMEOUT_SECS",
            "ACCESS_KEY",
            "RESOURCES_DIR",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.mapit.generation, "41");
        assert_eq!(config.mapit.base_url.as_str(), "https://mapit.mysociety.org/");
        assert!(config.mapit.api_key.is_none());
        assert!(config.access.access_key.is_none());
        assert_eq!(config.resources.dir, PathBuf::from("resources"));
    }

    #[test]
    fn production_flag_overrides_app_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "test");
        env::set_var("SERVER_PRODUCTION", "True");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.ansi);
        reset_env();
    }

    #[test]
    fn blank_secrets_are_treated_as_unset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ACCESS_KEY", "  ");
        env::set_var("MAPIT_KEY", "secret-key");
        let config = AppConfig::load().expect("config loads");
        assert!(config.access.access_key.is_none());
        assert_eq!(config.mapit.api_key.as_deref(), Some("secret-key"));
        reset_env();
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORT", "not-a-port");
        let err = AppConfig::load().expect_err("port must be numeric");
        assert!(matches!(err, ConfigError::InvalidPort));
        reset_env();
    }

    #[test]
    fn rejects_fractional_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MAPIT_TIMEOUT_SECS", "2.5");
        let err = AppConfig::load().expect_err("timeout must be whole seconds");
        assert!(matches!(err, ConfigError::InvalidTimeout));
        reset_env();
    }

    #[test]
    fn rejects_relative_mapit_url() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MAPIT_URL", "mapit.mysociety.org");
        let err = AppConfig::load().expect_err("mapit url must be absolute");
        assert!(matches!(err, ConfigError::InvalidMapitUrl { .. }));
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 5000));
        reset_env();
    }
}
