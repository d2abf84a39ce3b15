use crate::wizard::url::{WizardPaths, DEFAULT_BASE_PATH, DEFAULT_EDIT_BASE_PATH};
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

/// Top-level configuration for the listing service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub wizard: WizardConfig,
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

        let base_path = route_var("LISTING_BASE_PATH", DEFAULT_BASE_PATH)?;
        let edit_base_path = route_var("LISTING_EDIT_BASE_PATH", DEFAULT_EDIT_BASE_PATH)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            wizard: WizardConfig {
                base_path,
                edit_base_path,
            },
        })
    }
}

/// Absolute route prefix from the environment. Query strings, fragments and
/// whitespace are rejected.
fn route_var(name: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    let valid = value.starts_with('/')
        && !value.contains(['?', '#'])
        && !value.chars().any(char::is_whitespace);
    if valid {
        Ok(value)
    } else {
        Err(ConfigError::InvalidPath { name, value })
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

/// Log filter controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Route prefixes the owner wizard is mounted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    pub base_path: String,
    pub edit_base_path: String,
}

impl WizardConfig {
    pub fn paths(&self) -> WizardPaths {
        WizardPaths::new(self.base_path.as_str(), self.edit_base_path.as_str())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPath { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPath { name, value } => {
                write!(f, "{name} must be an absolute path without query, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPath { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
