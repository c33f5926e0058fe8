//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use wheel_draw::domain::session::SpinSettings;

use crate::error::AppError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STORE_PATH: &str = "wheel-store.json";

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Location of the JSON store file.
    pub store_path: PathBuf,
    /// Spin animation parameters.
    pub spin: SpinSettings,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value if set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = SpinSettings::default();
        let rng_seed = match lookup("WHEEL_RNG_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|e| AppError::Config(format!("WHEEL_RNG_SEED is invalid: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            store_path: lookup("WHEEL_STORE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from),
            spin: SpinSettings {
                duration_ms: parse_or(&lookup, "SPIN_DURATION_MS", defaults.duration_ms)?,
                turns: parse_or(&lookup, "SPIN_TURNS", defaults.turns)?,
            },
            rng_seed,
        })
    }

    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host` and `port` do not form a valid
    /// socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store_path, PathBuf::from("wheel-store.json"));
        assert_eq!(config.spin, SpinSettings::default());
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("WHEEL_STORE_PATH", "/tmp/wheel.json"),
            ("SPIN_DURATION_MS", "1500"),
            ("SPIN_TURNS", " 4 "),
            ("WHEEL_RNG_SEED", "42"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.store_path, PathBuf::from("/tmp/wheel.json"));
        assert_eq!(config.spin.duration_ms, 1500);
        assert_eq!(config.spin.turns, 4);
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn test_invalid_port_returns_config_error() {
        match config_from(&[("PORT", "eighty")]) {
            Err(AppError::Config(msg)) => assert!(msg.contains("PORT")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_host_fails_socket_addr() {
        let config = config_from(&[("HOST", "not a host")]).unwrap();
        assert!(matches!(config.socket_addr(), Err(AppError::Config(_))));
    }
}
