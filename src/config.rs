//! Service configuration
//!
//! Everything comes from the environment; there is no config file. The
//! session directory is the unit that `/reset-session` deletes wholesale.

use std::path::PathBuf;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_SESSION_DIR: &str = ".wa-session";

pub const PORT_ENV: &str = "WA_RELAY_PORT";
pub const BIND_ENV: &str = "WA_RELAY_BIND";
pub const SESSION_DIR_ENV: &str = "WA_RELAY_SESSION_DIR";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub session_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind: std::env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            port: parse_port(std::env::var(PORT_ENV).ok().as_deref()),
            session_dir: std::env::var(SESSION_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_DIR)),
        }
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    match raw {
        None => DEFAULT_PORT,
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {PORT_ENV}={v:?}, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset_or_invalid() {
        assert_eq!(parse_port(None), DEFAULT_PORT);
        assert_eq!(parse_port(Some("not-a-port")), DEFAULT_PORT);
        assert_eq!(parse_port(Some("70000")), DEFAULT_PORT);
    }

    #[test]
    fn port_parses_valid_values() {
        assert_eq!(parse_port(Some("8080")), 8080);
    }
}
