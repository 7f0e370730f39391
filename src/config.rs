use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Seed account registered at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub secure_cookies: bool,
    pub bootstrap: Option<Bootstrap>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:data/journal.db".to_string());

        let bind_addr = match lookup("BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "BIND_ADDR", value })?,
            None => SocketAddr::from(([127, 0, 0, 1], 8000)),
        };

        let secure_cookies = match lookup("SECURE_COOKIES").as_deref().map(str::trim) {
            None | Some("") => false,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "SECURE_COOKIES",
                    value: other.to_string(),
                });
            }
        };

        let bootstrap = match (lookup("BOOTSTRAP_EMAIL"), lookup("BOOTSTRAP_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(Bootstrap { email, password })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            secure_cookies,
            bootstrap,
        })
    }
}
