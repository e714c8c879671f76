use std::net::SocketAddr;

use anyhow::Context;
use tracing::warn;

const DEFAULT_DB_PORT: u16 = 5432;
const MIN_TTL_MINUTES: i64 = 60;
const MAX_TTL_MINUTES: i64 = 24 * 60;

/// Where the Postgres pool connects to.
#[derive(Clone)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl HttpConfig {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; a missing required key aborts startup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{key} is not specified"));

        let target = match get("DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => {
                let port = match get("DB_PORT") {
                    Some(p) => p.parse::<u16>().context("DB_PORT must be a port number")?,
                    None => {
                        warn!("DB_PORT is not specified, defaulting to {}", DEFAULT_DB_PORT);
                        DEFAULT_DB_PORT
                    }
                };
                DatabaseTarget::Parts {
                    host: required("DB_HOST")?,
                    port,
                    user: required("DB_USER")?,
                    password: required("DB_PASSWORD")?,
                    name: required("DB_NAME")?,
                }
            }
        };
        let database = DatabaseConfig {
            target,
            max_connections: match get("DB_MAX_CONNECTIONS") {
                Some(v) => v
                    .parse::<u32>()
                    .context("DB_MAX_CONNECTIONS must be a positive number")?,
                None => 10,
            },
        };

        let requested_ttl = match get("JWT_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .context("JWT_TTL_MINUTES must be a number of minutes")?,
            None => MAX_TTL_MINUTES,
        };
        let ttl_minutes = requested_ttl.clamp(MIN_TTL_MINUTES, MAX_TTL_MINUTES);
        if ttl_minutes != requested_ttl {
            warn!(requested_ttl, ttl_minutes, "JWT_TTL_MINUTES out of range, clamped");
        }
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "accounts".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "accounts-users".into()),
            ttl_minutes,
        };

        let http = HttpConfig {
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: match get("APP_PORT") {
                Some(p) => p.parse::<u16>().context("APP_PORT must be a port number")?,
                None => 8080,
            },
        };

        Ok(Self {
            database,
            jwt,
            http,
        })
    }
}
