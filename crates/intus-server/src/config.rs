use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "changeme",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub token_ttl: chrono::Duration,
    pub reply_delay: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("INTUS_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("INTUS_JWT_SECRET is unset or still a placeholder; set it in your .env file and restart");
        }

        let db_path = lookup("INTUS_DB_PATH").unwrap_or_else(|| "intus.db".into()).into();
        let host = lookup("INTUS_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("INTUS_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("INTUS_PORT must be a port number")?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {host}:{port}"))?;

        let ttl_days: i64 = parse_or("INTUS_TOKEN_TTL_DAYS", &lookup, 30)?;
        if ttl_days < 1 {
            bail!("INTUS_TOKEN_TTL_DAYS must be at least 1");
        }
        let delay_ms: u64 = parse_or("INTUS_CHAT_DELAY_MS", &lookup, 800)?;

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            token_ttl: chrono::Duration::days(ttl_days),
            reply_delay: Duration::from_millis(delay_ms),
        })
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("{key} is not a valid number")),
        None => Ok(default),
    }
}
