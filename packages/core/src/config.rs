use std::env;

use chrono::FixedOffset;

use crate::accounts::password::DEFAULT_ITERATIONS;
use crate::cli::Cli;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Email relay endpoint. Notifications are only logged when unset.
    pub notify_webhook_url: Option<String>,
    pub sender_email: Option<String>,
    /// Wall clock used for scheduling and for calendar-day arithmetic.
    pub schedule_offset: FixedOffset,
    pub password_hash_iterations: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or("DATABASE_URL is required")?;

        let port = match get("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("SERVER_PORT must be a valid port, got {}", raw))?,
            None => DEFAULT_PORT,
        };

        let offset_minutes = match get("SCHEDULE_UTC_OFFSET_MINUTES") {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| "SCHEDULE_UTC_OFFSET_MINUTES must be a whole number")?,
            None => 0,
        };
        let schedule_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            format!(
                "SCHEDULE_UTC_OFFSET_MINUTES out of range: {}",
                offset_minutes
            )
        })?;

        let password_hash_iterations = match get("PASSWORD_HASH_ITERATIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err("PASSWORD_HASH_ITERATIONS must be a positive number".into()),
            },
            None => DEFAULT_ITERATIONS,
        };

        Ok(Self {
            database_url,
            port,
            notify_webhook_url: get("NOTIFY_WEBHOOK_URL"),
            sender_email: get("SENDER_EMAIL"),
            schedule_offset,
            password_hash_iterations,
        })
    }

    /// Apply command-line overrides.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(url) = &cli.database_url {
            self.database_url = url.clone();
        }
        if let Some(url) = &cli.notify_url {
            self.notify_webhook_url = Some(url.clone());
        }
        self
    }
}
