use std::str::FromStr;

use anyhow::{Context, Result, bail};

const DEFAULT_ADDR: &str = "127.0.0.1:9100";
const DEFAULT_WORKERS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown LOG_FORMAT `{other}`, expected `pretty` or `json`"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub addr: String,
    pub workers: u8,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("BOT_TOKEN must be set before running")?;

        let workers = match lookup("WORKERS") {
            Some(raw) => raw.trim().parse::<u8>().context("WORKERS must be a number between 1 and 255")?,
            None => DEFAULT_WORKERS,
        };
        if workers == 0 {
            bail!("WORKERS must be at least 1");
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        Ok(Config {
            token: token.trim().to_string(),
            addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            workers,
            log_format,
        })
    }
}
