use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::db::models::{League, Provider};
use crate::providers::{espn, yahoo, RetryPolicy};

/// Incremental boxscore ingestion across providers
#[derive(Parser, Debug, Clone)]
#[command(name = "boxscore-ingest", version, about)]
pub struct Config {
    /// League to process (NBA, NCAAB, MLB); all leagues when omitted
    pub league: Option<League>,

    /// Root directory for the file cache, league schedules and the database
    #[arg(long, env = "INGEST_BASE_PATH")]
    pub base_path: PathBuf,

    /// SQLite database path (defaults to <base-path>/ingest.db)
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Providers in writer-priority order
    #[arg(
        long,
        env = "INGEST_PROVIDERS",
        value_delimiter = ',',
        default_value = "yahoo,espn"
    )]
    pub providers: Vec<Provider>,

    /// Upcoming days re-polled for pregame matchups
    #[arg(long, env = "LOOKAHEAD_DAYS", default_value = "2")]
    pub lookahead_days: u64,

    /// Attempts per request before giving up
    #[arg(long, env = "MAX_FETCH_ATTEMPTS", default_value = "4")]
    pub max_fetch_attempts: u32,

    /// First retry delay in milliseconds (doubles per attempt)
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value = "500")]
    pub retry_base_delay_ms: u64,

    /// Ceiling for the retry delay in milliseconds
    #[arg(long, env = "RETRY_MAX_DELAY_MS", default_value = "8000")]
    pub retry_max_delay_ms: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "20")]
    pub http_timeout_secs: u64,

    /// Local hour the run window opens
    #[arg(long, env = "WINDOW_START_HOUR", default_value = "5")]
    pub window_start_hour: u32,

    /// Local hour the run window closes
    #[arg(long, env = "WINDOW_END_HOUR", default_value = "22")]
    pub window_end_hour: u32,

    /// Run regardless of the local time of day
    #[arg(long, env = "IGNORE_WINDOW", default_value = "false")]
    pub ignore_window: bool,

    /// Minimum name similarity (0.0–1.0) for matching players across providers
    #[arg(long, env = "NAME_MATCH_CUTOFF", default_value = "0.7")]
    pub name_match_cutoff: f64,

    /// Fetch bios for players seen in new boxscores
    #[arg(long, env = "FETCH_PLAYERS", default_value = "false")]
    pub fetch_players: bool,

    /// Yahoo Sports base URL
    #[arg(long, env = "YAHOO_BASE_URL", default_value = yahoo::DEFAULT_BASE_URL)]
    pub yahoo_base_url: String,

    /// ESPN base URL
    #[arg(long, env = "ESPN_BASE_URL", default_value = espn::DEFAULT_BASE_URL)]
    pub espn_base_url: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("at least one provider is required");
        }
        for (i, p) in self.providers.iter().enumerate() {
            if self.providers[..i].contains(p) {
                anyhow::bail!("provider {} listed twice", p);
            }
        }
        if self.max_fetch_attempts == 0 {
            anyhow::bail!("max_fetch_attempts must be at least 1");
        }
        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            anyhow::bail!("retry_base_delay_ms must not exceed retry_max_delay_ms");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        if self.window_start_hour > 23 || self.window_end_hour > 24 {
            anyhow::bail!("window hours must be within 0..=24");
        }
        if self.window_start_hour >= self.window_end_hour {
            anyhow::bail!("window_start_hour must be before window_end_hour");
        }
        if !(0.0..=1.0).contains(&self.name_match_cutoff) {
            anyhow::bail!("name_match_cutoff must be between 0.0 and 1.0");
        }
        if self.lookahead_days > 14 {
            anyhow::bail!("lookahead_days must be at most 14");
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.base_path.join("ingest.db"))
    }

    pub fn cache_root(&self) -> PathBuf {
        self.base_path.join("cache")
    }

    pub fn leagues(&self) -> Vec<League> {
        match self.league {
            Some(league) => vec![league],
            None => League::ALL.to_vec(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_fetch_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Whether `hour` (local) falls inside the run window.
    pub fn in_window(&self, hour: u32) -> bool {
        self.ignore_window || (self.window_start_hour..self.window_end_hour).contains(&hour)
    }
}
