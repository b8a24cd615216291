use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::models::League;
use crate::error::{IngestError, Result};

/// Per-league schedule state, stored as `<base>/config/<league>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub league: League,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Last date whose games were all dispatched; `None` = never run
    #[serde(default)]
    pub last_update: Option<NaiveDate>,
    #[serde(default)]
    pub current_season: Option<i32>,
}

impl LeagueConfig {
    /// Dates still to process, in order.
    ///
    /// Starts the day after `last_update` (or at `start_date`) and runs up
    /// to, but not including, the earlier of `end_date` and `today + lookahead`.
    pub fn due_dates(&self, today: NaiveDate, lookahead: u64) -> Vec<NaiveDate> {
        let first = match self.last_update {
            Some(last) => match last.checked_add_days(Days::new(1)) {
                Some(d) => d,
                None => return Vec::new(),
            },
            None => self.start_date,
        };
        let horizon = today
            .checked_add_days(Days::new(lookahead))
            .unwrap_or(NaiveDate::MAX);
        let end = self.end_date.min(horizon);
        first.iter_days().take_while(|d| *d < end).collect()
    }

    /// Move the watermark forward. Never moves it back.
    pub fn advance(&mut self, date: NaiveDate) -> bool {
        if self.last_update.is_some_and(|last| last >= date) {
            return false;
        }
        self.last_update = Some(date);
        true
    }
}

/// Reads and writes league schedule files under one directory.
#[derive(Debug, Clone)]
pub struct LeagueConfigStore {
    dir: PathBuf,
}

impl LeagueConfigStore {
    pub fn new(base_path: &Path) -> Self {
        LeagueConfigStore {
            dir: base_path.join("config"),
        }
    }

    pub fn path(&self, league: League) -> PathBuf {
        self.dir.join(format!("{}.json", league.prefix()))
    }

    /// Leagues among `leagues` that have a schedule file.
    pub fn configured(&self, leagues: &[League]) -> Vec<League> {
        leagues
            .iter()
            .copied()
            .filter(|league| {
                let path = self.path(*league);
                let present = path.is_file();
                if !present {
                    info!("No schedule for {} at {}; skipping", league, path.display());
                }
                present
            })
            .collect()
    }

    pub fn load(&self, league: League) -> Result<LeagueConfig> {
        let path = self.path(league);
        let bytes = fs::read(&path).map_err(|e| {
            IngestError::Schedule(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: LeagueConfig = serde_json::from_slice(&bytes)?;
        if config.league != league {
            return Err(IngestError::Schedule(format!(
                "{} describes {} instead of {}",
                path.display(),
                config.league,
                league
            )));
        }
        Ok(config)
    }

    pub fn save(&self, config: &LeagueConfig) -> Result<()> {
        let path = self.path(config.league);
        fs::create_dir_all(&self.dir).map_err(|e| IngestError::Cache {
            path: self.dir.display().to_string(),
            source: e,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(config)?).map_err(|e| IngestError::Cache {
            path: tmp.display().to_string(),
            source: e,
        })?;
        fs::rename(&tmp, &path).map_err(|e| IngestError::Cache {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// Advance the stored watermark to `date` and persist it.
    pub fn advance(&self, config: &mut LeagueConfig, date: NaiveDate) -> Result<()> {
        if config.advance(date) {
            self.save(config)?;
            info!("{} watermark advanced to {}", config.league, date);
        }
        Ok(())
    }
}
