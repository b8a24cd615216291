use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use super::{require, Capability, Parts};
use crate::db::models::{GameDescriptor, League, Provider};
use crate::error::Result;
use crate::providers::{DownloadAgent, NormalizeAgent};

/// Lists one date's games. Scoreboards are re-derived every run, so nothing
/// is cached or persisted.
pub struct ScoreboardProcessor {
    download: Arc<dyn DownloadAgent>,
    normalize: Arc<dyn NormalizeAgent>,
}

impl ScoreboardProcessor {
    pub const ENTITY: &'static str = "scoreboard";
    pub const CAPABILITIES: &'static [Capability] = &[Capability::Fetch, Capability::Normalize];

    pub fn new(parts: Parts) -> Result<Self> {
        parts.check(Self::ENTITY, Self::CAPABILITIES)?;
        Ok(ScoreboardProcessor {
            download: require(parts.download, Self::ENTITY, Capability::Fetch)?,
            normalize: require(parts.normalize, Self::ENTITY, Capability::Normalize)?,
        })
    }

    pub fn provider(&self) -> Provider {
        self.normalize.provider()
    }

    pub fn league(&self) -> League {
        self.normalize.league()
    }

    pub async fn process(&self, date: NaiveDate) -> Result<Vec<GameDescriptor>> {
        let raw = self.download.fetch_scoreboard(self.league(), date).await?;
        let games = self.normalize.scoreboard(&raw, date)?;
        debug!(
            "{} {} scoreboard for {}: {} game(s)",
            self.provider(),
            self.league(),
            date,
            games.len()
        );
        Ok(games)
    }
}
