use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::{require, Capability, Parts};
use crate::cache::{CacheKey, CacheKind, FileCache};
use crate::db::models::{GameDescriptor, Matchup};
use crate::error::Result;
use crate::providers::{DownloadAgent, NormalizeAgent};

/// Lineups are re-fetched only this close to first pitch / tip-off.
pub const REFRESH_WINDOW_HOURS: i64 = 3;

/// Pregame working documents. Cached only; the odds list only grows.
pub struct MatchupProcessor {
    download: Arc<dyn DownloadAgent>,
    normalize: Arc<dyn NormalizeAgent>,
    cache: FileCache,
}

impl MatchupProcessor {
    pub const ENTITY: &'static str = "matchup";
    pub const CAPABILITIES: &'static [Capability] =
        &[Capability::Fetch, Capability::Normalize, Capability::Cache];

    pub fn new(parts: Parts) -> Result<Self> {
        parts.check(Self::ENTITY, Self::CAPABILITIES)?;
        Ok(MatchupProcessor {
            download: require(parts.download, Self::ENTITY, Capability::Fetch)?,
            normalize: require(parts.normalize, Self::ENTITY, Capability::Normalize)?,
            cache: require(parts.cache, Self::ENTITY, Capability::Cache)?,
        })
    }

    pub fn supported(&self) -> bool {
        self.normalize.supports_matchup()
    }

    /// Create or refresh the cached matchup of one upcoming game.
    pub async fn process(&self, game: &GameDescriptor, now: DateTime<Utc>) -> Result<Option<Matchup>> {
        let key = CacheKey::for_game(CacheKind::Matchup, game);
        let matchup = match self.cache.read::<Matchup>(&key)? {
            None => {
                if game.url.is_none() {
                    debug!("No matchup page yet for {}", game.game_id);
                    return Ok(None);
                }
                let raw = self.download.fetch_matchup(game).await?;
                let mut fresh = self.normalize.matchup(&raw, game)?;
                fresh.odds.extend(game.odds.iter().cloned());
                info!("New {} matchup {}", game.provider, game.game_id);
                fresh
            }
            Some(cached) if needs_refresh(&cached, game, now) => {
                let raw = self.download.fetch_matchup(game).await?;
                let fresh = self.normalize.matchup(&raw, game)?;
                info!("Refreshed {} matchup {}", game.provider, game.game_id);
                merge(cached, fresh, game)
            }
            Some(mut cached) => {
                cached.odds.extend(game.odds.iter().cloned());
                cached.status = game.status;
                debug!(
                    "Appended {} odds snapshot(s) to {}",
                    game.odds.len(),
                    game.game_id
                );
                cached
            }
        };
        self.cache.write(&key, &matchup)?;
        Ok(Some(matchup))
    }
}

/// Lineups still missing and the game starts within the refresh window.
fn needs_refresh(cached: &Matchup, game: &GameDescriptor, now: DateTime<Utc>) -> bool {
    let until_start = game.game_time.with_timezone(&Utc) - now;
    game.url.is_some()
        && !cached.has_lineups()
        && until_start > Duration::zero()
        && until_start <= Duration::hours(REFRESH_WINDOW_HOURS)
}

/// Fresh page content over the cached document; odds are the cached series
/// followed by the fresh page's and the scoreboard's snapshots.
fn merge(cached: Matchup, mut fresh: Matchup, game: &GameDescriptor) -> Matchup {
    let mut odds = cached.odds;
    odds.append(&mut fresh.odds);
    odds.extend(game.odds.iter().cloned());
    fresh.odds = odds;
    if fresh.lineups.is_none() {
        fresh.lineups = cached.lineups;
    }
    fresh
}
