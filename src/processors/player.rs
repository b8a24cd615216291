use std::sync::Arc;
use tracing::{debug, info};

use super::{cached_or_fetch, require, Capability, Parts};
use crate::cache::{CacheKey, FileCache};
use crate::db::models::PlayerBio;
use crate::db::Database;
use crate::error::Result;
use crate::providers::{DownloadAgent, NormalizeAgent};

/// Player bios for canonical players, fetched once each.
pub struct PlayerProcessor {
    download: Arc<dyn DownloadAgent>,
    normalize: Arc<dyn NormalizeAgent>,
    cache: FileCache,
    db: Database,
}

impl PlayerProcessor {
    pub const ENTITY: &'static str = "player";
    pub const CAPABILITIES: &'static [Capability] = &[
        Capability::Fetch,
        Capability::Normalize,
        Capability::Cache,
        Capability::Persist,
    ];

    pub fn new(parts: Parts) -> Result<Self> {
        parts.check(Self::ENTITY, Self::CAPABILITIES)?;
        Ok(PlayerProcessor {
            download: require(parts.download, Self::ENTITY, Capability::Fetch)?,
            normalize: require(parts.normalize, Self::ENTITY, Capability::Normalize)?,
            cache: require(parts.cache, Self::ENTITY, Capability::Cache)?,
            db: require(parts.db, Self::ENTITY, Capability::Persist)?,
        })
    }

    /// `None` when a bio is already stored.
    pub async fn process(&self, player_id: &str) -> Result<Option<PlayerBio>> {
        if self.db.has_player_bio(player_id)? {
            debug!("Bio for {} already stored", player_id);
            return Ok(None);
        }
        let league = self.normalize.league();
        let key = CacheKey::for_player(league, player_id);
        let Some(raw) = cached_or_fetch(&self.cache, &key, true, || {
            self.download.fetch_player(league, player_id)
        })
        .await?
        else {
            return Ok(None);
        };
        let bio = self.normalize.player(&raw, player_id)?;
        if self.db.insert_player_bio(&bio)? {
            info!("Stored bio for {} {} ({})", bio.first_name, bio.last_name, player_id);
        }
        Ok(Some(bio))
    }
}
