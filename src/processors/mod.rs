//! Per-entity fetch / normalize / cache / persist pipelines.
//!
//! Every entity kind declares the capabilities it needs. A processor is only
//! built when all of them are supplied, so a missing cache or database is a
//! startup error instead of a mid-run surprise.

mod boxscore;
mod matchup;
mod player;
mod scoreboard;

pub use boxscore::BoxscoreProcessor;
pub use matchup::MatchupProcessor;
pub use player::PlayerProcessor;
pub use scoreboard::ScoreboardProcessor;

use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheKey, FileCache};
use crate::db::models::RawPayload;
use crate::db::Database;
use crate::error::{IngestError, Result};
use crate::providers::{Agents, DownloadAgent, NormalizeAgent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Fetch,
    Normalize,
    Cache,
    Persist,
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Capability::Fetch => "fetch",
            Capability::Normalize => "normalize",
            Capability::Cache => "cache",
            Capability::Persist => "persist",
        }
    }
}

/// Collaborators on offer when building a processor.
#[derive(Clone, Default)]
pub struct Parts {
    pub download: Option<Arc<dyn DownloadAgent>>,
    pub normalize: Option<Arc<dyn NormalizeAgent>>,
    pub cache: Option<FileCache>,
    pub db: Option<Database>,
}

impl Parts {
    pub fn new(agents: &Agents) -> Self {
        Parts {
            download: Some(agents.download.clone()),
            normalize: Some(agents.normalize.clone()),
            cache: None,
            db: None,
        }
    }

    pub fn with_cache(mut self, cache: FileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_db(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    /// Confirm every capability in `needed` is present.
    fn check(&self, entity: &'static str, needed: &[Capability]) -> Result<()> {
        for &cap in needed {
            let present = match cap {
                Capability::Fetch => self.download.is_some(),
                Capability::Normalize => self.normalize.is_some(),
                Capability::Cache => self.cache.is_some(),
                Capability::Persist => self.db.is_some(),
            };
            if !present {
                return Err(IngestError::Capability {
                    entity,
                    capability: cap.name(),
                });
            }
        }
        Ok(())
    }
}

fn require<T>(slot: Option<T>, entity: &'static str, cap: Capability) -> Result<T> {
    slot.ok_or(IngestError::Capability {
        entity,
        capability: cap.name(),
    })
}

/// Cached raw payload for `key`, fetching and caching it on a miss.
///
/// A hit is returned as-is without touching the network. On a miss with no
/// retrievable source the entity is skipped (`Ok(None)`).
async fn cached_or_fetch<F, Fut>(
    cache: &FileCache,
    key: &CacheKey,
    has_source: bool,
    fetch: F,
) -> Result<Option<RawPayload>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<RawPayload>>,
{
    if let Some(raw) = cache.read::<RawPayload>(key)? {
        return Ok(Some(raw));
    }
    if !has_source {
        debug!("No source for {}; skipping", key.local_id);
        return Ok(None);
    }
    let raw = fetch().await?;
    cache.write(key, &raw)?;
    Ok(Some(raw))
}
