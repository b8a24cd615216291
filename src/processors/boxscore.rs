use std::sync::Arc;
use tracing::{info, warn};

use super::{cached_or_fetch, require, Capability, Parts};
use crate::cache::{CacheKey, CacheKind, FileCache};
use crate::db::models::{Boxscore, GameDescriptor, PlayerRef};
use crate::db::{Database, GameWrite};
use crate::error::Result;
use crate::identity::IdentityResolver;
use crate::providers::{DownloadAgent, NormalizeAgent};

/// Final games: cache the raw page, normalize, resolve secondary-provider
/// players, persist.
pub struct BoxscoreProcessor {
    download: Arc<dyn DownloadAgent>,
    normalize: Arc<dyn NormalizeAgent>,
    cache: FileCache,
    db: Database,
    resolver: IdentityResolver,
}

impl BoxscoreProcessor {
    pub const ENTITY: &'static str = "boxscore";
    pub const CAPABILITIES: &'static [Capability] = &[
        Capability::Fetch,
        Capability::Normalize,
        Capability::Cache,
        Capability::Persist,
    ];

    pub fn new(parts: Parts, resolver: IdentityResolver) -> Result<Self> {
        parts.check(Self::ENTITY, Self::CAPABILITIES)?;
        Ok(BoxscoreProcessor {
            download: require(parts.download, Self::ENTITY, Capability::Fetch)?,
            normalize: require(parts.normalize, Self::ENTITY, Capability::Normalize)?,
            cache: require(parts.cache, Self::ENTITY, Capability::Cache)?,
            db: require(parts.db, Self::ENTITY, Capability::Persist)?,
            resolver,
        })
    }

    /// Returns the persisted boxscore, or `None` when the game has no page
    /// yet and nothing is cached.
    pub async fn process(&self, game: &GameDescriptor) -> Result<Option<Boxscore>> {
        let key = CacheKey::for_game(CacheKind::Boxscore, game);
        let Some(raw) = cached_or_fetch(&self.cache, &key, game.url.is_some(), || {
            self.download.fetch_boxscore(game)
        })
        .await?
        else {
            return Ok(None);
        };

        let mut bx = self.normalize.boxscore(&raw, game)?;
        self.resolve_players(&mut bx)?;

        match self.db.insert_boxscore(&bx)? {
            GameWrite::Inserted => info!(
                "Stored {} boxscore {} ({})",
                bx.provider, bx.game.game_id, game.game_id
            ),
            GameWrite::AlreadyExists => warn!(
                "Game {} already stored; {} children skipped",
                bx.game.game_id, bx.provider
            ),
        }
        Ok(Some(bx))
    }

    /// Rewrite name-only player refs against players already stored for the
    /// game's two teams.
    fn resolve_players(&self, bx: &mut Boxscore) -> Result<()> {
        let named = |r: &PlayerRef| matches!(r, PlayerRef::Named(_));
        let needs_resolution = bx.misc.at_bats.iter().any(|ab| named(&ab.batter) || named(&ab.pitcher))
            || bx.misc.pitches.iter().any(|p| named(&p.batter) || named(&p.pitcher));
        if !needs_resolution {
            return Ok(());
        }
        let candidates = self
            .db
            .players_for_teams(&[bx.game.home_id.as_str(), bx.game.away_id.as_str()])?;
        let unresolved = self.resolver.reconcile(bx, &candidates);
        if !unresolved.is_empty() {
            warn!(
                "{} unresolved {} player(s) in {}: {}",
                unresolved.len(),
                bx.provider,
                bx.game.game_id,
                unresolved.join(", ")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{EntityType, League};
    use crate::fixtures::{self, FakeDownloader};
    use crate::providers::{espn::EspnNormalizer, yahoo::YahooNormalizer, Agents};

    struct Harness {
        _dir: tempfile::TempDir,
        db: Database,
        cache: FileCache,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        Harness {
            cache: FileCache::new(dir.path()),
            db: Database::open_in_memory().unwrap(),
            _dir: dir,
        }
    }

    fn processor(h: &Harness, agents: &Agents) -> BoxscoreProcessor {
        let parts = Parts::new(agents)
            .with_cache(h.cache.clone())
            .with_db(h.db.clone());
        BoxscoreProcessor::new(parts, IdentityResolver::default()).unwrap()
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let h = harness();
        let download = Arc::new(FakeDownloader::yahoo());
        let agents = Agents {
            download: download.clone(),
            normalize: Arc::new(YahooNormalizer::new(League::Mlb)),
        };
        let processor = processor(&h, &agents);
        let game = fixtures::yahoo_final_descriptor();

        let first = processor.process(&game).await.unwrap().unwrap();
        assert_eq!(download.calls(), 1);
        assert!(h.cache.contains(&CacheKey::for_game(CacheKind::Boxscore, &game)));

        let second = processor.process(&game).await.unwrap().unwrap();
        assert_eq!(download.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(h.db.count_rows("games").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_url_is_skipped() {
        let h = harness();
        let download = Arc::new(FakeDownloader::yahoo());
        let agents = Agents {
            download: download.clone(),
            normalize: Arc::new(YahooNormalizer::new(League::Mlb)),
        };
        let mut game = fixtures::yahoo_final_descriptor();
        game.url = None;

        assert!(processor(&h, &agents).process(&game).await.unwrap().is_none());
        assert_eq!(download.calls(), 0);
        assert_eq!(h.db.count_rows("games").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_secondary_provider_resolves_against_stored_players() {
        let h = harness();
        let yahoo = Agents {
            download: Arc::new(FakeDownloader::yahoo()),
            normalize: Arc::new(YahooNormalizer::new(League::Mlb)),
        };
        let espn = Agents {
            download: Arc::new(FakeDownloader::espn()),
            normalize: Arc::new(EspnNormalizer::new(League::Mlb)),
        };
        processor(&h, &yahoo)
            .process(&fixtures::yahoo_final_descriptor())
            .await
            .unwrap();

        let bx = processor(&h, &espn)
            .process(&fixtures::espn_final_descriptor())
            .await
            .unwrap()
            .unwrap();
        assert!(bx
            .misc
            .pitches
            .iter()
            .all(|p| p.batter.canonical().is_some() && p.pitcher.canonical().is_some()));

        let rivera = h.db.mappings_for(EntityType::Player, "mlb.p.9001").unwrap();
        assert_eq!(rivera.len(), 2);
        assert_eq!(h.db.count_rows("games").unwrap(), 1);
        // The Yahoo rows won; ESPN's streams were not added.
        assert_eq!(h.db.count_rows("pitches").unwrap(), 1);
    }
}
