use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::cache::FileCache;
use crate::db::models::{GameDescriptor, GameStatus, League, Provider};
use crate::db::Database;
use crate::identity::{IdentityResolver, DEFAULT_NAME_CUTOFF};
use crate::processors::{
    BoxscoreProcessor, MatchupProcessor, Parts, PlayerProcessor, ScoreboardProcessor,
};
use crate::providers::ProviderRegistry;
use crate::schedule::LeagueConfigStore;

/// Game types that are listed on scoreboards but never ingested.
const EXHIBITION_TYPES: &[&str] = &["preseason", "spring_training", "spring", "exhibition"];

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    pub lookahead_days: u64,
    pub fetch_players: bool,
    pub name_match_cutoff: f64,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        OrchestratorOptions {
            lookahead_days: 2,
            fetch_players: false,
            name_match_cutoff: DEFAULT_NAME_CUTOFF,
        }
    }
}

/// Per-date counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateSummary {
    pub listed: usize,
    pub boxscores: usize,
    pub matchups: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DateSummary {
    fn add(&mut self, other: DateSummary) {
        self.listed += other.listed;
        self.boxscores += other.boxscores;
        self.matchups += other.matchups;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Dates that advanced the watermark
    pub caught_up: Vec<NaiveDate>,
    /// First date whose scoreboard could not be processed
    pub stopped_at: Option<NaiveDate>,
    pub lookahead: Vec<NaiveDate>,
    pub totals: DateSummary,
}

/// One provider's processors for a league.
struct ProviderPipeline {
    provider: Provider,
    scoreboard: ScoreboardProcessor,
    boxscore: BoxscoreProcessor,
    matchup: MatchupProcessor,
    player: Option<PlayerProcessor>,
}

/// Drives one league: catch-up over completed dates, then a look-ahead pass
/// over upcoming ones. Providers run in the configured order.
pub struct LeagueOrchestrator {
    league: League,
    pipelines: Vec<ProviderPipeline>,
    store: LeagueConfigStore,
    options: OrchestratorOptions,
}

impl LeagueOrchestrator {
    pub fn new(
        league: League,
        registry: &ProviderRegistry,
        providers: &[Provider],
        cache: FileCache,
        db: Database,
        store: LeagueConfigStore,
        options: OrchestratorOptions,
    ) -> crate::error::Result<Self> {
        let resolver = IdentityResolver::new(options.name_match_cutoff);
        let mut pipelines = Vec::with_capacity(providers.len());
        for &provider in providers {
            let agents = registry.get(league, provider)?;
            let parts = Parts::new(agents)
                .with_cache(cache.clone())
                .with_db(db.clone());
            let player = if options.fetch_players {
                Some(PlayerProcessor::new(parts.clone())?)
            } else {
                None
            };
            pipelines.push(ProviderPipeline {
                provider,
                scoreboard: ScoreboardProcessor::new(parts.clone())?,
                boxscore: BoxscoreProcessor::new(parts.clone(), resolver)?,
                matchup: MatchupProcessor::new(parts)?,
                player,
            });
        }
        Ok(LeagueOrchestrator {
            league,
            pipelines,
            store,
            options,
        })
    }

    pub async fn run(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<RunReport> {
        let mut config = self
            .store
            .load(self.league)
            .with_context(|| format!("Failed to load {} schedule", self.league))?;
        let mut report = RunReport::default();

        let due = config.due_dates(today, 0);
        info!(
            "{}: {} date(s) to catch up (last update {:?})",
            self.league,
            due.len(),
            config.last_update
        );
        for date in due {
            match self.process_date(date, now).await {
                Ok(summary) => {
                    report.totals.add(summary);
                    self.store
                        .advance(&mut config, date)
                        .with_context(|| format!("Failed to save {} watermark", self.league))?;
                    report.caught_up.push(date);
                }
                Err(e) => {
                    error!("{} {}: {:#}; stopping catch-up", self.league, date, e);
                    report.stopped_at = Some(date);
                    break;
                }
            }
        }

        for date in config
            .due_dates(today, self.options.lookahead_days)
            .into_iter()
            .filter(|d| *d >= today)
        {
            match self.process_date(date, now).await {
                Ok(summary) => report.totals.add(summary),
                Err(e) => error!("{} look-ahead {}: {:#}", self.league, date, e),
            }
            report.lookahead.push(date);
        }
        Ok(report)
    }

    /// Every provider's games for one date. A scoreboard failure fails the
    /// date; a single game's failure is only logged.
    async fn process_date(&self, date: NaiveDate, now: DateTime<Utc>) -> Result<DateSummary> {
        let mut summary = DateSummary::default();
        for pipeline in &self.pipelines {
            let games = pipeline
                .scoreboard
                .process(date)
                .await
                .with_context(|| format!("{} scoreboard for {}", pipeline.provider, date))?;
            summary.listed += games.len();
            for game in &games {
                self.dispatch(pipeline, game, now, &mut summary).await;
            }
        }
        info!(
            "{} {}: {} listed, {} boxscore(s), {} matchup(s), {} skipped, {} failed",
            self.league,
            date,
            summary.listed,
            summary.boxscores,
            summary.matchups,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    async fn dispatch(
        &self,
        pipeline: &ProviderPipeline,
        game: &GameDescriptor,
        now: DateTime<Utc>,
        summary: &mut DateSummary,
    ) {
        if is_exhibition(game.game_type.as_deref()) {
            debug!("Skipping {:?} game {}", game.game_type, game.game_id);
            summary.skipped += 1;
            return;
        }
        match game.status {
            GameStatus::Final => match pipeline.boxscore.process(game).await {
                Ok(Some(bx)) => {
                    summary.boxscores += 1;
                    if let Some(player) = &pipeline.player {
                        for p in &bx.players {
                            if let Err(e) = player.process(&p.player_id).await {
                                warn!("Bio for {} failed: {}", p.player_id, e);
                            }
                        }
                    }
                }
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    warn!("{} boxscore {} failed: {}", pipeline.provider, game.game_id, e);
                    summary.failed += 1;
                }
            },
            GameStatus::Pregame if pipeline.matchup.supported() => {
                match pipeline.matchup.process(game, now).await {
                    Ok(Some(_)) => summary.matchups += 1,
                    Ok(None) => summary.skipped += 1,
                    Err(e) => {
                        warn!("{} matchup {} failed: {}", pipeline.provider, game.game_id, e);
                        summary.failed += 1;
                    }
                }
            }
            status => {
                debug!("Nothing to do for {} ({:?})", game.game_id, status);
                summary.skipped += 1;
            }
        }
    }
}

fn is_exhibition(game_type: Option<&str>) -> bool {
    game_type.is_some_and(|t| EXHIBITION_TYPES.contains(&t.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::EntityType;
    use crate::db::TABLES;
    use crate::error::IngestError;
    use crate::fixtures::{self, FakeDownloader};
    use crate::providers::{espn::EspnNormalizer, yahoo::YahooNormalizer, DownloadAgent};
    use crate::schedule::LeagueConfig;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Env {
        _dir: tempfile::TempDir,
        cache: FileCache,
        db: Database,
        store: LeagueConfigStore,
    }

    fn env() -> Env {
        let dir = tempfile::tempdir().unwrap();
        let store = LeagueConfigStore::new(dir.path());
        reset_schedule(&store);
        Env {
            cache: FileCache::new(dir.path().join("cache")),
            db: Database::open_in_memory().unwrap(),
            store,
            _dir: dir,
        }
    }

    fn reset_schedule(store: &LeagueConfigStore) {
        store
            .save(&LeagueConfig {
                league: League::Mlb,
                start_date: fixtures::game_date(),
                end_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
                last_update: None,
                current_season: Some(2024),
            })
            .unwrap();
    }

    fn today() -> NaiveDate {
        fixtures::game_date().succ_opt().unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-04-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn registry(yahoo: Arc<dyn DownloadAgent>, espn: Arc<dyn DownloadAgent>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(League::Mlb, yahoo, Arc::new(YahooNormalizer::new(League::Mlb)));
        registry.register(League::Mlb, espn, Arc::new(EspnNormalizer::new(League::Mlb)));
        registry
    }

    fn orchestrator(env: &Env, registry: &ProviderRegistry, options: OrchestratorOptions) -> LeagueOrchestrator {
        LeagueOrchestrator::new(
            League::Mlb,
            registry,
            &[Provider::Yahoo, Provider::Espn],
            env.cache.clone(),
            env.db.clone(),
            env.store.clone(),
            options,
        )
        .unwrap()
    }

    fn row_counts(db: &Database) -> Vec<i64> {
        TABLES.iter().map(|t| db.count_rows(t).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_two_providers_one_game() {
        let env = env();
        let registry = registry(Arc::new(FakeDownloader::yahoo()), Arc::new(FakeDownloader::espn()));
        let report = orchestrator(&env, &registry, OrchestratorOptions::default())
            .run(today(), now())
            .await
            .unwrap();

        assert_eq!(report.caught_up, vec![fixtures::game_date()]);
        assert_eq!(report.stopped_at, None);
        assert_eq!(report.totals.boxscores, 2);
        assert_eq!(report.totals.matchups, 1);
        assert_eq!(env.db.count_rows("games").unwrap(), 1);

        let maps = env
            .db
            .mappings_for(EntityType::Game, fixtures::CANONICAL_GAME_ID)
            .unwrap();
        assert_eq!(maps.len(), 2);
        let local = |provider| {
            maps.iter()
                .find(|m| m.provider == provider)
                .map(|m| m.provider_id.as_str())
        };
        assert_eq!(local(Provider::Yahoo), Some(fixtures::YAHOO_GAME_ID));
        assert_eq!(local(Provider::Espn), Some(fixtures::ESPN_GAME_ID));

        assert_eq!(
            env.store.load(League::Mlb).unwrap().last_update,
            Some(fixtures::game_date())
        );
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let env = env();
        let yahoo = Arc::new(FakeDownloader::yahoo());
        let registry = registry(yahoo.clone(), Arc::new(FakeDownloader::espn()));
        let orchestrator = orchestrator(&env, &registry, OrchestratorOptions::default());

        orchestrator.run(today(), now()).await.unwrap();
        let first = row_counts(&env.db);
        let fetches = yahoo.calls();

        reset_schedule(&env.store);
        orchestrator.run(today(), now()).await.unwrap();
        assert_eq!(row_counts(&env.db), first);
        // Only the scoreboards are fetched again; every game page is cached.
        assert_eq!(yahoo.calls(), fetches + 3);
    }

    struct DownScoreboard;

    #[async_trait]
    impl DownloadAgent for DownScoreboard {
        fn provider(&self) -> Provider {
            Provider::Espn
        }

        async fn fetch_scoreboard(&self, _league: League, _date: NaiveDate) -> crate::error::Result<crate::db::models::RawPayload> {
            Err(IngestError::RetriesExhausted {
                url: "scoreboard".into(),
                attempts: 4,
                last: "connection refused".into(),
            })
        }

        async fn fetch_boxscore(&self, game: &GameDescriptor) -> crate::error::Result<crate::db::models::RawPayload> {
            Err(IngestError::Extract(game.game_id.clone()))
        }
    }

    #[tokio::test]
    async fn test_scoreboard_failure_holds_watermark() {
        let env = env();
        let registry = registry(Arc::new(FakeDownloader::yahoo()), Arc::new(DownScoreboard));
        let report = orchestrator(&env, &registry, OrchestratorOptions::default())
            .run(today(), now())
            .await
            .unwrap();

        assert!(report.caught_up.is_empty());
        assert_eq!(report.stopped_at, Some(fixtures::game_date()));
        assert_eq!(env.store.load(League::Mlb).unwrap().last_update, None);
    }

    #[tokio::test]
    async fn test_fetch_players_stores_known_bios() {
        let env = env();
        let registry = registry(Arc::new(FakeDownloader::yahoo()), Arc::new(FakeDownloader::espn()));
        let options = OrchestratorOptions {
            fetch_players: true,
            ..Default::default()
        };
        orchestrator(&env, &registry, options).run(today(), now()).await.unwrap();
        // Only Rivera's page exists; the other lookups fail without aborting.
        assert_eq!(env.db.count_rows("player_bios").unwrap(), 1);
        assert_eq!(env.db.count_rows("games").unwrap(), 1);
    }

    #[test]
    fn test_missing_registry_entry_is_construction_error() {
        let env = env();
        let registry = ProviderRegistry::new();
        let err = LeagueOrchestrator::new(
            League::Mlb,
            &registry,
            &[Provider::Yahoo],
            env.cache.clone(),
            env.db.clone(),
            env.store.clone(),
            OrchestratorOptions::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, IngestError::MissingAgent { .. }));
    }

    #[test]
    fn test_exhibition_types() {
        assert!(is_exhibition(Some("preseason")));
        assert!(is_exhibition(Some("Spring_Training")));
        assert!(!is_exhibition(Some("regular")));
        assert!(!is_exhibition(None));
    }
}
