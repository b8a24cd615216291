pub mod espn;
pub mod json;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use reqwest::Client;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::db::models::{
    Boxscore, GameDescriptor, League, Matchup, PlayerBio, Provider, RawPayload, Team,
};
use crate::error::{IngestError, Result};

// ── Agents ───────────────────────────────────────────────────────────────────

/// Network side of a provider: downloads raw documents.
#[async_trait]
pub trait DownloadAgent: Send + Sync {
    fn provider(&self) -> Provider;

    async fn fetch_scoreboard(&self, league: League, date: NaiveDate) -> Result<RawPayload>;

    async fn fetch_boxscore(&self, game: &GameDescriptor) -> Result<RawPayload>;

    /// Pregame page; same document as the boxscore unless overridden.
    async fn fetch_matchup(&self, game: &GameDescriptor) -> Result<RawPayload> {
        self.fetch_boxscore(game).await
    }

    async fn fetch_player(&self, _league: League, _player_id: &str) -> Result<RawPayload> {
        Err(IngestError::Unsupported {
            provider: self.provider(),
            operation: "player downloads",
        })
    }
}

/// Pure transform from a provider's raw documents to canonical records.
/// One instance per (league, provider).
pub trait NormalizeAgent: Send + Sync {
    fn provider(&self) -> Provider;

    fn league(&self) -> League;

    /// Games listed on one scoreboard date.
    fn scoreboard(&self, raw: &RawPayload, date: NaiveDate) -> Result<Vec<GameDescriptor>>;

    fn boxscore(&self, raw: &RawPayload, game: &GameDescriptor) -> Result<Boxscore>;

    fn supports_matchup(&self) -> bool {
        false
    }

    fn matchup(&self, _raw: &RawPayload, _game: &GameDescriptor) -> Result<Matchup> {
        Err(IngestError::Unsupported {
            provider: self.provider(),
            operation: "matchups",
        })
    }

    fn player(&self, _raw: &RawPayload, _player_id: &str) -> Result<PlayerBio> {
        Err(IngestError::Unsupported {
            provider: self.provider(),
            operation: "player bios",
        })
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Agents {
    pub download: Arc<dyn DownloadAgent>,
    pub normalize: Arc<dyn NormalizeAgent>,
}

/// (league, provider) -> agents. Built once at startup.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: BTreeMap<(League, Provider), Agents>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yahoo and ESPN agents for every supported league over one shared
    /// fetcher.
    pub fn standard(fetcher: HttpFetcher, yahoo_base: &str, espn_base: &str) -> Self {
        let fetcher = Arc::new(fetcher);
        let yahoo: Arc<dyn DownloadAgent> =
            Arc::new(yahoo::YahooDownloader::new(fetcher.clone(), yahoo_base));
        let espn: Arc<dyn DownloadAgent> =
            Arc::new(espn::EspnDownloader::new(fetcher, espn_base));

        let mut registry = ProviderRegistry::new();
        for league in League::ALL {
            registry.register(
                league,
                yahoo.clone(),
                Arc::new(yahoo::YahooNormalizer::new(league)),
            );
            registry.register(
                league,
                espn.clone(),
                Arc::new(espn::EspnNormalizer::new(league)),
            );
        }
        registry
    }

    pub fn register(
        &mut self,
        league: League,
        download: Arc<dyn DownloadAgent>,
        normalize: Arc<dyn NormalizeAgent>,
    ) {
        let provider = normalize.provider();
        self.entries
            .insert((league, provider), Agents { download, normalize });
    }

    pub fn get(&self, league: League, provider: Provider) -> Result<&Agents> {
        self.entries
            .get(&(league, provider))
            .ok_or(IngestError::MissingAgent { league, provider })
    }

    /// Every requested pair must be registered, with both agents speaking
    /// for the same provider and the normalizer for the right league.
    pub fn validate(&self, leagues: &[League], providers: &[Provider]) -> Result<()> {
        for &league in leagues {
            for &provider in providers {
                let agents = self.get(league, provider)?;
                if agents.download.provider() != provider
                    || agents.normalize.league() != league
                {
                    return Err(IngestError::MissingAgent { league, provider });
                }
            }
        }
        Ok(())
    }
}

// ── Retry ────────────────────────────────────────────────────────────────────

/// Bounded exponential backoff with jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Sleep before retry number `attempt` (1-based): doubled per attempt,
    /// capped, plus up to a quarter of random jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay);
        let quarter = backoff.as_millis() as u64 / 4;
        let jitter = if quarter > 0 {
            rand::thread_rng().gen_range(0..=quarter)
        } else {
            0
        };
        backoff + Duration::from_millis(jitter)
    }
}

/// Run `op` until it succeeds or the attempt ceiling is hit.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                return Err(IngestError::RetriesExhausted {
                    url: label.to_string(),
                    attempts,
                    last: e.to_string(),
                });
            }
            Err(e) => {
                let delay = policy.delay(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {} - retrying in {:?}",
                    label, attempt, attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

// ── HTTP ─────────────────────────────────────────────────────────────────────

/// Shared page fetcher: GET, extract the embedded document, retry both.
pub struct HttpFetcher {
    http: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("boxscore-ingest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { http, retry })
    }

    /// Fetch `url` and run `extract` over the body. A failed extraction is
    /// retried like a failed request.
    pub async fn fetch_embedded<F>(&self, url: &str, extract: F) -> Result<serde_json::Value>
    where
        F: Fn(&str) -> Result<serde_json::Value> + Send + Sync,
    {
        let extract = &extract;
        with_retry(&self.retry, url, || async move {
            debug!("GET {}", url);
            let resp = self.http.get(url).send().await?.error_for_status()?;
            let body = resp.text().await?;
            extract(&body)
        })
        .await
    }
}

/// Text between `start` and the first `end` after it.
pub fn between<'a>(body: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = body.find(start)? + start.len();
    let len = body[from..].find(end)?;
    Some(&body[from..from + len])
}

/// Rename teams the providers still list under retired names.
pub fn fix_team_names(team: &mut Team) {
    if team.display_name.as_deref() == Some("Cleveland Indians") {
        team.display_name = Some("Cleveland Guardians".to_string());
    }
    if team.last_name.as_deref() == Some("Indians") && team.first_name.as_deref() == Some("Cleveland") {
        team.last_name = Some("Guardians".to_string());
    }
    if team.last_name.as_deref() == Some("Athletics") {
        team.first_name = Some("Oakland".to_string());
    }
}
