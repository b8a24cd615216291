mod baseball;
mod normalizer;

pub use normalizer::EspnNormalizer;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use super::json::take;
use super::{between, DownloadAgent, HttpFetcher};
use crate::db::models::{GameDescriptor, League, Provider, RawPayload};
use crate::error::{IngestError, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.espn.com";

const FITT_START: &str = "window['__espnfitt__']=";
const FITT_END: &str = ";</script>";

/// ESPN pages carry their data as a `__espnfitt__` global.
pub struct EspnDownloader {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl EspnDownloader {
    pub fn new(fetcher: Arc<HttpFetcher>, base_url: &str) -> Self {
        EspnDownloader {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn join(&self, path: &str) -> Result<String> {
        Ok(Url::parse(&self.base_url)?.join(path)?.to_string())
    }

    async fn gamepackage(&self, url: &str) -> Result<Value> {
        let mut doc = self.fetcher.fetch_embedded(url, extract_fitt).await?;
        match take(&mut doc, "/page/content/gamepackage") {
            Value::Null => Err(IngestError::Extract(format!("page.content.gamepackage in {}", url))),
            package => Ok(package),
        }
    }
}

/// Parse the `__espnfitt__` document out of an ESPN page.
pub fn extract_fitt(html: &str) -> Result<Value> {
    let doc = between(html, FITT_START, FITT_END)
        .ok_or_else(|| IngestError::Extract("__espnfitt__".into()))?;
    Ok(serde_json::from_str(doc)?)
}

/// `/mlb/game/_/gameId/1` -> `/mlb/playbyplay/_/gameId/1`
pub fn play_by_play_path(game_path: &str) -> String {
    game_path.replacen("game", "playbyplay", 1)
}

#[async_trait]
impl DownloadAgent for EspnDownloader {
    fn provider(&self) -> Provider {
        Provider::Espn
    }

    async fn fetch_scoreboard(&self, league: League, date: NaiveDate) -> Result<RawPayload> {
        let url = self.join(&format!(
            "/{}/scoreboard/_/date/{}",
            league.slug(),
            date.format("%Y%m%d")
        ))?;
        let mut doc = self.fetcher.fetch_embedded(&url, extract_fitt).await?;
        match take(&mut doc, "/page/content/scoreboard") {
            Value::Null => Err(IngestError::Extract("page.content.scoreboard".into())),
            body => Ok(RawPayload {
                provider: Provider::Espn,
                body,
            }),
        }
    }

    async fn fetch_boxscore(&self, game: &GameDescriptor) -> Result<RawPayload> {
        let path = game.url.as_deref().ok_or_else(|| {
            IngestError::normalize(Provider::Espn, format!("{} has no page", game.game_id))
        })?;
        let game_url = self.join(path)?;
        let pbp_url = self.join(&play_by_play_path(path))?;
        let pbp = self.gamepackage(&pbp_url).await?;
        let box_score = self.gamepackage(&game_url).await?;
        Ok(RawPayload {
            provider: Provider::Espn,
            body: json!({ "box": box_score, "pbp": pbp }),
        })
    }
}
