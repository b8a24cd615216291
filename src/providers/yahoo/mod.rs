mod baseball;
mod basketball;
mod normalizer;

pub use normalizer::YahooNormalizer;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use super::json::take;
use super::{DownloadAgent, HttpFetcher};
use crate::db::models::{GameDescriptor, League, Provider, RawPayload};
use crate::error::{IngestError, Result};
use crate::ids;

pub const DEFAULT_BASE_URL: &str = "https://sports.yahoo.com";

const APP_MARKER: &str = "root.App.main = ";

/// Yahoo Sports pages embed their whole data layer as one JS assignment.
pub struct YahooDownloader {
    fetcher: Arc<HttpFetcher>,
    base_url: String,
}

impl YahooDownloader {
    pub fn new(fetcher: Arc<HttpFetcher>, base_url: &str) -> Self {
        YahooDownloader {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn stores(&self, url: &str) -> Result<Value> {
        self.fetcher.fetch_embedded(url, extract_stores).await
    }

    fn join(&self, path: &str) -> Result<String> {
        Ok(Url::parse(&self.base_url)?.join(path)?.to_string())
    }
}

/// Pull `context.dispatcher.stores` out of a Yahoo page.
pub fn extract_stores(html: &str) -> Result<Value> {
    let line = html
        .lines()
        .find(|l| l.contains(APP_MARKER))
        .ok_or_else(|| IngestError::Extract("root.App.main".into()))?;
    let start = line.find(APP_MARKER).map_or(0, |i| i + APP_MARKER.len());
    let doc = line[start..].trim_end().trim_end_matches(';');
    let mut app: Value = serde_json::from_str(doc)?;
    match take(&mut app, "/context/dispatcher/stores") {
        Value::Null => Err(IngestError::Extract("context.dispatcher.stores".into())),
        stores => Ok(stores),
    }
}

#[async_trait]
impl DownloadAgent for YahooDownloader {
    fn provider(&self) -> Provider {
        Provider::Yahoo
    }

    async fn fetch_scoreboard(&self, league: League, date: NaiveDate) -> Result<RawPayload> {
        let url = self.join(&format!(
            "/{}/scoreboard/?confId=all&schedState=&dateRange={}",
            league.slug(),
            date.format("%Y-%m-%d")
        ))?;
        let body = self.stores(&url).await?;
        Ok(RawPayload {
            provider: Provider::Yahoo,
            body,
        })
    }

    async fn fetch_boxscore(&self, game: &GameDescriptor) -> Result<RawPayload> {
        let path = game.url.as_deref().ok_or_else(|| {
            IngestError::normalize(Provider::Yahoo, format!("{} has no page", game.game_id))
        })?;
        let url = self.join(path)?;
        let mut stores = self.stores(&url).await?;

        let entity = stores["PageStore"]["pageData"]["entityId"]
            .as_str()
            .unwrap_or(&game.game_id)
            .to_string();
        let game_data = take(&mut stores, &format!("/GamesStore/games/{}", entity));
        if game_data.is_null() {
            return Err(IngestError::Extract(format!("GamesStore.games.{}", entity)));
        }
        Ok(RawPayload {
            provider: Provider::Yahoo,
            body: json!({
                "gameData": game_data,
                "teamData": take(&mut stores, "/TeamsStore"),
                "playerData": take(&mut stores, "/PlayersStore"),
                "statsData": take(&mut stores, "/StatsStore"),
            }),
        })
    }

    async fn fetch_player(&self, league: League, player_id: &str) -> Result<RawPayload> {
        let url = self.join(&format!(
            "/{}/players/{}/",
            league.slug(),
            ids::key_of(player_id)
        ))?;
        let mut stores = self.stores(&url).await?;
        let player = take(&mut stores, &format!("/PlayersStore/players/{}", player_id));
        if player.is_null() {
            return Err(IngestError::Extract(format!("PlayersStore.players.{}", player_id)));
        }
        Ok(RawPayload {
            provider: Provider::Yahoo,
            body: player,
        })
    }
}
