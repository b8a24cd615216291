use chrono::{Datelike, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::db::models::{GameDescriptor, League, Provider};
use crate::error::{IngestError, Result};

/// Top-level directory of a cached document under a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Boxscore,
    Matchup,
    Player,
}

impl CacheKind {
    fn dir(self) -> &'static str {
        match self {
            CacheKind::Boxscore => "boxscores",
            CacheKind::Matchup => "matchups",
            CacheKind::Player => "players",
        }
    }
}

/// How documents of one kind are spread across directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// `{season}/{month}/{day}`
    Daily { season: i32, date: NaiveDate },
    /// `{season}/{week}`
    Weekly { season: i32, week: u32 },
    /// Directly under the kind directory
    Flat,
}

/// Deterministic location of one cached document. Computed before any fetch
/// and used both for the presence check and as the write target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub league: League,
    pub kind: CacheKind,
    pub partition: Partition,
    pub provider: Option<Provider>,
    pub local_id: String,
}

impl CacheKey {
    pub fn for_game(kind: CacheKind, game: &GameDescriptor) -> Self {
        let partition = match game.week {
            Some(week) => Partition::Weekly {
                season: game.season,
                week,
            },
            None => Partition::Daily {
                season: game.season,
                date: game.game_date,
            },
        };
        CacheKey {
            league: game.league,
            kind,
            partition,
            provider: Some(game.provider),
            local_id: game.game_id.clone(),
        }
    }

    pub fn for_player(league: League, player_id: &str) -> Self {
        CacheKey {
            league,
            kind: CacheKind::Player,
            partition: Partition::Flat,
            provider: None,
            local_id: player_id.to_string(),
        }
    }

    /// Path relative to the cache root.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(self.league.prefix());
        path.push(self.kind.dir());
        match self.partition {
            Partition::Daily { season, date } => {
                path.push(season.to_string());
                path.push(format!("{:02}", date.month()));
                path.push(format!("{:02}", date.day()));
            }
            Partition::Weekly { season, week } => {
                path.push(season.to_string());
                path.push(week.to_string());
            }
            Partition::Flat => {}
        }
        if let Some(provider) = self.provider {
            path.push(provider.as_str());
        }
        path.push(format!("{}.json", sanitize(&self.local_id)));
        path
    }
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

/// Durable JSON document store rooted at the configured base path.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileCache { root: root.into() }
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    #[cfg(test)]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.path(key).is_file()
    }

    /// Read a cached document, `None` on a miss.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let path = self.path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        debug!("Cache hit: {}", path.display());
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Write (or overwrite) a document. The file is replaced by rename so a
    /// reader never sees a partial document.
    pub fn write<T: Serialize>(&self, key: &CacheKey, doc: &T) -> Result<PathBuf> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(doc)?;
        fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;
        debug!("Cached {}", path.display());
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Cache {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{GameStatus, RawPayload};
    use chrono::DateTime;
    use serde_json::json;

    fn descriptor(week: Option<u32>) -> GameDescriptor {
        GameDescriptor {
            provider: Provider::Espn,
            league: League::Mlb,
            game_id: "401472105".into(),
            home_id: "mlb.t.3".into(),
            away_id: "mlb.t.12".into(),
            url: Some("/mlb/game/_/gameId/401472105".into()),
            game_time: DateTime::parse_from_rfc3339("2024-04-01T23:05:00+00:00").unwrap(),
            game_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            season: 2024,
            week,
            status: GameStatus::Final,
            game_type: Some("regular".into()),
            odds: Vec::new(),
        }
    }

    #[test]
    fn test_daily_and_weekly_paths() {
        let daily = CacheKey::for_game(CacheKind::Boxscore, &descriptor(None));
        assert_eq!(
            daily.relative_path(),
            PathBuf::from("mlb/boxscores/2024/04/01/espn/401472105.json")
        );
        let weekly = CacheKey::for_game(CacheKind::Matchup, &descriptor(Some(7)));
        assert_eq!(
            weekly.relative_path(),
            PathBuf::from("mlb/matchups/2024/7/espn/401472105.json")
        );
        let player = CacheKey::for_player(League::Nba, "nba.p.5432");
        assert_eq!(
            player.relative_path(),
            PathBuf::from("nba/players/nba.p.5432.json")
        );
    }

    #[test]
    fn test_round_trip_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let key = CacheKey::for_game(CacheKind::Boxscore, &descriptor(None));
        assert!(!cache.contains(&key));
        assert!(cache.read::<RawPayload>(&key).unwrap().is_none());

        let payload = RawPayload {
            provider: Provider::Espn,
            body: json!({
                "box": {"gmStrp": {"gid": "401472105", "tms": [{"id": "3"}, {"id": "12"}]}},
                "pbp": {"pbp": [{"plays": [{"id": "4014721050001", "pitches": [1.5, null]}]}]}
            }),
        };
        cache.write(&key, &payload).unwrap();
        assert!(cache.contains(&key));
        let back: RawPayload = cache.read(&key).unwrap().unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let key = CacheKey::for_player(League::Mlb, "mlb.p.1");
        cache.write(&key, &json!({"v": 1})).unwrap();
        cache.write(&key, &json!({"v": 2})).unwrap();
        let back: serde_json::Value = cache.read(&key).unwrap().unwrap();
        assert_eq!(back["v"], 2);
    }
}
