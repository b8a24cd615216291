use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use super::baseball;
use crate::db::models::{
    Boxscore, EntityType, Game, GameDescriptor, GameStatus, League, Lineups, Misc, Provider,
    ProviderAthlete, ProviderMapping, RawPayload, Sport, Team,
};
use crate::error::{IngestError, Result};
use crate::ids;
use crate::providers::fix_team_names;
use crate::providers::json::{bool_of, i32_of, items, str_of, u32_of};
use crate::providers::NormalizeAgent;

/// ESPN is a secondary provider: it shares team keys with the primary one
/// but never mints player or stadium ids.
pub struct EspnNormalizer {
    league: League,
}

/// The two sides of a `gmStrp` team list, home first.
pub(super) struct Sides<'a> {
    pub home: &'a Value,
    pub away: &'a Value,
}

impl<'a> Sides<'a> {
    pub(super) fn of(teams: &'a Value) -> Option<Self> {
        let (first, second) = (teams.get(0)?, teams.get(1)?);
        // The first entry is home unless flagged otherwise.
        if first.get("isHome").map_or(true, bool_of) {
            Some(Sides { home: first, away: second })
        } else {
            Some(Sides { home: second, away: first })
        }
    }
}

impl EspnNormalizer {
    pub fn new(league: League) -> Self {
        EspnNormalizer { league }
    }

    fn team_id(&self, v: &Value) -> Option<String> {
        str_of(&v["id"]).map(|id| ids::canonical_id(self.league, EntityType::Team, &id))
    }

    fn err(&self, message: impl Into<String>) -> IngestError {
        IngestError::normalize(Provider::Espn, message)
    }

    fn descriptor(&self, evt: &Value, date: NaiveDate, season: Option<i32>) -> Option<GameDescriptor> {
        let sides = Sides::of(&evt["teams"])?;
        let game_time = parse_event_time(evt["date"].as_str()?)?;
        Some(GameDescriptor {
            provider: Provider::Espn,
            league: self.league,
            game_id: str_of(&evt["id"])?,
            home_id: self.team_id(sides.home)?,
            away_id: self.team_id(sides.away)?,
            url: str_of(&evt["link"]),
            game_time,
            game_date: date,
            season: season.unwrap_or_else(|| game_time.year()),
            week: u32_of(&evt["week"]),
            status: GameStatus::from_provider(
                evt["status"]["description"].as_str().unwrap_or_default(),
            ),
            game_type: str_of(&evt["note"]).map(|n| n.to_lowercase()),
            odds: Vec::new(),
        })
    }

    fn team(&self, t: &Value) -> Option<Team> {
        let mut team = Team {
            team_id: self.team_id(t)?,
            league: self.league,
            first_name: str_of(&t["location"]),
            last_name: str_of(&t["shortDisplayName"]),
            display_name: str_of(&t["displayName"]),
            abrv: str_of(&t["abbrev"]),
            conference: None,
            division: None,
            primary_color: str_of(&t["teamColor"]),
            secondary_color: str_of(&t["altColor"]),
        };
        fix_team_names(&mut team);
        Some(team)
    }
}

impl NormalizeAgent for EspnNormalizer {
    fn provider(&self) -> Provider {
        Provider::Espn
    }

    fn league(&self) -> League {
        self.league
    }

    fn scoreboard(&self, raw: &RawPayload, date: NaiveDate) -> Result<Vec<GameDescriptor>> {
        let evts = raw.body["evts"]
            .as_array()
            .ok_or_else(|| self.err("scoreboard without evts"))?;
        // "2023-24" -> 2023
        let season = raw.body["season"]["displayName"]
            .as_str()
            .and_then(|s| s.split('-').next())
            .and_then(|s| s.trim().parse().ok());

        let mut out = Vec::new();
        for evt in evts {
            match self.descriptor(evt, date, season) {
                Some(desc) => out.push(desc),
                None => debug!("Skipping incomplete ESPN event {:?}", evt["id"]),
            }
        }
        out.sort_by(|a, b| a.game_time.cmp(&b.game_time).then_with(|| a.game_id.cmp(&b.game_id)));
        Ok(out)
    }

    fn boxscore(&self, raw: &RawPayload, desc: &GameDescriptor) -> Result<Boxscore> {
        let strip = &raw.body["box"]["gmStrp"];
        let local_id = str_of(&strip["gid"]).ok_or_else(|| self.err("boxscore without gid"))?;
        let sides = Sides::of(&strip["tms"]).ok_or_else(|| self.err("boxscore without teams"))?;
        let home_id = self.team_id(sides.home).unwrap_or_else(|| desc.home_id.clone());
        let away_id = self.team_id(sides.away).unwrap_or_else(|| desc.away_id.clone());

        let (winner_id, loser_id) = if bool_of(&sides.home["winner"]) {
            (Some(home_id.clone()), Some(away_id.clone()))
        } else if bool_of(&sides.away["winner"]) {
            (Some(away_id.clone()), Some(home_id.clone()))
        } else {
            (None, None)
        };
        let game = Game {
            game_id: ids::game_id(self.league, desc.game_date, &away_id, &home_id),
            league: self.league,
            home_id,
            away_id,
            winner_id,
            loser_id,
            stadium_id: None,
            is_neutral_site: bool_of(&strip["neutralSite"]),
            game_date: desc.game_date,
            game_time: strip["dt"]
                .as_str()
                .and_then(parse_event_time)
                .unwrap_or(desc.game_time),
            season: desc.season,
            week: desc.week,
            game_type: desc.game_type.clone().unwrap_or_else(|| "unknown".to_string()),
            status: desc.status,
            game_result: "unknown".to_string(),
        };

        let teams: Vec<Team> = [sides.away, sides.home]
            .into_iter()
            .filter_map(|t| self.team(t))
            .collect();

        let mut seen = HashSet::new();
        let athletes = items(&raw.body["box"]["bxscr"])
            .flat_map(|team| items(&team["stats"]))
            .flat_map(|group| items(&group["athlts"]))
            .filter_map(|a| {
                Some(ProviderAthlete {
                    provider_id: str_of(&a["athlt"]["id"])?,
                    display_name: str_of(&a["athlt"]["dspNm"])?,
                })
            })
            .filter(|a| seen.insert(a.provider_id.clone()))
            .collect();

        let mut mappings = vec![ProviderMapping {
            provider: Provider::Espn,
            entity_type: EntityType::Game,
            entity_id: game.game_id.clone(),
            provider_id: local_id.clone(),
        }];
        for t in [sides.away, sides.home] {
            if let (Some(canonical), Some(local)) = (self.team_id(t), str_of(&t["id"])) {
                mappings.push(ProviderMapping {
                    provider: Provider::Espn,
                    entity_type: EntityType::Team,
                    entity_id: canonical,
                    provider_id: local,
                });
            }
        }

        let mut bx = Boxscore {
            provider: Provider::Espn,
            game,
            stadium: None,
            teams,
            players: Vec::new(),
            team_stats: Vec::new(),
            player_stats: Vec::new(),
            baseball_player_stats: Vec::new(),
            periods: Vec::new(),
            game_lines: Vec::new(),
            over_under: None,
            lineups: Lineups::default(),
            misc: Misc::default(),
            mappings,
            athletes,
        };
        if self.league.sport() == Sport::Baseball {
            baseball::fill(self.league, &raw.body, &local_id, &sides, &mut bx);
        }
        Ok(bx)
    }
}

/// ESPN event times come as `2024-04-01T20:10Z` (no seconds) or full RFC 3339.
pub(super) fn parse_event_time(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%MZ")
            .ok()
            .map(|t| t.and_utc().fixed_offset())
    })
}

/// Team score as listed in the game strip.
pub(super) fn score_of(team: &Value) -> Option<i32> {
    i32_of(&team["score"])
}
