use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{baseball, basketball};
use crate::db::models::{
    Boxscore, EntityType, Game, GameDescriptor, GameLine, GameStatus, League, Lineups, Matchup,
    Misc, OddsSnapshot, OverUnder, Period, Player, PlayerBio, Provider, ProviderMapping,
    RawPayload, Sport, Stadium, Team,
};
use crate::error::{IngestError, Result};
use crate::ids;
use crate::providers::fix_team_names;
use crate::providers::json::{bool_of, f64_of, i32_of, items, str_of, u32_of};
use crate::providers::NormalizeAgent;

const START_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";
const DEFAULT_LINE: f64 = -110.0;

/// Yahoo is the primary provider: its team, player and stadium keys become
/// the canonical ones.
pub struct YahooNormalizer {
    league: League,
}

impl YahooNormalizer {
    pub fn new(league: League) -> Self {
        YahooNormalizer { league }
    }

    fn team_id(&self, v: &Value) -> Option<String> {
        str_of(v).map(|id| ids::rekey(self.league, EntityType::Team, &id))
    }

    fn player_id(&self, v: &Value) -> Option<String> {
        str_of(v).map(|id| ids::rekey(self.league, EntityType::Player, &id))
    }

    fn err(&self, message: impl Into<String>) -> IngestError {
        IngestError::normalize(Provider::Yahoo, message)
    }

    /// One scoreboard entry; `None` when an identifying field is missing.
    fn descriptor(&self, game: &Value, date: NaiveDate, now: DateTime<Utc>) -> Option<GameDescriptor> {
        let game_time = parse_start_time(&game["start_time"])?;
        Some(GameDescriptor {
            provider: Provider::Yahoo,
            league: self.league,
            game_id: str_of(&game["gameid"])?,
            home_id: self.team_id(&game["home_team_id"])?,
            away_id: self.team_id(&game["away_team_id"])?,
            url: game
                .pointer("/navigation_links/boxscore/url")
                .and_then(Value::as_str)
                .map(str::to_string),
            game_time,
            game_date: date,
            season: i32_of(&game["season"])?,
            week: u32_of(&game["week"]),
            status: GameStatus::from_provider(game["status_type"].as_str().unwrap_or_default()),
            game_type: last_segment(&game["game_type"]),
            odds: parse_odds(&game["odds"], now),
        })
    }

    fn game(&self, data: &Value, desc: &GameDescriptor, canonical_id: &str) -> Game {
        let winner_id = self.team_id(&data["winning_team_id"]);
        let loser_id = winner_id.as_ref().map(|w| {
            if *w == desc.away_id {
                desc.home_id.clone()
            } else {
                desc.away_id.clone()
            }
        });
        Game {
            game_id: canonical_id.to_string(),
            league: self.league,
            home_id: desc.home_id.clone(),
            away_id: desc.away_id.clone(),
            winner_id,
            loser_id,
            stadium_id: str_of(&data["stadium_id"])
                .map(|id| ids::rekey(self.league, EntityType::Stadium, &id)),
            is_neutral_site: bool_of(&data["tournament"]),
            game_date: desc.game_date,
            game_time: parse_start_time(&data["start_time"]).unwrap_or(desc.game_time),
            season: i32_of(&data["season"]).unwrap_or(desc.season),
            week: u32_of(&data["week"]).or(desc.week),
            game_type: last_segment(&data["season_phase_id"])
                .or_else(|| desc.game_type.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            status: desc.status,
            game_result: last_segment(&data["outcome_type"]).unwrap_or_else(|| "unknown".to_string()),
        }
    }

    fn teams(&self, team_data: &Value, desc: &GameDescriptor) -> Vec<Team> {
        items(&team_data["teams"])
            .filter_map(|t| {
                let team_id = self.team_id(&t["team_id"])?;
                if team_id != desc.home_id && team_id != desc.away_id {
                    return None;
                }
                let mut team = Team {
                    team_id,
                    league: self.league,
                    first_name: str_of(&t["first_name"]),
                    last_name: str_of(&t["last_name"]),
                    display_name: str_of(&t["display_name"]).or_else(|| {
                        match (str_of(&t["first_name"]), str_of(&t["last_name"])) {
                            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
                            _ => None,
                        }
                    }),
                    abrv: str_of(&t["abbr"]),
                    conference: str_of(&t["conference_abbr"]),
                    division: str_of(&t["division"]),
                    primary_color: str_of(&t["colorPrimary"]),
                    secondary_color: str_of(&t["colorSecondary"]),
                };
                fix_team_names(&mut team);
                Some(team)
            })
            .collect()
    }

    fn players(&self, player_data: &Value) -> Vec<Player> {
        let positions: HashMap<String, String> = player_data["positions"]
            .as_object()
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| Some((k.clone(), str_of(&v["abbr"])?)))
                    .collect()
            })
            .unwrap_or_default();

        items(&player_data["players"])
            .filter_map(|p| {
                Some(Player {
                    player_id: self.player_id(&p["player_id"])?,
                    league: self.league,
                    first_name: str_of(&p["first_name"]).unwrap_or_default(),
                    last_name: str_of(&p["last_name"])?,
                    position: str_of(&p["primary_position_id"])
                        .and_then(|id| positions.get(&id).cloned()),
                    current_team_id: self.team_id(&p["team_id"]),
                    uniform_number: str_of(&p["uniform_number"]),
                })
            })
            .collect()
    }

    fn mappings(&self, local_game_id: &str, bx: &Boxscore, data: &Value) -> Vec<ProviderMapping> {
        let map = |entity_type, entity_id: &str, provider_id: String| ProviderMapping {
            provider: Provider::Yahoo,
            entity_type,
            entity_id: entity_id.to_string(),
            provider_id,
        };
        let mut out = vec![map(EntityType::Game, &bx.game.game_id, local_game_id.to_string())];
        for (side, canonical) in [("away", &bx.game.away_id), ("home", &bx.game.home_id)] {
            if let Some(local) = str_of(&data[format!("{}_team_id", side)]) {
                out.push(map(EntityType::Team, canonical, local));
            }
        }
        for player in &bx.players {
            out.push(map(EntityType::Player, &player.player_id, player.player_id.clone()));
        }
        if let (Some(stadium), Some(local)) = (&bx.stadium, str_of(&data["stadium_id"])) {
            out.push(map(EntityType::Stadium, &stadium.stadium_id, local));
        }
        out
    }
}

impl NormalizeAgent for YahooNormalizer {
    fn provider(&self) -> Provider {
        Provider::Yahoo
    }

    fn league(&self) -> League {
        self.league
    }

    fn scoreboard(&self, raw: &RawPayload, date: NaiveDate) -> Result<Vec<GameDescriptor>> {
        let games = raw
            .body
            .pointer("/GamesStore/games")
            .and_then(Value::as_object)
            .ok_or_else(|| self.err("scoreboard without GamesStore.games"))?;
        let prefix = format!("{}.", self.league.prefix());
        let now = Utc::now();

        let mut out = Vec::new();
        for (key, game) in games {
            if !key.starts_with(&prefix) {
                continue;
            }
            match self.descriptor(game, date, now) {
                Some(desc) => out.push(desc),
                None => debug!("Skipping incomplete Yahoo scoreboard entry {}", key),
            }
        }
        out.sort_by(|a, b| a.game_time.cmp(&b.game_time).then_with(|| a.game_id.cmp(&b.game_id)));
        Ok(out)
    }

    fn boxscore(&self, raw: &RawPayload, desc: &GameDescriptor) -> Result<Boxscore> {
        let data = &raw.body["gameData"];
        let local_id = str_of(&data["gameid"]).ok_or_else(|| self.err("boxscore without gameid"))?;
        let canonical_id = ids::game_id(self.league, desc.game_date, &desc.away_id, &desc.home_id);

        let game = self.game(data, desc, &canonical_id);
        let stadium = game.stadium_id.clone().map(|stadium_id| Stadium {
            stadium_id,
            name: str_of(&data["stadium"]),
        });
        let mut bx = Boxscore {
            provider: Provider::Yahoo,
            stadium,
            teams: self.teams(&raw.body["teamData"], desc),
            players: self.players(&raw.body["playerData"]),
            team_stats: Vec::new(),
            player_stats: Vec::new(),
            baseball_player_stats: Vec::new(),
            periods: periods(data, &game),
            game_lines: game_lines(data, &game),
            over_under: over_under(data, &game.game_id),
            lineups: Lineups::default(),
            misc: Misc::default(),
            mappings: Vec::new(),
            athletes: Vec::new(),
            game,
        };

        match self.league.sport() {
            Sport::Baseball => baseball::fill(self.league, &raw.body, &mut bx),
            Sport::Basketball => basketball::fill(self.league, &raw.body, &local_id, &mut bx),
        }
        bx.mappings = self.mappings(&local_id, &bx, data);
        Ok(bx)
    }

    fn supports_matchup(&self) -> bool {
        true
    }

    fn matchup(&self, raw: &RawPayload, desc: &GameDescriptor) -> Result<Matchup> {
        let data = &raw.body["gameData"];
        if data.is_null() {
            return Err(self.err("matchup without gameData"));
        }
        let mut matchup = Matchup::from_descriptor(desc);
        matchup.status = data["status_type"]
            .as_str()
            .map(GameStatus::from_provider)
            .unwrap_or(desc.status);
        matchup.lineups = Some(data["lineups"].clone()).filter(|v| !v.is_null());
        matchup.players = Some(data["playersByTeam"].clone()).filter(|v| !v.is_null());
        matchup.teams = ["away_team_id", "home_team_id"]
            .iter()
            .filter_map(|k| {
                let local = str_of(&data[*k])?;
                let team = raw.body.pointer("/teamData/teams")?.get(&local)?;
                Some(team.clone())
            })
            .collect();
        matchup.injuries = items(&raw.body["playerData"]["players"])
            .filter_map(|p| Some(p.get("injury")?.clone()).filter(|v| !v.is_null()))
            .collect();
        matchup.stadium_id =
            str_of(&data["stadium_id"]).map(|id| ids::rekey(self.league, EntityType::Stadium, &id));
        matchup.is_neutral = bool_of(&data["tournament"]);
        matchup.odds = parse_odds(&data["odds"], Utc::now());
        Ok(matchup)
    }

    fn player(&self, raw: &RawPayload, player_id: &str) -> Result<PlayerBio> {
        let p = &raw.body;
        let bio = &p["bio"];
        let draft = &p["draft_team"];
        Ok(PlayerBio {
            player_id: self
                .player_id(&p["player_id"])
                .unwrap_or_else(|| player_id.to_string()),
            first_name: str_of(&p["first_name"]).unwrap_or_default(),
            last_name: str_of(&p["last_name"])
                .ok_or_else(|| self.err(format!("player {} without a name", player_id)))?,
            height_cm: f64_of(&bio["height_cm"]),
            weight_kg: f64_of(&bio["weight_kg"]),
            bats: str_of(&p["bat"]),
            throws: str_of(&p["throw"]),
            birth_date: bio["birth_date"]
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            college: str_of(&p["college"]),
            draft_year: i32_of(&draft["season"]),
            draft_round: draft["round"].as_i64().and_then(|r| i32::try_from(r).ok()),
            draft_pick: i32_of(&draft["pick"]),
            draft_team_id: self.team_id(&draft["team"]["team_id"]),
            rookie_season: i32_of(&bio["rookie_season"]),
        })
    }
}

// ── Shared field parsing ─────────────────────────────────────────────────────

fn parse_start_time(v: &Value) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(v.as_str()?, START_TIME_FORMAT).ok()
}

/// `season.phase.regular` -> `regular`
fn last_segment(v: &Value) -> Option<String> {
    let s = v.as_str()?;
    s.rsplit('.').next().filter(|s| !s.is_empty()).map(str::to_lowercase)
}

pub(super) fn parse_odds(v: &Value, captured_at: DateTime<Utc>) -> Vec<OddsSnapshot> {
    items(v)
        .map(|o| OddsSnapshot {
            captured_at,
            away_spread: f64_of(&o["away_spread"]),
            home_spread: f64_of(&o["home_spread"]),
            away_line: f64_of(&o["away_line"]),
            home_line: f64_of(&o["home_line"]),
            away_ml: f64_of(&o["away_ml"]),
            home_ml: f64_of(&o["home_ml"]),
            total: f64_of(&o["total"]),
            over_line: f64_of(&o["over_line"]),
            under_line: f64_of(&o["under_line"]),
        })
        .collect()
}

fn final_points(data: &Value) -> Option<(i32, i32)> {
    Some((i32_of(&data["total_away_points"])?, i32_of(&data["total_home_points"])?))
}

fn sign(x: f64) -> i32 {
    (x > 0.0) as i32 - (x < 0.0) as i32
}

fn periods(data: &Value, game: &Game) -> Vec<Period> {
    let mut out = Vec::new();
    for p in items(&data["game_periods"]) {
        let Some(period) = u32_of(&p["period_id"]) else {
            continue;
        };
        for (side, team, opp) in [
            ("away", &game.away_id, &game.home_id),
            ("home", &game.home_id, &game.away_id),
        ] {
            if let Some(pts) = i32_of(&p[format!("{}_points", side)]) {
                out.push(Period {
                    game_id: game.game_id.clone(),
                    team_id: team.clone(),
                    opp_id: opp.clone(),
                    period,
                    pts,
                });
            }
        }
    }
    out
}

/// Closing lines graded against the final score; the last odds entry is the
/// closing one.
fn game_lines(data: &Value, game: &Game) -> Vec<GameLine> {
    let (Some(odds), Some((away_pts, home_pts))) = (items(&data["odds"]).last(), final_points(data))
    else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (side, team, opp, pts, opp_pts) in [
        ("away", &game.away_id, &game.home_id, away_pts, home_pts),
        ("home", &game.home_id, &game.away_id, home_pts, away_pts),
    ] {
        let Some(spread) = f64_of(&odds[format!("{}_spread", side)]) else {
            continue;
        };
        let result = pts - opp_pts;
        out.push(GameLine {
            game_id: game.game_id.clone(),
            team_id: team.clone(),
            opp_id: opp.clone(),
            spread,
            spread_line: f64_of(&odds[format!("{}_line", side)]).unwrap_or(DEFAULT_LINE),
            money_line: f64_of(&odds[format!("{}_ml", side)]),
            result,
            spread_outcome: sign(result as f64 + spread),
            money_outcome: sign(result as f64),
        });
    }
    out
}

fn over_under(data: &Value, game_id: &str) -> Option<OverUnder> {
    let odds = items(&data["odds"]).last()?;
    let line = f64_of(&odds["total"])?;
    let (away, home) = final_points(data)?;
    let total = away + home;
    Some(OverUnder {
        game_id: game_id.to_string(),
        over_under: line,
        over_line: f64_of(&odds["over_line"]).unwrap_or(DEFAULT_LINE),
        under_line: f64_of(&odds["under_line"]).unwrap_or(DEFAULT_LINE),
        total,
        ou_outcome: sign(total as f64 - line),
    })
}
