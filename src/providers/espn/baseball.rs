use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::normalizer::{score_of, Sides};
use crate::db::models::{
    AtBat, BaseballLine, BaseballPlayerStat, BaseballTeamStat, Boxscore, EntityType, League,
    Pitch, PlayerRef, StatRole, TeamStat,
};
use crate::ids;
use crate::providers::json::{bool_of, f64_of, i32_of, i64_of, items, str_of};
use crate::sports::baseball::{at_bat_outcome, reconstruct, PlayEvent, RawAtBat, RawPitch};

/// Per-side totals and box score lines, then the reconstructed at-bat and
/// pitch streams. Players stay `Named` until identity resolution.
pub(super) fn fill(league: League, body: &Value, local_game_id: &str, sides: &Sides, bx: &mut Boxscore) {
    let game_box = &body["box"];
    let team = |t: &Value| str_of(&t["id"]).map(|id| ids::canonical_id(league, EntityType::Team, &id));

    for (side, t, other) in [("away", sides.away, sides.home), ("home", sides.home, sides.away)] {
        let (Some(team_id), Some(opp_id)) = (team(t), team(other)) else {
            continue;
        };
        let local = str_of(&t["id"]);
        let Some(team_box) = items(&game_box["bxscr"]).find(|b| str_of(&b["tm"]["id"]) == local) else {
            debug!("No box score section for {} in {}", team_id, local_game_id);
            continue;
        };
        let groups = [
            (StatRole::Batting, &team_box["stats"][0]),
            (StatRole::Pitching, &team_box["stats"][1]),
        ];
        let [batting, pitching] = groups.map(|(_, g)| Columns::of(g).line(&g["ttls"]));
        bx.team_stats.push(TeamStat::Baseball(BaseballTeamStat {
            game_id: bx.game.game_id.clone(),
            team_id: team_id.clone(),
            opp_id: opp_id.clone(),
            runs: score_of(t).unwrap_or_default(),
            hits: batting.hits.unwrap_or_default(),
            errors: i32_of(&game_box["shtChrt"]["tms"][side]["errors"]).unwrap_or_default(),
            batting,
            pitching,
        }));

        for (role, group) in groups {
            let columns = Columns::of(group);
            for athlete in items(&group["athlts"]) {
                if str_of(&athlete["athlt"]["id"]).is_none() {
                    continue;
                }
                let Some(name) = str_of(&athlete["athlt"]["dspNm"]) else {
                    continue;
                };
                bx.baseball_player_stats.push(BaseballPlayerStat {
                    game_id: bx.game.game_id.clone(),
                    player: PlayerRef::Named(name),
                    team_id: team_id.clone(),
                    opp_id: opp_id.clone(),
                    role,
                    position: str_of(&athlete["pos"]),
                    line: columns.line(&athlete["stats"]),
                });
            }
        }
    }

    let events: HashMap<String, PlayEvent> = items(&game_box["plys"])
        .filter_map(|p| {
            let id = str_of(&p["id"])?;
            Some((
                id.clone(),
                PlayEvent {
                    id,
                    type_id: i64_of(&p["plyTypId"])?,
                    text: p["txt"].as_str().unwrap_or_default().to_string(),
                    team: str_of(&p["tm"]),
                },
            ))
        })
        .collect();

    let raw_at_bats: Vec<RawAtBat> = items(&body["pbp"]["pbp"])
        .flat_map(|half| items(&half["plays"]))
        .filter(|play| !bool_of(&play["isInfoPlay"]) && !bool_of(&play["isPitcherChange"]))
        .map(|play| RawAtBat {
            pitches: items(&play["pitches"]).filter_map(raw_pitch).collect(),
        })
        .filter(|ab| !ab.pitches.is_empty())
        .collect();

    let opponent = |team_id: &str| {
        if team_id == bx.game.home_id {
            bx.game.away_id.clone()
        } else {
            bx.game.home_id.clone()
        }
    };
    let mut at_bats = Vec::new();
    let mut pitches = Vec::new();
    for ab in reconstruct(&events, &raw_at_bats, local_game_id) {
        let Some(team_id) = ab
            .team
            .as_deref()
            .map(|t| ids::canonical_id(league, EntityType::Team, t))
        else {
            debug!("At-bat {:?} has no batting team", ab.play_num);
            continue;
        };
        let opp_id = opponent(&team_id);
        let batter = PlayerRef::Named(ab.batter.clone());
        let pitcher = PlayerRef::Named(ab.pitcher.clone());

        for p in &ab.pitches {
            pitches.push(Pitch {
                game_id: bx.game.game_id.clone(),
                team_id: team_id.clone(),
                opp_id: opp_id.clone(),
                play_num: p.play_num.unwrap_or_default(),
                batter: batter.clone(),
                pitcher: pitcher.clone(),
                pitch_count: Some(p.pitch_count),
                sequence: p.sequence,
                balls: p.balls,
                strikes: p.strikes,
                period: None,
                velocity: p.velocity,
                pitch_x: p.x,
                pitch_y: p.y,
                pitch_location: p.zone,
                hit_x: p.hit_x,
                hit_y: p.hit_y,
                pitch_type: p.pitch_type.clone(),
                pitch_result: p.pitch_result.clone(),
                ab_result: p.ab_result.clone(),
            });
        }

        match at_bat_outcome(&ab) {
            Some(kind) => at_bats.push(AtBat {
                game_id: bx.game.game_id.clone(),
                team_id,
                opp_id,
                play_num: ab.play_num.unwrap_or_default(),
                batter,
                pitcher,
                at_bat_type: kind,
                period: None,
                hit_hardness: None,
                hit_style: None,
                hit_angle: None,
                hit_distance: None,
                hit_x: ab.hit_x,
                hit_y: ab.hit_y,
            }),
            None => warn!("Unclassified at-bat in {}: {:?}", local_game_id, ab.closing_text),
        }
    }
    bx.misc.at_bats = at_bats;
    bx.misc.pitches = pitches;
}

/// Column layout of one `bxscr` stats group, keyed by lower-cased label.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn of(group: &Value) -> Self {
        Columns(
            items(&group["lbls"])
                .enumerate()
                .filter_map(|(i, l)| Some((l.as_str()?.to_lowercase(), i)))
                .collect(),
        )
    }

    fn cell<'a>(&self, row: &'a Value, labels: &[&str]) -> Option<&'a Value> {
        labels
            .iter()
            .find_map(|l| self.0.get(*l))
            .and_then(|&i| row.get(i))
    }

    fn int(&self, row: &Value, labels: &[&str]) -> Option<i32> {
        self.cell(row, labels).and_then(leading_int)
    }

    fn line(&self, row: &Value) -> BaseballLine {
        BaseballLine {
            at_bats: self.int(row, &["ab"]),
            runs: self.int(row, &["r"]),
            hits: self.int(row, &["h"]),
            rbi: self.int(row, &["rbi"]),
            home_runs: self.int(row, &["hr"]),
            walks: self.int(row, &["bb"]),
            strikeouts: self.int(row, &["k", "so"]),
            innings: self.cell(row, &["ip"]).and_then(f64_of),
            earned_runs: self.int(row, &["er"]),
            pitches: self.int(row, &["pc", "pc-st", "#p"]),
        }
    }
}

/// Integer cell, or the leading number of a compound one such as `98-62`.
fn leading_int(v: &Value) -> Option<i32> {
    i32_of(v).or_else(|| v.as_str()?.split('-').next()?.trim().parse().ok())
}

fn raw_pitch(p: &Value) -> Option<RawPitch> {
    Some(RawPitch {
        id: str_of(&p["id"])?,
        result: p["rslt"].as_str().unwrap_or_default().to_string(),
        description: p["dsc"].as_str().unwrap_or_default().to_string(),
        pitch_type: str_of(&p["ptchDsc"]),
        velocity: f64_of(&p["vlcty"]),
        x: f64_of(&p["ptchCoords"]["x"]),
        y: f64_of(&p["ptchCoords"]["y"]),
        hit_x: f64_of(&p["hitCoords"]["x"]),
        hit_y: f64_of(&p["hitCoords"]["y"]),
        sequence: i32_of(&p["count"]),
    })
}
