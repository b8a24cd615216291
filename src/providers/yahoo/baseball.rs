use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::db::models::{
    AtBat, BattingOrder, Boxscore, Bullpen, EntityType, League, Pitch, PlayerRef,
};
use crate::ids;
use crate::providers::json::{f64_of, i32_of, i64_of, items, str_of, u32_of};
use crate::sports::baseball::classify_result;

/// Lineups, at-bats and pitches of a Yahoo MLB game.
pub(super) fn fill(league: League, body: &Value, bx: &mut Boxscore) {
    let data = &body["gameData"];
    let game_id = bx.game.game_id.clone();
    let sides = [
        ("away", bx.game.away_id.clone(), bx.game.home_id.clone()),
        ("home", bx.game.home_id.clone(), bx.game.away_id.clone()),
    ];
    let player = |v: &Value| str_of(v).map(|id| ids::rekey(league, EntityType::Player, &id));

    // player key -> (team, opp)
    let mut batter_team: HashMap<String, (String, String)> = HashMap::new();
    let mut pitcher_team: HashMap<String, (String, String)> = HashMap::new();

    for (side, team, opp) in &sides {
        let lineup = &data["lineups"][format!("{}_lineup", side)];
        for b in items(&lineup["B"]) {
            let Some(player_id) = player(&b["player_id"]) else {
                continue;
            };
            batter_team.insert(ids::key_of(&player_id).to_string(), (team.clone(), opp.clone()));
            bx.lineups.batting.push(BattingOrder {
                game_id: game_id.clone(),
                player_id,
                team_id: team.clone(),
                opp_id: opp.clone(),
                batt_order: i32_of(&b["order"]).unwrap_or_default(),
                sub_order: i32_of(&b["suborder"]).unwrap_or_default(),
                pos: str_of(&b["position"]),
            });
        }
        for p in items(&lineup["P"]) {
            let Some(player_id) = player(&p["player_id"]) else {
                continue;
            };
            pitcher_team.insert(ids::key_of(&player_id).to_string(), (team.clone(), opp.clone()));
            bx.lineups.bullpen.push(Bullpen {
                game_id: game_id.clone(),
                player_id,
                team_id: team.clone(),
                opp_id: opp.clone(),
                pitch_order: i32_of(&p["order"]).unwrap_or_default(),
            });
        }
    }

    for row in items(&data["play_by_play"]) {
        if row["play_type"].as_str() != Some("RESULT") {
            continue;
        }
        let Some(kind) = row["text"].as_str().and_then(classify_result) else {
            continue;
        };
        let (Some(batter), Some(pitcher)) = (str_of(&row["batter"]), str_of(&row["pitcher"])) else {
            continue;
        };
        let Some((team_id, opp_id)) = batter_team.get(ids::key_of(&batter)).cloned() else {
            debug!("Batter {} not in lineup of {}", batter, game_id);
            continue;
        };
        bx.misc.at_bats.push(AtBat {
            game_id: game_id.clone(),
            team_id,
            opp_id,
            play_num: i64_of(&row["play_num"]).map_or(0, |n| (n - 1) / 100),
            batter: PlayerRef::Canonical(ids::rekey(league, EntityType::Player, &batter)),
            pitcher: PlayerRef::Canonical(ids::rekey(league, EntityType::Player, &pitcher)),
            at_bat_type: kind,
            period: u32_of(&row["period"]),
            hit_hardness: str_of(&row["hit_hardness"]),
            hit_style: str_of(&row["hit_style"]),
            hit_angle: f64_of(&row["hit_angle"]),
            hit_distance: f64_of(&row["hit_distance"]),
            hit_x: None,
            hit_y: None,
        });
    }

    for row in items(&data["pitches"]) {
        let (Some(batter), Some(pitcher)) = (str_of(&row["batter"]), str_of(&row["pitcher"])) else {
            continue;
        };
        let Some((opp_id, team_id)) = pitcher_team.get(ids::key_of(&pitcher)).cloned() else {
            debug!("Pitcher {} not in bullpen of {}", pitcher, game_id);
            continue;
        };
        bx.misc.pitches.push(Pitch {
            game_id: game_id.clone(),
            team_id,
            opp_id,
            play_num: i64_of(&row["play_num"]).unwrap_or_default(),
            batter: PlayerRef::Canonical(ids::rekey(league, EntityType::Player, &batter)),
            pitcher: PlayerRef::Canonical(ids::rekey(league, EntityType::Player, &pitcher)),
            pitch_count: None,
            sequence: i32_of(&row["sequence"]),
            balls: i32_of(&row["balls"]).map_or(0, |b| b.clamp(0, 3) as u8),
            strikes: i32_of(&row["strikes"]).map_or(0, |s| s.clamp(0, 2) as u8),
            period: u32_of(&row["period"]),
            velocity: f64_of(&row["velocity"]),
            pitch_x: f64_of(&row["horizontal"]),
            pitch_y: f64_of(&row["vertical"]),
            pitch_location: None,
            hit_x: None,
            hit_y: None,
            pitch_type: str_of(&row["pitch_type"]),
            pitch_result: str_of(&row["result"]).unwrap_or_else(|| "unknown".to_string()),
            ab_result: None,
        });
    }
}
