use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::db::models::{
    BasketballPlayerStat, BasketballTeamStat, Boxscore, EntityType, League, Shot, TeamStat,
};
use crate::ids;
use crate::providers::json::{bool_of, f64_of, i32_of, items, str_of, u32_of};
use crate::sports::basketball::{
    in_paint, is_clutch, parse_made_attempted, parse_minutes, ShotLocation, Side,
};

const OVERTIME_MINUTES: u32 = 5;

/// Yahoo shot types 10..=24 are free throws.
fn is_free_throw(shot_type: i32) -> bool {
    (10..25).contains(&shot_type)
}

struct StatKeys {
    variation: String,
    prefix: &'static str,
}

impl StatKeys {
    fn new(league: League) -> Self {
        StatKeys {
            variation: format!("{}.stat_variation.2", league.prefix()),
            prefix: league.prefix(),
        }
    }

    fn get<'a>(&self, stats: &'a Value, n: u32) -> &'a Value {
        &stats[format!("{}.stat_type.{}", self.prefix, n)]
    }

    fn int(&self, stats: &Value, n: u32) -> i32 {
        i32_of(self.get(stats, n)).unwrap_or_default()
    }

    fn split(&self, stats: &Value, n: u32) -> (i32, i32) {
        self.get(stats, n)
            .as_str()
            .and_then(parse_made_attempted)
            .unwrap_or_default()
    }
}

/// Team stats, player stats and shots of a Yahoo NBA/NCAAB game.
pub(super) fn fill(league: League, body: &Value, local_game_id: &str, bx: &mut Boxscore) {
    let data = &body["gameData"];
    let keys = StatKeys::new(league);
    let sides = [
        ("away", bx.game.away_id.clone(), bx.game.home_id.clone()),
        ("home", bx.game.home_id.clone(), bx.game.away_id.clone()),
    ];
    let shots: Vec<&Value> = items(&data["play_by_play"])
        .filter(|s| s["class_type"].as_str() == Some("SHOT"))
        .collect();

    let periods_played = items(&data["game_periods"]).count() as u32;
    let minutes = league.base_minutes()
        + periods_played.saturating_sub(league.regulation_periods()) * OVERTIME_MINUTES;

    for (side, team, opp) in &sides {
        let Some(local_team) = str_of(&data[format!("{}_team_id", side)]) else {
            continue;
        };
        let Some(stats) = body["statsData"]["teamStatsByGameId"][local_game_id]
            [local_team.as_str()]
            .get(&keys.variation)
        else {
            debug!("No team stats for {} in {}", local_team, local_game_id);
            continue;
        };
        let team_key = ids::key_of(team);
        let pts_in_pt = shots
            .iter()
            .filter(|s| str_of(&s["team"]).as_deref() == Some(team_key))
            .filter(|s| {
                matches!(
                    (f64_of(&s["sideline_offset_percentage"]), f64_of(&s["baseline_offset_percentage"])),
                    (Some(side_pct), Some(base_pct)) if in_paint(side_pct, base_pct)
                )
            })
            .filter(|s| bool_of(&s["shot_made"]))
            .map(|s| i32_of(&s["points"]).unwrap_or_default())
            .sum();
        let (fgm, fga) = keys.split(stats, 128);
        let (ftm, fta) = keys.split(stats, 129);
        let (tpm, tpa) = keys.split(stats, 130);
        bx.team_stats.push(TeamStat::Basketball(BasketballTeamStat {
            game_id: bx.game.game_id.clone(),
            team_id: team.clone(),
            opp_id: opp.clone(),
            minutes,
            fga,
            fgm,
            fta,
            ftm,
            tpa,
            tpm,
            pts: keys.int(stats, 113),
            oreb: keys.int(stats, 114),
            dreb: keys.int(stats, 115),
            ast: keys.int(stats, 117),
            stl: keys.int(stats, 118),
            blk: keys.int(stats, 119),
            turnovers: keys.int(stats, 120),
            fouls: keys.int(stats, 122),
            pts_in_pt: Some(pts_in_pt),
        }));
    }

    let starters: HashSet<String> = sides
        .iter()
        .flat_map(|(side, _, _)| items(&data["lineups"][format!("{}_lineup", side)]["all"]))
        .filter(|p| i32_of(&p["starter"]) == Some(1))
        .filter_map(|p| str_of(&p["player_id"]))
        .collect();

    for (side, team, opp) in &sides {
        for player in items(&data["lineups"][format!("{}_lineup_order", side)]["all"]) {
            let Some(local_player) = str_of(player) else {
                continue;
            };
            let Some(stats) = body["statsData"]["playerStats"][local_player.as_str()]
                .get(&keys.variation)
            else {
                continue;
            };
            let played = keys
                .get(stats, 3)
                .as_str()
                .and_then(parse_minutes)
                .unwrap_or_default();
            if played <= 0.0 {
                continue;
            }
            let (fgm, fga) = keys.split(stats, 28);
            let (ftm, fta) = keys.split(stats, 29);
            let (tpm, tpa) = keys.split(stats, 30);
            bx.player_stats.push(BasketballPlayerStat {
                game_id: bx.game.game_id.clone(),
                player_id: ids::rekey(league, EntityType::Player, &local_player),
                team_id: team.clone(),
                opp_id: opp.clone(),
                starter: starters.contains(&local_player),
                minutes: played,
                fga,
                fgm,
                fta,
                ftm,
                tpa,
                tpm,
                pts: keys.int(stats, 13),
                oreb: keys.int(stats, 14),
                dreb: keys.int(stats, 15),
                ast: keys.int(stats, 17),
                stl: keys.int(stats, 18),
                blk: keys.int(stats, 19),
                turnovers: keys.int(stats, 20),
                fouls: keys.int(stats, 22),
                plus_minus: (league == League::Nba)
                    .then(|| i32_of(keys.get(stats, 32)))
                    .flatten(),
            });
        }
    }

    let regulation = league.regulation_periods();
    for s in shots {
        let (Some(shot_type), Some(period), Some(points)) =
            (i32_of(&s["type"]), u32_of(&s["period"]), i32_of(&s["points"]))
        else {
            continue;
        };
        let clock = s["clock"].as_str().unwrap_or_default();
        let clutch = is_clutch(
            period,
            regulation,
            clock,
            i32_of(&s["home_score"]).unwrap_or_default(),
            i32_of(&s["away_score"]).unwrap_or_default(),
        );
        if is_free_throw(shot_type) && !(points == 1 && clutch) {
            continue;
        }
        let side_str = s["side_of_basket"].as_str().unwrap_or_default();
        let location = Side::parse(side_str).and_then(|side| {
            ShotLocation::new(
                side,
                f64_of(&s["sideline_offset_percentage"])?,
                f64_of(&s["baseline_offset_percentage"])?,
            )
        });
        let (Some(location), Some(player), Some(team_key)) =
            (location, str_of(&s["player"]), str_of(&s["team"]))
        else {
            debug!("Skipping shot without a usable location in {}", local_game_id);
            continue;
        };
        let team_id = ids::canonical_id(league, EntityType::Team, &team_key);
        let opp_id = if team_id == bx.game.home_id {
            bx.game.away_id.clone()
        } else {
            bx.game.home_id.clone()
        };
        let assist_id = str_of(&s["assister"])
            .filter(|a| a != "0")
            .map(|a| ids::canonical_id(league, EntityType::Player, &a));

        bx.misc.shots.push(Shot {
            game_id: bx.game.game_id.clone(),
            player_id: ids::canonical_id(league, EntityType::Player, &player),
            team_id,
            opp_id,
            period,
            shot_type_id: shot_type,
            assist_id,
            shot_made: bool_of(&s["shot_made"]),
            points,
            base_pct: location.base_pct,
            side_pct: location.side_pct,
            distance: location.distance() as i32,
            fastbreak: bool_of(&s["fastbreak"]),
            side_of_basket: side_str.to_string(),
            clutch,
            zone: location.zone(),
        });
    }
}
