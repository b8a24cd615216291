//! Canned provider payloads shared by the normalizer, processor and
//! orchestrator tests. One MLB game (Athletics at Angels, 2024-04-01) is
//! described by both providers under different local ids.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::db::models::{GameDescriptor, GameStatus, League, Provider, RawPayload};
use crate::error::{IngestError, Result};
use crate::providers::DownloadAgent;

pub const YAHOO_GAME_ID: &str = "mlb.g.2024040110";
pub const YAHOO_PREGAME_ID: &str = "mlb.g.2024040111";
pub const ESPN_GAME_ID: &str = "401472105";
pub const CANONICAL_GAME_ID: &str = "mlb.g.20240401-12-3";
pub const YAHOO_NBA_GAME_ID: &str = "nba.g.2024040102";

pub fn game_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn yahoo(body: Value) -> RawPayload {
    RawPayload {
        provider: Provider::Yahoo,
        body,
    }
}

fn espn(body: Value) -> RawPayload {
    RawPayload {
        provider: Provider::Espn,
        body,
    }
}

// ── Yahoo ────────────────────────────────────────────────────────────────────

pub fn yahoo_scoreboard() -> RawPayload {
    yahoo(json!({
        "GamesStore": {
            "games": {
                "mlb.g.2024040110": {
                    "gameid": YAHOO_GAME_ID,
                    "home_team_id": "mlb.t.3",
                    "away_team_id": "mlb.t.12",
                    "start_time": "Mon, 01 Apr 2024 20:10:00 +0000",
                    "season": "2024",
                    "status_type": "final",
                    "game_type": "season.phase.regular",
                    "navigation_links": {"boxscore": {"url": "/mlb/athletics-angels-2024040110/"}},
                    "odds": {
                        "101": {
                            "away_spread": "1.5",
                            "home_spread": "-1.5",
                            "away_ml": "",
                            "home_ml": "-150",
                            "total": "8.5"
                        }
                    }
                },
                "mlb.g.2024040111": {
                    "gameid": YAHOO_PREGAME_ID,
                    "home_team_id": "mlb.t.7",
                    "away_team_id": "mlb.t.5",
                    "start_time": "Mon, 01 Apr 2024 23:05:00 +0000",
                    "season": "2024",
                    "status_type": "pregame",
                    "game_type": "season.phase.regular",
                    "navigation_links": {"boxscore": {"url": "/mlb/royals-twins-2024040111/"}},
                    "odds": {}
                },
                "nba.g.2024040102": {
                    "gameid": YAHOO_NBA_GAME_ID,
                    "home_team_id": "nba.t.2",
                    "away_team_id": "nba.t.1",
                    "start_time": "Mon, 01 Apr 2024 23:30:00 +0000",
                    "season": "2023",
                    "status_type": "final"
                }
            }
        }
    }))
}

pub fn yahoo_final_descriptor() -> GameDescriptor {
    GameDescriptor {
        provider: Provider::Yahoo,
        league: League::Mlb,
        game_id: YAHOO_GAME_ID.to_string(),
        home_id: "mlb.t.3".to_string(),
        away_id: "mlb.t.12".to_string(),
        url: Some("/mlb/athletics-angels-2024040110/".to_string()),
        game_time: at("2024-04-01T20:10:00+00:00"),
        game_date: game_date(),
        season: 2024,
        week: None,
        status: GameStatus::Final,
        game_type: Some("regular".to_string()),
        odds: Vec::new(),
    }
}

pub fn yahoo_pregame_descriptor() -> GameDescriptor {
    GameDescriptor {
        provider: Provider::Yahoo,
        league: League::Mlb,
        game_id: YAHOO_PREGAME_ID.to_string(),
        home_id: "mlb.t.7".to_string(),
        away_id: "mlb.t.5".to_string(),
        url: Some("/mlb/royals-twins-2024040111/".to_string()),
        game_time: at("2024-04-01T23:05:00+00:00"),
        game_date: game_date(),
        season: 2024,
        week: None,
        status: GameStatus::Pregame,
        game_type: Some("regular".to_string()),
        odds: Vec::new(),
    }
}

fn mlb_players() -> Value {
    json!({
        "players": {
            "mlb.p.9001": {
                "player_id": "mlb.p.9001", "first_name": "Luis", "last_name": "Rivera",
                "primary_position_id": "6", "team_id": "mlb.t.12", "uniform_number": "2"
            },
            "mlb.p.9002": {
                "player_id": "mlb.p.9002", "first_name": "Michael", "last_name": "Torres",
                "primary_position_id": "8", "team_id": "mlb.t.3", "uniform_number": "27"
            },
            "mlb.p.9101": {
                "player_id": "mlb.p.9101", "first_name": "Joe", "last_name": "Boyd",
                "primary_position_id": "1", "team_id": "mlb.t.12", "uniform_number": "45"
            },
            "mlb.p.9102": {
                "player_id": "mlb.p.9102", "first_name": "Tyler", "last_name": "Andrews",
                "primary_position_id": "1", "team_id": "mlb.t.3", "uniform_number": "33"
            }
        },
        "positions": {
            "1": {"abbr": "P"},
            "6": {"abbr": "SS"},
            "8": {"abbr": "CF"}
        }
    })
}

pub fn yahoo_mlb_boxscore() -> RawPayload {
    yahoo(json!({
        "gameData": {
            "gameid": YAHOO_GAME_ID,
            "home_team_id": "mlb.t.3",
            "away_team_id": "mlb.t.12",
            "winning_team_id": "mlb.t.3",
            "stadium_id": "40",
            "stadium": "Angel Stadium",
            "tournament": 0,
            "start_time": "Mon, 01 Apr 2024 20:10:00 +0000",
            "season": "2024",
            "season_phase_id": "season.phase.regular",
            "outcome_type": "outcome.type.win",
            "total_away_points": "2",
            "total_home_points": "5",
            "game_periods": {
                "1": {"period_id": "1", "away_points": "0", "home_points": "3"},
                "2": {"period_id": "2", "away_points": "2", "home_points": "2"}
            },
            "odds": {
                "101": {
                    "away_spread": "1.5",
                    "home_spread": "-1.5",
                    "away_line": "",
                    "home_line": "",
                    "away_ml": "130",
                    "home_ml": "-150",
                    "total": "8.5"
                }
            },
            "lineups": {
                "away_lineup": {
                    "B": {"1": {"player_id": "mlb.p.9001", "order": "1", "suborder": "0", "position": "SS"}},
                    "P": {"1": {"player_id": "mlb.p.9101", "order": "1"}}
                },
                "home_lineup": {
                    "B": {"1": {"player_id": "mlb.p.9002", "order": "1", "suborder": "0", "position": "CF"}},
                    "P": {"1": {"player_id": "mlb.p.9102", "order": "1"}}
                }
            },
            "play_by_play": {
                "101": {
                    "play_num": "101", "play_type": "RESULT", "period": "1",
                    "text": "Luis Rivera struck out swinging.",
                    "batter": "mlb.p.9001", "pitcher": "mlb.p.9102"
                },
                "150": {"play_num": "150", "play_type": "INFO", "period": "1", "text": "Mound visit."},
                "205": {
                    "play_num": "205", "play_type": "RESULT", "period": "1",
                    "text": "Michael Torres homered to left.",
                    "batter": "mlb.p.9002", "pitcher": "mlb.p.9101",
                    "hit_distance": "402", "hit_angle": "28"
                }
            },
            "pitches": {
                "1": {
                    "play_num": "101", "batter": "mlb.p.9001", "pitcher": "mlb.p.9102",
                    "sequence": "1", "balls": "0", "strikes": "0", "period": "1",
                    "velocity": "96.1", "horizontal": "0.3", "vertical": "2.5",
                    "pitch_type": "Four-Seam Fastball", "result": "Strike Swinging"
                }
            }
        },
        "teamData": {
            "teams": {
                "mlb.t.3": {
                    "team_id": "mlb.t.3", "first_name": "Los Angeles", "last_name": "Angels",
                    "display_name": "Los Angeles Angels", "abbr": "LAA",
                    "colorPrimary": "BA0021", "colorSecondary": "003263"
                },
                "mlb.t.12": {
                    "team_id": "mlb.t.12", "first_name": "", "last_name": "Athletics",
                    "display_name": "Athletics", "abbr": "ATH"
                },
                "mlb.t.99": {"team_id": "mlb.t.99", "last_name": "Elsewhere"}
            }
        },
        "playerData": mlb_players(),
        "statsData": {}
    }))
}

pub fn yahoo_mlb_matchup() -> RawPayload {
    yahoo(json!({
        "gameData": {
            "gameid": YAHOO_PREGAME_ID,
            "home_team_id": "mlb.t.7",
            "away_team_id": "mlb.t.5",
            "status_type": "pregame",
            "stadium_id": "12",
            "tournament": 0,
            "lineups": null,
            "playersByTeam": {"mlb.t.5": ["mlb.p.1"], "mlb.t.7": ["mlb.p.2", "mlb.p.3"]},
            "odds": {
                "7": {"away_spread": "1.5", "home_spread": "-1.5", "total": "9"}
            }
        },
        "teamData": {
            "teams": {
                "mlb.t.5": {"team_id": "mlb.t.5", "display_name": "Kansas City Royals"},
                "mlb.t.7": {"team_id": "mlb.t.7", "display_name": "Minnesota Twins"}
            }
        },
        "playerData": {
            "players": {
                "mlb.p.1": {"player_id": "mlb.p.1", "injury": {"type": "10-Day IL", "comment": "Hamstring"}},
                "mlb.p.2": {"player_id": "mlb.p.2", "injury": null},
                "mlb.p.3": {"player_id": "mlb.p.3"}
            }
        }
    }))
}

pub fn yahoo_player() -> RawPayload {
    yahoo(json!({
        "player_id": "mlb.p.9001",
        "first_name": "Luis",
        "last_name": "Rivera",
        "bat": "R",
        "throw": "R",
        "college": "",
        "bio": {
            "height_cm": "180",
            "weight_kg": "82",
            "birth_date": "1999-05-14",
            "rookie_season": "2021"
        },
        "draft_team": {
            "season": "2017",
            "round": 1,
            "pick": "",
            "team": {"team_id": "mlb.t.3"}
        }
    }))
}

pub fn yahoo_nba_descriptor() -> GameDescriptor {
    GameDescriptor {
        provider: Provider::Yahoo,
        league: League::Nba,
        game_id: YAHOO_NBA_GAME_ID.to_string(),
        home_id: "nba.t.2".to_string(),
        away_id: "nba.t.1".to_string(),
        url: Some("/nba/celtics-nets-2024040102/".to_string()),
        game_time: at("2024-04-01T23:30:00+00:00"),
        game_date: game_date(),
        season: 2023,
        week: None,
        status: GameStatus::Final,
        game_type: Some("regular".to_string()),
        odds: Vec::new(),
    }
}

pub fn yahoo_nba_boxscore() -> RawPayload {
    yahoo(json!({
        "gameData": {
            "gameid": YAHOO_NBA_GAME_ID,
            "home_team_id": "nba.t.2",
            "away_team_id": "nba.t.1",
            "winning_team_id": "nba.t.2",
            "season": "2023",
            "season_phase_id": "season.phase.regular",
            "total_away_points": "108",
            "total_home_points": "112",
            "game_periods": {
                "1": {"period_id": "1", "away_points": "25", "home_points": "27"},
                "2": {"period_id": "2", "away_points": "26", "home_points": "24"},
                "3": {"period_id": "3", "away_points": "27", "home_points": "28"},
                "4": {"period_id": "4", "away_points": "22", "home_points": "21"},
                "5": {"period_id": "5", "away_points": "8", "home_points": "12"}
            },
            "lineups": {
                "home_lineup": {
                    "all": {"nba.p.5001": {"player_id": "nba.p.5001", "starter": "1"}}
                },
                "home_lineup_order": {"all": ["nba.p.5001", "nba.p.5003"]}
            },
            "play_by_play": {
                "10": {
                    "class_type": "SHOT", "type": "1", "points": "2", "period": "1",
                    "side_of_basket": "R", "sideline_offset_percentage": "0.05",
                    "baseline_offset_percentage": "0.05", "player": "5001", "team": "2",
                    "assister": "5002", "shot_made": "1", "fastbreak": "0",
                    "clock": "8:00", "home_score": "10", "away_score": "8"
                },
                "11": {
                    "class_type": "SHOT", "type": "3", "points": "3", "period": "2",
                    "side_of_basket": "L", "sideline_offset_percentage": "0.5",
                    "baseline_offset_percentage": "0.9", "player": "6001", "team": "1",
                    "assister": "0", "shot_made": "0", "fastbreak": "0",
                    "clock": "2:10", "home_score": "50", "away_score": "49"
                },
                "12": {
                    "class_type": "SHOT", "type": "12", "points": "1", "period": "1",
                    "side_of_basket": "L", "sideline_offset_percentage": "0.32",
                    "baseline_offset_percentage": "0.0", "player": "5001", "team": "2",
                    "assister": "0", "shot_made": "1", "fastbreak": "0",
                    "clock": "5:00", "home_score": "12", "away_score": "8"
                },
                "13": {
                    "class_type": "SHOT", "type": "12", "points": "1", "period": "5",
                    "side_of_basket": "L", "sideline_offset_percentage": "0.32",
                    "baseline_offset_percentage": "0.0", "player": "5001", "team": "2",
                    "assister": "0", "shot_made": "1", "fastbreak": "0",
                    "clock": "0:30", "home_score": "110", "away_score": "105"
                },
                "14": {"class_type": "FOUL", "period": "5"}
            }
        },
        "teamData": {
            "teams": {
                "nba.t.1": {"team_id": "nba.t.1", "first_name": "Brooklyn", "last_name": "Nets"},
                "nba.t.2": {"team_id": "nba.t.2", "first_name": "Boston", "last_name": "Celtics"}
            }
        },
        "playerData": {
            "players": {
                "nba.p.5001": {"player_id": "nba.p.5001", "first_name": "Jay", "last_name": "Holt", "team_id": "nba.t.2"},
                "nba.p.5003": {"player_id": "nba.p.5003", "first_name": "Sam", "last_name": "Reyes", "team_id": "nba.t.2"}
            }
        },
        "statsData": {
            "teamStatsByGameId": {
                "nba.g.2024040102": {
                    "nba.t.2": {
                        "nba.stat_variation.2": {
                            "nba.stat_type.128": "40-85", "nba.stat_type.129": "20-25",
                            "nba.stat_type.130": "12-30", "nba.stat_type.113": "112",
                            "nba.stat_type.114": "9", "nba.stat_type.115": "35",
                            "nba.stat_type.117": "25", "nba.stat_type.118": "7",
                            "nba.stat_type.119": "5", "nba.stat_type.120": "11",
                            "nba.stat_type.122": "18"
                        }
                    },
                    "nba.t.1": {
                        "nba.stat_variation.2": {
                            "nba.stat_type.128": "39-90", "nba.stat_type.129": "18-22",
                            "nba.stat_type.130": "12-36", "nba.stat_type.113": "108"
                        }
                    }
                }
            },
            "playerStats": {
                "nba.p.5001": {
                    "nba.stat_variation.2": {
                        "nba.stat_type.3": "34:30", "nba.stat_type.28": "9-17",
                        "nba.stat_type.29": "3-4", "nba.stat_type.30": "2-6",
                        "nba.stat_type.13": "23", "nba.stat_type.14": "1",
                        "nba.stat_type.15": "6", "nba.stat_type.17": "4",
                        "nba.stat_type.18": "1", "nba.stat_type.19": "0",
                        "nba.stat_type.20": "2", "nba.stat_type.22": "3",
                        "nba.stat_type.32": "7"
                    }
                },
                "nba.p.5003": {
                    "nba.stat_variation.2": {"nba.stat_type.3": "0:00"}
                }
            }
        }
    }))
}

// ── ESPN ─────────────────────────────────────────────────────────────────────

pub fn espn_scoreboard() -> RawPayload {
    espn(json!({
        "season": {"displayName": "2024"},
        "evts": [
            {
                "id": ESPN_GAME_ID,
                "teams": [
                    {"id": "3", "isHome": true, "displayName": "Los Angeles Angels"},
                    {"id": "12", "isHome": false, "displayName": "Oakland Athletics"}
                ],
                "link": "/mlb/game/_/gameId/401472105",
                "date": "2024-04-01T20:10Z",
                "status": {"description": "Final"}
            },
            {"id": "401472999", "teams": [], "date": "2024-04-01T23:10Z"}
        ]
    }))
}

pub fn espn_final_descriptor() -> GameDescriptor {
    GameDescriptor {
        provider: Provider::Espn,
        league: League::Mlb,
        game_id: ESPN_GAME_ID.to_string(),
        home_id: "mlb.t.3".to_string(),
        away_id: "mlb.t.12".to_string(),
        url: Some("/mlb/game/_/gameId/401472105".to_string()),
        game_time: at("2024-04-01T20:10:00+00:00"),
        game_date: game_date(),
        season: 2024,
        week: None,
        status: GameStatus::Final,
        game_type: None,
        odds: Vec::new(),
    }
}

fn espn_athlete(id: &str, name: &str, pos: &str, stats: &[&str]) -> Value {
    json!({"athlt": {"id": id, "dspNm": name}, "pos": pos, "stats": stats})
}

fn espn_pitch(id: &str, rslt: &str, dsc: &str) -> Value {
    json!({
        "id": id, "rslt": rslt, "dsc": dsc, "ptchDsc": "Four-seam FB",
        "vlcty": 95, "ptchCoords": {"x": 110, "y": 160}
    })
}

pub fn espn_mlb_boxscore() -> RawPayload {
    espn(json!({
        "box": {
            "gmStrp": {
                "gid": ESPN_GAME_ID,
                "dt": "2024-04-01T20:10Z",
                "tms": [
                    {
                        "id": "3", "isHome": true, "winner": true, "score": "5",
                        "displayName": "Los Angeles Angels", "abbrev": "LAA",
                        "location": "Los Angeles", "shortDisplayName": "Angels",
                        "teamColor": "ba0021", "altColor": "c4ced4"
                    },
                    {
                        "id": "12", "isHome": false, "winner": false, "score": "2",
                        "displayName": "Oakland Athletics", "abbrev": "OAK",
                        "location": "Oakland", "shortDisplayName": "Athletics",
                        "teamColor": "003831", "altColor": "efb21e"
                    }
                ]
            },
            "gmInfo": {"loc": "Angel Stadium"},
            "shtChrt": {
                "tms": {
                    "away": {"id": "12", "errors": 0},
                    "home": {"id": "3", "errors": 1}
                }
            },
            "bxscr": [
                {
                    "tm": {"id": "12"},
                    "stats": [
                        {
                            "lbls": ["AB", "R", "H", "RBI", "HR", "BB", "K", "#P"],
                            "ttls": ["31", "2", "6", "2", "0", "3", "8", "141"],
                            "athlts": [espn_athlete(
                                "31001", "Luis Rivera", "SS",
                                &["4", "1", "2", "1", "0", "0", "1", "17"]
                            )]
                        },
                        {
                            "lbls": ["IP", "H", "R", "ER", "BB", "K", "HR", "PC-ST"],
                            "ttls": ["8.0", "9", "5", "5", "2", "7", "1", "112-70"],
                            "athlts": [espn_athlete(
                                "31101", "Joe Boyd", "SP",
                                &["8.0", "9", "5", "5", "2", "7", "1", "112-70"]
                            )]
                        }
                    ]
                },
                {
                    "tm": {"id": "3"},
                    "stats": [
                        {
                            "lbls": ["AB", "R", "H", "RBI", "HR", "BB", "K", "#P"],
                            "ttls": ["33", "5", "9", "5", "1", "2", "7", "118"],
                            "athlts": [espn_athlete(
                                "32002", "Michael Torres", "CF",
                                &["4", "1", "1", "1", "1", "0", "0", "12"]
                            )]
                        },
                        {
                            "lbls": ["IP", "H", "R", "ER", "BB", "K", "HR", "PC-ST"],
                            "ttls": ["9.0", "6", "2", "2", "3", "8", "0", "141-90"],
                            "athlts": [
                                espn_athlete(
                                    "32102", "Tyler Andrews", "SP",
                                    &["6.1", "4", "1", "1", "2", "6", "0", "98-62"]
                                ),
                                espn_athlete(
                                    "32002", "Michael Torres", "RP",
                                    &["2.2", "2", "1", "1", "1", "2", "0", "43-28"]
                                )
                            ]
                        }
                    ]
                }
            ],
            "plys": [
                {"id": "4014721050000100", "plyTypId": "1", "txt": "Tyler Andrews pitches to Luis Rivera", "tm": "12"},
                {"id": "4014721050000101", "plyTypId": "36", "txt": "", "tm": "12"},
                {"id": "4014721050000102", "plyTypId": "21", "txt": "", "tm": "12"},
                {"id": "4014721050000103", "plyTypId": "37", "txt": "Luis Rivera struck out swinging.", "tm": "12"},
                {"id": "4014721050000200", "plyTypId": "58", "txt": "End of Top of the 1st"},
                {"id": "4014721050000300", "plyTypId": "1", "txt": "Joe Boyd pitches to Michael Torres.", "tm": "3"},
                {"id": "4014721050000301", "plyTypId": "28", "txt": "Michael Torres homered to left (402 feet).", "tm": "3"}
            ]
        },
        "pbp": {
            "pbp": [
                {
                    "plays": [
                        {
                            "id": "4014721050000103",
                            "pitches": [
                                espn_pitch("4014721050000101", "strike", "Strike Looking"),
                                espn_pitch("4014721050000102", "foul", "Foul Ball"),
                                espn_pitch("4014721050000103", "strike", "Strike Swinging")
                            ]
                        },
                        {"id": "4014721050000200", "isInfoPlay": true, "pitches": []}
                    ]
                },
                {
                    "plays": [
                        {"id": "4014721050000250", "isPitcherChange": true},
                        {
                            "id": "4014721050000301",
                            "pitches": [{
                                "id": "4014721050000301", "rslt": "play", "dsc": "In play, run(s)",
                                "ptchDsc": "Slider", "vlcty": 86,
                                "ptchCoords": {"x": 120, "y": 170},
                                "hitCoords": {"x": 40, "y": 20}
                            }]
                        }
                    ]
                }
            ]
        }
    }))
}

// ── Fake download agent ──────────────────────────────────────────────────────

/// Serves the canned payloads above and counts every request.
pub struct FakeDownloader {
    provider: Provider,
    scoreboard: RawPayload,
    empty_scoreboard: RawPayload,
    games: HashMap<String, RawPayload>,
    players: HashMap<String, RawPayload>,
    calls: AtomicUsize,
}

impl FakeDownloader {
    pub fn yahoo() -> Self {
        FakeDownloader {
            provider: Provider::Yahoo,
            scoreboard: yahoo_scoreboard(),
            empty_scoreboard: yahoo(json!({"GamesStore": {"games": {}}})),
            games: HashMap::from([
                (YAHOO_GAME_ID.to_string(), yahoo_mlb_boxscore()),
                (YAHOO_PREGAME_ID.to_string(), yahoo_mlb_matchup()),
            ]),
            players: HashMap::from([("mlb.p.9001".to_string(), yahoo_player())]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn espn() -> Self {
        FakeDownloader {
            provider: Provider::Espn,
            scoreboard: espn_scoreboard(),
            empty_scoreboard: espn(json!({"evts": []})),
            games: HashMap::from([(ESPN_GAME_ID.to_string(), espn_mlb_boxscore())]),
            players: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DownloadAgent for FakeDownloader {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch_scoreboard(&self, _league: League, date: NaiveDate) -> Result<RawPayload> {
        self.hit();
        if date == game_date() {
            Ok(self.scoreboard.clone())
        } else {
            Ok(self.empty_scoreboard.clone())
        }
    }

    async fn fetch_boxscore(&self, game: &GameDescriptor) -> Result<RawPayload> {
        self.hit();
        self.games
            .get(&game.game_id)
            .cloned()
            .ok_or_else(|| IngestError::Extract(game.game_id.clone()))
    }

    async fn fetch_player(&self, _league: League, player_id: &str) -> Result<RawPayload> {
        self.hit();
        if self.provider != Provider::Yahoo {
            return Err(IngestError::Unsupported {
                provider: self.provider,
                operation: "player downloads",
            });
        }
        self.players
            .get(player_id)
            .cloned()
            .ok_or_else(|| IngestError::Extract(player_id.to_string()))
    }
}
