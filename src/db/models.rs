use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Leagues & providers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Basketball,
    Baseball,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum League {
    #[serde(rename = "NBA")]
    Nba,
    #[serde(rename = "NCAAB")]
    Ncaab,
    #[serde(rename = "MLB")]
    Mlb,
}

impl League {
    pub const ALL: [League; 3] = [League::Nba, League::Ncaab, League::Mlb];

    pub fn id(self) -> &'static str {
        match self {
            League::Nba => "NBA",
            League::Ncaab => "NCAAB",
            League::Mlb => "MLB",
        }
    }

    /// Lowercase prefix used in canonical ids and cache paths.
    pub fn prefix(self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Ncaab => "ncaab",
            League::Mlb => "mlb",
        }
    }

    /// URL path segment both providers use for the league.
    pub fn slug(self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Ncaab => "college-basketball",
            League::Mlb => "mlb",
        }
    }

    pub fn sport(self) -> Sport {
        match self {
            League::Nba | League::Ncaab => Sport::Basketball,
            League::Mlb => Sport::Baseball,
        }
    }

    pub fn regulation_periods(self) -> u32 {
        match self {
            League::Nba => 4,
            League::Ncaab => 2,
            League::Mlb => 9,
        }
    }

    /// Regulation minutes of a basketball game (0 for untimed sports).
    pub fn base_minutes(self) -> u32 {
        match self {
            League::Nba => 48,
            League::Ncaab => 40,
            League::Mlb => 0,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NBA" => Ok(League::Nba),
            "NCAAB" => Ok(League::Ncaab),
            "MLB" => Ok(League::Mlb),
            other => Err(format!("unsupported league '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Yahoo,
    Espn,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Yahoo => "yahoo",
            Provider::Espn => "espn",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Provider::Yahoo),
            "espn" => Ok(Provider::Espn),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Entity kinds that carry a canonical identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Game,
    Team,
    Player,
    Stadium,
}

impl EntityType {
    /// Single-letter tag embedded in canonical ids (`mlb.t.12`).
    pub fn tag(self) -> &'static str {
        match self {
            EntityType::Game => "g",
            EntityType::Team => "t",
            EntityType::Player => "p",
            EntityType::Stadium => "s",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Game => "game",
            EntityType::Team => "team",
            EntityType::Player => "player",
            EntityType::Stadium => "stadium",
        }
    }
}

// ── Scoreboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Pregame,
    InProgress,
    Final,
    Postponed,
    Unknown,
}

impl GameStatus {
    /// Map a provider status label onto the canonical status.
    pub fn from_provider(s: &str) -> GameStatus {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "pregame" | "scheduled" | "pre" | "status_scheduled" => GameStatus::Pregame,
            "in_progress" | "in progress" | "live" | "halftime" => GameStatus::InProgress,
            "postponed" | "delayed" | "cancelled" | "canceled" | "suspended" => {
                GameStatus::Postponed
            }
            _ if s.starts_with("final") => GameStatus::Final,
            _ => GameStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Pregame => "pregame",
            GameStatus::InProgress => "in_progress",
            GameStatus::Final => "final",
            GameStatus::Postponed => "postponed",
            GameStatus::Unknown => "unknown",
        }
    }
}

/// One betting-market observation; the matchup document keeps these in
/// arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsSnapshot {
    pub captured_at: DateTime<Utc>,
    pub away_spread: Option<f64>,
    pub home_spread: Option<f64>,
    pub away_line: Option<f64>,
    pub home_line: Option<f64>,
    pub away_ml: Option<f64>,
    pub home_ml: Option<f64>,
    pub total: Option<f64>,
    pub over_line: Option<f64>,
    pub under_line: Option<f64>,
}

/// A scoreboard entry: everything needed to locate, cache and fetch one game
/// from one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDescriptor {
    pub provider: Provider,
    pub league: League,
    /// Provider-local game id (`mlb.g.2024040110`, `401472105`)
    pub game_id: String,
    /// Canonical team ids
    pub home_id: String,
    pub away_id: String,
    /// Provider-relative boxscore path; `None` when the provider has no page yet
    pub url: Option<String>,
    pub game_time: DateTime<FixedOffset>,
    /// Scoreboard date the game was listed under
    pub game_date: NaiveDate,
    pub season: i32,
    pub week: Option<u32>,
    pub status: GameStatus,
    pub game_type: Option<String>,
    pub odds: Vec<OddsSnapshot>,
}

// ── Reference entities ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub league: League,
    pub home_id: String,
    pub away_id: String,
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub stadium_id: Option<String>,
    pub is_neutral_site: bool,
    pub game_date: NaiveDate,
    pub game_time: DateTime<FixedOffset>,
    pub season: i32,
    pub week: Option<u32>,
    pub game_type: String,
    pub status: GameStatus,
    pub game_result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub league: League,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub abrv: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub league: League,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub current_team_id: Option<String>,
    pub uniform_number: Option<String>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stadium {
    pub stadium_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBio {
    pub player_id: String,
    pub first_name: String,
    pub last_name: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bats: Option<String>,
    pub throws: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub college: Option<String>,
    pub draft_year: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_pick: Option<i32>,
    pub draft_team_id: Option<String>,
    pub rookie_season: Option<i32>,
}

// ── Per-game statistics ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketballTeamStat {
    pub game_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub minutes: u32,
    pub fga: i32,
    pub fgm: i32,
    pub fta: i32,
    pub ftm: i32,
    pub tpa: i32,
    pub tpm: i32,
    pub pts: i32,
    pub oreb: i32,
    pub dreb: i32,
    pub ast: i32,
    pub stl: i32,
    pub blk: i32,
    pub turnovers: i32,
    pub fouls: i32,
    pub pts_in_pt: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseballTeamStat {
    pub game_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub runs: i32,
    pub hits: i32,
    pub errors: i32,
    /// Team batting totals
    pub batting: BaseballLine,
    /// Team pitching totals
    pub pitching: BaseballLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sport", rename_all = "lowercase")]
pub enum TeamStat {
    Basketball(BasketballTeamStat),
    Baseball(BaseballTeamStat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketballPlayerStat {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub starter: bool,
    pub minutes: f64,
    pub fga: i32,
    pub fgm: i32,
    pub fta: i32,
    pub ftm: i32,
    pub tpa: i32,
    pub tpm: i32,
    pub pts: i32,
    pub oreb: i32,
    pub dreb: i32,
    pub ast: i32,
    pub stl: i32,
    pub blk: i32,
    pub turnovers: i32,
    pub fouls: i32,
    pub plus_minus: Option<i32>,
}

/// Which side of the ball a baseball stat line covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatRole {
    Batting,
    Pitching,
}

impl StatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StatRole::Batting => "batting",
            StatRole::Pitching => "pitching",
        }
    }
}

/// Box score counting stats. Batting lines leave the pitching-only fields
/// empty and vice versa; `runs`, `hits`, `walks`, `strikeouts` and
/// `home_runs` are allowed rather than produced on a pitching line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseballLine {
    pub at_bats: Option<i32>,
    pub runs: Option<i32>,
    pub hits: Option<i32>,
    pub rbi: Option<i32>,
    pub home_runs: Option<i32>,
    pub walks: Option<i32>,
    pub strikeouts: Option<i32>,
    /// Innings as printed, `6.1` = six and a third
    pub innings: Option<f64>,
    pub earned_runs: Option<i32>,
    /// Pitches thrown (pitching) or seen (batting)
    pub pitches: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseballPlayerStat {
    pub game_id: String,
    pub player: PlayerRef,
    pub team_id: String,
    pub opp_id: String,
    pub role: StatRole,
    pub position: Option<String>,
    pub line: BaseballLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub game_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub period: u32,
    pub pts: i32,
}

// ── Betting markets ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLine {
    pub game_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub spread: f64,
    pub spread_line: f64,
    pub money_line: Option<f64>,
    /// Team points minus opponent points
    pub result: i32,
    /// 1 cover, 0 push, -1 miss
    pub spread_outcome: i32,
    /// 1 win, 0 tie, -1 loss
    pub money_outcome: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverUnder {
    pub game_id: String,
    pub over_under: f64,
    pub over_line: f64,
    pub under_line: f64,
    pub total: i32,
    /// 1 over, 0 push, -1 under
    pub ou_outcome: i32,
}

// ── Lineups & play-by-play streams ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingOrder {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub batt_order: i32,
    pub sub_order: i32,
    pub pos: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullpen {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub pitch_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineups {
    pub batting: Vec<BattingOrder>,
    pub bullpen: Vec<Bullpen>,
}

/// A player reference inside a play-by-play record. Secondary providers only
/// name players in free text, so their refs stay `Named` until resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PlayerRef {
    Canonical(String),
    Named(String),
}

impl PlayerRef {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            PlayerRef::Canonical(id) => Some(id),
            PlayerRef::Named(_) => None,
        }
    }
}

/// Outcome classes of a completed at-bat. Discriminants are the persisted
/// `at_bat_type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtBatType {
    Strikeout = 0,
    Foulout = 1,
    Flyout = 2,
    Groundout = 3,
    Popout = 4,
    Lineout = 5,
    HitByPitch = 6,
    Walk = 7,
    Single = 8,
    Double = 9,
    Triple = 10,
    HomeRun = 11,
}

impl AtBatType {
    pub fn id(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtBat {
    pub game_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub play_num: i64,
    pub batter: PlayerRef,
    pub pitcher: PlayerRef,
    pub at_bat_type: AtBatType,
    pub period: Option<u32>,
    pub hit_hardness: Option<String>,
    pub hit_style: Option<String>,
    pub hit_angle: Option<f64>,
    pub hit_distance: Option<f64>,
    pub hit_x: Option<f64>,
    pub hit_y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub game_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub play_num: i64,
    pub batter: PlayerRef,
    pub pitcher: PlayerRef,
    /// Running pitch count of this pitcher in the game
    pub pitch_count: Option<u32>,
    pub sequence: Option<i32>,
    /// Count before the pitch was thrown
    pub balls: u8,
    pub strikes: u8,
    pub period: Option<u32>,
    pub velocity: Option<f64>,
    pub pitch_x: Option<f64>,
    pub pitch_y: Option<f64>,
    /// Cell of the 20x20 strike-zone grid
    pub pitch_location: Option<u32>,
    pub hit_x: Option<f64>,
    pub hit_y: Option<f64>,
    pub pitch_type: Option<String>,
    pub pitch_result: String,
    /// Set only on the pitch that ended the at-bat
    pub ab_result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub opp_id: String,
    pub period: u32,
    pub shot_type_id: i32,
    pub assist_id: Option<String>,
    pub shot_made: bool,
    pub points: i32,
    pub base_pct: f64,
    pub side_pct: f64,
    pub distance: i32,
    pub fastbreak: bool,
    pub side_of_basket: String,
    pub clutch: bool,
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Misc {
    pub at_bats: Vec<AtBat>,
    pub pitches: Vec<Pitch>,
    pub shots: Vec<Shot>,
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderMapping {
    pub provider: Provider,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub provider_id: String,
}

/// An athlete as a secondary provider lists it: local id plus display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAthlete {
    pub provider_id: String,
    pub display_name: String,
}

// ── Normalized documents ─────────────────────────────────────────────────────

/// A provider document exactly as downloaded, tagged with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    pub provider: Provider,
    pub body: serde_json::Value,
}

/// Canonical rendition of one provider's final boxscore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boxscore {
    pub provider: Provider,
    pub game: Game,
    pub stadium: Option<Stadium>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub team_stats: Vec<TeamStat>,
    pub player_stats: Vec<BasketballPlayerStat>,
    pub baseball_player_stats: Vec<BaseballPlayerStat>,
    pub periods: Vec<Period>,
    pub game_lines: Vec<GameLine>,
    pub over_under: Option<OverUnder>,
    pub lineups: Lineups,
    pub misc: Misc,
    pub mappings: Vec<ProviderMapping>,
    /// Athletes the provider knows only by its own id and display name
    pub athletes: Vec<ProviderAthlete>,
}

/// Pregame working document. Lives only in the file cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub provider: Provider,
    pub league: League,
    pub game_id: String,
    pub home_id: String,
    pub away_id: String,
    pub url: Option<String>,
    pub game_time: DateTime<FixedOffset>,
    pub season: i32,
    pub week: Option<u32>,
    pub status: GameStatus,
    pub game_type: Option<String>,
    pub stadium_id: Option<String>,
    pub is_neutral: bool,
    pub lineups: Option<serde_json::Value>,
    pub players: Option<serde_json::Value>,
    pub teams: Vec<serde_json::Value>,
    pub injuries: Vec<serde_json::Value>,
    /// Append-only odds time series
    pub odds: Vec<OddsSnapshot>,
}

impl Matchup {
    /// Skeleton document built from a scoreboard entry before any refresh.
    pub fn from_descriptor(game: &GameDescriptor) -> Self {
        Matchup {
            provider: game.provider,
            league: game.league,
            game_id: game.game_id.clone(),
            home_id: game.home_id.clone(),
            away_id: game.away_id.clone(),
            url: game.url.clone(),
            game_time: game.game_time,
            season: game.season,
            week: game.week,
            status: game.status,
            game_type: game.game_type.clone(),
            stadium_id: None,
            is_neutral: false,
            lineups: None,
            players: None,
            teams: Vec::new(),
            injuries: Vec::new(),
            odds: game.odds.clone(),
        }
    }

    pub fn has_lineups(&self) -> bool {
        match &self.lineups {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Object(m)) => !m.is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        }
    }
}
