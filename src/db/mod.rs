use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub mod models;
use models::*;

use crate::error::{IngestError, Result};

/// Outcome of persisting one boxscore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameWrite {
    /// Game row and all of its children were written.
    Inserted,
    /// The game was already stored; only reference rows were considered.
    AlreadyExists,
}

/// Single SQLite connection behind a mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.lock()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| IngestError::Poisoned)
    }

    // ── Boxscores ────────────────────────────────────────────────────────────

    /// Persist one boxscore as a single unit of work.
    ///
    /// Mappings, stadium, teams and players are inserted when absent. The
    /// game and every per-game child row are written only if the game is not
    /// stored yet; otherwise none of them are touched.
    pub fn insert_boxscore(&self, bx: &Boxscore) -> Result<GameWrite> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for mapping in &bx.mappings {
            insert_mapping(&tx, mapping)?;
        }
        if let Some(stadium) = &bx.stadium {
            tx.execute(
                "INSERT OR IGNORE INTO stadiums (stadium_id, name) VALUES (?1, ?2)",
                params![stadium.stadium_id, stadium.name],
            )?;
        }
        for team in &bx.teams {
            insert_team(&tx, team)?;
        }
        for player in &bx.players {
            insert_player(&tx, player)?;
        }

        if game_exists(&tx, &bx.game.game_id)? {
            tx.commit()?;
            return Ok(GameWrite::AlreadyExists);
        }

        insert_game(&tx, &bx.game)?;
        for stat in &bx.team_stats {
            insert_team_stat(&tx, stat)?;
        }
        for stat in &bx.player_stats {
            insert_player_stat(&tx, stat)?;
        }
        for stat in &bx.baseball_player_stats {
            insert_baseball_player_stat(&tx, stat)?;
        }
        for p in &bx.periods {
            tx.execute(
                "INSERT INTO periods (game_id, team_id, opp_id, period, pts)
                 VALUES (?1,?2,?3,?4,?5)",
                params![p.game_id, p.team_id, p.opp_id, p.period, p.pts],
            )?;
        }
        for line in &bx.game_lines {
            tx.execute(
                "INSERT INTO game_lines (
                    game_id, team_id, opp_id, spread, spread_line, money_line,
                    result, spread_outcome, money_outcome
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                params![
                    line.game_id,
                    line.team_id,
                    line.opp_id,
                    line.spread,
                    line.spread_line,
                    line.money_line,
                    line.result,
                    line.spread_outcome,
                    line.money_outcome,
                ],
            )?;
        }
        if let Some(ou) = &bx.over_under {
            tx.execute(
                "INSERT INTO over_unders (game_id, over_under, over_line, under_line, total, ou_outcome)
                 VALUES (?1,?2,?3,?4,?5,?6)",
                params![ou.game_id, ou.over_under, ou.over_line, ou.under_line, ou.total, ou.ou_outcome],
            )?;
        }
        insert_lineups(&tx, &bx.lineups)?;
        insert_misc(&tx, &bx.misc)?;

        tx.commit()?;
        Ok(GameWrite::Inserted)
    }

    // ── Player bios ──────────────────────────────────────────────────────────

    /// Insert a bio unless one is stored for the player. Returns whether a
    /// row was written.
    pub fn insert_player_bio(&self, bio: &PlayerBio) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let written = tx.execute(
            "INSERT OR IGNORE INTO player_bios (
                player_id, first_name, last_name, height_cm, weight_kg, bats, throws,
                birth_date, college, draft_year, draft_round, draft_pick, draft_team_id,
                rookie_season
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
            params![
                bio.player_id,
                bio.first_name,
                bio.last_name,
                bio.height_cm,
                bio.weight_kg,
                bio.bats,
                bio.throws,
                bio.birth_date,
                bio.college,
                bio.draft_year,
                bio.draft_round,
                bio.draft_pick,
                bio.draft_team_id,
                bio.rookie_season,
            ],
        )?;
        tx.commit()?;
        Ok(written > 0)
    }

    pub fn has_player_bio(&self, player_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM player_bios WHERE player_id = ?1",
                params![player_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    /// Canonical players currently on any of `team_ids`.
    pub fn players_for_teams(&self, team_ids: &[&str]) -> Result<Vec<Player>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT player_id, league, first_name, last_name, position, current_team_id,
                    uniform_number
             FROM players WHERE current_team_id = ?1 ORDER BY player_id",
        )?;
        let mut players = Vec::new();
        for team_id in team_ids {
            let rows = stmt
                .query_map(params![team_id], map_player)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            players.extend(rows);
        }
        Ok(players)
    }

    /// Row count of one of the persisted tables.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        if !TABLES.contains(&table) {
            return Err(IngestError::Database(rusqlite::Error::InvalidParameterName(
                table.to_string(),
            )));
        }
        let conn = self.lock()?;
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(n)
    }
}

// ── Test queries ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl Database {
    pub fn get_game(&self, game_id: &str) -> Result<Option<Game>> {
        let conn = self.lock()?;
        let game = conn
            .query_row(
                "SELECT game_id, league, home_id, away_id, winner_id, loser_id, stadium_id,
                        is_neutral_site, game_date, game_time, season, week, game_type,
                        status, game_result
                 FROM games WHERE game_id = ?1",
                params![game_id],
                map_game,
            )
            .optional()?;
        Ok(game)
    }

    /// Every provider's local id for one canonical entity.
    pub fn mappings_for(&self, entity_type: EntityType, entity_id: &str) -> Result<Vec<ProviderMapping>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT provider, entity_type, entity_id, provider_id
             FROM provider_mappings WHERE entity_type = ?1 AND entity_id = ?2
             ORDER BY provider",
        )?;
        let mappings = stmt
            .query_map(params![entity_type.as_str(), entity_id], map_mapping)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(mappings)
    }
}

// ── Unit-of-work writers ──────────────────────────────────────────────────────

fn game_exists(conn: &Connection, game_id: &str) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM games WHERE game_id = ?1", params![game_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn insert_mapping(tx: &Transaction, m: &ProviderMapping) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO provider_mappings (provider, entity_type, entity_id, provider_id)
         VALUES (?1,?2,?3,?4)",
        params![m.provider.as_str(), m.entity_type.as_str(), m.entity_id, m.provider_id],
    )?;
    Ok(())
}

fn insert_team(tx: &Transaction, t: &Team) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO teams (
            team_id, league, first_name, last_name, display_name, abrv, conference,
            division, primary_color, secondary_color
         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            t.team_id,
            t.league.id(),
            t.first_name,
            t.last_name,
            t.display_name,
            t.abrv,
            t.conference,
            t.division,
            t.primary_color,
            t.secondary_color,
        ],
    )?;
    Ok(())
}

fn insert_player(tx: &Transaction, p: &Player) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO players (
            player_id, league, first_name, last_name, position, current_team_id, uniform_number
         ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            p.player_id,
            p.league.id(),
            p.first_name,
            p.last_name,
            p.position,
            p.current_team_id,
            p.uniform_number,
        ],
    )?;
    Ok(())
}

fn insert_game(tx: &Transaction, g: &Game) -> Result<()> {
    tx.execute(
        "INSERT INTO games (
            game_id, league, home_id, away_id, winner_id, loser_id, stadium_id,
            is_neutral_site, game_date, game_time, season, week, game_type, status, game_result
         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        params![
            g.game_id,
            g.league.id(),
            g.home_id,
            g.away_id,
            g.winner_id,
            g.loser_id,
            g.stadium_id,
            g.is_neutral_site,
            g.game_date,
            g.game_time,
            g.season,
            g.week,
            g.game_type,
            g.status.as_str(),
            g.game_result,
        ],
    )?;
    Ok(())
}

fn insert_team_stat(tx: &Transaction, stat: &TeamStat) -> Result<()> {
    match stat {
        TeamStat::Basketball(s) => tx.execute(
            "INSERT INTO team_stats (
                game_id, team_id, opp_id, minutes, fga, fgm, fta, ftm, tpa, tpm, pts,
                oreb, dreb, ast, stl, blk, turnovers, fouls, pts_in_pt
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)",
            params![
                s.game_id, s.team_id, s.opp_id, s.minutes, s.fga, s.fgm, s.fta, s.ftm, s.tpa,
                s.tpm, s.pts, s.oreb, s.dreb, s.ast, s.stl, s.blk, s.turnovers, s.fouls,
                s.pts_in_pt,
            ],
        )?,
        TeamStat::Baseball(s) => tx.execute(
            "INSERT INTO team_stats (
                game_id, team_id, opp_id, runs, hits, errors,
                bat_ab, bat_rbi, bat_hr, bat_bb, bat_k, bat_pitches,
                pit_ip, pit_h, pit_r, pit_er, pit_bb, pit_k, pit_hr, pit_pitches
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
            params![
                s.game_id, s.team_id, s.opp_id, s.runs, s.hits, s.errors,
                s.batting.at_bats, s.batting.rbi, s.batting.home_runs, s.batting.walks,
                s.batting.strikeouts, s.batting.pitches,
                s.pitching.innings, s.pitching.hits, s.pitching.runs, s.pitching.earned_runs,
                s.pitching.walks, s.pitching.strikeouts, s.pitching.home_runs, s.pitching.pitches,
            ],
        )?,
    };
    Ok(())
}

fn insert_player_stat(tx: &Transaction, s: &BasketballPlayerStat) -> Result<()> {
    tx.execute(
        "INSERT INTO player_stats (
            game_id, player_id, team_id, opp_id, starter, minutes, fga, fgm, fta, ftm,
            tpa, tpm, pts, oreb, dreb, ast, stl, blk, turnovers, fouls, plus_minus
         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
        params![
            s.game_id, s.player_id, s.team_id, s.opp_id, s.starter, s.minutes, s.fga, s.fgm,
            s.fta, s.ftm, s.tpa, s.tpm, s.pts, s.oreb, s.dreb, s.ast, s.stl, s.blk,
            s.turnovers, s.fouls, s.plus_minus,
        ],
    )?;
    Ok(())
}

/// Baseball stat line. Lines still holding an unresolved player name are skipped.
fn insert_baseball_player_stat(tx: &Transaction, s: &BaseballPlayerStat) -> Result<()> {
    let Some(player_id) = s.player.canonical() else {
        debug!("Skipping unresolved {} line in {}", s.role.as_str(), s.game_id);
        return Ok(());
    };
    let l = &s.line;
    tx.execute(
        "INSERT INTO baseball_player_stats (
            game_id, player_id, team_id, opp_id, role, position, at_bats, runs, hits, rbi,
            home_runs, walks, strikeouts, innings, earned_runs, pitches
         ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        params![
            s.game_id, player_id, s.team_id, s.opp_id, s.role.as_str(), s.position, l.at_bats,
            l.runs, l.hits, l.rbi, l.home_runs, l.walks, l.strikeouts, l.innings,
            l.earned_runs, l.pitches,
        ],
    )?;
    Ok(())
}

fn insert_lineups(tx: &Transaction, lineups: &Lineups) -> Result<()> {
    for b in &lineups.batting {
        tx.execute(
            "INSERT INTO batting_order (game_id, player_id, team_id, opp_id, batt_order, sub_order, pos)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![b.game_id, b.player_id, b.team_id, b.opp_id, b.batt_order, b.sub_order, b.pos],
        )?;
    }
    for p in &lineups.bullpen {
        tx.execute(
            "INSERT INTO bullpen (game_id, player_id, team_id, opp_id, pitch_order)
             VALUES (?1,?2,?3,?4,?5)",
            params![p.game_id, p.player_id, p.team_id, p.opp_id, p.pitch_order],
        )?;
    }
    Ok(())
}

/// Stream rows. Rows still holding an unresolved player name are skipped.
fn insert_misc(tx: &Transaction, misc: &Misc) -> Result<()> {
    for ab in &misc.at_bats {
        let (Some(batter), Some(pitcher)) = (ab.batter.canonical(), ab.pitcher.canonical()) else {
            debug!("Skipping unresolved at-bat {} in {}", ab.play_num, ab.game_id);
            continue;
        };
        tx.execute(
            "INSERT INTO at_bats (
                game_id, team_id, opp_id, play_num, batter_id, pitcher_id, at_bat_type_id,
                period, hit_hardness, hit_style, hit_angle, hit_distance, hit_x, hit_y
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
            params![
                ab.game_id,
                ab.team_id,
                ab.opp_id,
                ab.play_num,
                batter,
                pitcher,
                ab.at_bat_type.id(),
                ab.period,
                ab.hit_hardness,
                ab.hit_style,
                ab.hit_angle,
                ab.hit_distance,
                ab.hit_x,
                ab.hit_y,
            ],
        )?;
    }
    for p in &misc.pitches {
        let (Some(batter), Some(pitcher)) = (p.batter.canonical(), p.pitcher.canonical()) else {
            debug!("Skipping unresolved pitch {} in {}", p.play_num, p.game_id);
            continue;
        };
        tx.execute(
            "INSERT INTO pitches (
                game_id, team_id, opp_id, play_num, batter_id, pitcher_id, pitch_count,
                sequence, balls, strikes, period, velocity, pitch_x, pitch_y, pitch_location,
                hit_x, hit_y, pitch_type, pitch_result, ab_result
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
            params![
                p.game_id,
                p.team_id,
                p.opp_id,
                p.play_num,
                batter,
                pitcher,
                p.pitch_count,
                p.sequence,
                p.balls,
                p.strikes,
                p.period,
                p.velocity,
                p.pitch_x,
                p.pitch_y,
                p.pitch_location,
                p.hit_x,
                p.hit_y,
                p.pitch_type,
                p.pitch_result,
                p.ab_result,
            ],
        )?;
    }
    for s in &misc.shots {
        tx.execute(
            "INSERT INTO shots (
                game_id, player_id, team_id, opp_id, period, shot_type_id, assist_id,
                shot_made, points, base_pct, side_pct, distance, fastbreak, side_of_basket,
                clutch, zone
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
            params![
                s.game_id,
                s.player_id,
                s.team_id,
                s.opp_id,
                s.period,
                s.shot_type_id,
                s.assist_id,
                s.shot_made,
                s.points,
                s.base_pct,
                s.side_pct,
                s.distance,
                s.fastbreak,
                s.side_of_basket,
                s.clutch,
                s.zone,
            ],
        )?;
    }
    Ok(())
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn parse_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

#[cfg(test)]
fn entity_type_column(idx: usize, raw: String) -> rusqlite::Result<EntityType> {
    match raw.as_str() {
        "game" => Ok(EntityType::Game),
        "team" => Ok(EntityType::Team),
        "player" => Ok(EntityType::Player),
        "stadium" => Ok(EntityType::Stadium),
        _ => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown entity type '{}'", raw).into(),
        )),
    }
}

#[cfg(test)]
fn map_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
    Ok(Game {
        game_id: row.get(0)?,
        league: parse_column(1, row.get(1)?)?,
        home_id: row.get(2)?,
        away_id: row.get(3)?,
        winner_id: row.get(4)?,
        loser_id: row.get(5)?,
        stadium_id: row.get(6)?,
        is_neutral_site: row.get(7)?,
        game_date: row.get(8)?,
        game_time: row.get(9)?,
        season: row.get(10)?,
        week: row.get(11)?,
        game_type: row.get(12)?,
        status: GameStatus::from_provider(&row.get::<_, String>(13)?),
        game_result: row.get(14)?,
    })
}

fn map_player(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        player_id: row.get(0)?,
        league: parse_column(1, row.get(1)?)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        position: row.get(4)?,
        current_team_id: row.get(5)?,
        uniform_number: row.get(6)?,
    })
}

#[cfg(test)]
fn map_mapping(row: &rusqlite::Row) -> rusqlite::Result<ProviderMapping> {
    Ok(ProviderMapping {
        provider: parse_column(0, row.get(0)?)?,
        entity_type: entity_type_column(1, row.get(1)?)?,
        entity_id: row.get(2)?,
        provider_id: row.get(3)?,
    })
}

/// Tables `count_rows` accepts.
pub const TABLES: &[&str] = &[
    "games",
    "teams",
    "players",
    "stadiums",
    "team_stats",
    "player_stats",
    "baseball_player_stats",
    "periods",
    "game_lines",
    "over_unders",
    "provider_mappings",
    "at_bats",
    "pitches",
    "shots",
    "batting_order",
    "bullpen",
    "player_bios",
];

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    game_id         TEXT    PRIMARY KEY,
    league          TEXT    NOT NULL,
    home_id         TEXT    NOT NULL,
    away_id         TEXT    NOT NULL,
    winner_id       TEXT,
    loser_id        TEXT,
    stadium_id      TEXT,
    is_neutral_site INTEGER NOT NULL DEFAULT 0,
    game_date       TEXT    NOT NULL,
    game_time       TEXT    NOT NULL,
    season          INTEGER NOT NULL,
    week            INTEGER,
    game_type       TEXT    NOT NULL,
    status          TEXT    NOT NULL,
    game_result     TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    team_id         TEXT    PRIMARY KEY,
    league          TEXT    NOT NULL,
    first_name      TEXT,
    last_name       TEXT,
    display_name    TEXT,
    abrv            TEXT,
    conference      TEXT,
    division        TEXT,
    primary_color   TEXT,
    secondary_color TEXT
);

CREATE TABLE IF NOT EXISTS players (
    player_id       TEXT    PRIMARY KEY,
    league          TEXT    NOT NULL,
    first_name      TEXT    NOT NULL,
    last_name       TEXT    NOT NULL,
    position        TEXT,
    current_team_id TEXT,
    uniform_number  TEXT
);

CREATE TABLE IF NOT EXISTS stadiums (
    stadium_id  TEXT    PRIMARY KEY,
    name        TEXT
);

CREATE TABLE IF NOT EXISTS player_bios (
    player_id       TEXT    PRIMARY KEY,
    first_name      TEXT    NOT NULL,
    last_name       TEXT    NOT NULL,
    height_cm       REAL,
    weight_kg       REAL,
    bats            TEXT,
    throws          TEXT,
    birth_date      TEXT,
    college         TEXT,
    draft_year      INTEGER,
    draft_round     INTEGER,
    draft_pick      INTEGER,
    draft_team_id   TEXT,
    rookie_season   INTEGER
);

CREATE TABLE IF NOT EXISTS team_stats (
    game_id     TEXT    NOT NULL,
    team_id     TEXT    NOT NULL,
    opp_id      TEXT    NOT NULL,
    minutes     INTEGER,
    fga         INTEGER,
    fgm         INTEGER,
    fta         INTEGER,
    ftm         INTEGER,
    tpa         INTEGER,
    tpm         INTEGER,
    pts         INTEGER,
    oreb        INTEGER,
    dreb        INTEGER,
    ast         INTEGER,
    stl         INTEGER,
    blk         INTEGER,
    turnovers   INTEGER,
    fouls       INTEGER,
    pts_in_pt   INTEGER,
    runs        INTEGER,
    hits        INTEGER,
    errors      INTEGER,
    bat_ab      INTEGER,
    bat_rbi     INTEGER,
    bat_hr      INTEGER,
    bat_bb      INTEGER,
    bat_k       INTEGER,
    bat_pitches INTEGER,
    pit_ip      REAL,
    pit_h       INTEGER,
    pit_r       INTEGER,
    pit_er      INTEGER,
    pit_bb      INTEGER,
    pit_k       INTEGER,
    pit_hr      INTEGER,
    pit_pitches INTEGER,
    PRIMARY KEY (game_id, team_id),
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS player_stats (
    game_id     TEXT    NOT NULL,
    player_id   TEXT    NOT NULL,
    team_id     TEXT    NOT NULL,
    opp_id      TEXT    NOT NULL,
    starter     INTEGER NOT NULL,
    minutes     REAL    NOT NULL,
    fga         INTEGER NOT NULL,
    fgm         INTEGER NOT NULL,
    fta         INTEGER NOT NULL,
    ftm         INTEGER NOT NULL,
    tpa         INTEGER NOT NULL,
    tpm         INTEGER NOT NULL,
    pts         INTEGER NOT NULL,
    oreb        INTEGER NOT NULL,
    dreb        INTEGER NOT NULL,
    ast         INTEGER NOT NULL,
    stl         INTEGER NOT NULL,
    blk         INTEGER NOT NULL,
    turnovers   INTEGER NOT NULL,
    fouls       INTEGER NOT NULL,
    plus_minus  INTEGER,
    PRIMARY KEY (game_id, player_id),
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS baseball_player_stats (
    game_id     TEXT    NOT NULL,
    player_id   TEXT    NOT NULL,
    team_id     TEXT    NOT NULL,
    opp_id      TEXT    NOT NULL,
    role        TEXT    NOT NULL,
    position    TEXT,
    at_bats     INTEGER,
    runs        INTEGER,
    hits        INTEGER,
    rbi         INTEGER,
    home_runs   INTEGER,
    walks       INTEGER,
    strikeouts  INTEGER,
    innings     REAL,
    earned_runs INTEGER,
    pitches     INTEGER,
    PRIMARY KEY (game_id, player_id, role),
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS periods (
    game_id     TEXT    NOT NULL,
    team_id     TEXT    NOT NULL,
    opp_id      TEXT    NOT NULL,
    period      INTEGER NOT NULL,
    pts         INTEGER NOT NULL,
    PRIMARY KEY (game_id, team_id, period),
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS game_lines (
    game_id         TEXT    NOT NULL,
    team_id         TEXT    NOT NULL,
    opp_id          TEXT    NOT NULL,
    spread          REAL    NOT NULL,
    spread_line     REAL    NOT NULL,
    money_line      REAL,
    result          INTEGER NOT NULL,
    spread_outcome  INTEGER NOT NULL,
    money_outcome   INTEGER NOT NULL,
    PRIMARY KEY (game_id, team_id),
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS over_unders (
    game_id     TEXT    PRIMARY KEY,
    over_under  REAL    NOT NULL,
    over_line   REAL    NOT NULL,
    under_line  REAL    NOT NULL,
    total       INTEGER NOT NULL,
    ou_outcome  INTEGER NOT NULL,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS provider_mappings (
    provider    TEXT    NOT NULL,
    entity_type TEXT    NOT NULL,
    entity_id   TEXT    NOT NULL,
    provider_id TEXT    NOT NULL,
    PRIMARY KEY (provider, entity_type, entity_id)
);

CREATE TABLE IF NOT EXISTS batting_order (
    game_id     TEXT    NOT NULL,
    player_id   TEXT    NOT NULL,
    team_id     TEXT    NOT NULL,
    opp_id      TEXT    NOT NULL,
    batt_order  INTEGER NOT NULL,
    sub_order   INTEGER NOT NULL,
    pos         TEXT,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS bullpen (
    game_id     TEXT    NOT NULL,
    player_id   TEXT    NOT NULL,
    team_id     TEXT    NOT NULL,
    opp_id      TEXT    NOT NULL,
    pitch_order INTEGER NOT NULL,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS at_bats (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id         TEXT    NOT NULL,
    team_id         TEXT    NOT NULL,
    opp_id          TEXT    NOT NULL,
    play_num        INTEGER NOT NULL,
    batter_id       TEXT    NOT NULL,
    pitcher_id      TEXT    NOT NULL,
    at_bat_type_id  INTEGER NOT NULL,
    period          INTEGER,
    hit_hardness    TEXT,
    hit_style       TEXT,
    hit_angle       REAL,
    hit_distance    REAL,
    hit_x           REAL,
    hit_y           REAL,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS pitches (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id         TEXT    NOT NULL,
    team_id         TEXT    NOT NULL,
    opp_id          TEXT    NOT NULL,
    play_num        INTEGER NOT NULL,
    batter_id       TEXT    NOT NULL,
    pitcher_id      TEXT    NOT NULL,
    pitch_count     INTEGER,
    sequence        INTEGER,
    balls           INTEGER NOT NULL,
    strikes         INTEGER NOT NULL,
    period          INTEGER,
    velocity        REAL,
    pitch_x         REAL,
    pitch_y         REAL,
    pitch_location  INTEGER,
    hit_x           REAL,
    hit_y           REAL,
    pitch_type      TEXT,
    pitch_result    TEXT    NOT NULL,
    ab_result       TEXT,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS shots (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id         TEXT    NOT NULL,
    player_id       TEXT    NOT NULL,
    team_id         TEXT    NOT NULL,
    opp_id          TEXT    NOT NULL,
    period          INTEGER NOT NULL,
    shot_type_id    INTEGER NOT NULL,
    assist_id       TEXT,
    shot_made       INTEGER NOT NULL,
    points          INTEGER NOT NULL,
    base_pct        REAL    NOT NULL,
    side_pct        REAL    NOT NULL,
    distance        INTEGER NOT NULL,
    fastbreak       INTEGER NOT NULL,
    side_of_basket  TEXT    NOT NULL,
    clutch          INTEGER NOT NULL,
    zone            TEXT    NOT NULL,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE INDEX IF NOT EXISTS idx_players_team ON players(current_team_id);
CREATE INDEX IF NOT EXISTS idx_mappings_local ON provider_mappings(provider, entity_type, provider_id);
CREATE INDEX IF NOT EXISTS idx_at_bats_game ON at_bats(game_id);
CREATE INDEX IF NOT EXISTS idx_pitches_game ON pitches(game_id);
CREATE INDEX IF NOT EXISTS idx_shots_game ON shots(game_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::identity::IdentityResolver;
    use crate::providers::{espn::EspnNormalizer, yahoo::YahooNormalizer, NormalizeAgent};

    fn yahoo_boxscore() -> Boxscore {
        YahooNormalizer::new(League::Mlb)
            .boxscore(&fixtures::yahoo_mlb_boxscore(), &fixtures::yahoo_final_descriptor())
            .unwrap()
    }

    #[test]
    fn test_insert_boxscore_writes_game_and_children() {
        let db = Database::open_in_memory().unwrap();
        let bx = yahoo_boxscore();
        assert_eq!(db.insert_boxscore(&bx).unwrap(), GameWrite::Inserted);

        let game = db.get_game(fixtures::CANONICAL_GAME_ID).unwrap().unwrap();
        assert_eq!(game, bx.game);
        assert_eq!(db.count_rows("teams").unwrap(), 2);
        assert_eq!(db.count_rows("players").unwrap(), 4);
        assert_eq!(db.count_rows("periods").unwrap(), 4);
        assert_eq!(db.count_rows("game_lines").unwrap(), 2);
        assert_eq!(db.count_rows("over_unders").unwrap(), 1);
        assert_eq!(db.count_rows("at_bats").unwrap(), 2);
        assert_eq!(db.count_rows("pitches").unwrap(), 1);
        assert_eq!(db.count_rows("batting_order").unwrap(), 2);
        let game_maps = db.mappings_for(EntityType::Game, fixtures::CANONICAL_GAME_ID).unwrap();
        assert_eq!(game_maps.len(), 1);
        assert_eq!(game_maps[0].provider_id, fixtures::YAHOO_GAME_ID);
    }

    fn espn_boxscore() -> Boxscore {
        let mut bx = EspnNormalizer::new(League::Mlb)
            .boxscore(&fixtures::espn_mlb_boxscore(), &fixtures::espn_final_descriptor())
            .unwrap();
        let roster = yahoo_boxscore().players;
        IdentityResolver::default().reconcile(&mut bx, &roster);
        bx
    }

    #[test]
    fn test_baseball_stat_lines_are_stored() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.insert_boxscore(&espn_boxscore()).unwrap(), GameWrite::Inserted);
        assert_eq!(db.count_rows("team_stats").unwrap(), 2);
        assert_eq!(db.count_rows("baseball_player_stats").unwrap(), 5);

        let conn = db.lock().unwrap();
        let (innings, pitches): (f64, i32) = conn
            .query_row(
                "SELECT innings, pitches FROM baseball_player_stats
                 WHERE player_id = 'mlb.p.9002' AND role = 'pitching'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((innings, pitches), (2.2, 43));
        let home_er: i32 = conn
            .query_row(
                "SELECT pit_er FROM team_stats WHERE team_id = 'mlb.t.3'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(home_er, 2);
    }

    #[test]
    fn test_stat_lines_follow_the_game_guard() {
        let db = Database::open_in_memory().unwrap();
        db.insert_boxscore(&yahoo_boxscore()).unwrap();
        assert_eq!(db.insert_boxscore(&espn_boxscore()).unwrap(), GameWrite::AlreadyExists);
        assert_eq!(db.count_rows("baseball_player_stats").unwrap(), 0);
    }

    #[test]
    fn test_existing_game_skips_every_child() {
        let db = Database::open_in_memory().unwrap();
        db.insert_boxscore(&yahoo_boxscore()).unwrap();

        // A corrected rerun must not touch the stored rows.
        let mut changed = yahoo_boxscore();
        changed.periods.truncate(1);
        changed.game.winner_id = None;
        assert_eq!(db.insert_boxscore(&changed).unwrap(), GameWrite::AlreadyExists);
        assert_eq!(db.count_rows("periods").unwrap(), 4);
        assert_eq!(db.count_rows("games").unwrap(), 1);
        let game = db.get_game(fixtures::CANONICAL_GAME_ID).unwrap().unwrap();
        assert_eq!(game.winner_id.as_deref(), Some("mlb.t.3"));
    }

    #[test]
    fn test_players_for_teams_and_mappings() {
        let db = Database::open_in_memory().unwrap();
        db.insert_boxscore(&yahoo_boxscore()).unwrap();
        let oak = db.players_for_teams(&["mlb.t.12"]).unwrap();
        assert_eq!(oak.len(), 2);
        assert!(oak.iter().any(|p| p.full_name() == "Luis Rivera"));

        let maps = db.mappings_for(EntityType::Team, "mlb.t.3").unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].provider, Provider::Yahoo);
    }

    #[test]
    fn test_player_bio_insert_if_absent() {
        let db = Database::open_in_memory().unwrap();
        let bio = YahooNormalizer::new(League::Mlb)
            .player(&fixtures::yahoo_player(), "mlb.p.9001")
            .unwrap();
        assert!(db.insert_player_bio(&bio).unwrap());
        assert!(!db.insert_player_bio(&bio).unwrap());
        assert!(db.has_player_bio("mlb.p.9001").unwrap());
        assert_eq!(db.count_rows("player_bios").unwrap(), 1);
    }

    #[test]
    fn test_count_rows_rejects_unknown_table() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.count_rows("sqlite_master; DROP TABLE games").is_err());
    }
}
