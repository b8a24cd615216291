use chrono::NaiveDate;

use crate::db::models::{EntityType, League};

/// Build a canonical id: `{league prefix}.{entity tag}.{key}`.
pub fn canonical_id(league: League, entity: EntityType, key: &str) -> String {
    format!("{}.{}.{}", league.prefix(), entity.tag(), key.trim())
}

/// Canonical game id, identical for every provider that lists the same
/// matchup on the same scoreboard date.
///
/// Two games between the same teams on one date (doubleheaders) collide; the
/// first writer wins.
pub fn game_id(league: League, date: NaiveDate, away_team_id: &str, home_team_id: &str) -> String {
    let key = format!(
        "{}-{}-{}",
        date.format("%Y%m%d"),
        key_of(away_team_id),
        key_of(home_team_id)
    );
    canonical_id(league, EntityType::Game, &key)
}

/// Provider-neutral suffix of an id like `mlb.t.12`; ids without the
/// `prefix.tag.` shape are returned unchanged.
pub fn key_of(id: &str) -> &str {
    let mut parts = id.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(tag), Some(key)) if tag.len() == 1 => key,
        _ => id,
    }
}

/// Re-derive a canonical id from a provider id already in `prefix.tag.key`
/// form, so the canonical id depends only on the key.
pub fn rekey(league: League, entity: EntityType, provider_id: &str) -> String {
    canonical_id(league, entity, key_of(provider_id))
}
