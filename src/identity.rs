//! Reconciles a secondary provider's view of a game with the canonical
//! entities the primary provider already minted.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::db::models::{Boxscore, EntityType, Player, PlayerRef, ProviderMapping};

pub const DEFAULT_NAME_CUTOFF: f64 = 0.7;

#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver {
    cutoff: f64,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        IdentityResolver::new(DEFAULT_NAME_CUTOFF)
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.trim_matches('.').to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl IdentityResolver {
    pub fn new(cutoff: f64) -> Self {
        IdentityResolver { cutoff }
    }

    /// Closest canonical player by display name, if any clears the cutoff.
    /// Equal scores go to the lowest player id.
    pub fn resolve_by_name<'a>(&self, name: &str, candidates: &'a [Player]) -> Option<&'a Player> {
        let wanted = normalize_name(name);
        candidates
            .iter()
            .map(|p| {
                let score = strsim::normalized_levenshtein(&wanted, &normalize_name(&p.full_name()));
                (score, p)
            })
            .filter(|(score, _)| *score >= self.cutoff)
            .max_by(|(a, pa), (b, pb)| {
                a.total_cmp(b).then_with(|| pb.player_id.cmp(&pa.player_id))
            })
            .map(|(_, p)| p)
    }

    /// Rewrite every `Named` player reference in `bx` against `candidates`.
    ///
    /// Resolved names gain a provider mapping when the provider listed the
    /// athlete under its own id. At-bats, pitches and stat lines that still
    /// reference an unresolved name are dropped. Returns the unresolved names.
    pub fn reconcile(&self, bx: &mut Boxscore, candidates: &[Player]) -> Vec<String> {
        let names: BTreeSet<String> = bx
            .misc
            .at_bats
            .iter()
            .flat_map(|ab| [&ab.batter, &ab.pitcher])
            .chain(bx.misc.pitches.iter().flat_map(|p| [&p.batter, &p.pitcher]))
            .chain(bx.baseball_player_stats.iter().map(|s| &s.player))
            .filter_map(|r| match r {
                PlayerRef::Named(name) => Some(name.clone()),
                PlayerRef::Canonical(_) => None,
            })
            .collect();
        if names.is_empty() {
            return Vec::new();
        }

        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut unresolved = Vec::new();
        for name in names {
            match self.resolve_by_name(&name, candidates) {
                Some(player) => {
                    debug!("Resolved {:?} to {}", name, player.player_id);
                    resolved.insert(name, player.player_id.clone());
                }
                None => {
                    warn!("No canonical player for {:?} in {}; flagged for review", name, bx.game.game_id);
                    unresolved.push(name);
                }
            }
        }

        for athlete in &bx.athletes {
            let Some(canonical) = resolved.get(&athlete.display_name) else {
                continue;
            };
            let mapping = ProviderMapping {
                provider: bx.provider,
                entity_type: EntityType::Player,
                entity_id: canonical.clone(),
                provider_id: athlete.provider_id.clone(),
            };
            if !bx.mappings.contains(&mapping) {
                bx.mappings.push(mapping);
            }
        }

        let swap = |r: &mut PlayerRef| -> bool {
            let id = match r {
                PlayerRef::Canonical(_) => return true,
                PlayerRef::Named(name) => resolved.get(name.as_str()).cloned(),
            };
            match id {
                Some(id) => {
                    *r = PlayerRef::Canonical(id);
                    true
                }
                None => false,
            }
        };
        bx.misc.at_bats.retain_mut(|ab| swap(&mut ab.batter) & swap(&mut ab.pitcher));
        bx.misc.pitches.retain_mut(|p| swap(&mut p.batter) & swap(&mut p.pitcher));
        bx.baseball_player_stats.retain_mut(|s| swap(&mut s.player));
        unresolved
    }
}
