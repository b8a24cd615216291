use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::db::models::AtBatType;

// ── Result text classification ───────────────────────────────────────────────

/// Phrases in result text that mark informational plays; they never
/// produce an at-bat.
const SKIP_PHRASES: &[&str] = &[
    "unknown into double play",
    "on initial placement",
    "was skipped",
    "batted out of order",
    "out on batter's interference",
    "reached on catcher's interference",
    "bunt",
    "wild pitch",
    "sacrifice fly",
    "sacrificed",
];

/// Ordered phrase table; the first pattern found in the text wins.
static RESULT_TOKENS: LazyLock<Vec<(Regex, AtBatType)>> = LazyLock::new(|| {
    let table: &[(&str, AtBatType)] = &[
        ("struck out", AtBatType::Strikeout),
        ("strikes out", AtBatType::Strikeout),
        ("called out on strikes", AtBatType::Strikeout),
        ("fouled out", AtBatType::Foulout),
        ("fouls out", AtBatType::Foulout),
        ("flied out", AtBatType::Flyout),
        ("flies out", AtBatType::Flyout),
        ("flied into double play", AtBatType::Flyout),
        ("flied into triple play", AtBatType::Flyout),
        ("grounded out", AtBatType::Groundout),
        ("grounds out", AtBatType::Groundout),
        ("grounded into double play", AtBatType::Groundout),
        ("grounded into triple play", AtBatType::Groundout),
        ("hit into fielder's choice", AtBatType::Groundout),
        ("reached on fielder's choice", AtBatType::Groundout),
        ("reaches on a fielder's choice", AtBatType::Groundout),
        (r"reached on \[\w+\.\w+\.\d+\]'s \w+ error", AtBatType::Groundout),
        ("reaches on error", AtBatType::Groundout),
        ("popped out", AtBatType::Popout),
        ("pops out", AtBatType::Popout),
        ("popped into double play", AtBatType::Popout),
        ("lined out", AtBatType::Lineout),
        ("lines out", AtBatType::Lineout),
        ("lined into triple play", AtBatType::Lineout),
        ("lined into double play", AtBatType::Lineout),
        ("hit by pitch", AtBatType::HitByPitch),
        ("walked", AtBatType::Walk),
        ("walks", AtBatType::Walk),
        ("reached on an infield single", AtBatType::Single),
        ("singled", AtBatType::Single),
        ("singles", AtBatType::Single),
        ("doubled", AtBatType::Double),
        ("doubles", AtBatType::Double),
        ("ground rule double", AtBatType::Double),
        ("tripled", AtBatType::Triple),
        ("triples", AtBatType::Triple),
        ("homered", AtBatType::HomeRun),
        ("homers", AtBatType::HomeRun),
        ("hit an inside the park home run", AtBatType::HomeRun),
    ];
    table
        .iter()
        .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), *kind))
        .collect()
});

/// Classify the free-text result of a plate appearance.
pub fn classify_result(text: &str) -> Option<AtBatType> {
    let lowered = text.to_lowercase();
    if SKIP_PHRASES.iter().any(|p| lowered.contains(p)) {
        return None;
    }
    RESULT_TOKENS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, kind)| *kind)
}

// ── Ball/strike count ────────────────────────────────────────────────────────

/// Pitch classification as far as the count is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchCall {
    Ball,
    Strike,
    Foul,
    Other,
}

impl PitchCall {
    pub fn from_result(result: &str) -> PitchCall {
        match result.trim().to_lowercase().as_str() {
            "ball" => PitchCall::Ball,
            "strike" => PitchCall::Strike,
            "foul" | "foul ball" => PitchCall::Foul,
            _ => PitchCall::Other,
        }
    }
}

/// Running count inside one at-bat. Balls stop at 3 and strikes at 2; the
/// pitch that would go past either ends the at-bat instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

impl Count {
    /// Terminal outcome this pitch produces at the current count, if any.
    pub fn terminal(&self, call: PitchCall) -> Option<&'static str> {
        match call {
            PitchCall::Ball if self.balls == 3 => Some("walk"),
            PitchCall::Strike if self.strikes == 2 => Some("strike out"),
            _ => None,
        }
    }

    pub fn record(&mut self, call: PitchCall) {
        match call {
            PitchCall::Ball if self.balls < 3 => self.balls += 1,
            PitchCall::Strike | PitchCall::Foul if self.strikes < 2 => self.strikes += 1,
            _ => {}
        }
    }
}

// ── Play numbers & strike zone ───────────────────────────────────────────────

const PLAY_STRIDE: f64 = 10_000.0;

/// Positional play number of a provider event id, relative to the game id
/// the provider prefixes its event ids with.
pub fn play_number(event_id: &str, game_id: &str) -> Option<i64> {
    let local = event_id.strip_prefix(game_id).unwrap_or(event_id);
    let n: i64 = local.parse().ok()?;
    let rounded = (n + 50) / 100 * 100;
    Some((rounded as f64 / PLAY_STRIDE - 1.0).trunc() as i64)
}

/// Cell of a 20x20 grid laid over the pitch-tracking coordinate space.
pub fn zone_bin(x: f64, y: f64) -> u32 {
    let col = (((x.trunc() - 18.4) / 9.64).trunc() as i64).clamp(0, 19);
    let row = (((y.trunc() - 97.7) / 7.90).trunc() as i64).clamp(0, 19);
    (col + row * 20) as u32
}

// ── At-bat reconstruction ────────────────────────────────────────────────────

/// Event code that opens a plate appearance ("X pitches to Y").
pub const NEW_AT_BAT: i64 = 1;

static PITCHES_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<pitcher>.*) pitches to (?P<batter>.*)").unwrap());

/// One entry of a provider's flat play log.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub id: String,
    pub type_id: i64,
    pub text: String,
    /// Provider-local id of the batting team
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPitch {
    pub id: String,
    pub result: String,
    pub description: String,
    pub pitch_type: Option<String>,
    pub velocity: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub hit_x: Option<f64>,
    pub hit_y: Option<f64>,
    pub sequence: Option<i32>,
}

/// Pitches the provider grouped under one at-bat, in thrown order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAtBat {
    pub pitches: Vec<RawPitch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedPitch {
    pub play_num: Option<i64>,
    pub pitch_count: u32,
    pub sequence: Option<i32>,
    /// Count before the pitch
    pub balls: u8,
    pub strikes: u8,
    pub velocity: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub zone: Option<u32>,
    pub hit_x: Option<f64>,
    pub hit_y: Option<f64>,
    pub pitch_type: Option<String>,
    pub pitch_result: String,
    pub ab_result: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedAtBat {
    pub pitcher: String,
    pub batter: String,
    /// Provider-local id of the batting team
    pub team: Option<String>,
    pub play_num: Option<i64>,
    /// Event code of the play that closed the at-bat
    pub closing_type_id: Option<i64>,
    pub closing_text: String,
    pub hit_x: Option<f64>,
    pub hit_y: Option<f64>,
    pub pitches: Vec<ReconstructedPitch>,
}

/// Numeric ids of equal width sort lexically; shorter ids sort first.
fn sorted_ids(events: &HashMap<String, PlayEvent>) -> Vec<&str> {
    let mut ids: Vec<&str> = events.keys().map(String::as_str).collect();
    ids.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    ids
}

/// Rebuild ordered at-bats with per-pitch counts from an unordered play log
/// and pitch groups.
///
/// Each group is anchored on the nearest "new at-bat" event preceding its
/// first pitch; the anchor's text names the pitcher and batter. Groups
/// without an anchor or with unparseable anchor text are skipped.
pub fn reconstruct(
    events: &HashMap<String, PlayEvent>,
    at_bats: &[RawAtBat],
    game_id: &str,
) -> Vec<ReconstructedAtBat> {
    let order = sorted_ids(events);
    let position: HashMap<&str, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut pitch_counts: HashMap<String, u32> = HashMap::new();
    let mut out = Vec::new();

    for raw in at_bats {
        let (Some(first), Some(last)) = (raw.pitches.first(), raw.pitches.last()) else {
            continue;
        };
        let Some(&first_pos) = position.get(first.id.as_str()) else {
            debug!("Pitch {} missing from play log", first.id);
            continue;
        };

        let mut anchor = None;
        let mut idx = first_pos;
        while idx > 0 {
            idx -= 1;
            let candidate = &events[order[idx]];
            if candidate.type_id == NEW_AT_BAT {
                anchor = Some(candidate);
                break;
            }
        }
        let Some(anchor) = anchor else {
            warn!("No at-bat boundary before pitch {}", first.id);
            continue;
        };
        let Some(caps) = PITCHES_TO.captures(&anchor.text) else {
            warn!("Unrecognised at-bat text {:?}", anchor.text);
            continue;
        };
        let pitcher = caps["pitcher"].trim().to_string();
        let batter = caps["batter"].trim().trim_end_matches('.').to_string();

        let closing = events.get(&last.id);
        let mut count = Count::default();
        let mut pitches = Vec::with_capacity(raw.pitches.len());
        for pitch in &raw.pitches {
            let call = PitchCall::from_result(&pitch.result);
            let pitch_result = match call {
                PitchCall::Strike => pitch.description.to_lowercase(),
                PitchCall::Foul => "foul ball".to_string(),
                _ => pitch.result.to_lowercase(),
            };
            let description = pitch.description.to_lowercase();
            let ab_result = if let Some(terminal) = count.terminal(call) {
                terminal.to_string()
            } else if description.contains("batter reached on error") {
                "reached on error".to_string()
            } else if description.contains("hit by pitch") {
                "hit by pitch".to_string()
            } else {
                description
            };

            let pc = pitch_counts.entry(pitcher.clone()).or_insert(0);
            *pc += 1;

            let zone = match (pitch.x, pitch.y) {
                (Some(x), Some(y)) => Some(zone_bin(x, y)),
                _ => None,
            };
            pitches.push(ReconstructedPitch {
                play_num: play_number(&pitch.id, game_id),
                pitch_count: *pc,
                sequence: pitch.sequence,
                balls: count.balls,
                strikes: count.strikes,
                velocity: pitch.velocity,
                x: pitch.x,
                y: pitch.y,
                zone,
                hit_x: pitch.hit_x,
                hit_y: pitch.hit_y,
                pitch_type: pitch.pitch_type.as_ref().map(|t| t.to_lowercase()),
                ab_result: (ab_result != pitch_result).then_some(ab_result),
                pitch_result,
            });
            count.record(call);
        }

        out.push(ReconstructedAtBat {
            pitcher,
            batter,
            team: anchor.team.clone().or_else(|| closing.and_then(|c| c.team.clone())),
            play_num: play_number(&first.id, game_id),
            closing_type_id: closing.map(|c| c.type_id),
            closing_text: closing.map(|c| c.text.clone()).unwrap_or_default(),
            hit_x: last.hit_x,
            hit_y: last.hit_y,
            pitches,
        });
    }
    out
}

/// Outcome of a reconstructed at-bat: the closing play's text first, then
/// the terminal pitch.
pub fn at_bat_outcome(ab: &ReconstructedAtBat) -> Option<AtBatType> {
    if let Some(kind) = classify_result(&ab.closing_text) {
        return Some(kind);
    }
    match ab.pitches.last().and_then(|p| p.ab_result.as_deref()) {
        Some("walk") => Some(AtBatType::Walk),
        Some("strike out") => Some(AtBatType::Strikeout),
        Some("hit by pitch") => Some(AtBatType::HitByPitch),
        Some("reached on error") => Some(AtBatType::Groundout),
        _ => None,
    }
}
