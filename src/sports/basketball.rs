/// Half-court length in feet; sideline offsets scale to it.
pub const HALF_COURT_LENGTH: f64 = 47.0;
/// Half of the court width in feet; baseline offsets scale to it.
pub const HALF_COURT_WIDTH: f64 = 25.0;

const CLUTCH_MINUTES: u32 = 5;
const CLUTCH_MARGIN: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn parse(s: &str) -> Option<Side> {
        match s.trim() {
            "L" | "l" | "left" => Some(Side::Left),
            "R" | "r" | "right" => Some(Side::Right),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }
}

/// Court position of a shot relative to the basket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotLocation {
    pub side: Side,
    /// Sideline offset in `[0, 1]`
    pub side_pct: f64,
    /// Baseline offset in `[0, 1]`
    pub base_pct: f64,
}

impl ShotLocation {
    /// Validated location; offsets outside `[0, 1]` are rejected.
    pub fn new(side: Side, side_pct: f64, base_pct: f64) -> Option<Self> {
        let unit = 0.0..=1.0;
        (unit.contains(&side_pct) && unit.contains(&base_pct)).then_some(ShotLocation {
            side,
            side_pct,
            base_pct,
        })
    }

    /// Euclidean distance from the basket in feet.
    pub fn distance(&self) -> f64 {
        let x = self.side_pct * HALF_COURT_LENGTH;
        let sign = match self.side {
            Side::Right => -1.0,
            Side::Left => 1.0,
        };
        let y = self.base_pct * sign * HALF_COURT_WIDTH;
        x.hypot(y)
    }

    pub fn zone(&self) -> String {
        classify_zone(self.distance(), self.side, self.side_pct, self.base_pct)
    }
}

/// Zone label for a shot at `distance` feet.
pub fn classify_zone(distance: f64, side: Side, side_pct: f64, base_pct: f64) -> String {
    let side = side.label();
    if distance < 4.0 {
        return "At the Rim".to_string();
    }
    if distance < 12.0 {
        let loc = if side_pct <= 0.3 { "Center" } else { "Side" };
        return format!("{} {} Paint", side, loc);
    }
    if distance < 15.0 {
        let loc = if side_pct <= 0.2 { "Line" } else { "Extended" };
        return format!("{} {} Free Throw", side, loc);
    }
    if distance < 22.0 {
        let loc = if side_pct <= 0.2 {
            "Top"
        } else if side_pct <= 0.5 {
            "Elbow"
        } else {
            "Wing"
        };
        return format!("{} {} Mid-Range", side, loc);
    }
    let loc = if distance >= 30.0 {
        "Logo"
    } else if side_pct <= 0.2 {
        "Top of the Key"
    } else if side_pct <= 0.4 && base_pct < 0.5 {
        "Corner"
    } else if side_pct <= 0.6 {
        "Wing"
    } else {
        "Deep"
    };
    format!("{} {} Three", side, loc)
}

/// Minutes left on a `m:ss` game clock; an unreadable clock counts as 0.
pub fn clock_minutes(clock: &str) -> u32 {
    clock
        .split(':')
        .next()
        .and_then(|m| m.trim().parse().ok())
        .unwrap_or(0)
}

/// Late, close shot: final regulation period or overtime, under five
/// minutes on the clock, margin of five or fewer.
pub fn is_clutch(period: u32, regulation_periods: u32, clock: &str, home: i32, away: i32) -> bool {
    period >= regulation_periods
        && clock_minutes(clock) < CLUTCH_MINUTES
        && (home - away).abs() <= CLUTCH_MARGIN
}

/// `m:ss` played to decimal minutes.
pub fn parse_minutes(s: &str) -> Option<f64> {
    let mut parts = s.trim().splitn(2, ':');
    let mins: f64 = parts.next()?.trim().parse().ok()?;
    let secs: f64 = match parts.next() {
        Some(secs) => secs.trim().parse().ok()?,
        None => 0.0,
    };
    Some(mins + secs / 60.0)
}

/// `made-attempted` split as `(made, attempted)`.
pub fn parse_made_attempted(s: &str) -> Option<(i32, i32)> {
    let (made, attempted) = s.trim().split_once('-')?;
    Some((made.trim().parse().ok()?, attempted.trim().parse().ok()?))
}

/// Shot close enough to the basket to count as a paint attempt.
pub fn in_paint(side_pct: f64, base_pct: f64) -> bool {
    side_pct <= 0.15 && base_pct <= 0.4
}
