/// Reporting periods and query-window parsing

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Longest window accepted by `days` parameters
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Largest page accepted by `limit` parameters
pub const MAX_RECENT_LIMIT: i64 = 100;

/// Dashboard reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    /// Parses a period, falling back to weekly for anything unrecognized
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some("monthly") => Period::Monthly,
            Some("yearly") => Period::Yearly,
            _ => Period::Weekly,
        }
    }

    /// Length of one window in days
    pub fn days(&self) -> i64 {
        match self {
            Period::Weekly => 7,
            Period::Monthly => 30,
            Period::Yearly => 365,
        }
    }

    /// Capitalized label ("Weekly")
    pub fn label(&self) -> &'static str {
        match self {
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Yearly => "Yearly",
        }
    }

    /// Noun used in comparison text ("week")
    pub fn noun(&self) -> &'static str {
        match self {
            Period::Weekly => "week",
            Period::Monthly => "month",
            Period::Yearly => "year",
        }
    }

    /// Current window `[now - N days, now]`
    pub fn current_window(&self, now: DateTime<Utc>) -> Window {
        Window {
            start: now - Duration::days(self.days()),
            end: now,
        }
    }

    /// Previous window `[now - 2N days, now - N days)`
    pub fn previous_window(&self, now: DateTime<Utc>) -> Window {
        let current = self.current_window(now);
        Window {
            start: current.start - Duration::days(self.days()),
            end: current.start,
        }
    }
}

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Parses a `days` query parameter
///
/// Missing or unparseable input yields `default`; the result is clamped to
/// `1..=MAX_WINDOW_DAYS`.
pub fn parse_days(raw: Option<&str>, default: i64) -> i64 {
    parse_clamped(raw, default, MAX_WINDOW_DAYS)
}

/// Parses a `limit` query parameter, clamped to `1..=MAX_RECENT_LIMIT`
pub fn parse_limit(raw: Option<&str>, default: i64) -> i64 {
    parse_clamped(raw, default, MAX_RECENT_LIMIT)
}

fn parse_clamped(raw: Option<&str>, default: i64, max: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .clamp(1, max)
}
