use chrono::NaiveDateTime;
use std::fmt;

/// Signed wall-clock difference between a reference zone and the local zone.
///
/// Positive values mean the reference zone is later than the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneDelta {
    minutes: i64,
}

impl ZoneDelta {
    /// Computes `reference - local`, truncated to whole minutes.
    ///
    /// Both instants must already be resolved to wall-clock time in their
    /// respective zones.
    pub fn between(local: NaiveDateTime, reference: NaiveDateTime) -> Self {
        let seconds = (reference - local).num_seconds();
        Self {
            minutes: seconds / 60,
        }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self { minutes }
    }

    pub fn minutes(self) -> i64 {
        self.minutes
    }

    pub fn is_same_clock(self) -> bool {
        self.minutes == 0
    }

    /// `same clock`, or `H hour(s) [and M minute(s)] ahead|behind`.
    pub fn describe(self) -> String {
        if self.is_same_clock() {
            return "same clock".to_owned();
        }
        let magnitude = self.minutes.unsigned_abs();
        let hours = magnitude / 60;
        let minutes = magnitude % 60;
        let direction = if self.minutes > 0 { "ahead" } else { "behind" };

        let mut parts = Vec::with_capacity(2);
        if hours > 0 {
            parts.push(plural(hours, "hour"));
        }
        if minutes > 0 {
            parts.push(plural(minutes, "minute"));
        }
        format!("{} {direction}", parts.join(" and "))
    }
}

impl fmt::Display for ZoneDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
