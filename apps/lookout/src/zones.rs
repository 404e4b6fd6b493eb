use chrono::{DateTime, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use lookout_core::ZoneDelta;

/// Where the shell user's clock is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    System,
    Fixed(Tz),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneConfig {
    /// The profile owner's zone.
    pub reference: Tz,
    pub local: LocalZone,
}

impl ZoneConfig {
    pub fn local_wall(&self, now: DateTime<Utc>) -> NaiveDateTime {
        match self.local {
            LocalZone::System => now.with_timezone(&Local).naive_local(),
            LocalZone::Fixed(tz) => now.with_timezone(&tz).naive_local(),
        }
    }

    pub fn reference_wall(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.reference).naive_local()
    }

    pub fn delta(&self, now: DateTime<Utc>) -> ZoneDelta {
        ZoneDelta::between(self.local_wall(now), self.reference_wall(now))
    }

    /// Last path segment of the reference zone, e.g. `London`.
    pub fn reference_place(&self) -> String {
        let name = self.reference.name();
        name.rsplit('/').next().unwrap_or(name).replace('_', " ")
    }
}

pub fn format_wall(time: NaiveDateTime) -> String {
    time.format("%d/%m/%Y, %H:%M:%S").to_string()
}
