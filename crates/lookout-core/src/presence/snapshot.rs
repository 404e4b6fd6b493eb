use serde::{Deserialize, Serialize};

use crate::progress::progress;

const TRACK_LINK_BASE: &str = "https://open.spotify.com/track/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Idle,
    Dnd,
    Offline,
}

impl OnlineStatus {
    pub fn label(self) -> &'static str {
        match self {
            OnlineStatus::Online => "Online",
            OnlineStatus::Idle => "Idle",
            OnlineStatus::Dnd => "Do Not Disturb",
            OnlineStatus::Offline => "Offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ActivityKind {
    Playing,
    Other(u8),
}

impl From<u8> for ActivityKind {
    fn from(value: u8) -> Self {
        match value {
            0 => ActivityKind::Playing,
            other => ActivityKind::Other(other),
        }
    }
}

impl From<ActivityKind> for u8 {
    fn from(kind: ActivityKind) -> Self {
        match kind {
            ActivityKind::Playing => 0,
            ActivityKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub kind: ActivityKind,
    /// Milliseconds since the epoch.
    pub started_at: Option<i64>,
}

/// The track currently playing, with its playback window in epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub external_id: Option<String>,
    pub album_art_url: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Track {
    /// `title - artist`, as shown in the status bar and by `music`.
    pub fn display(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }

    pub fn link(&self) -> Option<String> {
        self.external_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{TRACK_LINK_BASE}{id}"))
    }

    pub fn progress(&self, now_ms: i64) -> Option<f64> {
        progress(self.start?, self.end?, now_ms)
    }

    pub fn duration_ms(&self) -> Option<i64> {
        let (start, end) = (self.start?, self.end?);
        end.checked_sub(start).filter(|total| *total > 0)
    }

    /// Identity used to tell a new song from a timestamp refresh.
    pub(crate) fn same_song(&self, other: &Track) -> bool {
        match (&self.external_id, &other.external_id) {
            (Some(a), Some(b)) => a == b,
            _ => self.title == other.title && self.artist == other.artist,
        }
    }
}

/// Everything known about the tracked user at one point in time.
///
/// Replaced as a whole on every feed update; never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    pub status: OnlineStatus,
    pub activities: Vec<Activity>,
    pub track: Option<Track>,
}

impl PresenceSnapshot {
    /// First activity of kind "playing", if any.
    pub fn playing(&self) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|activity| activity.kind == ActivityKind::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(start: Option<i64>, end: Option<i64>) -> Track {
        Track {
            title: "Song".into(),
            artist: "Artist".into(),
            album: None,
            external_id: Some("abc123".into()),
            album_art_url: None,
            start,
            end,
        }
    }

    #[test]
    fn link_uses_external_id() {
        assert_eq!(
            track(None, None).link().as_deref(),
            Some("https://open.spotify.com/track/abc123")
        );
        let mut no_id = track(None, None);
        no_id.external_id = Some(String::new());
        assert_eq!(no_id.link(), None);
    }

    #[test]
    fn progress_needs_both_timestamps() {
        assert_eq!(track(Some(0), None).progress(10), None);
        assert_eq!(track(None, Some(100)).progress(10), None);
        assert_eq!(track(Some(0), Some(100)).progress(25), Some(25.0));
        assert_eq!(track(Some(0), Some(100)).duration_ms(), Some(100));
    }

    #[test]
    fn duration_of_unrepresentable_window_is_unknown() {
        assert_eq!(track(Some(i64::MIN), Some(0)).duration_ms(), None);
        assert_eq!(track(Some(-1), Some(i64::MAX)).duration_ms(), None);
        assert_eq!(track(Some(5), Some(5)).duration_ms(), None);
        assert!(track(Some(-1), Some(i64::MAX)).progress(0).is_some());
    }

    #[test]
    fn activity_kind_round_trips_through_u8() {
        assert_eq!(ActivityKind::from(0), ActivityKind::Playing);
        assert_eq!(ActivityKind::from(2), ActivityKind::Other(2));
        assert_eq!(u8::from(ActivityKind::Other(4)), 4);
    }
}
