use super::snapshot::{OnlineStatus, PresenceSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackChange {
    Unchanged,
    Started,
    Changed,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: Option<OnlineStatus>,
    pub to: OnlineStatus,
}

/// What changed between two consecutive snapshots. Pure: computed from the
/// two values only, so the reconciler never has to remember anything beyond
/// its current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceDiff {
    pub status: Option<StatusChange>,
    pub track: TrackChange,
}

impl PresenceDiff {
    pub fn between(previous: Option<&PresenceSnapshot>, next: &PresenceSnapshot) -> Self {
        let previous_status = previous.map(|snapshot| snapshot.status);
        let status = (previous_status != Some(next.status)).then_some(StatusChange {
            from: previous_status,
            to: next.status,
        });

        let previous_track = previous.and_then(|snapshot| snapshot.track.as_ref());
        let track = match (previous_track, next.track.as_ref()) {
            (None, None) => TrackChange::Unchanged,
            (None, Some(_)) => TrackChange::Started,
            (Some(_), None) => TrackChange::Stopped,
            (Some(before), Some(after)) if before.same_song(after) => TrackChange::Unchanged,
            (Some(_), Some(_)) => TrackChange::Changed,
        };

        Self { status, track }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.track == TrackChange::Unchanged
    }
}
