//! Presence of the tracked user, kept in sync with a push feed.

pub mod diff;
pub mod protocol;
pub mod reconciler;
pub mod snapshot;

pub use diff::{PresenceDiff, StatusChange, TrackChange};
pub use protocol::{parse_server_frame, ClientFrame, PresenceEvent, ServerFrame};
pub use reconciler::{FeedEvent, FeedState, FrameOutcome, PresenceView, PresenceWatch, Reconciler};
pub use snapshot::{Activity, ActivityKind, OnlineStatus, PresenceSnapshot, Track};
