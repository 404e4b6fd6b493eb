use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

use super::diff::PresenceDiff;
use super::protocol::{parse_server_frame, ClientFrame, ServerFrame};
use super::snapshot::PresenceSnapshot;
use crate::error::FeedProtocolError;

/// Connection state of the presence feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FeedState {
    #[default]
    Connecting,
    Subscribed,
    Receiving,
    Disconnected,
}

/// Inputs that move the feed state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// A (re)connection attempt starts.
    Dial,
    /// The socket is open and the subscription frame went out.
    Opened,
    /// A presence snapshot was applied.
    Applied,
    /// The socket closed or failed.
    Closed,
}

impl FeedState {
    /// Transition table. Pairs not listed leave the state unchanged.
    pub fn on(self, event: FeedEvent) -> FeedState {
        use FeedEvent::*;
        use FeedState::*;
        match (self, event) {
            (_, Dial) => Connecting,
            (_, Closed) => Disconnected,
            (Connecting, Opened) => Subscribed,
            (Subscribed | Receiving, Applied) => Receiving,
            (state, _) => state,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedState::Connecting => "connecting",
            FeedState::Subscribed => "subscribed",
            FeedState::Receiving => "live",
            FeedState::Disconnected => "disconnected",
        }
    }
}

/// What readers see: the feed state plus the last good snapshot.
#[derive(Debug, Clone, Default)]
pub struct PresenceView {
    pub feed: FeedState,
    pub snapshot: Option<Arc<PresenceSnapshot>>,
}

pub type PresenceWatch = watch::Receiver<PresenceView>;

/// Result of feeding one inbound frame to the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Applied(PresenceDiff),
    /// The server asked for heartbeats at this interval.
    Hello(Duration),
    Ignored,
}

/// Owns the presence snapshot and the feed state machine.
///
/// Socket-agnostic: a transport calls [`Reconciler::dial`],
/// [`Reconciler::on_open`], [`Reconciler::on_frame`] and
/// [`Reconciler::on_close`]; tests do the same with synthetic frames.
#[derive(Debug)]
pub struct Reconciler {
    subscribe_to: String,
    state: FeedState,
    tx: watch::Sender<PresenceView>,
}

impl Reconciler {
    pub fn new(subscribe_to: impl Into<String>) -> (Self, PresenceWatch) {
        let (tx, rx) = watch::channel(PresenceView::default());
        let reconciler = Self {
            subscribe_to: subscribe_to.into(),
            state: FeedState::Connecting,
            tx,
        };
        (reconciler, rx)
    }

    pub fn subscribe_to(&self) -> &str {
        &self.subscribe_to
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn watch(&self) -> PresenceWatch {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Option<Arc<PresenceSnapshot>> {
        self.tx.borrow().snapshot.clone()
    }

    pub fn dial(&mut self) {
        self.transition(FeedEvent::Dial);
    }

    /// Called once the socket is open. Returns the subscription frame the
    /// first time per connection and `None` afterwards.
    pub fn on_open(&mut self) -> Option<ClientFrame> {
        if self.state != FeedState::Connecting {
            return None;
        }
        self.transition(FeedEvent::Opened);
        Some(ClientFrame::subscribe(self.subscribe_to.clone()))
    }

    /// Applies one inbound text frame. Presence frames replace the snapshot
    /// wholesale; errors leave everything untouched.
    pub fn on_frame(&mut self, text: &str) -> Result<FrameOutcome, FeedProtocolError> {
        match parse_server_frame(text)? {
            ServerFrame::Presence { event, snapshot } => {
                trace!(target: "lookout::feed", ?event, status = ?snapshot.status, "presence frame");
                Ok(FrameOutcome::Applied(self.replace(snapshot)))
            }
            ServerFrame::Hello { heartbeat_interval } => {
                debug!(
                    target: "lookout::feed",
                    interval_ms = heartbeat_interval.as_millis() as u64,
                    "feed requested heartbeats"
                );
                Ok(FrameOutcome::Hello(heartbeat_interval))
            }
            ServerFrame::Ignored { op, t } => {
                trace!(target: "lookout::feed", ?op, ?t, "ignoring frame");
                Ok(FrameOutcome::Ignored)
            }
        }
    }

    /// The connection is gone. The snapshot stays at its last value.
    pub fn on_close(&mut self) {
        self.transition(FeedEvent::Closed);
    }

    fn replace(&mut self, snapshot: PresenceSnapshot) -> PresenceDiff {
        self.state = self.state.on(FeedEvent::Applied);
        let state = self.state;
        let diff = PresenceDiff::between(self.tx.borrow().snapshot.as_deref(), &snapshot);
        self.tx.send_modify(|view| {
            view.snapshot = Some(Arc::new(snapshot));
            view.feed = state;
        });
        diff
    }

    fn transition(&mut self, event: FeedEvent) {
        let next = self.state.on(event);
        if next != self.state {
            debug!(target: "lookout::feed", from = ?self.state, to = ?next, "feed state");
        }
        self.state = next;
        self.tx.send_if_modified(|view| {
            if view.feed == next {
                false
            } else {
                view.feed = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::diff::TrackChange;
    use crate::presence::snapshot::OnlineStatus;

    const WITH_TRACK: &str = r#"{"op":0,"t":"INIT_STATE","d":{"discord_status":"online",
        "spotify":{"song":"Song","artist":"Artist","track_id":"t1",
                   "timestamps":{"start":1000,"end":5000}}}}"#;
    const WITHOUT_TRACK: &str =
        r#"{"op":0,"t":"PRESENCE_UPDATE","d":{"discord_status":"idle","activities":[]}}"#;

    #[test]
    fn transition_table() {
        use FeedEvent::*;
        use FeedState::*;
        assert_eq!(Connecting.on(Opened), Subscribed);
        assert_eq!(Subscribed.on(Applied), Receiving);
        assert_eq!(Receiving.on(Applied), Receiving);
        assert_eq!(Receiving.on(Closed), Disconnected);
        assert_eq!(Connecting.on(Closed), Disconnected);
        assert_eq!(Disconnected.on(Dial), Connecting);
        assert_eq!(Disconnected.on(Applied), Disconnected);
        assert_eq!(Subscribed.on(Opened), Subscribed);
    }

    #[test]
    fn subscribes_once_per_connection() {
        let (mut reconciler, _rx) = Reconciler::new("42");
        let frame = reconciler.on_open().expect("subscription frame");
        assert_eq!(frame, ClientFrame::subscribe("42"));
        assert_eq!(reconciler.state(), FeedState::Subscribed);
        assert!(reconciler.on_open().is_none());

        reconciler.on_close();
        reconciler.dial();
        assert!(reconciler.on_open().is_some());
    }

    #[test]
    fn update_without_track_clears_cached_track() {
        let (mut reconciler, rx) = Reconciler::new("42");
        reconciler.on_open();
        reconciler.on_frame(WITH_TRACK).expect("init state");
        assert!(rx.borrow().snapshot.as_ref().and_then(|s| s.track.as_ref()).is_some());

        let outcome = reconciler.on_frame(WITHOUT_TRACK).expect("update");
        let FrameOutcome::Applied(diff) = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(diff.track, TrackChange::Stopped);

        let view = rx.borrow();
        let snapshot = view.snapshot.as_ref().expect("snapshot");
        assert_eq!(snapshot.status, OnlineStatus::Idle);
        assert!(snapshot.track.is_none());
        assert_eq!(view.feed, FeedState::Receiving);
    }

    #[test]
    fn malformed_frames_leave_snapshot_alone() {
        let (mut reconciler, rx) = Reconciler::new("42");
        reconciler.on_open();
        reconciler.on_frame(WITH_TRACK).expect("init state");
        let before = reconciler.snapshot();

        assert!(reconciler.on_frame("{").is_err());
        assert!(reconciler
            .on_frame(r#"{"t":"PRESENCE_UPDATE","d":{"discord_status":5}}"#)
            .is_err());
        assert_eq!(
            reconciler.on_frame(r#"{"op":0,"t":"UNKNOWN","d":null}"#).expect("ignored"),
            FrameOutcome::Ignored
        );
        assert_eq!(reconciler.snapshot(), before);
        assert_eq!(rx.borrow().feed, FeedState::Receiving);
    }

    #[test]
    fn disconnect_keeps_last_snapshot() {
        let (mut reconciler, rx) = Reconciler::new("42");
        reconciler.on_open();
        reconciler.on_frame(WITH_TRACK).expect("init state");
        reconciler.on_close();

        let view = rx.borrow();
        assert_eq!(view.feed, FeedState::Disconnected);
        let snapshot = view.snapshot.as_ref().expect("stale snapshot kept");
        assert_eq!(snapshot.status, OnlineStatus::Online);
        assert!(snapshot.track.is_some());
    }

    #[test]
    fn hello_reports_heartbeat_interval() {
        let (mut reconciler, _rx) = Reconciler::new("42");
        let outcome = reconciler
            .on_frame(r#"{"op":1,"d":{"heartbeat_interval":30000}}"#)
            .expect("hello");
        assert_eq!(outcome, FrameOutcome::Hello(Duration::from_secs(30)));
    }
}
