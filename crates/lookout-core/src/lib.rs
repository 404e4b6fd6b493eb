//! Core primitives of the `lookout` shell.
//!
//! Everything here is independent of the terminal and of the network: the
//! command registry and dispatcher only talk to the outside world through
//! [`SessionHost`], and the presence reconciler is a state machine fed with
//! synthetic or real frames by whichever transport owns the socket.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod output;
pub mod presence;
pub mod progress;
pub mod registry;
pub mod timedelta;

pub use context::{
    Clock, CommandContext, CommandSummary, DataState, ExternalData, Repository, SystemClock,
    CONTEXT_VERSION,
};
pub use dispatch::{
    failure_message, not_found_message, Dispatcher, DispatcherBuilder, Outcome, PendingCommand,
    Submission,
};
pub use error::{CommandError, FeedProtocolError, RegistryError};
pub use history::{Direction, HistoryNavigator};
pub use output::{Line, Output, SessionHost, Theme, TranscriptEntry};
pub use presence::{
    Activity, ActivityKind, ClientFrame, FeedEvent, FeedState, FrameOutcome, OnlineStatus,
    PresenceDiff, PresenceSnapshot, PresenceView, PresenceWatch, Reconciler, StatusChange, Track,
    TrackChange,
};
pub use progress::{format_position, progress};
pub use registry::{
    handler_fn, CommandHandler, CommandRegistry, RegisteredCommand, RegistryBuilder, Resolution,
};
pub use timedelta::ZoneDelta;

/// Lowercases a command token the same way everywhere it is compared.
pub fn fold_token(token: &str) -> String {
    token.to_lowercase()
}
