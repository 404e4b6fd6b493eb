use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::output::{SessionHost, Theme};
use crate::presence::{FeedState, PresenceSnapshot, PresenceView};

/// Version of the field set exposed by [`CommandContext`]. Bumped whenever a
/// field is added or its meaning changes.
pub const CONTEXT_VERSION: u32 = 1;

/// Source of "now" for the dispatcher.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lifecycle of a piece of externally fetched, read-only data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum DataState<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> DataState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            DataState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// A source repository as shown by the `projects` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u64,
    pub forks: u64,
}

/// Data supplied by the host and refreshed independently of commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalData {
    pub repositories: DataState<Vec<Repository>>,
}

/// Name and description of a canonical command, with its aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
}

/// Read-only view handed to a command handler.
///
/// The field set is closed: handlers can only depend on what is listed here
/// (see [`CONTEXT_VERSION`]). Side effects that belong to the host go through
/// the hook methods.
pub struct CommandContext {
    invoked_as: String,
    command: String,
    now: DateTime<Utc>,
    presence: PresenceView,
    external: Arc<ExternalData>,
    commands: Arc<[CommandSummary]>,
    host: Arc<dyn SessionHost>,
}

pub(crate) struct ContextParts {
    pub invoked_as: String,
    pub command: String,
    pub now: DateTime<Utc>,
    pub presence: PresenceView,
    pub external: Arc<ExternalData>,
    pub commands: Arc<[CommandSummary]>,
    pub host: Arc<dyn SessionHost>,
}

impl CommandContext {
    pub(crate) fn new(parts: ContextParts) -> Self {
        Self {
            invoked_as: parts.invoked_as,
            command: parts.command,
            now: parts.now,
            presence: parts.presence,
            external: parts.external,
            commands: parts.commands,
            host: parts.host,
        }
    }

    pub fn version(&self) -> u32 {
        CONTEXT_VERSION
    }

    /// The token as the user typed it, case-folded (may be an alias).
    pub fn invoked_as(&self) -> &str {
        &self.invoked_as
    }

    /// Canonical name of the command being run.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Latest presence snapshot, `None` until the feed delivered one.
    pub fn presence(&self) -> Option<&PresenceSnapshot> {
        self.presence.snapshot.as_deref()
    }

    pub fn feed_state(&self) -> FeedState {
        self.presence.feed
    }

    /// Playback progress of the current track at [`Self::now`].
    pub fn progress(&self) -> Option<f64> {
        self.presence()
            .and_then(|snapshot| snapshot.track.as_ref())
            .and_then(|track| track.progress(self.now.timestamp_millis()))
    }

    pub fn repositories(&self) -> &DataState<Vec<Repository>> {
        &self.external.repositories
    }

    /// Canonical commands in registration order.
    pub fn commands(&self) -> &[CommandSummary] {
        &self.commands
    }

    pub fn clear_transcript(&self) {
        self.host.clear_transcript();
    }

    pub fn set_theme(&self, theme: Theme) {
        self.host.set_theme(theme);
    }

    pub fn theme(&self) -> Theme {
        self.host.theme()
    }

    pub fn toggle_ascii(&self) -> bool {
        self.host.toggle_ascii()
    }
}
