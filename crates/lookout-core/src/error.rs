use thiserror::Error;

/// Errors raised while assembling a [`crate::CommandRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),
    #[error("alias '{0}' is already registered")]
    DuplicateAlias(String),
    #[error("name '{0}' is used both as a command and as an alias")]
    AliasCollision(String),
    #[error("alias '{alias}' points at '{target}', which is not a registered command")]
    UnknownAliasTarget { alias: String, target: String },
    #[error("command names must be a single non-empty word, got '{0}'")]
    InvalidName(String),
}

/// Failure reported by a command handler.
///
/// These never reach the user verbatim: the dispatcher logs them and renders a
/// generic failure line instead.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0} is not available right now")]
    Unavailable(String),
    #[error("upstream source failed: {0}")]
    Source(String),
}

/// A push-feed frame that could not be understood.
#[derive(Debug, Error)]
pub enum FeedProtocolError {
    #[error("frame is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame '{0}' carries no payload")]
    MissingPayload(&'static str),
    #[error("presence payload rejected: {0}")]
    Payload(String),
}
