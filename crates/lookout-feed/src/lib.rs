//! Socket side of the presence feed.
//!
//! [`FeedClient`] owns one [`lookout_core::Reconciler`] and drives it from a
//! background task: dial, subscribe, heartbeat, and reconnect with backoff
//! when the connection drops. The returned [`FeedHandle`] scopes the task to
//! the session.

mod backoff;
mod client;
mod error;

pub use backoff::{Backoff, BackoffPolicy};
pub use client::{FeedClient, FeedConfig, FeedHandle, DEFAULT_HEARTBEAT};
pub use error::FeedError;
