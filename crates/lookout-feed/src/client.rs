use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use lookout_core::{ClientFrame, FrameOutcome, PresenceWatch, Reconciler};

use crate::backoff::{Backoff, BackoffPolicy};
use crate::error::FeedError;

/// Heartbeat period used until the server announces its own.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(30);

const TARGET: &str = "lookout::feed";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: Url,
    pub subscribe_to: String,
    pub backoff: BackoffPolicy,
    pub heartbeat: Duration,
}

impl FeedConfig {
    pub fn new(url: Url, subscribe_to: impl Into<String>) -> Self {
        Self {
            url,
            subscribe_to: subscribe_to.into(),
            backoff: BackoffPolicy::default(),
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }
}

/// A presence feed that has not been started yet.
pub struct FeedClient {
    config: FeedConfig,
    reconciler: Reconciler,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Self {
        let (reconciler, _) = Reconciler::new(config.subscribe_to.clone());
        Self { config, reconciler }
    }

    /// Receiver of presence updates. May be called before or after spawning.
    pub fn watch(&self) -> PresenceWatch {
        self.reconciler.watch()
    }

    /// Starts the connection loop on the current runtime.
    pub fn spawn(self) -> FeedHandle {
        let presence = self.reconciler.watch();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(self.config, self.reconciler, shutdown_rx));
        FeedHandle {
            presence,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Keeps the feed task alive. Dropping it aborts the task; [`FeedHandle::close`]
/// closes the socket cleanly first.
pub struct FeedHandle {
    presence: PresenceWatch,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub fn watch(&self) -> PresenceWatch {
        self.presence.clone()
    }

    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

enum SessionEnd {
    Shutdown,
    Lost,
}

async fn run(config: FeedConfig, mut reconciler: Reconciler, mut shutdown: oneshot::Receiver<()>) {
    let mut backoff = Backoff::new(config.backoff);
    loop {
        reconciler.dial();
        info!(target: TARGET, url = %config.url, "connecting to presence feed");

        match connection(&config, &mut reconciler, &mut backoff, &mut shutdown).await {
            Ok(SessionEnd::Shutdown) => {
                reconciler.on_close();
                debug!(target: TARGET, "presence feed shut down");
                return;
            }
            Ok(SessionEnd::Lost) => {
                info!(target: TARGET, "presence feed closed by server");
            }
            Err(err) => {
                warn!(target: TARGET, error = %err, "presence feed connection failed");
            }
        }
        reconciler.on_close();

        let delay = backoff.next_delay();
        debug!(target: TARGET, delay_ms = delay.as_millis() as u64, "reconnecting after delay");
        tokio::select! {
            _ = &mut shutdown => return,
            _ = sleep(delay) => {}
        }
    }
}

fn heartbeat_timer(every: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + every, every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn connection(
    config: &FeedConfig,
    reconciler: &mut Reconciler,
    backoff: &mut Backoff,
    shutdown: &mut oneshot::Receiver<()>,
) -> Result<SessionEnd, FeedError> {
    let (ws_stream, _) = tokio::select! {
        _ = &mut *shutdown => return Ok(SessionEnd::Shutdown),
        connected = connect_async(config.url.as_str()) => connected?,
    };
    let (mut sink, mut stream) = ws_stream.split();

    if let Some(frame) = reconciler.on_open() {
        sink.send(Message::Text(frame.to_json()?)).await?;
        debug!(target: TARGET, subscribe_to = reconciler.subscribe_to(), "subscribed");
    }

    let mut heartbeat = heartbeat_timer(config.heartbeat);
    loop {
        tokio::select! {
            _ = &mut *shutdown => {
                let _ = sink.send(Message::Close(None)).await;
                return Ok(SessionEnd::Shutdown);
            }
            _ = heartbeat.tick() => {
                sink.send(Message::Text(ClientFrame::heartbeat().to_json()?)).await?;
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => match reconciler.on_frame(&text) {
                    Ok(FrameOutcome::Applied(diff)) => {
                        backoff.reset();
                        if !diff.is_empty() {
                            debug!(target: TARGET, ?diff, "presence changed");
                        }
                    }
                    Ok(FrameOutcome::Hello(every)) if !every.is_zero() => {
                        heartbeat = heartbeat_timer(every);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(target: TARGET, error = %err, "dropping malformed feed frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Lost),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
            }
        }
    }
}
