use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::context::{
    Clock, CommandContext, CommandSummary, ContextParts, ExternalData, SystemClock,
};
use crate::fold_token;
use crate::history::{Direction, HistoryNavigator};
use crate::output::{SessionHost, TranscriptEntry};
use crate::presence::{PresenceView, PresenceWatch};
use crate::registry::{CommandHandler, CommandRegistry, Resolution};

pub fn not_found_message(token: &str) -> String {
    format!("Command not found: {token}. Type 'help' for a list of commands.")
}

pub fn failure_message(command: &str) -> String {
    format!("Command failed: {command}. Please try again later.")
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Blank input; nothing was recorded.
    Ignored,
    NotFound,
    Completed,
    /// The handler returned an error or panicked.
    Failed,
}

/// Result of the synchronous half of a submission.
pub enum Submission {
    Empty,
    NotFound { token: String },
    Ready(PendingCommand),
}

/// A resolved command waiting to run. Owns everything it needs, so it can be
/// moved onto a separate task; output lands in the transcript whenever it
/// completes.
pub struct PendingCommand {
    name: String,
    args: Vec<String>,
    handler: Arc<dyn CommandHandler>,
    ctx: CommandContext,
    host: Arc<dyn SessionHost>,
}

impl PendingCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the handler. Errors and panics stop here: they are logged and
    /// turned into a single failure notice.
    pub async fn run(self) -> Outcome {
        let PendingCommand {
            name,
            args,
            handler,
            ctx,
            host,
        } = self;

        let result = AssertUnwindSafe(handler.run(&args, &ctx))
            .catch_unwind()
            .await;
        match result {
            Ok(Ok(output)) => {
                if !output.is_empty() {
                    host.append(TranscriptEntry::Output { output });
                }
                Outcome::Completed
            }
            Ok(Err(err)) => {
                warn!(target: "lookout::dispatch", command = %name, error = %err, "command failed");
                host.append(TranscriptEntry::notice(failure_message(&name)));
                Outcome::Failed
            }
            Err(panic) => {
                error!(
                    target: "lookout::dispatch",
                    command = %name,
                    panic = %panic_message(panic.as_ref()),
                    "command panicked"
                );
                host.append(TranscriptEntry::notice(failure_message(&name)));
                Outcome::Failed
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

struct Inner {
    registry: Arc<CommandRegistry>,
    summaries: Arc<[CommandSummary]>,
    history: Mutex<HistoryNavigator>,
    host: Arc<dyn SessionHost>,
    presence: PresenceWatch,
    external: watch::Receiver<Arc<ExternalData>>,
    clock: Arc<dyn Clock>,
}

/// The shell session: turns submitted lines into transcript entries.
///
/// Cheap to clone; clones share history and host. History and the echo are
/// updated under one lock so concurrent submissions keep a consistent order.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

pub struct DispatcherBuilder {
    registry: Arc<CommandRegistry>,
    host: Arc<dyn SessionHost>,
    presence: Option<PresenceWatch>,
    external: Option<watch::Receiver<Arc<ExternalData>>>,
    clock: Arc<dyn Clock>,
}

impl DispatcherBuilder {
    pub fn presence(mut self, presence: PresenceWatch) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn external(mut self, external: watch::Receiver<Arc<ExternalData>>) -> Self {
        self.external = Some(external);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Dispatcher {
        let presence = self
            .presence
            .unwrap_or_else(|| watch::channel(PresenceView::default()).1);
        let external = self
            .external
            .unwrap_or_else(|| watch::channel(Arc::new(ExternalData::default())).1);
        let summaries: Arc<[CommandSummary]> = self.registry.summaries().into();
        Dispatcher {
            inner: Arc::new(Inner {
                registry: self.registry,
                summaries,
                history: Mutex::new(HistoryNavigator::new()),
                host: self.host,
                presence,
                external,
                clock: self.clock,
            }),
        }
    }
}

impl Dispatcher {
    pub fn builder(registry: Arc<CommandRegistry>, host: Arc<dyn SessionHost>) -> DispatcherBuilder {
        DispatcherBuilder {
            registry,
            host,
            presence: None,
            external: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.inner.registry
    }

    /// Records and echoes the line, resolves the command and prepares its
    /// context. Nothing here waits.
    pub fn begin(&self, raw_line: &str) -> Submission {
        self.prepare(raw_line, true)
    }

    fn prepare(&self, raw_line: &str, record: bool) -> Submission {
        let line = raw_line.trim();
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            return Submission::Empty;
        };
        let token = fold_token(first);
        let args: Vec<String> = fields.map(str::to_owned).collect();

        if record {
            let mut history = self.inner.history.lock();
            history.record(line);
            self.inner.host.append(TranscriptEntry::echo(line));
        }

        let command = match self.inner.registry.resolve(&token) {
            Resolution::Command(command) => command,
            Resolution::NotFound => {
                debug!(target: "lookout::dispatch", %token, "unknown command");
                self.inner
                    .host
                    .append(TranscriptEntry::notice(not_found_message(&token)));
                return Submission::NotFound { token };
            }
        };

        debug!(
            target: "lookout::dispatch",
            command = command.name(),
            invoked_as = %token,
            args = args.len(),
            "dispatching"
        );
        let ctx = CommandContext::new(ContextParts {
            invoked_as: token,
            command: command.name().to_owned(),
            now: self.inner.clock.now(),
            presence: self.inner.presence.borrow().clone(),
            external: self.inner.external.borrow().clone(),
            commands: self.inner.summaries.clone(),
            host: self.inner.host.clone(),
        });
        Submission::Ready(PendingCommand {
            name: command.name().to_owned(),
            args,
            handler: command.handler().clone(),
            ctx,
            host: self.inner.host.clone(),
        })
    }

    /// Submits a line and waits for its command to finish.
    pub async fn submit(&self, raw_line: &str) -> Outcome {
        match self.begin(raw_line) {
            Submission::Empty => Outcome::Ignored,
            Submission::NotFound { .. } => Outcome::NotFound,
            Submission::Ready(pending) => pending.run().await,
        }
    }

    /// Runs a line on the session's behalf, e.g. the greeting at start-up.
    /// Neither history nor the transcript echo see it; only its output is
    /// appended.
    pub async fn run_unrecorded(&self, raw_line: &str) -> Outcome {
        match self.prepare(raw_line, false) {
            Submission::Empty => Outcome::Ignored,
            Submission::NotFound { .. } => Outcome::NotFound,
            Submission::Ready(pending) => pending.run().await,
        }
    }

    pub fn navigate(&self, direction: Direction) -> String {
        self.inner.history.lock().navigate(direction)
    }

    /// Up arrow.
    pub fn previous(&self) -> String {
        self.navigate(Direction::Older)
    }

    /// Down arrow.
    pub fn next(&self) -> String {
        self.navigate(Direction::Newer)
    }

    pub fn history(&self) -> Vec<String> {
        self.inner.history.lock().entries().to_vec()
    }

    pub fn history_cursor(&self) -> isize {
        self.inner.history.lock().cursor()
    }
}
