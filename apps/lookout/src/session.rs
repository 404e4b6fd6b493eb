use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::commands::{builtin_registry, CommandDeps};
use crate::config::ShellConfig;
use crate::host::{HostEvent, TerminalHost};
use crate::sources::{self, GithubClient, OpenWeatherClient};
use crate::terminal::error::CliError;
use crate::zones::ZoneConfig;
use lookout_core::{Dispatcher, ExternalData, PresenceView, PresenceWatch};
use lookout_feed::{FeedClient, FeedHandle};

/// Everything one shell run owns: dispatcher, host, feed connection and the
/// background repository fetch.
pub struct Session {
    pub dispatcher: Dispatcher,
    pub host: Arc<TerminalHost>,
    pub events: mpsc::UnboundedReceiver<HostEvent>,
    pub presence: PresenceWatch,
    pub zones: ZoneConfig,
    external: watch::Receiver<Arc<ExternalData>>,
    feed: Option<FeedHandle>,
    loader: JoinHandle<()>,
}

impl Session {
    /// Must be called inside the runtime: it spawns the feed and the
    /// repository loader.
    pub fn start(config: &ShellConfig) -> Result<Self, CliError> {
        let http = sources::http_client()?;
        let registry = builtin_registry(CommandDeps {
            weather: Arc::new(OpenWeatherClient::new(http.clone(), config.weather.clone())),
            default_city: config.weather.default_city.clone(),
            zones: config.zones,
        })?;

        let (external, loader) = sources::spawn_repository_loader(Arc::new(GithubClient::new(
            http,
            config.github.clone(),
        )));

        let (feed, presence) = match &config.feed {
            Some(feed_config) => {
                info!(url = %feed_config.url, subscribe_to = %feed_config.subscribe_to, "starting presence feed");
                let handle = FeedClient::new(feed_config.clone()).spawn();
                let presence = handle.watch();
                (Some(handle), presence)
            }
            None => {
                debug!("presence feed disabled");
                (None, watch::channel(PresenceView::default()).1)
            }
        };

        let (host, events) = TerminalHost::new(config.theme);
        let host = Arc::new(host);
        let dispatcher = Dispatcher::builder(Arc::new(registry), host.clone())
            .presence(presence.clone())
            .external(external.clone())
            .build();

        Ok(Self {
            dispatcher,
            host,
            events,
            presence,
            zones: config.zones,
            external,
            feed,
            loader,
        })
    }

    pub fn feed_enabled(&self) -> bool {
        self.feed.is_some()
    }

    /// Waits until the repository fetch settled, at most `limit`.
    pub async fn wait_for_repositories(&mut self, limit: Duration) {
        let _ = tokio::time::timeout(
            limit,
            self.external
                .wait_for(|data| !matches!(data.repositories, lookout_core::DataState::Pending)),
        )
        .await;
    }

    /// Waits for the first presence snapshot, at most `limit`.
    pub async fn wait_for_presence(&mut self, limit: Duration) {
        if self.feed.is_none() {
            return;
        }
        let _ = tokio::time::timeout(limit, self.presence.wait_for(|view| view.snapshot.is_some()))
            .await;
    }

    pub async fn close(self) {
        self.loader.abort();
        if let Some(feed) = self.feed {
            feed.close().await;
        }
    }
}
