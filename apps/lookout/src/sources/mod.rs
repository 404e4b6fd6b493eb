//! Read-only auxiliary data: repositories for `projects` and current
//! conditions for `weather`.

pub mod github;
pub mod weather;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

use lookout_core::{DataState, ExternalData, Repository};

pub use github::GithubClient;
pub use weather::{OpenWeatherClient, WeatherReport};

const TARGET: &str = "lookout::sources";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cannot build request url from {0}")]
    Endpoint(String),
    #[error("no api key configured")]
    MissingApiKey,
}

#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn top_repositories(&self) -> Result<Vec<Repository>, SourceError>;
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// `Ok(None)` when the service does not know the city.
    async fn current(&self, city: &str) -> Result<Option<WeatherReport>, SourceError>;
}

const USER_AGENT: &str = concat!("lookout/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with bounded timeouts so a slow upstream only delays the
/// command that asked for it.
pub fn http_client() -> Result<Client, SourceError> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .timeout(Duration::from_secs(8))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Appends path segments to `base`, keeping whatever path it already has.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SourceError::Endpoint(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Fetches the repository list once in the background. The receiver starts at
/// `Pending` and moves to `Ready` or `Failed`.
pub fn spawn_repository_loader(
    source: Arc<dyn RepositorySource>,
) -> (watch::Receiver<Arc<ExternalData>>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = watch::channel(Arc::new(ExternalData::default()));
    let task = tokio::spawn(async move {
        let repositories = match source.top_repositories().await {
            Ok(repos) => {
                info!(target: TARGET, count = repos.len(), "repositories loaded");
                DataState::Ready(repos)
            }
            Err(err) => {
                warn!(target: TARGET, error = %err, "repository fetch failed");
                DataState::Failed(err.to_string())
            }
        };
        let _ = tx.send(Arc::new(ExternalData { repositories }));
    });
    (rx, task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_builds_with_configured_agent() {
        assert!(http_client().is_ok());
        assert!(USER_AGENT.starts_with("lookout/"));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let base = Url::parse("https://api.openweathermap.org/data/2.5").expect("url");
        assert_eq!(
            endpoint(&base, &["weather"]).expect("endpoint").as_str(),
            "https://api.openweathermap.org/data/2.5/weather"
        );
        let base = Url::parse("https://api.github.com/").expect("url");
        assert_eq!(
            endpoint(&base, &["users", "trixzyy", "repos"])
                .expect("endpoint")
                .as_str(),
            "https://api.github.com/users/trixzyy/repos"
        );
    }

    struct Fixed(Result<Vec<Repository>, ()>);

    #[async_trait]
    impl RepositorySource for Fixed {
        async fn top_repositories(&self) -> Result<Vec<Repository>, SourceError> {
            self.0.clone().map_err(|_| SourceError::MissingApiKey)
        }
    }

    #[tokio::test]
    async fn loader_publishes_ready_or_failed() {
        let (mut rx, task) = spawn_repository_loader(Arc::new(Fixed(Ok(Vec::new()))));
        task.await.expect("loader task");
        rx.changed().await.expect("published");
        assert_eq!(rx.borrow().repositories, DataState::Ready(Vec::new()));

        let (rx, task) = spawn_repository_loader(Arc::new(Fixed(Err(()))));
        task.await.expect("loader task");
        assert!(matches!(rx.borrow().repositories, DataState::Failed(_)));
    }
}
