use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{endpoint, RepositorySource, SourceError, TARGET};
use crate::config::GithubConfig;
use lookout_core::Repository;

#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
}

impl From<GithubRepo> for Repository {
    fn from(repo: GithubRepo) -> Self {
        Repository {
            name: repo.name,
            description: repo.description.filter(|d| !d.trim().is_empty()),
            url: repo.html_url,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
        }
    }
}

/// Public repositories of one GitHub user.
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(client: Client, config: GithubConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn top_repositories(&self) -> Result<Vec<Repository>, SourceError> {
        let url = endpoint(&self.config.api_base, &["users", self.config.user.as_str(), "repos"])?;
        debug!(target: TARGET, %url, "fetching repositories");
        let response = self
            .client
            .get(url.clone())
            .query(&[("per_page", "100"), ("sort", "updated")])
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                endpoint: url.to_string(),
            });
        }
        let body = response.text().await?;
        top_repositories(&body, self.config.limit)
    }
}

/// Most-starred first; ties keep the API order.
pub(crate) fn top_repositories(body: &str, limit: usize) -> Result<Vec<Repository>, SourceError> {
    let mut repos: Vec<GithubRepo> = serde_json::from_str(body)?;
    repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    Ok(repos.into_iter().take(limit).map(Repository::from).collect())
}
