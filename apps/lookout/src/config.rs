use chrono_tz::Tz;
use thiserror::Error;
use url::Url;

use crate::terminal::cli::Cli;
use crate::zones::{LocalZone, ZoneConfig};
use lookout_core::Theme;
use lookout_feed::FeedConfig;

pub const DEFAULT_WEATHER_CITY: &str = "London";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {what} url '{value}': {reason}")]
    InvalidUrl {
        what: &'static str,
        value: String,
        reason: String,
    },
    #[error("feed url must use ws:// or wss://, got '{0}'")]
    FeedScheme(String),
    #[error("subscribe id must not be empty")]
    EmptySubscribeId,
    #[error("unknown time zone '{0}'")]
    UnknownZone(String),
    #[error("repo limit must be at least 1")]
    RepoLimit,
    #[error("github user must not be empty")]
    EmptyGithubUser,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: Url,
    pub user: String,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_base: Url,
    pub api_key: Option<String>,
    pub default_city: String,
}

/// Validated settings for one shell session.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// `None` when the feed is disabled.
    pub feed: Option<FeedConfig>,
    pub github: GithubConfig,
    pub weather: WeatherConfig,
    pub zones: ZoneConfig,
    pub theme: Theme,
}

impl TryFrom<&Cli> for ShellConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let feed = if cli.feed.disabled {
            None
        } else {
            let url = parse_url("feed", &cli.feed.url)?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(ConfigError::FeedScheme(cli.feed.url.clone()));
            }
            let subscribe_to = cli.feed.subscribe_id.trim();
            if subscribe_to.is_empty() {
                return Err(ConfigError::EmptySubscribeId);
            }
            Some(FeedConfig::new(url, subscribe_to))
        };

        if cli.sources.repo_limit == 0 {
            return Err(ConfigError::RepoLimit);
        }
        let user = cli.sources.github_user.trim();
        if user.is_empty() {
            return Err(ConfigError::EmptyGithubUser);
        }

        let reference = parse_zone(&cli.zones.reference)?;
        let local = match cli.zones.local.as_deref() {
            Some(name) => LocalZone::Fixed(parse_zone(name)?),
            None => LocalZone::System,
        };

        Ok(ShellConfig {
            feed,
            github: GithubConfig {
                api_base: parse_url("github api", &cli.sources.github_api)?,
                user: user.to_owned(),
                limit: cli.sources.repo_limit,
            },
            weather: WeatherConfig {
                api_base: parse_url("weather api", &cli.sources.weather_api)?,
                api_key: cli
                    .sources
                    .weather_api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(str::to_owned),
                default_city: DEFAULT_WEATHER_CITY.to_owned(),
            },
            zones: ZoneConfig { reference, local },
            theme: cli.theme.into(),
        })
    }
}

fn parse_url(what: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        what,
        value: value.to_owned(),
        reason: err.to_string(),
    })
}

fn parse_zone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownZone(name.to_owned()))
}
