use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::telemetry::logging::{LogConfig, LogLevel};
use lookout_core::Theme;

pub const DEFAULT_FEED_URL: &str = "wss://api.lanyard.rest/socket";
pub const DEFAULT_SUBSCRIBE_ID: &str = "992171799536218142";
pub const DEFAULT_GITHUB_USER: &str = "trixzyy";
pub const DEFAULT_REFERENCE_ZONE: &str = "Europe/London";

#[derive(Parser, Debug)]
#[command(
    name = "lookout",
    about = "Profile shell with a live presence feed",
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("BUILD_TIMESTAMP"))
)]
pub struct Cli {
    #[command(flatten)]
    pub feed: FeedArgs,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub zones: ZoneArgs,

    #[arg(
        long,
        global = true,
        value_enum,
        env = "LOOKOUT_THEME",
        default_value_t = ThemeArg::Dark,
        help = "Initial colour scheme"
    )]
    pub theme: ThemeArg,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    #[arg(
        long = "feed-url",
        global = true,
        env = "LOOKOUT_FEED_URL",
        default_value = DEFAULT_FEED_URL,
        help = "WebSocket endpoint of the presence feed"
    )]
    pub url: String,

    #[arg(
        long = "subscribe-id",
        global = true,
        env = "LOOKOUT_SUBSCRIBE_ID",
        default_value = DEFAULT_SUBSCRIBE_ID,
        help = "User id to subscribe to on the presence feed"
    )]
    pub subscribe_id: String,

    #[arg(
        long = "no-feed",
        global = true,
        action = clap::ArgAction::SetTrue,
        help = "Do not connect to the presence feed"
    )]
    pub disabled: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(
        long = "github-user",
        global = true,
        env = "LOOKOUT_GITHUB_USER",
        default_value = DEFAULT_GITHUB_USER,
        help = "GitHub account whose repositories `projects` lists"
    )]
    pub github_user: String,

    #[arg(
        long = "repo-limit",
        global = true,
        default_value_t = 6,
        help = "Number of repositories shown by `projects`"
    )]
    pub repo_limit: usize,

    #[arg(
        long = "github-api",
        global = true,
        default_value = "https://api.github.com",
        hide = true
    )]
    pub github_api: String,

    #[arg(
        long = "weather-api-key",
        global = true,
        env = "OPENWEATHER_API_KEY",
        hide_env_values = true,
        help = "OpenWeather API key used by `weather`"
    )]
    pub weather_api_key: Option<String>,

    #[arg(
        long = "weather-api",
        global = true,
        default_value = "https://api.openweathermap.org/data/2.5",
        hide = true
    )]
    pub weather_api: String,
}

#[derive(Args, Debug, Clone)]
pub struct ZoneArgs {
    #[arg(
        long = "reference-zone",
        global = true,
        env = "LOOKOUT_REFERENCE_ZONE",
        default_value = DEFAULT_REFERENCE_ZONE,
        help = "IANA zone `date` compares your clock against"
    )]
    pub reference: String,

    #[arg(
        long = "local-zone",
        global = true,
        env = "LOOKOUT_LOCAL_ZONE",
        help = "IANA zone to treat as local (defaults to the system zone)"
    )]
    pub local: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LoggingArgs {
    #[arg(
        long = "log-level",
        global = true,
        value_enum,
        env = "LOOKOUT_LOG_LEVEL",
        default_value_t = LogLevel::Warn,
        help = "Minimum log level (error, warn, info, debug, trace)"
    )]
    pub level: LogLevel,

    #[arg(
        long = "log-file",
        global = true,
        value_name = "PATH",
        env = "LOOKOUT_LOG_FILE",
        help = "Write structured logs to the specified file"
    )]
    pub file: Option<PathBuf>,
}

impl LoggingArgs {
    pub fn to_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            file: self.file.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive session (default when no subcommand given)
    Shell,
    /// Run command lines once and print the transcript
    Exec(ExecArgs),
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[arg(value_name = "LINE", required = true, help = "Command lines, one per argument")]
    pub lines: Vec<String>,

    #[arg(
        long = "feed-wait",
        value_name = "SECONDS",
        default_value_t = 3,
        help = "How long to wait for the first presence update before running"
    )]
    pub feed_wait: u64,
}
