use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::sources::SourceError;
use lookout_core::RegistryError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("logging initialization failed: {0}")]
    Logging(String),
    #[error("command registry is invalid: {0}")]
    Registry(#[from] RegistryError),
    #[error("http client setup failed: {0}")]
    Http(#[from] SourceError),
    #[error("terminal runtime error: {0}")]
    Runtime(String),
}
