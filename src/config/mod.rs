pub mod file;
pub mod resolve;

pub use file::{ConfigFile, PortsSection, RenderSection};
pub use resolve::{load_config, resolve_config_path, ConfigLocation, Overrides, Settings};

use std::path::PathBuf;

use thiserror::Error;

use crate::core::port::PortParseError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid privileged port: {0}")]
    PrivilegedPort(#[source] PortParseError),
    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
