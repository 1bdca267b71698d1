use thiserror::Error;

use crate::config::ConfigError;
use crate::core::port::PortParseError;
use crate::oracle::OracleError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum PortgraphError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid port: {0}")]
    Port(#[from] PortParseError),
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PortgraphError>;
