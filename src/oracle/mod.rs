use std::path::PathBuf;

use thiserror::Error;

use crate::core::depends::DependencyKind;
use crate::core::port::{FlavoredName, PortId, PortParseError};

pub mod make;

pub use make::MakeOracle;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("port directory {} does not exist", .0.display())]
    MissingPort(PathBuf),
    #[error("failed to run `{command}` for {port}: {source}")]
    Unavailable {
        port: PortId,
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed for {port} ({status}): {stderr}")]
    Failed {
        port: PortId,
        command: String,
        status: String,
        stderr: String,
    },
}

/// A `*-depends-list` line that does not name a port.
#[derive(Debug)]
pub struct MalformedEntry {
    pub line: String,
    pub error: PortParseError,
}

/// Direct dependencies in evaluator order, plus the lines that were skipped.
#[derive(Debug, Default)]
pub struct DependencyList {
    pub entries: Vec<FlavoredName>,
    pub malformed: Vec<MalformedEntry>,
}

impl From<Vec<FlavoredName>> for DependencyList {
    fn from(entries: Vec<FlavoredName>) -> Self {
        Self {
            entries,
            malformed: Vec::new(),
        }
    }
}

/// Source of per-port dependency data. Every call may be slow; nothing is
/// cached between calls.
pub trait DependencyOracle: Send + Sync {
    /// Direct dependencies of `port` for `kind`, in evaluator order.
    fn dependencies(
        &self,
        port: &PortId,
        flavor: Option<&str>,
        kind: DependencyKind,
    ) -> Result<DependencyList, OracleError>;

    fn maintainer(&self, port: &PortId) -> Result<String, OracleError>;
}
