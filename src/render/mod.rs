use std::path::PathBuf;

use thiserror::Error;

use crate::graph::viz::RankDir;
use crate::graph::PortGraph;

pub mod graphviz;

pub use graphviz::GraphvizRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run `{command}`: {source}")]
    Unavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Name of the digraph, `name` or `name@flavor`.
    pub name: String,
    /// Where the DOT source goes; the artifact gets `.<format>` appended.
    pub source_path: PathBuf,
    pub rankdir: RankDir,
    pub format: String,
    pub keep_source: bool,
}

pub trait GraphRenderer: Send + Sync {
    /// Writes the artifact for `graph` and returns its path.
    fn render(&self, graph: &PortGraph, request: &RenderRequest) -> Result<PathBuf, RenderError>;
}
