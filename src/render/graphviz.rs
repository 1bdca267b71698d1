use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::graph::viz::render_dot;
use crate::graph::PortGraph;
use crate::render::{GraphRenderer, RenderError, RenderRequest};

/// Formats that are the DOT source itself; nothing is run for them.
const SOURCE_FORMATS: &[&str] = &["dot", "gv"];

#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    dot: String,
}

impl GraphvizRenderer {
    pub fn new(dot: impl Into<String>) -> Self {
        Self { dot: dot.into() }
    }
}

impl GraphRenderer for GraphvizRenderer {
    fn render(&self, graph: &PortGraph, request: &RenderRequest) -> Result<PathBuf, RenderError> {
        let source = render_dot(graph, &request.name, request.rankdir);
        write_file(&request.source_path, &source)?;

        let format = request.format.trim().to_ascii_lowercase();
        if SOURCE_FORMATS.contains(&format.as_str()) {
            return Ok(request.source_path.clone());
        }

        let artifact = artifact_path(&request.source_path, &format);
        let command = format!(
            "{} -T{} -o {} {}",
            self.dot,
            format,
            artifact.display(),
            request.source_path.display()
        );
        let output = Command::new(&self.dot)
            .arg(format!("-T{format}"))
            .arg("-o")
            .arg(&artifact)
            .arg(&request.source_path)
            .output()
            .map_err(|source| RenderError::Unavailable {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(RenderError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !request.keep_source {
            let _ = fs::remove_file(&request.source_path);
        }
        Ok(artifact)
    }
}

/// `editors/foo` rendered as svg becomes `editors/foo.svg`.
pub fn artifact_path(source: &Path, format: &str) -> PathBuf {
    let mut path: OsString = source.as_os_str().to_owned();
    path.push(".");
    path.push(format);
    PathBuf::from(path)
}

fn write_file(path: &Path, contents: &str) -> Result<(), RenderError> {
    let to_error = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, contents).map_err(to_error)
}
