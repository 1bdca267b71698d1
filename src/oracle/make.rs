use std::process::Command;

use crate::core::depends::DependencyKind;
use crate::core::port::{FlavoredName, PortId};
use crate::core::tree::PortsTree;
use crate::oracle::{DependencyList, DependencyOracle, MalformedEntry, OracleError};

/// Asks the ports framework itself, one `make -C <portdir>` per query.
#[derive(Debug, Clone)]
pub struct MakeOracle {
    tree: PortsTree,
    make: String,
}

impl MakeOracle {
    pub fn new(tree: PortsTree, make: impl Into<String>) -> Self {
        Self {
            tree,
            make: make.into(),
        }
    }

    fn run(&self, port: &PortId, args: &[String]) -> Result<String, OracleError> {
        let dir = self.tree.port_dir(port);
        if !dir.is_dir() {
            return Err(OracleError::MissingPort(dir));
        }

        let command = format!("{} -C {} {}", self.make, dir.display(), args.join(" "));
        let output = Command::new(&self.make)
            .arg("-C")
            .arg(&dir)
            .args(args)
            .output()
            .map_err(|source| OracleError::Unavailable {
                port: port.clone(),
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(OracleError::Failed {
                port: port.clone(),
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl DependencyOracle for MakeOracle {
    fn dependencies(
        &self,
        port: &PortId,
        flavor: Option<&str>,
        kind: DependencyKind,
    ) -> Result<DependencyList, OracleError> {
        let stdout = self.run(port, &depends_args(flavor, kind))?;
        Ok(parse_depends_output(&stdout))
    }

    fn maintainer(&self, port: &PortId) -> Result<String, OracleError> {
        let stdout = self.run(port, &["maintainer".to_string()])?;
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}

pub fn depends_args(flavor: Option<&str>, kind: DependencyKind) -> Vec<String> {
    let mut args = vec![
        kind.depends_target().to_string(),
        "-DDEPENDS_SHOW_FLAVOR".to_string(),
    ];
    if let Some(flavor) = flavor.filter(|flavor| !flavor.is_empty()) {
        args.push(format!("FLAVOR={flavor}"));
    }
    args
}

/// Splits `*-depends-list` output into parsed names and rejected lines,
/// preserving order. Blank lines are ignored.
pub fn parse_depends_output(stdout: &str) -> DependencyList {
    let mut list = DependencyList::default();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match FlavoredName::from_depends_line(line) {
            Ok(dep) => list.entries.push(dep),
            Err(error) => list.malformed.push(MalformedEntry {
                line: line.to_string(),
                error,
            }),
        }
    }
    list
}
