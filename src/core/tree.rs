use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::port::PortId;

pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
    &["Mk", "distfiles", "Tools", "Templates", "Keywords", "base"];

/// Ports found by a batch walk, plus the categories that could not be read.
#[derive(Debug, Default)]
pub struct PortListing {
    pub ports: Vec<PortId>,
    pub unreadable: Vec<(String, io::Error)>,
}

#[derive(Debug, Clone)]
pub struct PortsTree {
    pub root: PathBuf,
}

impl PortsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn port_dir(&self, port: &PortId) -> PathBuf {
        self.root.join(port.category()).join(port.name())
    }

    /// Every `category/name` directory under the root, sorted. Administrative
    /// category directories named in `excluded` and hidden entries are skipped.
    /// Symlinked categories and ports are followed. Only an unreadable root is
    /// an error; an unreadable category is reported in the listing.
    pub fn list_ports(&self, excluded: &[String]) -> io::Result<PortListing> {
        let categories = subdirectories(&self.root)?
            .into_iter()
            .filter(|category| !excluded.iter().any(|name| name == category))
            .collect();
        Ok(self.collect_ports(categories))
    }

    fn collect_ports(&self, categories: Vec<String>) -> PortListing {
        let mut listing = PortListing::default();
        for category in categories {
            match subdirectories(&self.root.join(&category)) {
                Ok(names) => listing.ports.extend(
                    names
                        .into_iter()
                        .filter_map(|name| PortId::new(category.as_str(), name).ok()),
                ),
                Err(err) => listing.unreadable.push((category, err)),
            }
        }
        listing.ports.sort();
        listing
    }
}

fn subdirectories(path: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}
