use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortParseError {
    #[error("empty port name")]
    Empty,
    #[error("malformed port '{0}': expected category/name")]
    MissingCategory(String),
    #[error("malformed port '{0}': empty flavor")]
    EmptyFlavor(String),
    #[error("unexpected flavor in port '{0}': expected category/name")]
    UnexpectedFlavor(String),
}

/// A port in the collection, addressed as `category/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    category: String,
    name: String,
}

impl PortId {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, PortParseError> {
        let category = category.into();
        let name = name.into();
        if category.is_empty() || name.is_empty() || category.contains('/') || name.contains('/')
        {
            return Err(PortParseError::MissingCategory(format!("{category}/{name}")));
        }
        if category.contains('@') || name.contains('@') {
            return Err(PortParseError::UnexpectedFlavor(format!("{category}/{name}")));
        }
        Ok(Self { category, name })
    }

    /// `ports-mgmt/pkg`, the package tool nearly every port depends on.
    pub fn pkg() -> Self {
        Self {
            category: "ports-mgmt".to_string(),
            name: "pkg".to_string(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

impl FromStr for PortId {
    type Err = PortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PortParseError::Empty);
        }
        match trimmed.split_once('/') {
            Some((category, name)) => Self::new(category, name),
            None => Err(PortParseError::MissingCategory(trimmed.to_string())),
        }
    }
}

/// A port optionally qualified with a build variant, `category/name@flavor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlavoredName {
    port: PortId,
    flavor: Option<String>,
}

impl FlavoredName {
    pub fn new(port: PortId, flavor: Option<String>) -> Self {
        Self {
            port,
            flavor: flavor.filter(|flavor| !flavor.is_empty()),
        }
    }

    pub fn port(&self) -> &PortId {
        &self.port
    }

    pub fn flavor(&self) -> Option<&str> {
        self.flavor.as_deref()
    }

    /// The node identity of this name: the port with the flavor dropped.
    pub fn canonical(&self) -> PortId {
        self.port.clone()
    }

    /// Parses one line of `*-depends-list` output. Lines are port
    /// directories, usually absolute, with an optional `@flavor` suffix.
    pub fn from_depends_line(line: &str) -> Result<Self, PortParseError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(PortParseError::Empty);
        }
        let (category, leaf) = last_two_segments(trimmed)?;
        let (name, flavor) = split_flavor(trimmed, leaf)?;
        Ok(Self::new(PortId::new(category, name)?, flavor))
    }
}

impl From<PortId> for FlavoredName {
    fn from(port: PortId) -> Self {
        Self { port, flavor: None }
    }
}

impl fmt::Display for FlavoredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.flavor {
            Some(flavor) => write!(f, "{}@{}", self.port, flavor),
            None => write!(f, "{}", self.port),
        }
    }
}

impl FromStr for FlavoredName {
    type Err = PortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PortParseError::Empty);
        }
        let (category, leaf) = trimmed
            .split_once('/')
            .ok_or_else(|| PortParseError::MissingCategory(trimmed.to_string()))?;
        let (name, flavor) = split_flavor(trimmed, leaf)?;
        Ok(Self::new(PortId::new(category, name)?, flavor))
    }
}

/// Truncates a possibly flavored name at the first `@`.
pub fn canonical_name(name: &str) -> &str {
    match name.find('@') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

fn split_flavor<'a>(
    whole: &str,
    leaf: &'a str,
) -> Result<(&'a str, Option<String>), PortParseError> {
    let name = canonical_name(leaf);
    match leaf.get(name.len() + 1..) {
        None => Ok((name, None)),
        Some("") => Err(PortParseError::EmptyFlavor(whole.to_string())),
        Some(flavor) => Ok((name, Some(flavor.to_string()))),
    }
}

fn last_two_segments(path: &str) -> Result<(&str, &str), PortParseError> {
    let mut segments = path.rsplit('/').filter(|segment| !segment.is_empty());
    let leaf = segments.next();
    let category = segments.next();
    match (category, leaf) {
        (Some(category), Some(leaf)) => Ok((category, leaf)),
        _ => Err(PortParseError::MissingCategory(path.to_string())),
    }
}
