use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Build,
    Run,
}

impl DependencyKind {
    pub fn color(self) -> &'static str {
        match self {
            DependencyKind::Build => "#009999",
            DependencyKind::Run => "#990000",
        }
    }

    /// The ports framework target that lists direct dependencies of this kind.
    pub fn depends_target(self) -> &'static str {
        match self {
            DependencyKind::Build => "build-depends-list",
            DependencyKind::Run => "run-depends-list",
        }
    }

    /// Kinds requested on the command line; build only when neither is set.
    pub fn selected(build: bool, run: bool) -> Vec<DependencyKind> {
        let mut kinds = Vec::new();
        if build || !run {
            kinds.push(DependencyKind::Build);
        }
        if run {
            kinds.push(DependencyKind::Run);
        }
        kinds
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Build => write!(f, "build"),
            DependencyKind::Run => write!(f, "run"),
        }
    }
}

/// Remaining recursion budget of a traversal branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxDepth {
    Unbounded,
    Limited(u32),
}

impl MaxDepth {
    /// Negative values mean no limit.
    pub fn from_signed(value: i64) -> Self {
        if value < 0 {
            MaxDepth::Unbounded
        } else {
            MaxDepth::Limited(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }

    pub fn is_exhausted(self) -> bool {
        matches!(self, MaxDepth::Limited(0))
    }

    pub fn descend(self) -> Self {
        match self {
            MaxDepth::Unbounded => MaxDepth::Unbounded,
            MaxDepth::Limited(n) => MaxDepth::Limited(n.saturating_sub(1)),
        }
    }
}
