use std::collections::HashSet;
use std::fmt;

use crate::core::depends::{DependencyKind, MaxDepth};
use crate::core::port::{FlavoredName, PortId, PortParseError};
use crate::graph::style::StylePolicy;
use crate::graph::PortGraph;
use crate::oracle::{DependencyOracle, OracleError};
use crate::util::output;

/// Non-fatal problems met while building; the graph is still usable.
#[derive(Debug)]
pub enum BuildWarning {
    /// The oracle could not list dependencies; the subtree was not walked.
    SkippedBranch {
        port: FlavoredName,
        kind: DependencyKind,
        error: OracleError,
    },
    /// One dependency line did not name a port and was left out.
    MalformedEntry {
        port: FlavoredName,
        kind: DependencyKind,
        line: String,
        error: PortParseError,
    },
    /// The maintainer lookup failed; the node kept the default style.
    MaintainerUnknown { port: PortId, error: OracleError },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::SkippedBranch { port, kind, error } => {
                write!(f, "skipped {kind} dependencies of {port}: {error}")
            }
            BuildWarning::MalformedEntry {
                port,
                kind,
                line,
                error,
            } => write!(f, "skipped {kind} dependency '{line}' of {port}: {error}"),
            BuildWarning::MaintainerUnknown { port, error } => {
                write!(f, "unknown maintainer for {port}: {error}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub graph: PortGraph,
    pub warnings: Vec<BuildWarning>,
}

/// What one pass asks the oracle: the kind of edges to follow and the
/// flavor taken from the root, used unchanged for every query.
#[derive(Debug, Clone)]
struct Pass {
    kind: DependencyKind,
    flavor: Option<String>,
}

/// State of one pass. Each pass gets a fresh visited set; the outcome is
/// shared between passes of the same build.
struct Traversal<'a> {
    pass: Pass,
    visited: HashSet<FlavoredName>,
    outcome: &'a mut BuildOutcome,
}

pub struct GraphBuilder<'a, O: DependencyOracle + ?Sized> {
    oracle: &'a O,
    policy: &'a StylePolicy,
}

impl<'a, O: DependencyOracle + ?Sized> GraphBuilder<'a, O> {
    pub fn new(oracle: &'a O, policy: &'a StylePolicy) -> Self {
        Self { oracle, policy }
    }

    pub fn build(
        &self,
        root: &FlavoredName,
        kind: DependencyKind,
        max_depth: MaxDepth,
    ) -> BuildOutcome {
        self.build_passes(root, &[kind], max_depth)
    }

    /// Runs one independent pass per kind, all writing into the same graph.
    pub fn build_passes(
        &self,
        root: &FlavoredName,
        kinds: &[DependencyKind],
        max_depth: MaxDepth,
    ) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();
        for &kind in kinds {
            self.run_pass(root, kind, max_depth, &mut outcome);
        }
        outcome
    }

    fn run_pass(
        &self,
        root: &FlavoredName,
        kind: DependencyKind,
        max_depth: MaxDepth,
        outcome: &mut BuildOutcome,
    ) {
        let root_port = root.canonical();
        if self.policy.is_suppressed(&root_port) {
            return;
        }

        let mut traversal = Traversal {
            pass: Pass {
                kind,
                flavor: root.flavor().map(str::to_string),
            },
            visited: HashSet::from([root.clone()]),
            outcome,
        };
        self.discover(&mut traversal, &root_port);
        self.expand(&mut traversal, root, max_depth);
    }

    fn discover(&self, traversal: &mut Traversal<'_>, port: &PortId) {
        if traversal.outcome.graph.contains(port) {
            return;
        }
        let (node, error) = self.policy.node_for(port, self.oracle);
        if let Some(error) = error {
            traversal.outcome.warnings.push(BuildWarning::MaintainerUnknown {
                port: port.clone(),
                error,
            });
        }
        traversal.outcome.graph.add_node(node);
    }

    fn expand(&self, traversal: &mut Traversal<'_>, current: &FlavoredName, depth: MaxDepth) {
        if depth.is_exhausted() {
            return;
        }
        output::trace(&format!("{} {}", traversal.pass.kind, current));

        let from = current.canonical();
        let list = match self.oracle.dependencies(
            &from,
            traversal.pass.flavor.as_deref(),
            traversal.pass.kind,
        ) {
            Ok(list) => list,
            Err(error) => {
                traversal.outcome.warnings.push(BuildWarning::SkippedBranch {
                    port: current.clone(),
                    kind: traversal.pass.kind,
                    error,
                });
                return;
            }
        };

        for entry in list.malformed {
            traversal.outcome.warnings.push(BuildWarning::MalformedEntry {
                port: current.clone(),
                kind: traversal.pass.kind,
                line: entry.line,
                error: entry.error,
            });
        }

        for dep in list.entries {
            let to = dep.canonical();
            if self.policy.is_suppressed(&to) {
                continue;
            }
            let fresh = traversal.visited.insert(dep.clone());
            if fresh {
                self.discover(traversal, &to);
            }
            traversal
                .outcome
                .graph
                .add_edge(&from, &to, traversal.pass.kind);
            if fresh {
                self.expand(traversal, &dep, depth.descend());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use crate::core::depends::{DependencyKind, MaxDepth};
    use crate::core::port::{FlavoredName, PortId};
    use crate::graph::builder::{BuildWarning, GraphBuilder};
    use crate::graph::style::{NodeStyle, StylePolicy};
    use crate::graph::PortGraph;
    use crate::oracle::make::parse_depends_output;
    use crate::oracle::{DependencyList, DependencyOracle, OracleError};

    #[derive(Default)]
    struct FakeOracle {
        deps: HashMap<(String, DependencyKind), Vec<String>>,
        maintainers: HashMap<String, String>,
        broken: HashSet<String>,
        depends_calls: Mutex<Vec<(String, Option<String>, DependencyKind)>>,
        maintainer_calls: Mutex<usize>,
    }

    impl FakeOracle {
        fn with(mut self, kind: DependencyKind, port: &str, deps: &[&str]) -> Self {
            self.deps.insert(
                (port.to_string(), kind),
                deps.iter().map(|dep| dep.to_string()).collect(),
            );
            self
        }

        fn maintained_by(mut self, port: &str, maintainer: &str) -> Self {
            self.maintainers
                .insert(port.to_string(), maintainer.to_string());
            self
        }

        fn broken(mut self, port: &str) -> Self {
            self.broken.insert(port.to_string());
            self
        }

        fn expansions_of(&self, port: &str, kind: DependencyKind) -> usize {
            self.depends_calls
                .lock()
                .expect("lock calls")
                .iter()
                .filter(|(called, _, called_kind)| called == port && *called_kind == kind)
                .count()
        }
    }

    impl DependencyOracle for FakeOracle {
        fn dependencies(
            &self,
            port: &PortId,
            flavor: Option<&str>,
            kind: DependencyKind,
        ) -> Result<DependencyList, OracleError> {
            let key = port.to_string();
            self.depends_calls.lock().expect("lock calls").push((
                key.clone(),
                flavor.map(str::to_string),
                kind,
            ));
            if self.broken.contains(&key) {
                return Err(OracleError::MissingPort(key.into()));
            }
            let lines = self
                .deps
                .get(&(key, kind))
                .map(|deps| deps.join("\n"))
                .unwrap_or_default();
            Ok(parse_depends_output(&lines))
        }

        fn maintainer(&self, port: &PortId) -> Result<String, OracleError> {
            *self.maintainer_calls.lock().expect("lock maintainer calls") += 1;
            Ok(self
                .maintainers
                .get(&port.to_string())
                .cloned()
                .unwrap_or_else(|| "someone@example.org".to_string()))
        }
    }

    fn root(raw: &str) -> FlavoredName {
        raw.parse().expect("parse root")
    }

    fn port(raw: &str) -> PortId {
        raw.parse().expect("parse port")
    }

    fn node_names(graph: &PortGraph) -> Vec<String> {
        let mut names: Vec<String> = graph.nodes().map(|node| node.port.to_string()).collect();
        names.sort();
        names
    }

    fn edge_list(graph: &PortGraph) -> Vec<(String, String, DependencyKind)> {
        graph
            .edges()
            .map(|(from, to, kind)| (from.to_string(), to.to_string(), kind))
            .collect()
    }

    fn build_chain() -> FakeOracle {
        FakeOracle::default()
            .with(DependencyKind::Build, "editors/foo", &["devel/bar"])
            .with(DependencyKind::Build, "devel/bar", &["ports-mgmt/pkg"])
    }

    #[test]
    fn privileged_package_is_hidden_by_default() {
        let oracle = build_chain();
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert_eq!(node_names(&outcome.graph), vec!["devel/bar", "editors/foo"]);
        assert_eq!(
            edge_list(&outcome.graph),
            vec![(
                "editors/foo".to_string(),
                "devel/bar".to_string(),
                DependencyKind::Build
            )]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn privileged_package_is_drawn_when_requested() {
        let oracle = build_chain();
        let policy = StylePolicy {
            show_privileged: true,
            ..StylePolicy::default()
        };
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert_eq!(
            node_names(&outcome.graph),
            vec!["devel/bar", "editors/foo", "ports-mgmt/pkg"]
        );
        assert_eq!(outcome.graph.edge_count(), 2);
    }

    #[test]
    fn suppressed_privileged_package_is_never_expanded() {
        let oracle = build_chain().with(DependencyKind::Build, "ports-mgmt/pkg", &["devel/hidden"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert!(!outcome.graph.contains(&port("ports-mgmt/pkg")));
        assert!(!outcome.graph.contains(&port("devel/hidden")));
        assert!(outcome
            .graph
            .edges()
            .all(|(from, to, _)| from != &PortId::pkg() && to != &PortId::pkg()));
        assert_eq!(oracle.expansions_of("ports-mgmt/pkg", DependencyKind::Build), 0);
    }

    #[test]
    fn suppressed_root_yields_an_empty_graph() {
        let oracle = FakeOracle::default().with(DependencyKind::Build, "ports-mgmt/pkg", &["devel/bar"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("ports-mgmt/pkg"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );
        assert!(outcome.graph.is_empty());
        assert_eq!(outcome.graph.edge_count(), 0);
    }

    #[test]
    fn zero_depth_yields_only_the_root() {
        let oracle = build_chain();
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Limited(0),
        );

        assert_eq!(node_names(&outcome.graph), vec!["editors/foo"]);
        assert_eq!(outcome.graph.edge_count(), 0);
        assert!(oracle.depends_calls.lock().expect("lock calls").is_empty());
    }

    #[test]
    fn depth_one_lists_direct_dependencies_without_expanding_them() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "editors/foo", &["devel/bar", "devel/baz"])
            .with(DependencyKind::Build, "devel/bar", &["devel/deep"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Limited(1),
        );

        assert_eq!(
            node_names(&outcome.graph),
            vec!["devel/bar", "devel/baz", "editors/foo"]
        );
        assert_eq!(outcome.graph.edge_count(), 2);
        assert_eq!(oracle.expansions_of("devel/bar", DependencyKind::Build), 0);
    }

    #[test]
    fn cycles_terminate_with_one_node_per_port() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "devel/a", &["devel/b"])
            .with(DependencyKind::Build, "devel/b", &["devel/c"])
            .with(DependencyKind::Build, "devel/c", &["devel/a"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("devel/a"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert_eq!(node_names(&outcome.graph), vec!["devel/a", "devel/b", "devel/c"]);
        assert_eq!(outcome.graph.edge_count(), 3);
        for name in ["devel/a", "devel/b", "devel/c"] {
            assert_eq!(oracle.expansions_of(name, DependencyKind::Build), 1);
        }
    }

    #[test]
    fn duplicate_dependency_gives_two_edges_but_one_expansion() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "editors/foo", &["devel/bar", "devel/bar"])
            .with(DependencyKind::Build, "devel/bar", &["devel/baz"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        let to_bar = edge_list(&outcome.graph)
            .into_iter()
            .filter(|(from, to, _)| from == "editors/foo" && to == "devel/bar")
            .count();
        assert_eq!(to_bar, 2);
        assert_eq!(oracle.expansions_of("devel/bar", DependencyKind::Build), 1);
        assert_eq!(outcome.graph.node_count(), 3);
    }

    #[test]
    fn build_and_run_passes_share_nodes_but_not_edges() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "editors/foo", &["devel/bar"])
            .with(DependencyKind::Run, "editors/foo", &["devel/bar", "misc/runtime"])
            .with(DependencyKind::Build, "devel/bar", &["devel/gmake"])
            .with(DependencyKind::Run, "devel/bar", &["devel/gmake"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build_passes(
            &root("editors/foo"),
            &[DependencyKind::Build, DependencyKind::Run],
            MaxDepth::Unbounded,
        );

        assert_eq!(
            node_names(&outcome.graph),
            vec!["devel/bar", "devel/gmake", "editors/foo", "misc/runtime"]
        );
        let foo_to_bar: Vec<DependencyKind> = edge_list(&outcome.graph)
            .into_iter()
            .filter(|(from, to, _)| from == "editors/foo" && to == "devel/bar")
            .map(|(_, _, kind)| kind)
            .collect();
        assert_eq!(foo_to_bar, vec![DependencyKind::Build, DependencyKind::Run]);
        assert_eq!(oracle.expansions_of("devel/bar", DependencyKind::Build), 1);
        assert_eq!(oracle.expansions_of("devel/bar", DependencyKind::Run), 1);
    }

    #[test]
    fn root_flavor_is_used_for_every_query_and_stripped_from_nodes() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "lang/foo", &["devel/bar@py311"])
            .with(DependencyKind::Build, "devel/bar", &["devel/baz"]);
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("lang/foo@py39"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert_eq!(
            node_names(&outcome.graph),
            vec!["devel/bar", "devel/baz", "lang/foo"]
        );
        let calls = oracle.depends_calls.lock().expect("lock calls");
        assert_eq!(calls.len(), 3);
        assert!(calls
            .iter()
            .all(|(_, flavor, _)| flavor.as_deref() == Some("py39")));
        assert!(outcome
            .graph
            .edges()
            .all(|(from, to, _)| !from.to_string().contains('@') && !to.to_string().contains('@')));
    }

    #[test]
    fn distinct_flavors_of_one_port_share_a_node() {
        let oracle = FakeOracle::default().with(
            DependencyKind::Build,
            "editors/foo",
            &["devel/bar@a", "devel/bar@b"],
        );
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert_eq!(outcome.graph.node_count(), 2);
        assert_eq!(outcome.graph.edge_count(), 2);
        assert_eq!(oracle.expansions_of("devel/bar", DependencyKind::Build), 2);
    }

    #[test]
    fn failing_branch_is_skipped_and_siblings_continue() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "editors/foo", &["devel/broken", "devel/fine"])
            .with(DependencyKind::Build, "devel/fine", &["devel/leaf"])
            .broken("devel/broken");
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );

        assert_eq!(
            node_names(&outcome.graph),
            vec!["devel/broken", "devel/fine", "devel/leaf", "editors/foo"]
        );
        assert!(!outcome
            .graph
            .edges()
            .any(|(from, _, _)| from.to_string() == "devel/broken"));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            BuildWarning::SkippedBranch { port, .. } if port.to_string() == "devel/broken"
        ));
    }

    #[test]
    fn malformed_lines_become_warnings_and_siblings_survive() {
        let oracle = FakeOracle::default().with(
            DependencyKind::Run,
            "editors/foo",
            &["devel/bar", "nonsense", "/usr/ports/devel/baz@"],
        );
        let policy = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &policy).build(
            &root("editors/foo"),
            DependencyKind::Run,
            MaxDepth::Unbounded,
        );

        assert_eq!(node_names(&outcome.graph), vec!["devel/bar", "editors/foo"]);
        let lines: Vec<&str> = outcome
            .warnings
            .iter()
            .filter_map(|warning| match warning {
                BuildWarning::MalformedEntry { port, kind, line, .. } => {
                    assert_eq!(port.to_string(), "editors/foo");
                    assert_eq!(*kind, DependencyKind::Run);
                    Some(line.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["nonsense", "/usr/ports/devel/baz@"]);
        assert!(outcome.warnings[0].to_string().contains("'nonsense'"));
    }

    #[test]
    fn unmaintained_ports_are_flagged_only_when_checked() {
        let oracle = FakeOracle::default()
            .with(DependencyKind::Build, "editors/foo", &["devel/orphan"])
            .maintained_by("devel/orphan", "ports@FreeBSD.org");

        let unchecked = StylePolicy::default();
        let outcome = GraphBuilder::new(&oracle, &unchecked).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );
        assert!(outcome.graph.nodes().all(|node| node.style == NodeStyle::Normal));
        assert_eq!(*oracle.maintainer_calls.lock().expect("lock maintainer calls"), 0);

        let checked = StylePolicy {
            check_maintainer: true,
            ..StylePolicy::default()
        };
        let outcome = GraphBuilder::new(&oracle, &checked).build(
            &root("editors/foo"),
            DependencyKind::Build,
            MaxDepth::Unbounded,
        );
        assert_eq!(
            outcome.graph.node(&port("devel/orphan")).map(|node| node.style),
            Some(NodeStyle::NeedsAttention)
        );
        assert_eq!(
            outcome.graph.node(&port("editors/foo")).map(|node| node.style),
            Some(NodeStyle::Normal)
        );
        assert_eq!(*oracle.maintainer_calls.lock().expect("lock maintainer calls"), 2);
    }
}
