//! The assembled port graph: nodes keyed by canonical port id, plus every
//! observed dependency relation as a colored edge.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::core::depends::DependencyKind;
use crate::core::port::PortId;

pub mod builder;
pub mod style;
pub mod viz;

pub use builder::{BuildOutcome, BuildWarning, GraphBuilder};
pub use style::{NodeLink, NodeStyle, StylePolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortNode {
    pub port: PortId,
    pub url: Option<String>,
    pub style: NodeStyle,
}

impl PortNode {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            url: None,
            style: NodeStyle::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortEdge {
    pub kind: DependencyKind,
}

#[derive(Debug, Clone, Default)]
pub struct PortGraph {
    graph: DiGraph<PortNode, PortEdge>,
    node_indices: HashMap<PortId, NodeIndex>,
}

impl PortGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the node unless one already exists for its port; the first
    /// styling seen for a port is kept.
    pub fn add_node(&mut self, node: PortNode) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&node.port) {
            return idx;
        }
        let port = node.port.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(port, idx);
        idx
    }

    /// Records one observed dependency relation. Repeated relations produce
    /// repeated edges. Endpoints without a node get a default one.
    pub fn add_edge(&mut self, from: &PortId, to: &PortId, kind: DependencyKind) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        self.graph.add_edge(from_idx, to_idx, PortEdge { kind });
    }

    pub fn contains(&self, port: &PortId) -> bool {
        self.node_indices.contains_key(port)
    }

    pub fn node(&self, port: &PortId) -> Option<&PortNode> {
        self.node_indices.get(port).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &PortNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Edges in insertion order as `(from, to, kind)`.
    pub fn edges(&self) -> impl Iterator<Item = (&PortId, &PortId, DependencyKind)> {
        self.graph.edge_references().map(move |edge| {
            (
                &self.graph[edge.source()].port,
                &self.graph[edge.target()].port,
                edge.weight().kind,
            )
        })
    }

    fn ensure_node(&mut self, port: &PortId) -> NodeIndex {
        match self.node_indices.get(port) {
            Some(&idx) => idx,
            None => self.add_node(PortNode::new(port.clone())),
        }
    }
}
