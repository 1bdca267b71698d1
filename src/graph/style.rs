use serde::Serialize;

use crate::core::port::PortId;
use crate::graph::PortNode;
use crate::oracle::{DependencyOracle, OracleError};

pub const DEFAULT_UNMAINTAINED: &str = "ports@FreeBSD.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStyle {
    Normal,
    /// Nobody maintains the port.
    NeedsAttention,
}

impl NodeStyle {
    pub fn color(self) -> &'static str {
        match self {
            NodeStyle::Normal => "black",
            NodeStyle::NeedsAttention => "red",
        }
    }

    pub fn dot_style(self) -> &'static str {
        match self {
            NodeStyle::Normal => "filled",
            NodeStyle::NeedsAttention => "bold",
        }
    }
}

/// Hyperlink attached to every node: `prefix + category/name + suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLink {
    pub prefix: String,
    pub suffix: String,
}

impl NodeLink {
    pub fn url_for(&self, port: &PortId) -> String {
        format!("{}{}{}", self.prefix, port, self.suffix)
    }
}

#[derive(Debug, Clone)]
pub struct StylePolicy {
    pub privileged: PortId,
    pub show_privileged: bool,
    pub check_maintainer: bool,
    pub unmaintained: String,
    pub link: Option<NodeLink>,
}

impl StylePolicy {
    pub fn is_suppressed(&self, port: &PortId) -> bool {
        !self.show_privileged && port == &self.privileged
    }

    /// Styles a node for `port`. The maintainer is only looked up when the
    /// check is enabled; a failed lookup leaves the default style and hands
    /// the error back to the caller.
    pub fn node_for<O: DependencyOracle + ?Sized>(
        &self,
        port: &PortId,
        oracle: &O,
    ) -> (PortNode, Option<OracleError>) {
        let mut node = PortNode::new(port.clone());
        node.url = self.link.as_ref().map(|link| link.url_for(port));

        if !self.check_maintainer {
            return (node, None);
        }
        match oracle.maintainer(port) {
            Ok(maintainer) => {
                if maintainer == self.unmaintained {
                    node.style = NodeStyle::NeedsAttention;
                }
                (node, None)
            }
            Err(err) => (node, Some(err)),
        }
    }
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self {
            privileged: PortId::pkg(),
            show_privileged: false,
            check_maintainer: false,
            unmaintained: DEFAULT_UNMAINTAINED.to_string(),
            link: None,
        }
    }
}
