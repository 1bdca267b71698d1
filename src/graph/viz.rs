use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::depends::DependencyKind;
use crate::graph::{NodeStyle, PortGraph};

pub const DEFAULT_FILL_COLOR: &str = "#E1E1E1";
pub const DEFAULT_FONT_COLOR: &str = "#737373";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDir {
    #[default]
    LeftRight,
    RightLeft,
    TopBottom,
    BottomTop,
}

impl FromStr for RankDir {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_uppercase().as_str() {
            "LR" => Ok(RankDir::LeftRight),
            "RL" => Ok(RankDir::RightLeft),
            "TB" => Ok(RankDir::TopBottom),
            "BT" => Ok(RankDir::BottomTop),
            _ => Err(format!(
                "unknown layout direction '{}' (expected LR, RL, TB or BT)",
                input
            )),
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RankDir::LeftRight => "LR",
            RankDir::RightLeft => "RL",
            RankDir::TopBottom => "TB",
            RankDir::BottomTop => "BT",
        };
        f.write_str(value)
    }
}

pub fn render_dot(graph: &PortGraph, name: &str, rankdir: RankDir) -> String {
    let mut out = format!("digraph \"{}\" {{\n", escape_dot(name));
    out.push_str(&format!("  graph [rankdir={}];\n", rankdir));
    out.push_str(&format!(
        "  node [fillcolor=\"{}\", fontcolor=\"{}\", style=filled];\n",
        DEFAULT_FILL_COLOR, DEFAULT_FONT_COLOR
    ));
    for node in graph.nodes() {
        let mut attrs = Vec::new();
        if let Some(url) = &node.url {
            attrs.push(format!("URL=\"{}\"", escape_dot(url)));
        }
        attrs.push(format!("color={}", node.style.color()));
        attrs.push(format!("style={}", node.style.dot_style()));
        out.push_str(&format!(
            "  \"{}\" [{}];\n",
            escape_dot(&node.port.to_string()),
            attrs.join(", ")
        ));
    }
    for (from, to, kind) in graph.edges() {
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [color=\"{}\"];\n",
            escape_dot(&from.to_string()),
            escape_dot(&to.to_string()),
            kind.color()
        ));
    }
    out.push_str("}\n");
    out
}

#[derive(Debug, Serialize)]
pub struct GraphJson {
    pub name: String,
    pub nodes: Vec<NodeJson>,
    pub edges: Vec<EdgeJson>,
}

#[derive(Debug, Serialize)]
pub struct NodeJson {
    pub port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub style: NodeStyle,
}

#[derive(Debug, Serialize)]
pub struct EdgeJson {
    pub from: String,
    pub to: String,
    pub kind: DependencyKind,
    pub color: &'static str,
}

pub fn graph_to_json(graph: &PortGraph, name: &str) -> GraphJson {
    GraphJson {
        name: name.to_string(),
        nodes: graph
            .nodes()
            .map(|node| NodeJson {
                port: node.port.to_string(),
                url: node.url.clone(),
                style: node.style,
            })
            .collect(),
        edges: graph
            .edges()
            .map(|(from, to, kind)| EdgeJson {
                from: from.to_string(),
                to: to.to_string(),
                kind,
                color: kind.color(),
            })
            .collect(),
    }
}

fn escape_dot(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
