//! Build-and-render for one port, and the batch run over a whole ports tree.

use std::path::PathBuf;

use crate::core::depends::{DependencyKind, MaxDepth};
use crate::core::port::{FlavoredName, PortId};
use crate::error::Result;
use crate::graph::builder::{BuildWarning, GraphBuilder};
use crate::graph::style::StylePolicy;
use crate::graph::viz::RankDir;
use crate::graph::PortGraph;
use crate::oracle::DependencyOracle;
use crate::render::{GraphRenderer, RenderRequest};
use crate::util::parallel;

/// Per-invocation choices shared by every port of a run.
#[derive(Debug, Clone)]
pub struct GraphRequest {
    pub flavor: Option<String>,
    pub kinds: Vec<DependencyKind>,
    pub max_depth: MaxDepth,
    pub output_dir: PathBuf,
    pub format: String,
    pub rankdir: RankDir,
    pub clean: bool,
}

impl GraphRequest {
    pub fn root_for(&self, port: &PortId) -> FlavoredName {
        FlavoredName::new(port.clone(), self.flavor.clone())
    }

    /// `name`, or `name@flavor` when a flavor was requested.
    pub fn graph_name(&self, port: &PortId) -> String {
        match self.flavor.as_deref().filter(|flavor| !flavor.is_empty()) {
            Some(flavor) => format!("{}@{}", port.name(), flavor),
            None => port.name().to_string(),
        }
    }

    pub fn source_path(&self, port: &PortId) -> PathBuf {
        self.output_dir
            .join(port.category())
            .join(self.graph_name(port))
    }
}

#[derive(Debug)]
pub struct Rendered {
    pub port: PortId,
    pub artifact: PathBuf,
    pub warnings: Vec<BuildWarning>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<Rendered>,
    pub failed: Vec<(PortId, crate::error::PortgraphError)>,
}

pub struct Driver<'a, O: DependencyOracle + ?Sized, R: GraphRenderer + ?Sized> {
    oracle: &'a O,
    renderer: &'a R,
    policy: &'a StylePolicy,
    request: &'a GraphRequest,
}

impl<'a, O, R> Driver<'a, O, R>
where
    O: DependencyOracle + ?Sized,
    R: GraphRenderer + ?Sized,
{
    pub fn new(
        oracle: &'a O,
        renderer: &'a R,
        policy: &'a StylePolicy,
        request: &'a GraphRequest,
    ) -> Self {
        Self {
            oracle,
            renderer,
            policy,
            request,
        }
    }

    pub fn build(&self, port: &PortId) -> (PortGraph, Vec<BuildWarning>) {
        let outcome = GraphBuilder::new(self.oracle, self.policy).build_passes(
            &self.request.root_for(port),
            &self.request.kinds,
            self.request.max_depth,
        );
        (outcome.graph, outcome.warnings)
    }

    pub fn render_port(&self, port: &PortId) -> Result<Rendered> {
        let (graph, warnings) = self.build(port);
        let render_request = RenderRequest {
            name: self.request.graph_name(port),
            source_path: self.request.source_path(port),
            rankdir: self.request.rankdir,
            format: self.request.format.clone(),
            keep_source: !self.request.clean,
        };
        let artifact = self.renderer.render(&graph, &render_request)?;
        Ok(Rendered {
            port: port.clone(),
            artifact,
            warnings,
        })
    }

    /// Renders every port independently. A failing port is recorded and the
    /// rest of the batch carries on. `on_done` sees each result as it lands.
    pub fn render_all<F>(&self, ports: Vec<PortId>, jobs: Option<usize>, on_done: F) -> BatchReport
    where
        F: Fn(&PortId, &Result<Rendered>) + Send + Sync,
    {
        let results = parallel::map_items(ports, jobs, |port| {
            let result = self.render_port(&port);
            on_done(&port, &result);
            (port, result)
        });

        let mut report = BatchReport::default();
        for (port, result) in results {
            match result {
                Ok(rendered) => report.rendered.push(rendered),
                Err(err) => report.failed.push((port, err)),
            }
        }
        report
    }
}
