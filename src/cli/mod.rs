use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{load_config, resolve_config_path, Overrides, Settings};
use crate::core::depends::{DependencyKind, MaxDepth};
use crate::core::port::{FlavoredName, PortId};
use crate::core::tree::PortsTree;
use crate::driver::{Driver, GraphRequest};
use crate::error::{PortgraphError, Result};
use crate::graph::builder::BuildWarning;
use crate::graph::style::{NodeLink, StylePolicy};
use crate::graph::viz::graph_to_json;
use crate::oracle::MakeOracle;
use crate::render::GraphvizRenderer;
use crate::util::{output, parallel};

#[derive(Parser, Debug)]
#[command(name = "portgraph")]
#[command(
    about = "Produce a graph representing the dependencies needed for a given port",
    long_about = None
)]
pub struct Cli {
    /// Print each port as it is expanded
    #[arg(short, long)]
    pub verbose: bool,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Where the ports tree lives (/usr/ports by default)
    #[arg(short, long, env = "PORTGRAPH_LOCALBASE")]
    pub localbase: Option<PathBuf>,
    /// The port to graph, `category/name` or `category/name@flavor`
    #[arg(short, long, default_value = "ports-mgmt/portgraph")]
    pub port: String,
    #[arg(short, long)]
    pub flavor: Option<String>,
    /// Maximum recursion, -1 for none
    #[arg(short = 'c', long, default_value_t = -1, allow_negative_numbers = true)]
    pub recursion: i64,
    /// Link every node to <URL>category/name<SUFFIX>
    #[arg(short, long)]
    pub url: Option<String>,
    #[arg(short = 's', long = "url-suffix")]
    pub url_suffix: Option<String>,
    /// Draw ports-mgmt/pkg, which nearly every port needs and is hidden by default
    #[arg(short, long)]
    pub with_pkg: bool,
    /// Graph every port of the tree
    #[arg(short, long)]
    pub all: bool,
    /// Follow build dependencies (the default when neither -b nor -r is given)
    #[arg(short, long)]
    pub build: bool,
    /// Follow run dependencies
    #[arg(short, long)]
    pub run: bool,
    /// Highlight ports without a maintainer
    #[arg(short = 't', long)]
    pub abandoned: bool,
    /// Delete the DOT source after rendering
    #[arg(short = 'C', long)]
    pub clean: bool,
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Graphviz output format; `dot` writes only the source
    #[arg(long)]
    pub format: Option<String>,
    /// Layout direction: LR, RL, TB or BT
    #[arg(long)]
    pub rankdir: Option<String>,
    /// Print the graph as JSON instead of rendering it
    #[arg(long, conflicts_with = "all")]
    pub json: bool,
    #[arg(long)]
    pub parallel: Option<usize>,
}

pub fn run() {
    let cli = Cli::parse();
    output::configure(cli.verbose, cli.quiet, cli.no_color);
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let location = resolve_config_path(cli.config.clone());
    let file = load_config(location.as_ref())?;
    let settings = Settings::resolve(
        &file,
        &Overrides {
            localbase: cli.localbase.clone(),
            format: cli.format.clone(),
            rankdir: cli.rankdir.clone(),
            output_dir: cli.output_dir.clone(),
        },
    )?;

    let target: FlavoredName = cli.port.parse()?;
    let flavor = cli
        .flavor
        .clone()
        .filter(|flavor| !flavor.is_empty())
        .or_else(|| target.flavor().map(str::to_string));

    let policy = StylePolicy {
        privileged: settings.privileged.clone(),
        show_privileged: cli.with_pkg,
        check_maintainer: cli.abandoned,
        unmaintained: settings.unmaintained.clone(),
        link: cli.url.clone().map(|prefix| NodeLink {
            prefix,
            suffix: cli.url_suffix.clone().unwrap_or_default(),
        }),
    };
    let request = GraphRequest {
        flavor,
        kinds: DependencyKind::selected(cli.build, cli.run),
        max_depth: MaxDepth::from_signed(cli.recursion),
        output_dir: settings.output_dir.clone(),
        format: settings.format.clone(),
        rankdir: settings.rankdir,
        clean: cli.clean,
    };

    let tree = PortsTree::new(&settings.localbase);
    let oracle = MakeOracle::new(tree.clone(), settings.make_command.clone());
    let renderer = GraphvizRenderer::new(settings.dot_command.clone());
    let driver = Driver::new(&oracle, &renderer, &policy, &request);

    if cli.all {
        handle_all(&driver, &tree, &settings, cli.parallel)
    } else if cli.json {
        handle_json(&driver, &request, target.port())
    } else {
        handle_port(&driver, target.port())
    }
}

fn handle_port(driver: &Driver<'_, MakeOracle, GraphvizRenderer>, port: &PortId) -> Result<()> {
    let rendered = driver.render_port(port)?;
    report_warnings(port, &rendered.warnings);
    output::info(&format!("wrote {}", rendered.artifact.display()));
    Ok(())
}

fn handle_json(
    driver: &Driver<'_, MakeOracle, GraphvizRenderer>,
    request: &GraphRequest,
    port: &PortId,
) -> Result<()> {
    let (graph, warnings) = driver.build(port);
    report_warnings(port, &warnings);
    let json = serde_json::to_string_pretty(&graph_to_json(&graph, &request.graph_name(port)))
        .map_err(|err| PortgraphError::Other(anyhow::Error::new(err)))?;
    println!("{}", json);
    Ok(())
}

fn handle_all(
    driver: &Driver<'_, MakeOracle, GraphvizRenderer>,
    tree: &PortsTree,
    settings: &Settings,
    jobs: Option<usize>,
) -> Result<()> {
    let listing = tree
        .list_ports(&settings.excluded_dirs)
        .with_context(|| format!("failed to list ports under {}", tree.root.display()))?;
    for (category, err) in &listing.unreadable {
        output::warn(&format!("skipping category {}: {}", category, err));
    }
    let ports = listing.ports;
    let total = ports.len();

    let progress = batch_progress(total);
    let report = driver.render_all(ports, parallel::resolve_jobs(jobs), |port, result| {
        if let Err(err) = result {
            progress.suspend(|| output::warn(&format!("{}: {}", port, err)));
        }
        progress.inc(1);
    });
    progress.finish_and_clear();

    for rendered in &report.rendered {
        report_warnings(&rendered.port, &rendered.warnings);
    }
    output::info(&format!(
        "rendered {} of {} ports",
        report.rendered.len(),
        total
    ));

    if report.failed.is_empty() {
        return Ok(());
    }
    for (port, err) in &report.failed {
        output::error(&format!("failed: {} ({})", port, err));
    }
    Err(PortgraphError::Other(anyhow::anyhow!(
        "{} of {} ports failed",
        report.failed.len(),
        total
    )))
}

fn batch_progress(total: usize) -> ProgressBar {
    if output::is_quiet() || output::is_verbose() {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} ports {msg}") {
        progress.set_style(style);
    }
    progress
}

fn report_warnings(port: &PortId, warnings: &[BuildWarning]) {
    for warning in warnings {
        output::warn(&format!("{}: {}", port, warning));
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::Cli;

    #[test]
    fn defaults_follow_the_classic_flags() {
        let cli = Cli::try_parse_from(["portgraph"]).expect("parse defaults");
        assert_eq!(cli.port, "ports-mgmt/portgraph");
        assert_eq!(cli.recursion, -1);
        assert!(!cli.build && !cli.run && !cli.all && !cli.with_pkg);
    }

    #[test]
    fn short_flags_parse() {
        let cli = Cli::try_parse_from([
            "portgraph", "-l", "/srv/ports", "-p", "editors/vim", "-f", "gtk3", "-c", "2", "-b",
            "-r", "-w", "-t", "-C", "-u", "https://example.org/", "-s", ".svg",
        ])
        .expect("parse flags");
        assert_eq!(cli.localbase.as_deref(), Some(std::path::Path::new("/srv/ports")));
        assert_eq!(cli.flavor.as_deref(), Some("gtk3"));
        assert_eq!(cli.recursion, 2);
        assert!(cli.build && cli.run && cli.with_pkg && cli.abandoned && cli.clean);
        assert_eq!(cli.url_suffix.as_deref(), Some(".svg"));
    }

    #[test]
    fn negative_recursion_is_accepted() {
        let cli = Cli::try_parse_from(["portgraph", "-c", "-1"]).expect("parse negative depth");
        assert_eq!(cli.recursion, -1);
    }

    #[test]
    fn json_conflicts_with_batch_mode() {
        assert!(Cli::try_parse_from(["portgraph", "--all", "--json"]).is_err());
    }
}
