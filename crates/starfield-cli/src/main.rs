use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use starfield_cli::args::ConnectionArg;
use starfield_cli::output::{AlignReport, ClosestReport, MinJumpReport, OutputFormat, Report};
use starfield_lib::{
    load_anchors, load_real_universe, load_universe, min_jump_range, write_universe,
    AlignmentConfig, AnchorMatching, ClosestQuery, Graph, RouteSummary, Universe,
    UniverseCreator,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Starfield jump routes and catalog alignment")]
struct Cli {
    /// Output format for command results.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortest jump path between two systems.
    Route(RouteArgs),
    /// Systems ordered by distance from a given system.
    Closest(ClosestArgs),
    /// Smallest jump range that connects two systems.
    MinJump(MinJumpArgs),
    /// Align a real star catalog onto a fictional universe.
    Align(AlignArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Universe CSV (`name,x,y,z[,quality]`).
    #[arg(long)]
    universe: PathBuf,
    /// Maximum distance covered by a single jump.
    #[arg(long)]
    jump_range: f64,
    /// Starting system name.
    #[arg(long = "from")]
    from: String,
    /// Destination system name.
    #[arg(long = "to")]
    to: String,
    /// Extra connection `<a>,<b>,<weight>`; may be repeated.
    #[arg(long = "connection")]
    connections: Vec<ConnectionArg>,
}

#[derive(Args, Debug)]
struct ClosestArgs {
    /// Universe CSV (`name,x,y,z[,quality]`).
    #[arg(long)]
    universe: PathBuf,
    /// System to measure from.
    #[arg(long)]
    system: String,
    /// Jump range used to flag direct neighbours.
    #[arg(long, default_value_t = 0.0)]
    jump_range: f64,
    /// Number of systems to list.
    #[arg(long, conflicts_with = "all")]
    limit: Option<usize>,
    /// List every other system.
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct MinJumpArgs {
    /// Universe CSV (`name,x,y,z[,quality]`).
    #[arg(long)]
    universe: PathBuf,
    #[arg(long = "from")]
    from: String,
    #[arg(long = "to")]
    to: String,
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Real star catalog CSV (`catalog_id,x,y,z`).
    #[arg(long)]
    catalog: PathBuf,
    /// Fictional universe CSV holding the anchor systems.
    #[arg(long)]
    fiction: PathBuf,
    /// Explicit anchor pairs CSV (`catalog_id,system[,weight]`).
    #[arg(long)]
    anchors: Option<PathBuf>,
    /// Alignment configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    max_iterations: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Destination for the aligned universe CSV; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route(args) => handle_route(&args, cli.format),
        Command::Closest(args) => handle_closest(&args, cli.format),
        Command::MinJump(args) => handle_min_jump(&args, cli.format),
        Command::Align(args) => handle_align(&args, cli.format),
    }
}

fn handle_route(args: &RouteArgs, format: OutputFormat) -> Result<()> {
    let universe = read_universe(&args.universe)?;
    let mut graph = Graph::new(&universe, args.jump_range)
        .with_context(|| format!("failed to build graph with jump range {}", args.jump_range))?;
    for connection in &args.connections {
        graph
            .add_connection(&connection.from, &connection.to, connection.weight)
            .with_context(|| {
                format!(
                    "failed to add connection {} -> {}",
                    connection.from, connection.to
                )
            })?;
    }

    let start = graph.node_index_by_name(&args.from)?;
    let destination = graph.node_index_by_name(&args.to)?;
    let Some(path) = graph.jump_path_between(start, destination)? else {
        bail!("no route found from {} to {}", args.from, args.to);
    };

    let summary = RouteSummary::from_path(&graph, &path)?;
    print_report(&summary, format)
}

fn handle_closest(args: &ClosestArgs, format: OutputFormat) -> Result<()> {
    let universe = read_universe(&args.universe)?;
    let graph = Graph::new(&universe, args.jump_range)
        .with_context(|| format!("failed to build graph with jump range {}", args.jump_range))?;

    let query = match (args.all, args.limit) {
        (true, _) => ClosestQuery::all(),
        (false, Some(limit)) => ClosestQuery::nearest(limit),
        (false, None) => ClosestQuery::default(),
    };
    let origin = graph.node_index_by_name(&args.system)?;
    let closest = graph.get_closest_with(&args.system, &query)?;

    print_report(&ClosestReport::new(&graph, origin, &closest), format)
}

fn handle_min_jump(args: &MinJumpArgs, format: OutputFormat) -> Result<()> {
    let universe = read_universe(&args.universe)?;
    let range = min_jump_range(&universe, &args.from, &args.to)?;
    let report = MinJumpReport {
        from: args.from.clone(),
        to: args.to.clone(),
        min_jump_range: range,
    };
    print_report(&report, format)
}

fn handle_align(args: &AlignArgs, format: OutputFormat) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AlignmentConfig::from_path(path)
            .with_context(|| format!("failed to load alignment config {}", path.display()))?,
        None => AlignmentConfig::default(),
    };
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(path) = &args.anchors {
        let pairs = load_anchors(path)
            .with_context(|| format!("failed to load anchors from {}", path.display()))?;
        config.anchor_matching = AnchorMatching::Explicit { pairs };
    }

    let catalog = load_real_universe(&args.catalog)
        .with_context(|| format!("failed to load catalog from {}", args.catalog.display()))?;
    let fiction = read_universe(&args.fiction)?;

    let mut creator = UniverseCreator::new(catalog, &fiction, config)
        .context("failed to prepare catalog alignment")?;
    let aligned = creator.run_to_completion();
    let report = AlignReport::new(&creator, aligned.len());
    info!(
        iteration = report.iterations,
        best_cost = report.best_cost,
        "alignment complete"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_universe(&aligned, file)?;
            print_report(&report, format)
        }
        None => {
            write_universe(&aligned, io::stdout().lock())?;
            Ok(())
        }
    }
}

fn read_universe(path: &Path) -> Result<Universe> {
    load_universe(path).with_context(|| format!("failed to load universe from {}", path.display()))
}

fn print_report<R: Report>(report: &R, format: OutputFormat) -> Result<()> {
    let rendered = report.render(format)?;
    io::stdout().lock().write_all(rendered.as_bytes())?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
