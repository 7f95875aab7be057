//! CLI entry point for gatenet
//!
//! Inspect, evaluate and derive equations from `.circuit` files.
//!
//! # Usage
//!
//! ```bash
//! gatenet info adder.circuit
//! gatenet eval adder.circuit --set 3f2a...=1 --set 9c41...=0
//! gatenet equation adder.circuit --output 77ab... --export adder.txt
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gatenet_core::{derive_equation, evaluate, Graph, NodeId, Skipped};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gatenet")]
#[command(about = "Logic-gate circuit inspection and evaluation", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node and connection counts
    Info {
        /// Path to .circuit file
        file: PathBuf,
    },

    /// Evaluate every output node
    Eval {
        /// Path to .circuit file
        file: PathBuf,

        /// Override an input value, e.g. `--set <id>=1`
        #[arg(long = "set", value_parser = parse_assignment)]
        assignments: Vec<(NodeId, bool)>,
    },

    /// Derive the boolean equation feeding output nodes
    Equation {
        /// Path to .circuit file
        file: PathBuf,

        /// Only this output node
        #[arg(long)]
        output: Option<String>,

        /// Override an input value, e.g. `--set <id>=1`
        #[arg(long = "set", value_parser = parse_assignment)]
        assignments: Vec<(NodeId, bool)>,

        /// Write the value and equation of the output to a text file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

/// Parse `ID=0|1`.
fn parse_assignment(text: &str) -> std::result::Result<(NodeId, bool), String> {
    let (id, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ID=0|1, got `{text}`"))?;
    let value = match value.trim() {
        "1" => true,
        "0" => false,
        other => return Err(format!("expected 0 or 1, got `{other}`")),
    };
    Ok((NodeId::from(id.trim()), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { file } => info(&file),
        Commands::Eval { file, assignments } => eval(&file, &assignments),
        Commands::Equation {
            file,
            output,
            assignments,
            export,
        } => equation(&file, output.map(NodeId::from), &assignments, export.as_deref()),
    }
}

fn load(file: &Path, assignments: &[(NodeId, bool)]) -> Result<Graph> {
    let (mut graph, report) = gatenet_serde::load_circuit(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    for skipped in &report.skipped {
        warn!("{}", describe(skipped));
    }
    for (id, value) in assignments {
        graph
            .set_input_value(id, *value)
            .with_context(|| format!("cannot set {id}"))?;
    }
    debug!(nodes = graph.node_count(), "loaded circuit");
    Ok(graph)
}

fn describe(skipped: &Skipped) -> String {
    match skipped {
        Skipped::UnknownKind { id, kind } => format!("node {id}: unknown type {kind}"),
        Skipped::DuplicateNode { id } => format!("node {id}: duplicate id"),
        Skipped::NodeLimit { id } => format!("node {id}: node limit reached"),
        Skipped::MissingNode(c) => {
            format!("connection {} -> {}: missing node", c.source_node, c.dest_node)
        }
        Skipped::SocketOutOfRange(c) => format!(
            "connection {}:{} -> {}:{}: socket out of range",
            c.source_node, c.source_socket, c.dest_node, c.dest_socket
        ),
        Skipped::Rejected { record, reason } => format!(
            "connection {} -> {}: {reason}",
            record.source_node, record.dest_node
        ),
    }
}

fn info(file: &Path) -> Result<()> {
    let (graph, report) = gatenet_serde::load_circuit(file)
        .with_context(|| format!("failed to load {}", file.display()))?;

    println!("{}", file.display());
    println!("  nodes:       {}", graph.node_count());
    println!("  connections: {}", graph.connection_count());
    for node in graph.nodes() {
        println!(
            "  {:<38} {:<16} ({}, {})",
            node.id(),
            node.kind().type_name(),
            node.position().x,
            node.position().y
        );
    }
    if !report.is_clean() {
        println!("  skipped {} record(s):", report.skipped.len());
        for skipped in &report.skipped {
            println!("    {}", describe(skipped));
        }
    }
    Ok(())
}

fn eval(file: &Path, assignments: &[(NodeId, bool)]) -> Result<()> {
    let graph = load(file, assignments)?;
    let values = evaluate(&graph).context("evaluation failed")?;
    if values.is_empty() {
        println!("no output nodes");
    }
    for (id, value) in values {
        println!("{id} = {value}");
    }
    Ok(())
}

fn equation(
    file: &Path,
    output: Option<NodeId>,
    assignments: &[(NodeId, bool)],
    export: Option<&Path>,
) -> Result<()> {
    let graph = load(file, assignments)?;
    let outputs: Vec<NodeId> = match output {
        Some(id) => vec![id],
        None => graph.output_nodes().map(|n| n.id().clone()).collect(),
    };

    if let Some(path) = export {
        let [id] = outputs.as_slice() else {
            bail!(
                "--export needs exactly one output, found {}; pick one with --output",
                outputs.len()
            );
        };
        gatenet_serde::export_output(path, &graph, id)
            .with_context(|| format!("failed to export {id}"))?;
        println!("exported {id} to {}", path.display());
        return Ok(());
    }

    for id in &outputs {
        match derive_equation(&graph, id) {
            Ok(equation) => {
                println!("{id}: {equation}");
                for (node, label) in &equation.variables {
                    println!("  {label} = {node}");
                }
            }
            Err(err) => println!("{id}: {err}"),
        }
    }
    Ok(())
}
