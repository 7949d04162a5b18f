use anyhow::{Context, Result};
use clap::Subcommand;
use gridtrace::v1::{
    ConnectivityResult, Network, NetworkState, PhaseCode, SinglePhaseKind, TraceOptions, TreeNodeDocument,
    connectivity, trace,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::trace_args::{StateArg, TraceArgs, read_network};

#[derive(Subcommand, Debug)]
pub enum QueryOp {
    /// Phase paths between two terminals
    Connectivity {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Terminal mRID to start from
        #[arg(long)]
        terminal: String,

        /// Terminal mRID to reach
        #[arg(long)]
        other: String,

        /// Phases to carry (default: all phases of --terminal)
        #[arg(long)]
        phases: Option<PhaseCode>,
    },
    /// Phase paths to every terminal sharing a connectivity node
    Connected {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Terminal mRID
        #[arg(long)]
        terminal: String,

        /// Phases to carry (default: all phases of --terminal)
        #[arg(long)]
        phases: Option<PhaseCode>,
    },
    /// Equipment downstream of a piece of equipment
    Downstream {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Equipment mRID
        #[arg(long)]
        from: String,

        #[command(flatten)]
        trace: TraceArgs,
    },
    /// Assign feeders and list the feeders supplying each piece of equipment
    Feeders {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Network state to assign
        #[arg(long, value_enum, default_value = "normal")]
        state: StateArg,
    },
    /// Tree of equipment reached from a piece of equipment
    Tree {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Equipment mRID
        #[arg(long)]
        from: String,

        #[command(flatten)]
        trace: TraceArgs,
    },
}

pub fn run(op: QueryOp, pretty: bool) -> Result<()> {
    match op {
        QueryOp::Connectivity {
            input,
            terminal,
            other,
            phases,
        } => {
            let network = read_network(&input)?;
            let result = run_connectivity(&network, &terminal, &other, phases)?;
            print_json(&result, pretty)
        }
        QueryOp::Connected {
            input,
            terminal,
            phases,
        } => {
            let network = read_network(&input)?;
            let results = run_connected(&network, &terminal, phases)?;
            print_json(&results, pretty)
        }
        QueryOp::Downstream { input, from, trace } => {
            let mut network = read_network(&input)?;
            let below = run_downstream(&mut network, &from, &trace.resolve()?)?;
            print_json(&below, pretty)
        }
        QueryOp::Feeders { input, state } => {
            let mut network = read_network(&input)?;
            let feeders = run_feeders(&mut network, state.into())?;
            print_json(&feeders, pretty)
        }
        QueryOp::Tree { input, from, trace } => {
            let mut network = read_network(&input)?;
            let tree = run_tree(&mut network, &from, &trace.resolve()?)?;
            print_json(&tree, pretty)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// A connectivity result labelled with mRIDs.
#[derive(Debug, Serialize)]
struct ConnectivityView {
    from_terminal: String,
    to_terminal: String,
    paths: Vec<String>,
}

impl ConnectivityView {
    fn new(network: &Network, result: &ConnectivityResult) -> Self {
        Self {
            from_terminal: network.terminal(result.from_terminal).mrid.clone(),
            to_terminal: network.terminal(result.to_terminal).mrid.clone(),
            paths: result.nominal_phase_paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

fn include_phases(network: &Network, terminal: &str, phases: Option<PhaseCode>) -> Result<Vec<SinglePhaseKind>> {
    let carried = network.terminal_by_mrid(terminal)?.phases;
    Ok(phases.unwrap_or(carried).single_phases().to_vec())
}

fn run_connectivity(network: &Network, terminal: &str, other: &str, phases: Option<PhaseCode>) -> Result<ConnectivityView> {
    let from = network.terminal_by_mrid(terminal)?;
    let to = network.terminal_by_mrid(other)?;
    let include = include_phases(network, terminal, phases)?;

    let result = if from.equipment == to.equipment {
        connectivity::between(network, from.id, to.id, &include)
    } else {
        connectivity::terminal_connectivity(network, from.id, to.id, &include)
            .with_context(|| format!("Failed to resolve connectivity from {} to {}", terminal, other))?
    };
    Ok(ConnectivityView::new(network, &result))
}

fn run_connected(network: &Network, terminal: &str, phases: Option<PhaseCode>) -> Result<Vec<ConnectivityView>> {
    let from = network.terminal_by_mrid(terminal)?;
    let include = include_phases(network, terminal, phases)?;
    let results = connectivity::connected_terminals(network, from.id, &include)
        .with_context(|| format!("Failed to resolve connectivity from {}", terminal))?;
    Ok(results.iter().map(|r| ConnectivityView::new(network, r)).collect())
}

fn run_downstream(network: &mut Network, from: &str, options: &TraceOptions) -> Result<Vec<String>> {
    let from = network.equipment_by_mrid(from)?.id;
    trace::assign_directions(network, options.state).context("Failed to assign feeder directions")?;
    let below = trace::downstream_equipment(network, from, options).context("Downstream trace failed")?;
    Ok(below.iter().map(|id| network.equipment(*id).mrid.clone()).collect())
}

fn run_feeders(network: &mut Network, state: NetworkState) -> Result<BTreeMap<String, Vec<String>>> {
    trace::assign_directions(network, state).context("Failed to assign feeder directions")?;
    trace::assign_feeders(network, state).context("Failed to assign feeders")?;

    let network: &Network = network;
    Ok(network
        .all_equipment()
        .map(|eq| {
            let feeders = eq
                .feeders(state)
                .iter()
                .map(|f| network.feeder(*f).mrid.clone())
                .collect();
            (eq.mrid.clone(), feeders)
        })
        .collect())
}

fn run_tree(network: &mut Network, from: &str, options: &TraceOptions) -> Result<Vec<TreeNodeDocument>> {
    let from = network.equipment_by_mrid(from)?.id;
    if options.direction.is_some() {
        trace::assign_directions(network, options.state).context("Failed to assign feeder directions")?;
    }
    let tree = trace::equipment_tree(network, from, options).context("Tree trace failed")?;
    Ok(tree.to_document(network))
}
