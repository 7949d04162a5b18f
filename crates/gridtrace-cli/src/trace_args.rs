//! Trace options shared by the commands that run network traces.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use gridtrace::v1::{ActionType, FeederDirection, Network, NetworkState, QueueOrder, TraceOptions};
use std::path::{Path, PathBuf};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateArg {
    Normal,
    Current,
}

impl From<StateArg> for NetworkState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Normal => NetworkState::Normal,
            StateArg::Current => NetworkState::Current,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderArg {
    DepthFirst,
    BreadthFirst,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionArg {
    Upstream,
    Downstream,
}

#[derive(Args, Debug, Default)]
pub struct TraceArgs {
    /// JSON file with trace options; flags below override it
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Network state to trace
    #[arg(long, value_enum)]
    pub state: Option<StateArg>,

    /// Queue order
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Explore each alternative as its own branch
    #[arg(long)]
    pub branching: bool,

    /// Run actions only on the first step into each piece of equipment
    #[arg(long)]
    pub first_step_on_equipment: bool,

    /// Stop steps this far from the start
    #[arg(long)]
    pub step_limit: Option<usize>,

    /// Only follow this feeder direction
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Trace through open switches
    #[arg(long)]
    pub through_open: bool,
}

impl TraceArgs {
    /// Options from `--options` (or the defaults) with flags applied on top.
    pub fn resolve(&self) -> Result<TraceOptions> {
        let mut options = match &self.options {
            Some(path) => read_options(path)?,
            None => TraceOptions::default(),
        };
        if let Some(state) = self.state {
            options.state = state.into();
        }
        if let Some(order) = self.order {
            options.order = match order {
                OrderArg::DepthFirst => QueueOrder::DepthFirst,
                OrderArg::BreadthFirst => QueueOrder::BreadthFirst,
            };
        }
        if self.branching {
            options.branching = true;
        }
        if self.first_step_on_equipment {
            options.action_type = ActionType::FirstStepOnEquipment;
        }
        if let Some(limit) = self.step_limit {
            options.step_limit = Some(limit);
        }
        if let Some(direction) = self.direction {
            options.direction = Some(match direction {
                DirectionArg::Upstream => FeederDirection::Upstream,
                DirectionArg::Downstream => FeederDirection::Downstream,
            });
        }
        if self.through_open {
            options.stop_at_open = false;
        }
        Ok(options)
    }
}

fn read_options(path: &Path) -> Result<TraceOptions> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    TraceOptions::from_json(&content).with_context(|| format!("Failed to parse {:?}", path))
}

pub fn read_network(path: &Path) -> Result<Network> {
    Network::load(path).with_context(|| format!("Failed to load network {:?}", path))
}
