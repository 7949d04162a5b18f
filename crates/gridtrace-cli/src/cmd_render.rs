use anyhow::{Context, Result};
use clap::Subcommand;
use gridtrace::v1::{TraceOptions, trace};
use gridtrace_dot::RenderOptions;
use std::path::PathBuf;

use crate::trace_args::{TraceArgs, read_network};

#[derive(Subcommand, Debug)]
pub enum RenderFormat {
    /// Render the equipment tree reached from a piece of equipment as Graphviz DOT
    Dot {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Equipment mRID to trace from
        #[arg(long)]
        from: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List terminal phases on each node
        #[arg(long)]
        show_phases: bool,

        /// Draw open switches like closed ones
        #[arg(long)]
        no_highlight_open: bool,

        /// Graph title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        trace: TraceArgs,
    },
}

pub fn run(format: RenderFormat) -> Result<()> {
    match format {
        RenderFormat::Dot {
            input,
            from,
            output,
            show_phases,
            no_highlight_open,
            title,
            trace,
        } => {
            let options = trace.resolve()?;
            let render_options = RenderOptions {
                show_phases,
                highlight_open: !no_highlight_open,
                state: options.state,
                title,
            };
            let dot = render_dot(input, &from, &options, &render_options)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &dot).with_context(|| format!("Failed to write {:?}", path))?;
                    tracing::debug!(path = ?path, "wrote DOT output");
                }
                None => print!("{}", dot),
            }
            Ok(())
        }
    }
}

fn render_dot(
    input: PathBuf,
    from: &str,
    options: &TraceOptions,
    render_options: &RenderOptions,
) -> Result<String> {
    let mut network = read_network(&input)?;
    let from = network.equipment_by_mrid(from)?.id;
    if options.direction.is_some() {
        trace::assign_directions(&mut network, options.state).context("Failed to assign feeder directions")?;
    }
    let tree = trace::equipment_tree(&network, from, options).context("Tree trace failed")?;
    Ok(gridtrace_dot::render_tree(&network, &tree, render_options))
}
