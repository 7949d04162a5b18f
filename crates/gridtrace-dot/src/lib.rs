//! Generate Graphviz DOT visualizations from gridtrace equipment trees.
//!
//! Renders an [`EquipmentTree`] as a Graphviz DOT digraph. Tree nodes become
//! graph nodes, parent/child links become edges, and equipment kinds are
//! color-coded (red for sources, grey for switches, blue for lines, orange
//! for transformers). Open switches are drawn with dashed borders.
//!
//! # Example
//!
//! ```
//! use gridtrace::v1::*;
//! use gridtrace_dot::{render_tree, RenderOptions};
//!
//! let network = Network::from_document(
//!     &NetworkDocument::new()
//!         .with_equipment(EquipmentSpec::new("src", EquipmentKind::EnergySource).with_terminal(PhaseCode::ABC, "n0"))
//!         .with_equipment(
//!             EquipmentSpec::new("line", EquipmentKind::AcLineSegment)
//!                 .with_terminal(PhaseCode::ABC, "n0")
//!                 .with_terminal(PhaseCode::ABC, "n1"),
//!         ),
//! )
//! .unwrap();
//!
//! let src = network.equipment_by_mrid("src").unwrap().id;
//! let tree = trace::equipment_tree(&network, src, &TraceOptions::default()).unwrap();
//!
//! let dot = render_tree(&network, &tree, &RenderOptions::default());
//! assert!(dot.contains("digraph gridtrace"));
//! assert!(dot.contains("\"n0\" -> \"n1\""));
//! ```
//!
//! Pipe the output through Graphviz to produce images:
//!
//! ```bash
//! gridtrace render dot -i network.json --from cb1 | dot -Tpng -o feeder.png
//! ```

use gridtrace::v1::{Equipment, EquipmentKind, EquipmentTree, Network, NetworkState, TreeNode};

/// Options controlling what information is rendered in the DOT output.
pub struct RenderOptions {
    /// List the phases of each terminal under the equipment name.
    pub show_phases: bool,
    /// Render switches open in `state` with dashed borders.
    pub highlight_open: bool,
    /// Which switch state decides whether a switch is open.
    pub state: NetworkState,
    /// Graph title drawn above the tree.
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_phases: false,
            highlight_open: true,
            state: NetworkState::Normal,
            title: None,
        }
    }
}

/// Render an [`EquipmentTree`] as a DOT digraph.
pub fn render_tree(network: &Network, tree: &EquipmentTree, options: &RenderOptions) -> String {
    let mut dot = String::new();
    dot.push_str("digraph gridtrace {\n");
    dot.push_str("  rankdir=TB;\n");
    if let Some(title) = &options.title {
        dot.push_str(&format!("  label=\"{}\";\n", escape_dot(title)));
        dot.push_str("  labelloc=t;\n");
    }
    dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
    dot.push_str("  edge [color=\"#666666\"];\n\n");

    for node in tree.nodes() {
        let equipment = network.equipment(node.equipment);
        let label = format_label_html(network, equipment, options);
        let color = kind_color(&equipment.kind);
        let is_open = options.highlight_open && network.is_open(equipment.id, options.state);
        let is_root = node.parent.is_none();

        let mut style = "rounded,filled".to_string();
        let mut penwidth = "1";
        if is_root {
            style = "rounded,filled,bold".to_string();
            penwidth = "2";
        }
        if is_open {
            style = format!("{},dashed", style);
        }

        dot.push_str(&format!(
            "  \"{}\" [label={}, fillcolor=\"{}\", style=\"{}\", penwidth={}];\n",
            node_id(node),
            label,
            color,
            style,
            penwidth
        ));
    }

    dot.push('\n');

    for node in tree.nodes() {
        for child in &node.children {
            dot.push_str(&format!("  \"{}\" -> \"{}\";\n", node_id(node), node_id(tree.node(*child))));
        }
    }

    dot.push_str("}\n");
    dot
}

fn node_id(node: &TreeNode) -> String {
    format!("n{}", node.id.0)
}

fn format_label_html(network: &Network, equipment: &Equipment, options: &RenderOptions) -> String {
    let mut rows = vec![format!("<b>{}</b>", escape_html(&equipment.mrid))];

    if let Some(name) = &equipment.name {
        rows.push(format!("<font point-size=\"10\">{}</font>", escape_html(name)));
    }
    rows.push(format!(
        "<font point-size=\"9\" color=\"#666666\">{}</font>",
        equipment.kind.label()
    ));

    if options.show_phases && !equipment.terminals.is_empty() {
        let phases: Vec<String> = equipment
            .terminals
            .iter()
            .map(|t| network.terminal(*t).phases.to_string())
            .collect();
        rows.push(format!(
            "<font point-size=\"9\" face=\"monospace\">{}</font>",
            escape_html(&phases.join(" | "))
        ));
    }

    format!("<{}>", rows.join("<br/>"))
}

/// Fill color for an equipment kind.
pub fn kind_color(kind: &EquipmentKind) -> &'static str {
    match kind {
        EquipmentKind::EnergySource => "#f8d7da",
        EquipmentKind::Junction => "#f8f9fa",
        EquipmentKind::AcLineSegment => "#cce5ff",
        EquipmentKind::Switch { .. } => "#e2e3e5",
        EquipmentKind::PowerTransformer => "#ffe5b4",
        EquipmentKind::ShuntCompensator { .. } => "#e2d5f1",
        EquipmentKind::EnergyConsumer => "#d4edda",
    }
}

/// Escape a string for use inside a DOT double-quoted string.
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a string for use inside HTML-like DOT labels.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
