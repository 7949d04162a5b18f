#![doc = include_str!("../README.md")]

mod connectivity;
mod error;
mod network;
mod phase;
mod trace;
mod traversal;

pub use error::{Error, Result};

pub mod v1 {
    //! Versioned public API for network traversal and phase connectivity.
    //!
    //! Everything you need is re-exported from this module. Types are organized
    //! into four groups:
    //!
    //! # Network model
    //!
    //! - [`Network`]: arena of equipment, terminals, connectivity nodes and feeders
    //! - [`NetworkDocument`], [`EquipmentSpec`], [`TerminalSpec`], [`FeederSpec`]: the JSON form
    //! - [`EquipmentKind`]: the equipment kinds connectivity distinguishes
    //! - [`NetworkState`]: normal (designed) or current (as-operated)
    //! - [`FeederDirection`]: per-terminal direction of supply
    //!
    //! # Phases and connectivity
    //!
    //! - [`SinglePhaseKind`], [`PhaseCode`], [`NominalPhasePath`]
    //! - [`connectivity::between`]: phase paths through one piece of equipment
    //! - [`connectivity::connected_terminals`]: phase paths across a connectivity node
    //! - [`XyCandidatePhasePaths`]: resolution of `X`/`Y` lateral markers
    //!
    //! # Traversal engine
    //!
    //! - [`Traversal`]: generic walk over any item type
    //! - [`QueueType`], [`QueueOrder`]: how successors are found and ordered
    //! - [`StopCondition`], [`QueueCondition`], [`StepAction`], [`VisitTracker`],
    //!   [`ContextValueComputer`]: the pluggable parts
    //! - [`StepContext`]: what each callback learns about the current step
    //!
    //! # Network traces
    //!
    //! - [`NetworkTrace`], [`NetworkTraceStep`], [`StepPath`], [`TraceOptions`]
    //! - [`EquipmentTreeBuilder`], [`EquipmentTree`]
    //! - [`trace::assign_directions`], [`trace::assign_feeders`],
    //!   [`trace::downstream_equipment`], [`trace::equipment_tree`]
    //!
    //! # Example: phases through a transformer
    //!
    //! ```
    //! use gridtrace::v1::*;
    //!
    //! let network = Network::from_document(
    //!     &NetworkDocument::new().with_equipment(
    //!         EquipmentSpec::new("tx", EquipmentKind::PowerTransformer)
    //!             .with_terminal(PhaseCode::ABC, "hv")
    //!             .with_terminal(PhaseCode::ABCN, "lv"),
    //!     ),
    //! )
    //! .unwrap();
    //!
    //! let tx = network.equipment_by_mrid("tx").unwrap();
    //! let result = connectivity::between_all(&network, tx.terminals[0], tx.terminals[1]);
    //! assert!(result
    //!     .nominal_phase_paths
    //!     .contains(&NominalPhasePath::new(SinglePhaseKind::NONE, SinglePhaseKind::N)));
    //! ```

    /// Phase connectivity between terminals.
    ///
    /// # Example: a shunt compensator's grounding terminal
    ///
    /// ```
    /// use gridtrace::v1::*;
    ///
    /// let network = Network::from_document(
    ///     &NetworkDocument::new().with_equipment(
    ///         EquipmentSpec::new("shunt", EquipmentKind::ShuntCompensator { grounding_terminal: Some(1) })
    ///             .with_terminal(PhaseCode::N, "ground")
    ///             .with_terminal(PhaseCode::ABC, "bus"),
    ///     ),
    /// )
    /// .unwrap();
    ///
    /// let shunt = network.equipment_by_mrid("shunt").unwrap();
    /// let result = connectivity::between_all(&network, shunt.terminals[0], shunt.terminals[1]);
    /// assert_eq!(result.from_phases(), vec![SinglePhaseKind::NONE; 3]);
    /// assert_eq!(result.to_phases(), vec![SinglePhaseKind::A, SinglePhaseKind::B, SinglePhaseKind::C]);
    /// ```
    pub mod connectivity {
        pub use crate::connectivity::{
            ConnectivityResult, between, between_all, connected_terminals, find_xy_phases, terminal_connectivity,
            transformer_phase_paths,
        };
    }

    /// Whole-network traces and the conditions they are built from.
    ///
    /// # Example: what is downstream of a breaker
    ///
    /// ```
    /// use gridtrace::v1::*;
    ///
    /// let mut network = Network::from_document(
    ///     &NetworkDocument::new()
    ///         .with_equipment(
    ///             EquipmentSpec::new("cb", EquipmentKind::Switch { normally_open: false, currently_open: false })
    ///                 .with_terminal(PhaseCode::ABC, "bus")
    ///                 .with_terminal(PhaseCode::ABC, "n1"),
    ///         )
    ///         .with_equipment(
    ///             EquipmentSpec::new("line", EquipmentKind::AcLineSegment)
    ///                 .with_terminal(PhaseCode::ABC, "n1")
    ///                 .with_terminal(PhaseCode::ABC, "n2"),
    ///         )
    ///         .with_equipment(EquipmentSpec::new("load", EquipmentKind::EnergyConsumer).with_terminal(PhaseCode::ABC, "n2"))
    ///         .with_feeder("f1", "cb-t2"),
    /// )
    /// .unwrap();
    ///
    /// trace::assign_directions(&mut network, NetworkState::Normal).unwrap();
    /// let line = network.equipment_by_mrid("line").unwrap().id;
    /// let below = trace::downstream_equipment(&network, line, &TraceOptions::default()).unwrap();
    /// let names: Vec<&str> = below.iter().map(|id| network.equipment(*id).mrid.as_str()).collect();
    /// assert_eq!(names, vec!["line", "load"]);
    /// ```
    pub mod trace {
        pub use crate::trace::conditions::{direction, downstream, limit_equipment_steps, stop_at_open, upstream};
        pub use crate::trace::{assign_directions, assign_feeders, direction_data, downstream_equipment, equipment_tree};
    }

    pub use crate::error::{Error, Result};
    pub use crate::network::{
        ConnectivityNode, Equipment, EquipmentId, EquipmentKind, EquipmentSpec, Feeder, FeederDirection, FeederId,
        FeederSpec, Network, NetworkDocument, NetworkState, NodeId, Terminal, TerminalId, TerminalSpec,
    };
    pub use crate::phase::{NominalPhasePath, PhaseCode, SinglePhaseKind};
    pub use crate::connectivity::{ConnectivityResult, XyCandidatePhasePaths};
    pub use crate::trace::{
        ActionType, EquipmentTree, EquipmentTreeBuilder, NetworkTrace, NetworkTraceStep, StepPath,
        TerminalPhaseTracker, TraceOptions, TreeCursor, TreeNode, TreeNodeDocument, TreeNodeId,
    };
    pub use crate::traversal::{
        AdmitAll, BranchingQueueNext, BranchingQueueSink, ContextValueComputer, QueueCondition, QueueNext,
        QueueOrder, QueueSink, QueueType, StepAction, StepContext, StopCondition, Traversal, VisitTracker,
    };
}
