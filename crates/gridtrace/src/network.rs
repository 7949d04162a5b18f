//! Arena-backed network model: equipment, terminals, connectivity nodes and
//! feeders, plus the JSON document they are loaded from.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::phase::{PhaseCode, SinglePhaseKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EquipmentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerminalId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeederId(pub usize);

/// Which switch states, directions and feeder assignments a trace reads and
/// writes: the designed (normal) network or the as-operated (current) one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkState {
    #[default]
    Normal,
    Current,
}

/// Direction of supply through a terminal relative to its feeder head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeederDirection {
    #[default]
    Unset,
    Upstream,
    Downstream,
    Both,
}

impl FeederDirection {
    fn bits(self) -> u8 {
        match self {
            FeederDirection::Unset => 0,
            FeederDirection::Upstream => 1,
            FeederDirection::Downstream => 2,
            FeederDirection::Both => 3,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            1 => FeederDirection::Upstream,
            2 => FeederDirection::Downstream,
            3 => FeederDirection::Both,
            _ => FeederDirection::Unset,
        }
    }

    /// `true` when every direction in `other` is present in `self`.
    /// Nothing contains [`FeederDirection::Unset`].
    pub fn contains(self, other: FeederDirection) -> bool {
        other != FeederDirection::Unset && self.bits() & other.bits() == other.bits()
    }

    pub fn plus(self, other: FeederDirection) -> Self {
        Self::from_bits(self.bits() | other.bits())
    }

    /// Upstream for downstream and vice versa.
    pub fn complementary(self) -> Self {
        match self {
            FeederDirection::Upstream => FeederDirection::Downstream,
            FeederDirection::Downstream => FeederDirection::Upstream,
            other => other,
        }
    }
}

/// The closed set of equipment kinds the connectivity rules distinguish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EquipmentKind {
    EnergySource,
    Junction,
    AcLineSegment,
    Switch {
        #[serde(default)]
        normally_open: bool,
        #[serde(default)]
        currently_open: bool,
    },
    PowerTransformer,
    ShuntCompensator {
        /// Sequence number (1-based) of the terminal tied to ground.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grounding_terminal: Option<usize>,
    },
    EnergyConsumer,
}

impl EquipmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            EquipmentKind::EnergySource => "source",
            EquipmentKind::Junction => "junction",
            EquipmentKind::AcLineSegment => "line",
            EquipmentKind::Switch { .. } => "switch",
            EquipmentKind::PowerTransformer => "transformer",
            EquipmentKind::ShuntCompensator { .. } => "compensator",
            EquipmentKind::EnergyConsumer => "consumer",
        }
    }
}

// ============================================================================
// Document
// ============================================================================

/// JSON form of a network.
///
/// ```json
/// {
///   "equipment": [
///     { "mrid": "src", "kind": { "type": "EnergySource" },
///       "terminals": [ { "phases": "ABCN", "node": "n0" } ] },
///     { "mrid": "cb", "kind": { "type": "Switch", "normally_open": false },
///       "terminals": [ { "phases": "ABCN", "node": "n0" }, { "phases": "ABCN", "node": "n1" } ] }
///   ],
///   "feeders": [ { "mrid": "f1", "head_terminal": "cb-t2" } ]
/// }
/// ```
///
/// Terminals without an explicit `mrid` are named `<equipment>-t<sequence>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub equipment: Vec<EquipmentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeders: Vec<FeederSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSpec {
    pub mrid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: EquipmentKind,
    #[serde(default)]
    pub terminals: Vec<TerminalSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrid: Option<String>,
    pub phases: PhaseCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Physical phases already established for this terminal's X/Y markers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traced_phases: BTreeMap<SinglePhaseKind, SinglePhaseKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederSpec {
    pub mrid: String,
    /// mRID of the terminal where the feeder starts.
    pub head_terminal: String,
}

impl NetworkDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equipment(mut self, equipment: EquipmentSpec) -> Self {
        self.equipment.push(equipment);
        self
    }

    pub fn with_feeder(mut self, mrid: impl Into<String>, head_terminal: impl Into<String>) -> Self {
        self.feeders.push(FeederSpec {
            mrid: mrid.into(),
            head_terminal: head_terminal.into(),
        });
        self
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl EquipmentSpec {
    pub fn new(mrid: impl Into<String>, kind: EquipmentKind) -> Self {
        Self {
            mrid: mrid.into(),
            name: None,
            kind,
            terminals: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a terminal carrying `phases`, attached to connectivity node `node`.
    pub fn with_terminal(self, phases: PhaseCode, node: impl Into<String>) -> Self {
        self.with_terminal_spec(TerminalSpec::new(phases).at(node))
    }

    pub fn with_terminal_spec(mut self, terminal: TerminalSpec) -> Self {
        self.terminals.push(terminal);
        self
    }
}

impl TerminalSpec {
    pub fn new(phases: PhaseCode) -> Self {
        Self {
            mrid: None,
            phases,
            node: None,
            traced_phases: BTreeMap::new(),
        }
    }

    pub fn at(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_mrid(mut self, mrid: impl Into<String>) -> Self {
        self.mrid = Some(mrid.into());
        self
    }

    pub fn with_traced_phase(mut self, nominal: SinglePhaseKind, traced: SinglePhaseKind) -> Self {
        self.traced_phases.insert(nominal, traced);
        self
    }
}

// ============================================================================
// Runtime model
// ============================================================================

#[derive(Debug, Clone)]
pub struct Equipment {
    pub id: EquipmentId,
    pub mrid: String,
    pub name: Option<String>,
    pub kind: EquipmentKind,
    pub terminals: Vec<TerminalId>,
    pub normal_feeders: BTreeSet<FeederId>,
    pub current_feeders: BTreeSet<FeederId>,
}

impl Equipment {
    pub fn feeders(&self, state: NetworkState) -> &BTreeSet<FeederId> {
        match state {
            NetworkState::Normal => &self.normal_feeders,
            NetworkState::Current => &self.current_feeders,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Terminal {
    pub id: TerminalId,
    pub mrid: String,
    pub equipment: EquipmentId,
    /// 1-based position of the terminal on its equipment.
    pub sequence_number: usize,
    pub phases: PhaseCode,
    pub node: Option<NodeId>,
    pub traced_phases: BTreeMap<SinglePhaseKind, SinglePhaseKind>,
    pub normal_direction: FeederDirection,
    pub current_direction: FeederDirection,
}

impl Terminal {
    pub fn direction(&self, state: NetworkState) -> FeederDirection {
        match state {
            NetworkState::Normal => self.normal_direction,
            NetworkState::Current => self.current_direction,
        }
    }

    /// The physical phase recorded for an `X`/`Y` marker, if one is known.
    pub fn traced_phase(&self, nominal: SinglePhaseKind) -> Option<SinglePhaseKind> {
        self.traced_phases
            .get(&nominal)
            .copied()
            .filter(|p| *p != SinglePhaseKind::NONE)
    }
}

#[derive(Debug, Clone)]
pub struct ConnectivityNode {
    pub id: NodeId,
    pub mrid: String,
    pub terminals: Vec<TerminalId>,
}

#[derive(Debug, Clone)]
pub struct Feeder {
    pub id: FeederId,
    pub mrid: String,
    pub head_terminal: TerminalId,
}

/// An in-memory network. Ids handed out by a network are only meaningful
/// for that network; indexing with a foreign id panics like an out of range
/// slice index.
#[derive(Debug, Clone, Default)]
pub struct Network {
    equipment: Vec<Equipment>,
    terminals: Vec<Terminal>,
    nodes: Vec<ConnectivityNode>,
    feeders: Vec<Feeder>,
    equipment_index: HashMap<String, EquipmentId>,
    terminal_index: HashMap<String, TerminalId>,
}

impl Network {
    /// Build a network from its document form, validating references.
    pub fn from_document(doc: &NetworkDocument) -> Result<Self> {
        let mut network = Network::default();
        let mut node_index: HashMap<String, NodeId> = HashMap::new();

        for spec in &doc.equipment {
            if network.equipment_index.contains_key(&spec.mrid) {
                return Err(Error::DuplicateMrid(spec.mrid.clone()));
            }
            if let EquipmentKind::ShuntCompensator {
                grounding_terminal: Some(seq),
            } = spec.kind
                && (seq == 0 || seq > spec.terminals.len())
            {
                return Err(Error::InvalidDocument(format!(
                    "{}: grounding terminal {} does not exist",
                    spec.mrid, seq
                )));
            }

            let equipment_id = EquipmentId(network.equipment.len());
            let mut terminal_ids = Vec::with_capacity(spec.terminals.len());

            for (i, t) in spec.terminals.iter().enumerate() {
                let sequence_number = i + 1;
                let mrid = t
                    .mrid
                    .clone()
                    .unwrap_or_else(|| format!("{}-t{}", spec.mrid, sequence_number));
                if network.terminal_index.contains_key(&mrid) {
                    return Err(Error::DuplicateMrid(mrid));
                }
                if let Some(nominal) = t.traced_phases.keys().find(|p| !t.phases.contains(**p)) {
                    return Err(Error::InvalidDocument(format!(
                        "{}: traced phase for {} which the terminal does not carry",
                        mrid, nominal
                    )));
                }

                let terminal_id = TerminalId(network.terminals.len());
                let node = t.node.as_ref().map(|node_mrid| {
                    let nodes = &mut network.nodes;
                    let id = *node_index.entry(node_mrid.clone()).or_insert_with(|| {
                        let id = NodeId(nodes.len());
                        nodes.push(ConnectivityNode {
                            id,
                            mrid: node_mrid.clone(),
                            terminals: Vec::new(),
                        });
                        id
                    });
                    nodes[id.0].terminals.push(terminal_id);
                    id
                });

                network.terminal_index.insert(mrid.clone(), terminal_id);
                network.terminals.push(Terminal {
                    id: terminal_id,
                    mrid,
                    equipment: equipment_id,
                    sequence_number,
                    phases: t.phases,
                    node,
                    traced_phases: t.traced_phases.clone(),
                    normal_direction: FeederDirection::Unset,
                    current_direction: FeederDirection::Unset,
                });
                terminal_ids.push(terminal_id);
            }

            network
                .equipment_index
                .insert(spec.mrid.clone(), equipment_id);
            network.equipment.push(Equipment {
                id: equipment_id,
                mrid: spec.mrid.clone(),
                name: spec.name.clone(),
                kind: spec.kind.clone(),
                terminals: terminal_ids,
                normal_feeders: BTreeSet::new(),
                current_feeders: BTreeSet::new(),
            });
        }

        for spec in &doc.feeders {
            if network.feeders.iter().any(|f| f.mrid == spec.mrid) {
                return Err(Error::DuplicateMrid(spec.mrid.clone()));
            }
            let head_terminal = network.terminal_by_mrid(&spec.head_terminal)?.id;
            network.feeders.push(Feeder {
                id: FeederId(network.feeders.len()),
                mrid: spec.mrid.clone(),
                head_terminal,
            });
        }

        Ok(network)
    }

    /// Parse and validate a network from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc = NetworkDocument::from_json(json)?;
        Self::from_document(&doc)
    }

    /// Read, parse and validate a network file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn equipment(&self, id: EquipmentId) -> &Equipment {
        &self.equipment[id.0]
    }

    pub fn terminal(&self, id: TerminalId) -> &Terminal {
        &self.terminals[id.0]
    }

    pub fn node(&self, id: NodeId) -> &ConnectivityNode {
        &self.nodes[id.0]
    }

    pub fn feeder(&self, id: FeederId) -> &Feeder {
        &self.feeders[id.0]
    }

    pub fn all_equipment(&self) -> impl Iterator<Item = &Equipment> {
        self.equipment.iter()
    }

    pub fn all_terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals.iter()
    }

    pub fn feeders(&self) -> impl Iterator<Item = &Feeder> {
        self.feeders.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn equipment_by_mrid(&self, mrid: &str) -> Result<&Equipment> {
        self.equipment_index
            .get(mrid)
            .map(|id| self.equipment(*id))
            .ok_or_else(|| Error::UnknownEquipment(mrid.to_string()))
    }

    pub fn terminal_by_mrid(&self, mrid: &str) -> Result<&Terminal> {
        self.terminal_index
            .get(mrid)
            .map(|id| self.terminal(*id))
            .ok_or_else(|| Error::UnknownTerminal(mrid.to_string()))
    }

    /// The equipment owning a terminal.
    pub fn equipment_of(&self, terminal: TerminalId) -> &Equipment {
        self.equipment(self.terminal(terminal).equipment)
    }

    /// The other terminals on the same piece of equipment.
    pub fn other_terminals(&self, terminal: TerminalId) -> impl Iterator<Item = TerminalId> + '_ {
        self.equipment_of(terminal)
            .terminals
            .iter()
            .copied()
            .filter(move |t| *t != terminal)
    }

    /// Terminals of other equipment sharing this terminal's connectivity node.
    pub fn connected_terminals(&self, terminal: TerminalId) -> impl Iterator<Item = TerminalId> + '_ {
        self.terminal(terminal)
            .node
            .into_iter()
            .flat_map(move |node| self.node(node).terminals.iter().copied())
            .filter(move |t| *t != terminal)
    }

    pub fn is_open(&self, equipment: EquipmentId, state: NetworkState) -> bool {
        match self.equipment(equipment).kind {
            EquipmentKind::Switch {
                normally_open,
                currently_open,
            } => match state {
                NetworkState::Normal => normally_open,
                NetworkState::Current => currently_open,
            },
            _ => false,
        }
    }

    /// The grounding terminal of a shunt compensator.
    pub fn grounding_terminal(&self, equipment: EquipmentId) -> Option<TerminalId> {
        let eq = self.equipment(equipment);
        match eq.kind {
            EquipmentKind::ShuntCompensator {
                grounding_terminal: Some(seq),
            } => eq.terminals.get(seq.checked_sub(1)?).copied(),
            _ => None,
        }
    }

    pub fn is_feeder_head_terminal(&self, terminal: TerminalId) -> bool {
        self.feeders.iter().any(|f| f.head_terminal == terminal)
    }

    pub fn add_direction(&mut self, terminal: TerminalId, state: NetworkState, direction: FeederDirection) {
        let t = &mut self.terminals[terminal.0];
        match state {
            NetworkState::Normal => t.normal_direction = t.normal_direction.plus(direction),
            NetworkState::Current => t.current_direction = t.current_direction.plus(direction),
        }
    }

    pub fn clear_directions(&mut self, state: NetworkState) {
        for t in &mut self.terminals {
            match state {
                NetworkState::Normal => t.normal_direction = FeederDirection::Unset,
                NetworkState::Current => t.current_direction = FeederDirection::Unset,
            }
        }
    }

    pub fn assign_feeder(&mut self, equipment: EquipmentId, state: NetworkState, feeder: FeederId) {
        let eq = &mut self.equipment[equipment.0];
        match state {
            NetworkState::Normal => eq.normal_feeders.insert(feeder),
            NetworkState::Current => eq.current_feeders.insert(feeder),
        };
    }

    pub fn clear_feeders(&mut self, state: NetworkState) {
        for eq in &mut self.equipment {
            match state {
                NetworkState::Normal => eq.normal_feeders.clear(),
                NetworkState::Current => eq.current_feeders.clear(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_doc() -> NetworkDocument {
        NetworkDocument::new()
            .with_equipment(
                EquipmentSpec::new("src", EquipmentKind::EnergySource)
                    .with_terminal(PhaseCode::ABCN, "n0"),
            )
            .with_equipment(
                EquipmentSpec::new(
                    "cb",
                    EquipmentKind::Switch {
                        normally_open: false,
                        currently_open: true,
                    },
                )
                .with_name("Feeder breaker")
                .with_terminal(PhaseCode::ABCN, "n0")
                .with_terminal(PhaseCode::ABCN, "n1"),
            )
            .with_equipment(
                EquipmentSpec::new("line", EquipmentKind::AcLineSegment)
                    .with_terminal(PhaseCode::ABCN, "n1")
                    .with_terminal_spec(TerminalSpec::new(PhaseCode::ABCN).with_mrid("line-end")),
            )
            .with_feeder("f1", "cb-t2")
    }

    #[test]
    fn test_from_document_builds_arena() {
        let network = Network::from_document(&make_doc()).unwrap();
        assert_eq!(network.all_equipment().count(), 3);
        assert_eq!(network.all_terminals().count(), 5);
        assert_eq!(network.node_count(), 2);

        let cb = network.equipment_by_mrid("cb").unwrap();
        assert_eq!(cb.name.as_deref(), Some("Feeder breaker"));
        assert_eq!(cb.terminals.len(), 2);
        assert_eq!(network.terminal(cb.terminals[1]).mrid, "cb-t2");
        assert_eq!(network.terminal(cb.terminals[1]).sequence_number, 2);
        assert!(network.terminal_by_mrid("line-end").unwrap().node.is_none());
    }

    #[test]
    fn test_connected_and_other_terminals() {
        let network = Network::from_document(&make_doc()).unwrap();
        let cb_t2 = network.terminal_by_mrid("cb-t2").unwrap().id;
        let line_t1 = network.terminal_by_mrid("line-t1").unwrap().id;
        let cb_t1 = network.terminal_by_mrid("cb-t1").unwrap().id;

        assert_eq!(network.connected_terminals(cb_t2).collect::<Vec<_>>(), vec![line_t1]);
        assert_eq!(network.other_terminals(cb_t2).collect::<Vec<_>>(), vec![cb_t1]);

        let line_end = network.terminal_by_mrid("line-end").unwrap().id;
        assert_eq!(network.connected_terminals(line_end).count(), 0);
    }

    #[test]
    fn test_switch_state_per_network_state() {
        let network = Network::from_document(&make_doc()).unwrap();
        let cb = network.equipment_by_mrid("cb").unwrap().id;
        assert!(!network.is_open(cb, NetworkState::Normal));
        assert!(network.is_open(cb, NetworkState::Current));
        let line = network.equipment_by_mrid("line").unwrap().id;
        assert!(!network.is_open(line, NetworkState::Current));
    }

    #[test]
    fn test_feeder_heads() {
        let network = Network::from_document(&make_doc()).unwrap();
        let feeder = network.feeders().next().unwrap();
        assert_eq!(feeder.mrid, "f1");
        assert!(network.is_feeder_head_terminal(feeder.head_terminal));
        let cb_t1 = network.terminal_by_mrid("cb-t1").unwrap().id;
        assert!(!network.is_feeder_head_terminal(cb_t1));
    }

    #[test]
    fn test_duplicate_mrid_rejected() {
        let doc = make_doc().with_equipment(EquipmentSpec::new("cb", EquipmentKind::Junction));
        assert!(matches!(
            Network::from_document(&doc),
            Err(Error::DuplicateMrid(m)) if m == "cb"
        ));
    }

    #[test]
    fn test_unknown_feeder_head_rejected() {
        let doc = make_doc().with_feeder("f2", "nope");
        assert!(matches!(
            Network::from_document(&doc),
            Err(Error::UnknownTerminal(m)) if m == "nope"
        ));
    }

    #[test]
    fn test_grounding_terminal_validation() {
        let doc = NetworkDocument::new().with_equipment(
            EquipmentSpec::new(
                "shunt",
                EquipmentKind::ShuntCompensator {
                    grounding_terminal: Some(3),
                },
            )
            .with_terminal(PhaseCode::ABC, "n0")
            .with_terminal(PhaseCode::N, "n1"),
        );
        assert!(matches!(
            Network::from_document(&doc),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_grounding_terminal_lookup() {
        let doc = NetworkDocument::new().with_equipment(
            EquipmentSpec::new(
                "shunt",
                EquipmentKind::ShuntCompensator {
                    grounding_terminal: Some(2),
                },
            )
            .with_terminal(PhaseCode::ABC, "n0")
            .with_terminal(PhaseCode::N, "n1"),
        );
        let network = Network::from_document(&doc).unwrap();
        let shunt = network.equipment_by_mrid("shunt").unwrap();
        assert_eq!(network.grounding_terminal(shunt.id), Some(shunt.terminals[1]));
    }

    #[test]
    fn test_traced_phase_must_be_carried() {
        let doc = NetworkDocument::new().with_equipment(
            EquipmentSpec::new("lat", EquipmentKind::AcLineSegment).with_terminal_spec(
                TerminalSpec::new(PhaseCode::XN)
                    .at("n0")
                    .with_traced_phase(SinglePhaseKind::Y, SinglePhaseKind::B),
            ),
        );
        assert!(matches!(
            Network::from_document(&doc),
            Err(Error::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = NetworkDocument::new().with_equipment(
            EquipmentSpec::new("lat", EquipmentKind::AcLineSegment).with_terminal_spec(
                TerminalSpec::new(PhaseCode::XN)
                    .at("n0")
                    .with_traced_phase(SinglePhaseKind::X, SinglePhaseKind::B),
            ),
        );
        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"AcLineSegment\""));
        let network = Network::from_json(&json).unwrap();
        let t = network.terminal_by_mrid("lat-t1").unwrap();
        assert_eq!(t.traced_phase(SinglePhaseKind::X), Some(SinglePhaseKind::B));
        assert_eq!(t.traced_phase(SinglePhaseKind::N), None);
    }

    #[test]
    fn test_parse_switch_defaults() {
        let json = r#"{"equipment":[{"mrid":"sw","kind":{"type":"Switch"},"terminals":[{"phases":"A"}]}]}"#;
        let network = Network::from_json(json).unwrap();
        let sw = network.equipment_by_mrid("sw").unwrap().id;
        assert!(!network.is_open(sw, NetworkState::Normal));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Network::load(Path::new("/nonexistent/network.json"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_directions_and_feeders_are_per_state() {
        let mut network = Network::from_document(&make_doc()).unwrap();
        let t = network.terminal_by_mrid("cb-t2").unwrap().id;
        network.add_direction(t, NetworkState::Normal, FeederDirection::Downstream);
        network.add_direction(t, NetworkState::Normal, FeederDirection::Upstream);
        assert_eq!(network.terminal(t).direction(NetworkState::Normal), FeederDirection::Both);
        assert_eq!(network.terminal(t).direction(NetworkState::Current), FeederDirection::Unset);

        let line = network.equipment_by_mrid("line").unwrap().id;
        network.assign_feeder(line, NetworkState::Current, FeederId(0));
        assert!(network.equipment(line).feeders(NetworkState::Normal).is_empty());
        assert_eq!(network.equipment(line).feeders(NetworkState::Current).len(), 1);

        network.clear_directions(NetworkState::Normal);
        network.clear_feeders(NetworkState::Current);
        assert_eq!(network.terminal(t).direction(NetworkState::Normal), FeederDirection::Unset);
        assert!(network.equipment(line).feeders(NetworkState::Current).is_empty());
    }

    #[test]
    fn test_feeder_direction_algebra() {
        use FeederDirection::*;
        assert!(Both.contains(Upstream));
        assert!(Both.contains(Downstream));
        assert!(!Upstream.contains(Downstream));
        assert!(!Both.contains(Unset));
        assert_eq!(Upstream.plus(Downstream), Both);
        assert_eq!(Unset.plus(Upstream), Upstream);
        assert_eq!(Downstream.complementary(), Upstream);
        assert_eq!(Both.complementary(), Both);
    }
}
