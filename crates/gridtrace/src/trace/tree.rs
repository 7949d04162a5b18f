//! Equipment trees built from network traces.

use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::network::{EquipmentId, Network};
use crate::trace::NetworkTraceStep;
use crate::traversal::{ContextValueComputer, StepAction, StepContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TreeNodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: TreeNodeId,
    pub equipment: EquipmentId,
    pub parent: Option<TreeNodeId>,
    pub children: Vec<TreeNodeId>,
}

/// Arena of tree nodes, one per distinct equipment under each parent.
///
/// A child always has a higher id than its parent.
#[derive(Debug, Clone, Default)]
pub struct EquipmentTree {
    nodes: Vec<TreeNode>,
    roots: Vec<TreeNodeId>,
    index: HashMap<(Option<TreeNodeId>, EquipmentId), TreeNodeId>,
}

impl EquipmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[TreeNodeId] {
        &self.roots
    }

    pub fn node(&self, id: TreeNodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.index.clear();
    }

    /// The node for `equipment` under `parent`, created on first request.
    pub fn get_or_insert(&mut self, parent: Option<TreeNodeId>, equipment: EquipmentId) -> TreeNodeId {
        if let Some(id) = self.index.get(&(parent, equipment)) {
            return *id;
        }
        let id = TreeNodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            equipment,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        self.index.insert((parent, equipment), id);
        id
    }

    /// Nested, mRID-labelled form of the tree for output.
    pub fn to_document(&self, network: &Network) -> Vec<TreeNodeDocument> {
        // Children have higher ids than parents, so building back to front
        // always finds a node's children already built.
        let mut built: Vec<Option<TreeNodeDocument>> = vec![None; self.nodes.len()];
        for node in self.nodes.iter().rev() {
            let equipment = network.equipment(node.equipment);
            let children = node
                .children
                .iter()
                .filter_map(|child| built[child.0].take())
                .collect();
            built[node.id.0] = Some(TreeNodeDocument {
                mrid: equipment.mrid.clone(),
                kind: equipment.kind.label().to_string(),
                children,
            });
        }
        self.roots.iter().filter_map(|root| built[root.0].take()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNodeDocument {
    pub mrid: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeDocument>,
}

/// Where a step sits in the tree being built. Resolved to a real node the
/// first time an action sees a step carrying it.
#[derive(Debug)]
pub struct TreeCursor {
    equipment: EquipmentId,
    parent: Option<Rc<TreeCursor>>,
    resolved: Cell<Option<TreeNodeId>>,
}

impl TreeCursor {
    fn new(equipment: EquipmentId, parent: Option<Rc<TreeCursor>>) -> Rc<Self> {
        Rc::new(Self {
            equipment,
            parent,
            resolved: Cell::new(None),
        })
    }

    pub fn node(&self) -> Option<TreeNodeId> {
        self.resolved.get()
    }
}

/// Builds an [`EquipmentTree`] while a network trace runs.
///
/// Register it both as a step action and as a context value computer (see
/// `NetworkTrace::add_tree_builder`). Internal steps stay on the current
/// node; external steps descend to a child for the equipment entered.
#[derive(Debug, Clone, Default)]
pub struct EquipmentTreeBuilder {
    tree: Rc<RefCell<EquipmentTree>>,
}

impl EquipmentTreeBuilder {
    pub const KEY: &'static str = "equipment-tree";

    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the tree built so far.
    pub fn tree(&self) -> EquipmentTree {
        self.tree.borrow().clone()
    }

    fn resolve(&self, cursor: &Rc<TreeCursor>) -> Option<TreeNodeId> {
        let mut unresolved = Vec::new();
        let mut next = Some(cursor.clone());
        while let Some(c) = next {
            if c.resolved.get().is_some() {
                break;
            }
            next = c.parent.clone();
            unresolved.push(c);
        }

        let mut tree = self.tree.borrow_mut();
        for c in unresolved.iter().rev() {
            let parent = c.parent.as_ref().and_then(|p| p.resolved.get());
            c.resolved.set(Some(tree.get_or_insert(parent, c.equipment)));
        }
        cursor.node()
    }
}

impl<D> StepAction<NetworkTraceStep<D>> for EquipmentTreeBuilder {
    fn apply(&mut self, _step: &NetworkTraceStep<D>, context: &StepContext) {
        if let Some(cursor) = context.value::<Rc<TreeCursor>>(Self::KEY) {
            self.resolve(cursor);
        }
    }

    fn on_reset(&mut self) {
        self.tree.borrow_mut().clear();
    }
}

impl<D> ContextValueComputer<NetworkTraceStep<D>> for EquipmentTreeBuilder {
    type Value = Rc<TreeCursor>;

    fn key(&self) -> &str {
        Self::KEY
    }

    fn compute_initial_value(&self, step: &NetworkTraceStep<D>) -> Rc<TreeCursor> {
        TreeCursor::new(step.path.to_equipment, None)
    }

    fn compute_next_value(
        &self,
        next: &NetworkTraceStep<D>,
        _current: &NetworkTraceStep<D>,
        current_value: &Rc<TreeCursor>,
    ) -> Rc<TreeCursor> {
        if next.path.traced_internally() {
            current_value.clone()
        } else {
            TreeCursor::new(next.path.to_equipment, Some(current_value.clone()))
        }
    }
}
