use serde::{Deserialize, Serialize};

use crate::network::{FeederDirection, NetworkState};
use crate::traversal::QueueOrder;

/// Which visited steps run the step actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    AllSteps,
    /// Start items and steps that cross into new equipment.
    FirstStepOnEquipment,
}

/// Settings for a network trace, loadable from JSON.
///
/// ```json
/// { "state": "current", "order": "breadth_first", "branching": true,
///   "direction": "downstream", "step_limit": 20 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    pub state: NetworkState,
    pub order: QueueOrder,
    pub branching: bool,
    pub action_type: ActionType,
    /// Stop once a step is this many steps from its start item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_limit: Option<usize>,
    /// Only follow terminals assigned this feeder direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<FeederDirection>,
    /// Do not trace through open switches.
    pub stop_at_open: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            state: NetworkState::Normal,
            order: QueueOrder::DepthFirst,
            branching: false,
            action_type: ActionType::AllSteps,
            step_limit: None,
            direction: None,
            stop_at_open: true,
        }
    }
}

impl TraceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: NetworkState) -> Self {
        self.state = state;
        self
    }

    pub fn with_order(mut self, order: QueueOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_branching(mut self, branching: bool) -> Self {
        self.branching = branching;
        self
    }

    pub fn with_action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = action_type;
        self
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_direction(mut self, direction: FeederDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_stop_at_open(mut self, stop_at_open: bool) -> Self {
        self.stop_at_open = stop_at_open;
        self
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
