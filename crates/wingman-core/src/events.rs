//! Events emitted by the AI core.
//!
//! Events are delivered to registered observers synchronously, within the
//! tick (or API call) that produced them, and are also accumulated so the
//! engine can attach them to its snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::{DockingState, TargetingPolicy};
use crate::ids::{AgentId, DockingPointId, SquadronId, StateId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AiEvent {
    /// An agent's machine moved to a new state.
    StateChanged {
        agent: AgentId,
        previous: StateId,
        current: StateId,
    },
    /// A state flagged that it has completed its action (rising edge only).
    ActionCompleted { agent: AgentId, state: StateId },
    /// The coordinator assigned an agent a new target agent.
    TargetAssigned { agent: AgentId, target: AgentId },
    /// The coordinator found no valid target for an agent.
    TargetLost { agent: AgentId },
    /// A squadron's target squadron changed. `target == squadron` means no enemy.
    SquadronRetargeted {
        squadron: SquadronId,
        target: SquadronId,
    },
    /// A targeting policy was replaced because it does not fit the scene.
    PolicyDowngraded {
        requested: TargetingPolicy,
        applied: TargetingPolicy,
    },
    /// An agent's docking state changed.
    DockingStateChanged {
        agent: AgentId,
        point: DockingPointId,
        previous: DockingState,
        current: DockingState,
    },
    /// An agent was destroyed.
    AgentDestroyed { agent: AgentId },
}
