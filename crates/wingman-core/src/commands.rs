//! Commands sent from scripts or the host application to the simulation.
//!
//! Commands are queued and applied at the next tick boundary, so a tick never
//! observes a half-applied external change.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, DockingPointId, PathId, StateId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AiCommand {
    // --- State machine ---
    /// Move an agent's state machine to `state`.
    SetState { agent: AgentId, state: StateId },

    // --- Targets ---
    AssignTargetPosition { agent: AgentId, position: DVec3 },
    AssignTargetAgent { agent: AgentId, target: AgentId },
    AssignTargetPath { agent: AgentId, path: PathId },
    AssignTargetLocation { agent: AgentId, name: String },
    ClearTarget { agent: AgentId },

    // --- Squadrons ---
    /// Run the squadron retarget pass immediately.
    UpdateSquadrons,

    // --- Docking ---
    /// Claim a docking point (a specific one, or the first free one) and begin docking.
    Dock {
        agent: AgentId,
        point: Option<DockingPointId>,
    },
    Undock { agent: AgentId },

    // --- Lifecycle ---
    /// Mark an agent destroyed. Its craft is despawned during cleanup.
    DestroyAgent { agent: AgentId },

    // --- Simulation control ---
    Pause,
    Resume,
}
