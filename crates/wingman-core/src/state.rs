//! Simulation snapshot: the complete visible state after each tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::AiEvent;
use crate::ids::*;
use crate::types::SimTime;

/// Complete state broadcast to consumers after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub agents: Vec<AgentView>,
    pub squadrons: Vec<SquadronView>,
    pub docking_points: Vec<DockingPointView>,
    pub events: Vec<AiEvent>,
}

/// One craft and its AI state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub agent: AgentId,
    pub position: DVec3,
    pub velocity: DVec3,
    pub heading: DVec3,
    pub state: StateId,
    pub state_name: String,
    pub action_completed: bool,
    pub target_kind: TargetKind,
    pub target_agent: Option<AgentId>,
    pub squadron: Option<SquadronId>,
    pub faction: FactionId,
    pub docking: DockingState,
    pub player_controlled: bool,
}

/// Squadron membership and targeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadronView {
    pub squadron: SquadronId,
    pub name: String,
    pub faction: FactionId,
    pub live_members: usize,
    pub target_squadron: SquadronId,
}

/// Docking point status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockingPointView {
    pub point: DockingPointId,
    pub station: StationId,
    pub position: DVec3,
    pub state: DockingPointState,
    pub occupant: Option<AgentId>,
}
