//! Enumeration types used throughout the AI core.

use serde::{Deserialize, Serialize};

/// How a state's weighted behavior requests are combined into one command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinerPolicy {
    /// The highest-priority request with non-zero weight wins outright.
    #[default]
    PriorityOnly,
    /// Requests are visited in priority order and each weight acts as the
    /// probability of being selected this tick.
    PrioritisedDithering,
}

/// Policy used by the squadron coordinator's periodic retarget pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingPolicy {
    /// A random live member of the squadron's target squadron.
    #[default]
    RandomEnemyAgent,
    /// A random live player-controlled agent of another faction.
    RandomPlayerAgent,
    /// The next live member of the agent's own squadron. Only meaningful with
    /// a single squadron in the scene.
    NextInOwnSquadron,
}

/// Per-agent docking lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockingState {
    #[default]
    NotDocked,
    Docking,
    Docked,
    Undocking,
}

/// Lifecycle of a single docking point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockingPointState {
    #[default]
    Unassigned,
    /// Claimed by an agent that has not started its approach yet.
    Assigned,
    Docking,
    Docked,
    Undocking,
}

/// Which kind of target an agent currently holds (snapshot view).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    None,
    Position,
    Agent,
    Path,
    Location,
}
