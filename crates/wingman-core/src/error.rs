//! Error type for setup-time operations.
//!
//! Per-tick queries never return errors: stale references and lookup misses
//! degrade to `None`/`false` at the call site. `AiError` is reserved for
//! registration, configuration, and docking requests where the caller needs
//! to know why something was refused.

use thiserror::Error;

use crate::enums::DockingState;
use crate::ids::{AgentId, DockingPointId, SquadronId, StateId, StationId};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("state name {0:?} is already registered")]
    DuplicateStateName(String),

    #[error("state {0} is not registered")]
    UnknownState(StateId),

    #[error("state id space exhausted")]
    StateIdsExhausted,

    #[error("agent {0} not found")]
    UnknownAgent(AgentId),

    #[error("agent {0} has been destroyed")]
    AgentDestroyed(AgentId),

    #[error("squadron {0} not found")]
    UnknownSquadron(SquadronId),

    #[error("agent {agent} already belongs to squadron {squadron}")]
    AlreadyInSquadron {
        agent: AgentId,
        squadron: SquadronId,
    },

    #[error("docking station {0} not found")]
    UnknownStation(StationId),

    #[error("docking point {0} not found")]
    UnknownDockingPoint(DockingPointId),

    #[error("docking point {point} is occupied by {occupant}")]
    PointOccupied {
        point: DockingPointId,
        occupant: AgentId,
    },

    #[error("agent {agent} is already assigned to docking point {point}")]
    AlreadyAssigned {
        agent: AgentId,
        point: DockingPointId,
    },

    #[error("no free docking point available")]
    NoFreeDockingPoint,

    #[error("agent {agent} cannot {action} while {state:?}")]
    InvalidDockingTransition {
        agent: AgentId,
        action: &'static str,
        state: DockingState,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shorthand result type for all `wingman-*` crates.
pub type AiResult<T> = Result<T, AiError>;
