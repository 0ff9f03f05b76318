//! ECS components for hecs craft entities.
//!
//! Components are plain data structs with no logic.
//! Behavior lives in systems and in the AI context, not in components.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::ids::AgentId;
use crate::types::SteeringCommand;

/// Links a craft entity to its agent in the AI context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Craft {
    pub agent: AgentId,
}

/// World-space pose of a craft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub orientation: DQuat,
}

/// World-space linear velocity (m/s).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinearVelocity(pub DVec3);

/// Performance envelope the locomotion stand-in respects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CraftLimits {
    pub max_speed: f64,
    /// Radians per second.
    pub max_turn_rate: f64,
    /// m/s².
    pub max_acceleration: f64,
}

impl Default for CraftLimits {
    fn default() -> Self {
        Self {
            max_speed: CRAFT_MAX_SPEED,
            max_turn_rate: CRAFT_MAX_TURN_RATE,
            max_acceleration: CRAFT_MAX_ACCELERATION,
        }
    }
}

/// The most recent steering command received from the AI core.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SteeringInput(pub Option<SteeringCommand>);

/// Marks a craft flown by a human player. The AI core does not steer it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerControlled;

/// Marks a craft whose agent has been destroyed; removed during cleanup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Destroyed;
