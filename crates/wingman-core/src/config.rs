//! Runtime configuration for an AI context.
//!
//! Every field has a default taken from [`crate::constants`], and missing
//! fields in JSON fall back to those defaults, so partial config files work.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::TargetingPolicy;
use crate::error::{AiError, AiResult};
use crate::types::Bounds;

/// Configuration for one AI context (one scene/world).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// RNG seed for determinism. Same seed = same decisions.
    pub seed: u64,
    /// Seconds between squadron retarget passes.
    pub retarget_interval_secs: f64,
    /// Seconds between steering passes. Zero runs steering every tick.
    pub steering_interval_secs: f64,
    /// Policy for the periodic retarget pass.
    pub targeting_policy: TargetingPolicy,
    /// Theater of operations. `None` means unbounded.
    pub theater: Option<Bounds>,
    /// Where agents fall back to when their target is invalid.
    pub home: DVec3,
    pub behavior: BehaviorSettings,
    pub docking: DockingSettings,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            retarget_interval_secs: DEFAULT_RETARGET_INTERVAL_SECS,
            steering_interval_secs: DEFAULT_STEERING_INTERVAL_SECS,
            targeting_policy: TargetingPolicy::default(),
            theater: None,
            home: DVec3::ZERO,
            behavior: BehaviorSettings::default(),
            docking: DockingSettings::default(),
        }
    }
}

impl AiConfig {
    /// Parse a JSON config, filling missing fields with defaults.
    pub fn from_json(json: &str) -> AiResult<Self> {
        let config: AiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make timers or steering degenerate.
    pub fn validate(&self) -> AiResult<()> {
        if !(self.retarget_interval_secs > 0.0) {
            return Err(AiError::Config(format!(
                "retarget_interval_secs must be positive, got {}",
                self.retarget_interval_secs
            )));
        }
        if !(self.steering_interval_secs >= 0.0) {
            return Err(AiError::Config(format!(
                "steering_interval_secs must be non-negative, got {}",
                self.steering_interval_secs
            )));
        }
        if !(self.behavior.deceleration > 0.0) {
            return Err(AiError::Config("behavior.deceleration must be positive".into()));
        }
        if let Some(secs) = self.docking.auto_undock_secs {
            if !(secs >= 0.0) {
                return Err(AiError::Config("docking.auto_undock_secs must be non-negative".into()));
            }
        }
        Ok(())
    }
}

/// Tuning for steering behaviors and the built-in states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Cruise speed requested by seek/pursue (m/s).
    pub max_speed: f64,
    /// Speed an arrival should still carry at the target (m/s).
    pub min_arrival_speed: f64,
    /// Braking deceleration assumed by arrival (m/s²).
    pub deceleration: f64,
    /// Position targets closer than this are reached (m).
    pub arrival_radius: f64,
    /// Path waypoints closer than this are reached (m).
    pub waypoint_radius: f64,
    /// Half-angle of a hostile's forward cone (radians).
    pub threat_cone_half_angle: f64,
    /// Obstacle look-ahead in seconds of travel.
    pub obstacle_lookahead_secs: f64,
    /// Minimum obstacle look-ahead distance (m).
    pub obstacle_min_lookahead: f64,
    /// Avoidance radius around each craft (m).
    pub obstacle_radius: f64,
    /// Interception time under which an agent inside the target's cone flees (s).
    pub flee_time_threshold: f64,
    /// Interception time above which attack pursues rather than arrives (s).
    pub pursue_time_threshold: f64,
    pub avoid_weight: f64,
    pub evade_cone_weight: f64,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            min_arrival_speed: DEFAULT_MIN_ARRIVAL_SPEED,
            deceleration: DEFAULT_DECELERATION,
            arrival_radius: DEFAULT_ARRIVAL_RADIUS,
            waypoint_radius: DEFAULT_WAYPOINT_RADIUS,
            threat_cone_half_angle: DEFAULT_THREAT_CONE_HALF_ANGLE,
            obstacle_lookahead_secs: DEFAULT_OBSTACLE_LOOKAHEAD_SECS,
            obstacle_min_lookahead: DEFAULT_OBSTACLE_MIN_LOOKAHEAD,
            obstacle_radius: DEFAULT_OBSTACLE_RADIUS,
            flee_time_threshold: DEFAULT_FLEE_TIME_THRESHOLD,
            pursue_time_threshold: DEFAULT_PURSUE_TIME_THRESHOLD,
            avoid_weight: DEFAULT_AVOID_WEIGHT,
            evade_cone_weight: DEFAULT_EVADE_CONE_WEIGHT,
        }
    }
}

/// Tuning for the docking state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingSettings {
    /// Seconds docked before undocking automatically. `None` disables it.
    pub auto_undock_secs: Option<f64>,
    pub capture_distance: f64,
    pub approach_offset: f64,
    pub clearance_distance: f64,
    pub departure_speed: f64,
    pub final_approach_speed: f64,
}

impl Default for DockingSettings {
    fn default() -> Self {
        Self {
            auto_undock_secs: None,
            capture_distance: DOCKING_CAPTURE_DISTANCE,
            approach_offset: DOCKING_APPROACH_OFFSET,
            clearance_distance: DOCKING_CLEARANCE_DISTANCE,
            departure_speed: DOCKING_DEPARTURE_SPEED,
            final_approach_speed: DOCKING_FINAL_APPROACH_SPEED,
        }
    }
}
