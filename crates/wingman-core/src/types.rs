//! Fundamental geometric and simulation types.
//!
//! Coordinates follow the simulation convention: x = East, y = North, z = Up.
//! A craft's local forward axis is +Y and its local up axis is +Z.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Read-only kinematic state of one craft, supplied by the locomotion layer
/// every tick. The AI core never writes to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: DVec3,
    pub orientation: DQuat,
    /// Velocity expressed in the craft's local frame.
    pub local_velocity: DVec3,
    /// Velocity expressed in the world frame (m/s).
    pub world_velocity: DVec3,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            local_velocity: DVec3::ZERO,
            world_velocity: DVec3::ZERO,
        }
    }
}

impl Kinematics {
    /// Kinematics at rest at `position`, facing `forward` (world frame).
    pub fn at(position: DVec3, forward: DVec3) -> Self {
        let orientation = match forward.try_normalize() {
            Some(dir) => DQuat::from_rotation_arc(DVec3::Y, dir),
            None => DQuat::IDENTITY,
        };
        Self {
            position,
            orientation,
            ..Default::default()
        }
    }

    /// Set the world velocity and derive the matching local velocity.
    pub fn with_velocity(mut self, world_velocity: DVec3) -> Self {
        self.world_velocity = world_velocity;
        self.local_velocity = self.orientation.inverse() * world_velocity;
        self
    }

    /// Unit forward vector in world space.
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::Y
    }

    /// Unit up vector in world space.
    pub fn up(&self) -> DVec3 {
        self.orientation * DVec3::Z
    }

    /// Unit right vector in world space.
    pub fn right(&self) -> DVec3 {
        self.orientation * DVec3::X
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        self.world_velocity.length()
    }

    /// Range to a point in meters.
    pub fn range_to(&self, point: DVec3) -> f64 {
        self.position.distance(point)
    }
}

/// The movement command handed to the locomotion layer for one agent per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringCommand {
    /// Desired heading (unit vector, world frame).
    pub heading: DVec3,
    /// Desired velocity, if the behavior wants to control speed.
    pub velocity: Option<DVec3>,
    /// Position the locomotion layer should treat as its current goal.
    pub target_position: Option<DVec3>,
    /// Desired up orientation hint.
    pub up_hint: Option<DVec3>,
}

impl SteeringCommand {
    /// Hold the current heading with zero desired velocity.
    pub fn idle(forward: DVec3) -> Self {
        Self {
            heading: forward.try_normalize().unwrap_or(DVec3::Y),
            velocity: Some(DVec3::ZERO),
            target_position: None,
            up_hint: None,
        }
    }
}

/// Axis-aligned theater-of-operations bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Cube of half-extent `half` centered on `center`.
    pub fn centered(center: DVec3, half: f64) -> Self {
        let h = DVec3::splat(half.abs());
        Self::new(center - h, center + h)
    }

    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}

/// An externally authored waypoint path. The core follows paths; it never
/// computes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointPath {
    pub name: String,
    pub waypoints: Vec<DVec3>,
    /// Whether following wraps back to the first waypoint after the last.
    pub looped: bool,
}

impl WaypointPath {
    pub fn new(name: impl Into<String>, waypoints: Vec<DVec3>, looped: bool) -> Self {
        Self {
            name: name.into(),
            waypoints,
            looped,
        }
    }

    pub fn waypoint(&self, index: usize) -> Option<DVec3> {
        self.waypoints.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// A named point of interest (e.g. "home", "rally-alpha").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub position: DVec3,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}
