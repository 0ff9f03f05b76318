//! Locomotion stand-in: turns steering commands into motion.
//!
//! A real flight model would sit here. This one treats the craft as a point
//! mass that tracks the commanded velocity under an acceleration limit, while
//! the nose turns toward the commanded heading at a bounded rate. Player
//! craft and craft without a command keep their velocity.

use glam::{DMat3, DQuat, DVec3};
use hecs::World;

use wingman_ai::AiContext;
use wingman_core::components::{Craft, CraftLimits, LinearVelocity, SteeringInput, Transform};
use wingman_core::types::SteeringCommand;

/// Fetch each craft's steering command and apply it for `dt` seconds.
pub fn run(world: &mut World, ai: &AiContext, dt: f64) {
    for (_entity, (craft, transform, velocity, limits, input)) in world.query_mut::<(
        &Craft,
        &mut Transform,
        &mut LinearVelocity,
        &CraftLimits,
        &mut SteeringInput,
    )>() {
        input.0 = ai.command(craft.agent);
        let Some(command) = input.0 else {
            continue;
        };
        transform.orientation = turn_toward(transform.orientation, &command, limits, dt);
        velocity.0 = track_velocity(velocity.0, &command, limits, dt);
    }
}

/// Rotate the nose toward the commanded heading by at most `max_turn_rate * dt`,
/// rolling so local up follows the up hint (world up when there is none).
pub fn turn_toward(
    orientation: DQuat,
    command: &SteeringCommand,
    limits: &CraftLimits,
    dt: f64,
) -> DQuat {
    let forward = orientation * DVec3::Y;
    let desired = command.heading.try_normalize().unwrap_or(forward);

    let max_step = limits.max_turn_rate * dt;
    let angle = forward.angle_between(desired);
    let new_forward = if angle <= max_step {
        desired
    } else {
        let axis = forward
            .cross(desired)
            .try_normalize()
            .unwrap_or(orientation * DVec3::Z);
        DQuat::from_axis_angle(axis, max_step) * forward
    };

    let up = command.up_hint.unwrap_or(DVec3::Z);
    frame(new_forward, up).unwrap_or_else(|| {
        // Nose along the up hint: keep the current right axis.
        frame(new_forward, (orientation * DVec3::X).cross(new_forward))
            .unwrap_or(DQuat::from_rotation_arc(DVec3::Y, new_forward))
    })
}

/// Orientation whose +Y is `forward` and whose +Z is as close to `up` as
/// possible. `None` when the two are parallel.
fn frame(forward: DVec3, up: DVec3) -> Option<DQuat> {
    let right = forward.cross(up).try_normalize()?;
    let up = right.cross(forward);
    Some(DQuat::from_mat3(&DMat3::from_cols(right, forward, up)).normalize())
}

/// Move the velocity toward the commanded one, limited by acceleration and top
/// speed. Without a velocity request the craft cruises along its heading.
pub fn track_velocity(
    current: DVec3,
    command: &SteeringCommand,
    limits: &CraftLimits,
    dt: f64,
) -> DVec3 {
    let desired = command
        .velocity
        .unwrap_or(command.heading * limits.max_speed)
        .clamp_length_max(limits.max_speed);
    let delta = (desired - current).clamp_length_max(limits.max_acceleration * dt);
    (current + delta).clamp_length_max(limits.max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> CraftLimits {
        CraftLimits {
            max_speed: 100.0,
            max_turn_rate: 1.0,
            max_acceleration: 10.0,
        }
    }

    fn command(heading: DVec3, velocity: Option<DVec3>) -> SteeringCommand {
        SteeringCommand {
            heading,
            velocity,
            target_position: None,
            up_hint: None,
        }
    }

    #[test]
    fn test_turn_rate_limited() {
        let cmd = command(DVec3::X, None);
        let turned = turn_toward(DQuat::IDENTITY, &cmd, &limits(), 0.5);
        let forward = turned * DVec3::Y;
        assert!((forward.angle_between(DVec3::Y) - 0.5).abs() < 1e-9);

        // Small corrections snap straight onto the heading.
        let done = turn_toward(turned, &cmd, &limits(), 2.0);
        assert!(((done * DVec3::Y) - DVec3::X).length() < 1e-9);
        assert!(((done * DVec3::Z) - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_turn_rolls_to_up_hint() {
        let cmd = SteeringCommand {
            up_hint: Some(DVec3::X),
            ..command(DVec3::Y, None)
        };
        let rolled = turn_toward(DQuat::IDENTITY, &cmd, &limits(), 0.1);
        assert!(((rolled * DVec3::Z) - DVec3::X).length() < 1e-9);
        assert!(((rolled * DVec3::Y) - DVec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_heading_along_up_hint_keeps_frame() {
        let cmd = command(DVec3::Z, None);
        let climbed = turn_toward(DQuat::IDENTITY, &cmd, &limits(), 10.0);
        assert!(((climbed * DVec3::Y) - DVec3::Z).length() < 1e-9);
        assert!(climbed.is_normalized());
    }

    #[test]
    fn test_velocity_acceleration_limited() {
        let cmd = command(DVec3::Y, Some(DVec3::new(0.0, 50.0, 0.0)));
        let v = track_velocity(DVec3::ZERO, &cmd, &limits(), 1.0);
        assert!((v - DVec3::new(0.0, 10.0, 0.0)).length() < 1e-9);

        // No velocity request: cruise along the heading, capped at top speed.
        let cruise = command(DVec3::X, None);
        let mut v = DVec3::ZERO;
        for _ in 0..20 {
            v = track_velocity(v, &cruise, &limits(), 1.0);
        }
        assert!((v - DVec3::new(100.0, 0.0, 0.0)).length() < 1e-9);
    }
}
