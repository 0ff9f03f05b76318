//! Kinematic source: publishes each craft's pose and velocity to the AI core.

use hecs::World;

use wingman_ai::AiContext;
use wingman_core::components::{Craft, LinearVelocity, Transform};
use wingman_core::types::Kinematics;

/// Push every craft's current kinematics into the AI context.
pub fn run(world: &World, ai: &mut AiContext) {
    for (_entity, (craft, transform, velocity)) in world
        .query::<(&Craft, &Transform, &LinearVelocity)>()
        .iter()
    {
        let kinematics = Kinematics {
            position: transform.position,
            orientation: transform.orientation,
            ..Default::default()
        }
        .with_velocity(velocity.0);
        ai.update_kinematics(craft.agent, kinematics);
    }
}
