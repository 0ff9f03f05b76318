//! Kinematic integration system.
//!
//! Updates position from velocity each tick: position += velocity * dt.

use hecs::World;

use wingman_core::components::{LinearVelocity, Transform};

/// Run kinematic integration for all entities with Transform + LinearVelocity.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (transform, velocity)) in
        world.query_mut::<(&mut Transform, &LinearVelocity)>()
    {
        transform.position += velocity.0 * dt;
    }
}

#[cfg(test)]
mod tests {
    use glam::{DQuat, DVec3};

    use super::*;

    #[test]
    fn test_integrates_velocity() {
        let mut world = World::new();
        let entity = world.spawn((
            Transform {
                position: DVec3::ZERO,
                orientation: DQuat::IDENTITY,
            },
            LinearVelocity(DVec3::new(30.0, 0.0, -3.0)),
        ));
        run(&mut world, 0.1);
        let transform = world.get::<&Transform>(entity).unwrap();
        assert!((transform.position - DVec3::new(3.0, 0.0, -0.3)).length() < 1e-9);
    }
}
