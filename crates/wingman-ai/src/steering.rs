//! Steering behaviors.
//!
//! Pure functions that map an agent's kinematic state and a resolved target
//! to a desired heading, optional velocity, optional goal position and
//! optional up hint. No behavior keeps state between calls. A behavior whose
//! target cannot be resolved (destroyed agent, unknown location) returns
//! `None`, which the blender treats as a no-op.

use glam::DVec3;

use wingman_core::config::BehaviorSettings;
use wingman_core::ids::AgentId;
use wingman_core::types::{Kinematics, SteeringCommand};

use crate::agents::Roster;

/// Caller-supplied behavior. Receives the same inputs as the built-ins.
pub type CustomSteeringFn = fn(&SteeringInput<'_>) -> Option<SteeringCommand>;

/// What a weighted request asks the agent to do.
#[derive(Debug, Clone, Copy)]
pub enum BehaviorKind {
    /// Head straight for the target at cruise speed.
    Seek,
    /// Head for the target, slowing so the agent can brake to the minimum
    /// arrival speed by the time it gets there.
    Arrival,
    /// Lead a moving target using its predicted intercept point.
    Pursue,
    /// Head directly away from the target.
    Flee,
    /// Steer away from craft in the look-ahead corridor. Ignores the target.
    ObstacleAvoidance,
    /// Leave the target's forward threat cone.
    UnblockCone,
    /// Hold heading, zero velocity.
    Idle,
    Custom(CustomSteeringFn),
}

/// What a request is aimed at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum TargetDescriptor {
    #[default]
    None,
    Position(DVec3),
    Agent(AgentId),
}

/// One entry of an agent's per-tick request list.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorRequest {
    pub kind: BehaviorKind,
    pub target: TargetDescriptor,
    /// Non-negative. Zero entries are skipped by every combiner.
    pub weight: f64,
}

/// A target resolved to plain kinematic data for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetState {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Forward axis, when the target is a craft.
    pub forward: Option<DVec3>,
    pub agent: Option<AgentId>,
}

impl TargetState {
    pub fn point(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            forward: None,
            agent: None,
        }
    }

    pub fn craft(agent: AgentId, kinematics: &Kinematics) -> Self {
        Self {
            position: kinematics.position,
            velocity: kinematics.world_velocity,
            forward: Some(kinematics.forward()),
            agent: Some(agent),
        }
    }
}

/// Everything a behavior may read.
pub struct SteeringInput<'a> {
    pub agent: AgentId,
    pub kinematics: &'a Kinematics,
    pub target: Option<TargetState>,
    pub roster: Roster<'a>,
    pub settings: &'a BehaviorSettings,
}

/// Resolve a descriptor against the roster. Destroyed or unknown agents
/// resolve to `None`.
pub fn resolve(descriptor: TargetDescriptor, roster: Roster<'_>) -> Option<TargetState> {
    match descriptor {
        TargetDescriptor::None => None,
        TargetDescriptor::Position(p) => Some(TargetState::point(p)),
        TargetDescriptor::Agent(id) => roster
            .live(id)
            .map(|record| TargetState::craft(id, &record.kinematics)),
    }
}

/// Evaluate one request for `agent`. `None` means no-op.
pub fn evaluate(
    request: &BehaviorRequest,
    agent: AgentId,
    kinematics: &Kinematics,
    roster: Roster<'_>,
    settings: &BehaviorSettings,
) -> Option<SteeringCommand> {
    let target = resolve(request.target, roster);
    // A request aimed at a craft that has gone stale is a no-op, whatever the kind.
    if matches!(request.target, TargetDescriptor::Agent(_)) && target.is_none() {
        return None;
    }

    match request.kind {
        BehaviorKind::Idle => Some(idle(kinematics)),
        BehaviorKind::Seek => target.map(|t| seek(kinematics, t.position, settings.max_speed)),
        BehaviorKind::Arrival => target.map(|t| {
            let min_speed = settings.min_arrival_speed.max(t.velocity.length());
            arrive(
                kinematics,
                t.position,
                min_speed,
                settings.deceleration,
                settings.max_speed,
            )
        }),
        BehaviorKind::Pursue => target.map(|t| pursue(kinematics, &t, settings.max_speed)),
        BehaviorKind::Flee => target.map(|t| flee(kinematics, t.position, settings.max_speed)),
        BehaviorKind::ObstacleAvoidance => avoid_obstacles(agent, kinematics, roster, settings),
        BehaviorKind::UnblockCone => target.and_then(|t| {
            unblock_cone(
                kinematics,
                &t,
                settings.threat_cone_half_angle,
                settings.max_speed,
            )
        }),
        BehaviorKind::Custom(custom) => custom(&SteeringInput {
            agent,
            kinematics,
            target,
            roster,
            settings,
        }),
    }
}

/// Highest speed from which the agent can still brake to `min_speed` within
/// `distance` at constant `deceleration`: `sqrt(v_min² + 2·a·d)`.
pub fn arrival_speed(min_speed: f64, deceleration: f64, distance: f64) -> f64 {
    let d = distance.max(0.0);
    let a = deceleration.max(0.0);
    (min_speed * min_speed + 2.0 * a * d).sqrt()
}

/// Hold the current heading with zero velocity.
pub fn idle(kinematics: &Kinematics) -> SteeringCommand {
    SteeringCommand::idle(kinematics.forward())
}

/// Head straight for `target` at `max_speed`.
pub fn seek(kinematics: &Kinematics, target: DVec3, max_speed: f64) -> SteeringCommand {
    let heading = (target - kinematics.position)
        .try_normalize()
        .unwrap_or_else(|| kinematics.forward());
    SteeringCommand {
        heading,
        velocity: Some(heading * max_speed),
        target_position: Some(target),
        up_hint: None,
    }
}

/// Seek with a braking-distance speed cap.
pub fn arrive(
    kinematics: &Kinematics,
    target: DVec3,
    min_speed: f64,
    deceleration: f64,
    max_speed: f64,
) -> SteeringCommand {
    let offset = target - kinematics.position;
    let distance = offset.length();
    let heading = offset.try_normalize().unwrap_or_else(|| kinematics.forward());
    let speed = arrival_speed(min_speed, deceleration, distance).min(max_speed);
    SteeringCommand {
        heading,
        velocity: Some(heading * speed),
        target_position: Some(target),
        up_hint: None,
    }
}

/// Head directly away from `threat`.
pub fn flee(kinematics: &Kinematics, threat: DVec3, max_speed: f64) -> SteeringCommand {
    let heading = (kinematics.position - threat)
        .try_normalize()
        .unwrap_or_else(|| kinematics.forward());
    SteeringCommand {
        heading,
        velocity: Some(heading * max_speed),
        target_position: None,
        up_hint: None,
    }
}

/// Lead a moving target. Two refinement passes of the predicted intercept
/// point, assuming the agent flies at `max_speed`.
pub fn pursue(kinematics: &Kinematics, target: &TargetState, max_speed: f64) -> SteeringCommand {
    let (intercept, _) = lead_intercept(kinematics.position, target, max_speed);
    seek(kinematics, intercept, max_speed)
}

/// Predicted intercept point and time for a pursuer at `from` flying at `speed`.
pub fn lead_intercept(from: DVec3, target: &TargetState, speed: f64) -> (DVec3, f64) {
    let speed = speed.max(1.0);
    let mut time = from.distance(target.position) / speed;
    for _ in 0..2 {
        let predicted = target.position + target.velocity * time;
        time = from.distance(predicted) / speed;
    }
    (target.position + target.velocity * time, time)
}

/// Estimated time until the two craft meet, from the closing velocity along
/// the line of sight. Falls back to combined speed if they are not closing,
/// and to infinity if neither is moving.
pub fn interception_time(kinematics: &Kinematics, target: &TargetState) -> f64 {
    let offset = target.position - kinematics.position;
    let range = offset.length();
    if range < 1.0 {
        return 0.0;
    }
    let los = offset / range;
    let closing = (kinematics.world_velocity - target.velocity).dot(los);
    if closing > 1.0 {
        range / closing
    } else {
        let speed = kinematics.speed() + target.velocity.length();
        if speed > 1.0 {
            range / speed
        } else {
            f64::INFINITY
        }
    }
}

/// Whether `point` lies inside the cone with apex `apex`, axis `axis` and
/// the given half-angle.
pub fn in_cone(apex: DVec3, axis: DVec3, point: DVec3, half_angle: f64) -> bool {
    let Some(dir) = (point - apex).try_normalize() else {
        return true;
    };
    let Some(axis) = axis.try_normalize() else {
        return false;
    };
    dir.dot(axis).clamp(-1.0, 1.0).acos() <= half_angle
}

/// Whether the agent sits inside the target craft's forward threat cone.
pub fn in_threat_cone(kinematics: &Kinematics, target: &TargetState, half_angle: f64) -> bool {
    target
        .forward
        .is_some_and(|axis| in_cone(target.position, axis, kinematics.position, half_angle))
}

/// Steer perpendicular to the target's forward axis to get out of its cone.
/// No-op when already outside the cone or when the target is not a craft.
pub fn unblock_cone(
    kinematics: &Kinematics,
    target: &TargetState,
    half_angle: f64,
    max_speed: f64,
) -> Option<SteeringCommand> {
    let axis = target.forward?.try_normalize()?;
    if !in_cone(target.position, axis, kinematics.position, half_angle) {
        return None;
    }
    let offset = kinematics.position - target.position;
    let lateral = offset - axis * offset.dot(axis);
    let heading = lateral
        .try_normalize()
        .unwrap_or_else(|| axis.any_orthonormal_vector());
    Some(SteeringCommand {
        heading,
        velocity: Some(heading * max_speed),
        target_position: None,
        up_hint: None,
    })
}

/// Steer away from the nearest live craft whose avoidance sphere intersects
/// the look-ahead corridor. No-op when the corridor is clear.
pub fn avoid_obstacles(
    agent: AgentId,
    kinematics: &Kinematics,
    roster: Roster<'_>,
    settings: &BehaviorSettings,
) -> Option<SteeringCommand> {
    let direction = kinematics
        .world_velocity
        .try_normalize()
        .unwrap_or_else(|| kinematics.forward());
    let lookahead = (kinematics.speed() * settings.obstacle_lookahead_secs)
        .max(settings.obstacle_min_lookahead);
    let clearance = settings.obstacle_radius * 2.0;

    let mut nearest: Option<(f64, DVec3)> = None;
    for other in roster.iter_live() {
        if other.id == agent {
            continue;
        }
        let offset = other.kinematics.position - kinematics.position;
        let along = offset.dot(direction);
        if along < 0.0 || along > lookahead + clearance {
            continue;
        }
        let lateral = offset - direction * along;
        if lateral.length() >= clearance {
            continue;
        }
        if nearest.map_or(true, |(best, _)| along < best) {
            nearest = Some((along, lateral));
        }
    }

    let (_, lateral) = nearest?;
    let away = (-lateral)
        .try_normalize()
        .unwrap_or_else(|| kinematics.right());
    let heading = (direction + away * 2.0).normalize_or_zero();
    let heading = if heading == DVec3::ZERO { away } else { heading };
    Some(SteeringCommand {
        heading,
        velocity: None,
        target_position: None,
        up_hint: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_speed_braking_relation() {
        let v = arrival_speed(0.0, 10.0, 100.0);
        assert!((v - 44.721_359_55).abs() < 1e-6, "got {v}");
        // Non-zero minimum speed adds in quadrature.
        let v = arrival_speed(30.0, 10.0, 100.0);
        assert!((v - (900.0f64 + 2000.0).sqrt()).abs() < 1e-9);
        // At the target, only the minimum speed remains.
        assert_eq!(arrival_speed(5.0, 10.0, 0.0), 5.0);
    }

    #[test]
    fn test_arrive_caps_speed_near_target() {
        let kin = Kinematics::at(DVec3::ZERO, DVec3::Y);
        let cmd = arrive(&kin, DVec3::new(0.0, 100.0, 0.0), 0.0, 10.0, 120.0);
        let speed = cmd.velocity.unwrap().length();
        assert!((speed - 44.721_359_55).abs() < 1e-6);
        assert!((cmd.heading - DVec3::Y).length() < 1e-9);

        // Far away the cruise speed cap wins.
        let cmd = arrive(&kin, DVec3::new(0.0, 10_000.0, 0.0), 0.0, 10.0, 120.0);
        assert!((cmd.velocity.unwrap().length() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_flee_points_away() {
        let kin = Kinematics::at(DVec3::new(10.0, 0.0, 0.0), DVec3::Y);
        let cmd = flee(&kin, DVec3::ZERO, 50.0);
        assert!((cmd.heading - DVec3::X).length() < 1e-9);
    }

    #[test]
    fn test_pursue_leads_crossing_target() {
        let kin = Kinematics::at(DVec3::ZERO, DVec3::Y);
        let target = TargetState {
            position: DVec3::new(0.0, 1000.0, 0.0),
            velocity: DVec3::new(50.0, 0.0, 0.0),
            forward: Some(DVec3::X),
            agent: None,
        };
        let cmd = pursue(&kin, &target, 100.0);
        assert!(
            cmd.heading.x > 0.0,
            "pursuit should lead an eastbound target, heading {:?}",
            cmd.heading
        );
        assert!(cmd.target_position.unwrap().x > target.position.x);
    }

    #[test]
    fn test_interception_time_head_on() {
        let kin = Kinematics::at(DVec3::ZERO, DVec3::Y).with_velocity(DVec3::new(0.0, 100.0, 0.0));
        let target = TargetState {
            position: DVec3::new(0.0, 1000.0, 0.0),
            velocity: DVec3::new(0.0, -100.0, 0.0),
            forward: Some(-DVec3::Y),
            agent: None,
        };
        let t = interception_time(&kin, &target);
        assert!((t - 5.0).abs() < 1e-9, "got {t}");

        let still = Kinematics::at(DVec3::ZERO, DVec3::Y);
        let parked = TargetState::point(DVec3::new(0.0, 1000.0, 0.0));
        assert!(interception_time(&still, &parked).is_infinite());
    }

    #[test]
    fn test_unblock_cone_only_inside_cone() {
        let target = TargetState {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            forward: Some(DVec3::Y),
            agent: None,
        };
        // Slightly off-axis, in front of the target.
        let inside = Kinematics::at(DVec3::new(10.0, 200.0, 0.0), -DVec3::Y);
        let cmd = unblock_cone(&inside, &target, 0.35, 100.0).expect("inside cone");
        assert!(cmd.heading.x > 0.99, "should slide out sideways: {:?}", cmd.heading);

        // Behind the target: nothing to do.
        let behind = Kinematics::at(DVec3::new(0.0, -200.0, 0.0), DVec3::Y);
        assert!(unblock_cone(&behind, &target, 0.35, 100.0).is_none());

        // Points have no cone.
        let point = TargetState::point(DVec3::ZERO);
        assert!(unblock_cone(&inside, &point, 0.35, 100.0).is_none());
    }

    #[test]
    fn test_in_cone_edges() {
        assert!(in_cone(DVec3::ZERO, DVec3::Y, DVec3::new(0.0, 10.0, 0.0), 0.1));
        assert!(!in_cone(DVec3::ZERO, DVec3::Y, DVec3::new(10.0, 0.0, 0.0), 0.1));
        assert!(!in_cone(DVec3::ZERO, DVec3::ZERO, DVec3::Y, 0.1));
    }

    #[test]
    fn test_seek_at_target_keeps_forward() {
        let kin = Kinematics::at(DVec3::new(5.0, 5.0, 5.0), DVec3::X);
        let cmd = seek(&kin, kin.position, 10.0);
        assert!((cmd.heading - DVec3::X).length() < 1e-9);
    }
}
