//! Built-in behavior states.
//!
//! Each state is a decision function that reads the agent's target and
//! surroundings and pushes weighted behavior requests, highest priority
//! first. Transition logic lives here too: a state may flag its action as
//! completed or move the agent to another state through the context.

use tracing::trace;

use wingman_core::enums::CombinerPolicy;
use wingman_core::ids::{PathId, StateId};
use wingman_core::AiResult;

use crate::decision::DecisionContext;
use crate::registry::StateRegistry;
use crate::requests::RequestBuffer;
use crate::steering::{
    in_threat_cone, interception_time, BehaviorKind, TargetDescriptor, TargetState,
};
use crate::target::Target;

pub const IDLE: &str = "idle";
pub const MOVE_TO_TARGET: &str = "move-to-target";
pub const DOGFIGHT: &str = "dogfight";
pub const ATTACK: &str = "attack";

/// Hold position.
pub fn idle(_ctx: &mut DecisionContext<'_>, out: &mut RequestBuffer) {
    out.push(BehaviorKind::Idle, TargetDescriptor::None, 1.0);
}

/// Travel to whatever the agent is targeting.
///
/// Positions and locations are approached with arrival and complete inside
/// the arrival radius. Agents are pursued until destroyed. Paths advance one
/// waypoint at a time; a non-looping path completes at its last waypoint.
pub fn move_to_target(ctx: &mut DecisionContext<'_>, out: &mut RequestBuffer) {
    out.push(
        BehaviorKind::ObstacleAvoidance,
        TargetDescriptor::None,
        ctx.settings.avoid_weight,
    );

    match ctx.target() {
        Target::None => {
            out.push(BehaviorKind::Idle, TargetDescriptor::None, 1.0);
        }
        Target::Agent(id) => {
            if ctx.roster.is_alive(id) {
                out.push(BehaviorKind::Pursue, TargetDescriptor::Agent(id), 1.0);
            } else {
                ctx.set_action_completed(true);
                out.push(BehaviorKind::Idle, TargetDescriptor::None, 1.0);
            }
        }
        Target::Path { path, next } => follow_path(ctx, out, path, next),
        Target::Position(_) | Target::Location(_) => match ctx.target_position() {
            Some(goal) => {
                if ctx.range_to(goal) <= ctx.settings.arrival_radius {
                    ctx.set_action_completed(true);
                }
                out.push(BehaviorKind::Arrival, TargetDescriptor::Position(goal), 1.0);
            }
            None => {
                ctx.set_action_completed(true);
                out.push(BehaviorKind::Idle, TargetDescriptor::None, 1.0);
            }
        },
    }
}

fn follow_path(
    ctx: &mut DecisionContext<'_>,
    out: &mut RequestBuffer,
    path: PathId,
    next: usize,
) {
    let Some(route) = ctx.landmarks.path(path) else {
        ctx.set_action_completed(true);
        out.push(BehaviorKind::Idle, TargetDescriptor::None, 1.0);
        return;
    };
    if route.is_empty() {
        ctx.set_action_completed(true);
        out.push(BehaviorKind::Idle, TargetDescriptor::None, 1.0);
        return;
    }

    let last = route.len() - 1;
    let mut next = next.min(last);
    let reached = route
        .waypoint(next)
        .is_some_and(|wp| ctx.range_to(wp) <= ctx.settings.waypoint_radius);
    if reached {
        if next < last {
            next += 1;
        } else if route.looped {
            next = 0;
        } else {
            ctx.set_action_completed(true);
        }
        trace!(agent = %ctx.agent, %path, next, "path progress");
        ctx.set_target(Target::Path { path, next });
    }

    // Only the final stop of an open path needs to be arrived at.
    let kind = if next == last && !route.looped {
        BehaviorKind::Arrival
    } else {
        BehaviorKind::Seek
    };
    if let Some(goal) = route.waypoint(next) {
        out.push(kind, TargetDescriptor::Position(goal), 1.0);
    }
}

/// Engage the target agent: stay out of its forward cone when cheap to do
/// so, otherwise chase it. Completes and heads home once the target is gone.
pub fn dogfight(ctx: &mut DecisionContext<'_>, out: &mut RequestBuffer) {
    out.push(
        BehaviorKind::ObstacleAvoidance,
        TargetDescriptor::None,
        ctx.settings.avoid_weight,
    );

    let Some(target) = ctx.target_agent().map(|r| r.id) else {
        ctx.set_action_completed(true);
        out.push(BehaviorKind::Arrival, TargetDescriptor::Position(ctx.home), 1.0);
        return;
    };
    out.push(
        BehaviorKind::UnblockCone,
        TargetDescriptor::Agent(target),
        ctx.settings.evade_cone_weight,
    );
    out.push(BehaviorKind::Pursue, TargetDescriptor::Agent(target), 1.0);
}

/// Composite attack run.
///
/// Priority order: avoid obstacles; return home when either craft leaves
/// the theater (completing if the target left); dodge the target's forward
/// cone; flee when in front of the target and about to meet it; then pursue
/// on long interceptions and arrive on short ones.
pub fn attack(ctx: &mut DecisionContext<'_>, out: &mut RequestBuffer) {
    let settings = *ctx.settings;
    out.push(
        BehaviorKind::ObstacleAvoidance,
        TargetDescriptor::None,
        settings.avoid_weight,
    );

    let Some(record) = ctx.target_agent() else {
        ctx.set_action_completed(true);
        out.push(BehaviorKind::Seek, TargetDescriptor::Position(ctx.home), 1.0);
        return;
    };
    let id = record.id;
    let target = TargetState::craft(id, &record.kinematics);

    let self_out = !ctx.in_theater(ctx.kinematics.position);
    let target_out = !ctx.in_theater(target.position);
    if self_out || target_out {
        if target_out {
            ctx.set_action_completed(true);
        }
        out.push(BehaviorKind::Seek, TargetDescriptor::Position(ctx.home), 1.0);
        return;
    }

    out.push(
        BehaviorKind::UnblockCone,
        TargetDescriptor::Agent(id),
        settings.evade_cone_weight,
    );

    let time = interception_time(ctx.kinematics, &target);
    if in_threat_cone(ctx.kinematics, &target, settings.threat_cone_half_angle)
        && time < settings.flee_time_threshold
    {
        out.push(BehaviorKind::Flee, TargetDescriptor::Agent(id), 1.0);
    }

    let approach = if time > settings.pursue_time_threshold {
        BehaviorKind::Pursue
    } else {
        BehaviorKind::Arrival
    };
    out.push(approach, TargetDescriptor::Agent(id), 1.0);
}

/// Add the composite `attack` state to a registry.
pub fn register_attack_state(registry: &mut StateRegistry) -> AiResult<StateId> {
    registry.register(ATTACK, attack, CombinerPolicy::PrioritisedDithering)
}
