//! Snapshot system: reads the ECS world and the AI context and builds a
//! complete `SimSnapshot`.
//!
//! This system is read-only. It never modifies the world or the context.

use glam::DVec3;
use hecs::World;

use wingman_ai::AiContext;
use wingman_core::components::{Craft, LinearVelocity, Transform};
use wingman_core::events::AiEvent;
use wingman_core::ids::StateId;
use wingman_core::state::*;
use wingman_core::types::SimTime;

/// Build a complete SimSnapshot from the current world and AI state.
pub fn build_snapshot(
    world: &World,
    ai: &AiContext,
    time: &SimTime,
    paused: bool,
    events: Vec<AiEvent>,
) -> SimSnapshot {
    SimSnapshot {
        time: *time,
        paused,
        agents: build_agents(world, ai),
        squadrons: build_squadrons(ai),
        docking_points: build_docking_points(ai),
        events,
    }
}

/// One AgentView per live craft, ordered by agent id.
fn build_agents(world: &World, ai: &AiContext) -> Vec<AgentView> {
    let mut views: Vec<AgentView> = world
        .query::<(&Craft, &Transform, &LinearVelocity)>()
        .iter()
        .filter_map(|(_entity, (craft, transform, velocity))| {
            let record = ai.agents().live(craft.agent)?;
            let target = ai.target(craft.agent).unwrap_or_default();
            Some(AgentView {
                agent: craft.agent,
                position: transform.position,
                velocity: velocity.0,
                heading: transform.orientation * DVec3::Y,
                state: ai.state(craft.agent).unwrap_or(StateId::IDLE),
                state_name: ai.state_name(craft.agent).unwrap_or_default().to_string(),
                action_completed: ai.has_completed_action(craft.agent),
                target_kind: target.kind(),
                target_agent: ai.target_agent(craft.agent),
                squadron: record.squadron,
                faction: record.faction,
                docking: ai.docking_state(craft.agent),
                player_controlled: record.player_controlled,
            })
        })
        .collect();
    views.sort_by_key(|view| view.agent);
    views
}

fn build_squadrons(ai: &AiContext) -> Vec<SquadronView> {
    ai.squadrons()
        .iter()
        .map(|squadron| SquadronView {
            squadron: squadron.id,
            name: squadron.name.clone(),
            faction: squadron.faction,
            live_members: squadron.live_count(),
            target_squadron: squadron.target(),
        })
        .collect()
}

fn build_docking_points(ai: &AiContext) -> Vec<DockingPointView> {
    ai.docking()
        .points()
        .iter()
        .map(|point| DockingPointView {
            point: point.id,
            station: point.station,
            position: point.position,
            state: point.state(),
            occupant: point.occupant(),
        })
        .collect()
}
