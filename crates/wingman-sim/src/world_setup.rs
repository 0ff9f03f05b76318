//! Entity spawn factories for setting up the simulation world.
//!
//! Every craft is registered with the AI context first and then spawned as
//! an entity carrying its `Craft` link, pose, velocity and limits.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use wingman_ai::AiContext;
use wingman_core::components::*;
use wingman_core::ids::{AgentId, DockingPointId, FactionId, SquadronId, StationId};
use wingman_core::types::Kinematics;
use wingman_core::AiResult;

/// Lateral spacing between squadron members (m).
pub const FORMATION_SPACING: f64 = 60.0;

/// Random spawn offset applied to each squadron member on every axis (m).
const FORMATION_JITTER: f64 = 5.0;

/// Everything needed to spawn one craft.
#[derive(Debug, Clone, Copy)]
pub struct CraftTemplate {
    pub faction: FactionId,
    pub position: DVec3,
    pub heading: DVec3,
    pub limits: CraftLimits,
    pub player: bool,
}

impl CraftTemplate {
    pub fn new(faction: FactionId, position: DVec3, heading: DVec3, limits: CraftLimits) -> Self {
        Self {
            faction,
            position,
            heading,
            limits,
            player: false,
        }
    }

    pub fn player(mut self) -> Self {
        self.player = true;
        self
    }
}

/// Line-abreast formation for a new squadron.
#[derive(Debug, Clone, Copy)]
pub struct Formation {
    pub origin: DVec3,
    pub heading: DVec3,
    pub count: usize,
    pub spacing: f64,
}

impl Formation {
    /// Slot positions, centred on `origin` and spread across the heading.
    fn slots(&self) -> impl Iterator<Item = DVec3> + '_ {
        let forward = self.heading.try_normalize().unwrap_or(DVec3::Y);
        let right = forward.cross(DVec3::Z).try_normalize().unwrap_or(DVec3::X);
        let half = (self.count.saturating_sub(1)) as f64 * 0.5;
        (0..self.count).map(move |i| self.origin + right * ((i as f64 - half) * self.spacing))
    }
}

/// Result of spawning a squadron.
pub struct SpawnedSquadron {
    pub squadron: SquadronId,
    pub members: Vec<(AgentId, Entity)>,
}

/// Register an agent and spawn its craft entity.
pub fn spawn_craft(world: &mut World, ai: &mut AiContext, craft: CraftTemplate) -> (AgentId, Entity) {
    let kinematics = Kinematics::at(craft.position, craft.heading);
    let agent = if craft.player {
        ai.spawn_player(craft.faction, kinematics)
    } else {
        ai.spawn_agent(craft.faction, kinematics)
    };

    let entity = world.spawn((
        Craft { agent },
        Transform {
            position: kinematics.position,
            orientation: kinematics.orientation,
        },
        LinearVelocity::default(),
        craft.limits,
        SteeringInput::default(),
    ));
    if craft.player {
        let _ = world.insert_one(entity, PlayerControlled);
    }
    (agent, entity)
}

/// Spawn a squadron in formation with a little positional jitter.
pub fn spawn_squadron(
    world: &mut World,
    ai: &mut AiContext,
    rng: &mut ChaCha8Rng,
    name: &str,
    faction: FactionId,
    formation: Formation,
    limits: CraftLimits,
) -> AiResult<SpawnedSquadron> {
    let squadron = ai.create_squadron(name, faction);
    let mut members = Vec::with_capacity(formation.count);

    for slot in formation.slots() {
        let jitter = DVec3::new(
            rng.gen_range(-FORMATION_JITTER..=FORMATION_JITTER),
            rng.gen_range(-FORMATION_JITTER..=FORMATION_JITTER),
            rng.gen_range(-FORMATION_JITTER..=FORMATION_JITTER),
        );
        let craft = CraftTemplate::new(faction, slot + jitter, formation.heading, limits);
        let (agent, entity) = spawn_craft(world, ai, craft);
        ai.add_to_squadron(squadron, agent)?;
        members.push((agent, entity));
    }

    Ok(SpawnedSquadron { squadron, members })
}

/// Register a docking station. Each bay is `(offset from station, approach
/// axis)`; bays share the world up axis.
pub fn spawn_station(
    ai: &mut AiContext,
    name: &str,
    position: DVec3,
    bays: &[(DVec3, DVec3)],
) -> AiResult<(StationId, Vec<DockingPointId>)> {
    let station = ai.add_station(name);
    let points = bays
        .iter()
        .map(|&(offset, axis)| ai.add_docking_point(station, position + offset, axis, DVec3::Z))
        .collect::<AiResult<Vec<_>>>()?;
    Ok((station, points))
}
