//! Scenario definitions: hardcoded scenes for demos and end-to-end tests.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use wingman_core::ids::{AgentId, DockingPointId, FactionId, PathId, SquadronId, StateId, StationId};
use wingman_core::types::WaypointPath;
use wingman_core::AiResult;

use crate::engine::SimulationEngine;

pub const BLUE: FactionId = FactionId(0);
pub const RED: FactionId = FactionId(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// Two opposing four-ship squadrons and a two-bay carrier behind blue.
    #[default]
    Skirmish,
    /// A single three-ship squadron flying a looped patrol route.
    Patrol,
}

/// Ids of everything a scenario created.
#[derive(Debug, Clone, Default)]
pub struct ScenarioHandles {
    pub squadrons: Vec<SquadronId>,
    pub station: Option<StationId>,
    pub docking_points: Vec<DockingPointId>,
    pub path: Option<PathId>,
}

/// Populate `engine` with the given scenario.
pub fn load(engine: &mut SimulationEngine, scenario: ScenarioId) -> AiResult<ScenarioHandles> {
    match scenario {
        ScenarioId::Skirmish => build_skirmish(engine),
        ScenarioId::Patrol => build_patrol(engine),
    }
}

/// Skirmish: "Merge"
/// Blue and red start 3 km apart heading at each other, 500 m up.
/// The blue carrier sits 1 km behind blue with bays opening east and west.
fn build_skirmish(engine: &mut SimulationEngine) -> AiResult<ScenarioHandles> {
    let blue = engine.spawn_squadron(
        "blue",
        BLUE,
        DVec3::new(-1500.0, 0.0, 500.0),
        DVec3::X,
        4,
    )?;
    let red = engine.spawn_squadron(
        "red",
        RED,
        DVec3::new(1500.0, 0.0, 500.0),
        DVec3::NEG_X,
        4,
    )?;
    let (station, docking_points) = engine.spawn_station(
        "carrier",
        DVec3::new(-2500.0, 0.0, 0.0),
        &[
            (DVec3::new(40.0, 0.0, 0.0), DVec3::X),
            (DVec3::new(-40.0, 0.0, 0.0), DVec3::NEG_X),
        ],
    )?;

    // Seed targets now rather than waiting for the first retarget interval.
    engine.ai_mut().update_squadrons();

    Ok(ScenarioHandles {
        squadrons: vec![blue, red],
        station: Some(station),
        docking_points,
        path: None,
    })
}

/// Patrol: "Racetrack"
/// Three blue craft fly a looped four-leg route around the origin.
fn build_patrol(engine: &mut SimulationEngine) -> AiResult<ScenarioHandles> {
    let squadron = engine.spawn_squadron(
        "patrol",
        BLUE,
        DVec3::new(0.0, -1000.0, 300.0),
        DVec3::X,
        3,
    )?;
    let route = WaypointPath::new(
        "racetrack",
        vec![
            DVec3::new(1000.0, -1000.0, 300.0),
            DVec3::new(1000.0, 1000.0, 300.0),
            DVec3::new(-1000.0, 1000.0, 300.0),
            DVec3::new(-1000.0, -1000.0, 300.0),
        ],
        true,
    );

    let ai = engine.ai_mut();
    let path = ai.add_path(route);
    let members: Vec<AgentId> = ai
        .squadrons()
        .get(squadron)
        .map(|s| s.members().iter().flatten().copied().collect())
        .unwrap_or_default();
    for agent in members {
        ai.assign_target_path(agent, path);
        ai.set_state(agent, StateId::MOVE_TO_TARGET);
    }

    Ok(ScenarioHandles {
        squadrons: vec![squadron],
        path: Some(path),
        ..Default::default()
    })
}
