//! Simulation engine: hosts an `AiContext` next to a hecs world of craft.
//!
//! `SimulationEngine` owns the ECS world and the AI context, processes
//! queued `AiCommand`s at tick boundaries, runs the systems in a fixed
//! order, and produces `SimSnapshot`s. Completely headless, so the whole
//! loop can be tested deterministically.

use std::collections::{HashMap, VecDeque};

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wingman_ai::AiContext;
use wingman_core::commands::AiCommand;
use wingman_core::components::{CraftLimits, Destroyed};
use wingman_core::config::AiConfig;
use wingman_core::constants::DT;
use wingman_core::ids::{AgentId, DockingPointId, FactionId, SquadronId, StationId};
use wingman_core::state::SimSnapshot;
use wingman_core::types::SimTime;
use wingman_core::AiResult;

use crate::systems;
use crate::world_setup::{self, CraftTemplate};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// AI core configuration. Its seed also drives spawn jitter.
    pub ai: AiConfig,
    /// Performance envelope given to craft spawned without explicit limits.
    pub limits: CraftLimits,
}

impl SimConfig {
    /// Parse a JSON config, filling missing fields with defaults.
    pub fn from_json(json: &str) -> AiResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.ai.validate()?;
        Ok(config)
    }
}

/// The simulation engine. Owns the ECS world, the AI context and all sim state.
pub struct SimulationEngine {
    world: World,
    ai: AiContext,
    entities: HashMap<AgentId, Entity>,
    time: SimTime,
    paused: bool,
    limits: CraftLimits,
    rng: ChaCha8Rng,
    command_queue: VecDeque<AiCommand>,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create a new engine. Fails if the AI config is invalid.
    pub fn new(config: SimConfig) -> AiResult<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.ai.seed.wrapping_add(1));
        Ok(Self {
            world: World::new(),
            ai: AiContext::new(config.ai)?,
            entities: HashMap::new(),
            time: SimTime::default(),
            paused: false,
            limits: config.limits,
            rng,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
        })
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: AiCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = AiCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> SimSnapshot {
        self.process_commands();

        if !self.paused {
            self.run_systems();
            self.time.advance();
        }

        let events = self.ai.drain_events();
        systems::snapshot::build_snapshot(&self.world, &self.ai, &self.time, self.paused, events)
    }

    // --- Setup ---

    /// Spawn an AI-controlled craft.
    pub fn spawn_craft(&mut self, faction: FactionId, position: DVec3, heading: DVec3) -> AgentId {
        let craft = CraftTemplate::new(faction, position, heading, self.limits);
        self.spawn(craft)
    }

    /// Spawn a player-controlled craft. The AI core never steers it.
    pub fn spawn_player(&mut self, faction: FactionId, position: DVec3, heading: DVec3) -> AgentId {
        let craft = CraftTemplate::new(faction, position, heading, self.limits).player();
        self.spawn(craft)
    }

    fn spawn(&mut self, craft: CraftTemplate) -> AgentId {
        let (agent, entity) = world_setup::spawn_craft(&mut self.world, &mut self.ai, craft);
        self.entities.insert(agent, entity);
        agent
    }

    /// Spawn `count` craft in line abreast around `origin` and group them
    /// into a new squadron.
    pub fn spawn_squadron(
        &mut self,
        name: &str,
        faction: FactionId,
        origin: DVec3,
        heading: DVec3,
        count: usize,
    ) -> AiResult<SquadronId> {
        let formation = world_setup::Formation {
            origin,
            heading,
            count,
            spacing: world_setup::FORMATION_SPACING,
        };
        let spawned = world_setup::spawn_squadron(
            &mut self.world,
            &mut self.ai,
            &mut self.rng,
            name,
            faction,
            formation,
            self.limits,
        )?;
        self.entities.extend(spawned.members);
        Ok(spawned.squadron)
    }

    /// Add a docking station with one point per `(offset, approach_axis)` pair.
    pub fn spawn_station(
        &mut self,
        name: &str,
        position: DVec3,
        bays: &[(DVec3, DVec3)],
    ) -> AiResult<(StationId, Vec<DockingPointId>)> {
        world_setup::spawn_station(&mut self.ai, name, position, bays)
    }

    // --- Accessors ---

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn ai(&self) -> &AiContext {
        &self.ai
    }

    /// Mutable access for registering states, landmarks and observers.
    pub fn ai_mut(&mut self) -> &mut AiContext {
        &mut self.ai
    }

    /// The craft entity of an agent, while it exists.
    pub fn entity(&self, agent: AgentId) -> Option<Entity> {
        self.entities.get(&agent).copied()
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: AiCommand) {
        match command {
            AiCommand::SetState { agent, state } => {
                if !self.ai.set_state(agent, state) {
                    debug!(%agent, %state, "set_state refused");
                }
            }
            AiCommand::AssignTargetPosition { agent, position } => {
                self.ai.assign_target_position(agent, position);
            }
            AiCommand::AssignTargetAgent { agent, target } => {
                if !self.ai.assign_target_agent(agent, target) {
                    debug!(%agent, %target, "target agent refused");
                }
            }
            AiCommand::AssignTargetPath { agent, path } => {
                self.ai.assign_target_path(agent, path);
            }
            AiCommand::AssignTargetLocation { agent, name } => {
                if !self.ai.assign_target_location(agent, &name) {
                    debug!(%agent, location = %name, "unknown location");
                }
            }
            AiCommand::ClearTarget { agent } => {
                self.ai.clear_target(agent);
            }
            AiCommand::UpdateSquadrons => {
                self.ai.update_squadrons();
            }
            AiCommand::Dock { agent, point } => {
                if let Err(err) = self.ai.dock(agent, point) {
                    warn!(%agent, %err, "dock request refused");
                }
            }
            AiCommand::Undock { agent } => {
                self.ai.undock(agent);
            }
            AiCommand::DestroyAgent { agent } => {
                if self.ai.destroy_agent(agent) {
                    if let Some(&entity) = self.entities.get(&agent) {
                        let _ = self.world.insert_one(entity, Destroyed);
                    }
                }
            }
            AiCommand::Pause => {
                self.paused = true;
            }
            AiCommand::Resume => {
                self.paused = false;
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Kinematic source: craft state into the AI context
        systems::sensing::run(&self.world, &mut self.ai);
        // 2. Decisions, squadrons, docking
        self.ai.tick(DT);
        // 3. Locomotion: steering commands into velocity and orientation
        systems::locomotion::run(&mut self.world, &self.ai, DT);
        // 4. Movement integration
        systems::movement::run(&mut self.world, DT);
        // 5. Cleanup (destroyed, out of bounds)
        systems::cleanup::run(
            &mut self.world,
            &mut self.ai,
            &mut self.entities,
            &mut self.despawn_buffer,
        );
    }
}
