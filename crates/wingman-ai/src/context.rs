//! The AI context: one per scene.
//!
//! `AiContext` owns every table the core needs (state registry, agents,
//! landmarks, squadrons, docking, observers and the RNG) and is the single
//! entry point for the host. Nothing is global, so several contexts can run
//! side by side and each is reproducible from its seed.
//!
//! A tick runs, in order: the squadron timer (and retarget pass when due),
//! the docking update, the steering pass (on its own interval), and finally
//! an immediate retarget for squadron members that completed their action.

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use wingman_core::config::AiConfig;
use wingman_core::constants::MAX_DECISIONS_PER_TICK;
use wingman_core::enums::{CombinerPolicy, DockingState, TargetingPolicy};
use wingman_core::events::AiEvent;
use wingman_core::ids::{
    AgentId, DockingPointId, FactionId, LocationId, PathId, SquadronId, StateId, StationId,
};
use wingman_core::types::{Kinematics, SteeringCommand, WaypointPath};
use wingman_core::{AiError, AiResult};

use crate::agents::{AgentRecord, AgentStore, AgentTablesMut, Roster};
use crate::blender::blend;
use crate::decision::DecisionContext;
use crate::docking::DockingSystem;
use crate::observer::{AiObserver, EventSink};
use crate::registry::{DecisionFn, StateRegistry};
use crate::requests::RequestBuffer;
use crate::squadron::{RetargetScope, SquadronCoordinator};
use crate::states::register_attack_state;
use crate::steering;
use crate::target::{closest_agent, resolve_position, Landmarks, Target};

pub struct AiContext {
    config: AiConfig,
    registry: StateRegistry,
    agents: AgentStore,
    landmarks: Landmarks,
    squadrons: SquadronCoordinator,
    docking: DockingSystem,
    events: EventSink,
    rng: ChaCha8Rng,
    requests: RequestBuffer,
    steering_elapsed: f64,
    completed: Vec<(AgentId, StateId)>,
}

impl AiContext {
    pub fn new(config: AiConfig) -> AiResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: StateRegistry::new(),
            agents: AgentStore::new(),
            landmarks: Landmarks::default(),
            squadrons: SquadronCoordinator::new(
                config.targeting_policy,
                config.retarget_interval_secs,
            ),
            docking: DockingSystem::new(),
            events: EventSink::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            requests: RequestBuffer::new(),
            steering_elapsed: 0.0,
            completed: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    // --- Observers ---

    pub fn subscribe(&mut self, observer: impl AiObserver + 'static) {
        self.events.subscribe(observer);
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<AiEvent> {
        self.events.drain()
    }

    // --- State registry ---

    pub fn register_state(
        &mut self,
        name: &str,
        decide: DecisionFn,
        policy: CombinerPolicy,
    ) -> AiResult<StateId> {
        self.registry.register(name, decide, policy)
    }

    pub fn register_attack_state(&mut self) -> AiResult<StateId> {
        register_attack_state(&mut self.registry)
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.registry.id_of(name)
    }

    // --- Agents ---

    /// Add an AI-controlled agent.
    pub fn spawn_agent(&mut self, faction: FactionId, kinematics: Kinematics) -> AgentId {
        self.agents.spawn(faction, kinematics, false)
    }

    /// Add a human-flown agent. It can be targeted but is never steered.
    pub fn spawn_player(&mut self, faction: FactionId, kinematics: Kinematics) -> AgentId {
        self.agents.spawn(faction, kinematics, true)
    }

    /// Mark an agent destroyed. References to it go stale and are cleaned up
    /// lazily by whoever holds them.
    pub fn destroy_agent(&mut self, agent: AgentId) -> bool {
        if !self.agents.destroy(agent) {
            return false;
        }
        debug!(%agent, "agent destroyed");
        self.events.emit(AiEvent::AgentDestroyed { agent });
        true
    }

    /// Feed the latest kinematics for an agent from the locomotion layer.
    pub fn update_kinematics(&mut self, agent: AgentId, kinematics: Kinematics) -> bool {
        self.agents.set_kinematics(agent, kinematics)
    }

    pub fn agent(&self, agent: AgentId) -> Option<&AgentRecord> {
        self.agents.get(agent)
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn roster(&self) -> Roster<'_> {
        self.agents.roster()
    }

    /// This tick's command for `agent`. `None` for destroyed, player, or
    /// not-yet-steered agents.
    pub fn command(&self, agent: AgentId) -> Option<SteeringCommand> {
        self.agents.command(agent)
    }

    // --- State machine ---

    /// Move `agent` to `state`. Rejected for unknown states, destroyed
    /// agents, and anything but `idle` while the agent is docking.
    pub fn set_state(&mut self, agent: AgentId, state: StateId) -> bool {
        if !self.registry.contains(state) {
            warn!(%agent, %state, "set_state with unregistered state");
            return false;
        }
        if !self.agents.is_alive(agent) {
            return false;
        }
        if !self.docking.allows_state(agent, state) {
            debug!(%agent, %state, "state change blocked while docking");
            return false;
        }
        let Some(machine) = self.agents.machine_mut(agent) else {
            return false;
        };
        if let Some(previous) = machine.transition(state) {
            self.events.emit(AiEvent::StateChanged {
                agent,
                previous,
                current: state,
            });
        }
        true
    }

    pub fn state(&self, agent: AgentId) -> Option<StateId> {
        self.agents.machine(agent).map(|m| m.state())
    }

    pub fn state_name(&self, agent: AgentId) -> Option<&str> {
        self.state(agent).and_then(|id| self.registry.name_of(id))
    }

    pub fn set_action_completed(&mut self, agent: AgentId, completed: bool) -> bool {
        if !self.agents.is_alive(agent) {
            return false;
        }
        let Some(machine) = self.agents.machine_mut(agent) else {
            return false;
        };
        if machine.set_action_completed(completed) {
            let state = machine.state();
            self.events.emit(AiEvent::ActionCompleted { agent, state });
        }
        true
    }

    pub fn has_completed_action(&self, agent: AgentId) -> bool {
        self.agents
            .machine(agent)
            .is_some_and(|m| m.has_completed_action())
    }

    // --- Targets ---

    fn set_target(&mut self, agent: AgentId, target: Target) -> bool {
        if !self.agents.is_alive(agent) {
            return false;
        }
        match self.agents.target_mut(agent) {
            Some(slot) => {
                *slot = target;
                true
            }
            None => false,
        }
    }

    pub fn assign_target_position(&mut self, agent: AgentId, position: DVec3) -> bool {
        self.set_target(agent, Target::Position(position))
    }

    /// Target another live agent. Self-targeting is refused.
    pub fn assign_target_agent(&mut self, agent: AgentId, target: AgentId) -> bool {
        if target == agent || !self.agents.is_alive(target) {
            return false;
        }
        self.set_target(agent, Target::Agent(target))
    }

    /// Follow a path from its first waypoint.
    pub fn assign_target_path(&mut self, agent: AgentId, path: PathId) -> bool {
        if self.landmarks.path(path).is_none() {
            return false;
        }
        self.set_target(agent, Target::Path { path, next: 0 })
    }

    pub fn assign_target_location(&mut self, agent: AgentId, name: &str) -> bool {
        let Some(location) = self.landmarks.location_id(name) else {
            debug!(%agent, name, "unknown location");
            return false;
        };
        self.set_target(agent, Target::Location(location))
    }

    pub fn clear_target(&mut self, agent: AgentId) -> bool {
        self.set_target(agent, Target::None)
    }

    pub fn target(&self, agent: AgentId) -> Option<Target> {
        self.agents.target(agent).copied()
    }

    pub fn target_position(&self, agent: AgentId) -> Option<DVec3> {
        let target = self.agents.target(agent)?;
        resolve_position(target, self.agents.roster(), &self.landmarks)
    }

    /// The target agent if it is still alive.
    pub fn target_agent(&self, agent: AgentId) -> Option<AgentId> {
        self.agents
            .target(agent)?
            .agent()
            .filter(|&id| self.agents.is_alive(id))
    }

    pub fn add_path(&mut self, path: WaypointPath) -> PathId {
        self.landmarks.add_path(path)
    }

    pub fn add_location(&mut self, name: &str, position: DVec3) -> LocationId {
        self.landmarks.add_location(name, position)
    }

    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    // --- Squadrons ---

    pub fn create_squadron(&mut self, name: &str, faction: FactionId) -> SquadronId {
        self.squadrons.create(name, faction)
    }

    /// Add a live agent to a squadron. An agent belongs to one squadron.
    pub fn add_to_squadron(&mut self, squadron: SquadronId, agent: AgentId) -> AiResult<()> {
        self.require_live(agent)?;
        if self.squadrons.get(squadron).is_none() {
            return Err(AiError::UnknownSquadron(squadron));
        }
        if let Some(current) = self.agents.get(agent).and_then(|r| r.squadron) {
            if current != squadron {
                return Err(AiError::AlreadyInSquadron {
                    agent,
                    squadron: current,
                });
            }
        }
        self.squadrons.add_member(squadron, agent)?;
        self.agents.set_squadron(agent, Some(squadron));
        Ok(())
    }

    pub fn squadrons(&self) -> &SquadronCoordinator {
        &self.squadrons
    }

    pub fn target_squadron(&self, faction: FactionId) -> Option<SquadronId> {
        self.squadrons.target_squadron(faction)
    }

    pub fn next_target_ship(&self, squadron: SquadronId, start: usize) -> Option<(usize, AgentId)> {
        self.squadrons.next_target_ship(
            squadron,
            start,
            self.agents.roster(),
            self.config.theater.as_ref(),
        )
    }

    /// The nearest live agent of another faction inside the theater.
    pub fn closest_enemy(&self, agent: AgentId) -> Option<AgentId> {
        let record = self.agents.live(agent)?;
        let roster = self.agents.roster();
        let theater = self.config.theater.as_ref();
        closest_agent(
            record.kinematics.position,
            roster.iter_live().filter(|r| r.faction != record.faction).map(|r| r.id),
            roster,
            |id| {
                roster.live(id).is_some_and(|r| {
                    theater.map_or(true, |bounds| bounds.contains(r.kinematics.position))
                })
            },
        )
    }

    /// Replace the retarget policy. A downgrade is reported again if the new
    /// policy does not fit either.
    pub fn set_targeting_policy(&mut self, policy: TargetingPolicy) {
        self.squadrons.set_policy(policy);
    }

    /// State squadron members enter when they are handed a target.
    pub fn set_engage_state(&mut self, state: StateId) -> AiResult<()> {
        if !self.registry.contains(state) {
            return Err(AiError::UnknownState(state));
        }
        self.squadrons.set_engage_state(state);
        Ok(())
    }

    /// Run the squadron retarget pass now.
    pub fn update_squadrons(&mut self) {
        let mut tables = self.agents.tables_mut();
        let mut scope = RetargetScope {
            tables: &mut tables,
            theater: self.config.theater.as_ref(),
            docking: &self.docking,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        self.squadrons.update(&mut scope);
    }

    // --- Docking ---

    pub fn add_station(&mut self, name: &str) -> StationId {
        self.docking.add_station(name)
    }

    pub fn add_docking_point(
        &mut self,
        station: StationId,
        position: DVec3,
        approach_axis: DVec3,
        up: DVec3,
    ) -> AiResult<DockingPointId> {
        self.docking.add_point(station, position, approach_axis, up)
    }

    fn require_live(&self, agent: AgentId) -> AiResult<()> {
        match self.agents.get(agent) {
            None => Err(AiError::UnknownAgent(agent)),
            Some(record) if !record.alive => Err(AiError::AgentDestroyed(agent)),
            Some(_) => Ok(()),
        }
    }

    pub fn assign_to_point(&mut self, agent: AgentId, point: DockingPointId) -> AiResult<()> {
        self.require_live(agent)?;
        self.docking.assign_to_point(agent, point)
    }

    /// Begin docking. The agent drops to `idle` and docking takes over its
    /// steering until it has undocked.
    pub fn dock(&mut self, agent: AgentId, point: Option<DockingPointId>) -> AiResult<DockingPointId> {
        self.require_live(agent)?;
        let point = self.docking.dock(agent, point, &mut self.events)?;
        self.set_state(agent, StateId::IDLE);
        Ok(point)
    }

    /// Begin undocking. A no-op unless the agent is docked.
    pub fn undock(&mut self, agent: AgentId) -> bool {
        self.docking.undock(agent, &mut self.events)
    }

    pub fn docking_state(&self, agent: AgentId) -> DockingState {
        self.docking.state(agent)
    }

    pub fn docking(&self) -> &DockingSystem {
        &self.docking
    }

    // --- Tick ---

    /// Advance the core by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.squadrons.advance(dt) {
            self.update_squadrons();
        }
        self.docking.update(
            dt,
            self.agents.roster(),
            &self.config.docking,
            &mut self.events,
        );

        self.steering_elapsed += dt;
        if self.steering_elapsed >= self.config.steering_interval_secs {
            let step = self.steering_elapsed;
            self.steering_elapsed = 0.0;
            self.steer(step);
        }

        self.retarget_completed();
    }

    /// Decide and blend a command for every live AI agent.
    fn steer(&mut self, dt: f64) {
        let Self {
            config,
            registry,
            agents,
            landmarks,
            docking,
            events,
            rng,
            requests,
            completed,
            ..
        } = self;
        let AgentTablesMut {
            records,
            machines,
            targets,
            commands,
        } = agents.tables_mut();
        let roster = Roster::new(records);

        for index in 0..records.len() {
            let record = &records[index];
            if !record.alive || record.player_controlled {
                commands[index] = None;
                continue;
            }
            let agent = record.id;
            let kinematics = &record.kinematics;

            if let Some(command) =
                docking.command(agent, kinematics, &config.behavior, &config.docking)
            {
                commands[index] = Some(command);
                continue;
            }

            let mut command = None;
            for _ in 0..MAX_DECISIONS_PER_TICK {
                let state = machines[index].state();
                let Some(definition) = registry.get(state) else {
                    warn!(%agent, %state, "agent in unregistered state, idling");
                    break;
                };

                requests.clear();
                let mut ctx = DecisionContext::new(
                    agent,
                    kinematics,
                    roster,
                    landmarks,
                    &config.behavior,
                    config.theater.as_ref(),
                    config.home,
                    dt,
                    registry,
                    &mut machines[index],
                    &mut targets[index],
                );
                (definition.decide)(&mut ctx, requests);
                let outcome = ctx.finish();

                if let Some(state) = outcome.completed {
                    events.emit(AiEvent::ActionCompleted { agent, state });
                    completed.push((agent, state));
                }
                if let Some((previous, current)) = outcome.transition {
                    debug!(%agent, %previous, %current, "state changed by decision");
                    events.emit(AiEvent::StateChanged {
                        agent,
                        previous,
                        current,
                    });
                    // Requests built for the old state are void.
                    requests.clear();
                    continue;
                }

                command = blend(requests.as_slice(), definition.policy, &mut *rng, |request| {
                    steering::evaluate(request, agent, kinematics, roster, &config.behavior)
                })
                .map(|selection| selection.command);
                break;
            }

            commands[index] = Some(command.unwrap_or_else(|| steering::idle(kinematics)));
            machines[index].advance(dt);
        }
    }

    /// Give squadron members that finished their engagement a new target
    /// in the same tick.
    fn retarget_completed(&mut self) {
        if self.completed.is_empty() {
            return;
        }
        let engage = self.squadrons.engage_state();
        let mut tables = self.agents.tables_mut();
        let mut scope = RetargetScope {
            tables: &mut tables,
            theater: self.config.theater.as_ref(),
            docking: &self.docking,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        for &(agent, state) in &self.completed {
            if state == engage {
                self.squadrons.retarget_agent(agent, &mut scope);
            }
        }
        self.completed.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wingman_core::constants::{DT, MAX_PENDING_EVENTS, TICK_RATE};

    use super::*;

    fn skirmish() -> AiContext {
        let mut ctx = AiContext::new(AiConfig::default()).unwrap();
        for (name, faction, y) in [("blue", 1, 0.0), ("red", 2, 2000.0)] {
            let squadron = ctx.create_squadron(name, FactionId(faction));
            for i in 0..3 {
                let position = DVec3::new(i as f64 * 150.0, y, 0.0);
                let agent = ctx.spawn_agent(FactionId(faction), Kinematics::at(position, DVec3::Y));
                ctx.add_to_squadron(squadron, agent).unwrap();
            }
        }
        ctx.update_squadrons();
        ctx
    }

    #[test]
    fn test_undrained_event_log_stays_bounded() {
        let mut ctx = skirmish();
        let seen = Rc::new(RefCell::new(0usize));
        let counter = seen.clone();
        ctx.subscribe(move |_: &AiEvent| *counter.borrow_mut() += 1);
        let buffer_capacity = ctx.requests.capacity();

        // Thirty minutes with no drain. Kinematics are never fed back, so
        // the scene keeps churning through retarget passes.
        for _ in 0..30 * 60 * TICK_RATE {
            ctx.tick(DT);
            assert!(ctx.events.pending().len() <= MAX_PENDING_EVENTS);
        }

        let pending = ctx.events.pending().len();
        assert_eq!(pending, (*seen.borrow()).min(MAX_PENDING_EVENTS));
        assert_eq!(ctx.drain_events().len(), pending);
        assert_eq!(ctx.requests.capacity(), buffer_capacity);
    }

    #[test]
    fn test_unregistered_state_idles() {
        let mut ctx = AiContext::new(AiConfig::default()).unwrap();
        let agent = ctx.spawn_agent(FactionId(1), Kinematics::at(DVec3::ZERO, DVec3::X));
        let bogus = StateId(ctx.registry().len() as u16 + 7);
        ctx.agents.machine_mut(agent).unwrap().transition(bogus);

        ctx.tick(DT);

        assert_eq!(ctx.state(agent), Some(bogus));
        let command = ctx.command(agent).expect("agent still steered");
        assert!((command.heading - DVec3::X).length() < 1e-9);
        assert_eq!(command.velocity, Some(DVec3::ZERO));
    }
}
