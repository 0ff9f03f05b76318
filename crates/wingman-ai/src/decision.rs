//! The view a decision function gets of its agent and the world.
//!
//! A `DecisionContext` borrows the agent's own machine and target mutably
//! and everything else read-only. State changes and completion edges made
//! through it are recorded so the steering pass can emit events and discard
//! the request list once the decision returns.

use glam::DVec3;
use tracing::warn;

use wingman_core::config::BehaviorSettings;
use wingman_core::ids::{AgentId, StateId};
use wingman_core::types::{Bounds, Kinematics};

use crate::agents::{AgentRecord, Roster};
use crate::machine::AgentStateMachine;
use crate::registry::StateRegistry;
use crate::target::{resolve_position, Landmarks, Target};

pub struct DecisionContext<'a> {
    pub agent: AgentId,
    pub kinematics: &'a Kinematics,
    pub roster: Roster<'a>,
    pub landmarks: &'a Landmarks,
    pub settings: &'a BehaviorSettings,
    /// Theater of operations, if the scene has one.
    pub theater: Option<&'a Bounds>,
    pub home: DVec3,
    pub dt: f64,
    registry: &'a StateRegistry,
    machine: &'a mut AgentStateMachine,
    target: &'a mut Target,
    entered_from: Option<StateId>,
    completed_in: Option<StateId>,
}

/// What a decision changed on its agent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecisionOutcome {
    /// `(previous, current)` when the state changed.
    pub transition: Option<(StateId, StateId)>,
    /// The state that raised the completion flag.
    pub completed: Option<StateId>,
}

impl<'a> DecisionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        agent: AgentId,
        kinematics: &'a Kinematics,
        roster: Roster<'a>,
        landmarks: &'a Landmarks,
        settings: &'a BehaviorSettings,
        theater: Option<&'a Bounds>,
        home: DVec3,
        dt: f64,
        registry: &'a StateRegistry,
        machine: &'a mut AgentStateMachine,
        target: &'a mut Target,
    ) -> Self {
        Self {
            agent,
            kinematics,
            roster,
            landmarks,
            settings,
            theater,
            home,
            dt,
            registry,
            machine,
            target,
            entered_from: None,
            completed_in: None,
        }
    }

    pub fn state(&self) -> StateId {
        self.machine.state()
    }

    /// Move this agent to `state`. Unknown ids are rejected and leave the
    /// machine untouched.
    pub fn set_state(&mut self, state: StateId) -> bool {
        if !self.registry.contains(state) {
            warn!(agent = %self.agent, %state, "decision requested unknown state");
            return false;
        }
        if let Some(previous) = self.machine.transition(state) {
            self.entered_from.get_or_insert(previous);
        }
        true
    }

    pub fn set_action_completed(&mut self, completed: bool) {
        if self.machine.set_action_completed(completed) {
            self.completed_in = Some(self.machine.state());
        }
    }

    pub fn has_completed_action(&self) -> bool {
        self.machine.has_completed_action()
    }

    pub fn time_in_state(&self) -> f64 {
        self.machine.time_in_state()
    }

    pub fn target(&self) -> Target {
        *self.target
    }

    pub fn set_target(&mut self, target: Target) {
        *self.target = target;
    }

    /// The target agent's record, if the target is a live agent.
    pub fn target_agent(&self) -> Option<&'a AgentRecord> {
        self.target.agent().and_then(|id| self.roster.live(id))
    }

    pub fn target_position(&self) -> Option<DVec3> {
        resolve_position(self.target, self.roster, self.landmarks)
    }

    /// Whether `point` is inside the theater. Always true without one.
    pub fn in_theater(&self, point: DVec3) -> bool {
        self.theater.map_or(true, |bounds| bounds.contains(point))
    }

    pub fn range_to(&self, point: DVec3) -> f64 {
        self.kinematics.range_to(point)
    }

    pub(crate) fn finish(self) -> DecisionOutcome {
        let current = self.machine.state();
        DecisionOutcome {
            transition: self
                .entered_from
                .filter(|previous| *previous != current)
                .map(|previous| (previous, current)),
            completed: self.completed_in,
        }
    }
}
