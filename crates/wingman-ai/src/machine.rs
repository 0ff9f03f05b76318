//! Per-agent state machine.
//!
//! Holds the current state id and the "action completed" flag. There is no
//! transition table: callers and decision functions move the machine
//! explicitly. Validation of state ids happens at the context boundary, which
//! owns the registry.

use wingman_core::ids::StateId;

#[derive(Debug, Clone)]
pub struct AgentStateMachine {
    current: StateId,
    action_completed: bool,
    time_in_state: f64,
}

impl Default for AgentStateMachine {
    fn default() -> Self {
        Self {
            current: StateId::IDLE,
            action_completed: false,
            time_in_state: 0.0,
        }
    }
}

impl AgentStateMachine {
    pub fn state(&self) -> StateId {
        self.current
    }

    /// Switch to `state`. Entering a state clears the completion flag and
    /// the time-in-state counter. Returns the previous state if it changed.
    pub fn transition(&mut self, state: StateId) -> Option<StateId> {
        if state == self.current {
            return None;
        }
        let previous = self.current;
        self.current = state;
        self.action_completed = false;
        self.time_in_state = 0.0;
        Some(previous)
    }

    /// Set the completion flag. Returns `true` on the rising edge only.
    pub fn set_action_completed(&mut self, completed: bool) -> bool {
        let rising = completed && !self.action_completed;
        self.action_completed = completed;
        rising
    }

    pub fn has_completed_action(&self) -> bool {
        self.action_completed
    }

    /// Seconds spent in the current state (advanced by the steering pass).
    pub fn time_in_state(&self) -> f64 {
        self.time_in_state
    }

    pub(crate) fn advance(&mut self, dt: f64) {
        self.time_in_state += dt;
    }
}
