//! Event observers.
//!
//! Observers are owned by the context and called synchronously from inside
//! the operation that produced the event, so a completion raised during a
//! tick is seen before that tick returns. The sink also keeps a bounded log
//! for hosts that poll instead; once full, the oldest entries are dropped.

use std::collections::VecDeque;

use tracing::trace;

use wingman_core::constants::MAX_PENDING_EVENTS;
use wingman_core::enums::DockingState;
use wingman_core::events::AiEvent;
use wingman_core::ids::{AgentId, DockingPointId, StateId};

/// Callbacks for AI events.
///
/// Every method has a default no-op implementation. `on_event` sees every
/// event and by default forwards the two callback-style events to their
/// dedicated methods.
pub trait AiObserver {
    fn on_event(&mut self, event: &AiEvent) {
        match *event {
            AiEvent::ActionCompleted { agent, state } => self.on_action_completed(agent, state),
            AiEvent::DockingStateChanged {
                agent,
                point,
                previous,
                current,
            } => self.on_docking_state_changed(agent, point, previous, current),
            _ => {}
        }
    }

    /// An agent's state flagged its action as completed.
    fn on_action_completed(&mut self, _agent: AgentId, _state: StateId) {}

    fn on_docking_state_changed(
        &mut self,
        _agent: AgentId,
        _point: DockingPointId,
        _previous: DockingState,
        _current: DockingState,
    ) {
    }
}

/// Plain closures observe every event.
impl<F> AiObserver for F
where
    F: FnMut(&AiEvent),
{
    fn on_event(&mut self, event: &AiEvent) {
        self(event)
    }
}

/// Fan-out to observers plus a log of the most recent events since the last
/// drain, at most `MAX_PENDING_EVENTS` of them.
pub struct EventSink {
    observers: Vec<Box<dyn AiObserver>>,
    log: VecDeque<AiEvent>,
}

impl Default for EventSink {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
            log: VecDeque::with_capacity(MAX_PENDING_EVENTS),
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("observers", &self.observers.len())
            .field("log", &self.log)
            .finish()
    }
}

impl EventSink {
    pub fn subscribe(&mut self, observer: impl AiObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: AiEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
        if self.log.len() >= MAX_PENDING_EVENTS {
            if let Some(dropped) = self.log.pop_front() {
                trace!(?dropped, "event log full, oldest event dropped");
            }
        }
        self.log.push_back(event);
    }

    /// Events since the last drain, oldest first.
    pub fn pending(&self) -> &VecDeque<AiEvent> {
        &self.log
    }

    pub fn drain(&mut self) -> Vec<AiEvent> {
        self.log.drain(..).collect()
    }
}
