//! State registry.
//!
//! A dispatch table of behavior states keyed by a small integer id. Ids are
//! issued sequentially and never reused; names are unique. The built-in
//! `idle`, `move-to-target` and `dogfight` states occupy the first ids.

use std::collections::HashMap;

use tracing::{debug, warn};

use wingman_core::enums::CombinerPolicy;
use wingman_core::ids::StateId;
use wingman_core::{AiError, AiResult};

use crate::decision::DecisionContext;
use crate::requests::RequestBuffer;
use crate::states;

/// Fills the request buffer for one agent for one tick. May change the
/// agent's state or completion flag through the context.
pub type DecisionFn = fn(&mut DecisionContext<'_>, &mut RequestBuffer);

#[derive(Debug, Clone)]
pub struct StateDefinition {
    pub id: StateId,
    pub name: String,
    pub decide: DecisionFn,
    pub policy: CombinerPolicy,
}

#[derive(Debug, Clone)]
pub struct StateRegistry {
    states: Vec<StateDefinition>,
    by_name: HashMap<String, StateId>,
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StateRegistry {
    /// A registry holding the built-in states.
    pub fn new() -> Self {
        let mut registry = Self {
            states: Vec::new(),
            by_name: HashMap::new(),
        };
        for (name, decide, policy) in [
            (states::IDLE, states::idle as DecisionFn, CombinerPolicy::PriorityOnly),
            (
                states::MOVE_TO_TARGET,
                states::move_to_target as DecisionFn,
                CombinerPolicy::PriorityOnly,
            ),
            (
                states::DOGFIGHT,
                states::dogfight as DecisionFn,
                CombinerPolicy::PrioritisedDithering,
            ),
        ] {
            // Built-in names are distinct and the table is empty.
            let _ = registry.register(name, decide, policy);
        }
        debug_assert_eq!(registry.id_of(states::IDLE), Some(StateId::IDLE));
        debug_assert_eq!(registry.id_of(states::MOVE_TO_TARGET), Some(StateId::MOVE_TO_TARGET));
        debug_assert_eq!(registry.id_of(states::DOGFIGHT), Some(StateId::DOGFIGHT));
        registry
    }

    /// Register a new state. Fails if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        decide: DecisionFn,
        policy: CombinerPolicy,
    ) -> AiResult<StateId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            warn!(%name, "rejected duplicate state registration");
            return Err(AiError::DuplicateStateName(name));
        }
        let id = StateId::try_from(self.states.len())
            .ok()
            .filter(|id| id.is_valid())
            .ok_or(AiError::StateIdsExhausted)?;
        debug!(%name, %id, ?policy, "registered state");
        self.by_name.insert(name.clone(), id);
        self.states.push(StateDefinition {
            id,
            name,
            decide,
            policy,
        });
        Ok(id)
    }

    pub fn get(&self, id: StateId) -> Option<&StateDefinition> {
        self.states.get(id.index())
    }

    pub fn contains(&self, id: StateId) -> bool {
        id.index() < self.states.len()
    }

    pub fn id_of(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: StateId) -> Option<&str> {
        self.get(id).map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateDefinition> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
