//! Squadron coordinator.
//!
//! Squadrons are ordered member lists. Destroyed members are not removed
//! when they die: the retarget pass nulls them when it runs into them and
//! compacts each list in place at the end of the pass, so the cost of a
//! death is paid once and never per tick.
//!
//! Each squadron targets another squadron of a different faction. With no
//! such squadron it targets itself, which reads as "no enemy".

use rand::Rng;
use tracing::{debug, trace, warn};

use wingman_core::enums::{DockingState, TargetingPolicy};
use wingman_core::events::AiEvent;
use wingman_core::ids::{AgentId, FactionId, SquadronId, StateId};
use wingman_core::types::Bounds;
use wingman_core::{AiError, AiResult};

use crate::agents::{AgentTablesMut, Roster};
use crate::docking::DockingSystem;
use crate::observer::EventSink;
use crate::target::{next_valid_member, random_valid_member, Target};

#[derive(Debug, Clone)]
pub struct Squadron {
    pub id: SquadronId,
    pub name: String,
    pub faction: FactionId,
    members: Vec<Option<AgentId>>,
    live: usize,
    target: SquadronId,
}

impl Squadron {
    /// Member slots in order. Holes are destroyed members not yet compacted.
    pub fn members(&self) -> &[Option<AgentId>] {
        &self.members
    }

    /// Members not yet discovered dead.
    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn target(&self) -> SquadronId {
        self.target
    }

    /// Whether the target squadron is a real enemy.
    pub fn has_enemy(&self) -> bool {
        self.target != self.id
    }

    pub fn position_of(&self, agent: AgentId) -> Option<usize> {
        self.members.iter().position(|m| *m == Some(agent))
    }

    /// Null out members that are no longer alive. Returns how many were found.
    fn discover_dead(&mut self, roster: Roster<'_>) -> usize {
        let mut found = 0;
        for index in 0..self.members.len() {
            if let Some(id) = self.members[index] {
                if !roster.is_alive(id) {
                    self.members[index] = None;
                    self.live = self.live.saturating_sub(1);
                    found += 1;
                }
            }
        }
        found
    }

    /// Shift live members left over the holes and drop the tail.
    fn compact(&mut self) {
        let mut write = 0;
        for read in 0..self.members.len() {
            if let Some(id) = self.members[read] {
                self.members[write] = Some(id);
                write += 1;
            }
        }
        self.members.truncate(write);
    }
}

/// Everything a retarget needs besides the coordinator itself.
pub(crate) struct RetargetScope<'s, 'a, R: Rng + ?Sized> {
    pub tables: &'s mut AgentTablesMut<'a>,
    pub theater: Option<&'s Bounds>,
    pub docking: &'s DockingSystem,
    pub rng: &'s mut R,
    pub events: &'s mut EventSink,
}

#[derive(Debug)]
pub struct SquadronCoordinator {
    squadrons: Vec<Squadron>,
    policy: TargetingPolicy,
    interval_secs: f64,
    elapsed_secs: f64,
    downgrade_reported: bool,
    engage_state: StateId,
    candidates: Vec<Option<AgentId>>,
}

impl SquadronCoordinator {
    pub fn new(policy: TargetingPolicy, interval_secs: f64) -> Self {
        Self {
            squadrons: Vec::new(),
            policy,
            interval_secs,
            elapsed_secs: 0.0,
            downgrade_reported: false,
            engage_state: StateId::DOGFIGHT,
            candidates: Vec::new(),
        }
    }

    pub fn create(&mut self, name: impl Into<String>, faction: FactionId) -> SquadronId {
        let id = SquadronId(self.squadrons.len() as u32);
        self.squadrons.push(Squadron {
            id,
            name: name.into(),
            faction,
            members: Vec::new(),
            live: 0,
            target: id,
        });
        id
    }

    pub fn add_member(&mut self, squadron: SquadronId, agent: AgentId) -> AiResult<()> {
        let entry = self
            .squadrons
            .get_mut(squadron.index())
            .ok_or(AiError::UnknownSquadron(squadron))?;
        if !entry.members.contains(&Some(agent)) {
            entry.members.push(Some(agent));
            entry.live += 1;
        }
        Ok(())
    }

    pub fn get(&self, id: SquadronId) -> Option<&Squadron> {
        self.squadrons.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Squadron> {
        self.squadrons.iter()
    }

    pub fn len(&self) -> usize {
        self.squadrons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squadrons.is_empty()
    }

    pub fn policy(&self) -> TargetingPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: TargetingPolicy) {
        self.policy = policy;
        self.downgrade_reported = false;
    }

    /// State members are moved into when they receive a target while idle
    /// or after completing their previous action.
    pub fn engage_state(&self) -> StateId {
        self.engage_state
    }

    pub fn set_engage_state(&mut self, state: StateId) {
        self.engage_state = state;
    }

    /// The squadron a faction should attack: the first squadron of another
    /// faction with live members, else the first of another faction at all.
    pub fn target_squadron(&self, faction: FactionId) -> Option<SquadronId> {
        let mut enemies = self.squadrons.iter().filter(|s| s.faction != faction);
        let first = enemies.clone().next().map(|s| s.id);
        enemies.find(|s| s.live > 0).map(|s| s.id).or(first)
    }

    /// Point every squadron at its enemy, or at itself when there is none.
    fn refresh_targets(&mut self, events: &mut EventSink) {
        for index in 0..self.squadrons.len() {
            let faction = self.squadrons[index].faction;
            let id = self.squadrons[index].id;
            let target = self.target_squadron(faction).unwrap_or(id);
            if self.squadrons[index].target != target {
                self.squadrons[index].target = target;
                debug!(squadron = %id, %target, "squadron retargeted");
                events.emit(AiEvent::SquadronRetargeted {
                    squadron: id,
                    target,
                });
            }
        }
    }

    /// The policy the pass will actually run. Next-in-own-squadron only
    /// works with one squadron and falls back to random enemies otherwise.
    fn effective_policy(&mut self, events: &mut EventSink) -> TargetingPolicy {
        if self.policy != TargetingPolicy::NextInOwnSquadron || self.squadrons.len() <= 1 {
            return self.policy;
        }
        let applied = TargetingPolicy::RandomEnemyAgent;
        if !self.downgrade_reported {
            self.downgrade_reported = true;
            warn!(
                squadrons = self.squadrons.len(),
                requested = ?self.policy,
                applied = ?applied,
                "targeting policy needs a single squadron, downgrading"
            );
            events.emit(AiEvent::PolicyDowngraded {
                requested: self.policy,
                applied,
            });
        }
        applied
    }

    /// Count down to the next periodic pass. Returns `true` when it is due.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed_secs += dt;
        if self.elapsed_secs >= self.interval_secs {
            self.elapsed_secs = 0.0;
            true
        } else {
            false
        }
    }

    /// The next member of `squadron` after slot `start` that is alive and
    /// inside the theater, wrapping at most once.
    pub fn next_target_ship(
        &self,
        squadron: SquadronId,
        start: usize,
        roster: Roster<'_>,
        theater: Option<&Bounds>,
    ) -> Option<(usize, AgentId)> {
        let entry = self.get(squadron)?;
        next_valid_member(&entry.members, start, |id| valid_target(roster, theater, id))
    }

    /// The full retarget pass: prune, refresh squadron targets, then give
    /// every AI member of every squadron a target under the current policy.
    pub(crate) fn update<R: Rng + ?Sized>(&mut self, scope: &mut RetargetScope<'_, '_, R>) {
        let roster = Roster::new(scope.tables.records);
        let pruned: usize = self
            .squadrons
            .iter_mut()
            .map(|s| s.discover_dead(roster))
            .sum();
        self.refresh_targets(scope.events);
        let policy = self.effective_policy(scope.events);

        let mut assigned = 0;
        for squadron in 0..self.squadrons.len() {
            // Members can only be nulled during the pass, never removed, so
            // the indices stay put.
            for slot in 0..self.squadrons[squadron].members.len() {
                let Some(agent) = self.squadrons[squadron].members[slot] else {
                    continue;
                };
                if self.retarget_slot(squadron, slot, agent, policy, scope) {
                    assigned += 1;
                }
            }
        }

        for squadron in &mut self.squadrons {
            squadron.compact();
        }
        debug!(?policy, pruned, assigned, "squadron retarget pass");
    }

    /// Retarget one agent right away, e.g. after it completed its action.
    /// Returns `false` if the agent is not in a squadron or got no target.
    pub(crate) fn retarget_agent<R: Rng + ?Sized>(
        &mut self,
        agent: AgentId,
        scope: &mut RetargetScope<'_, '_, R>,
    ) -> bool {
        let Some(squadron) = scope.tables.records.get(agent.index()).and_then(|r| r.squadron)
        else {
            return false;
        };
        let Some(slot) = self.get(squadron).and_then(|s| s.position_of(agent)) else {
            return false;
        };
        let policy = self.effective_policy(scope.events);
        self.retarget_slot(squadron.index(), slot, agent, policy, scope)
    }

    fn retarget_slot<R: Rng + ?Sized>(
        &mut self,
        squadron: usize,
        slot: usize,
        agent: AgentId,
        policy: TargetingPolicy,
        scope: &mut RetargetScope<'_, '_, R>,
    ) -> bool {
        let roster = Roster::new(scope.tables.records);
        let Some(record) = roster.live(agent) else {
            return false;
        };
        if record.player_controlled || scope.docking.state(agent) != DockingState::NotDocked {
            return false;
        }
        let faction = record.faction;
        let theater = scope.theater;
        let is_valid = |id: AgentId| id != agent && valid_target(roster, theater, id);

        let choice = match policy {
            TargetingPolicy::NextInOwnSquadron => {
                let members = &self.squadrons[squadron].members;
                let start = scope.tables.targets[agent.index()]
                    .agent()
                    .and_then(|current| members.iter().position(|m| *m == Some(current)))
                    .unwrap_or(slot);
                next_valid_member(members, start, is_valid).map(|(_, id)| id)
            }
            TargetingPolicy::RandomPlayerAgent => {
                self.candidates.clear();
                self.candidates.extend(
                    roster
                        .iter_live()
                        .filter(|r| r.player_controlled && r.faction != faction)
                        .map(|r| Some(r.id)),
                );
                random_valid_member(&self.candidates, &mut *scope.rng, is_valid)
                    .or_else(|| self.random_enemy(squadron, &mut *scope.rng, is_valid))
            }
            TargetingPolicy::RandomEnemyAgent => {
                self.random_enemy(squadron, &mut *scope.rng, is_valid)
            }
        };

        let index = agent.index();
        let Some(target) = choice else {
            // Scripted position, path and location targets are left alone.
            if scope.tables.targets[index].agent().is_some() {
                scope.tables.targets[index] = Target::None;
                trace!(%agent, "no valid target");
                scope.events.emit(AiEvent::TargetLost { agent });
            }
            return false;
        };

        if scope.tables.targets[index] != Target::Agent(target) {
            scope.tables.targets[index] = Target::Agent(target);
            trace!(%agent, %target, "target assigned");
            scope.events.emit(AiEvent::TargetAssigned { agent, target });
        }

        let machine = &mut scope.tables.machines[index];
        if machine.state() == StateId::IDLE || machine.has_completed_action() {
            machine.set_action_completed(false);
            if let Some(previous) = machine.transition(self.engage_state) {
                scope.events.emit(AiEvent::StateChanged {
                    agent,
                    previous,
                    current: self.engage_state,
                });
            }
        }
        true
    }

    fn random_enemy<R, F>(&self, squadron: usize, rng: &mut R, is_valid: F) -> Option<AgentId>
    where
        R: Rng + ?Sized,
        F: FnMut(AgentId) -> bool,
    {
        let own = &self.squadrons[squadron];
        if !own.has_enemy() {
            return None;
        }
        let enemy = self.get(own.target)?;
        random_valid_member(&enemy.members, rng, is_valid)
    }
}

fn valid_target(roster: Roster<'_>, theater: Option<&Bounds>, id: AgentId) -> bool {
    roster.live(id).is_some_and(|r| {
        theater.map_or(true, |bounds| bounds.contains(r.kinematics.position))
    })
}
