//! Agent storage.
//!
//! Agents live in parallel tables indexed by `AgentId`: records (read-only
//! during decisions), state machines, targets, and output commands. Keeping
//! them apart lets a decision function hold its own machine and target
//! mutably while reading every other agent's record.
//!
//! Slots are never reused. A destroyed agent keeps its record with
//! `alive == false`, so any reference to it resolves as stale rather than
//! aliasing a newer agent.

use wingman_core::ids::{AgentId, FactionId, SquadronId};
use wingman_core::types::{Kinematics, SteeringCommand};

use crate::machine::AgentStateMachine;
use crate::target::Target;

/// One controllable craft as seen by the AI core.
#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub id: AgentId,
    /// Latest kinematics from the locomotion layer.
    pub kinematics: Kinematics,
    pub faction: FactionId,
    pub squadron: Option<SquadronId>,
    pub alive: bool,
    /// Flown by a human; never steered by the core.
    pub player_controlled: bool,
}

/// Read-only view of every agent record.
#[derive(Debug, Clone, Copy)]
pub struct Roster<'a> {
    records: &'a [AgentRecord],
}

impl<'a> Roster<'a> {
    pub fn new(records: &'a [AgentRecord]) -> Self {
        Self { records }
    }

    /// Any record, including destroyed agents.
    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&'a AgentRecord> {
        self.records.get(id.index())
    }

    /// The record only if the agent is still alive.
    #[inline]
    pub fn live(&self, id: AgentId) -> Option<&'a AgentRecord> {
        self.get(id).filter(|r| r.alive)
    }

    #[inline]
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.live(id).is_some()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &'a AgentRecord> + 'a {
        self.records.iter().filter(|r| r.alive)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Disjoint mutable views of the agent tables, for one steering pass.
pub(crate) struct AgentTablesMut<'a> {
    pub records: &'a [AgentRecord],
    pub machines: &'a mut [AgentStateMachine],
    pub targets: &'a mut [Target],
    pub commands: &'a mut [Option<SteeringCommand>],
}

#[derive(Debug, Default)]
pub struct AgentStore {
    records: Vec<AgentRecord>,
    machines: Vec<AgentStateMachine>,
    targets: Vec<Target>,
    commands: Vec<Option<SteeringCommand>>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent in the idle state with no target.
    pub fn spawn(
        &mut self,
        faction: FactionId,
        kinematics: Kinematics,
        player_controlled: bool,
    ) -> AgentId {
        let id = AgentId(self.records.len() as u32);
        self.records.push(AgentRecord {
            id,
            kinematics,
            faction,
            squadron: None,
            alive: true,
            player_controlled,
        });
        self.machines.push(AgentStateMachine::default());
        self.targets.push(Target::None);
        self.commands.push(None);
        id
    }

    /// Mark an agent destroyed. Returns `false` if it was unknown or already
    /// destroyed. The agent's own target and command are cleared; references
    /// held by others are purged lazily.
    pub fn destroy(&mut self, id: AgentId) -> bool {
        let Some(record) = self.records.get_mut(id.index()) else {
            return false;
        };
        if !record.alive {
            return false;
        }
        record.alive = false;
        self.targets[id.index()] = Target::None;
        self.commands[id.index()] = None;
        true
    }

    pub fn roster(&self) -> Roster<'_> {
        Roster::new(&self.records)
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentRecord> {
        self.records.get(id.index())
    }

    pub fn live(&self, id: AgentId) -> Option<&AgentRecord> {
        self.get(id).filter(|r| r.alive)
    }

    pub fn is_alive(&self, id: AgentId) -> bool {
        self.live(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AgentRecord] {
        &self.records
    }

    pub fn set_kinematics(&mut self, id: AgentId, kinematics: Kinematics) -> bool {
        match self.records.get_mut(id.index()) {
            Some(record) if record.alive => {
                record.kinematics = kinematics;
                true
            }
            _ => false,
        }
    }

    pub fn set_squadron(&mut self, id: AgentId, squadron: Option<SquadronId>) {
        if let Some(record) = self.records.get_mut(id.index()) {
            record.squadron = squadron;
        }
    }

    pub fn machine(&self, id: AgentId) -> Option<&AgentStateMachine> {
        self.machines.get(id.index())
    }

    pub fn machine_mut(&mut self, id: AgentId) -> Option<&mut AgentStateMachine> {
        self.machines.get_mut(id.index())
    }

    pub fn target(&self, id: AgentId) -> Option<&Target> {
        self.targets.get(id.index())
    }

    pub fn target_mut(&mut self, id: AgentId) -> Option<&mut Target> {
        self.targets.get_mut(id.index())
    }

    pub fn command(&self, id: AgentId) -> Option<SteeringCommand> {
        self.commands.get(id.index()).copied().flatten()
    }

    pub(crate) fn tables_mut(&mut self) -> AgentTablesMut<'_> {
        AgentTablesMut {
            records: &self.records,
            machines: &mut self.machines,
            targets: &mut self.targets,
            commands: &mut self.commands,
        }
    }
}
