//! Docking state machine.
//!
//! Each agent cycles `NotDocked → Docking → Docked → Undocking → NotDocked`.
//! Entering `Docking` claims a docking point; an agent holds at most one
//! point and a point holds at most one agent. While an agent is anywhere
//! but `NotDocked` the docking system owns its steering.

use glam::DVec3;
use tracing::{debug, warn};

use wingman_core::config::{BehaviorSettings, DockingSettings};
use wingman_core::enums::{DockingPointState, DockingState};
use wingman_core::events::AiEvent;
use wingman_core::ids::{AgentId, DockingPointId, StateId, StationId};
use wingman_core::types::{Kinematics, SteeringCommand};
use wingman_core::{AiError, AiResult};

use crate::agents::Roster;
use crate::observer::EventSink;
use crate::steering::arrive;

#[derive(Debug, Clone)]
pub struct DockingPoint {
    pub id: DockingPointId,
    pub station: StationId,
    pub position: DVec3,
    /// Unit axis pointing out of the bay. Craft approach against it and
    /// depart along it.
    pub approach_axis: DVec3,
    pub up: DVec3,
    state: DockingPointState,
    occupant: Option<AgentId>,
}

impl DockingPoint {
    pub fn state(&self) -> DockingPointState {
        self.state
    }

    pub fn occupant(&self) -> Option<AgentId> {
        self.occupant
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Where the final straight-in leg starts.
    pub fn approach_point(&self, offset: f64) -> DVec3 {
        self.position + self.approach_axis * offset
    }
}

#[derive(Debug, Clone)]
pub struct DockingStation {
    pub id: StationId,
    pub name: String,
    pub points: Vec<DockingPointId>,
}

#[derive(Debug, Clone, Copy, Default)]
struct AgentDocking {
    state: DockingState,
    point: Option<DockingPointId>,
    docked_secs: f64,
}

#[derive(Debug, Default)]
pub struct DockingSystem {
    stations: Vec<DockingStation>,
    points: Vec<DockingPoint>,
    agents: Vec<AgentDocking>,
}

impl DockingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_station(&mut self, name: impl Into<String>) -> StationId {
        let id = StationId(self.stations.len() as u16);
        self.stations.push(DockingStation {
            id,
            name: name.into(),
            points: Vec::new(),
        });
        id
    }

    pub fn add_point(
        &mut self,
        station: StationId,
        position: DVec3,
        approach_axis: DVec3,
        up: DVec3,
    ) -> AiResult<DockingPointId> {
        let owner = self
            .stations
            .get_mut(station.index())
            .ok_or(AiError::UnknownStation(station))?;
        let id = DockingPointId(self.points.len() as u32);
        owner.points.push(id);
        self.points.push(DockingPoint {
            id,
            station,
            position,
            approach_axis: approach_axis.try_normalize().unwrap_or(DVec3::Z),
            up: up.try_normalize().unwrap_or(DVec3::Z),
            state: DockingPointState::Unassigned,
            occupant: None,
        });
        Ok(id)
    }

    pub fn station(&self, id: StationId) -> Option<&DockingStation> {
        self.stations.get(id.index())
    }

    pub fn point(&self, id: DockingPointId) -> Option<&DockingPoint> {
        self.points.get(id.index())
    }

    pub fn points(&self) -> &[DockingPoint] {
        &self.points
    }

    pub fn state(&self, agent: AgentId) -> DockingState {
        self.agents
            .get(agent.index())
            .map(|a| a.state)
            .unwrap_or_default()
    }

    pub fn point_of(&self, agent: AgentId) -> Option<DockingPointId> {
        self.agents.get(agent.index()).and_then(|a| a.point)
    }

    /// Whether the agent's behavior state may be set to `state` right now.
    /// Only `idle` is allowed while docking owns the agent.
    pub fn allows_state(&self, agent: AgentId, state: StateId) -> bool {
        self.state(agent) == DockingState::NotDocked || state == StateId::IDLE
    }

    fn entry_mut(&mut self, agent: AgentId) -> &mut AgentDocking {
        let index = agent.index();
        if index >= self.agents.len() {
            self.agents.resize(index + 1, AgentDocking::default());
        }
        &mut self.agents[index]
    }

    /// Reserve `point` for `agent` without starting the approach.
    pub fn assign_to_point(&mut self, agent: AgentId, point: DockingPointId) -> AiResult<()> {
        let slot = self
            .points
            .get(point.index())
            .ok_or(AiError::UnknownDockingPoint(point))?;
        if let Some(occupant) = slot.occupant.filter(|&o| o != agent) {
            return Err(AiError::PointOccupied { point, occupant });
        }
        if let Some(held) = self.point_of(agent).filter(|&p| p != point) {
            return Err(AiError::AlreadyAssigned { agent, point: held });
        }
        let state = self.state(agent);
        if state != DockingState::NotDocked {
            return Err(AiError::InvalidDockingTransition {
                agent,
                action: "assign",
                state,
            });
        }

        self.entry_mut(agent).point = Some(point);
        let slot = &mut self.points[point.index()];
        slot.occupant = Some(agent);
        slot.state = DockingPointState::Assigned;
        debug!(%agent, %point, "docking point assigned");
        Ok(())
    }

    /// Start docking. Uses `point` if given, else the agent's reserved point,
    /// else the first free point. The claim is all-or-nothing: on error
    /// nothing changes.
    pub fn dock(
        &mut self,
        agent: AgentId,
        point: Option<DockingPointId>,
        events: &mut EventSink,
    ) -> AiResult<DockingPointId> {
        let state = self.state(agent);
        if state != DockingState::NotDocked {
            return Err(AiError::InvalidDockingTransition {
                agent,
                action: "dock",
                state,
            });
        }
        let point = match point.or_else(|| self.point_of(agent)) {
            Some(point) => point,
            None => self
                .points
                .iter()
                .find(|p| p.is_free())
                .map(|p| p.id)
                .ok_or(AiError::NoFreeDockingPoint)?,
        };
        self.assign_to_point(agent, point)?;
        self.transition(agent, DockingState::Docking, events);
        Ok(point)
    }

    /// Begin leaving the point. A no-op unless the agent is docked.
    pub fn undock(&mut self, agent: AgentId, events: &mut EventSink) -> bool {
        if self.state(agent) != DockingState::Docked {
            return false;
        }
        self.transition(agent, DockingState::Undocking, events);
        true
    }

    fn transition(&mut self, agent: AgentId, next: DockingState, events: &mut EventSink) {
        let entry = self.entry_mut(agent);
        let previous = entry.state;
        entry.state = next;
        entry.docked_secs = 0.0;
        let Some(point) = entry.point else {
            return;
        };
        if next == DockingState::NotDocked {
            entry.point = None;
        }

        let slot = &mut self.points[point.index()];
        match next {
            DockingState::NotDocked => {
                slot.state = DockingPointState::Unassigned;
                slot.occupant = None;
            }
            DockingState::Docking => slot.state = DockingPointState::Docking,
            DockingState::Docked => slot.state = DockingPointState::Docked,
            DockingState::Undocking => slot.state = DockingPointState::Undocking,
        }
        debug!(%agent, %point, ?previous, current = ?next, "docking transition");
        events.emit(AiEvent::DockingStateChanged {
            agent,
            point,
            previous,
            current: next,
        });
    }

    /// Advance timers and distance-triggered transitions, and release points
    /// held by destroyed agents.
    pub fn update(
        &mut self,
        dt: f64,
        roster: Roster<'_>,
        settings: &DockingSettings,
        events: &mut EventSink,
    ) {
        for index in 0..self.agents.len() {
            let entry = self.agents[index];
            let Some(point) = entry.point else {
                continue;
            };
            let agent = AgentId(index as u32);
            let Some(record) = roster.live(agent) else {
                self.release_stale(agent, point, events);
                continue;
            };
            let range = record.kinematics.range_to(self.points[point.index()].position);

            match entry.state {
                DockingState::NotDocked => {}
                DockingState::Docking => {
                    if range <= settings.capture_distance {
                        self.transition(agent, DockingState::Docked, events);
                    }
                }
                DockingState::Docked => {
                    let docked_secs = entry.docked_secs + dt;
                    self.agents[index].docked_secs = docked_secs;
                    if settings
                        .auto_undock_secs
                        .is_some_and(|limit| docked_secs >= limit)
                    {
                        self.transition(agent, DockingState::Undocking, events);
                    }
                }
                DockingState::Undocking => {
                    if range >= settings.clearance_distance {
                        self.transition(agent, DockingState::NotDocked, events);
                    }
                }
            }
        }
    }

    fn release_stale(&mut self, agent: AgentId, point: DockingPointId, events: &mut EventSink) {
        warn!(%agent, %point, "releasing docking point held by destroyed agent");
        if self.agents[agent.index()].state == DockingState::NotDocked {
            // Reserved only: nobody is listening for this agent's docking.
            self.agents[agent.index()].point = None;
            let slot = &mut self.points[point.index()];
            slot.state = DockingPointState::Unassigned;
            slot.occupant = None;
        } else {
            self.transition(agent, DockingState::NotDocked, events);
        }
    }

    /// Steering override for an agent the docking system owns. `None` when
    /// the agent is not docking.
    pub fn command(
        &self,
        agent: AgentId,
        kinematics: &Kinematics,
        behavior: &BehaviorSettings,
        settings: &DockingSettings,
    ) -> Option<SteeringCommand> {
        let entry = self.agents.get(agent.index())?;
        let point = self.point(entry.point?)?;
        let command = match entry.state {
            DockingState::NotDocked => return None,
            DockingState::Docking => {
                let offset = kinematics.position - point.position;
                let along = offset.dot(point.approach_axis);
                let lateral = (offset - point.approach_axis * along).length();
                let in_corridor = along > 0.0 && lateral <= settings.approach_offset * 0.25;
                let mut command = if in_corridor {
                    arrive(
                        kinematics,
                        point.position,
                        0.0,
                        behavior.deceleration,
                        behavior.max_speed.min(settings.departure_speed),
                    )
                } else {
                    arrive(
                        kinematics,
                        point.approach_point(settings.approach_offset),
                        settings.final_approach_speed,
                        behavior.deceleration,
                        behavior.max_speed,
                    )
                };
                command.up_hint = Some(point.up);
                command
            }
            DockingState::Docked => SteeringCommand {
                target_position: Some(point.position),
                up_hint: Some(point.up),
                ..SteeringCommand::idle(kinematics.forward())
            },
            DockingState::Undocking => SteeringCommand {
                heading: point.approach_axis,
                velocity: Some(point.approach_axis * settings.departure_speed),
                target_position: None,
                up_hint: Some(point.up),
            },
        };
        Some(command)
    }
}
