//! Target assignment storage and target search helpers.
//!
//! Each agent holds one [`Target`]. Agent targets are stored by id and
//! resolved against the roster on every read, so a destroyed target simply
//! reads as "no target" until something replaces it.
//!
//! The search helpers work on squadron member lists, which may contain
//! `None` holes left by destroyed members. Every search is bounded: at most
//! one full pass over the list.

use glam::DVec3;
use rand::Rng;

use wingman_core::enums::TargetKind;
use wingman_core::ids::{AgentId, LocationId, PathId};
use wingman_core::types::{NamedLocation, WaypointPath};

use crate::agents::Roster;

/// The current target of one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Target {
    #[default]
    None,
    Position(DVec3),
    Agent(AgentId),
    /// A waypoint path and the index of the next waypoint to reach.
    Path { path: PathId, next: usize },
    Location(LocationId),
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::None => TargetKind::None,
            Target::Position(_) => TargetKind::Position,
            Target::Agent(_) => TargetKind::Agent,
            Target::Path { .. } => TargetKind::Path,
            Target::Location(_) => TargetKind::Location,
        }
    }

    /// The target agent id, whether or not it is still alive.
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Target::Agent(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Target::None)
    }
}

/// Externally authored paths and named locations, referenced by id.
#[derive(Debug, Clone, Default)]
pub struct Landmarks {
    paths: Vec<WaypointPath>,
    locations: Vec<NamedLocation>,
}

impl Landmarks {
    pub fn add_path(&mut self, path: WaypointPath) -> PathId {
        let id = PathId(self.paths.len() as u32);
        self.paths.push(path);
        id
    }

    /// Add or move a named location. Re-adding a name updates its position.
    pub fn add_location(&mut self, name: impl Into<String>, position: DVec3) -> LocationId {
        let name = name.into();
        if let Some(id) = self.location_id(&name) {
            self.locations[id.index()].position = position;
            return id;
        }
        let id = LocationId(self.locations.len() as u32);
        self.locations.push(NamedLocation { name, position });
        id
    }

    pub fn path(&self, id: PathId) -> Option<&WaypointPath> {
        self.paths.get(id.index())
    }

    pub fn location(&self, id: LocationId) -> Option<&NamedLocation> {
        self.locations.get(id.index())
    }

    pub fn location_id(&self, name: &str) -> Option<LocationId> {
        self.locations
            .iter()
            .position(|l| l.name == name)
            .map(|i| LocationId(i as u32))
    }
}

/// World position of a target, or `None` if it cannot be resolved
/// (destroyed agent, unknown path or location, progress past the end).
pub fn resolve_position(target: &Target, roster: Roster<'_>, landmarks: &Landmarks) -> Option<DVec3> {
    match *target {
        Target::None => None,
        Target::Position(p) => Some(p),
        Target::Agent(id) => roster.live(id).map(|r| r.kinematics.position),
        Target::Path { path, next } => landmarks.path(path).and_then(|p| p.waypoint(next)),
        Target::Location(id) => landmarks.location(id).map(|l| l.position),
    }
}

/// The next valid member after `start`, scanning cyclically.
///
/// Visits `start + 1, start + 2, …` wrapping around the list, and finally
/// `start` itself, skipping `None` holes and members rejected by `is_valid`.
/// A full wrap without a hit returns `None`.
pub fn next_valid_member<F>(
    members: &[Option<AgentId>],
    start: usize,
    mut is_valid: F,
) -> Option<(usize, AgentId)>
where
    F: FnMut(AgentId) -> bool,
{
    let len = members.len();
    if len == 0 {
        return None;
    }
    (1..=len)
        .map(|step| (start + step) % len)
        .find_map(|i| members[i].filter(|&id| is_valid(id)).map(|id| (i, id)))
}

/// A uniformly random valid member.
///
/// Picks a random index; on a miss, scans forward to the end of the list,
/// then retries once from the start of the list up to the picked index.
pub fn random_valid_member<R, F>(
    members: &[Option<AgentId>],
    rng: &mut R,
    mut is_valid: F,
) -> Option<AgentId>
where
    R: Rng + ?Sized,
    F: FnMut(AgentId) -> bool,
{
    if members.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..members.len());
    let mut check = |slot: &Option<AgentId>| slot.filter(|&id| is_valid(id));
    members[pick..]
        .iter()
        .find_map(&mut check)
        .or_else(|| members[..pick].iter().find_map(&mut check))
}

/// The closest valid live agent to `from` among `candidates`.
pub fn closest_agent<I, F>(
    from: DVec3,
    candidates: I,
    roster: Roster<'_>,
    mut is_valid: F,
) -> Option<AgentId>
where
    I: IntoIterator<Item = AgentId>,
    F: FnMut(AgentId) -> bool,
{
    candidates
        .into_iter()
        .filter_map(|id| roster.live(id).map(|r| (id, r.kinematics.position)))
        .filter(|&(id, _)| is_valid(id))
        .map(|(id, pos)| (id, from.distance_squared(pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
