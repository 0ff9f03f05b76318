//! Strongly typed identifier wrappers.
//!
//! All IDs are small `Copy + Ord + Hash` integers so they index directly into
//! the context's dense tables. IDs are issued sequentially and never reused
//! within a run; a destroyed agent keeps its slot so stale references can be
//! detected instead of aliasing a newer agent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an agent in the context's agent tables.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a squadron in the coordinator.
    pub struct SquadronId(u32);
}

typed_id! {
    /// Index of a registered behavior state. Stable for the lifetime of a run.
    pub struct StateId(u16);
}

typed_id! {
    /// Faction (team) an agent or squadron belongs to.
    pub struct FactionId(u16);
}

typed_id! {
    /// Index of a docking station.
    pub struct StationId(u16);
}

typed_id! {
    /// Index of a docking point across all stations.
    pub struct DockingPointId(u32);
}

typed_id! {
    /// Index of a registered waypoint path.
    pub struct PathId(u32);
}

typed_id! {
    /// Index of a registered named location.
    pub struct LocationId(u32);
}

impl StateId {
    /// Built-in resting state. Default for every new agent.
    pub const IDLE: StateId = StateId(0);
    /// Built-in state: travel to the current target (position, agent, path or location).
    pub const MOVE_TO_TARGET: StateId = StateId(1);
    /// Built-in state: engage the current target agent.
    pub const DOGFIGHT: StateId = StateId(2);
}
