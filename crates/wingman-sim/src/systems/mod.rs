//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only)
//! plus whatever slice of the AI context they need. They do not own state.

pub mod cleanup;
pub mod locomotion;
pub mod movement;
pub mod sensing;
pub mod snapshot;
