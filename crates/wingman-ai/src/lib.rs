//! Decision core for Wingman.
//!
//! Per-agent behavior states pick weighted steering requests each tick, a
//! blender turns them into one command for the locomotion layer, and a
//! squadron coordinator decides who targets whom. A docking state machine
//! runs alongside and takes over steering near docking points.
//!
//! Everything hangs off an [`AiContext`]; there is no global state.

pub mod agents;
pub mod blender;
pub mod context;
pub mod decision;
pub mod docking;
pub mod machine;
pub mod observer;
pub mod registry;
pub mod requests;
pub mod squadron;
pub mod states;
pub mod steering;
pub mod target;

pub use context::AiContext;
pub use decision::DecisionContext;
pub use observer::AiObserver;
pub use requests::RequestBuffer;
pub use steering::{BehaviorKind, TargetDescriptor};
pub use target::Target;

pub use wingman_core as core;

#[cfg(test)]
mod tests;
