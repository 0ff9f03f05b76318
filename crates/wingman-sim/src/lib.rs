//! Headless simulation host for the Wingman AI core.
//!
//! Owns a hecs ECS world of craft next to an `AiContext`, runs systems at a
//! fixed tick rate, and produces `SimSnapshot`s for whatever front end is
//! attached.

pub mod engine;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use wingman_ai as ai;
pub use wingman_core as core;
