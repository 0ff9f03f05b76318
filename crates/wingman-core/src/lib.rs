//! Core types and definitions for the Wingman AI core.
//!
//! This crate defines the vocabulary shared across all other crates:
//! identifiers, kinematic types, enums, configuration, commands, events,
//! errors, hecs components, and snapshot state. It has no dependency on the
//! decision logic or on any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod ids;
pub mod state;
pub mod types;

pub use error::{AiError, AiResult};
