//! Petri Dish - Simulation Core
//!
//! A deterministic, tick-driven ECS simulation of a circular arena where a
//! player-controlled avatar fights microbes that eat, move and divide.
//! Uses `bevy_ecs` for entity storage; hosts drive rounds through
//! [`SimWorld`].

pub mod api;
pub mod batch;
pub mod bridge;
pub mod components;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod profiler;
pub mod rng;
pub mod round;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use round::{RoundContext, RoundStatus};
pub use systems::Command;
pub use world::{AvatarSnapshot, EntitySnapshot, Snapshot};
