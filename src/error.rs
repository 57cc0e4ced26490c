//! Error types for host-facing operations.
//!
//! The simulation itself never fails: damage, starvation and expiry are
//! lifecycle transitions, not errors. Only round setup, configuration
//! loading and snapshot recordings can report a problem to the host.

use thiserror::Error;

/// Errors surfaced to the host environment.
#[derive(Debug, Error)]
pub enum SimError {
    /// A seeding loop ran out of placement attempts.
    #[error("could not place {what}: placed {placed} of {requested} within {attempts} attempts per item")]
    PlacementExhausted {
        what: &'static str,
        placed: usize,
        requested: usize,
        attempts: u32,
    },

    /// Configuration values that cannot produce a playable arena.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A recorded snapshot names something this build does not know.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Configuration or snapshot JSON could not be read or written.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
