//! Error types for Simulation
//!
//! This module defines the error types used throughout the simulation crate.
//! Validation findings are carried as data inside [`SimulationError::Validation`]
//! rather than flattened into a message, so callers can render each finding.

//-----------------------------------------------------------------------------
// Error Types
//-----------------------------------------------------------------------------

use thiserror::Error;

use crate::validation::ValidationResult;

/// Main error type for the simulation crate.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The scenario failed validation; no integration work was done.
    #[error("Validation failed: {}", .0.errors.join("; "))]
    Validation(ValidationResult),

    /// Represents an error during engine setup or configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A model invariant (conservation, non-negativity, monotonicity) broke during a run.
    #[error("Invariant {invariant} violated on day {day} of replication {replication}: {message}")]
    InvariantViolation {
        replication: usize,
        day: usize,
        invariant: String,
        message: String,
    },

    /// The run was cancelled between replications.
    #[error("Simulation cancelled after {completed} of {requested} replications")]
    Cancelled { completed: usize, requested: usize },

    /// An I/O error occurred while reading scenarios or configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a serialization/deserialization error.
    #[error("Serialization/Deserialization error: {0}")]
    Serialization(String),

    /// Represents an error during simulation runtime, e.g. a worker task that failed to join.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl SimulationError {
    /// Validation findings, if this error came from the validator.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Validation(result) => Some(result),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for SimulationError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SimulationError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for simulation operations.
pub type SimResult<T> = Result<T, SimulationError>;
