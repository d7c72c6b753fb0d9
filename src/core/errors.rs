/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::Tick;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors raised at initialization
///
/// Fatal to the run: the caller must fix the input and re-initialize.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Duplicate process id: {0}")]
    #[diagnostic(
        code(config::duplicate_process_id),
        help("Process ids are used as map keys throughout. Make every id unique.")
    )]
    DuplicateProcessId(String),

    #[error("Process id must not be empty")]
    #[diagnostic(
        code(config::empty_process_id),
        help("Give every process a non-empty id.")
    )]
    EmptyProcessId,

    #[error("Process {0} has zero burst time")]
    #[diagnostic(
        code(config::zero_burst_time),
        help("Burst time must be at least 1 tick.")
    )]
    ZeroBurstTime(String),

    #[error("Round-robin requires a time quantum")]
    #[diagnostic(
        code(config::missing_quantum),
        help("Configure a time quantum of at least 1 tick when the algorithm is round-robin.")
    )]
    MissingQuantum,

    #[error("Invalid time quantum: {0}")]
    #[diagnostic(
        code(config::invalid_quantum),
        help("The time quantum must be at least 1 tick.")
    )]
    InvalidQuantum(Tick),
}

/// Control errors raised while driving a run
///
/// Recoverable: the operation is a guarded no-op and the run state is
/// untouched.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ControlError {
    #[error("Run is complete; no further ticks are valid")]
    #[diagnostic(
        code(control::run_complete),
        help("Every process has terminated. Reset the run to step again.")
    )]
    RunComplete,

    #[error("Manual step rejected while auto-play is active")]
    #[diagnostic(
        code(control::auto_play_active),
        help("Pause auto-play before single-stepping.")
    )]
    AutoPlayActive,

    #[error("Simulation driver is no longer running")]
    #[diagnostic(
        code(control::driver_gone),
        help("The driver task has shut down. Spawn a new driver.")
    )]
    DriverGone,
}

/// Top-level simulator error
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SimulatorError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Control(#[from] ControlError),
}

/// Result alias for configuration-time operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for run-control operations
pub type ControlResult<T> = Result<T, ControlError>;
