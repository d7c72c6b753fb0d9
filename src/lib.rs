/*!
 * schedsim
 * Deterministic CPU-scheduling simulation engine for educational
 * visualization: step-driven process scheduling over seven classic
 * algorithms, with an append-only execution timeline and derived metrics
 */

pub mod core;
pub mod driver;
pub mod process;
pub mod scheduler;
pub mod tracer;

// Re-exports
pub use crate::core::errors::{
    ConfigError, ConfigResult, ControlError, ControlResult, SimulatorError,
};
pub use crate::core::types::{Priority, Tick};
pub use crate::driver::{DriverCommand, SimulationDriver};
pub use crate::process::{ProcessEntry, ProcessSpec, ProcessState, RunState};
pub use crate::scheduler::{
    Algorithm, CpuSlot, ProcessView, RunMetrics, SchedulerEngine, SimulationConfig, Snapshot,
    StepOutcome, TimeQuantum, TimelineEntry,
};
pub use crate::tracer::init_tracing;
