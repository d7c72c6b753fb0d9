/*!
 * Core Types
 * Common scalar types used across the simulator
 */

/// Simulated time, in ticks. One tick is one unit of CPU execution.
pub type Tick = u64;

/// Priority level (lower value = higher priority)
pub type Priority = u8;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimulatorError>;
