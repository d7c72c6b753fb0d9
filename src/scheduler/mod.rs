/*!
 * Scheduler Engine
 * Tick-driven scheduling decisions over one owned run state
 */

use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::types::Tick;
use crate::process::store::RunState;
use crate::process::types::ProcessSpec;
use log::info;
use serde::{Deserialize, Serialize};

pub mod policy;
pub mod stats;
pub mod tick;

pub use self::policy::{Algorithm, TimeQuantum};
pub use self::stats::{CpuSlot, ProcessView, RunMetrics, Snapshot, TimelineEntry};
pub use self::tick::StepOutcome;

/// Simulation configuration
///
/// The quantum is required if and only if the algorithm is round-robin.
/// Changing the algorithm or the process list requires a fresh engine; there
/// is no hot swapping mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationConfig {
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<TimeQuantum>,
}

impl SimulationConfig {
    #[inline]
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            quantum: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_quantum(mut self, quantum: TimeQuantum) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Resolve the effective quantum for the chosen algorithm
    fn effective_quantum(&self) -> ConfigResult<Option<Tick>> {
        if self.algorithm.uses_rotation_queue() {
            match self.quantum {
                Some(q) => Ok(Some(q.ticks())),
                None => Err(ConfigError::MissingQuantum),
            }
        } else {
            Ok(None)
        }
    }
}

/// The scheduling decision engine
///
/// Owns the run state exclusively; every mutation happens through `step` or
/// `reset`, and observers read immutable snapshots between ticks. The engine
/// is deterministic given its configuration and process list.
#[derive(Debug, Clone)]
pub struct SchedulerEngine {
    pub(crate) config: SimulationConfig,
    /// Resolved quantum in ticks; `Some` iff round-robin
    pub(crate) quantum: Option<Tick>,
    pub(crate) state: RunState,
}

impl SchedulerEngine {
    /// Initialize a run from a configuration and a process list
    pub fn new(config: SimulationConfig, processes: Vec<ProcessSpec>) -> ConfigResult<Self> {
        let quantum = config.effective_quantum()?;
        let state = RunState::initialize(processes, config.algorithm.uses_rotation_queue())?;
        info!(
            "Scheduler engine initialized: algorithm={}, quantum={:?}, processes={}",
            config.algorithm.as_str(),
            quantum,
            state.len()
        );
        Ok(Self {
            config,
            quantum,
            state,
        })
    }

    /// Restart the run with the same configuration and process list
    pub fn reset(&mut self) {
        let specs = self.state.specs().to_vec();
        self.state = RunState::build(specs, self.config.algorithm.uses_rotation_queue());
        info!("Run reset: algorithm={}", self.config.algorithm.as_str());
    }

    /// True once every process has terminated; no further ticks are valid
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only view of the run state between ticks
    #[inline]
    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ControlError;

    fn engine(algorithm: Algorithm, specs: Vec<ProcessSpec>) -> SchedulerEngine {
        SchedulerEngine::new(SimulationConfig::new(algorithm), specs).unwrap()
    }

    #[test]
    fn test_fcfs_basic_flow() {
        let mut engine = engine(
            Algorithm::Fcfs,
            vec![
                ProcessSpec::new("P1", 0, 2, 0),
                ProcessSpec::new("P2", 0, 1, 0),
            ],
        );

        let first = engine.step().unwrap();
        assert_eq!(first.occupant.as_deref(), Some("P1"));
        assert!(!first.run_complete);

        // P1 finishes during the third tick; P2 takes over the same tick
        engine.step().unwrap();
        let third = engine.step().unwrap();
        assert_eq!(third.completed.as_deref(), Some("P1"));
        assert_eq!(third.occupant.as_deref(), Some("P2"));
    }

    #[test]
    fn test_round_robin_requires_quantum() {
        let err = SchedulerEngine::new(
            SimulationConfig::new(Algorithm::RoundRobin),
            vec![ProcessSpec::new("P1", 0, 1, 0)],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingQuantum);
    }

    #[test]
    fn test_empty_run_is_immediately_terminal() {
        let mut engine = engine(Algorithm::Fcfs, Vec::new());
        assert!(engine.is_terminal());
        assert_eq!(engine.step().unwrap_err(), ControlError::RunComplete);
        assert!(engine.snapshot().timeline.is_empty());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut engine = engine(Algorithm::Fcfs, vec![ProcessSpec::new("P1", 0, 2, 0)]);
        let initial = engine.snapshot();

        engine.step().unwrap();
        assert_ne!(engine.snapshot(), initial);

        engine.reset();
        assert_eq!(engine.snapshot(), initial);
    }

    #[test]
    fn test_terminal_step_leaves_state_unchanged() {
        let mut engine = engine(Algorithm::Fcfs, vec![ProcessSpec::new("P1", 0, 1, 0)]);
        while !engine.is_terminal() {
            engine.step().unwrap();
        }
        let before = engine.snapshot();
        assert_eq!(engine.step().unwrap_err(), ControlError::RunComplete);
        assert_eq!(engine.snapshot(), before);
    }
}
