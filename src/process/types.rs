/*!
 * Process Types
 * Static process descriptions and per-process simulation state
 */

use crate::core::types::{Priority, Tick};
use serde::{Deserialize, Serialize};

/// Static description of a process, immutable once a run starts
///
/// Editing mid-run is out of scope for the engine; the caller resets the run
/// with a new process list instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSpec {
    pub id: String,
    pub arrival_time: Tick,
    pub burst_time: Tick,
    pub priority: Priority,
}

impl ProcessSpec {
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        arrival_time: Tick,
        burst_time: Tick,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            arrival_time,
            burst_time,
            priority,
        }
    }
}

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Arrival time has not been reached yet
    NotArrived,
    /// Eligible to run, waiting for the CPU
    Ready,
    /// Currently occupying the CPU
    Running,
    /// All burst time consumed
    Terminated,
}

impl ProcessState {
    /// Check if process is ready
    ///
    /// # Performance
    /// Hot path - checked on every selection pass
    #[inline(always)]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, ProcessState::Ready)
    }

    /// Check if process is running
    #[inline(always)]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }

    /// Check if process is terminated
    #[inline(always)]
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, ProcessState::Terminated)
    }

    /// Check if process has arrived (in any post-arrival state)
    #[inline(always)]
    #[must_use]
    pub const fn has_arrived(&self) -> bool {
        !matches!(self, ProcessState::NotArrived)
    }
}

/// Mutable per-process accounting for one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessEntry {
    pub state: ProcessState,
    /// Burst time left, decremented by exactly 1 per executed tick
    pub remaining: Tick,
    /// Ticks spent ready but not selected to run
    pub waiting: Tick,
    /// Delay between arrival and first entering the ready state; `None` until
    /// the process arrives
    pub response: Option<Tick>,
    /// Execution units since last dispatch; round-robin bookkeeping only
    pub quantum_used: Tick,
}

impl ProcessEntry {
    #[inline]
    #[must_use]
    pub fn new(spec: &ProcessSpec) -> Self {
        Self {
            state: if spec.arrival_time == 0 {
                ProcessState::Ready
            } else {
                ProcessState::NotArrived
            },
            remaining: spec.burst_time,
            waiting: 0,
            response: None,
            quantum_used: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_initial_state() {
        let immediate = ProcessEntry::new(&ProcessSpec::new("p1", 0, 4, 1));
        assert_eq!(immediate.state, ProcessState::Ready);
        assert_eq!(immediate.remaining, 4);
        assert_eq!(immediate.response, None);

        let late = ProcessEntry::new(&ProcessSpec::new("p2", 3, 2, 1));
        assert_eq!(late.state, ProcessState::NotArrived);
        assert!(!late.state.has_arrived());
    }

    #[test]
    fn test_state_predicates() {
        assert!(ProcessState::Ready.is_ready());
        assert!(ProcessState::Running.is_running());
        assert!(ProcessState::Terminated.is_terminated());
        assert!(ProcessState::Running.has_arrived());
        assert!(!ProcessState::NotArrived.is_ready());
    }
}
