/*!
 * Tick Execution
 * One simulated time unit: admission, accrual, execution, selection
 */

use super::SchedulerEngine;
use crate::core::errors::{ControlError, ControlResult};
use crate::core::types::Tick;
use log::trace;
use serde::Serialize;

/// Outcome of one applied tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StepOutcome {
    /// The tick just recorded on the timeline
    pub time: Tick,
    /// End-of-tick CPU occupant
    pub occupant: Option<String>,
    /// Process that terminated during this tick, if any
    pub completed: Option<String>,
    /// True once every process has terminated
    pub run_complete: bool,
}

impl SchedulerEngine {
    /// Advance simulated time by exactly one unit
    ///
    /// Stepping a terminal run is a guarded no-op: the state is untouched and
    /// `ControlError::RunComplete` tells the driver to stop issuing ticks.
    /// A tick is never partially applied.
    pub fn step(&mut self) -> ControlResult<StepOutcome> {
        if self.state.is_terminal() {
            return Err(ControlError::RunComplete);
        }
        let now = self.state.current_time();

        // Arrival admission first: same-tick arrivals are eligible below
        self.state.admit_arrivals();

        // Waiting accrual; the process dispatched later this tick hands its
        // unit back
        let accrued = self.state.accrue_waiting();

        // Execution, then completion / quantum expiry / preemption, in that
        // order
        let mut completed = None;
        if let Some(slot) = self.state.running_slot() {
            self.state.burn_tick(slot);
            let remaining = self.state.entry(slot).remaining;
            let quantum_used = self.state.entry(slot).quantum_used;
            if remaining == 0 {
                completed = Some(self.state.spec(slot).id.clone());
                self.state.complete_running();
            } else if self.quantum.is_some_and(|q| quantum_used >= q) {
                self.state.requeue_running();
            } else if self.config.algorithm.should_preempt(&self.state, slot) {
                self.state.demote_running();
            }
        }

        // CPU free (never occupied, or just freed above): select among ready
        if self.state.running_slot().is_none() {
            if let Some(next) = self.config.algorithm.select(&self.state) {
                self.state.dispatch(next);
                if accrued.contains(&next) {
                    self.state.revert_wait(next);
                }
            }
        }

        // Timeline append, then time advance
        self.state.record_tick();
        self.state.advance();

        let run_complete = self.state.is_terminal();
        let outcome = StepOutcome {
            time: now,
            occupant: self.state.running_id().map(str::to_owned),
            completed,
            run_complete,
        };
        trace!(
            "Tick {} applied: occupant={:?}, run_complete={}",
            now,
            outcome.occupant,
            run_complete
        );
        Ok(outcome)
    }
}
