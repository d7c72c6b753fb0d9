/*!
 * Run State Store
 * Authoritative per-process state for one simulation run
 *
 * All lifecycle transitions funnel through the mutators here so the run
 * invariants hold by construction: one lifecycle state per process,
 * remaining time strictly decreasing while running, response recorded at
 * most once, timeline append-only.
 */

use super::types::{ProcessEntry, ProcessSpec, ProcessState};
use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::types::Tick;
use ahash::AHashMap;
use log::{info, trace};
use std::collections::VecDeque;

/// One record of the execution timeline: who held the CPU at `time`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimelineSlot {
    pub(crate) time: Tick,
    pub(crate) occupant: Option<usize>,
}

/// Aggregate state of a single simulation run
///
/// Exclusively owned by the engine while a tick is applied; observers read
/// immutable snapshots between ticks.
#[derive(Debug, Clone)]
pub struct RunState {
    specs: Vec<ProcessSpec>,
    entries: Vec<ProcessEntry>,
    index: AHashMap<String, usize>,
    /// Maintain the FIFO rotation queue (round-robin only)
    rotation: bool,
    current_time: Tick,
    running: Option<usize>,
    rr_queue: VecDeque<usize>,
    completed: Vec<usize>,
    timeline: Vec<TimelineSlot>,
}

impl RunState {
    /// Validate a process list and build the initial run state
    pub(crate) fn initialize(specs: Vec<ProcessSpec>, rotation: bool) -> ConfigResult<Self> {
        Self::validate(&specs)?;
        Ok(Self::build(specs, rotation))
    }

    /// Reject input the engine cannot run: empty ids, zero burst, duplicates
    fn validate(specs: &[ProcessSpec]) -> ConfigResult<()> {
        let mut seen = ahash::AHashSet::with_capacity(specs.len());
        for spec in specs {
            if spec.id.is_empty() {
                return Err(ConfigError::EmptyProcessId);
            }
            if spec.burst_time == 0 {
                return Err(ConfigError::ZeroBurstTime(spec.id.clone()));
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicateProcessId(spec.id.clone()));
            }
        }
        Ok(())
    }

    /// Build the initial state from pre-validated specs
    pub(crate) fn build(specs: Vec<ProcessSpec>, rotation: bool) -> Self {
        let entries: Vec<ProcessEntry> = specs.iter().map(ProcessEntry::new).collect();
        let index: AHashMap<String, usize> = specs
            .iter()
            .enumerate()
            .map(|(slot, spec)| (spec.id.clone(), slot))
            .collect();

        // Round-robin: processes ready at time 0 seed the rotation queue in
        // insertion order
        let rr_queue: VecDeque<usize> = if rotation {
            entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.state.is_ready())
                .map(|(slot, _)| slot)
                .collect()
        } else {
            VecDeque::new()
        };

        info!(
            "Run initialized: {} processes, rotation queue {}",
            specs.len(),
            if rotation { "enabled" } else { "disabled" }
        );

        Self {
            specs,
            entries,
            index,
            rotation,
            current_time: 0,
            running: None,
            rr_queue,
            completed: Vec::new(),
            timeline: Vec::new(),
        }
    }

    // --- read access ---

    #[inline]
    #[must_use]
    pub fn current_time(&self) -> Tick {
        self.current_time
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// A run is terminal once every process has terminated; an empty process
    /// list is terminal immediately
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.entries.iter().all(|e| e.state.is_terminated())
    }

    /// Id of the process currently occupying the CPU
    #[must_use]
    pub fn running_id(&self) -> Option<&str> {
        self.running.map(|slot| self.specs[slot].id.as_str())
    }

    pub(crate) fn running_slot(&self) -> Option<usize> {
        self.running
    }

    /// Look up a process by id
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<(&ProcessSpec, &ProcessEntry)> {
        let slot = *self.index.get(id)?;
        Some((&self.specs[slot], &self.entries[slot]))
    }

    pub(crate) fn spec(&self, slot: usize) -> &ProcessSpec {
        &self.specs[slot]
    }

    pub(crate) fn entry(&self, slot: usize) -> &ProcessEntry {
        &self.entries[slot]
    }

    pub(crate) fn specs(&self) -> &[ProcessSpec] {
        &self.specs
    }

    pub(crate) fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    /// Ready process slots in insertion order
    pub(crate) fn ready_slots(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state.is_ready())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub(crate) fn rotation_queue(&self) -> &VecDeque<usize> {
        &self.rr_queue
    }

    pub(crate) fn completed(&self) -> &[usize] {
        &self.completed
    }

    pub(crate) fn timeline(&self) -> &[TimelineSlot] {
        &self.timeline
    }

    // --- tick mutators ---

    /// Transition every arrived process to ready and record its response
    ///
    /// Runs before selection each tick so same-tick arrivals are eligible.
    pub(crate) fn admit_arrivals(&mut self) {
        let now = self.current_time;
        for slot in 0..self.entries.len() {
            let arrival = self.specs[slot].arrival_time;
            match self.entries[slot].state {
                ProcessState::NotArrived if arrival <= now => {
                    self.entries[slot].state = ProcessState::Ready;
                    if self.entries[slot].response.is_none() {
                        self.entries[slot].response = Some(now - arrival);
                    }
                    if self.rotation {
                        self.rr_queue.push_back(slot);
                    }
                    trace!("Process {} admitted at tick {}", self.specs[slot].id, now);
                }
                // Ready since initialization: the first tick records the
                // response
                ProcessState::Ready if self.entries[slot].response.is_none() => {
                    self.entries[slot].response = Some(now.saturating_sub(arrival));
                }
                _ => {}
            }
        }
    }

    /// Grant one waiting tick to every ready process; returns the slots
    /// accrued so the tick can revert the unit for the process it dispatches
    pub(crate) fn accrue_waiting(&mut self) -> Vec<usize> {
        let mut accrued = Vec::new();
        for (slot, entry) in self.entries.iter_mut().enumerate() {
            if entry.state.is_ready() {
                entry.waiting += 1;
                accrued.push(slot);
            }
        }
        accrued
    }

    /// Take back the waiting unit granted earlier this tick
    pub(crate) fn revert_wait(&mut self, slot: usize) {
        debug_assert!(self.entries[slot].waiting > 0);
        self.entries[slot].waiting -= 1;
    }

    /// Apply one unit of execution to the running process
    pub(crate) fn burn_tick(&mut self, slot: usize) {
        let entry = &mut self.entries[slot];
        debug_assert!(entry.state.is_running());
        debug_assert!(entry.remaining > 0);
        entry.remaining -= 1;
        entry.quantum_used += 1;
    }

    /// Terminate the running process and record completion order
    pub(crate) fn complete_running(&mut self) {
        if let Some(slot) = self.running.take() {
            debug_assert_eq!(self.entries[slot].remaining, 0);
            self.entries[slot].state = ProcessState::Terminated;
            self.completed.push(slot);
            info!(
                "Process {} terminated at tick {}",
                self.specs[slot].id, self.current_time
            );
        }
    }

    /// Quantum expiry: return the running process to ready at the rotation
    /// queue tail with its quantum reset
    pub(crate) fn requeue_running(&mut self) {
        if let Some(slot) = self.running.take() {
            self.entries[slot].state = ProcessState::Ready;
            self.entries[slot].quantum_used = 0;
            if self.rotation {
                self.rr_queue.push_back(slot);
            }
            trace!(
                "Process {} quantum expired at tick {}, requeued",
                self.specs[slot].id,
                self.current_time
            );
        }
    }

    /// Preemption: return the running process to ready, counters kept
    pub(crate) fn demote_running(&mut self) {
        if let Some(slot) = self.running.take() {
            self.entries[slot].state = ProcessState::Ready;
            trace!(
                "Process {} preempted at tick {}",
                self.specs[slot].id,
                self.current_time
            );
        }
    }

    /// Give the CPU to a ready process
    pub(crate) fn dispatch(&mut self, slot: usize) {
        debug_assert!(self.running.is_none());
        debug_assert!(self.entries[slot].state.is_ready());
        if self.rotation {
            if let Some(pos) = self.rr_queue.iter().position(|&s| s == slot) {
                self.rr_queue.remove(pos);
            }
        }
        self.entries[slot].state = ProcessState::Running;
        self.entries[slot].quantum_used = 0;
        self.running = Some(slot);
        trace!(
            "Process {} dispatched at tick {}",
            self.specs[slot].id,
            self.current_time
        );
    }

    /// Append the end-of-tick CPU occupant to the timeline
    pub(crate) fn record_tick(&mut self) {
        self.timeline.push(TimelineSlot {
            time: self.current_time,
            occupant: self.running,
        });
    }

    /// Advance simulated time by one unit
    pub(crate) fn advance(&mut self) {
        self.current_time += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ProcessSpec> {
        vec![
            ProcessSpec::new("P1", 0, 3, 2),
            ProcessSpec::new("P2", 2, 2, 1),
        ]
    }

    #[test]
    fn test_initialize_states() {
        let state = RunState::initialize(specs(), false).unwrap();
        assert_eq!(state.entry(0).state, ProcessState::Ready);
        assert_eq!(state.entry(1).state, ProcessState::NotArrived);
        assert_eq!(state.current_time(), 0);
        assert!(state.timeline().is_empty());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_initialize_rejects_duplicate_id() {
        let err = RunState::initialize(
            vec![ProcessSpec::new("P1", 0, 1, 0), ProcessSpec::new("P1", 1, 1, 0)],
            false,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateProcessId("P1".into()));
    }

    #[test]
    fn test_initialize_rejects_zero_burst() {
        let err =
            RunState::initialize(vec![ProcessSpec::new("P1", 0, 0, 0)], false).unwrap_err();
        assert_eq!(err, ConfigError::ZeroBurstTime("P1".into()));
    }

    #[test]
    fn test_initialize_rejects_empty_id() {
        let err = RunState::initialize(vec![ProcessSpec::new("", 0, 1, 0)], false).unwrap_err();
        assert_eq!(err, ConfigError::EmptyProcessId);
    }

    #[test]
    fn test_empty_run_is_terminal() {
        let state = RunState::initialize(Vec::new(), false).unwrap();
        assert!(state.is_terminal());
        assert!(state.is_empty());
    }

    #[test]
    fn test_lookup_by_id() {
        let state = RunState::initialize(specs(), false).unwrap();
        let (spec, entry) = state.lookup("P2").unwrap();
        assert_eq!(spec.burst_time, 2);
        assert_eq!(entry.state, ProcessState::NotArrived);
        assert!(state.lookup("nope").is_none());
    }

    #[test]
    fn test_admission_records_response_once() {
        let mut state = RunState::initialize(specs(), false).unwrap();

        // Tick 0: P1 was ready from initialization, response backfilled
        state.admit_arrivals();
        assert_eq!(state.entry(0).response, Some(0));
        assert_eq!(state.entry(1).response, None);

        state.advance();
        state.advance();

        // Tick 2: P2 arrives exactly now
        state.admit_arrivals();
        assert_eq!(state.entry(1).state, ProcessState::Ready);
        assert_eq!(state.entry(1).response, Some(0));

        // Response never reassigned
        state.admit_arrivals();
        assert_eq!(state.entry(1).response, Some(0));
    }

    #[test]
    fn test_rotation_queue_seeded_and_rotated() {
        let mut state = RunState::initialize(
            vec![
                ProcessSpec::new("A", 0, 3, 0),
                ProcessSpec::new("B", 0, 3, 0),
                ProcessSpec::new("C", 5, 1, 0),
            ],
            true,
        )
        .unwrap();
        assert_eq!(state.rotation_queue().iter().copied().collect::<Vec<_>>(), vec![0, 1]);

        state.dispatch(0);
        assert_eq!(state.rotation_queue().front(), Some(&1));
        assert_eq!(state.running_id(), Some("A"));

        state.requeue_running();
        assert_eq!(
            state.rotation_queue().iter().copied().collect::<Vec<_>>(),
            vec![1, 0]
        );
        assert_eq!(state.entry(0).state, ProcessState::Ready);
        assert_eq!(state.entry(0).quantum_used, 0);
    }

    #[test]
    fn test_waiting_accrual_and_revert() {
        let mut state = RunState::initialize(specs(), false).unwrap();
        let accrued = state.accrue_waiting();
        assert_eq!(accrued, vec![0]);
        assert_eq!(state.entry(0).waiting, 1);

        state.revert_wait(0);
        assert_eq!(state.entry(0).waiting, 0);
    }

    #[test]
    fn test_completion_order() {
        let mut state = RunState::initialize(vec![ProcessSpec::new("P1", 0, 1, 0)], false).unwrap();
        state.dispatch(0);
        state.burn_tick(0);
        assert_eq!(state.entry(0).remaining, 0);
        state.complete_running();
        assert!(state.is_terminal());
        assert_eq!(state.completed(), &[0]);
        assert_eq!(state.running_id(), None);
    }
}
