/*!
 * Run Statistics
 * Observable snapshots and timeline-derived metrics
 */

use super::{Algorithm, SchedulerEngine};
use crate::core::types::{Priority, Tick};
use crate::process::types::ProcessState;
use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// CPU occupant for one timeline record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuSlot {
    Process(String),
    Idle,
}

impl CpuSlot {
    /// String representation: the process id, or `"idle"`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Process(id) => id,
            Self::Idle => "idle",
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl Serialize for CpuSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CpuSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(if s == "idle" {
            Self::Idle
        } else {
            Self::Process(s)
        })
    }
}

/// One record of the execution timeline
///
/// Append-only and immutable once written; the timeline is the system of
/// record for derived metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelineEntry {
    pub time: Tick,
    pub slot: CpuSlot,
    pub cpu_busy: bool,
}

/// Read-only view of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessView {
    pub id: String,
    pub arrival_time: Tick,
    pub burst_time: Tick,
    pub priority: Priority,
    pub state: ProcessState,
    pub remaining: Tick,
    pub waiting: Tick,
    pub response: Option<Tick>,
    pub quantum_used: Tick,
}

/// Read-only snapshot of a run, returned after every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    pub current_time: Tick,
    pub algorithm: Algorithm,
    pub time_quantum: Option<Tick>,
    pub running: Option<String>,
    pub processes: Vec<ProcessView>,
    /// Ready processes in the active policy's selection order
    pub ready_queue: Vec<String>,
    pub round_robin_queue: Vec<String>,
    pub completed_order: Vec<String>,
    pub timeline: Vec<TimelineEntry>,
    /// Percentage of recorded ticks with the CPU busy
    pub cpu_utilization: f64,
    pub run_complete: bool,
}

/// Aggregate metrics derived from the timeline and the process counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunMetrics {
    pub total_ticks: u64,
    pub busy_ticks: u64,
    pub cpu_utilization: f64,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
}

impl RunMetrics {
    /// Derive metrics from a snapshot
    ///
    /// Turnaround is computed from the timeline (last CPU credit + 1 minus
    /// arrival) and covers terminated processes only; waiting and response
    /// averages come from the per-process counters.
    #[must_use]
    pub fn derive(snapshot: &Snapshot) -> Self {
        let total_ticks = snapshot.timeline.len() as u64;
        let busy_ticks = snapshot.timeline.iter().filter(|e| e.cpu_busy).count() as u64;
        let cpu_utilization = if total_ticks == 0 {
            0.0
        } else {
            busy_ticks as f64 / total_ticks as f64 * 100.0
        };

        let mut completion: AHashMap<&str, Tick> = AHashMap::new();
        for entry in &snapshot.timeline {
            if let CpuSlot::Process(id) = &entry.slot {
                completion.insert(id.as_str(), entry.time + 1);
            }
        }

        let mut waiting_sum = 0u64;
        let mut turnaround_sum = 0u64;
        let mut turnaround_count = 0u64;
        let mut response_sum = 0u64;
        let mut response_count = 0u64;
        for view in &snapshot.processes {
            waiting_sum += view.waiting;
            if view.state.is_terminated() {
                if let Some(&done) = completion.get(view.id.as_str()) {
                    turnaround_sum += done - view.arrival_time;
                    turnaround_count += 1;
                }
            }
            if let Some(response) = view.response {
                response_sum += response;
                response_count += 1;
            }
        }

        let mean = |sum: u64, count: u64| {
            if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            }
        };

        Self {
            total_ticks,
            busy_ticks,
            cpu_utilization,
            avg_waiting_time: mean(waiting_sum, snapshot.processes.len() as u64),
            avg_turnaround_time: mean(turnaround_sum, turnaround_count),
            avg_response_time: mean(response_sum, response_count),
        }
    }
}

impl SchedulerEngine {
    /// Build a read-only snapshot of the current run state
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let id_at = |slot: usize| state.spec(slot).id.clone();

        let processes = state
            .specs()
            .iter()
            .zip(state.entries())
            .map(|(spec, entry)| ProcessView {
                id: spec.id.clone(),
                arrival_time: spec.arrival_time,
                burst_time: spec.burst_time,
                priority: spec.priority,
                state: entry.state,
                remaining: entry.remaining,
                waiting: entry.waiting,
                response: entry.response,
                quantum_used: entry.quantum_used,
            })
            .collect();

        let timeline: Vec<TimelineEntry> = state
            .timeline()
            .iter()
            .map(|slot| TimelineEntry {
                time: slot.time,
                slot: match slot.occupant {
                    Some(s) => CpuSlot::Process(id_at(s)),
                    None => CpuSlot::Idle,
                },
                cpu_busy: slot.occupant.is_some(),
            })
            .collect();

        let busy = timeline.iter().filter(|e| e.cpu_busy).count();
        let cpu_utilization = if timeline.is_empty() {
            0.0
        } else {
            busy as f64 / timeline.len() as f64 * 100.0
        };

        Snapshot {
            current_time: state.current_time(),
            algorithm: self.config.algorithm,
            time_quantum: self.quantum,
            running: state.running_id().map(str::to_owned),
            processes,
            ready_queue: self
                .config
                .algorithm
                .ranked(state)
                .into_iter()
                .map(id_at)
                .collect(),
            round_robin_queue: state.rotation_queue().iter().map(|&s| id_at(s)).collect(),
            completed_order: state.completed().iter().map(|&s| id_at(s)).collect(),
            timeline,
            cpu_utilization,
            run_complete: state.is_terminal(),
        }
    }

    /// Derive aggregate metrics for the run so far
    #[must_use]
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics::derive(&self.snapshot())
    }
}
