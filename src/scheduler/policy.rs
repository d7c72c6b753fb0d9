/*!
 * Scheduling Policies
 * The closed set of algorithms and their selection order
 */

use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::types::Tick;
use crate::process::store::RunState;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// Scheduling algorithm
///
/// Each variant defines a total order over the ready candidates, with ties
/// broken by arrival time and then insertion order. Adding an algorithm
/// means adding one variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// First come, first served
    Fcfs,
    /// Shortest job first (non-preemptive)
    Sjf,
    /// Shortest remaining time first (preemptive)
    Srtf,
    /// Priority, non-preemptive (lower value = higher priority)
    NonPreemptivePriority,
    /// Priority, preemptive
    PreemptivePriority,
    /// Round robin over a FIFO rotation queue
    RoundRobin,
    /// Highest response ratio next
    Hrrn,
}

impl Algorithm {
    /// Parse from string representation
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fcfs" | "fifo" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "srtf" => Ok(Self::Srtf),
            "ps-np" | "ps_np" | "priority" => Ok(Self::NonPreemptivePriority),
            "ps-p" | "ps_p" | "priority_preemptive" => Ok(Self::PreemptivePriority),
            "rr" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "hrrn" => Ok(Self::Hrrn),
            _ => Err(format!(
                "Invalid algorithm '{}'. Valid: fcfs, sjf, srtf, ps_np, ps_p, rr, hrrn",
                s
            )),
        }
    }

    /// Convert to string representation
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Sjf => "sjf",
            Self::Srtf => "srtf",
            Self::NonPreemptivePriority => "ps_np",
            Self::PreemptivePriority => "ps_p",
            Self::RoundRobin => "rr",
            Self::Hrrn => "hrrn",
        }
    }

    /// Whether the algorithm can take the CPU away from a running process
    #[inline(always)]
    #[must_use]
    pub const fn is_preemptive(&self) -> bool {
        matches!(
            self,
            Self::Srtf | Self::PreemptivePriority | Self::RoundRobin
        )
    }

    /// Whether the run maintains the FIFO rotation queue
    #[inline(always)]
    #[must_use]
    pub const fn uses_rotation_queue(&self) -> bool {
        matches!(self, Self::RoundRobin)
    }

    /// Ready candidates in selection order (best first)
    pub fn ranked(&self, state: &RunState) -> Vec<usize> {
        let mut ready = state.ready_slots();
        match self {
            Self::Fcfs => {
                ready.sort_by_key(|&s| (state.spec(s).arrival_time, s));
                ready
            }
            Self::Sjf | Self::Srtf => {
                ready.sort_by_key(|&s| {
                    (state.entry(s).remaining, state.spec(s).arrival_time, s)
                });
                ready
            }
            Self::NonPreemptivePriority | Self::PreemptivePriority => {
                ready.sort_by_key(|&s| {
                    (state.spec(s).priority, state.spec(s).arrival_time, s)
                });
                ready
            }
            Self::RoundRobin => {
                let mut ordered: Vec<usize> = state
                    .rotation_queue()
                    .iter()
                    .copied()
                    .filter(|&s| state.entry(s).state.is_ready())
                    .collect();
                // Ready processes missing from the rotation queue fall back
                // to arrival order
                let mut rest: Vec<usize> = ready
                    .iter()
                    .copied()
                    .filter(|s| !ordered.contains(s))
                    .collect();
                rest.sort_by_key(|&s| (state.spec(s).arrival_time, s));
                ordered.extend(rest);
                ordered
            }
            Self::Hrrn => {
                ready.sort_by(|&a, &b| Self::response_ratio_order(state, a, b));
                ready
            }
        }
    }

    /// Pick the next process to run, if any is ready
    #[must_use]
    pub fn select(&self, state: &RunState) -> Option<usize> {
        self.ranked(state).into_iter().next()
    }

    /// Whether a strictly better ready candidate should take the CPU from
    /// the running process
    #[must_use]
    pub fn should_preempt(&self, state: &RunState, running: usize) -> bool {
        match self {
            Self::Srtf => {
                let remaining = state.entry(running).remaining;
                state
                    .ready_slots()
                    .iter()
                    .any(|&s| state.entry(s).remaining < remaining)
            }
            Self::PreemptivePriority => {
                let priority = state.spec(running).priority;
                state
                    .ready_slots()
                    .iter()
                    .any(|&s| state.spec(s).priority < priority)
            }
            _ => false,
        }
    }

    /// Highest response ratio first: `(waiting + remaining) / remaining`,
    /// compared by cross-multiplication so ties stay exact
    fn response_ratio_order(state: &RunState, a: usize, b: usize) -> Ordering {
        let (wa, ra) = (state.entry(a).waiting as u128, state.entry(a).remaining as u128);
        let (wb, rb) = (state.entry(b).waiting as u128, state.entry(b).remaining as u128);
        let lhs = (wa + ra) * rb;
        let rhs = (wb + rb) * ra;
        rhs.cmp(&lhs).then_with(|| {
            (state.spec(a).arrival_time, a).cmp(&(state.spec(b).arrival_time, b))
        })
    }
}

impl Serialize for Algorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Time quantum configuration (round-robin only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeQuantum {
    ticks: Tick,
}

impl TimeQuantum {
    /// Create new time quantum
    pub fn new(ticks: Tick) -> ConfigResult<Self> {
        if ticks == 0 {
            return Err(ConfigError::InvalidQuantum(ticks));
        }
        Ok(Self { ticks })
    }

    /// Get quantum length in ticks
    #[inline(always)]
    #[must_use]
    pub const fn ticks(&self) -> Tick {
        self.ticks
    }
}

impl<'de> Deserialize<'de> for TimeQuantum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Inner {
            ticks: Tick,
        }

        let inner = Inner::deserialize(deserializer)?;
        Self::new(inner.ticks).map_err(serde::de::Error::custom)
    }
}
