//! Timer scheduling port
//!
//! The engine never reads a clock. It asks a [`Scheduler`] for repeating and
//! one-shot timers and reacts when the driver hands firings back to it.
//! [`VirtualScheduler`] runs on virtual milliseconds so whole sessions replay
//! deterministically without real time passing.

use serde::{Deserialize, Serialize};

use super::state::DropId;

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// What a timer means to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timer {
    /// Spawn cadence
    Spawn,
    /// One countdown unit elapsed
    Countdown,
    /// Grace period of a drop elapsed
    Expire(DropId),
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub id: TimerId,
    pub at_ms: u64,
    pub timer: Timer,
}

/// Scheduling port used by the session engine
pub trait Scheduler {
    /// Fire `timer` every `period_ms`, first firing one period from `now_ms`
    fn schedule_repeating(&mut self, now_ms: u64, period_ms: u64, timer: Timer) -> TimerId;
    /// Fire `timer` once, `delay_ms` from `now_ms`
    fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, timer: Timer) -> TimerId;
    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    timer: Timer,
}

/// Deterministic scheduler on virtual time
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    entries: Vec<Entry>,
    next_id: u64,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms,
            period_ms,
            timer,
        });
        id
    }

    /// Pop the earliest firing due at or before `until_ms`.
    ///
    /// Ties fire in scheduling order. Repeating timers are re-armed one
    /// period later before being returned.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Firing> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let firing = Firing {
            id: entry.id,
            at_ms: entry.due_ms,
            timer: entry.timer,
        };
        // A repeating timer that cannot re-arm without wrapping is retired
        match entry.period_ms.and_then(|period| entry.due_ms.checked_add(period)) {
            Some(next) => entry.due_ms = next,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(firing)
    }

    /// Time of the next pending firing
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_repeating(&mut self, now_ms: u64, period_ms: u64, timer: Timer) -> TimerId {
        // A zero period would fire forever at one instant
        let period = period_ms.max(1);
        self.push(now_ms.saturating_add(period), Some(period), timer)
    }

    fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, timer: Timer) -> TimerId {
        // Far-future timers clamp to the end of time instead of wrapping
        self.push(now_ms.saturating_add(delay_ms), None, timer)
    }

    fn cancel(&mut self, id: TimerId) {
        self.entries.retain(|e| e.id != id);
    }
}
