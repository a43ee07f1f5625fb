//! Session engine
//!
//! Runs one timed session: spawn cadence, cell selection, drop expiry,
//! scoring and end resolution. Status only moves forward
//! (Pending -> Running -> Ended); a finished engine is dropped and a new one
//! built for the next session.
//!
//! Every mutation checks status first, so stale commands and leaked timer
//! firings after the end are harmless no-ops.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::grid::GridModel;
use super::queue::DropQueue;
use super::scheduler::{Firing, Scheduler, Timer, TimerId};
use super::state::{
    ActiveDrop, CellId, DropId, EndReason, GameEvent, SessionState, SessionStatus, SessionSummary,
};
use crate::error::{Result, SimError};
use crate::rules::Rules;

#[derive(Debug, Clone)]
pub struct SessionEngine {
    rules: Rules,
    tier: u32,
    state: SessionState,
    grid: GridModel,
    queue: DropQueue,
    rng: Pcg32,
    spawn_timer: Option<TimerId>,
    countdown_timer: Option<TimerId>,
    next_drop_id: DropId,
    started_at_ms: u64,
    summary: Option<SessionSummary>,
    events: Vec<GameEvent>,
}

impl SessionEngine {
    /// Create a pending session at `tier`, seeded for queue and cell choice
    pub fn new(rules: Rules, tier: u32, seed: u64) -> Result<Self> {
        if tier < 1 {
            return Err(SimError::InvalidTier(tier));
        }
        Ok(Self {
            state: SessionState::new(rules.session_seconds),
            grid: GridModel::new(rules.grid_size),
            queue: DropQueue::from_kinds(Vec::new()),
            rng: Pcg32::seed_from_u64(seed),
            rules,
            tier,
            spawn_timer: None,
            countdown_timer: None,
            next_drop_id: 1,
            started_at_ms: 0,
            summary: None,
            events: Vec::new(),
        })
    }

    /// Start with a freshly built queue for this tier.
    ///
    /// Returns `Ok(false)` if the session is not pending.
    pub fn start<S: Scheduler>(&mut self, sched: &mut S, now_ms: u64) -> Result<bool> {
        if self.state.status != SessionStatus::Pending {
            return Ok(false);
        }
        let queue = DropQueue::build(self.tier, &self.rules, &mut self.rng)?;
        Ok(self.start_with_queue(queue, sched, now_ms))
    }

    /// Start with a given queue (scripted sessions)
    pub fn start_with_queue<S: Scheduler>(
        &mut self,
        queue: DropQueue,
        sched: &mut S,
        now_ms: u64,
    ) -> bool {
        if self.state.status != SessionStatus::Pending {
            return false;
        }

        self.queue = queue;
        self.state.score = 0;
        self.state.time_remaining = self.rules.session_seconds;
        self.state.milestone_fired = false;
        self.state.status = SessionStatus::Running;
        self.started_at_ms = now_ms;

        let cadence_ms = self.cadence_ms();
        self.spawn_timer = Some(sched.schedule_repeating(now_ms, cadence_ms, Timer::Spawn));
        self.countdown_timer =
            Some(sched.schedule_repeating(now_ms, self.rules.countdown_ms, Timer::Countdown));

        log::info!(
            "Session started: tier {}, cadence {}ms, {} drops queued",
            self.tier,
            cadence_ms,
            self.queue.len()
        );
        self.events.push(GameEvent::SessionStarted {
            tier: self.tier,
            cadence_ms,
        });
        true
    }

    /// React to a scheduler firing
    pub fn handle_timer<S: Scheduler>(&mut self, sched: &mut S, firing: &Firing) {
        match firing.timer {
            Timer::Spawn => self.spawn(sched, firing.at_ms),
            Timer::Countdown => self.countdown(sched, firing.at_ms),
            Timer::Expire(drop) => self.expire(drop, firing.at_ms),
        }
    }

    /// One spawn attempt: skipped when the grid is full or the queue is exhausted
    pub fn spawn<S: Scheduler>(&mut self, sched: &mut S, now_ms: u64) {
        if self.state.status != SessionStatus::Running {
            return;
        }
        let Some(cell) = self.grid.find_empty_cell(&mut self.rng) else {
            log::debug!("Spawn skipped: grid full");
            return;
        };
        let Some(kind) = self.queue.next() else {
            log::debug!("Spawn skipped: queue exhausted");
            return;
        };

        let id = self.next_drop_id;
        self.next_drop_id += 1;

        let expiry = sched.schedule_once(now_ms, self.rules.expiry_ms, Timer::Expire(id));
        let drop = ActiveDrop {
            id,
            kind,
            cell,
            spawned_at_ms: now_ms,
            expiry: Some(expiry),
        };
        if let Err(e) = self.grid.occupy(cell, drop) {
            log::error!("Spawn into cell {} failed: {}", cell, e);
            sched.cancel(expiry);
            return;
        }

        log::debug!("Spawned {} #{} in cell {}", kind, id, cell);
        self.events.push(GameEvent::Spawned {
            cell,
            kind,
            drop: id,
        });
    }

    /// Player collects whatever drop is in `cell`. Returns the new score on success.
    pub fn collect<S: Scheduler>(&mut self, sched: &mut S, cell: CellId, now_ms: u64) -> Option<u32> {
        if self.state.status != SessionStatus::Running {
            return None;
        }
        if cell >= self.grid.size() {
            log::warn!("Collect ignored: cell {} outside grid", cell);
            return None;
        }
        // Taking the drop out of the grid is what resolves it
        let drop = self.grid.release(cell)?;
        if let Some(expiry) = drop.expiry {
            sched.cancel(expiry);
        }

        let score = self.state.apply_points(drop.kind.points());
        log::debug!(
            "Collected {} #{} from cell {} after {}ms, score {}",
            drop.kind,
            drop.id,
            cell,
            now_ms.saturating_sub(drop.spawned_at_ms),
            score
        );
        self.events.push(GameEvent::Collected {
            cell,
            kind: drop.kind,
            drop: drop.id,
            score,
        });

        if self.state.check_milestone(self.rules.milestone_score) {
            log::info!("Milestone reached at {}", score);
            self.events.push(GameEvent::MilestoneReached { score });
        }

        if self.rules.target_score.is_some_and(|target| score >= target) {
            self.end(sched, EndReason::TargetReached, now_ms);
        }
        Some(score)
    }

    /// Grace period over: the drop is missed if still on the grid
    pub fn expire(&mut self, drop: DropId, now_ms: u64) {
        if self.state.status != SessionStatus::Running {
            return;
        }
        let Some(cell) = self.grid.locate(drop) else {
            return;
        };
        if let Some(missed) = self.grid.release_drop(cell, drop) {
            log::debug!("Missed {} #{} in cell {} at {}ms", missed.kind, missed.id, cell, now_ms);
            self.events.push(GameEvent::Missed {
                cell,
                kind: missed.kind,
                drop: missed.id,
            });
        }
    }

    /// One countdown unit elapsed
    pub fn countdown<S: Scheduler>(&mut self, sched: &mut S, now_ms: u64) {
        if self.state.status != SessionStatus::Running {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.events.push(GameEvent::Tick {
            seconds_remaining: self.state.time_remaining,
        });
        if self.state.time_remaining == 0 {
            self.end(sched, EndReason::TimedOut, now_ms);
        }
    }

    /// Finish a running session: stop all timers and clear the grid.
    ///
    /// Remaining drops are released without being reported as missed.
    pub fn end<S: Scheduler>(
        &mut self,
        sched: &mut S,
        reason: EndReason,
        now_ms: u64,
    ) -> Option<SessionSummary> {
        if self.state.status != SessionStatus::Running {
            return None;
        }

        for timer in [self.spawn_timer.take(), self.countdown_timer.take()]
            .into_iter()
            .flatten()
        {
            sched.cancel(timer);
        }
        for drop in self.grid.clear() {
            if let Some(expiry) = drop.expiry {
                sched.cancel(expiry);
            }
        }
        self.state.status = SessionStatus::Ended;

        let summary = SessionSummary {
            final_score: self.state.score,
            reason,
            tier: self.tier,
            duration_ms: now_ms.saturating_sub(self.started_at_ms),
        };
        log::info!(
            "Session ended ({}): score {}, {}ms",
            reason.as_str(),
            summary.final_score,
            summary.duration_ms
        );
        self.summary = Some(summary);
        Some(summary)
    }

    /// Summary of the finished session, handed out once
    pub fn take_summary(&mut self) -> Option<SessionSummary> {
        self.summary.take()
    }

    /// Events emitted since the last drain
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn queue(&self) -> &DropQueue {
        &self.queue
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Spawn cadence for this session's tier
    pub fn cadence_ms(&self) -> u64 {
        self.rules.spawn_cadence_ms(self.tier)
    }
}
