//! Session state and core simulation types
//!
//! Everything the engine mutates during a session lives in explicit owned
//! values here; there are no ambient globals.

use serde::{Deserialize, Serialize};

use super::catalog::DropKind;
use super::scheduler::TimerId;

/// Grid cell index (0-based, row-major)
pub type CellId = usize;

/// Unique id of a spawned drop within a session
pub type DropId = u32;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Constructed, not started
    Pending,
    /// Spawns and countdown active
    Running,
    /// Terminal
    Ended,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Countdown reached zero
    TimedOut,
    /// Configured target score met
    TargetReached,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::TimedOut => "timed out",
            EndReason::TargetReached => "target reached",
        }
    }
}

/// A spawned, not yet resolved drop
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrop {
    pub id: DropId,
    pub kind: DropKind,
    pub cell: CellId,
    pub spawned_at_ms: u64,
    /// Pending expiry timer (cancelled on collect)
    pub expiry: Option<TimerId>,
}

/// Score, countdown and status of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub time_remaining: u32,
    pub status: SessionStatus,
    /// One-shot milestone already celebrated this session
    pub milestone_fired: bool,
}

impl SessionState {
    pub fn new(session_seconds: u32) -> Self {
        Self {
            score: 0,
            time_remaining: session_seconds,
            status: SessionStatus::Pending,
            milestone_fired: false,
        }
    }

    /// Apply a point delta, clamping at zero. Returns the new score.
    pub fn apply_points(&mut self, points: i32) -> u32 {
        self.score = self.score.saturating_add_signed(points);
        self.score
    }

    /// Mark the milestone if first crossed. Returns true exactly once.
    pub fn check_milestone(&mut self, threshold: u32) -> bool {
        if !self.milestone_fired && self.score >= threshold {
            self.milestone_fired = true;
            return true;
        }
        false
    }
}

/// Result of a finished session, handed to progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_score: u32,
    pub reason: EndReason,
    /// Tier the session was played at
    pub tier: u32,
    pub duration_ms: u64,
}

/// Events emitted to presentation collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A session began
    SessionStarted { tier: u32, cadence_ms: u64 },
    Spawned {
        cell: CellId,
        kind: DropKind,
        drop: DropId,
    },
    Collected {
        cell: CellId,
        kind: DropKind,
        drop: DropId,
        score: u32,
    },
    /// Expired without being collected
    Missed {
        cell: CellId,
        kind: DropKind,
        drop: DropId,
    },
    MilestoneReached { score: u32 },
    Tick { seconds_remaining: u32 },
    SessionEnded {
        final_score: u32,
        reason: EndReason,
        sessions_completed: u32,
        difficulty_tier: u32,
        duration_ms: u64,
    },
    TierUp { new_tier: u32 },
    /// Progression went back to its starting values on player request
    ProgressionReset { difficulty_tier: u32 },
}
