//! Cross-session progression
//!
//! Counts completed sessions and raises the difficulty tier every few
//! sessions. Only mutated at session end or by an explicit player reset.

use serde::{Deserialize, Serialize};

use super::state::SessionSummary;
use crate::consts::SESSIONS_PER_TIER;

/// Progression values that outlive sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub sessions_completed: u32,
    pub difficulty_tier: u32,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            sessions_completed: 0,
            difficulty_tier: 1,
        }
    }
}

/// Outcome of recording one finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionUpdate {
    pub sessions_completed: u32,
    pub difficulty_tier: u32,
    /// Set when this session raised the tier
    pub tier_up: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ProgressionTracker {
    state: ProgressionState,
    sessions_per_tier: u32,
}

impl Default for ProgressionTracker {
    fn default() -> Self {
        Self::new(SESSIONS_PER_TIER)
    }
}

impl ProgressionTracker {
    pub fn new(sessions_per_tier: u32) -> Self {
        Self {
            state: ProgressionState::default(),
            sessions_per_tier: sessions_per_tier.max(1),
        }
    }

    /// Resume from saved values
    pub fn with_state(state: ProgressionState, sessions_per_tier: u32) -> Self {
        Self {
            state: ProgressionState {
                difficulty_tier: state.difficulty_tier.max(1),
                ..state
            },
            sessions_per_tier: sessions_per_tier.max(1),
        }
    }

    /// Record a finished session
    pub fn record(&mut self, summary: &SessionSummary) -> ProgressionUpdate {
        self.state.sessions_completed += 1;

        let mut tier_up = None;
        if self.state.sessions_completed % self.sessions_per_tier == 0 {
            self.state.difficulty_tier += 1;
            tier_up = Some(self.state.difficulty_tier);
            log::info!(
                "Tier up: {} after {} sessions (last score {})",
                self.state.difficulty_tier,
                self.state.sessions_completed,
                summary.final_score
            );
        }

        ProgressionUpdate {
            sessions_completed: self.state.sessions_completed,
            difficulty_tier: self.state.difficulty_tier,
            tier_up,
        }
    }

    /// Tier for the next session
    pub fn current_tier(&self) -> u32 {
        self.state.difficulty_tier
    }

    pub fn sessions_completed(&self) -> u32 {
        self.state.sessions_completed
    }

    pub fn state(&self) -> ProgressionState {
        self.state
    }

    /// Player-initiated reset back to tier 1
    pub fn reset(&mut self) {
        log::info!("Progression reset");
        self.state = ProgressionState::default();
    }
}
