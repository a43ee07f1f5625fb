//! Drop Dash - A timed grid clicking game
//!
//! Core modules:
//! - `sim`: Deterministic session engine (drop queue, grid, scoring, progression)
//! - `rules`: Data-driven game balance, loadable from JSON
//! - `feedback`: Presentation-side cue mapping (effects/sounds react to events)
//! - `highscores`: Leaderboard of finished sessions
//! - `error`: Crate error type

pub mod error;
pub mod feedback;
pub mod highscores;
pub mod rules;
pub mod sim;

pub use error::{Result, SimError};
pub use highscores::HighScores;
pub use rules::{Rules, RulesPreset};

/// Game configuration constants (defaults for [`Rules`])
pub mod consts {
    /// Number of grid cells (3x3)
    pub const GRID_SIZE: usize = 9;
    /// Cells per grid row
    pub const GRID_COLUMNS: usize = 3;

    /// Session length in countdown units
    pub const SESSION_SECONDS: u32 = 30;
    /// Countdown period (one unit)
    pub const COUNTDOWN_MS: u64 = 1000;

    /// Total drops in a session queue
    pub const QUEUE_LENGTH: usize = 100;
    /// How long a spawned drop stays before it is missed
    pub const EXPIRY_MS: u64 = 2500;

    /// Spawn cadence at tier 1
    pub const BASE_CADENCE_MS: u64 = 800;
    /// Cadence reduction per tier above 1
    pub const CADENCE_STEP_MS: u64 = 100;
    /// Fastest spawn cadence
    pub const MIN_CADENCE_MS: u64 = 400;

    /// Score that triggers the one-shot milestone
    pub const MILESTONE_SCORE: u32 = 25;
    /// Completed sessions per tier increase
    pub const SESSIONS_PER_TIER: u32 = 3;

    /// Base queue composition (non-blue kinds)
    pub const BASE_ORANGE: usize = 6;
    pub const BASE_GREEN: usize = 6;
    pub const BASE_YELLOW: usize = 10;
    pub const BASE_RAINBOW: usize = 2;

    /// Harder tier band adds this many orange/green/yellow drops
    pub const HARD_BAND_START: u32 = 4;
    pub const HARD_BAND_END: u32 = 6;
    pub const HARD_BAND_BONUS: usize = 6;

    /// Upper bounds accepted from a rules file
    pub const MAX_TIMER_MS: u64 = 60 * 60 * 1000;
    pub const MAX_SESSION_SECONDS: u32 = 60 * 60;
    pub const MAX_GRID_SIZE: usize = 1024;
    pub const MAX_QUEUE_LENGTH: usize = 100_000;
}

/// Spawn cadence for a tier: linear speed-up floored at `min_ms`
#[inline]
pub fn spawn_cadence_ms(tier: u32, base_ms: u64, step_ms: u64, min_ms: u64) -> u64 {
    let speedup = u64::from(tier.saturating_sub(1)).saturating_mul(step_ms);
    base_ms.saturating_sub(speedup).max(min_ms)
}

/// Convert a cell index to (row, column)
#[inline]
pub fn cell_to_row_col(cell: usize) -> (usize, usize) {
    (cell / consts::GRID_COLUMNS, cell % consts::GRID_COLUMNS)
}
