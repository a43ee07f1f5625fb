//! Crate error type
//!
//! Only caller bugs and bad configuration are errors. Timing races in normal
//! play (grid full, queue exhausted, double resolution, stale commands) are
//! no-ops handled inside the session engine.

/// Result alias carrying [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Drop kind id outside the fixed catalog
    #[error("unknown drop kind: {0:?}")]
    UnknownKind(String),
    /// Difficulty tiers start at 1
    #[error("invalid difficulty tier {0} (tiers start at 1)")]
    InvalidTier(u32),
    /// A cell can hold only one active drop
    #[error("cell {0} is already occupied")]
    CellOccupied(usize),
    /// Cell id past the end of the grid
    #[error("cell {cell} is outside the grid of {size} cells")]
    UnknownCell { cell: usize, size: usize },
    /// Queue length cannot hold the non-blue drops for a tier
    #[error("queue length {length} is too short for tier {tier} (needs at least {required})")]
    QueueTooShort {
        tier: u32,
        length: usize,
        required: usize,
    },
    /// Rules failed validation
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
