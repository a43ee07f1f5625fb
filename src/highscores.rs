//! High score board
//!
//! Keeps the best finished sessions, best first. A higher score wins; equal
//! scores go to the higher tier, then to the shorter session (a target
//! reached sooner). Stored as JSON.

use std::cmp::Reverse;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::{EventListener, GameEvent};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished session on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    /// Tier the session was played at
    pub tier: u32,
    /// Session length from start to end
    pub duration_ms: u64,
    /// Unix seconds when the session ended
    pub recorded_at: u64,
}

impl HighScoreEntry {
    /// Entry stamped with the current wall-clock time
    pub fn now(score: u32, tier: u32, duration_ms: u64) -> Self {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            score,
            tier,
            duration_ms,
            recorded_at,
        }
    }

    fn rank_key(&self) -> (Reverse<u32>, Reverse<u32>, u64) {
        (Reverse(self.score), Reverse(self.tier), self.duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a new entry would take. An equal entry already on the board stays ahead.
    fn slot(&self, entry: &HighScoreEntry) -> usize {
        let key = entry.rank_key();
        self.entries.partition_point(|e| e.rank_key() <= key)
    }

    /// 1-based rank `entry` would reach, `None` for a zero score or off the board
    pub fn potential_rank(&self, entry: &HighScoreEntry) -> Option<usize> {
        if entry.score == 0 {
            return None;
        }
        let slot = self.slot(entry);
        (slot < MAX_HIGH_SCORES).then_some(slot + 1)
    }

    /// Place `entry` on the board, returning its rank
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let rank = self.potential_rank(&entry)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn best(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    /// Load from a JSON file; a missing file is an empty board.
    ///
    /// Hand-edited files are put back in rank order.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let mut scores: HighScores = serde_json::from_str(&json)?;
                scores.entries.retain(|e| e.score > 0);
                scores.entries.sort_by_key(HighScoreEntry::rank_key);
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores from {}", scores.entries.len(), path.display());
                Ok(scores)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores at {}, starting fresh", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl EventListener for HighScores {
    fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::SessionEnded {
            final_score,
            difficulty_tier,
            duration_ms,
            ..
        } = *event
        {
            let entry = HighScoreEntry::now(final_score, difficulty_tier, duration_ms);
            if let Some(rank) = self.add_score(entry) {
                log::info!("New high score #{}: {}", rank, final_score);
            }
        }
    }
}
