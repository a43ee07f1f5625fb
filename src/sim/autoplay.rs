//! Idle/demo mode - a bot that plays the game
//!
//! Watches the event stream and taps worthwhile drops after a human-ish
//! reaction delay. Hazards and decoys are left to expire.

use super::catalog::DropKind;
use super::grid::GridModel;
use super::state::{CellId, DropId, GameEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlannedTap {
    due_ms: u64,
    cell: CellId,
    drop: DropId,
}

#[derive(Debug, Clone)]
pub struct Autoplayer {
    reaction_ms: u64,
    planned: Vec<PlannedTap>,
}

impl Default for Autoplayer {
    fn default() -> Self {
        Self::new(350)
    }
}

impl Autoplayer {
    pub fn new(reaction_ms: u64) -> Self {
        Self {
            reaction_ms,
            planned: Vec::new(),
        }
    }

    /// Only positive drops are worth a tap
    pub fn wants(kind: DropKind) -> bool {
        kind.points() > 0
    }

    /// Feed one event seen at `now_ms`
    pub fn observe(&mut self, event: &GameEvent, now_ms: u64) {
        match event {
            GameEvent::Spawned { cell, kind, drop } if Self::wants(*kind) => {
                self.planned.push(PlannedTap {
                    due_ms: now_ms + self.reaction_ms,
                    cell: *cell,
                    drop: *drop,
                });
            }
            GameEvent::Collected { drop, .. } | GameEvent::Missed { drop, .. } => {
                self.planned.retain(|t| t.drop != *drop);
            }
            GameEvent::SessionStarted { .. } | GameEvent::SessionEnded { .. } => {
                self.planned.clear();
            }
            _ => {}
        }
    }

    /// Cells to tap now. Taps whose drop left the cell are dropped.
    pub fn taps_due(&mut self, now_ms: u64, grid: &GridModel) -> Vec<CellId> {
        let mut due = Vec::new();
        self.planned.retain(|tap| {
            if tap.due_ms > now_ms {
                return true;
            }
            if grid.get(tap.cell).is_some_and(|d| d.id == tap.drop) {
                due.push(tap.cell);
            }
            false
        });
        due
    }

    pub fn pending(&self) -> usize {
        self.planned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use crate::sim::game::Game;

    #[test]
    fn test_ignores_hazards() {
        let mut bot = Autoplayer::new(100);
        bot.observe(&GameEvent::Spawned { cell: 0, kind: DropKind::Orange, drop: 1 }, 0);
        bot.observe(&GameEvent::Spawned { cell: 1, kind: DropKind::Yellow, drop: 2 }, 0);
        bot.observe(&GameEvent::Spawned { cell: 2, kind: DropKind::Blue, drop: 3 }, 0);
        assert_eq!(bot.pending(), 1);
        bot.observe(&GameEvent::Missed { cell: 2, kind: DropKind::Blue, drop: 3 }, 50);
        assert_eq!(bot.pending(), 0);
    }

    #[test]
    fn test_skips_stale_taps() {
        let mut bot = Autoplayer::new(100);
        bot.observe(&GameEvent::Spawned { cell: 4, kind: DropKind::Green, drop: 9 }, 0);
        // Grid no longer holds drop 9
        let grid = GridModel::new(9);
        assert!(bot.taps_due(50, &grid).is_empty());
        assert_eq!(bot.pending(), 1);
        assert!(bot.taps_due(100, &grid).is_empty());
        assert_eq!(bot.pending(), 0);
    }

    #[test]
    fn test_bot_scores_points() {
        let mut game = Game::new_virtual(Rules::default(), 2024).unwrap();
        let mut bot = Autoplayer::default();
        game.start_session(0).unwrap();

        let mut now = 0;
        while now <= 30_000 {
            game.advance_to(now);
            let events: Vec<GameEvent> = game.drain_events().collect();
            for event in &events {
                bot.observe(event, now);
            }
            let taps = game.grid().map(|g| bot.taps_due(now, g)).unwrap_or_default();
            for cell in taps {
                game.collect(cell, now);
            }
            now += 50;
        }

        assert_eq!(game.progression().sessions_completed(), 1);
        // Only positive drops tapped, so the score is the sum of what was taken
        assert!(game.session().unwrap().score() > 25);
    }
}
