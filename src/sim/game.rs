//! Game director
//!
//! Wires progression, the current session and the scheduler together. This
//! is the surface the outside world talks to: start, collect, reset and time.
//! Events flow out to registered listeners; the engine never sees them.

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::GridModel;
use super::progression::{ProgressionState, ProgressionTracker};
use super::queue::DropQueue;
use super::scheduler::{Firing, Scheduler, VirtualScheduler};
use super::session::SessionEngine;
use super::state::{CellId, GameEvent, SessionStatus};
use crate::error::Result;
use crate::rules::Rules;

/// Presentation collaborator reacting to engine events
pub trait EventListener {
    fn on_event(&mut self, event: &GameEvent);
}

impl<T: EventListener> EventListener for Rc<RefCell<T>> {
    fn on_event(&mut self, event: &GameEvent) {
        self.borrow_mut().on_event(event);
    }
}

pub struct Game<S: Scheduler = VirtualScheduler> {
    rules: Rules,
    progression: ProgressionTracker,
    session: Option<SessionEngine>,
    scheduler: S,
    /// Derives one seed per session
    seed_rng: Pcg32,
    events: Vec<GameEvent>,
    listeners: Vec<Box<dyn EventListener>>,
}

impl<S: Scheduler> Game<S> {
    pub fn new(rules: Rules, seed: u64, scheduler: S) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            progression: ProgressionTracker::new(rules.sessions_per_tier),
            rules,
            session: None,
            scheduler,
            seed_rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            listeners: Vec::new(),
        })
    }

    /// Resume progression from saved values
    pub fn with_progression(mut self, state: ProgressionState) -> Self {
        self.progression = ProgressionTracker::with_state(state, self.rules.sessions_per_tier);
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    fn session_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.status() == SessionStatus::Running)
    }

    /// Fresh pending session at the current tier
    fn new_session(&mut self) -> Result<SessionEngine> {
        let seed = self.seed_rng.random::<u64>();
        SessionEngine::new(self.rules.clone(), self.progression.current_tier(), seed)
    }

    /// Start a session. A duplicate start while one is running is ignored.
    pub fn start_session(&mut self, now_ms: u64) -> Result<bool> {
        if self.session_running() {
            log::debug!("Start ignored: session already running");
            return Ok(false);
        }
        let mut session = self.new_session()?;
        let started = session.start(&mut self.scheduler, now_ms)?;
        self.session = Some(session);
        self.flush();
        Ok(started)
    }

    /// Start a session that hands out drops in the given order
    pub fn start_scripted(&mut self, queue: DropQueue, now_ms: u64) -> Result<bool> {
        if self.session_running() {
            return Ok(false);
        }
        let mut session = self.new_session()?;
        let started = session.start_with_queue(queue, &mut self.scheduler, now_ms);
        self.session = Some(session);
        self.flush();
        Ok(started)
    }

    /// Player selects a cell
    pub fn collect(&mut self, cell: CellId, now_ms: u64) -> Option<u32> {
        let score = self
            .session
            .as_mut()
            .and_then(|s| s.collect(&mut self.scheduler, cell, now_ms));
        self.flush();
        score
    }

    /// Deliver a timer firing from the scheduler
    pub fn handle_timer(&mut self, firing: &Firing) {
        if let Some(session) = self.session.as_mut() {
            session.handle_timer(&mut self.scheduler, firing);
        }
        self.flush();
    }

    /// Player reset: back to tier 1. A running session keeps going.
    pub fn reset_progression(&mut self) {
        self.progression.reset();
        self.publish(vec![GameEvent::ProgressionReset {
            difficulty_tier: self.progression.current_tier(),
        }]);
    }

    /// Move session events out, resolve session end, notify listeners
    fn flush(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut fresh: Vec<GameEvent> = session.drain_events().collect();

        if let Some(summary) = session.take_summary() {
            let update = self.progression.record(&summary);
            fresh.push(GameEvent::SessionEnded {
                final_score: summary.final_score,
                reason: summary.reason,
                sessions_completed: update.sessions_completed,
                difficulty_tier: update.difficulty_tier,
                duration_ms: summary.duration_ms,
            });
            if let Some(new_tier) = update.tier_up {
                fresh.push(GameEvent::TierUp { new_tier });
            }
        }
        self.publish(fresh);
    }

    fn publish(&mut self, fresh: Vec<GameEvent>) {
        for event in &fresh {
            for listener in &mut self.listeners {
                listener.on_event(event);
            }
        }
        self.events.extend(fresh);
    }

    /// Events since the last drain
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn progression(&self) -> &ProgressionTracker {
        &self.progression
    }

    pub fn session(&self) -> Option<&SessionEngine> {
        self.session.as_ref()
    }

    /// Grid of the current session
    pub fn grid(&self) -> Option<&GridModel> {
        self.session.as_ref().map(|s| s.grid())
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl Game<VirtualScheduler> {
    /// Game on virtual time
    pub fn new_virtual(rules: Rules, seed: u64) -> Result<Self> {
        Self::new(rules, seed, VirtualScheduler::new())
    }

    /// Fire everything due up to `now_ms`, in time order
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(firing) = self.scheduler.pop_due(now_ms) {
            self.handle_timer(&firing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::DropKind;
    use crate::sim::state::EndReason;

    #[derive(Default)]
    struct Recorder {
        events: Vec<GameEvent>,
    }

    impl EventListener for Recorder {
        fn on_event(&mut self, event: &GameEvent) {
            self.events.push(event.clone());
        }
    }

    fn last_spawn(events: &[GameEvent]) -> CellId {
        events
            .iter()
            .rev()
            .find_map(|e| match e {
                GameEvent::Spawned { cell, .. } => Some(*cell),
                _ => None,
            })
            .unwrap()
    }

    fn session_ended(events: &[GameEvent]) -> Option<GameEvent> {
        events
            .iter()
            .find(|e| matches!(e, GameEvent::SessionEnded { .. }))
            .cloned()
    }

    fn play_idle_session(game: &mut Game, start_ms: u64) -> Vec<GameEvent> {
        game.start_session(start_ms).unwrap();
        game.advance_to(start_ms + 30_000);
        game.drain_events().collect()
    }

    #[test]
    fn test_end_to_end_scripted_session() {
        let mut game = Game::new_virtual(Rules::default(), 1).unwrap();
        let queue = DropQueue::from_kinds(vec![DropKind::Blue, DropKind::Orange, DropKind::Rainbow]);
        assert!(game.start_scripted(queue, 0).unwrap());

        let mut scores = Vec::new();
        for spawn_at in [800, 1600, 2400] {
            game.advance_to(spawn_at);
            let events: Vec<GameEvent> = game.drain_events().collect();
            let cell = last_spawn(&events);
            scores.push(game.collect(cell, spawn_at + 100).unwrap());
        }
        assert_eq!(scores, vec![2, 0, 5]);

        game.advance_to(30_000);
        let events: Vec<GameEvent> = game.drain_events().collect();
        assert_eq!(events.iter().rev().nth(1), Some(&GameEvent::Tick { seconds_remaining: 0 }));
        assert_eq!(
            session_ended(&events),
            Some(GameEvent::SessionEnded {
                final_score: 5,
                reason: EndReason::TimedOut,
                sessions_completed: 1,
                difficulty_tier: 1,
                duration_ms: 30_000,
            })
        );
        assert!(game.scheduler().is_idle());
    }

    #[test]
    fn test_tier_up_after_third_session() {
        let mut game = Game::new_virtual(Rules::default(), 7).unwrap();
        for i in 0..2 {
            let events = play_idle_session(&mut game, i * 40_000);
            assert!(!events.iter().any(|e| matches!(e, GameEvent::TierUp { .. })));
        }
        let events = play_idle_session(&mut game, 80_000);
        let tail: Vec<&GameEvent> = events.iter().rev().take(2).collect();
        assert_eq!(tail[0], &GameEvent::TierUp { new_tier: 2 });
        assert!(matches!(
            tail[1],
            GameEvent::SessionEnded {
                sessions_completed: 3,
                difficulty_tier: 2,
                ..
            }
        ));

        // Next session runs at the new tier and cadence
        game.start_session(120_000).unwrap();
        let session = game.session().unwrap();
        assert_eq!(session.tier(), 2);
        assert_eq!(session.cadence_ms(), 700);
    }

    #[test]
    fn test_reset_after_three_sessions() {
        let mut game = Game::new_virtual(Rules::default(), 3).unwrap();
        for i in 0..3 {
            play_idle_session(&mut game, i * 40_000);
        }
        assert_eq!(game.progression().current_tier(), 2);
        let _ = game.drain_events();

        game.reset_progression();
        assert_eq!(
            game.progression().state(),
            ProgressionState {
                sessions_completed: 0,
                difficulty_tier: 1,
            }
        );
        assert_eq!(
            game.drain_events().collect::<Vec<_>>(),
            vec![GameEvent::ProgressionReset { difficulty_tier: 1 }]
        );
    }

    #[test]
    fn test_reset_notifies_listeners_mid_session() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut game = Game::new_virtual(Rules::default(), 4).unwrap();
        game.add_listener(Box::new(recorder.clone()));
        game.reset_progression();
        game.start_session(0).unwrap();
        game.reset_progression();

        let resets = recorder
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ProgressionReset { difficulty_tier: 1 }))
            .count();
        assert_eq!(resets, 2);
        // The running session is untouched
        assert_eq!(game.session().map(|s| s.status()), Some(SessionStatus::Running));
    }

    #[test]
    fn test_duplicate_start_ignored() {
        let mut game = Game::new_virtual(Rules::default(), 3).unwrap();
        assert!(game.start_session(0).unwrap());
        assert!(!game.start_session(50).unwrap());
        assert_eq!(game.scheduler().pending(), 2);
        let started = game
            .drain_events()
            .filter(|e| matches!(e, GameEvent::SessionStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_restart_after_end_builds_new_session() {
        let mut game = Game::new_virtual(Rules::default(), 3).unwrap();
        play_idle_session(&mut game, 0);
        assert_eq!(game.session().map(|s| s.status()), Some(SessionStatus::Ended));
        assert!(game.start_session(31_000).unwrap());
        let session = game.session().unwrap();
        assert_eq!(session.status(), SessionStatus::Running);
        assert_eq!(session.score(), 0);
        assert_eq!(session.state().time_remaining, 30);
    }

    #[test]
    fn test_commands_before_start_are_noops() {
        let mut game = Game::new_virtual(Rules::default(), 3).unwrap();
        assert_eq!(game.collect(0, 10), None);
        game.advance_to(5000);
        assert!(game.grid().is_none());
        assert_eq!(game.drain_events().count(), 0);
    }

    #[test]
    fn test_listeners_see_every_event() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut game = Game::new_virtual(Rules::default(), 11).unwrap();
        game.add_listener(Box::new(recorder.clone()));

        let drained = play_idle_session(&mut game, 0);
        assert!(!drained.is_empty());
        assert_eq!(recorder.borrow().events, drained);
    }

    #[test]
    fn test_same_seed_same_sessions() {
        let mut a = Game::new_virtual(Rules::default(), 99).unwrap();
        let mut b = Game::new_virtual(Rules::default(), 99).unwrap();
        assert_eq!(play_idle_session(&mut a, 0), play_idle_session(&mut b, 0));
    }

    #[test]
    fn test_long_expiry_does_not_overflow() {
        let rules = Rules::from_json(r#"{ "expiry_ms": 3600000 }"#).unwrap();
        let mut game = Game::new_virtual(rules, 5).unwrap();
        game.start_session(u64::MAX - 40_000).unwrap();
        game.advance_to(u64::MAX);
        let events: Vec<GameEvent> = game.drain_events().collect();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })));
        assert!(matches!(
            session_ended(&events),
            Some(GameEvent::SessionEnded {
                reason: EndReason::TimedOut,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = Rules {
            grid_size: 0,
            ..Default::default()
        };
        assert!(Game::new_virtual(rules, 1).is_err());
    }
}
