//! Presentation feedback cues
//!
//! Turns engine events into cosmetic cues (splashes, shakes, confetti,
//! jingles). A renderer or audio backend drains the cue list; nothing here
//! feeds back into the simulation.

use serde::{Deserialize, Serialize};

use crate::sim::{CellId, DropKind, EndReason, EventListener, GameEvent};

/// Cosmetic reactions to gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Blue drop collected
    WaterRipple { cell: CellId },
    /// Orange drop collected
    OrangeSplash { cell: CellId },
    /// Whole board shakes (hazard hit)
    BoardShake,
    /// Green/yellow drop collected
    Splash { cell: CellId },
    /// Full-screen rainbow confetti
    RainbowShower,
    /// Drop pops into a cell
    PopIn { cell: CellId },
    /// Drop faded out uncollected
    FadeOut { cell: CellId },
    /// Milestone celebration
    ConfettiBurst,
    /// Level-up banner
    TierUpNotice { tier: u32 },
    /// Progress wiped, back to the first tier
    ResetNotice { tier: u32 },
    /// Countdown running low
    TimerWarning { seconds: u32 },
    /// End-of-session sound
    SessionOverJingle { win: bool },
}

impl Cue {
    /// Motion-heavy cues are suppressed under reduced motion
    pub fn is_motion(&self) -> bool {
        matches!(self, Cue::BoardShake | Cue::RainbowShower | Cue::ConfettiBurst)
    }

    /// Cues that are pure sound
    pub fn is_audio(&self) -> bool {
        matches!(self, Cue::SessionOverJingle { .. })
    }
}

/// Player preferences for feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSettings {
    pub muted: bool,
    /// Minimize shake and full-screen effects
    pub reduced_motion: bool,
    /// Warn when this many seconds remain (0 disables)
    pub warning_seconds: u32,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            muted: false,
            reduced_motion: false,
            warning_seconds: 5,
        }
    }
}

/// Collects cues from the event stream
#[derive(Debug, Clone, Default)]
pub struct FeedbackQueue {
    settings: FeedbackSettings,
    cues: Vec<Cue>,
}

impl FeedbackQueue {
    pub fn new(settings: FeedbackSettings) -> Self {
        Self {
            settings,
            cues: Vec::new(),
        }
    }

    pub fn settings(&self) -> &FeedbackSettings {
        &self.settings
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.settings.reduced_motion = reduced;
    }

    fn push(&mut self, cue: Cue) {
        if self.settings.reduced_motion && cue.is_motion() {
            return;
        }
        if self.settings.muted && cue.is_audio() {
            return;
        }
        self.cues.push(cue);
    }

    /// Cues waiting to be played
    pub fn drain(&mut self) -> std::vec::Drain<'_, Cue> {
        self.cues.drain(..)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

impl EventListener for FeedbackQueue {
    fn on_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Spawned { cell, .. } => self.push(Cue::PopIn { cell }),
            GameEvent::Collected { cell, kind, .. } => match kind {
                DropKind::Rainbow => self.push(Cue::RainbowShower),
                DropKind::Blue => self.push(Cue::WaterRipple { cell }),
                DropKind::Orange => {
                    self.push(Cue::BoardShake);
                    self.push(Cue::OrangeSplash { cell });
                }
                DropKind::Green | DropKind::Yellow => self.push(Cue::Splash { cell }),
            },
            GameEvent::Missed { cell, .. } => self.push(Cue::FadeOut { cell }),
            GameEvent::MilestoneReached { .. } => self.push(Cue::ConfettiBurst),
            GameEvent::Tick { seconds_remaining } => {
                let warn = self.settings.warning_seconds;
                if seconds_remaining > 0 && seconds_remaining <= warn {
                    self.push(Cue::TimerWarning {
                        seconds: seconds_remaining,
                    });
                }
            }
            GameEvent::SessionEnded { reason, .. } => self.push(Cue::SessionOverJingle {
                win: reason == EndReason::TargetReached,
            }),
            GameEvent::TierUp { new_tier } => self.push(Cue::TierUpNotice { tier: new_tier }),
            GameEvent::ProgressionReset { difficulty_tier } => {
                self.push(Cue::ResetNotice {
                    tier: difficulty_tier,
                })
            }
            GameEvent::SessionStarted { .. } => {}
        }
    }
}
