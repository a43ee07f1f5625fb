//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (timers come from a `Scheduler`)
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod catalog;
pub mod game;
pub mod grid;
pub mod progression;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod state;

pub use autoplay::Autoplayer;
pub use catalog::{DropCatalog, DropKind};
pub use game::{EventListener, Game};
pub use grid::GridModel;
pub use progression::{ProgressionState, ProgressionTracker, ProgressionUpdate};
pub use queue::{DropQueue, composition, shuffle};
pub use scheduler::{Firing, Scheduler, Timer, TimerId, VirtualScheduler};
pub use session::SessionEngine;
pub use state::{
    ActiveDrop, CellId, DropId, EndReason, GameEvent, SessionState, SessionStatus, SessionSummary,
};
