//! Drop Dash entry point
//!
//! Runs headless demo sessions on virtual time with the autoplayer.
//!
//! Usage: `drop-dash [RULES_JSON] [SEED] [SESSIONS]`

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use drop_dash::feedback::{FeedbackQueue, FeedbackSettings};
use drop_dash::sim::{Autoplayer, Game, GameEvent};
use drop_dash::{HighScores, Result, Rules, SimError};

/// Virtual time step between polls of the autoplayer
const STEP_MS: u64 = 50;
/// Pause between demo sessions
const BETWEEN_SESSIONS_MS: u64 = 2000;

fn parse_arg<T: std::str::FromStr>(arg: Option<String>, name: &str, default: T) -> Result<T> {
    match arg {
        Some(s) => s
            .parse()
            .map_err(|_| SimError::InvalidRules(format!("bad {}: {:?}", name, s))),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Drop Dash (headless demo) starting...");

    let mut args = std::env::args().skip(1);
    let rules = match args.next() {
        Some(path) if path != "-" => Rules::load(&PathBuf::from(path))?,
        _ => Rules::default(),
    };
    let seed: u64 = parse_arg(args.next(), "seed", 12345)?;
    let sessions: u32 = parse_arg(args.next(), "session count", 3)?;

    let scores = Rc::new(RefCell::new(HighScores::new()));
    let feedback = Rc::new(RefCell::new(FeedbackQueue::new(FeedbackSettings::default())));

    let mut game = Game::new_virtual(rules, seed)?;
    game.add_listener(Box::new(scores.clone()));
    game.add_listener(Box::new(feedback.clone()));

    let mut bot = Autoplayer::default();
    let mut now: u64 = 0;

    for _ in 0..sessions {
        game.start_session(now)?;
        loop {
            game.advance_to(now);

            let mut ended = false;
            for event in game.drain_events() {
                bot.observe(&event, now);
                match event {
                    GameEvent::SessionStarted { tier, cadence_ms } => {
                        println!("-- session start: tier {tier}, spawn every {cadence_ms}ms");
                    }
                    GameEvent::MilestoneReached { score } => println!("   milestone at {score}!"),
                    GameEvent::SessionEnded {
                        final_score,
                        reason,
                        sessions_completed,
                        difficulty_tier,
                        duration_ms,
                    } => {
                        println!(
                            "-- session {sessions_completed} over ({}): score {final_score} in {:.1}s, next tier {difficulty_tier}",
                            reason.as_str(),
                            duration_ms as f64 / 1000.0
                        );
                        ended = true;
                    }
                    GameEvent::TierUp { new_tier } => println!("   tier up -> {new_tier}"),
                    other => log::debug!("{:?}", other),
                }
            }
            if ended {
                break;
            }

            let taps = game
                .grid()
                .map(|grid| bot.taps_due(now, grid))
                .unwrap_or_default();
            for cell in taps {
                game.collect(cell, now);
            }

            // Cosmetic cues would go to a renderer; here they are only counted
            let cues = feedback.borrow_mut().drain().count();
            if cues > 0 {
                log::trace!("{} feedback cues at {}ms", cues, now);
            }

            now += STEP_MS;
        }
        now += BETWEEN_SESSIONS_MS;
    }

    println!("\nHigh scores:");
    for (i, entry) in scores.borrow().entries.iter().enumerate() {
        println!(
            "{:>2}. {:>4}  (tier {}, {:.1}s)",
            i + 1,
            entry.score,
            entry.tier,
            entry.duration_ms as f64 / 1000.0
        );
    }
    Ok(())
}
