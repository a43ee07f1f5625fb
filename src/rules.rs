//! Game rules and balance
//!
//! Every tunable constant of a session lives here so the engine can be driven
//! by data. Rules load from a JSON file; missing fields fall back to the
//! named preset (standard when none is given).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::spawn_cadence_ms;

/// Rules presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RulesPreset {
    /// Current balance: time-out only, 100 drops, 2.5s expiry
    #[default]
    Standard,
    /// Earlier balance: race to 40 points, 40 drops, 1.25s expiry, 1s spawns, no harder band
    Classic,
}

impl RulesPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulesPreset::Standard => "Standard",
            RulesPreset::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "std" => Some(RulesPreset::Standard),
            "classic" => Some(RulesPreset::Classic),
            _ => None,
        }
    }
}

/// Session and progression balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub preset: RulesPreset,

    // === Session ===
    /// Countdown length in units
    pub session_seconds: u32,
    /// Length of one countdown unit
    pub countdown_ms: u64,
    /// Ends the session early with `TargetReached` once met
    pub target_score: Option<u32>,
    /// One-shot celebration threshold
    pub milestone_score: u32,

    // === Grid & drops ===
    pub grid_size: usize,
    pub queue_length: usize,
    /// Grace period before an uncollected drop is missed
    pub expiry_ms: u64,

    // === Spawn cadence ===
    pub base_cadence_ms: u64,
    pub cadence_step_ms: u64,
    pub min_cadence_ms: u64,

    // === Progression ===
    pub sessions_per_tier: u32,
    /// Inclusive tier band with extra hazards
    pub hard_band: (u32, u32),
    pub hard_band_bonus: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            preset: RulesPreset::Standard,

            session_seconds: SESSION_SECONDS,
            countdown_ms: COUNTDOWN_MS,
            target_score: None,
            milestone_score: MILESTONE_SCORE,

            grid_size: GRID_SIZE,
            queue_length: QUEUE_LENGTH,
            expiry_ms: EXPIRY_MS,

            base_cadence_ms: BASE_CADENCE_MS,
            cadence_step_ms: CADENCE_STEP_MS,
            min_cadence_ms: MIN_CADENCE_MS,

            sessions_per_tier: SESSIONS_PER_TIER,
            hard_band: (HARD_BAND_START, HARD_BAND_END),
            hard_band_bonus: HARD_BAND_BONUS,
        }
    }
}

impl Rules {
    /// Create rules from a preset (applies preset defaults)
    pub fn from_preset(preset: RulesPreset) -> Self {
        let mut rules = Self::default();
        rules.apply_preset(preset);
        rules
    }

    /// Apply a preset (updates preset-dependent values)
    pub fn apply_preset(&mut self, preset: RulesPreset) {
        self.preset = preset;
        match preset {
            RulesPreset::Standard => {
                self.target_score = None;
                self.queue_length = QUEUE_LENGTH;
                self.expiry_ms = EXPIRY_MS;
                self.base_cadence_ms = BASE_CADENCE_MS;
                self.hard_band_bonus = HARD_BAND_BONUS;
            }
            RulesPreset::Classic => {
                self.target_score = Some(40);
                self.queue_length = 40;
                self.expiry_ms = 1250;
                self.base_cadence_ms = 1000;
                // 40 drops leave no room for the harder band
                self.hard_band_bonus = 0;
            }
        }
    }

    /// Spawn cadence for a tier
    pub fn spawn_cadence_ms(&self, tier: u32) -> u64 {
        spawn_cadence_ms(
            tier,
            self.base_cadence_ms,
            self.cadence_step_ms,
            self.min_cadence_ms,
        )
    }

    /// Whether a tier falls in the harder band
    pub fn in_hard_band(&self, tier: u32) -> bool {
        (self.hard_band.0..=self.hard_band.1).contains(&tier)
    }

    /// Session length in milliseconds
    pub fn session_ms(&self) -> u64 {
        u64::from(self.session_seconds).saturating_mul(self.countdown_ms)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| -> Result<()> { Err(SimError::InvalidRules(msg.to_string())) };

        if self.session_seconds == 0 || self.session_seconds > MAX_SESSION_SECONDS {
            return fail("session_seconds out of range");
        }
        for (name, ms) in [
            ("countdown_ms", self.countdown_ms),
            ("expiry_ms", self.expiry_ms),
            ("base_cadence_ms", self.base_cadence_ms),
            ("cadence_step_ms", self.cadence_step_ms),
        ] {
            if ms > MAX_TIMER_MS {
                return Err(SimError::InvalidRules(format!(
                    "{} {} exceeds {}ms",
                    name, ms, MAX_TIMER_MS
                )));
            }
        }
        if self.countdown_ms == 0 {
            return fail("countdown_ms must be positive");
        }
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return fail("grid_size out of range");
        }
        if self.queue_length > MAX_QUEUE_LENGTH {
            return fail("queue_length out of range");
        }
        if self.min_cadence_ms == 0 || self.min_cadence_ms > self.base_cadence_ms {
            return fail("min_cadence_ms must be positive and at most base_cadence_ms");
        }
        // A drop must outlive at least one spawn tick, or misses are invisible
        if self.expiry_ms <= self.base_cadence_ms {
            return fail("expiry_ms must exceed base_cadence_ms");
        }
        if self.sessions_per_tier == 0 {
            return fail("sessions_per_tier must be positive");
        }
        if self.hard_band.0 > self.hard_band.1 {
            return fail("hard_band start is after its end");
        }
        // The hardest composition must fit in the queue
        let hardest = self
            .hard_band_bonus
            .checked_mul(3)
            .and_then(|bonus| bonus.checked_add(BASE_ORANGE + BASE_GREEN + BASE_YELLOW + BASE_RAINBOW));
        match hardest {
            Some(hardest) if hardest <= self.queue_length => Ok(()),
            Some(hardest) => Err(SimError::InvalidRules(format!(
                "queue_length {} cannot hold {} non-blue drops",
                self.queue_length, hardest
            ))),
            None => fail("hard_band_bonus out of range"),
        }
    }

    /// Parse rules from JSON and validate them.
    ///
    /// Fields left out take the values of the named `preset`, so
    /// `{"preset": "Classic"}` is the full classic balance.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(fields) = value.as_object_mut() {
            let preset = match fields.get("preset") {
                Some(preset) => serde_json::from_value(preset.clone())?,
                None => RulesPreset::Standard,
            };
            let mut merged = serde_json::to_value(Self::from_preset(preset))?;
            if let Some(base) = merged.as_object_mut() {
                base.append(fields);
            }
            value = merged;
        }
        let rules: Rules = serde_json::from_value(value)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let rules = Self::from_json(&json)?;
                log::info!("Loaded rules from {} ({})", path.display(), rules.preset.as_str());
                Ok(rules)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No rules at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save rules as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Rules saved to {}", path.display());
        Ok(())
    }
}
