//! Physics tuning
//!
//! Every per-frame constant the engine uses. Values are tuned against a
//! normalized delta of 1.0 per frame at `frame_ms`; change them together if
//! the target frame rate changes. Overrides are read from LocalStorage on
//! the web so the feel can be adjusted without a rebuild.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Milliseconds per normalized frame
    pub frame_ms: f32,
    /// Clamp on the normalized delta of a single frame
    pub max_frame_delta: f32,

    // === Integration ===
    pub gravity: f32,
    /// Velocity multiplier per physics step, in (0, 1]
    pub friction: f32,
    /// Components below this magnitude are zeroed
    pub min_velocity: f32,

    // === Boundaries ===
    /// Speed kept after an edge bounce, in [0, 1]
    pub bounce_damping: f32,

    // === Pop shockwave ===
    pub impact_radius: f32,
    pub impact_force: f32,
    /// Popping -> Popped delay, matches the pop animation
    pub pop_duration_ms: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            frame_ms: FRAME_MS,
            max_frame_delta: MAX_FRAME_DELTA,
            gravity: GRAVITY,
            friction: FRICTION,
            min_velocity: MIN_VELOCITY,
            bounce_damping: BOUNCE_DAMPING,
            impact_radius: POP_IMPACT_RADIUS,
            impact_force: POP_IMPACT_FORCE,
            pop_duration_ms: POP_DURATION_MS,
        }
    }
}

impl PhysicsTuning {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "balloon_pop_tuning";

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check("frame_ms", self.frame_ms as f64, "> 0", self.frame_ms > 0.0)?;
        ConfigError::check(
            "max_frame_delta",
            self.max_frame_delta as f64,
            "> 0",
            self.max_frame_delta > 0.0,
        )?;
        ConfigError::check("gravity", self.gravity as f64, "finite", true)?;
        ConfigError::check(
            "friction",
            self.friction as f64,
            "(0, 1]",
            self.friction > 0.0 && self.friction <= 1.0,
        )?;
        ConfigError::check(
            "min_velocity",
            self.min_velocity as f64,
            ">= 0",
            self.min_velocity >= 0.0,
        )?;
        ConfigError::check(
            "bounce_damping",
            self.bounce_damping as f64,
            "[0, 1]",
            (0.0..=1.0).contains(&self.bounce_damping),
        )?;
        ConfigError::check(
            "impact_radius",
            self.impact_radius as f64,
            "> 0",
            self.impact_radius > 0.0,
        )?;
        ConfigError::check(
            "impact_force",
            self.impact_force as f64,
            ">= 0",
            self.impact_force >= 0.0,
        )?;
        ConfigError::check(
            "pop_duration_ms",
            self.pop_duration_ms as f64,
            ">= 0",
            self.pop_duration_ms >= 0.0,
        )?;
        Ok(())
    }

    /// Parse and validate; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Convert elapsed wall time to a clamped normalized frame delta
    pub fn normalize_delta(&self, elapsed_ms: f32) -> f32 {
        (elapsed_ms.max(0.0) / self.frame_ms).min(self.max_frame_delta)
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded physics tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored physics tuning: {}", e),
                }
            }
        }

        Self::default()
    }


    /// Native builds have no storage; always the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
