//! Scene settings
//!
//! How the balloon field is populated at startup. Persisted separately from
//! the physics tuning in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Balloons spawned at startup
    pub count: u32,

    // === Per-balloon physical properties ===
    pub radius: f32,
    pub mass: f32,
    /// Bounce coefficient in [0, 1]
    pub elasticity: f32,

    // === Spawn policy ===
    /// Position retries while a candidate overlaps an existing balloon
    pub max_spawn_attempts: u32,
    /// Extra gap required between spawned balloons (pixels)
    pub min_spacing: f32,
    pub min_speed: f32,
    pub max_speed: f32,

    /// RNG seed; `None` lets the host pick one (e.g. from the clock)
    pub seed: Option<u64>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            count: BALLOON_COUNT,
            radius: BALLOON_RADIUS,
            mass: BALLOON_MASS,
            elasticity: BALLOON_ELASTICITY,
            max_spawn_attempts: SPAWN_MAX_ATTEMPTS,
            min_spacing: SPAWN_MIN_SPACING,
            min_speed: SPAWN_MIN_SPEED,
            max_speed: SPAWN_MAX_SPEED,
            seed: None,
        }
    }
}

impl SceneSettings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "balloon_pop_settings";

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check("radius", self.radius as f64, "> 0", self.radius > 0.0)?;
        ConfigError::check("mass", self.mass as f64, "> 0", self.mass > 0.0)?;
        ConfigError::check(
            "elasticity",
            self.elasticity as f64,
            "[0, 1]",
            (0.0..=1.0).contains(&self.elasticity),
        )?;
        ConfigError::check(
            "max_spawn_attempts",
            self.max_spawn_attempts as f64,
            ">= 1",
            self.max_spawn_attempts >= 1,
        )?;
        ConfigError::check(
            "min_spacing",
            self.min_spacing as f64,
            ">= 0",
            self.min_spacing >= 0.0,
        )?;
        ConfigError::check(
            "min_speed",
            self.min_speed as f64,
            ">= 0",
            self.min_speed >= 0.0,
        )?;
        if self.min_speed > self.max_speed {
            return Err(ConfigError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        Ok(())
    }

    /// Parse and validate; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Same settings with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded scene settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored scene settings: {}", e),
                }
            }
        }

        log::info!("Using default scene settings");
        Self::default()
    }


    /// Native builds have no storage; always the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
