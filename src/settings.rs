//! Simulation settings
//!
//! Everything tunable lives here and round-trips through JSON. Missing fields
//! fall back to their defaults, so a settings file only needs the values it
//! changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, SettingsError};
use crate::sim::checkpoint::Gates;
use crate::sim::sensor::SensorArray;
use crate::sim::surface::Palette;
use crate::sim::track::TrackLayout;

/// Sensor fan presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SensorPreset {
    /// 5 rays over 90°, used with manual driving
    Narrow,
    /// 9 rays over 150°, required by the rule-based driver
    #[default]
    Wide,
}

impl SensorPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorPreset::Narrow => "Narrow",
            SensorPreset::Wide => "Wide",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "narrow" | "5" => Some(SensorPreset::Narrow),
            "wide" | "9" => Some(SensorPreset::Wide),
            _ => None,
        }
    }

    /// Sensor fan for this preset
    pub fn sensors(&self) -> SensorArray {
        let (fov, rays) = match self {
            SensorPreset::Narrow => (90.0, 5),
            SensorPreset::Wide => (FIELD_OF_VIEW, RAY_COUNT),
        };
        // Preset values are always valid
        SensorArray::new(fov, rays, MAX_RANGE).unwrap_or_default()
    }
}

/// Vehicle spawn and handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSettings {
    pub start: Vec2,
    /// Spawn heading in degrees
    pub heading: f32,
    pub max_speed: f32,
    /// Speed change per throttle/brake tick
    pub acceleration: f32,
    /// Degrees per tick at full speed (manual) or per unit steer (rule-based)
    pub turn_speed: f32,
    /// Speed multiplier per tick when no throttle command is active
    pub idle_decay: f32,
}

impl Default for VehicleSettings {
    fn default() -> Self {
        Self {
            start: Vec2::new(START_X, START_Y),
            heading: START_HEADING,
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            turn_speed: TURN_SPEED,
            idle_decay: IDLE_DECAY,
        }
    }
}

impl VehicleSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(ConfigError::InvalidVehicle("max_speed must be positive"));
        }
        if !(self.acceleration.is_finite() && self.acceleration >= 0.0) {
            return Err(ConfigError::InvalidVehicle("acceleration must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.idle_decay) {
            return Err(ConfigError::InvalidVehicle("idle_decay must be within [0, 1]"));
        }
        if !self.start.is_finite() || !self.heading.is_finite() || !self.turn_speed.is_finite() {
            return Err(ConfigError::InvalidVehicle("start, heading and turn_speed must be finite"));
        }
        Ok(())
    }
}

/// Rule-based driver thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Accelerate while the forward ray reads more than this
    pub forward_threshold: u32,
    /// Swerve hard when the forward ray reads less than this
    pub panic_threshold: u32,
    /// Speed multiplier when the road ahead is short
    pub brake_factor: f32,
    /// Scales the left/right clearance difference into degrees
    pub steer_divisor: f32,
}

impl PolicySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.steer_divisor.is_finite() && self.steer_divisor > 0.0) {
            return Err(ConfigError::InvalidPolicy("steer_divisor must be positive"));
        }
        if !(0.0..=1.0).contains(&self.brake_factor) {
            return Err(ConfigError::InvalidPolicy("brake_factor must be within [0, 1]"));
        }
        Ok(())
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            forward_threshold: FORWARD_THRESHOLD,
            panic_threshold: PANIC_THRESHOLD,
            brake_factor: BRAKE_FACTOR,
            steer_divisor: STEER_DIVISOR,
        }
    }
}

/// Reward shaping for the training environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    /// Added every tick (negative)
    pub time_penalty: f32,
    /// Multiplied by raw speed every tick
    pub speed_coef: f32,
    pub checkpoint: f32,
    pub lap: f32,
    /// Replaces the whole tick's reward on crash
    pub crash: f32,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            time_penalty: -0.01,
            speed_coef: 0.1,
            checkpoint: 1.0,
            lap: 20.0,
            crash: -10.0,
        }
    }
}

/// Episode limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeSettings {
    /// Truncate after this many steps
    pub max_steps: u32,
    /// Terminate once this many laps are complete (0 = never)
    pub laps_to_finish: u32,
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self {
            max_steps: MAX_STEPS,
            laps_to_finish: 1,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub track: TrackLayout,
    pub palette: Palette,
    pub sensors: SensorArray,
    pub gates: Gates,
    pub vehicle: VehicleSettings,
    pub policy: PolicySettings,
    pub reward: RewardSettings,
    pub episode: EpisodeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track: TrackLayout::default(),
            palette: Palette::default(),
            sensors: SensorPreset::Wide.sensors(),
            gates: Gates::training(),
            vehicle: VehicleSettings::default(),
            policy: PolicySettings::default(),
            reward: RewardSettings::default(),
            episode: EpisodeSettings::default(),
        }
    }
}

impl Settings {
    /// Settings for the rule-based demo lap (different spawn and gate set)
    pub fn demo() -> Self {
        Self {
            gates: Gates::demo(),
            vehicle: VehicleSettings {
                start: Vec2::new(420.0, 160.0),
                ..VehicleSettings::default()
            },
            ..Self::default()
        }
    }

    /// Apply a sensor preset
    pub fn apply_preset(&mut self, preset: SensorPreset) {
        self.sensors = preset.sensors();
    }

    /// Check everything that cannot be expressed in the types
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.track.validate()?;
        self.vehicle.validate()?;
        self.policy.validate()
    }

    /// Parse and validate settings from JSON
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to `fallback` if the file is missing or invalid
    pub fn load_or(path: impl AsRef<Path>, fallback: Settings) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({}): {e}", path.as_ref().display());
                fallback
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(SensorPreset::from_str("NARROW"), Some(SensorPreset::Narrow));
        assert_eq!(SensorPreset::from_str("9"), Some(SensorPreset::Wide));
        assert_eq!(SensorPreset::from_str("ultra"), None);
        assert_eq!(SensorPreset::Narrow.as_str(), "Narrow");

        let narrow = SensorPreset::Narrow.sensors();
        assert_eq!(narrow.ray_count(), 5);
        assert_eq!(narrow.field_of_view(), 90.0);
    }

    #[test]
    fn test_defaults_are_valid() {
        Settings::default().validate().unwrap();
        Settings::demo().validate().unwrap();
        assert_eq!(Settings::default().sensors.ray_count() + 1, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "vehicle": { "max_speed": 8.0 }, "episode": { "max_steps": 200 } }"#;
        let settings = Settings::from_json_str(json).unwrap();
        assert_eq!(settings.vehicle.max_speed, 8.0);
        assert_eq!(settings.vehicle.acceleration, ACCELERATION);
        assert_eq!(settings.episode.max_steps, 200);
        assert_eq!(settings.gates, Gates::training());
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::demo();
        settings.apply_preset(SensorPreset::Narrow);
        let json = settings.to_json_string().unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let too_few = r#"{ "sensors": { "field_of_view": 90.0, "ray_count": 1, "max_range": 150 } }"#;
        assert!(matches!(
            Settings::from_json_str(too_few),
            Err(SettingsError::Json(_))
        ));

        let bad_vehicle = r#"{ "vehicle": { "max_speed": 0.0 } }"#;
        assert!(matches!(
            Settings::from_json_str(bad_vehicle),
            Err(SettingsError::Config(ConfigError::InvalidVehicle(_)))
        ));
    }

    #[test]
    fn test_policy_must_steer_finitely() {
        let zero_divisor = r#"{ "policy": { "steer_divisor": 0.0 } }"#;
        assert!(matches!(
            Settings::from_json_str(zero_divisor),
            Err(SettingsError::Config(ConfigError::InvalidPolicy(_)))
        ));

        let mut settings = Settings::default();
        settings.policy.brake_factor = 1.5;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::InvalidPolicy("brake_factor must be within [0, 1]"))
        );
    }

    #[test]
    fn test_huge_spawn_heading_is_accepted_and_wrapped() {
        let settings = Settings::from_json_str(r#"{ "vehicle": { "heading": 1e20 } }"#).unwrap();
        assert_eq!(settings.vehicle.heading, 1e20);
        let vehicle = crate::sim::Vehicle::new(&settings.vehicle);
        assert!((-180.0..180.0).contains(&vehicle.pose.heading));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load_or("/nonexistent/track-racer.json", Settings::demo());
        assert_eq!(settings, Settings::demo());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("track-racer-settings-{}.json", std::process::id()));
        let settings = Settings::demo();
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(&path);
    }
}
