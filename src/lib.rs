//! Track Racer - A raster-track driving simulator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (surface, sensors, collisions, checkpoints, episodes)
//! - `settings`: Data-driven configuration loaded from JSON
//! - `error`: Configuration-time failures
//! - `laptimes`: Fastest-lap leaderboard
//! - `snapshot`: PNG export of rendered frames

pub mod error;
pub mod laptimes;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use error::{ConfigError, SettingsError};
pub use laptimes::LapBoard;
pub use settings::{SensorPreset, Settings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Track raster dimensions
    pub const TRACK_WIDTH: u32 = 800;
    pub const TRACK_HEIGHT: u32 = 600;

    /// Per-channel tolerance for palette matching
    pub const COLOR_TOLERANCE: u8 = 30;

    /// Vehicle defaults
    pub const START_X: f32 = 425.0;
    pub const START_Y: f32 = 190.0;
    pub const START_HEADING: f32 = -10.0; // degrees
    pub const MAX_SPEED: f32 = 5.0;
    pub const ACCELERATION: f32 = 0.1;
    pub const TURN_SPEED: f32 = 4.0; // degrees per tick
    /// Speed multiplier per tick when no throttle is held
    pub const IDLE_DECAY: f32 = 0.96;

    /// Sensor defaults
    pub const RAY_COUNT: usize = 9;
    pub const FIELD_OF_VIEW: f32 = 150.0; // degrees
    pub const MAX_RANGE: u32 = 150;

    /// Rule-based driver thresholds (in ray steps)
    pub const FORWARD_THRESHOLD: u32 = 80;
    pub const PANIC_THRESHOLD: u32 = 30;
    pub const BRAKE_FACTOR: f32 = 0.85;
    pub const STEER_DIVISOR: f32 = 400.0;

    /// Episode defaults
    pub const MAX_STEPS: u32 = 1500;
    pub const ACTION_COUNT: usize = 5;
}

/// Normalize a heading in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Unit direction for a heading in degrees.
///
/// The heading is negated before the trigonometric conversion, so positive
/// headings turn counter-clockwise on a y-down raster.
#[inline]
pub fn heading_to_direction(heading_deg: f32) -> Vec2 {
    let rad = (-heading_deg).to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
        assert_eq!(normalize_degrees(180.0), -180.0);
        assert_eq!(normalize_degrees(-180.0), -180.0);
        assert_eq!(normalize_degrees(730.0), 10.0);
    }

    #[test]
    fn test_normalize_degrees_huge_and_tiny_inputs() {
        for angle in [1e20_f32, -1e20, 3.0e38, -1e-8, 1e-8] {
            let wrapped = normalize_degrees(angle);
            assert!((-180.0..180.0).contains(&wrapped), "{angle} -> {wrapped}");
        }
    }

    #[test]
    fn test_heading_direction_is_y_down() {
        let east = heading_to_direction(0.0);
        assert!((east.x - 1.0).abs() < 1e-6 && east.y.abs() < 1e-6);

        // Positive heading points "up" the screen (negative y)
        let up = heading_to_direction(90.0);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y + 1.0).abs() < 1e-6);
    }
}
