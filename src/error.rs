//! Error types
//!
//! Only setup-time problems surface as errors. Anything that goes wrong while
//! driving (leaving the track, rays running off the raster) is folded into
//! the vehicle's crash state instead.

use thiserror::Error;

/// Invalid simulation configuration, rejected before the first tick
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sensor array needs at least 2 rays, got {0}")]
    TooFewRays(usize),
    #[error("sensor range must be positive")]
    InvalidRange,
    #[error("sensor field of view must be a positive finite angle, got {0}")]
    InvalidFieldOfView(f32),
    #[error("gate sequence is empty")]
    EmptyGates,
    #[error("gate {0} has zero length")]
    DegenerateGate(usize),
    #[error("action index {index} out of range (0..{count})")]
    InvalidAction { index: usize, count: usize },
    #[error("track boundary `{0}` needs at least 3 vertices or positive radii")]
    EmptyBoundary(&'static str),
    #[error("raster size {width}x{height} does not match {len} pixels")]
    InvalidRaster { width: u32, height: u32, len: usize },
    #[error("invalid vehicle setting: {0}")]
    InvalidVehicle(&'static str),
    #[error("invalid driver setting: {0}")]
    InvalidPolicy(&'static str),
}

/// Failure loading or saving a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
