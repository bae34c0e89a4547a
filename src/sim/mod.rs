//! Deterministic simulation module
//!
//! All driving logic lives here. This module must be pure and deterministic:
//! - One fixed-order tick at a time
//! - Integer pixel sampling with truncation toward zero
//! - No randomness
//! - No rendering or platform dependencies

pub mod checkpoint;
pub mod collision;
pub mod control;
pub mod env;
pub mod sensor;
pub mod state;
pub mod surface;
pub mod tick;
pub mod track;
pub mod vehicle;

pub use checkpoint::{CheckpointEvent, CheckpointProgress, Gate, Gates, LapTimer, segments_intersect};
pub use control::{Action, Control, ManualInput};
pub use env::{Env, Info, Observation, RacingEnv, StepResult};
pub use sensor::{SensorArray, SensorReadings};
pub use state::Simulation;
pub use surface::{Category, Palette, Rgb, TrackSurface};
pub use tick::{TickOutcome, tick};
pub use track::{Boundary, TrackLayout, draw_overlay};
pub use vehicle::{Pose, Vehicle};
