//! Simulation context
//!
//! Owns the track surface and every piece of per-episode state. Nothing in
//! the simulation is global; independent episodes each get their own
//! `Simulation` and may share one immutable surface through an `Arc`.

use std::sync::Arc;

use super::checkpoint::{CheckpointProgress, Gates, LapTimer};
use super::collision;
use super::sensor::{SensorArray, SensorReadings};
use super::surface::{Palette, TrackSurface};
use super::track::draw_overlay;
use super::vehicle::Vehicle;
use crate::error::ConfigError;
use crate::settings::{PolicySettings, Settings};

/// Complete state of one simulated vehicle on one track
#[derive(Debug, Clone)]
pub struct Simulation {
    surface: Arc<TrackSurface>,
    pub palette: Palette,
    pub sensors: SensorArray,
    pub gates: Gates,
    pub policy: PolicySettings,
    pub vehicle: Vehicle,
    pub progress: CheckpointProgress,
    pub lap_timer: LapTimer,
    /// Most recent sensor sweep
    pub readings: SensorReadings,
    /// Simulation tick counter (since last reset)
    pub time_ticks: u64,
}

impl Simulation {
    /// Validate settings and rasterize the track
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let surface = Arc::new(settings.track.rasterize(&settings.palette));
        Self::with_surface(settings, surface)
    }

    /// Build on an already rasterized (possibly shared) surface
    pub fn with_surface(settings: &Settings, surface: Arc<TrackSurface>) -> Result<Self, ConfigError> {
        settings.vehicle.validate()?;
        settings.policy.validate()?;
        let mut sim = Self {
            surface,
            palette: settings.palette.clone(),
            sensors: settings.sensors,
            gates: settings.gates.clone(),
            policy: settings.policy.clone(),
            vehicle: Vehicle::new(&settings.vehicle),
            progress: CheckpointProgress::default(),
            lap_timer: LapTimer::default(),
            readings: SensorReadings::default(),
            time_ticks: 0,
        };
        sim.sense();
        Ok(sim)
    }

    #[inline]
    pub fn surface(&self) -> &TrackSurface {
        &self.surface
    }

    /// Handle to the surface for sharing with other episodes
    pub fn shared_surface(&self) -> Arc<TrackSurface> {
        Arc::clone(&self.surface)
    }

    /// Recast the sensor fan from the current pose
    pub fn sense(&mut self) -> &SensorReadings {
        self.readings = self
            .sensors
            .cast(&self.vehicle.pose, &self.surface, &self.palette);
        &self.readings
    }

    /// Run the crash check at the vehicle's current position.
    ///
    /// Returns true on the tick the vehicle becomes crashed.
    pub fn check_collision(&mut self) -> bool {
        collision::apply(&mut self.vehicle, &self.surface, &self.palette)
    }

    /// Return to the configured spawn state
    pub fn reset(&mut self) {
        self.vehicle.reset();
        self.progress.reset();
        self.lap_timer.reset();
        self.time_ticks = 0;
        self.sense();
        log::debug!("Simulation reset");
    }

    /// Copy of the surface with rays, gates and the vehicle painted on
    pub fn render_frame(&self) -> TrackSurface {
        let mut frame = (*self.surface).clone();
        draw_overlay(&mut frame, &self.vehicle, &self.readings, &self.gates, &self.progress);
        frame
    }
}
