//! Ray-fan distance sensors
//!
//! Rays are marched in whole-pixel steps from the vehicle position. Sampling
//! always truncates toward zero so a given pose on a given surface reads
//! back exactly the same distances every time.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::surface::{Palette, TrackSurface, truncate};
use super::vehicle::Pose;
use crate::consts::{FIELD_OF_VIEW, MAX_RANGE, RAY_COUNT};
use crate::error::ConfigError;
use crate::heading_to_direction;

/// Validated sensor fan geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SensorSpec", into = "SensorSpec")]
pub struct SensorArray {
    field_of_view: f32,
    ray_count: usize,
    max_range: u32,
}

/// Unvalidated wire form of [`SensorArray`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SensorSpec {
    field_of_view: f32,
    ray_count: usize,
    max_range: u32,
}

impl TryFrom<SensorSpec> for SensorArray {
    type Error = ConfigError;

    fn try_from(raw: SensorSpec) -> Result<Self, Self::Error> {
        SensorArray::new(raw.field_of_view, raw.ray_count, raw.max_range)
    }
}

impl From<SensorArray> for SensorSpec {
    fn from(array: SensorArray) -> Self {
        Self {
            field_of_view: array.field_of_view,
            ray_count: array.ray_count,
            max_range: array.max_range,
        }
    }
}

impl Default for SensorArray {
    fn default() -> Self {
        Self {
            field_of_view: FIELD_OF_VIEW,
            ray_count: RAY_COUNT,
            max_range: MAX_RANGE,
        }
    }
}

impl SensorArray {
    /// Build a fan of `ray_count` rays spread over `field_of_view` degrees
    pub fn new(field_of_view: f32, ray_count: usize, max_range: u32) -> Result<Self, ConfigError> {
        if ray_count < 2 {
            return Err(ConfigError::TooFewRays(ray_count));
        }
        if max_range == 0 {
            return Err(ConfigError::InvalidRange);
        }
        if !field_of_view.is_finite() || field_of_view <= 0.0 {
            return Err(ConfigError::InvalidFieldOfView(field_of_view));
        }
        Ok(Self {
            field_of_view,
            ray_count,
            max_range,
        })
    }

    #[inline]
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    #[inline]
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    #[inline]
    pub fn max_range(&self) -> u32 {
        self.max_range
    }

    /// Heading of ray `i`, ordered from lowest to highest angle
    pub fn ray_angle(&self, heading: f32, i: usize) -> f32 {
        let step = self.field_of_view / (self.ray_count - 1) as f32;
        heading - self.field_of_view / 2.0 + i as f32 * step
    }

    /// Cast every ray from `pose` against `surface`
    pub fn cast(&self, pose: &Pose, surface: &TrackSurface, palette: &Palette) -> SensorReadings {
        let mut readings = SensorReadings::with_capacity(self.ray_count, self.max_range);
        for i in 0..self.ray_count {
            let angle = self.ray_angle(pose.heading, i);
            let (distance, end) = cast_ray(pose.position, angle, self.max_range, surface, palette);
            readings.distances.push(distance);
            readings.endpoints.push(end);
        }
        readings
    }
}

/// March one ray. Returns the step count at termination and the last sampled pixel.
pub fn cast_ray(
    origin: Vec2,
    angle: f32,
    max_range: u32,
    surface: &TrackSurface,
    palette: &Palette,
) -> (u32, IVec2) {
    let dir = heading_to_direction(angle);
    let mut end = IVec2::new(origin.x as i32, origin.y as i32);

    for length in 0..max_range {
        let (x, y) = truncate(origin + dir * length as f32);
        end = IVec2::new(x as i32, y as i32);
        match surface.get(x, y) {
            Some(color) if palette.classify(color).is_ray_clear() => {}
            // Off the raster or hit something opaque
            _ => return (length, end),
        }
    }

    (max_range, end)
}

/// One tick's worth of sensor output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReadings {
    distances: Vec<u32>,
    endpoints: Vec<IVec2>,
    max_range: u32,
}

impl SensorReadings {
    fn with_capacity(n: usize, max_range: u32) -> Self {
        Self {
            distances: Vec::with_capacity(n),
            endpoints: Vec::with_capacity(n),
            max_range,
        }
    }

    /// Readings without ray geometry (endpoints at the origin)
    pub fn from_distances(distances: Vec<u32>, max_range: u32) -> Self {
        let endpoints = vec![IVec2::ZERO; distances.len()];
        Self {
            distances,
            endpoints,
            max_range,
        }
    }

    /// Raw step counts, ordered by ray index
    #[inline]
    pub fn distances(&self) -> &[u32] {
        &self.distances
    }

    /// Pixel where each ray stopped
    #[inline]
    pub fn endpoints(&self) -> &[IVec2] {
        &self.endpoints
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Forward ray (the middle one)
    pub fn center(&self) -> Option<u32> {
        self.distances.get(self.distances.len() / 2).copied()
    }

    /// Distances scaled into [0, 1] by the sensor range
    pub fn normalized(&self) -> impl Iterator<Item = f32> + '_ {
        let range = self.max_range.max(1) as f32;
        self.distances.iter().map(move |&d| (d as f32 / range).min(1.0))
    }
}
