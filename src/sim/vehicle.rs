//! Vehicle pose and point-mass kinematics

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::VehicleSettings;
use crate::{heading_to_direction, normalize_degrees};

/// Position and heading (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub heading: f32,
}

impl Pose {
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Unit vector the vehicle is facing
    #[inline]
    pub fn direction(&self) -> Vec2 {
        heading_to_direction(self.heading)
    }
}

/// The simulated car
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub pose: Pose,
    /// Signed speed in pixels per tick, within [-max_speed/2, max_speed]
    pub speed: f32,
    /// Sticky until [`Vehicle::reset`]
    pub crashed: bool,
    /// Position before the most recent integration step
    pub prev_position: Option<Vec2>,
    params: VehicleSettings,
}

impl Vehicle {
    pub fn new(params: &VehicleSettings) -> Self {
        Self {
            pose: Pose::new(params.start, normalize_degrees(params.heading)),
            speed: 0.0,
            crashed: false,
            prev_position: None,
            params: params.clone(),
        }
    }

    #[inline]
    pub fn params(&self) -> &VehicleSettings {
        &self.params
    }

    /// Return every piece of owned state to the spawn configuration
    pub fn reset(&mut self) {
        self.pose = Pose::new(self.params.start, normalize_degrees(self.params.heading));
        self.speed = 0.0;
        self.crashed = false;
        self.prev_position = None;
    }

    /// Latch the crash flag and stop dead
    pub fn crash(&mut self) {
        self.crashed = true;
        self.speed = 0.0;
    }

    /// Throttle up by one acceleration step
    pub fn accelerate(&mut self) {
        self.speed = (self.speed + self.params.acceleration).min(self.params.max_speed);
    }

    /// Brake (and eventually reverse) by one acceleration step
    pub fn brake(&mut self) {
        self.speed = (self.speed - self.params.acceleration).max(self.min_speed());
    }

    /// Scale speed by `factor` (coasting / emergency slowdown)
    pub fn decay(&mut self, factor: f32) {
        self.speed = (self.speed * factor).clamp(self.min_speed(), self.params.max_speed);
    }

    /// Rotate heading by `delta` degrees
    pub fn steer(&mut self, delta: f32) {
        self.pose.heading = normalize_degrees(self.pose.heading + delta);
    }

    /// Current speed as a fraction of max speed
    #[inline]
    pub fn speed_ratio(&self) -> f32 {
        self.speed / self.params.max_speed
    }

    #[inline]
    pub fn min_speed(&self) -> f32 {
        -self.params.max_speed / 2.0
    }

    /// Move one tick along the heading. Crashed vehicles stay put.
    pub fn integrate(&mut self) {
        if self.crashed {
            self.speed = 0.0;
            return;
        }
        self.prev_position = Some(self.pose.position);
        self.pose.position += self.pose.direction() * self.speed;
    }
}
