//! Control policies
//!
//! Every policy only adjusts speed and heading; moving the vehicle is left to
//! [`Vehicle::integrate`] so all variants share the same kinematics.

use serde::{Deserialize, Serialize};

use super::sensor::SensorReadings;
use super::vehicle::Vehicle;
use crate::consts::ACTION_COUNT;
use crate::error::ConfigError;
use crate::settings::PolicySettings;

/// Discrete command for the training interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Noop,
    Accelerate,
    Brake,
    TurnLeft,
    TurnRight,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Noop,
        Action::Accelerate,
        Action::Brake,
        Action::TurnLeft,
        Action::TurnRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Action {
    type Error = ConfigError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(ConfigError::InvalidAction {
                index,
                count: ACTION_COUNT,
            })
    }
}

impl From<Action> for ManualInput {
    fn from(action: Action) -> Self {
        let mut input = ManualInput::default();
        match action {
            Action::Noop => {}
            Action::Accelerate => input.accelerate = true,
            Action::Brake => input.brake = true,
            Action::TurnLeft => input.left = true,
            Action::TurnRight => input.right = true,
        }
        input
    }
}

/// Held keys for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualInput {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

/// Which policy steers the vehicle this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Control {
    /// Human-style held keys
    Manual(ManualInput),
    /// Sensor-driven heuristic
    RuleBased,
    /// Externally chosen discrete action
    External(Action),
}

impl Default for Control {
    fn default() -> Self {
        Control::Manual(ManualInput::default())
    }
}

/// Apply `control` to the vehicle. Crashed vehicles ignore all input.
pub fn apply(
    control: &Control,
    vehicle: &mut Vehicle,
    readings: &SensorReadings,
    policy: &PolicySettings,
) {
    if vehicle.crashed {
        return;
    }
    match control {
        Control::Manual(input) => apply_manual(input, vehicle),
        Control::External(action) => apply_manual(&ManualInput::from(*action), vehicle),
        Control::RuleBased => apply_rule_based(vehicle, readings, policy),
    }
}

/// Throttle with idle decay, speed-scaled steering
pub fn apply_manual(input: &ManualInput, vehicle: &mut Vehicle) {
    // Turn rate follows the speed going into the tick
    let turn = vehicle.params().turn_speed * vehicle.speed_ratio();

    if input.accelerate {
        vehicle.accelerate();
    } else if input.brake {
        vehicle.brake();
    } else {
        vehicle.decay(vehicle.params().idle_decay);
    }

    if input.left {
        vehicle.steer(turn);
    }
    if input.right {
        vehicle.steer(-turn);
    }
}

/// Steer toward the side with more clearance, ease off when the road ahead is short.
///
/// Readings are ordered by increasing ray angle; positive steering turns toward
/// the high-index side. With nine rays the groups are `L2 L1 FL FFL | F | FFR FR R1 R2`.
pub fn apply_rule_based(vehicle: &mut Vehicle, readings: &SensorReadings, policy: &PolicySettings) {
    let d = readings.distances();
    if d.len() < 3 {
        return;
    }
    let c = d.len() / 2;
    let forward = d[c];

    if forward > policy.forward_threshold {
        vehicle.accelerate();
    } else {
        vehicle.decay(policy.brake_factor);
    }

    let sum = |s: &[u32]| s.iter().map(|&v| v as f32).sum::<f32>();
    let left_total = sum(&d[..c]);
    let right_total = sum(&d[c + 1..]);
    let turn_speed = vehicle.params().turn_speed;
    vehicle.steer(turn_speed * (right_total - left_total) / policy.steer_divisor);

    if forward < policy.panic_threshold {
        let left_n = c.min(2);
        let right_n = (d.len() - c - 1).min(2);
        let left_near = sum(&d[c - left_n..c]);
        let right_near = sum(&d[c + 1..=c + right_n]);
        if left_near < right_near {
            vehicle.steer(turn_speed);
        } else {
            vehicle.steer(-turn_speed);
        }
    }
}
