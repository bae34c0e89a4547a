//! Training environment
//!
//! Wraps a [`Simulation`] in the reset/step interface a learning agent
//! drives. Observation, reward, termination and info are the whole contract;
//! the agent itself lives elsewhere.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::checkpoint::CheckpointEvent;
use super::control::{Action, Control};
use super::state::Simulation;
use super::surface::TrackSurface;
use super::tick::tick;
use crate::consts::ACTION_COUNT;
use crate::error::ConfigError;
use crate::settings::{EpisodeSettings, RewardSettings, Settings};

/// Observation vector: normalized ray distances followed by normalized speed
pub type Observation = Vec<f32>;

/// Reinforcement learning environment interface.
///
/// Each call to [`step`] advances the simulation by one discrete action.
///
/// [`step`]: Env::step
pub trait Env {
    /// Reset to the starting state and return the first observation
    fn reset(&mut self) -> (Observation, Info);

    /// Advance by one action index
    fn step(&mut self, action: usize) -> Result<StepResult, ConfigError>;

    /// Length of the observation vector
    fn obs_size(&self) -> usize;

    /// Number of discrete actions
    fn action_size(&self) -> usize;
}

/// Diagnostics reported alongside every step (not part of the control contract)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub gate_index: usize,
    pub laps: u32,
    pub steps: u32,
    pub speed: f32,
    pub crashed: bool,
    pub last_lap_ticks: Option<u64>,
    pub best_lap_ticks: Option<u64>,
}

/// Result of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

impl StepResult {
    #[inline]
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Racing environment over one simulation
#[derive(Debug, Clone)]
pub struct RacingEnv {
    sim: Simulation,
    reward: RewardSettings,
    episode: EpisodeSettings,
    steps: u32,
    /// Terminal step, replayed if the agent keeps stepping
    finished: Option<StepResult>,
}

impl RacingEnv {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::from_simulation(Simulation::new(settings)?, settings))
    }

    /// Build on a surface shared with other environments
    pub fn with_surface(settings: &Settings, surface: Arc<TrackSurface>) -> Result<Self, ConfigError> {
        Ok(Self::from_simulation(
            Simulation::with_surface(settings, surface)?,
            settings,
        ))
    }

    fn from_simulation(sim: Simulation, settings: &Settings) -> Self {
        Self {
            sim,
            reward: settings.reward.clone(),
            episode: settings.episode.clone(),
            steps: 0,
            finished: None,
        }
    }

    #[inline]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Current observation (recasts sensors from the current pose)
    pub fn observe(&mut self) -> Observation {
        let speed = self.sim.vehicle.speed_ratio();
        let readings = self.sim.sense();
        readings.normalized().chain(std::iter::once(speed)).collect()
    }

    pub fn info(&self) -> Info {
        Info {
            gate_index: self.sim.progress.gate_index,
            laps: self.sim.progress.laps,
            steps: self.steps,
            speed: self.sim.vehicle.speed,
            crashed: self.sim.vehicle.crashed,
            last_lap_ticks: self.sim.lap_timer.last_lap_ticks,
            best_lap_ticks: self.sim.lap_timer.best_lap_ticks,
        }
    }

    /// Advance one tick under `action`
    pub fn step_action(&mut self, action: Action) -> StepResult {
        if let Some(last) = &self.finished {
            return last.clone();
        }

        self.steps += 1;
        let outcome = tick(&mut self.sim, &Control::External(action));

        let mut reward = self.reward.time_penalty + self.reward.speed_coef * self.sim.vehicle.speed;
        if outcome.checkpoint.advanced() {
            reward += self.reward.checkpoint;
        }
        if let CheckpointEvent::Lap { .. } = outcome.checkpoint {
            reward += self.reward.lap;
        }

        let crashed = self.sim.vehicle.crashed;
        if crashed {
            reward = self.reward.crash;
        }

        let finished_laps =
            self.episode.laps_to_finish > 0 && self.sim.progress.laps >= self.episode.laps_to_finish;
        let terminated = crashed || finished_laps;
        let truncated = self.steps >= self.episode.max_steps;

        let result = StepResult {
            observation: self.observe(),
            reward,
            terminated,
            truncated,
            info: self.info(),
        };
        if result.done() {
            log::debug!(
                "Episode finished after {} steps (crashed: {crashed}, laps: {})",
                self.steps,
                self.sim.progress.laps
            );
            self.finished = Some(result.clone());
        }
        result
    }
}

impl Env for RacingEnv {
    fn reset(&mut self) -> (Observation, Info) {
        self.sim.reset();
        self.steps = 0;
        self.finished = None;
        (self.observe(), self.info())
    }

    fn step(&mut self, action: usize) -> Result<StepResult, ConfigError> {
        Ok(self.step_action(Action::try_from(action)?))
    }

    fn obs_size(&self) -> usize {
        self.sim.sensors.ray_count() + 1
    }

    fn action_size(&self) -> usize {
        ACTION_COUNT
    }
}
