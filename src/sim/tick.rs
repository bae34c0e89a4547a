//! Fixed-order simulation tick
//!
//! One tick runs sense → control → integrate → collide → checkpoint and
//! completes before the next starts. Pacing and drawing belong to whatever
//! loop drives the tick.

use super::checkpoint::CheckpointEvent;
use super::control::{self, Control};
use super::state::Simulation;

/// What changed during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub checkpoint: CheckpointEvent,
    /// The vehicle crashed on this tick
    pub crashed_now: bool,
    /// Duration of the lap completed on this tick
    pub lap_ticks: Option<u64>,
}

impl TickOutcome {
    const IDLE: TickOutcome = TickOutcome {
        checkpoint: CheckpointEvent::None,
        crashed_now: false,
        lap_ticks: None,
    };
}

/// Advance the simulation by one tick. A crashed simulation does nothing until reset.
pub fn tick(sim: &mut Simulation, control: &Control) -> TickOutcome {
    if sim.vehicle.crashed {
        sim.vehicle.speed = 0.0;
        return TickOutcome::IDLE;
    }

    sim.time_ticks += 1;
    sim.lap_timer.tick();

    sim.sense();
    control::apply(control, &mut sim.vehicle, &sim.readings, &sim.policy);
    sim.vehicle.integrate();

    let crashed_now = sim.check_collision();
    if crashed_now {
        log::info!(
            "Crashed at ({:.1}, {:.1}) after {} ticks",
            sim.vehicle.pose.position.x,
            sim.vehicle.pose.position.y,
            sim.time_ticks
        );
    }

    let checkpoint = sim.progress.advance(
        sim.vehicle.prev_position,
        sim.vehicle.pose.position,
        &sim.gates,
        sim.vehicle.crashed,
    );

    let mut lap_ticks = None;
    match checkpoint {
        CheckpointEvent::Gate { index } => {
            log::debug!("Checkpoint passed, next gate {index}");
        }
        CheckpointEvent::Lap { laps } => {
            let ticks = sim.lap_timer.finish_lap();
            lap_ticks = Some(ticks);
            log::info!("Lap {laps} completed in {ticks} ticks");
        }
        CheckpointEvent::None => {}
    }

    TickOutcome {
        checkpoint,
        crashed_now,
        lap_ticks,
    }
}
