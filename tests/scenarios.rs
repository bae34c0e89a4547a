use std::sync::Arc;

use glam::Vec2;
use track_racer::Settings;
use track_racer::sim::{
    Action, CheckpointEvent, CheckpointProgress, Control, Env, Gates, Pose, RacingEnv, Rgb,
    Simulation, TrackSurface, tick,
};

/// Open asphalt with grass from column `wall_x` to the right edge
fn walled_surface(wall_x: i64) -> TrackSurface {
    let mut surface = TrackSurface::new(400, 400, Rgb::GRAY);
    for y in 0..400 {
        for x in wall_x..400 {
            surface.set(x, y, Rgb::GREEN);
        }
    }
    surface
}

fn settings_at(start: Vec2, heading: f32) -> Settings {
    let mut settings = Settings::default();
    settings.vehicle.start = start;
    settings.vehicle.heading = heading;
    settings
}

#[test]
fn wall_fifty_ahead_reads_fifty_without_panic() {
    let settings = settings_at(Vec2::new(200.0, 200.0), 0.0);
    let mut sim = Simulation::with_surface(&settings, Arc::new(walled_surface(250))).unwrap();

    let center = sim.readings.center().unwrap();
    assert!((49..=51).contains(&center), "center = {center}");
    assert!(center >= settings.policy.panic_threshold);

    tick(&mut sim, &Control::RuleBased);
    assert!(!sim.vehicle.crashed);
    // Symmetric clearance and no panic swerve: heading unchanged
    assert_eq!(sim.vehicle.pose.heading, 0.0);
}

#[test]
fn non_drivable_spawn_crashes_and_freezes_until_reset() {
    let settings = settings_at(Vec2::new(300.0, 200.0), 0.0);
    let mut sim = Simulation::with_surface(&settings, Arc::new(walled_surface(250))).unwrap();

    let outcome = tick(&mut sim, &Control::External(Action::Accelerate));
    assert!(outcome.crashed_now);
    let frozen = sim.vehicle.pose;
    for _ in 0..25 {
        tick(&mut sim, &Control::External(Action::Accelerate));
        assert!(sim.vehicle.crashed);
        assert_eq!(sim.vehicle.pose, frozen);
    }

    sim.reset();
    assert!(!sim.vehicle.crashed);
    assert_eq!(sim.vehicle.pose, Pose::new(Vec2::new(300.0, 200.0), 0.0));
    assert_eq!(sim.vehicle.speed, 0.0);
    assert_eq!(sim.progress, CheckpointProgress::default());
}

#[test]
fn crossing_every_gate_completes_one_lap() {
    let gates = Gates::training();
    let mut progress = CheckpointProgress::default();
    let mut events = Vec::new();
    for gate in gates.iter() {
        let mid = (gate.start + gate.end) / 2.0;
        let across = (gate.end - gate.start).perp().normalize();
        events.push(progress.advance(Some(mid - across), mid + across, &gates, false));
    }
    assert_eq!(events[0], CheckpointEvent::Gate { index: 1 });
    assert_eq!(events.last(), Some(&CheckpointEvent::Lap { laps: 1 }));
    assert_eq!(progress, CheckpointProgress { gate_index: 0, laps: 1 });
}

#[test]
fn crash_in_training_env_is_penalized_and_terminal() {
    let settings = settings_at(Vec2::new(246.0, 200.0), 0.0);
    let mut env = RacingEnv::with_surface(&settings, Arc::new(walled_surface(250))).unwrap();
    env.reset();

    let mut crash = None;
    for _ in 0..50 {
        let result = env.step(Action::Accelerate.index()).unwrap();
        if result.done() {
            crash = Some(result);
            break;
        }
    }
    let crash = crash.unwrap();
    assert_eq!(crash.reward, -10.0);
    assert!(crash.terminated);
    assert!(crash.info.crashed);
    assert_eq!(crash.observation.len(), env.obs_size());
}

#[test]
fn settings_file_drives_the_simulation() {
    let json = r#"{
        "vehicle": { "start": [430.0, 175.0], "heading": 0.0 },
        "sensors": { "field_of_view": 90.0, "ray_count": 5, "max_range": 100 }
    }"#;
    let settings = Settings::from_json_str(json).unwrap();
    let mut env = RacingEnv::new(&settings).unwrap();
    let (obs, info) = env.reset();
    assert_eq!(obs.len(), 6);
    assert_eq!(info.gate_index, 0);
    assert_eq!(env.simulation().vehicle.pose.position, Vec2::new(430.0, 175.0));
}
