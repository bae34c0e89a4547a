//! Track Racer entry point
//!
//! Headless driver for the simulation: runs the rule-based car, or a seeded
//! random agent through the training environment. Frame pacing and a window
//! are left to whoever embeds the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use track_racer::sim::{Control, Env, RacingEnv, Simulation, tick};
use track_racer::{LapBoard, SensorPreset, Settings, snapshot};

#[derive(Parser, Debug)]
#[command(name = "track-racer", about = "Raster-track driving simulator")]
struct Cli {
    /// JSON settings file (defaults are used for anything it leaves out)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Sensor preset (narrow / wide)
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the rule-based car, resetting after every crash
    Drive {
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 5000)]
        ticks: u64,
        /// Write the final frame as PNG
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Lap board file to update
        #[arg(long)]
        laps: Option<PathBuf>,
    },
    /// Run a uniformly random agent through the training environment
    Random {
        #[arg(long, default_value_t = 10)]
        episodes: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Write the effective settings as JSON
    DumpSettings {
        out: PathBuf,
    },
}

fn load_settings(cli: &Cli, fallback: Settings) -> Settings {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load_or(path, fallback),
        None => fallback,
    };
    if let Some(name) = &cli.preset {
        match SensorPreset::from_str(name) {
            Some(preset) => settings.apply_preset(preset),
            None => log::warn!("Unknown sensor preset '{name}', keeping {} rays", settings.sensors.ray_count()),
        }
    }
    settings
}

fn drive(settings: &Settings, ticks: u64, snapshot_path: Option<PathBuf>, laps_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = Simulation::new(settings)?;
    let mut board = laps_path.as_ref().map(|p| LapBoard::load(p)).unwrap_or_default();
    let mut attempt = 0u32;

    for _ in 0..ticks {
        let outcome = tick(&mut sim, &Control::RuleBased);
        if let Some(lap) = outcome.lap_ticks {
            if let Some(rank) = board.add_lap(lap, attempt) {
                log::info!("Lap of {lap} ticks ranked #{rank}");
            }
        }
        if outcome.crashed_now {
            attempt += 1;
            sim.reset();
        }
    }

    println!(
        "drive: {} crashes, gate {}, laps {}, best lap {:?}",
        attempt,
        sim.progress.gate_index,
        sim.progress.laps,
        board.best()
    );

    if let Some(path) = snapshot_path {
        sim.sense();
        snapshot::save_png(&sim.render_frame(), path)?;
    }
    if let Some(path) = laps_path {
        board.save(path)?;
    }
    Ok(())
}

fn random(settings: &Settings, episodes: u32, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut env = RacingEnv::new(settings)?;
    let mut rng = Pcg32::seed_from_u64(seed);

    for ep in 0..episodes {
        env.reset();
        let mut total_reward = 0.0;
        loop {
            let action = rng.random_range(0..env.action_size());
            let result = env.step(action)?;
            total_reward += result.reward;
            if result.done() {
                println!(
                    "[EP {}] steps {}, reward {:.2}, gate {}, laps {}, crashed {}",
                    ep + 1,
                    result.info.steps,
                    total_reward,
                    result.info.gate_index,
                    result.info.laps,
                    result.info.crashed
                );
                break;
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Track Racer (native) starting...");

    match &cli.command {
        Command::Drive { ticks, snapshot, laps } => {
            let settings = load_settings(&cli, Settings::demo());
            drive(&settings, *ticks, snapshot.clone(), laps.clone())
        }
        Command::Random { episodes, seed } => {
            let settings = load_settings(&cli, Settings::default());
            random(&settings, *episodes, *seed)
        }
        Command::DumpSettings { out } => {
            let settings = load_settings(&cli, Settings::default());
            settings.save(out)?;
            Ok(())
        }
    }
}
