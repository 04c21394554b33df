//! Headless Boids Simulation
//!
//! Spawns a flock, runs a fixed number of ticks through the flocking core
//! and logs flock statistics along the way.
//!
//! Usage: `boids [config.toml | config.ron]`

mod config;
mod flock;
mod stats;

use std::process::ExitCode;
use std::time::Instant;

use boid_engine::config::Config;
use boid_engine::flocking::{FlockSystem, KinematicsSink, PositionSource};
use boid_engine::foundation::logging;
use boid_engine::physics::ObstacleField;
use boid_engine::BoidResult;

use crate::config::SimulationConfig;
use crate::flock::Flock;
use crate::stats::FlockStats;

fn load_config(path: Option<&str>) -> BoidResult<SimulationConfig> {
    let config = match path {
        Some(path) => SimulationConfig::load_from_file(path)?,
        None => SimulationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn run(config: SimulationConfig) -> BoidResult<FlockStats> {
    let system = FlockSystem::new(config.flock.clone())?;
    let obstacles = ObstacleField::from_spheres(config.obstacles.clone());
    let mut flock = Flock::spawn(
        config.spawn_count,
        config.seed,
        config.world,
        config.kinematics,
        config.flock.max_speed,
    );

    log::info!(
        "Simulating {} boids for {} ticks around {} obstacles",
        flock.len(),
        config.ticks,
        obstacles.len()
    );
    if flock.is_empty() {
        log::warn!("spawn_count is 0; ticks will do nothing");
    }

    let started = Instant::now();
    let mut stats = FlockStats::default();
    for tick in 1..=config.ticks {
        let snapshot = flock.snapshot();
        let report = system.tick(&snapshot, &obstacles);
        for (index, acceleration) in report.accelerations().enumerate() {
            flock.apply_acceleration(index, acceleration);
        }
        flock.advance();

        stats = FlockStats::measure(flock.boids(), &report);
        if config.log_every > 0 && tick % config.log_every == 0 {
            log::info!("tick {tick}: {stats}");
        }
    }

    let elapsed = started.elapsed();
    log::info!(
        "Finished {} ticks in {:.2?} ({:.3} ms/tick)",
        config.ticks,
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / f64::from(config.ticks.max(1))
    );

    Ok(stats)
}

fn main() -> ExitCode {
    let path = std::env::args().nth(1);

    let config = match load_config(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init();
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_with_level(&config.log_level);

    match run(config) {
        Ok(stats) => {
            log::info!("Final flock: {stats}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
