#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the survivor simulation headlessly.

mod config;
mod map;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;

use crate::{
    config::RunConfig,
    map::TileMap,
    session::{Outcome, Session},
};

/// Runs the survivor simulation with an autopiloted hero.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with run settings; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seed of the spawn placement RNG.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of frames to simulate.
    #[arg(long)]
    frames: Option<u32>,
    /// Seconds per frame.
    #[arg(long)]
    dt: Option<f32>,
    /// Starting level.
    #[arg(long)]
    level: Option<u32>,
    /// Wrap the map around instead of bounding it.
    #[arg(long)]
    infinite: bool,
    /// Tile map file.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Save file path.
    #[arg(long)]
    save_path: Option<PathBuf>,
    /// Save every this many frames.
    #[arg(long)]
    save_every: Option<u32>,
    /// Continue from the save file instead of starting fresh.
    #[arg(long)]
    resume: bool,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_path(path)?,
            None => RunConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if self.infinite {
            config.infinite = true;
        }
        if let Some(map) = &self.map {
            config.map = Some(map.clone());
        }
        if let Some(save_path) = &self.save_path {
            config.save_path = save_path.clone();
        }
        if self.save_every.is_some() {
            config.save_every = self.save_every;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

/// Entry point for the survivor command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.resolve()?;
    let map = match &config.map {
        Some(path) => TileMap::load(path)?,
        None => TileMap::open_field(),
    };
    log::info!(
        "{} map with {} water tiles",
        if config.infinite { "infinite" } else { "finite" },
        map.water_count()
    );

    let mut session = Session::new(&config, map);
    if args.resume {
        session.resume(&config.save_path)?;
    }

    let summary = session.run(config.frames)?;
    match summary.outcome {
        Outcome::Survived => println!("survived {} frames", summary.frames),
        Outcome::Defeated => println!("game over after {} frames", summary.frames),
    }
    println!(
        "level {} | score {} | health {} | enemies alive {}",
        summary.level, summary.score, summary.health, summary.enemies
    );
    Ok(())
}
