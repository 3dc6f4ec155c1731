#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that places new enemies just outside the camera's view.
//!
//! Every species runs its own timer against a threshold. Whenever the timer
//! passes the threshold the timer restarts and, if the species population
//! has room, an enemy is placed beyond a random edge of the visible
//! rectangle and the threshold shrinks toward its floor. The shrinking
//! threshold is the difficulty ramp.

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use survivor_core::{
    CameraView, Command, PopulationCounts, Species, SpawnTuning, Vec2, WorldMode,
    SPECIES_CAPACITY, SPRITE_SIZE, VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    capacity: usize,
}

impl Config {
    /// Creates a configuration using the provided seed and the default capacity.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            capacity: SPECIES_CAPACITY,
        }
    }

    /// Overrides the per-species population limit.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// A spawn decided by the system, ready to be turned into a command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPlan {
    /// Species to instantiate.
    pub species: Species,
    /// Top-left corner of the new enemy.
    pub position: Vec2,
}

/// Timer and escalating threshold of a single species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnSchedule {
    timer: f32,
    threshold: f32,
    tuning: SpawnTuning,
}

impl SpawnSchedule {
    /// Creates a schedule at its initial threshold.
    #[must_use]
    pub const fn new(tuning: SpawnTuning) -> Self {
        Self {
            timer: 0.0,
            threshold: tuning.initial_threshold,
            tuning,
        }
    }

    /// Seconds accumulated since the last spawn attempt.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.timer
    }

    /// Seconds that must accumulate before the next spawn attempt.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    fn advance(&mut self, dt: f32) -> bool {
        self.timer += dt;
        if self.timer > self.threshold {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }

    fn escalate(&mut self) {
        self.threshold = (self.threshold - self.tuning.step).max(self.tuning.floor);
    }
}

#[derive(Clone, Copy, Debug)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];
}

/// Spawning system that owns the per-species schedules and a seeded RNG.
#[derive(Debug)]
pub struct Spawning {
    schedules: [SpawnSchedule; 4],
    capacity: usize,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            schedules: Species::ALL.map(|species| SpawnSchedule::new(species.spawn_tuning())),
            capacity: config.capacity,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Current schedule of the provided species.
    #[must_use]
    pub const fn schedule(&self, species: Species) -> &SpawnSchedule {
        &self.schedules[species.index()]
    }

    /// Advances every species' timer and emits `Command::SpawnEnemy` for each due spawn.
    pub fn handle(
        &mut self,
        dt: f32,
        camera: CameraView,
        counts: PopulationCounts,
        mode: WorldMode,
        out: &mut Vec<Command>,
    ) {
        for species in Species::ALL {
            if let Some(plan) = self.try_spawn(species, camera, dt, counts.get(species), mode) {
                out.push(Command::SpawnEnemy {
                    species: plan.species,
                    position: plan.position,
                });
            }
        }
    }

    /// Advances one species' timer and decides whether it spawns this tick.
    ///
    /// A full population restarts the timer without spawning or escalating.
    pub fn try_spawn(
        &mut self,
        species: Species,
        camera: CameraView,
        dt: f32,
        live: usize,
        mode: WorldMode,
    ) -> Option<SpawnPlan> {
        let schedule = &mut self.schedules[species.index()];
        if !schedule.advance(dt) || live >= self.capacity {
            return None;
        }
        schedule.escalate();

        let position = self.spawn_point(species, camera, mode);
        Some(SpawnPlan { species, position })
    }

    fn spawn_point(&mut self, species: Species, camera: CameraView, mode: WorldMode) -> Vec2 {
        let margin = species.spawn_tuning().margin;
        let origin = camera.origin();
        let edge = Edge::ALL[self.rng.gen_range(0..Edge::ALL.len())];

        let mut point = match edge {
            Edge::Top => Vec2::new(origin.x + self.along(VIEWPORT_WIDTH), origin.y - margin),
            Edge::Bottom => Vec2::new(
                origin.x + self.along(VIEWPORT_WIDTH),
                origin.y + VIEWPORT_HEIGHT + margin,
            ),
            Edge::Left => Vec2::new(origin.x - margin, origin.y + self.along(VIEWPORT_HEIGHT)),
            Edge::Right => Vec2::new(
                origin.x + VIEWPORT_WIDTH + margin,
                origin.y + self.along(VIEWPORT_HEIGHT),
            ),
        };

        if !mode.is_infinite() {
            point.x = point.x.clamp(0.0, WORLD_WIDTH - SPRITE_SIZE);
            point.y = point.y.clamp(0.0, WORLD_HEIGHT - SPRITE_SIZE);
        }
        point
    }

    fn along(&mut self, span: f32) -> f32 {
        self.rng.gen_range(0..span as u32) as f32
    }
}
