#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population manager that drives the survivor simulation one frame at a time.
//!
//! [`Simulation`] owns the world and the pure systems. Each frame it collects
//! the systems' commands, applies them to the world in emission order and
//! keeps the resulting events for the caller to inspect.

mod save;

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use survivor_core::{
    CameraView, Canvas, Command, EnemySnapshot, EnemySprite, EnemyView, Event, HeroFacade,
    PopulationCounts, ProjectileRequest, ProjectileSlot, ProjectileSprite, Species, Vec2,
    WorldMode, PROJECTILE_CAPACITY,
};
use survivor_system_combat::Combat;
use survivor_system_spawning::{Config as SpawningConfig, Spawning};
use survivor_system_targeting::Targeting;
use survivor_world::{self as world, query, World};

pub use save::SaveError;
use save::SavedGame;

/// Extra world units around the viewport inside which entities are drawn.
pub const DRAW_MARGIN: f32 = 64.0;

/// Parameters required to construct a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the spawn placement RNG.
    pub seed: u64,
    /// Number of projectile slots, which is also the number of slot lines
    /// in a save file.
    pub projectile_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            projectile_capacity: PROJECTILE_CAPACITY,
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration with the provided seed and default capacities.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            projectile_capacity: PROJECTILE_CAPACITY,
        }
    }

    /// Overrides the projectile pool size.
    #[must_use]
    pub const fn with_projectile_capacity(mut self, capacity: usize) -> Self {
        self.projectile_capacity = capacity;
        self
    }
}

/// Enemy and projectile manager.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    spawning: Spawning,
    combat: Combat,
    targeting: Targeting,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates an empty simulation.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            world: World::with_projectile_capacity(config.projectile_capacity),
            spawning: Spawning::new(SpawningConfig::new(config.seed)),
            combat: Combat::new(),
            targeting: Targeting::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Configuration the simulation was built with.
    #[must_use]
    pub const fn config(&self) -> SimulationConfig {
        self.config
    }

    /// Read-only access to the world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Events produced since the start of the last [`Simulation::update`],
    /// including any on-demand operations issued after it.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Live enemy counts per species.
    #[must_use]
    pub fn population_counts(&self) -> PopulationCounts {
        query::population_counts(&self.world)
    }

    /// Snapshot of every live enemy in species order, then slot order.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Spawning runs first, then enemy behavior with ranged launches,
    /// projectile movement, removal of fallen enemies and finally combat.
    pub fn update<H: HeroFacade>(
        &mut self,
        dt: f32,
        camera: CameraView,
        hero: &mut H,
        mode: WorldMode,
    ) {
        self.events.clear();

        self.spawning.handle(
            dt,
            camera,
            query::population_counts(&self.world),
            mode,
            &mut self.commands,
        );
        self.commands.push(Command::Tick { dt, mode });
        self.flush(hero);

        let enemies = query::enemy_view(&self.world);
        let projectiles = query::projectile_view(&self.world);
        self.combat
            .handle(hero.position(), &enemies, &projectiles, &mut self.commands);
        self.flush(hero);
    }

    /// Launches a projectile; a full pool drops it silently.
    pub fn spawn_projectile(&mut self, request: ProjectileRequest) -> Option<ProjectileSlot> {
        world::launch(&mut self.world, request, &mut self.events)
    }

    /// Nearest live enemy strictly within `max_range` of `origin`.
    #[must_use]
    pub fn closest_enemy(&self, origin: Vec2, max_range: f32) -> Option<EnemySnapshot> {
        Targeting::closest(&query::enemy_view(&self.world), origin, max_range)
    }

    /// Damages up to five of the healthiest enemies around the hero.
    pub fn apply_top_health_damage<H: HeroFacade>(&mut self, damage: u32, hero: &mut H) {
        let enemies = query::enemy_view(&self.world);
        self.targeting
            .top_health_targets(&enemies, hero.position(), damage, &mut self.commands);
        self.flush(hero);
    }

    /// Hands every enemy and projectile near the view to `canvas`.
    pub fn draw<C: Canvas>(&self, camera: CameraView, canvas: &mut C) {
        for enemy in query::enemy_view(&self.world).iter() {
            if camera.contains(enemy.position, DRAW_MARGIN) {
                canvas.enemy(EnemySprite {
                    species: enemy.species(),
                    screen_position: camera.to_screen(enemy.position),
                    frame: enemy.frame,
                });
            }
        }

        for projectile in query::projectile_view(&self.world).iter() {
            if camera.contains(projectile.position, DRAW_MARGIN) {
                canvas.projectile(ProjectileSprite {
                    screen_position: camera.to_screen(projectile.position),
                    origin: projectile.origin,
                });
            }
        }
    }

    /// Discards every enemy and projectile and restarts the spawn schedules.
    pub fn reset(&mut self) {
        self.world.clear();
        self.spawning = Spawning::new(SpawningConfig::new(self.config.seed));
        self.commands.clear();
        self.events.clear();
    }

    /// Writes the hero, the world mode and the world to `path`.
    pub fn save_game<H: HeroFacade>(
        &self,
        path: impl AsRef<Path>,
        hero: &H,
        mode: WorldMode,
    ) -> Result<(), SaveError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer, hero, mode)?;
        log::info!(
            "saved {} enemies to {}",
            self.population_counts().total(),
            path.display()
        );
        Ok(())
    }

    /// Writes the save file contents to an arbitrary writer.
    pub fn save_to<W: Write, H: HeroFacade>(
        &self,
        out: &mut W,
        hero: &H,
        mode: WorldMode,
    ) -> Result<(), SaveError> {
        let game = SavedGame {
            hero: hero.record(),
            mode,
            enemies: Species::ALL.map(|species| query::enemy_records(&self.world, species)),
            projectiles: query::projectile_records(&self.world),
        };
        game.encode(out)?;
        Ok(())
    }

    /// Replaces the world and the hero with the game saved at `path`.
    ///
    /// Returns the saved world mode. On any error neither the simulation nor
    /// the hero is modified.
    pub fn load_game<H: HeroFacade>(
        &mut self,
        path: impl AsRef<Path>,
        hero: &mut H,
    ) -> Result<WorldMode, SaveError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => SaveError::Missing {
                path: path.to_path_buf(),
            },
            _ => SaveError::Io(error),
        })?;
        let text = std::str::from_utf8(&bytes).map_err(|error| {
            let valid = &bytes[..error.valid_up_to()];
            SaveError::Corrupt {
                line: valid.iter().filter(|byte| **byte == b'\n').count() + 1,
                reason: "save file is not valid UTF-8".to_owned(),
            }
        })?;
        let mode = self.load_from_str(text, hero)?;
        log::info!(
            "loaded {} enemies from {}",
            self.population_counts().total(),
            path.display()
        );
        Ok(mode)
    }

    /// Replaces the world and the hero with the game held in `text`.
    pub fn load_from_str<H: HeroFacade>(
        &mut self,
        text: &str,
        hero: &mut H,
    ) -> Result<WorldMode, SaveError> {
        let game = SavedGame::decode(text, self.config.projectile_capacity)?;
        self.world.restore(&game.enemies, &game.projectiles);
        hero.restore(game.hero);
        self.commands.clear();
        self.events.clear();
        Ok(game.mode)
    }

    fn flush<H: HeroFacade>(&mut self, hero: &mut H) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, hero, &mut self.events);
        }
    }
}
