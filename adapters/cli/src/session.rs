//! Frame loop that drives the hero and the simulation without a window.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use survivor_core::{
    AreaRing, CameraView, Canvas, Damageable, EnemySprite, EnemyView, ProjectileSprite, Vec2,
    WorldMode, SPRITE_SIZE, VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WORLD_HEIGHT, WORLD_WIDTH,
};
use survivor_simulation::{SaveError, Simulation};
use survivor_system_hero::{Hero, HeroAction, HeroIntent};

use crate::{
    config::{difficulty_multiplier, RunConfig, LEVEL_DURATION},
    map::TileMap,
};

/// Where a fresh hero starts.
const HERO_START: Vec2 = Vec2::new(500.0, 400.0);

/// Distance at which the autopilot starts backing away from an enemy.
const THREAT_RANGE: f32 = 200.0;

/// Enemies within the area attack range needed before the autopilot uses it.
const CROWD_SIZE: usize = 3;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Every requested frame ran.
    Survived,
    /// The hero ran out of health.
    Defeated,
}

/// Final state reported once the loop stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) frames: u32,
    pub(crate) level: u32,
    pub(crate) score: u32,
    pub(crate) health: u32,
    pub(crate) enemies: usize,
}

/// Headless game session.
#[derive(Debug)]
pub(crate) struct Session {
    sim: Simulation,
    hero: Hero,
    map: TileMap,
    mode: WorldMode,
    dt: f32,
    level: u32,
    level_timer: f32,
    save_path: PathBuf,
    save_every: Option<u32>,
    stats: FrameStats,
    canvas: TallyCanvas,
    actions: Vec<HeroAction>,
}

impl Session {
    /// Creates a session with a fresh hero at the start position.
    pub(crate) fn new(config: &RunConfig, map: TileMap) -> Self {
        Self {
            sim: Simulation::new(config.simulation),
            hero: Hero::new(HERO_START),
            map,
            mode: config.mode(),
            dt: config.dt,
            level: config.level,
            level_timer: 0.0,
            save_path: config.save_path.clone(),
            save_every: config.save_every,
            stats: FrameStats::default(),
            canvas: TallyCanvas::default(),
            actions: Vec::new(),
        }
    }

    /// Replaces the session state with the saved game at `path`.
    pub(crate) fn resume(&mut self, path: &Path) -> Result<()> {
        self.mode = self
            .sim
            .load_game(path, &mut self.hero)
            .with_context(|| format!("failed to resume from {}", path.display()))?;
        self.level_timer = 0.0;
        Ok(())
    }

    /// Runs up to `frames` frames, stopping early when the hero dies.
    pub(crate) fn run(&mut self, frames: u32) -> Result<Summary> {
        log::info!(
            "level {} started, difficulty x{}",
            self.level,
            difficulty_multiplier(self.level)
        );

        let mut played = 0;
        let mut outcome = Outcome::Survived;
        for frame in 1..=frames {
            if self.hero.is_dead() {
                outcome = Outcome::Defeated;
                break;
            }
            self.frame();
            played = frame;

            if self.save_every.is_some_and(|every| frame % every == 0) {
                self.save()?;
            }
        }
        if self.hero.is_dead() {
            outcome = Outcome::Defeated;
        }

        Ok(Summary {
            outcome,
            frames: played,
            level: self.level,
            score: self.hero.score(),
            health: self.hero.health(),
            enemies: self.sim.population_counts().total(),
        })
    }

    /// Writes the current game to the configured save path.
    pub(crate) fn save(&self) -> Result<(), SaveError> {
        self.sim.save_game(&self.save_path, &self.hero, self.mode)
    }

    fn frame(&mut self) {
        let started = Instant::now();
        let camera = follow(self.hero.position(), self.mode);

        let enemies = self.sim.enemies();
        let intent = autopilot(&self.hero, &enemies);
        self.actions.clear();
        self.hero
            .update(self.dt, intent, &self.map, self.mode, &enemies, &mut self.actions);
        for action in self.actions.drain(..) {
            match action {
                HeroAction::Fire(request) => {
                    let _ = self.sim.spawn_projectile(request);
                }
                HeroAction::AreaStrike { damage } => {
                    self.sim.apply_top_health_damage(damage, &mut self.hero);
                }
            }
        }

        let scaled = self.dt * difficulty_multiplier(self.level);
        self.sim.update(scaled, camera, &mut self.hero, self.mode);

        self.canvas.clear();
        self.sim.draw(camera, &mut self.canvas);
        if let Some(ring) = self.hero.area_ring(camera) {
            self.canvas.area_ring(ring);
        }

        if let Some(window) = self.stats.record(self.dt, started.elapsed()) {
            log::debug!(
                "{} frames at {:.0} frames/s; on screen: {} enemies, {} projectiles, {} rings",
                window.frames,
                window.frames_per_second,
                self.canvas.enemy_total(),
                self.canvas.projectiles,
                self.canvas.rings
            );
        }

        self.level_timer += self.dt;
        if self.level_timer >= LEVEL_DURATION {
            self.level_timer = 0.0;
            self.level += 1;
            log::info!(
                "level complete with score {}; level {} difficulty x{}",
                self.hero.score(),
                self.level,
                difficulty_multiplier(self.level)
            );
        }
    }
}

/// Camera origin that keeps `hero` centred, clamped to the map when finite.
pub(crate) fn follow(hero: Vec2, mode: WorldMode) -> CameraView {
    let mut origin = hero - Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT) / 2.0;
    if !mode.is_infinite() {
        origin.x = origin.x.clamp(0.0, WORLD_WIDTH - VIEWPORT_WIDTH);
        origin.y = origin.y.clamp(0.0, WORLD_HEIGHT - VIEWPORT_HEIGHT);
    }
    CameraView::new(origin)
}

/// Backs away from the nearest threat, uses the power-up whenever it is
/// available and the area attack once a crowd gathers.
pub(crate) fn autopilot(hero: &Hero, enemies: &EnemyView) -> HeroIntent {
    let position = hero.position();
    let mut nearest: Option<(f32, Vec2)> = None;
    let mut crowd = 0;
    for enemy in enemies.iter() {
        let distance = position.distance(enemy.position);
        if distance <= THREAT_RANGE {
            crowd += 1;
        }
        if nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, enemy.position));
        }
    }

    let mut intent = HeroIntent {
        power_up: !enemies.is_empty(),
        area_strike: crowd >= CROWD_SIZE,
        ..HeroIntent::default()
    };
    if let Some((distance, threat)) = nearest {
        if distance < THREAT_RANGE {
            let away = position - threat;
            let deadzone = SPRITE_SIZE / 4.0;
            intent.up = away.y < -deadzone;
            intent.down = away.y > deadzone;
            intent.left = away.x < -deadzone;
            intent.right = away.x > deadzone;
        }
    }
    intent
}

/// Per-second frame statistics.
#[derive(Debug, Default)]
pub(crate) struct FrameStats {
    simulated: f32,
    busy: Duration,
    frames: u32,
}

/// Statistics of one simulated second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StatsWindow {
    pub(crate) frames: u32,
    pub(crate) frames_per_second: f32,
}

impl FrameStats {
    /// Adds a frame; returns the window once a simulated second has passed.
    pub(crate) fn record(&mut self, dt: f32, busy: Duration) -> Option<StatsWindow> {
        self.simulated += dt;
        self.busy += busy;
        self.frames += 1;
        if self.simulated < 1.0 {
            return None;
        }

        let seconds = self.busy.as_secs_f32();
        let window = StatsWindow {
            frames: self.frames,
            frames_per_second: if seconds > 0.0 {
                self.frames as f32 / seconds
            } else {
                f32::INFINITY
            },
        };
        *self = Self::default();
        Some(window)
    }
}

/// Canvas that counts draw requests instead of rasterising them.
#[derive(Debug, Default)]
pub(crate) struct TallyCanvas {
    enemies: [usize; 4],
    projectiles: usize,
    rings: usize,
}

impl TallyCanvas {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn enemy_total(&self) -> usize {
        self.enemies.iter().sum()
    }
}

impl Canvas for TallyCanvas {
    fn enemy(&mut self, sprite: EnemySprite) {
        self.enemies[sprite.species.index()] += 1;
    }

    fn projectile(&mut self, _sprite: ProjectileSprite) {
        self.projectiles += 1;
    }

    fn area_ring(&mut self, _ring: AreaRing) {
        self.rings += 1;
    }
}
