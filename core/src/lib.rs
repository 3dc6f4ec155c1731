#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the survivor simulation.
//!
//! This crate defines the message surface that connects the driver, the
//! authoritative world, and pure systems. Systems read immutable views such
//! as [`EnemyView`] and respond with [`Command`] batches; the world executes
//! those commands through its `apply` entry point and broadcasts [`Event`]
//! values describing what happened. The hero, the tile map and the renderer
//! live outside the core and are reached only through the narrow
//! [`HeroFacade`], [`WaterMap`] and [`Canvas`] capabilities.

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Width of the playable world measured in world units.
pub const WORLD_WIDTH: f32 = 1344.0;

/// Height of the playable world measured in world units.
pub const WORLD_HEIGHT: f32 = 1344.0;

/// Side length of a single square map tile.
pub const TILE_SIZE: f32 = 32.0;

/// Number of tiles along each edge of the map.
pub const MAP_TILES: i32 = 42;

/// Width of the camera's visible rectangle.
pub const VIEWPORT_WIDTH: f32 = 1024.0;

/// Height of the camera's visible rectangle.
pub const VIEWPORT_HEIGHT: f32 = 768.0;

/// Maximum number of live enemies of a single species.
pub const SPECIES_CAPACITY: usize = 1000;

/// Number of projectile slots allocated up front.
pub const PROJECTILE_CAPACITY: usize = 30_000;

/// Side length of the square bounding box shared by enemies and the hero.
pub const SPRITE_SIZE: f32 = 32.0;

/// Offset from a sprite's top-left corner to the center of its hit circle.
pub const HIT_CENTER_OFFSET: Vec2 = Vec2::new(16.0, 22.0);

/// Radius of an enemy's hit circle.
pub const ENEMY_HIT_RADIUS: f32 = 8.0;

/// Radius of the hero's hit circle.
pub const HERO_HIT_RADIUS: f32 = SPRITE_SIZE / 2.8;

/// Radius of a projectile's hit circle.
pub const PROJECTILE_HIT_RADIUS: f32 = 3.0;

/// Distance a projectile travels per second.
pub const PROJECTILE_SPEED: f32 = 100.0;

/// Describes whether the world is bounded or wraps around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldMode {
    /// Bounded world; positions are clamped and projectiles expire at the edge.
    #[default]
    Finite,
    /// Wrapping world; nothing is clamped to the map bounds.
    Infinite,
}

impl WorldMode {
    /// Converts the persisted infinite flag into a mode.
    #[must_use]
    pub const fn from_infinite_flag(infinite: bool) -> Self {
        if infinite {
            Self::Infinite
        } else {
            Self::Finite
        }
    }

    /// Reports whether the world wraps around.
    #[must_use]
    pub const fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

/// The four hostile species, in the fixed order every system iterates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Weak melee enemy with moderate speed.
    Goblin,
    /// Slow melee enemy with a deep health pool.
    HeavyGoblin,
    /// Fast, fragile melee enemy.
    Slime,
    /// Stationary ranged enemy that never walks.
    Musketeer,
}

impl Species {
    /// Every species in iteration order.
    pub const ALL: [Self; 4] = [Self::Goblin, Self::HeavyGoblin, Self::Slime, Self::Musketeer];

    /// Dense index of the species within [`Species::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Goblin => 0,
            Self::HeavyGoblin => 1,
            Self::Slime => 2,
            Self::Musketeer => 3,
        }
    }

    /// Human-readable name used in logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Goblin => "goblin",
            Self::HeavyGoblin => "heavy goblin",
            Self::Slime => "slime",
            Self::Musketeer => "musketeer",
        }
    }

    /// Health assigned to a freshly spawned enemy.
    #[must_use]
    pub const fn starting_health(self) -> u32 {
        match self {
            Self::Goblin => 100,
            Self::HeavyGoblin => 200,
            Self::Slime => 50,
            Self::Musketeer => 250,
        }
    }

    /// Distance covered per second while chasing the hero.
    #[must_use]
    pub const fn movement_speed(self) -> f32 {
        match self {
            Self::Goblin => 80.0,
            Self::HeavyGoblin => 40.0,
            Self::Slime => 100.0,
            Self::Musketeer => 0.0,
        }
    }

    /// Reports whether the species holds its position and never animates.
    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::Musketeer)
    }

    /// Damage the hero takes when touching an enemy of this species.
    #[must_use]
    pub const fn contact_damage(self) -> u32 {
        match self {
            Self::Goblin => 10,
            Self::HeavyGoblin => 20,
            Self::Slime => 5,
            Self::Musketeer => 30,
        }
    }

    /// Damage the enemy takes in return when touching the hero.
    #[must_use]
    pub const fn recoil_damage(self) -> u32 {
        self.contact_damage() * 2
    }

    /// Score credited to the hero when an enemy of this species falls.
    #[must_use]
    pub const fn bounty(self) -> u32 {
        match self {
            Self::Goblin => 100,
            Self::HeavyGoblin => 200,
            Self::Slime => 50,
            Self::Musketeer => 250,
        }
    }

    /// Damage carried by the projectiles this species fires.
    #[must_use]
    pub const fn ranged_damage(self) -> u32 {
        match self {
            Self::Musketeer => 30,
            Self::Goblin | Self::HeavyGoblin | Self::Slime => 25,
        }
    }

    /// Seconds between two ranged attacks.
    #[must_use]
    pub const fn attack_cooldown(self) -> f32 {
        3.0
    }

    /// Spawn cadence parameters used by the spawner.
    #[must_use]
    pub const fn spawn_tuning(self) -> SpawnTuning {
        match self {
            Self::Goblin => SpawnTuning::melee(4.0),
            Self::HeavyGoblin => SpawnTuning::melee(7.0),
            Self::Slime => SpawnTuning::melee(6.0),
            Self::Musketeer => SpawnTuning {
                initial_threshold: 6.0,
                step: 0.1,
                floor: 1.5,
                margin: 100.0,
            },
        }
    }
}

/// Spawn cadence of a single species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnTuning {
    /// Seconds that must accumulate before the first spawn.
    pub initial_threshold: f32,
    /// Amount the threshold shrinks after every successful spawn.
    pub step: f32,
    /// Lowest threshold the escalation may reach.
    pub floor: f32,
    /// Distance outside the visible rectangle at which enemies appear.
    pub margin: f32,
}

impl SpawnTuning {
    const fn melee(initial_threshold: f32) -> Self {
        Self {
            initial_threshold,
            step: 0.2,
            floor: 0.5,
            margin: 32.0,
        }
    }
}

/// Identifies who fired a projectile, and therefore what it may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileOrigin {
    /// Fired by the hero; damages enemies.
    Hero,
    /// Fired by an enemy; damages the hero.
    Enemy,
}

impl ProjectileOrigin {
    /// Reports whether the hero fired the projectile.
    #[must_use]
    pub const fn is_hero(self) -> bool {
        matches!(self, Self::Hero)
    }
}

/// Request to launch a projectile from `source` toward `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileRequest {
    /// World position the projectile starts from.
    pub source: Vec2,
    /// World position the projectile flies toward.
    pub target: Vec2,
    /// Damage applied to the first target hit.
    pub damage: u32,
    /// Side that fired the projectile.
    pub origin: ProjectileOrigin,
}

/// Handle to an enemy slot within its species population.
///
/// Populations compact with swap-remove, so a handle is only meaningful until
/// the next compaction pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyRef {
    /// Species population the enemy belongs to.
    pub species: Species,
    /// Slot index inside that population.
    pub slot: usize,
}

impl EnemyRef {
    /// Creates a handle for the provided species slot.
    #[must_use]
    pub const fn new(species: Species, slot: usize) -> Self {
        Self { species, slot }
    }
}

/// Index of a slot within the projectile pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileSlot(usize);

impl ProjectileSlot {
    /// Creates a new slot handle.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the slot index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Commands that express all permissible mutations of the dynamic world.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Adds a new enemy at the provided top-left position.
    SpawnEnemy {
        /// Species of the new enemy.
        species: Species,
        /// Top-left corner of the enemy's bounding box.
        position: Vec2,
    },
    /// Launches a projectile into the first inactive pool slot.
    LaunchProjectile {
        /// Launch parameters.
        request: ProjectileRequest,
    },
    /// Runs enemy behavior, projectile kinematics and compaction of the fallen.
    Tick {
        /// Simulated seconds since the previous tick.
        dt: f32,
        /// Whether projectiles expire at the world edge.
        mode: WorldMode,
    },
    /// Subtracts health from an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyRef,
        /// Amount of health removed.
        amount: u32,
    },
    /// Subtracts health from the hero.
    DamageHero {
        /// Amount of health removed.
        amount: u32,
    },
    /// Returns a projectile slot to the inactive state after an impact.
    DeactivateProjectile {
        /// Slot that hit something.
        slot: ProjectileSlot,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated seconds that elapsed in the tick.
        dt: f32,
    },
    /// Confirms that an enemy joined its population.
    EnemySpawned {
        /// Slot the new enemy occupies.
        enemy: EnemyRef,
        /// Top-left corner of the new enemy.
        position: Vec2,
    },
    /// Reports that a spawn was dropped because the population is full.
    SpawnRejected {
        /// Species whose population is at capacity.
        species: Species,
    },
    /// Confirms that a projectile left its source.
    ProjectileLaunched {
        /// Pool slot holding the projectile.
        slot: ProjectileSlot,
        /// Side that fired it.
        origin: ProjectileOrigin,
    },
    /// Reports that a launch was dropped because every slot is active.
    ProjectileDropped {
        /// Side that attempted to fire.
        origin: ProjectileOrigin,
    },
    /// Reports that a projectile left the bounded world.
    ProjectileExpired {
        /// Slot that became inactive.
        slot: ProjectileSlot,
    },
    /// Reports that a projectile hit a target and became inactive.
    ProjectileImpact {
        /// Slot that became inactive.
        slot: ProjectileSlot,
    },
    /// Confirms that an enemy lost health.
    EnemyDamaged {
        /// Enemy that was damaged.
        enemy: EnemyRef,
        /// Health remaining after the hit.
        remaining: u32,
    },
    /// Confirms that the hero lost health.
    HeroDamaged {
        /// Amount of health removed.
        amount: u32,
        /// Health remaining after the hit.
        remaining: u32,
    },
    /// Announces that a fallen enemy was removed and its bounty credited.
    EnemySlain {
        /// Species of the removed enemy.
        species: Species,
        /// Score credited to the hero.
        bounty: u32,
    },
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Slot the enemy occupied when the snapshot was taken.
    pub enemy: EnemyRef,
    /// Top-left corner of the enemy's bounding box.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Animation frame in `0..4`.
    pub frame: u8,
}

impl EnemySnapshot {
    /// Species of the captured enemy.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.enemy.species
    }

    /// Center of the enemy's hit circle.
    #[must_use]
    pub fn hit_center(&self) -> Vec2 {
        self.position + HIT_CENTER_OFFSET
    }
}

/// Read-only snapshot of every live enemy in species order, then slot order.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a view from the provided snapshots, ordering them by handle.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.enemy);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of an active projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Pool slot holding the projectile.
    pub slot: ProjectileSlot,
    /// Current center of the projectile.
    pub position: Vec2,
    /// Unit travel direction, or zero.
    pub direction: Vec2,
    /// Damage applied on impact.
    pub damage: u32,
    /// Side that fired it.
    pub origin: ProjectileOrigin,
}

/// Read-only snapshot of every active projectile in slot order.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a view from the provided snapshots, ordering them by slot.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.slot);
        Self { snapshots }
    }

    /// Iterator over the active projectiles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of active projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Live counts for every species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulationCounts([usize; 4]);

impl PopulationCounts {
    /// Creates counts from a per-species array in [`Species::ALL`] order.
    #[must_use]
    pub const fn new(counts: [usize; 4]) -> Self {
        Self(counts)
    }

    /// Live count of the provided species.
    #[must_use]
    pub const fn get(&self, species: Species) -> usize {
        self.0[species.index()]
    }

    /// Live count across every species.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

/// Position of the camera's visible rectangle in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraView {
    origin: Vec2,
}

impl CameraView {
    /// Creates a camera whose visible rectangle starts at `origin`.
    #[must_use]
    pub const fn new(origin: Vec2) -> Self {
        Self { origin }
    }

    /// Top-left corner of the visible rectangle.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Converts a world position into screen coordinates.
    #[must_use]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.origin
    }

    /// Reports whether `point` lies inside the visible rectangle grown by `margin`.
    #[must_use]
    pub fn contains(&self, point: Vec2, margin: f32) -> bool {
        point.x > self.origin.x - margin
            && point.x < self.origin.x + VIEWPORT_WIDTH + margin
            && point.y > self.origin.y - margin
            && point.y < self.origin.y + VIEWPORT_HEIGHT + margin
    }
}

/// Persisted hero fields, in save-file order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroRecord {
    /// Top-left corner of the hero.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Accumulated score.
    pub score: u32,
    /// Whether the power-up is currently running.
    pub power_up: bool,
    /// Whether the power-up is recharging.
    pub power_up_on_cooldown: bool,
    /// Seconds the current power-up has been running.
    pub power_up_timer: f32,
    /// Seconds the power-up has been recharging.
    pub power_up_cooldown_timer: f32,
    /// Seconds since the last linear attack.
    pub linear_attack_timer: f32,
    /// Seconds since the last area attack.
    pub area_attack_timer: f32,
}

/// Persisted enemy fields, in save-file order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    /// Top-left corner of the enemy.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Seconds since the enemy last fired.
    pub attack_timer: f32,
}

/// Persisted fields of an active projectile, in save-file order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRecord {
    /// Current center of the projectile.
    pub position: Vec2,
    /// Unit travel direction, or zero.
    pub direction: Vec2,
    /// Damage applied on impact.
    pub damage: u32,
    /// Side that fired it.
    pub origin: ProjectileOrigin,
}

/// Anything with a position and a health pool that can be hurt.
pub trait Damageable {
    /// Top-left corner of the bounding box.
    fn position(&self) -> Vec2;

    /// Remaining health.
    fn health(&self) -> u32;

    /// Removes health, saturating at zero.
    fn take_damage(&mut self, amount: u32);

    /// Reports whether no health remains.
    fn is_dead(&self) -> bool {
        self.health() == 0
    }
}

/// Capabilities the simulation needs from the externally owned hero.
pub trait HeroFacade: Damageable {
    /// Adds to the hero's score.
    fn credit_score(&mut self, amount: u32);

    /// Captures the persisted hero fields.
    fn record(&self) -> HeroRecord;

    /// Replaces the hero's persisted fields.
    fn restore(&mut self, record: HeroRecord);
}

/// Tile lookup owned by the map collaborator.
pub trait WaterMap {
    /// Reports whether the tile at `row`/`col` blocks movement.
    fn is_water(&self, row: i32, col: i32) -> bool;
}

/// Enemy draw request handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySprite {
    /// Species, which selects the sprite sheet.
    pub species: Species,
    /// Top-left corner in screen coordinates.
    pub screen_position: Vec2,
    /// Column of the sprite sheet to draw.
    pub frame: u8,
}

/// Projectile draw request handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSprite {
    /// Center in screen coordinates.
    pub screen_position: Vec2,
    /// Side that fired it, which selects the color.
    pub origin: ProjectileOrigin,
}

/// Ring drawn around the hero while an area attack is visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaRing {
    /// Ring center in screen coordinates.
    pub screen_center: Vec2,
    /// Outer radius.
    pub outer_radius: f32,
    /// Inner radius; pixels between the two radii are drawn.
    pub inner_radius: f32,
}

/// Rendering collaborator that receives draw requests for visible state.
pub trait Canvas {
    /// Draws a single enemy.
    fn enemy(&mut self, sprite: EnemySprite);

    /// Draws a single projectile.
    fn projectile(&mut self, sprite: ProjectileSprite);

    /// Draws the area attack ring.
    fn area_ring(&mut self, _ring: AreaRing) {}
}

/// Reports whether two circles overlap, excluding exact tangency.
#[must_use]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let combined = radius_a + radius_b;
    a.distance_squared(b) < combined * combined
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
/// within `epsilon`.
#[must_use]
pub fn direction_between(from: Vec2, to: Vec2, epsilon: f32) -> Vec2 {
    let delta = to - from;
    let length = delta.length();
    if length > epsilon {
        delta / length
    } else {
        Vec2::ZERO
    }
}
