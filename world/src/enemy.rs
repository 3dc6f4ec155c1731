//! Hostile actor state and its per-tick behavior step.

use survivor_core::{
    direction_between, Damageable, EnemyRecord, ProjectileOrigin, ProjectileRequest, Species,
    Vec2, HIT_CENTER_OFFSET,
};

const FRAME_INTERVAL: f32 = 0.15;
const FRAME_COUNT: u8 = 4;
const MOVE_EPSILON: f32 = 0.01;

/// A single hostile actor owned by its species population.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    species: Species,
    position: Vec2,
    health: u32,
    frame: u8,
    animation_timer: f32,
    attack_timer: f32,
}

impl Enemy {
    /// Creates a freshly spawned enemy with its species' starting health.
    #[must_use]
    pub const fn spawn(species: Species, position: Vec2) -> Self {
        Self {
            species,
            position,
            health: species.starting_health(),
            frame: 0,
            animation_timer: 0.0,
            attack_timer: 0.0,
        }
    }

    /// Rebuilds an enemy from its persisted fields.
    #[must_use]
    pub const fn from_record(species: Species, record: EnemyRecord) -> Self {
        Self {
            species,
            position: record.position,
            health: record.health,
            frame: 0,
            animation_timer: 0.0,
            attack_timer: record.attack_timer,
        }
    }

    /// Captures the persisted fields.
    #[must_use]
    pub const fn record(&self) -> EnemyRecord {
        EnemyRecord {
            position: self.position,
            health: self.health,
            attack_timer: self.attack_timer,
        }
    }

    /// Species of the enemy.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.species
    }

    /// Current animation frame in `0..4`.
    #[must_use]
    pub const fn frame(&self) -> u8 {
        self.frame
    }

    /// Seconds accumulated toward the next ranged attack.
    #[must_use]
    pub const fn attack_timer(&self) -> f32 {
        self.attack_timer
    }

    /// Center of the enemy's hit circle.
    #[must_use]
    pub fn hit_center(&self) -> Vec2 {
        self.position + HIT_CENTER_OFFSET
    }

    /// Advances animation, the ranged attack timer and movement toward the hero.
    ///
    /// Returns a projectile request when the attack cooldown elapsed during
    /// this step. Stationary species neither animate nor move.
    pub fn advance(
        &mut self,
        dt: f32,
        speed: f32,
        hero_position: Vec2,
    ) -> Option<ProjectileRequest> {
        let stationary = self.species.is_stationary();

        if !stationary {
            self.animation_timer += dt;
            if self.animation_timer > FRAME_INTERVAL {
                self.frame = (self.frame + 1) % FRAME_COUNT;
                self.animation_timer = 0.0;
            }
        }

        let mut request = None;
        self.attack_timer += dt;
        if self.attack_timer >= self.species.attack_cooldown() {
            request = Some(ProjectileRequest {
                source: self.hit_center(),
                target: hero_position + HIT_CENTER_OFFSET,
                damage: self.species.ranged_damage(),
                origin: ProjectileOrigin::Enemy,
            });
            self.attack_timer = 0.0;
        }

        if !stationary {
            let heading = direction_between(self.position, hero_position, MOVE_EPSILON);
            self.position += heading * speed * dt;
        }

        request
    }
}

impl Damageable for Enemy {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }
}
