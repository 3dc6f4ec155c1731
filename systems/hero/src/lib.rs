#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player-controlled hero: movement over the water map, attack cooldowns and
//! the power-up cycle.
//!
//! The hero never talks to the simulation directly. [`Hero::update`] reports
//! what it wants to do as [`HeroAction`] values and the driver forwards them.

use survivor_core::{
    AreaRing, CameraView, Damageable, EnemyView, HeroFacade, HeroRecord, ProjectileOrigin,
    ProjectileRequest, Vec2, WaterMap, WorldMode, HIT_CENTER_OFFSET, MAP_TILES, SPRITE_SIZE,
    TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH,
};
use survivor_system_targeting::{Targeting, AREA_STRIKE_RANGE};

/// Health of a freshly created hero.
pub const STARTING_HEALTH: u32 = 200;

const MOVE_SPEED: f32 = 100.0;
const FRAME_INTERVAL: f32 = 0.15;
const FRAME_COUNT: u8 = 4;
const FOOT_PROBE: f32 = 0.85;

const LINEAR_DAMAGE: u32 = 100;
const LINEAR_COOLDOWN: f32 = 0.8;
const LINEAR_RANGE: f32 = 150.0;
const POWERED_FIRE_RATE: f32 = 1.5;

const AREA_DAMAGE: u32 = 200;
const AREA_COOLDOWN: f32 = 10.0;
const AREA_FLASH: f32 = 0.1;
const AREA_RING_WIDTH: f32 = 10.0;

const POWER_UP_DURATION: f32 = 5.0;
const POWER_UP_COOLDOWN: f32 = 10.0;

/// Controls held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeroIntent {
    /// Move toward negative y.
    pub up: bool,
    /// Move toward positive y.
    pub down: bool,
    /// Move toward negative x.
    pub left: bool,
    /// Move toward positive x.
    pub right: bool,
    /// Trigger the area attack if it is ready.
    pub area_strike: bool,
    /// Activate the power-up if it is available.
    pub power_up: bool,
}

/// Request the hero hands to the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeroAction {
    /// Launch a hero-owned projectile.
    Fire(ProjectileRequest),
    /// Damage the healthiest enemies around the hero.
    AreaStrike {
        /// Damage dealt to each struck enemy.
        damage: u32,
    },
}

/// Hero state owned by the driver and lent to the simulation each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Hero {
    position: Vec2,
    health: u32,
    score: u32,
    frame: u8,
    animation_timer: f32,
    moving: bool,
    power_up: bool,
    power_up_on_cooldown: bool,
    power_up_timer: f32,
    power_up_cooldown_timer: f32,
    linear_attack_timer: f32,
    area_attack_timer: f32,
    area_flash: Option<f32>,
}

impl Hero {
    /// Creates a hero at `position` with full health and every attack cooling down.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self {
            position,
            health: STARTING_HEALTH,
            score: 0,
            frame: 0,
            animation_timer: 0.0,
            moving: false,
            power_up: false,
            power_up_on_cooldown: false,
            power_up_timer: 0.0,
            power_up_cooldown_timer: 0.0,
            linear_attack_timer: 0.0,
            area_attack_timer: 0.0,
            area_flash: None,
        }
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Current animation column.
    #[must_use]
    pub const fn frame(&self) -> u8 {
        self.frame
    }

    /// Reports whether any movement was requested last frame.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Reports whether the power-up is active.
    #[must_use]
    pub const fn is_powered_up(&self) -> bool {
        self.power_up
    }

    /// Reports whether the area attack can be triggered.
    #[must_use]
    pub fn area_strike_ready(&self) -> bool {
        self.area_attack_timer >= AREA_COOLDOWN
    }

    /// Advances the hero by `dt` seconds.
    ///
    /// Movement is resolved per held direction against `water`; attacks are
    /// reported through `out` in the order they trigger.
    ///
    /// An area strike is resolved by the caller after this returns, so it is
    /// centred on the position reached this frame rather than the one the
    /// hero started the frame at.
    pub fn update(
        &mut self,
        dt: f32,
        intent: HeroIntent,
        water: &impl WaterMap,
        mode: WorldMode,
        enemies: &EnemyView,
        out: &mut Vec<HeroAction>,
    ) {
        self.animate(dt);
        let next = self.walk(dt, intent, water, mode);

        if intent.area_strike && self.area_strike_ready() {
            out.push(HeroAction::AreaStrike {
                damage: AREA_DAMAGE,
            });
            self.area_flash = Some(0.0);
            self.area_attack_timer = 0.0;
        }

        if let Some(elapsed) = self.area_flash.as_mut() {
            *elapsed += dt;
            if *elapsed >= AREA_FLASH {
                self.area_flash = None;
            }
        }

        if intent.power_up && !self.power_up && !self.power_up_on_cooldown {
            self.power_up = true;
            self.power_up_timer = 0.0;
            log::info!("power-up activated");
        }

        self.position = next;
        self.advance_power_up(dt);

        self.linear_attack_timer += dt;
        if self.linear_attack_timer >= self.linear_cooldown() {
            if let Some(target) = Targeting::closest(enemies, self.position, LINEAR_RANGE) {
                let half = SPRITE_SIZE / 2.0;
                out.push(HeroAction::Fire(ProjectileRequest {
                    source: self.position + Vec2::splat(half),
                    target: target.position + Vec2::splat(half),
                    damage: LINEAR_DAMAGE,
                    origin: ProjectileOrigin::Hero,
                }));
                self.linear_attack_timer = 0.0;
            }
        }

        if self.area_attack_timer < AREA_COOLDOWN {
            self.area_attack_timer += dt;
        }

        if !mode.is_infinite() {
            self.position.x = self.position.x.clamp(0.0, WORLD_WIDTH - SPRITE_SIZE);
            self.position.y = self.position.y.clamp(0.0, WORLD_HEIGHT - SPRITE_SIZE);
        }
    }

    /// Ring to draw while the area attack flash is visible.
    #[must_use]
    pub fn area_ring(&self, camera: CameraView) -> Option<AreaRing> {
        self.area_flash.map(|_| AreaRing {
            screen_center: camera.to_screen(self.position + HIT_CENTER_OFFSET),
            outer_radius: AREA_STRIKE_RANGE,
            inner_radius: AREA_STRIKE_RANGE - AREA_RING_WIDTH,
        })
    }

    fn animate(&mut self, dt: f32) {
        self.animation_timer += dt;
        if self.animation_timer > FRAME_INTERVAL {
            self.frame = (self.frame + 1) % FRAME_COUNT;
            self.animation_timer = 0.0;
        }
    }

    fn walk(
        &mut self,
        dt: f32,
        intent: HeroIntent,
        water: &impl WaterMap,
        mode: WorldMode,
    ) -> Vec2 {
        let step = MOVE_SPEED * dt;
        let half = SPRITE_SIZE / 2.0;
        let mut next = self.position;
        self.moving = false;

        // Each held direction probes from the pre-move position; when opposite
        // directions are both held the later one wins.
        let vertical = [
            (intent.up, -step, half),
            (intent.down, step, SPRITE_SIZE * FOOT_PROBE),
        ];
        for (held, delta, probe) in vertical {
            if !held {
                continue;
            }
            self.moving = true;
            let try_y = self.position.y + delta;
            let probe = Vec2::new(self.position.x + half, try_y + probe);
            if !is_water_at(water, probe, mode) {
                next.y = try_y;
            }
        }

        let horizontal = [(intent.left, -step), (intent.right, step)];
        for (held, delta) in horizontal {
            if !held {
                continue;
            }
            self.moving = true;
            let try_x = self.position.x + delta;
            let probe = Vec2::new(try_x + half, self.position.y + half);
            if !is_water_at(water, probe, mode) {
                next.x = try_x;
            }
        }

        next
    }

    fn advance_power_up(&mut self, dt: f32) {
        if self.power_up {
            self.power_up_timer += dt;
            if self.power_up_timer >= POWER_UP_DURATION {
                self.power_up = false;
                self.power_up_on_cooldown = true;
                self.power_up_cooldown_timer = 0.0;
            }
        }

        if self.power_up_on_cooldown {
            self.power_up_cooldown_timer += dt;
            if self.power_up_cooldown_timer >= POWER_UP_COOLDOWN {
                self.power_up_on_cooldown = false;
                log::info!("power-up recharged");
            }
        }
    }

    fn linear_cooldown(&self) -> f32 {
        if self.power_up {
            LINEAR_COOLDOWN / POWERED_FIRE_RATE
        } else {
            LINEAR_COOLDOWN
        }
    }
}

/// Tile containing `point`, wrapped onto the map in an infinite world.
#[must_use]
pub fn tile_at(point: Vec2, mode: WorldMode) -> (i32, i32) {
    let row = (point.y / TILE_SIZE).floor() as i32;
    let col = (point.x / TILE_SIZE).floor() as i32;
    if mode.is_infinite() {
        (row.rem_euclid(MAP_TILES), col.rem_euclid(MAP_TILES))
    } else {
        (row, col)
    }
}

fn is_water_at(water: &impl WaterMap, point: Vec2, mode: WorldMode) -> bool {
    let (row, col) = tile_at(point, mode);
    water.is_water(row, col)
}

impl Damageable for Hero {
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

impl HeroFacade for Hero {
    fn credit_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    fn record(&self) -> HeroRecord {
        HeroRecord {
            position: self.position,
            health: self.health,
            score: self.score,
            power_up: self.power_up,
            power_up_on_cooldown: self.power_up_on_cooldown,
            power_up_timer: self.power_up_timer,
            power_up_cooldown_timer: self.power_up_cooldown_timer,
            linear_attack_timer: self.linear_attack_timer,
            area_attack_timer: self.area_attack_timer,
        }
    }

    fn restore(&mut self, record: HeroRecord) {
        self.position = record.position;
        self.health = record.health;
        self.score = record.score;
        self.power_up = record.power_up;
        self.power_up_on_cooldown = record.power_up_on_cooldown;
        self.power_up_timer = record.power_up_timer;
        self.power_up_cooldown_timer = record.power_up_cooldown_timer;
        self.linear_attack_timer = record.linear_attack_timer;
        self.area_attack_timer = record.area_attack_timer;
        self.area_flash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::{EnemyRef, EnemySnapshot, Species};

    struct Dry;

    impl WaterMap for Dry {
        fn is_water(&self, _row: i32, _col: i32) -> bool {
            false
        }
    }

    struct Lake {
        row: i32,
        col: i32,
    }

    impl WaterMap for Lake {
        fn is_water(&self, row: i32, col: i32) -> bool {
            row == self.row && col == self.col
        }
    }

    fn goblin_at(position: Vec2) -> EnemyView {
        EnemyView::from_snapshots(vec![EnemySnapshot {
            enemy: EnemyRef::new(Species::Goblin, 0),
            position,
            health: 100,
            frame: 0,
        }])
    }

    #[test]
    fn negative_coordinates_floor_into_the_previous_tile() {
        assert_eq!(tile_at(Vec2::new(-1.0, -33.0), WorldMode::Finite), (-2, -1));
        assert_eq!(tile_at(Vec2::new(-1.0, -33.0), WorldMode::Infinite), (40, 41));
        assert_eq!(tile_at(Vec2::new(1344.0, 0.0), WorldMode::Infinite), (0, 0));
    }

    #[test]
    fn water_blocks_movement_on_that_axis() {
        let mut hero = Hero::new(Vec2::new(64.0, 64.0));
        let lake = Lake { row: 2, col: 4 };
        let intent = HeroIntent {
            right: true,
            down: true,
            ..HeroIntent::default()
        };
        let mut out = Vec::new();

        hero.update(0.5, intent, &lake, WorldMode::Finite, &EnemyView::default(), &mut out);

        assert_eq!(hero.position(), Vec2::new(64.0, 114.0));
        assert!(hero.is_moving());
    }

    #[test]
    fn finite_world_clamps_the_hero() {
        let mut hero = Hero::new(Vec2::new(2.0, 1_310.0));
        let intent = HeroIntent {
            left: true,
            down: true,
            ..HeroIntent::default()
        };
        let mut out = Vec::new();

        hero.update(0.1, intent, &Dry, WorldMode::Finite, &EnemyView::default(), &mut out);

        assert_eq!(hero.position(), Vec2::new(0.0, WORLD_HEIGHT - SPRITE_SIZE));
    }

    #[test]
    fn linear_attack_fires_at_the_closest_enemy_in_range() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0));
        let enemies = goblin_at(Vec2::new(200.0, 100.0));
        let mut out = Vec::new();

        hero.update(0.5, HeroIntent::default(), &Dry, WorldMode::Finite, &enemies, &mut out);
        assert!(out.is_empty());

        hero.update(0.5, HeroIntent::default(), &Dry, WorldMode::Finite, &enemies, &mut out);
        assert_eq!(
            out,
            vec![HeroAction::Fire(ProjectileRequest {
                source: Vec2::new(116.0, 116.0),
                target: Vec2::new(216.0, 116.0),
                damage: 100,
                origin: ProjectileOrigin::Hero,
            })]
        );
    }

    #[test]
    fn linear_attack_waits_for_a_target() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0));
        let far = goblin_at(Vec2::new(600.0, 600.0));
        let mut out = Vec::new();

        hero.update(2.0, HeroIntent::default(), &Dry, WorldMode::Finite, &far, &mut out);
        assert!(out.is_empty());

        let near = goblin_at(Vec2::new(120.0, 100.0));
        hero.update(0.01, HeroIntent::default(), &Dry, WorldMode::Finite, &near, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn power_up_shortens_the_linear_cooldown() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0));
        let enemies = goblin_at(Vec2::new(150.0, 100.0));
        let power = HeroIntent {
            power_up: true,
            ..HeroIntent::default()
        };
        let mut out = Vec::new();

        hero.update(0.6, power, &Dry, WorldMode::Finite, &enemies, &mut out);

        assert!(hero.is_powered_up());
        assert_eq!(out.len(), 1, "0.6s exceeds the boosted 0.8 / 1.5 cooldown");
    }

    #[test]
    fn power_up_cycles_through_its_cooldown() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0));
        let power = HeroIntent {
            power_up: true,
            ..HeroIntent::default()
        };
        let mut out = Vec::new();
        let none = EnemyView::default();

        hero.update(1.0, power, &Dry, WorldMode::Finite, &none, &mut out);
        assert!(hero.is_powered_up());

        hero.update(4.0, HeroIntent::default(), &Dry, WorldMode::Finite, &none, &mut out);
        assert!(!hero.is_powered_up());
        assert!(hero.record().power_up_on_cooldown);

        hero.update(1.0, power, &Dry, WorldMode::Finite, &none, &mut out);
        assert!(!hero.is_powered_up(), "cannot reactivate while cooling down");

        hero.update(9.5, HeroIntent::default(), &Dry, WorldMode::Finite, &none, &mut out);
        assert!(!hero.record().power_up_on_cooldown);
        hero.update(0.1, power, &Dry, WorldMode::Finite, &none, &mut out);
        assert!(hero.is_powered_up());
    }

    #[test]
    fn area_strike_requires_a_full_cooldown_and_flashes_briefly() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0));
        let strike = HeroIntent {
            area_strike: true,
            ..HeroIntent::default()
        };
        let none = EnemyView::default();
        let mut out = Vec::new();

        hero.update(5.0, strike, &Dry, WorldMode::Finite, &none, &mut out);
        assert!(out.is_empty());
        hero.update(5.0, HeroIntent::default(), &Dry, WorldMode::Finite, &none, &mut out);
        assert!(hero.area_strike_ready());

        hero.update(0.05, strike, &Dry, WorldMode::Finite, &none, &mut out);
        assert_eq!(out, vec![HeroAction::AreaStrike { damage: 200 }]);
        let ring = hero
            .area_ring(CameraView::new(Vec2::new(50.0, 50.0)))
            .expect("flash visible");
        assert_eq!(ring.screen_center, Vec2::new(66.0, 72.0));
        assert_eq!(ring.outer_radius, 200.0);

        hero.update(0.06, HeroIntent::default(), &Dry, WorldMode::Finite, &none, &mut out);
        assert!(hero.area_ring(CameraView::default()).is_none());
        assert!(!hero.area_strike_ready());
    }

    #[test]
    fn area_strike_centres_on_the_position_after_the_move() {
        let mut hero = Hero::new(Vec2::new(100.0, 100.0));
        let none = EnemyView::default();
        let mut out = Vec::new();
        hero.update(10.0, HeroIntent::default(), &Dry, WorldMode::Finite, &none, &mut out);
        assert!(hero.area_strike_ready());

        let strike_right = HeroIntent {
            right: true,
            area_strike: true,
            ..HeroIntent::default()
        };
        hero.update(0.1, strike_right, &Dry, WorldMode::Finite, &none, &mut out);

        assert_eq!(out, vec![HeroAction::AreaStrike { damage: 200 }]);
        assert_eq!(hero.position(), Vec2::new(110.0, 100.0));
        let ring = hero.area_ring(CameraView::default()).expect("flash visible");
        assert_eq!(ring.screen_center, Vec2::new(126.0, 122.0));
    }

    #[test]
    fn record_round_trips_through_restore() {
        let mut hero = Hero::new(Vec2::new(10.0, 20.0));
        hero.take_damage(250);
        hero.credit_score(450);
        let record = hero.record();
        assert_eq!(record.health, 0);
        assert!(hero.is_dead());

        let mut restored = Hero::new(Vec2::ZERO);
        restored.restore(record);
        assert_eq!(restored.record(), record);
        assert_eq!(restored.score(), 450);
    }
}
