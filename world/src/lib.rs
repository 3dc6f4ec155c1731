#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative dynamic state of the survivor simulation.
//!
//! The world owns one [`Population`] per species and the shared
//! [`ProjectilePool`]. All mutation flows through [`apply`], which executes a
//! single [`Command`] and reports what happened as [`Event`] values. Read
//! access for systems goes through the [`query`] module.

mod enemy;
mod population;
mod projectile;

use survivor_core::{
    Command, Damageable, EnemyRecord, EnemyRef, Event, HeroFacade, ProjectileRecord,
    ProjectileRequest, ProjectileSlot, Species,
};

pub use enemy::Enemy;
pub use population::Population;
pub use projectile::{Projectile, ProjectilePool};

/// Represents the authoritative dynamic world: enemies and projectiles.
#[derive(Debug)]
pub struct World {
    populations: [Population; 4],
    projectiles: ProjectilePool,
    scratch_requests: Vec<ProjectileRequest>,
    scratch_expired: Vec<ProjectileSlot>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with the default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_projectile_capacity(survivor_core::PROJECTILE_CAPACITY)
    }

    /// Creates an empty world whose projectile pool holds `capacity` slots.
    #[must_use]
    pub fn with_projectile_capacity(capacity: usize) -> Self {
        Self {
            populations: Species::ALL.map(Population::new),
            projectiles: ProjectilePool::with_capacity(capacity),
            scratch_requests: Vec::new(),
            scratch_expired: Vec::new(),
        }
    }

    /// Discards every enemy and deactivates every projectile.
    pub fn clear(&mut self) {
        for population in &mut self.populations {
            population.clear();
        }
        self.projectiles.clear();
    }

    /// Replaces the dynamic state with persisted records.
    ///
    /// Enemy records beyond a population's capacity are dropped.
    pub fn restore(
        &mut self,
        enemies: &[Vec<EnemyRecord>; 4],
        projectiles: &[Option<ProjectileRecord>],
    ) {
        self.clear();
        for (population, records) in self.populations.iter_mut().zip(enemies.iter()) {
            let species = population.species();
            for record in records {
                if population.insert(Enemy::from_record(species, *record)).is_err() {
                    log::warn!("dropping restored {} beyond capacity", species.label());
                    break;
                }
            }
        }
        self.projectiles.restore(projectiles);
    }

    fn population(&self, species: Species) -> &Population {
        &self.populations[species.index()]
    }

    fn population_mut(&mut self, species: Species) -> &mut Population {
        &mut self.populations[species.index()]
    }

    fn enemy_mut(&mut self, enemy: EnemyRef) -> Option<&mut Enemy> {
        self.population_mut(enemy.species).get_mut(enemy.slot)
    }

    fn advance_enemies(&mut self, dt: f32, hero: &dyn HeroFacade) {
        let hero_position = hero.position();
        self.scratch_requests.clear();
        for population in &mut self.populations {
            let speed = population.species().movement_speed();
            for enemy in population.iter_mut() {
                if enemy.is_dead() {
                    continue;
                }
                if let Some(request) = enemy.advance(dt, speed, hero_position) {
                    self.scratch_requests.push(request);
                }
            }
        }
    }

    fn compact_fallen(&mut self, hero: &mut dyn HeroFacade, out_events: &mut Vec<Event>) {
        for population in &mut self.populations {
            let species = population.species();
            let removed = population.compact_fallen(|_| {
                let bounty = species.bounty();
                hero.credit_score(bounty);
                out_events.push(Event::EnemySlain { species, bounty });
            });
            if removed > 0 {
                log::debug!("removed {removed} fallen {}", species.label());
            }
        }
    }
}

/// Launches a projectile into the first inactive slot of the world's pool.
///
/// A full pool drops the request and reports [`Event::ProjectileDropped`].
pub fn launch(
    world: &mut World,
    request: ProjectileRequest,
    out_events: &mut Vec<Event>,
) -> Option<ProjectileSlot> {
    launch_into(&mut world.projectiles, request, out_events)
}

fn launch_into(
    pool: &mut ProjectilePool,
    request: ProjectileRequest,
    out_events: &mut Vec<Event>,
) -> Option<ProjectileSlot> {
    match pool.launch(request) {
        Some(slot) => {
            out_events.push(Event::ProjectileLaunched {
                slot,
                origin: request.origin,
            });
            Some(slot)
        }
        None => {
            log::debug!("projectile pool exhausted; dropping launch");
            out_events.push(Event::ProjectileDropped {
                origin: request.origin,
            });
            None
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// The hero is borrowed for commands that read its position, damage it, or
/// credit bounties to it; the world never stores it.
pub fn apply<H>(world: &mut World, command: Command, hero: &mut H, out_events: &mut Vec<Event>)
where
    H: HeroFacade,
{
    match command {
        Command::SpawnEnemy { species, position } => {
            match world.population_mut(species).insert(Enemy::spawn(species, position)) {
                Ok(slot) => out_events.push(Event::EnemySpawned {
                    enemy: EnemyRef::new(species, slot),
                    position,
                }),
                Err(_) => out_events.push(Event::SpawnRejected { species }),
            }
        }
        Command::LaunchProjectile { request } => {
            let _ = launch(world, request, out_events);
        }
        Command::Tick { dt, mode } => {
            out_events.push(Event::TimeAdvanced { dt });

            world.advance_enemies(dt, &*hero);
            let mut requests = std::mem::take(&mut world.scratch_requests);
            for request in requests.drain(..) {
                let _ = launch_into(&mut world.projectiles, request, out_events);
            }
            world.scratch_requests = requests;

            let mut expired = std::mem::take(&mut world.scratch_expired);
            expired.clear();
            world.projectiles.advance_all(dt, mode, &mut expired);
            out_events.extend(
                expired
                    .iter()
                    .map(|slot| Event::ProjectileExpired { slot: *slot }),
            );
            world.scratch_expired = expired;

            world.compact_fallen(&mut *hero, out_events);
        }
        Command::DamageEnemy { enemy, amount } => {
            if let Some(target) = world.enemy_mut(enemy) {
                target.take_damage(amount);
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    remaining: target.health(),
                });
            }
        }
        Command::DamageHero { amount } => {
            hero.take_damage(amount);
            out_events.push(Event::HeroDamaged {
                amount,
                remaining: hero.health(),
            });
        }
        Command::DeactivateProjectile { slot } => {
            if world.projectiles.deactivate(slot) {
                out_events.push(Event::ProjectileImpact { slot });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Population, ProjectilePool, World};
    use survivor_core::{
        Damageable, EnemyRecord, EnemyRef, EnemySnapshot, EnemyView, PopulationCounts,
        ProjectileRecord, ProjectileSnapshot, ProjectileView, Species,
    };

    /// Provides read-only access to a species population.
    #[must_use]
    pub fn population(world: &World, species: Species) -> &Population {
        world.population(species)
    }

    /// Provides read-only access to the projectile pool.
    #[must_use]
    pub fn projectiles(world: &World) -> &ProjectilePool {
        &world.projectiles
    }

    /// Live counts of every species.
    #[must_use]
    pub fn population_counts(world: &World) -> PopulationCounts {
        PopulationCounts::new(std::array::from_fn(|index| world.populations[index].len()))
    }

    /// Captures the enemy stored at `enemy`, if the slot is live.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyRef) -> Option<EnemySnapshot> {
        world
            .population(enemy.species)
            .get(enemy.slot)
            .map(|member| EnemySnapshot {
                enemy,
                position: member.position(),
                health: member.health(),
                frame: member.frame(),
            })
    }

    /// Captures every live enemy in species order, then slot order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .populations
            .iter()
            .flat_map(|population| {
                let species = population.species();
                population
                    .iter()
                    .enumerate()
                    .map(move |(slot, member)| EnemySnapshot {
                        enemy: EnemyRef::new(species, slot),
                        position: member.position(),
                        health: member.health(),
                        frame: member.frame(),
                    })
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures every active projectile in slot order.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots = world
            .projectiles
            .iter()
            .filter(|(_, projectile)| projectile.is_active())
            .map(|(slot, projectile)| ProjectileSnapshot {
                slot,
                position: projectile.position(),
                direction: projectile.direction(),
                damage: projectile.damage(),
                origin: projectile.origin(),
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Persisted fields of every live enemy of `species`, in slot order.
    #[must_use]
    pub fn enemy_records(world: &World, species: Species) -> Vec<EnemyRecord> {
        world.population(species).iter().map(|enemy| enemy.record()).collect()
    }

    /// Persisted fields of every projectile slot, in pool order.
    #[must_use]
    pub fn projectile_records(world: &World) -> Vec<Option<ProjectileRecord>> {
        world
            .projectiles
            .iter()
            .map(|(_, projectile)| projectile.record())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::{HeroRecord, ProjectileOrigin, Vec2, WorldMode};

    #[derive(Debug, Default)]
    struct StubHero {
        record: HeroRecord,
    }

    impl Damageable for StubHero {
        fn position(&self) -> Vec2 {
            self.record.position
        }

        fn health(&self) -> u32 {
            self.record.health
        }

        fn take_damage(&mut self, amount: u32) {
            self.record.health = self.record.health.saturating_sub(amount);
        }
    }

    impl HeroFacade for StubHero {
        fn credit_score(&mut self, amount: u32) {
            self.record.score += amount;
        }

        fn record(&self) -> HeroRecord {
            self.record
        }

        fn restore(&mut self, record: HeroRecord) {
            self.record = record;
        }
    }

    #[test]
    fn tick_removes_fallen_and_credits_bounties() {
        let mut world = World::with_projectile_capacity(4);
        let mut hero = StubHero::default();
        let mut events = Vec::new();
        for species in Species::ALL {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    species,
                    position: Vec2::new(600.0, 600.0),
                },
                &mut hero,
                &mut events,
            );
            apply(
                &mut world,
                Command::DamageEnemy {
                    enemy: EnemyRef::new(species, 0),
                    amount: 1_000,
                },
                &mut hero,
                &mut events,
            );
        }

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: 0.016,
                mode: WorldMode::Finite,
            },
            &mut hero,
            &mut events,
        );

        assert_eq!(query::population_counts(&world).total(), 0);
        assert_eq!(hero.record.score, 100 + 200 + 50 + 250);
        let slain = events
            .iter()
            .filter(|event| matches!(event, Event::EnemySlain { .. }))
            .count();
        assert_eq!(slain, 4);
    }

    #[test]
    fn fallen_enemies_do_not_fire() {
        let mut world = World::with_projectile_capacity(4);
        let mut hero = StubHero::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                species: Species::Musketeer,
                position: Vec2::new(100.0, 100.0),
            },
            &mut hero,
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy: EnemyRef::new(Species::Musketeer, 0),
                amount: 250,
            },
            &mut hero,
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: 3.5,
                mode: WorldMode::Infinite,
            },
            &mut hero,
            &mut events,
        );
        assert_eq!(query::projectiles(&world).active_count(), 0);
    }

    #[test]
    fn ranged_attacks_enter_the_pool_during_tick() {
        let mut world = World::with_projectile_capacity(4);
        let mut hero = StubHero::default();
        hero.record.health = 100;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                species: Species::Musketeer,
                position: Vec2::new(300.0, 300.0),
            },
            &mut hero,
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: 3.0,
                mode: WorldMode::Finite,
            },
            &mut hero,
            &mut events,
        );

        let view = query::projectile_view(&world);
        assert_eq!(view.len(), 1);
        let projectile = view.iter().next().expect("one projectile");
        assert_eq!(projectile.origin, ProjectileOrigin::Enemy);
        assert_eq!(projectile.damage, 30);
        assert!(events.contains(&Event::ProjectileLaunched {
            slot: ProjectileSlot::new(0),
            origin: ProjectileOrigin::Enemy,
        }));
    }

    #[test]
    fn damage_to_missing_slot_is_ignored() {
        let mut world = World::with_projectile_capacity(1);
        let mut hero = StubHero::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy: EnemyRef::new(Species::Slime, 3),
                amount: 10,
            },
            &mut hero,
            &mut events,
        );
        assert!(events.is_empty());
    }
}
