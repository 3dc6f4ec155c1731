#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves contact and projectile collisions each tick.

use survivor_core::{
    circles_overlap, Command, EnemySnapshot, EnemyView, ProjectileOrigin, ProjectileSnapshot,
    ProjectileView, Vec2, ENEMY_HIT_RADIUS, HERO_HIT_RADIUS, HIT_CENTER_OFFSET,
    PROJECTILE_HIT_RADIUS,
};

/// Collision resolver that emits damage and deactivation commands.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves hero contact first, then projectile impacts.
    ///
    /// Every hero/enemy overlap emits a `DamageHero` immediately followed by
    /// a `DamageEnemy`, so both sides are hurt in the same tick. Every active
    /// projectile hits at most one target; hero projectiles test enemies in
    /// view order (species, then slot).
    pub fn handle(
        &mut self,
        hero_position: Vec2,
        enemies: &EnemyView,
        projectiles: &ProjectileView,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        let hero_center = hero_position + HIT_CENTER_OFFSET;
        for enemy in enemies.iter() {
            if touches_hero(hero_center, enemy) {
                let species = enemy.species();
                self.scratch.push(Command::DamageHero {
                    amount: species.contact_damage(),
                });
                self.scratch.push(Command::DamageEnemy {
                    enemy: enemy.enemy,
                    amount: species.recoil_damage(),
                });
            }
        }

        for projectile in projectiles.iter() {
            match projectile.origin {
                ProjectileOrigin::Hero => {
                    let struck = enemies
                        .iter()
                        .find(|enemy| strikes(projectile, enemy.hit_center()));
                    if let Some(enemy) = struck {
                        self.scratch.push(Command::DamageEnemy {
                            enemy: enemy.enemy,
                            amount: projectile.damage,
                        });
                        self.scratch.push(Command::DeactivateProjectile {
                            slot: projectile.slot,
                        });
                    }
                }
                ProjectileOrigin::Enemy => {
                    if strikes(projectile, hero_center) {
                        self.scratch.push(Command::DamageHero {
                            amount: projectile.damage,
                        });
                        self.scratch.push(Command::DeactivateProjectile {
                            slot: projectile.slot,
                        });
                    }
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn touches_hero(hero_center: Vec2, enemy: &EnemySnapshot) -> bool {
    circles_overlap(hero_center, HERO_HIT_RADIUS, enemy.hit_center(), ENEMY_HIT_RADIUS)
}

fn strikes(projectile: &ProjectileSnapshot, center: Vec2) -> bool {
    circles_overlap(projectile.position, PROJECTILE_HIT_RADIUS, center, ENEMY_HIT_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survivor_core::{EnemyRef, ProjectileSlot, Species};

    fn enemy(species: Species, slot: usize, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            enemy: EnemyRef::new(species, slot),
            position,
            health: species.starting_health(),
            frame: 0,
        }
    }

    fn projectile(slot: usize, position: Vec2, origin: ProjectileOrigin) -> ProjectileSnapshot {
        ProjectileSnapshot {
            slot: ProjectileSlot::new(slot),
            position,
            direction: Vec2::X,
            damage: 100,
            origin,
        }
    }

    #[test]
    fn contact_hurts_both_sides() {
        let mut combat = Combat::new();
        let hero = Vec2::new(200.0, 200.0);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(Species::HeavyGoblin, 0, Vec2::new(210.0, 200.0)),
            enemy(Species::Slime, 0, Vec2::new(600.0, 600.0)),
        ]);
        let mut out = Vec::new();

        combat.handle(hero, &enemies, &ProjectileView::default(), &mut out);

        assert_eq!(
            out,
            vec![
                Command::DamageHero { amount: 20 },
                Command::DamageEnemy {
                    enemy: EnemyRef::new(Species::HeavyGoblin, 0),
                    amount: 40,
                },
            ]
        );
    }

    #[test]
    fn overlapping_enemies_each_deal_damage() {
        let mut combat = Combat::new();
        let hero = Vec2::new(200.0, 200.0);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(Species::Goblin, 0, hero),
            enemy(Species::Goblin, 1, hero),
        ]);
        let mut out = Vec::new();

        combat.handle(hero, &enemies, &ProjectileView::default(), &mut out);

        let hero_hits = out
            .iter()
            .filter(|command| matches!(command, Command::DamageHero { amount: 10 }))
            .count();
        assert_eq!(hero_hits, 2);
    }

    #[test]
    fn hero_projectile_hits_first_species_in_priority_order() {
        let mut combat = Combat::new();
        let spot = Vec2::new(500.0, 500.0);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(Species::Musketeer, 0, spot),
            enemy(Species::Slime, 0, spot),
            enemy(Species::HeavyGoblin, 0, spot),
        ]);
        let projectiles = ProjectileView::from_snapshots(vec![projectile(
            7,
            spot + HIT_CENTER_OFFSET,
            ProjectileOrigin::Hero,
        )]);
        let mut out = Vec::new();

        combat.handle(Vec2::ZERO, &enemies, &projectiles, &mut out);

        assert_eq!(
            out,
            vec![
                Command::DamageEnemy {
                    enemy: EnemyRef::new(Species::HeavyGoblin, 0),
                    amount: 100,
                },
                Command::DeactivateProjectile {
                    slot: ProjectileSlot::new(7),
                },
            ]
        );
    }

    #[test]
    fn enemy_projectiles_only_hit_the_hero() {
        let mut combat = Combat::new();
        let hero = Vec2::new(100.0, 100.0);
        let enemies = EnemyView::from_snapshots(vec![enemy(
            Species::Goblin,
            0,
            Vec2::new(300.0, 300.0),
        )]);
        let projectiles = ProjectileView::from_snapshots(vec![
            projectile(0, Vec2::new(316.0, 322.0), ProjectileOrigin::Enemy),
            projectile(1, hero + HIT_CENTER_OFFSET, ProjectileOrigin::Enemy),
        ]);
        let mut out = Vec::new();

        combat.handle(hero, &enemies, &projectiles, &mut out);

        assert_eq!(
            out,
            vec![
                Command::DamageHero { amount: 100 },
                Command::DeactivateProjectile {
                    slot: ProjectileSlot::new(1),
                },
            ]
        );
    }

    #[test]
    fn quiet_frame_emits_nothing() {
        let mut combat = Combat::new();
        let mut out = Vec::new();
        combat.handle(
            Vec2::ZERO,
            &EnemyView::default(),
            &ProjectileView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
