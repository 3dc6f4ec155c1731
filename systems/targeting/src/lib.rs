#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure target selection for the hero's attacks.
//!
//! Both queries measure from the hero's top-left corner to each enemy's
//! top-left corner and walk the enemy view in species order, then slot order.

use survivor_core::{Command, EnemySnapshot, EnemyView, Vec2};

/// Radius of the area attack measured from the hero's position.
pub const AREA_STRIKE_RANGE: f32 = 200.0;

/// Maximum number of enemies a single area attack damages.
pub const AREA_STRIKE_TARGETS: usize = 5;

/// Target selector that reuses a scratch buffer between area attacks.
#[derive(Debug, Default)]
pub struct Targeting {
    ranked: Vec<EnemySnapshot>,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest live enemy strictly closer than `max_range` to `origin`.
    ///
    /// The first enemy found wins ties.
    #[must_use]
    pub fn closest(enemies: &EnemyView, origin: Vec2, max_range: f32) -> Option<EnemySnapshot> {
        let mut best: Option<EnemySnapshot> = None;
        let mut best_distance = max_range;
        for enemy in enemies.iter() {
            let distance = origin.distance(enemy.position);
            if distance < best_distance {
                best_distance = distance;
                best = Some(*enemy);
            }
        }
        best
    }

    /// Emits `DamageEnemy` for the healthiest enemies around `origin`.
    ///
    /// Enemies are ranked by descending health with ties kept in view order.
    /// Walking the ranking, up to [`AREA_STRIKE_TARGETS`] enemies within
    /// [`AREA_STRIKE_RANGE`] are damaged; enemies out of range are skipped
    /// without using up a target.
    pub fn top_health_targets(
        &mut self,
        enemies: &EnemyView,
        origin: Vec2,
        damage: u32,
        out: &mut Vec<Command>,
    ) {
        self.ranked.clear();
        self.ranked.extend(enemies.iter().copied());
        self.ranked
            .sort_by(|left, right| right.health.cmp(&left.health));

        let range_sq = AREA_STRIKE_RANGE * AREA_STRIKE_RANGE;
        let targets = self
            .ranked
            .iter()
            .filter(|enemy| origin.distance_squared(enemy.position) <= range_sq)
            .take(AREA_STRIKE_TARGETS);
        for enemy in targets {
            out.push(Command::DamageEnemy {
                enemy: enemy.enemy,
                amount: damage,
            });
        }
    }
}
