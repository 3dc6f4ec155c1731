//! Fixed-capacity projectile pool with first-fit slot reuse.

use survivor_core::{
    direction_between, ProjectileOrigin, ProjectileRecord, ProjectileRequest, ProjectileSlot, Vec2,
    WorldMode, PROJECTILE_CAPACITY, PROJECTILE_SPEED, WORLD_HEIGHT, WORLD_WIDTH,
};

const DIRECTION_EPSILON: f32 = 0.001;

/// Simple kinematic bullet. Only active projectiles carry meaningful state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    position: Vec2,
    direction: Vec2,
    speed: f32,
    damage: u32,
    origin: ProjectileOrigin,
    active: bool,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::ZERO,
            speed: PROJECTILE_SPEED,
            damage: 0,
            origin: ProjectileOrigin::Enemy,
            active: false,
        }
    }
}

impl Projectile {
    /// Reports whether the projectile is in flight.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current center of the projectile.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Unit travel direction, or zero for a degenerate launch.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Damage applied on impact.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Side that fired the projectile.
    #[must_use]
    pub const fn origin(&self) -> ProjectileOrigin {
        self.origin
    }

    /// Starts flight from `request.source` toward `request.target`.
    pub fn launch(&mut self, request: ProjectileRequest) {
        *self = Self {
            position: request.source,
            direction: direction_between(request.source, request.target, DIRECTION_EPSILON),
            speed: PROJECTILE_SPEED,
            damage: request.damage,
            origin: request.origin,
            active: true,
        };
    }

    /// Moves the projectile; returns `true` when it left a bounded world.
    pub fn advance(&mut self, dt: f32, mode: WorldMode) -> bool {
        if !self.active {
            return false;
        }

        self.position += self.direction * self.speed * dt;

        if mode.is_infinite() {
            return false;
        }

        let Vec2 { x, y } = self.position;
        if x < 0.0 || y < 0.0 || x > WORLD_WIDTH || y > WORLD_HEIGHT {
            self.active = false;
            return true;
        }
        false
    }

    /// Returns the projectile to the inactive state.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Captures the persisted fields of an active projectile.
    #[must_use]
    pub fn record(&self) -> Option<ProjectileRecord> {
        self.active.then_some(ProjectileRecord {
            position: self.position,
            direction: self.direction,
            damage: self.damage,
            origin: self.origin,
        })
    }

    /// Rebuilds a slot from its persisted fields.
    #[must_use]
    pub fn from_record(record: Option<ProjectileRecord>) -> Self {
        match record {
            Some(record) => Self {
                position: record.position,
                direction: record.direction,
                speed: PROJECTILE_SPEED,
                damage: record.damage,
                origin: record.origin,
                active: true,
            },
            None => Self::default(),
        }
    }
}

/// Pre-allocated projectile slots.
///
/// The pool never grows after construction. Launches reuse the first
/// inactive slot; when every slot is active the launch is dropped.
#[derive(Clone, Debug)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
}

impl Default for ProjectilePool {
    fn default() -> Self {
        Self::with_capacity(PROJECTILE_CAPACITY)
    }
}

impl ProjectilePool {
    /// Allocates `capacity` inactive slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Projectile::default(); capacity],
        }
    }

    /// Number of slots, active or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Launches into the first inactive slot, if any.
    pub fn launch(&mut self, request: ProjectileRequest) -> Option<ProjectileSlot> {
        let index = self.slots.iter().position(|slot| !slot.active)?;
        self.slots[index].launch(request);
        Some(ProjectileSlot::new(index))
    }

    /// Advances every active projectile, reporting slots that left the world.
    pub fn advance_all(&mut self, dt: f32, mode: WorldMode, expired: &mut Vec<ProjectileSlot>) {
        for (index, projectile) in self.slots.iter_mut().enumerate() {
            if projectile.advance(dt, mode) {
                expired.push(ProjectileSlot::new(index));
            }
        }
    }

    /// Projectile stored at `slot`.
    #[must_use]
    pub fn get(&self, slot: ProjectileSlot) -> Option<&Projectile> {
        self.slots.get(slot.get())
    }

    /// Deactivates `slot`; returns whether it was active.
    pub fn deactivate(&mut self, slot: ProjectileSlot) -> bool {
        match self.slots.get_mut(slot.get()) {
            Some(projectile) if projectile.active => {
                projectile.deactivate();
                true
            }
            _ => false,
        }
    }

    /// Every slot in pool order, including inactive ones.
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileSlot, &Projectile)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, projectile)| (ProjectileSlot::new(index), projectile))
    }

    /// Deactivates every slot.
    pub fn clear(&mut self) {
        for projectile in &mut self.slots {
            projectile.deactivate();
        }
    }

    /// Replaces every slot from persisted records in pool order.
    ///
    /// Records beyond the pool capacity are ignored and missing records leave
    /// slots inactive.
    pub fn restore(&mut self, records: &[Option<ProjectileRecord>]) {
        for (index, projectile) in self.slots.iter_mut().enumerate() {
            *projectile = Projectile::from_record(records.get(index).copied().flatten());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(source: Vec2, target: Vec2) -> ProjectileRequest {
        ProjectileRequest {
            source,
            target,
            damage: 100,
            origin: ProjectileOrigin::Hero,
        }
    }

    #[test]
    fn launch_reuses_first_inactive_slot() {
        let mut pool = ProjectilePool::with_capacity(3);
        let first = pool.launch(request(Vec2::ZERO, Vec2::X)).expect("slot available");
        let second = pool.launch(request(Vec2::ZERO, Vec2::X)).expect("slot available");
        assert_eq!((first.get(), second.get()), (0, 1));

        assert!(pool.deactivate(first));
        let reused = pool.launch(request(Vec2::ZERO, Vec2::Y)).expect("slot available");
        assert_eq!(reused.get(), 0);
        assert_eq!(pool.capacity(), 3);
    }

    #[test]
    fn full_pool_ignores_launches() {
        let mut pool = ProjectilePool::with_capacity(2);
        assert!(pool.launch(request(Vec2::ZERO, Vec2::X)).is_some());
        assert!(pool.launch(request(Vec2::ZERO, Vec2::Y)).is_some());
        let before: Vec<Projectile> = pool.iter().map(|(_, projectile)| *projectile).collect();

        assert!(pool.launch(request(Vec2::ONE, Vec2::ZERO)).is_none());

        let after: Vec<Projectile> = pool.iter().map(|(_, projectile)| *projectile).collect();
        assert_eq!(before, after);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn degenerate_launch_stays_in_place() {
        let mut projectile = Projectile::default();
        projectile.launch(request(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)));
        assert_eq!(projectile.direction(), Vec2::ZERO);
        assert!(!projectile.advance(1.0, WorldMode::Finite));
        assert_eq!(projectile.position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn bounded_world_expires_projectiles_at_the_edge() {
        let mut pool = ProjectilePool::with_capacity(1);
        let slot = pool
            .launch(request(Vec2::new(10.0, 10.0), Vec2::new(-10.0, 10.0)))
            .expect("slot available");
        let mut expired = Vec::new();
        pool.advance_all(0.2, WorldMode::Finite, &mut expired);
        assert_eq!(expired, vec![slot]);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn wrapping_world_keeps_projectiles_alive() {
        let mut pool = ProjectilePool::with_capacity(1);
        let _ = pool.launch(request(Vec2::new(10.0, 10.0), Vec2::new(-10.0, 10.0)));
        let mut expired = Vec::new();
        pool.advance_all(5.0, WorldMode::Infinite, &mut expired);
        assert!(expired.is_empty());
        assert_eq!(pool.active_count(), 1);
    }
}
