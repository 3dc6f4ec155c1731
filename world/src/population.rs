//! Capacity-bounded ownership collection for a single species.

use survivor_core::{Damageable, Species, SPECIES_CAPACITY};

use crate::Enemy;

/// Live enemies of one species, compacted with swap-remove.
///
/// Slots are dense: `0..len()` are always live members. Removing a member
/// moves the last member into the freed slot, so slot indices are not stable
/// across removals.
#[derive(Clone, Debug)]
pub struct Population {
    species: Species,
    members: Vec<Enemy>,
    capacity: usize,
}

impl Population {
    /// Creates an empty population using the default species capacity.
    #[must_use]
    pub fn new(species: Species) -> Self {
        Self::with_capacity(species, SPECIES_CAPACITY)
    }

    /// Creates an empty population holding at most `capacity` members.
    #[must_use]
    pub fn with_capacity(species: Species, capacity: usize) -> Self {
        Self {
            species,
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Species stored in this population.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.species
    }

    /// Number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Reports whether no members are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Maximum number of live members.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reports whether further inserts will be refused.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    /// Adds a member, returning its slot, or hands it back when full.
    pub fn insert(&mut self, enemy: Enemy) -> Result<usize, Enemy> {
        if self.is_full() {
            return Err(enemy);
        }
        self.members.push(enemy);
        Ok(self.members.len() - 1)
    }

    /// Member at `slot`, if live.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Enemy> {
        self.members.get(slot)
    }

    /// Mutable member at `slot`, if live.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Enemy> {
        self.members.get_mut(slot)
    }

    /// Live members in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.members.iter()
    }

    /// Mutable live members in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.members.iter_mut()
    }

    /// Removes every fallen member, invoking `on_removed` for each one.
    ///
    /// Returns the number of members removed. A member swapped into a freed
    /// slot is examined before the scan moves on.
    pub fn compact_fallen(&mut self, mut on_removed: impl FnMut(&Enemy)) -> usize {
        let mut removed = 0;
        let mut slot = 0;
        while slot < self.members.len() {
            if self.members[slot].is_dead() {
                let fallen = self.members.swap_remove(slot);
                on_removed(&fallen);
                removed += 1;
            } else {
                slot += 1;
            }
        }
        removed
    }

    /// Drops every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}
