use std::collections::BTreeMap;

use super::Tick;
use super::snapshot::WorldSnapshot;
use crate::world::World;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("no snapshot stored for tick {0}")]
    UnknownTick(Tick),
}

/// Tick-ordered history of world snapshots. Capturing at an occupied tick
/// overwrites: resync replays re-capture the corrected timeline over the
/// stale one, so overwrite is the contract, not an accident.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    states: BTreeMap<Tick, WorldSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(&mut self, tick: Tick, world: &World) {
        self.states.insert(tick, WorldSnapshot::capture(tick, world));
    }

    pub fn get(&self, tick: Tick) -> Result<&WorldSnapshot, StoreError> {
        self.states.get(&tick).ok_or(StoreError::UnknownTick(tick))
    }

    pub fn contains(&self, tick: Tick) -> bool {
        self.states.contains_key(&tick)
    }

    /// Installs `snapshot` at `tick` and drops every strictly newer entry;
    /// the store never holds stale future snapshots past a correction point.
    pub fn replace_from(&mut self, tick: Tick, snapshot: WorldSnapshot) {
        self.states.split_off(&tick);
        self.states.insert(tick, snapshot);
    }

    /// Drops entries older than `tick`, bounding the history window.
    pub fn prune_below(&mut self, tick: Tick) {
        self.states = self.states.split_off(&tick);
    }

    pub fn latest(&self) -> Option<&WorldSnapshot> {
        self.states.values().next_back()
    }

    pub fn oldest_tick(&self) -> Option<Tick> {
        self.states.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::combat::Weapon;

    fn world_with_fighter(health: u32) -> World {
        let mut world = World::new();
        let id = world.spawn_combatant(1, Vec2::ZERO, Weapon::player_sword());
        world.combat.get_mut(id).unwrap().health = health;
        world
    }

    fn filled_store(range: std::ops::RangeInclusive<Tick>) -> SnapshotStore {
        let world = world_with_fighter(100);
        let mut store = SnapshotStore::new();
        for tick in range {
            store.capture(tick, &world);
        }
        store
    }

    #[test]
    fn get_unknown_tick_fails() {
        let store = filled_store(10..=20);
        assert!(store.get(15).is_ok());
        assert_eq!(store.get(25), Err(StoreError::UnknownTick(25)));
    }

    #[test]
    fn capture_overwrites_existing_tick() {
        let mut store = SnapshotStore::new();
        store.capture(5, &world_with_fighter(100));
        store.capture(5, &world_with_fighter(40));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(5).unwrap().entities[0].health, 40);
    }

    #[test]
    fn replace_from_drops_newer_history() {
        let mut store = filled_store(10..=20);

        let replacement = WorldSnapshot::capture(14, &world_with_fighter(77));
        store.replace_from(14, replacement.clone());

        let ticks: Vec<Tick> = store.states.keys().copied().collect();
        assert_eq!(ticks, vec![10, 11, 12, 13, 14]);
        assert_eq!(store.get(14).unwrap(), &replacement);
    }

    #[test]
    fn prune_below_keeps_window() {
        let mut store = filled_store(10..=20);
        store.prune_below(16);

        assert_eq!(store.oldest_tick(), Some(16));
        assert_eq!(store.len(), 5);
        assert_eq!(store.get(12), Err(StoreError::UnknownTick(12)));
    }

    #[test]
    fn latest_is_highest_tick() {
        let store = filled_store(10..=20);
        assert_eq!(store.latest().map(|s| s.tick), Some(20));
    }
}
