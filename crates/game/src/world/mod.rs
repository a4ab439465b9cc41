mod store;

pub use store::{EntityId, Pool};

use glam::Vec2;

use crate::combat::{CombatComponent, CombatStats, Hurtbox, Weapon};
use crate::geom::Aabb;
use crate::physics::PhysicsComponent;
use crate::player::ControllerComponent;
use crate::zone::CapturePoint;

/// The entity/component store. Passed by reference into every system; there
/// is no global pool.
#[derive(Debug)]
pub struct World {
    next_entity_id: EntityId,
    pub combat: Pool<CombatComponent>,
    pub physics: Pool<PhysicsComponent>,
    pub controller: Pool<ControllerComponent>,
    pub zones: Pool<CapturePoint>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            next_entity_id: 1,
            combat: Pool::new(),
            physics: Pool::new(),
            controller: Pool::new(),
            zones: Pool::new(),
        }
    }

    pub fn spawn_entity(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn gen_entities(&mut self, count: usize) -> Vec<EntityId> {
        (0..count).map(|_| self.spawn_entity()).collect()
    }

    /// Spawns a fully equipped combatant: combat, physics, and controller
    /// components with the standard hurtbox layout.
    pub fn spawn_combatant(&mut self, team_id: u32, spawn: Vec2, weapon: Weapon) -> EntityId {
        let id = self.spawn_entity();

        let mut combat = CombatComponent::new(team_id, CombatStats::default(), weapon);
        combat.hurtboxes.push(Hurtbox::new(
            Vec2::new(-2.0, -20.0),
            Vec2::new(4.0, 20.0),
        ));
        combat.update_hurtboxes(spawn);

        self.combat.attach(id, combat);
        self.physics.attach(id, PhysicsComponent::new(spawn));
        self.controller.attach(id, ControllerComponent::default());

        id
    }

    pub fn spawn_capture_point(&mut self, zone_id: u32, area: Aabb, total_time: f32) -> EntityId {
        let id = self.spawn_entity();
        self.zones.attach(id, CapturePoint::new(zone_id, area, total_time));
        id
    }

    pub fn despawn(&mut self, id: EntityId) {
        self.combat.remove(id);
        self.physics.remove(id);
        self.controller.remove(id);
        self.zones.remove(id);
    }

    pub fn entity_count(&self) -> usize {
        self.combat.len().max(self.physics.len()).max(self.zones.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_unique() {
        let mut world = World::new();
        let ids = world.gen_entities(4);

        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn spawn_combatant_attaches_components() {
        let mut world = World::new();
        let id = world.spawn_combatant(1, Vec2::new(10.0, 0.0), Weapon::player_sword());

        assert!(world.combat.contains(id));
        assert!(world.physics.contains(id));
        assert!(world.controller.contains(id));
        assert_eq!(world.combat.get(id).map(|c| c.health), Some(100));
    }

    #[test]
    fn despawn_clears_all_pools() {
        let mut world = World::new();
        let id = world.spawn_combatant(1, Vec2::ZERO, Weapon::player_sword());
        world.despawn(id);

        assert!(!world.combat.contains(id));
        assert!(!world.physics.contains(id));
        assert!(!world.controller.contains(id));
    }
}
