use std::collections::{BTreeSet, HashMap};

use super::attack::AttackPhase;
use super::component::CombatComponent;
use crate::world::{EntityId, World};

/// Pairs further apart than this are skipped before any box test when the
/// range cache is enabled.
pub const RANGE_CHECK_DISTANCE: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEvent {
    HitLanded {
        attacker: EntityId,
        defender: EntityId,
        damage: u32,
    },
    AttackCancelled {
        defender: EntityId,
    },
    Death {
        entity: EntityId,
        killer: EntityId,
    },
}

/// Per-tick attack/hit/stun/freeze resolution over all combatants.
///
/// Iteration is in ascending entity id everywhere: the pair loop, the
/// cancellation set, and the state advance all use the pool's ordered
/// iteration, so a replay from the same snapshot revisits pairs in the same
/// order and produces identical state.
pub struct CombatSystem {
    range_cache: HashMap<(EntityId, EntityId), bool>,
    range_cache_enabled: bool,
}

impl Default for CombatSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatSystem {
    pub fn new() -> Self {
        Self {
            range_cache: HashMap::new(),
            range_cache_enabled: true,
        }
    }

    pub fn set_range_cache_enabled(&mut self, enabled: bool) {
        self.range_cache_enabled = enabled;
    }

    /// Runs one combat tick. With `focus` set, only the focused entity's
    /// state advances and it is checked as attacker against everyone and as
    /// defender against everyone: the shape a client needs to re-simulate one
    /// local actor against remote state without touching remote timers.
    pub fn resolve_tick(&mut self, world: &mut World, focus: Option<EntityId>) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        let ids = world.combat.ids();

        match focus {
            None => {
                for &id in &ids {
                    Self::update_state(world, id);
                }
            }
            Some(f) => {
                if world.combat.contains(f) {
                    Self::update_state(world, f);
                }
            }
        }

        let mut stunned = BTreeSet::new();
        match focus {
            None => {
                for &attacker in &ids {
                    for &defender in &ids {
                        self.attack_check(world, attacker, defender, &mut events);
                        if Self::is_stunned(world, defender) {
                            stunned.insert(defender);
                        }
                    }
                }
            }
            Some(f) => {
                for &attacker in &ids {
                    if attacker == f {
                        for &defender in &ids {
                            self.attack_check(world, f, defender, &mut events);
                            if Self::is_stunned(world, defender) {
                                stunned.insert(defender);
                            }
                        }
                    } else {
                        self.attack_check(world, attacker, f, &mut events);
                        if Self::is_stunned(world, f) {
                            stunned.insert(f);
                        }
                    }
                }
            }
        }

        // A stunned combatant cannot continue a swing.
        for id in stunned {
            if let Some(combat) = world.combat.get_mut(id) {
                if combat.attack.phase() != AttackPhase::Idle {
                    combat.attack.cancel();
                    events.push(CombatEvent::AttackCancelled { defender: id });
                }
            }
        }

        // The cache memoizes within one tick only.
        self.range_cache.clear();
        events
    }

    fn is_stunned(world: &World, id: EntityId) -> bool {
        world.combat.get(id).is_some_and(CombatComponent::is_stunned)
    }

    fn update_state(world: &mut World, id: EntityId) {
        let Some(combat) = world.combat.get_mut(id) else {
            return;
        };
        let Some(body) = world.physics.get_mut(id) else {
            return;
        };

        combat.update_hurtboxes(body.pos);
        combat.tick_freeze();
        body.frozen = combat.is_frozen();

        if !combat.is_frozen() {
            combat.tick_stun();
            combat.regen_stamina();
            combat.attack.update(body.pos, body.facing);
        }
    }

    fn attack_check(
        &mut self,
        world: &mut World,
        attacker_id: EntityId,
        defender_id: EntityId,
        events: &mut Vec<CombatEvent>,
    ) {
        if attacker_id == defender_id {
            return;
        }
        if self.range_cache_enabled && !self.within_range(world, attacker_id, defender_id) {
            return;
        }

        // The attacker leaves the pool for the duration of the check so both
        // sides can be mutated; it is always re-attached below.
        let Some(mut attacker) = world.combat.remove(attacker_id) else {
            return;
        };
        Self::check_pair(&mut attacker, attacker_id, defender_id, world, events);
        world.combat.attach(attacker_id, attacker);
    }

    fn check_pair(
        attacker: &mut CombatComponent,
        attacker_id: EntityId,
        defender_id: EntityId,
        world: &mut World,
        events: &mut Vec<CombatEvent>,
    ) {
        let Some(defender) = world.combat.get_mut(defender_id) else {
            return;
        };
        if !defender.is_alive() {
            return;
        }
        if attacker.team_id == 0 || defender.team_id == 0 || attacker.team_id == defender.team_id {
            return;
        }

        let changed = attacker.attack.poll_change();
        if changed {
            attacker.attack.clear_hits();
            // Full cost if affordable, otherwise everything that is left.
            let cost = attacker.stamina_cost().min(attacker.stamina);
            attacker.use_stamina(cost);
        }

        if !changed && attacker.attack.has_hit(defender_id) {
            return;
        }
        let Some(hitbox) = attacker.attack.active_hitbox().copied() else {
            return;
        };
        if !hitbox.intersects(&defender.bounding_box()) {
            return;
        }

        // At most one hit per attacker-defender pair per tick: the first
        // overlapping hurtbox lands it, further overlaps are ignored.
        if defender.hurtboxes.iter().any(|h| h.area.intersects(&hitbox)) {
            let damage = attacker.roll_damage();
            defender.damage(damage);
            defender.stun(attacker.stats.stun_frames + attacker.attack.remaining_active_frames());
            defender.last_attacker = Some(attacker_id);
            events.push(CombatEvent::HitLanded {
                attacker: attacker_id,
                defender: defender_id,
                damage,
            });
            log::debug!("entity {attacker_id} hit entity {defender_id} for {damage}");

            attacker.attack.add_hit(defender_id);
            attacker.freeze();
            defender.freeze();

            if !defender.is_alive() {
                events.push(CombatEvent::Death {
                    entity: defender_id,
                    killer: attacker_id,
                });
            }
        }
    }

    fn within_range(&mut self, world: &World, a: EntityId, b: EntityId) -> bool {
        let key = (a.min(b), a.max(b));
        if let Some(&cached) = self.range_cache.get(&key) {
            return cached;
        }

        let result = match (world.physics.get(a), world.physics.get(b)) {
            (Some(pa), Some(pb)) => {
                pa.pos.distance_squared(pb.pos) <= RANGE_CHECK_DISTANCE * RANGE_CHECK_DISTANCE
            }
            // Without position data there is nothing to gate on.
            _ => true,
        };
        self.range_cache.insert(key, result);
        result
    }
}
