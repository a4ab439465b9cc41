use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attack::Attack;
use super::weapon::Weapon;
use crate::geom::Aabb;
use crate::world::EntityId;

/// Hit-stop window applied to both parties when a hit lands, in ticks.
pub const FREEZE_FRAMES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_health: u32,
    pub max_stamina: u32,
    pub base_damage: u32,
    /// Stun applied on hit, before the attack's remaining active frames are
    /// added.
    pub stun_frames: u32,
    pub stamina_regen: u32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_stamina: 100,
            base_damage: 25,
            stun_frames: 30,
            stamina_regen: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hurtbox {
    pub offset: Vec2,
    pub area: Aabb,
}

impl Hurtbox {
    pub fn new(offset: Vec2, size: Vec2) -> Self {
        Self {
            offset,
            area: Aabb::new(offset, size),
        }
    }
}

/// Per-combatant fighting state. Team id 0 is neutral: it neither deals nor
/// receives damage. Health and stamina are clamped, never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatComponent {
    pub health: u32,
    pub stamina: u32,
    pub team_id: u32,
    pub stun_frames: u32,
    pub freeze_frames: u32,
    pub stats: CombatStats,
    pub attack: Attack,
    pub hurtboxes: Vec<Hurtbox>,
    pub last_attacker: Option<EntityId>,
}

impl CombatComponent {
    pub fn new(team_id: u32, stats: CombatStats, weapon: Weapon) -> Self {
        Self {
            health: stats.max_health,
            stamina: stats.max_stamina,
            team_id,
            stun_frames: 0,
            freeze_frames: 0,
            stats,
            attack: Attack::new(weapon),
            hurtboxes: Vec::new(),
            last_attacker: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_frames > 0
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_frames > 0
    }

    pub fn damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn stun(&mut self, frames: u32) {
        self.stun_frames = frames;
    }

    pub fn freeze(&mut self) {
        self.freeze_frames = FREEZE_FRAMES;
    }

    pub fn tick_freeze(&mut self) {
        self.freeze_frames = self.freeze_frames.saturating_sub(1);
    }

    pub fn tick_stun(&mut self) {
        self.stun_frames = self.stun_frames.saturating_sub(1);
    }

    pub fn regen_stamina(&mut self) {
        self.stamina = (self.stamina + self.stats.stamina_regen).min(self.stats.max_stamina);
    }

    /// Consumption clamps to what is available; stamina never underflows.
    pub fn use_stamina(&mut self, amount: u32) {
        self.stamina = self.stamina.saturating_sub(amount);
    }

    pub fn stamina_cost(&self) -> u32 {
        self.attack.weapon().stamina_cost
    }

    /// Deterministic damage roll: a pure function of stats, never a wall
    /// clock or RNG, so replay reproduces it bit-for-bit.
    pub fn roll_damage(&self) -> u32 {
        self.stats.base_damage
    }

    pub fn update_hurtboxes(&mut self, pos: Vec2) {
        for hurtbox in &mut self.hurtboxes {
            hurtbox.area.pos = pos + hurtbox.offset;
        }
    }

    /// Union of the hurtboxes in their current world placement; the coarse
    /// gate before per-hurtbox tests.
    pub fn bounding_box(&self) -> Aabb {
        let mut boxes = self.hurtboxes.iter().map(|h| h.area);
        let Some(first) = boxes.next() else {
            return Aabb::default();
        };
        boxes.fold(first, |acc, b| acc.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combatant() -> CombatComponent {
        let mut c = CombatComponent::new(1, CombatStats::default(), Weapon::player_sword());
        c.hurtboxes.push(Hurtbox::new(Vec2::new(-2.0, -20.0), Vec2::new(4.0, 20.0)));
        c
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut c = combatant();
        c.damage(40);
        assert_eq!(c.health, 60);
        c.damage(1000);
        assert_eq!(c.health, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn stamina_clamps_both_ways() {
        let mut c = combatant();
        c.use_stamina(250);
        assert_eq!(c.stamina, 0);

        for _ in 0..500 {
            c.regen_stamina();
        }
        assert_eq!(c.stamina, c.stats.max_stamina);
    }

    #[test]
    fn hurtboxes_follow_position() {
        let mut c = combatant();
        c.update_hurtboxes(Vec2::new(50.0, 10.0));

        assert_eq!(c.hurtboxes[0].area.pos, Vec2::new(48.0, -10.0));
        let bounds = c.bounding_box();
        assert_eq!(bounds.pos, Vec2::new(48.0, -10.0));
        assert_eq!(bounds.res, Vec2::new(4.0, 20.0));
    }

    #[test]
    fn freeze_and_stun_count_down() {
        let mut c = combatant();
        c.freeze();
        c.stun(2);
        assert!(c.is_frozen());
        assert!(c.is_stunned());

        for _ in 0..FREEZE_FRAMES {
            c.tick_freeze();
        }
        assert!(!c.is_frozen());

        c.tick_stun();
        c.tick_stun();
        assert!(!c.is_stunned());
        c.tick_stun();
        assert_eq!(c.stun_frames, 0);
    }
}
