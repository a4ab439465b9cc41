use std::collections::BTreeSet;

use glam::Vec2;

use super::weapon::Weapon;
use crate::geom::Aabb;
use crate::physics::Facing;
use crate::world::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AttackPhase {
    #[default]
    Idle = 0,
    Startup = 1,
    Active = 2,
    Recovery = 3,
}

impl From<u8> for AttackPhase {
    fn from(value: u8) -> Self {
        match value {
            1 => AttackPhase::Startup,
            2 => AttackPhase::Active,
            3 => AttackPhase::Recovery,
            _ => AttackPhase::Idle,
        }
    }
}

/// One combatant's attack state machine. Owned exclusively by its combat
/// component; the hit registry guarantees a swing damages a target at most
/// once until the swing changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Attack {
    weapon: Weapon,
    phase: AttackPhase,
    frames_left: u32,
    swing: u32,
    changed: bool,
    hitbox: Option<Aabb>,
    hit_entities: BTreeSet<EntityId>,
}

impl Attack {
    pub fn new(weapon: Weapon) -> Self {
        Self {
            weapon,
            phase: AttackPhase::Idle,
            frames_left: 0,
            swing: 0,
            changed: false,
            hitbox: None,
            hit_entities: BTreeSet::new(),
        }
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    /// Swapping weapons cancels the current swing; the next swing uses the
    /// new frame data.
    pub fn set_weapon(&mut self, weapon: Weapon) {
        self.weapon = weapon;
        self.cancel();
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn frames_left(&self) -> u32 {
        self.frames_left
    }

    pub fn swing(&self) -> u32 {
        self.swing
    }

    pub fn start_swing(&mut self) -> bool {
        if self.phase != AttackPhase::Idle {
            return false;
        }
        self.phase = AttackPhase::Startup;
        self.frames_left = self.weapon.startup_frames;
        self.swing = self.swing.wrapping_add(1);
        self.changed = true;
        true
    }

    pub fn cancel(&mut self) {
        self.phase = AttackPhase::Idle;
        self.frames_left = 0;
        self.hitbox = None;
    }

    /// Edge flag: true exactly once after a swing change.
    pub fn poll_change(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Advances the state machine by one tick, placing the active hitbox
    /// from the owner's current position and facing.
    pub fn update(&mut self, pos: Vec2, facing: Facing) {
        match self.phase {
            AttackPhase::Idle => {
                self.hitbox = None;
            }
            AttackPhase::Startup => {
                self.frames_left = self.frames_left.saturating_sub(1);
                if self.frames_left == 0 {
                    self.phase = AttackPhase::Active;
                    self.frames_left = self.weapon.active_frames;
                    self.place_hitbox(pos, facing);
                }
            }
            AttackPhase::Active => {
                self.place_hitbox(pos, facing);
                self.frames_left = self.frames_left.saturating_sub(1);
                if self.frames_left == 0 {
                    self.phase = AttackPhase::Recovery;
                    self.frames_left = self.weapon.recovery_frames;
                    self.hitbox = None;
                }
            }
            AttackPhase::Recovery => {
                self.frames_left = self.frames_left.saturating_sub(1);
                if self.frames_left == 0 {
                    self.phase = AttackPhase::Idle;
                }
            }
        }
    }

    fn place_hitbox(&mut self, pos: Vec2, facing: Facing) {
        let offset = match facing {
            Facing::Right => self.weapon.offset,
            Facing::Left => Vec2::new(-self.weapon.offset.x - self.weapon.reach.x, self.weapon.offset.y),
        };
        self.hitbox = Some(Aabb::new(pos + offset, self.weapon.reach));
    }

    pub fn active_hitbox(&self) -> Option<&Aabb> {
        self.hitbox.as_ref()
    }

    pub fn remaining_active_frames(&self) -> u32 {
        if self.phase == AttackPhase::Active {
            self.frames_left
        } else {
            0
        }
    }

    pub fn has_hit(&self, id: EntityId) -> bool {
        self.hit_entities.contains(&id)
    }

    pub fn add_hit(&mut self, id: EntityId) {
        self.hit_entities.insert(id);
    }

    pub fn clear_hits(&mut self) {
        self.hit_entities.clear();
    }

    /// Restores the timer state captured in a snapshot. The hit registry and
    /// edge flag are conservatively reset; the hitbox is re-placed by the
    /// next resolver pass.
    pub fn restore(&mut self, phase: AttackPhase, frames_left: u32, swing: u32) {
        self.phase = phase;
        self.frames_left = frames_left;
        self.swing = swing;
        self.changed = false;
        self.hitbox = None;
        self.hit_entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword() -> Weapon {
        Weapon::player_sword()
    }

    #[test]
    fn swing_lifecycle() {
        let mut attack = Attack::new(sword());
        assert!(attack.start_swing());
        assert!(!attack.start_swing());
        assert_eq!(attack.phase(), AttackPhase::Startup);

        // startup = 2 ticks
        attack.update(Vec2::ZERO, Facing::Right);
        assert!(attack.active_hitbox().is_none());
        attack.update(Vec2::ZERO, Facing::Right);
        assert_eq!(attack.phase(), AttackPhase::Active);
        assert!(attack.active_hitbox().is_some());
        assert_eq!(attack.remaining_active_frames(), 3);

        // active = 3 ticks
        attack.update(Vec2::ZERO, Facing::Right);
        attack.update(Vec2::ZERO, Facing::Right);
        attack.update(Vec2::ZERO, Facing::Right);
        assert_eq!(attack.phase(), AttackPhase::Recovery);
        assert!(attack.active_hitbox().is_none());

        // recovery = 4 ticks
        for _ in 0..4 {
            attack.update(Vec2::ZERO, Facing::Right);
        }
        assert_eq!(attack.phase(), AttackPhase::Idle);
    }

    #[test]
    fn change_edge_fires_once() {
        let mut attack = Attack::new(sword());
        attack.start_swing();

        assert!(attack.poll_change());
        assert!(!attack.poll_change());
    }

    #[test]
    fn hitbox_mirrors_with_facing() {
        let mut attack = Attack::new(sword());
        attack.start_swing();
        attack.update(Vec2::ZERO, Facing::Right);
        attack.update(Vec2::ZERO, Facing::Right);
        let right = *attack.active_hitbox().unwrap();

        let mut attack = Attack::new(sword());
        attack.start_swing();
        attack.update(Vec2::ZERO, Facing::Left);
        attack.update(Vec2::ZERO, Facing::Left);
        let left = *attack.active_hitbox().unwrap();

        assert!(right.pos.x > left.pos.x);
        assert_eq!(right.pos.y, left.pos.y);
        assert_eq!(right.max().x, -left.pos.x);
    }

    #[test]
    fn cancel_clears_hitbox() {
        let mut attack = Attack::new(sword());
        attack.start_swing();
        attack.update(Vec2::ZERO, Facing::Right);
        attack.update(Vec2::ZERO, Facing::Right);
        assert!(attack.active_hitbox().is_some());

        attack.cancel();
        assert_eq!(attack.phase(), AttackPhase::Idle);
        assert!(attack.active_hitbox().is_none());
    }

    #[test]
    fn restore_resets_registry() {
        let mut attack = Attack::new(sword());
        attack.start_swing();
        attack.add_hit(9);

        attack.restore(AttackPhase::Recovery, 2, 5);
        assert_eq!(attack.phase(), AttackPhase::Recovery);
        assert_eq!(attack.frames_left(), 2);
        assert_eq!(attack.swing(), 5);
        assert!(!attack.has_hit(9));
        assert!(!attack.poll_change());
    }
}
