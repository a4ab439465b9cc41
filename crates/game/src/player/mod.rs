use bitflags::bitflags;

use crate::world::World;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const JUMP = 1 << 2;
        const ATTACK = 1 << 3;
        const CROUCH = 1 << 4;
    }
}

/// Input state for one combatant, captured in snapshots so replay can
/// re-apply the same intent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerComponent {
    pub buttons: Buttons,
    /// Analog horizontal axis in [-1, 1]; overrides LEFT/RIGHT when nonzero.
    pub move_axis: f32,
}

impl ControllerComponent {
    pub fn axis(&self) -> f32 {
        if self.move_axis != 0.0 {
            return self.move_axis.clamp(-1.0, 1.0);
        }
        let mut axis = 0.0;
        if self.buttons.contains(Buttons::LEFT) {
            axis -= 1.0;
        }
        if self.buttons.contains(Buttons::RIGHT) {
            axis += 1.0;
        }
        axis
    }
}

pub const MOVE_SPEED: f32 = 100.0;

/// Turns controller state into movement and attack intent, ascending entity
/// id. Stunned or frozen combatants ignore their input.
pub struct PlayerSystem;

impl PlayerSystem {
    pub fn update(world: &mut World) {
        for id in world.controller.ids() {
            let Some(ctrl) = world.controller.get(id).copied() else {
                continue;
            };
            let Some(combat) = world.combat.get_mut(id) else {
                continue;
            };

            if combat.is_stunned() || combat.is_frozen() {
                if let Some(body) = world.physics.get_mut(id) {
                    body.vel.x = 0.0;
                }
                continue;
            }

            let axis = ctrl.axis();
            if let Some(body) = world.physics.get_mut(id) {
                body.vel.x = axis * MOVE_SPEED;
                if axis < 0.0 {
                    body.facing = crate::physics::Facing::Left;
                } else if axis > 0.0 {
                    body.facing = crate::physics::Facing::Right;
                }
            }

            if ctrl.buttons.contains(Buttons::ATTACK) {
                combat.attack.start_swing();
            }
        }
    }
}
