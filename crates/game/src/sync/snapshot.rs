use glam::Vec2;

use super::Tick;
use crate::combat::AttackPhase;
use crate::net::{EntityRecord, OnlineRegistry, RegistryError, StatePacket};
use crate::physics::Facing;
use crate::player::Buttons;
use crate::world::{EntityId, World};

/// One combatant's synchronizable state at a tick: combat, positional, and
/// controller input. Enough to deterministically reproduce subsequent ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub entity: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub frozen: bool,
    pub buttons: Buttons,
    pub move_axis: f32,
    pub health: u32,
    pub stamina: u32,
    pub team_id: u32,
    pub stun_frames: u32,
    pub freeze_frames: u32,
    pub attack_phase: AttackPhase,
    pub attack_frames: u32,
    pub attack_swing: u32,
}

impl EntitySnapshot {
    pub fn to_record(&self, net_id: u32) -> EntityRecord {
        EntityRecord {
            net_id,
            pos: self.pos.into(),
            vel: self.vel.into(),
            facing: self.facing.to_wire(),
            frozen: self.frozen as u8,
            buttons: self.buttons.bits(),
            move_axis: self.move_axis,
            health: self.health,
            stamina: self.stamina,
            team_id: self.team_id,
            stun_frames: self.stun_frames,
            freeze_frames: self.freeze_frames,
            attack_phase: self.attack_phase as u8,
            attack_frames: self.attack_frames,
            attack_swing: self.attack_swing,
        }
    }

    pub fn from_record(record: &EntityRecord, entity: EntityId) -> Self {
        Self {
            entity,
            pos: Vec2::from(record.pos),
            vel: Vec2::from(record.vel),
            facing: Facing::from_wire(record.facing),
            frozen: record.frozen != 0,
            buttons: Buttons::from_bits_truncate(record.buttons),
            move_axis: record.move_axis,
            health: record.health,
            stamina: record.stamina,
            team_id: record.team_id,
            stun_frames: record.stun_frames,
            freeze_frames: record.freeze_frames,
            attack_phase: AttackPhase::from(record.attack_phase),
            attack_frames: record.attack_frames,
            attack_swing: record.attack_swing,
        }
    }
}

/// Tick-keyed capture of every combatant, ascending entity id. Equality is
/// field-wise over every captured component.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub entities: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    pub fn capture(tick: Tick, world: &World) -> Self {
        let mut entities = Vec::with_capacity(world.combat.len());
        for (id, combat) in world.combat.iter() {
            let Some(body) = world.physics.get(id) else {
                continue;
            };
            let ctrl = world.controller.get(id).copied().unwrap_or_default();
            entities.push(EntitySnapshot {
                entity: id,
                pos: body.pos,
                vel: body.vel,
                facing: body.facing,
                frozen: body.frozen,
                buttons: ctrl.buttons,
                move_axis: ctrl.move_axis,
                health: combat.health,
                stamina: combat.stamina,
                team_id: combat.team_id,
                stun_frames: combat.stun_frames,
                freeze_frames: combat.freeze_frames,
                attack_phase: combat.attack.phase(),
                attack_frames: combat.attack.frames_left(),
                attack_swing: combat.attack.swing(),
            });
        }
        Self { tick, entities }
    }

    /// Writes the captured values back onto live components. Entities in the
    /// snapshot that no longer exist are skipped; live entities missing from
    /// the snapshot keep their current state.
    pub fn apply(&self, world: &mut World) {
        for snap in &self.entities {
            if let Some(combat) = world.combat.get_mut(snap.entity) {
                combat.health = snap.health;
                combat.stamina = snap.stamina;
                combat.team_id = snap.team_id;
                combat.stun_frames = snap.stun_frames;
                combat.freeze_frames = snap.freeze_frames;
                combat
                    .attack
                    .restore(snap.attack_phase, snap.attack_frames, snap.attack_swing);
                combat.update_hurtboxes(snap.pos);
            }
            if let Some(body) = world.physics.get_mut(snap.entity) {
                body.pos = snap.pos;
                body.vel = snap.vel;
                body.facing = snap.facing;
                body.frozen = snap.frozen;
            }
            if let Some(ctrl) = world.controller.get_mut(snap.entity) {
                ctrl.buttons = snap.buttons;
                ctrl.move_axis = snap.move_axis;
            }
        }
    }

    /// Builds the wire payload, translating entity ids to network ids.
    /// Entities without a binding are local-only and stay off the wire.
    pub fn to_packet(&self, registry: &OnlineRegistry) -> StatePacket {
        let entities = self
            .entities
            .iter()
            .filter_map(|snap| {
                registry
                    .network_id_of(snap.entity)
                    .map(|net_id| snap.to_record(net_id))
            })
            .collect();
        StatePacket {
            tick: self.tick,
            entities,
        }
    }

    /// Rebuilds a snapshot from the wire, translating network ids back to
    /// entity ids and restoring ascending entity order.
    pub fn from_packet(
        packet: &StatePacket,
        registry: &OnlineRegistry,
    ) -> Result<Self, RegistryError> {
        let mut entities = Vec::with_capacity(packet.entities.len());
        for record in &packet.entities {
            let entity = registry.resolve(record.net_id)?;
            entities.push(EntitySnapshot::from_record(record, entity));
        }
        entities.sort_by_key(|snap| snap.entity);
        Ok(Self {
            tick: packet.tick,
            entities,
        })
    }
}
