use serde::{Deserialize, Serialize};

use crate::geom::Aabb;
use crate::net::{CaptureStatePacket, OnlineRegistry};
use crate::sync::FatalDesync;
use crate::world::World;

/// A contestable capture zone. Team 0 is unowned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturePoint {
    pub zone_id: u32,
    pub team_id: u32,
    pub total_time: f32,
    pub remaining_time: f32,
    pub area: Aabb,
}

impl CapturePoint {
    pub fn new(zone_id: u32, area: Aabb, total_time: f32) -> Self {
        Self {
            zone_id,
            team_id: 0,
            total_time,
            remaining_time: total_time,
            area,
        }
    }
}

pub struct ZoneSystem;

impl ZoneSystem {
    /// Advances capture progress by one tick. A zone is only captured while
    /// exactly one non-owning, non-neutral team has a living combatant
    /// inside it; contested zones hold their progress.
    pub fn update(world: &mut World, dt: f32) {
        for id in world.zones.ids() {
            let Some(area) = world.zones.get(id).map(|z| z.area) else {
                continue;
            };

            let mut contender: Option<u32> = None;
            let mut contested = false;
            for (cid, combat) in world.combat.iter() {
                if combat.team_id == 0 || !combat.is_alive() {
                    continue;
                }
                let Some(body) = world.physics.get(cid) else {
                    continue;
                };
                if !area.contains_point(body.pos) {
                    continue;
                }
                match contender {
                    None => contender = Some(combat.team_id),
                    Some(team) if team != combat.team_id => contested = true,
                    Some(_) => {}
                }
            }

            let Some(zone) = world.zones.get_mut(id) else {
                continue;
            };
            let Some(team) = contender else {
                continue;
            };
            if contested || team == zone.team_id {
                continue;
            }

            zone.remaining_time -= dt;
            if zone.remaining_time <= 0.0 {
                log::info!("zone {} captured by team {}", zone.zone_id, team);
                zone.team_id = team;
                zone.remaining_time = zone.total_time;
            }
        }
    }

    /// Overwrites a zone from an authoritative capture-state packet. The
    /// packet's network id names the zone entity; failing to resolve either
    /// id means local and server zone sets have diverged, which is fatal.
    pub fn apply_state(
        world: &mut World,
        registry: &OnlineRegistry,
        packet: &CaptureStatePacket,
    ) -> Result<(), FatalDesync> {
        let entity = registry
            .resolve(packet.net_id)
            .map_err(|_| FatalDesync::UnresolvedNetworkId(packet.net_id))?;
        let Some(zone) = world.zones.get_mut(entity) else {
            return Err(FatalDesync::UnknownZone(packet.zone_id));
        };

        zone.zone_id = packet.zone_id;
        zone.team_id = packet.team_id;
        zone.total_time = packet.total_time;
        zone.remaining_time = packet.remaining_time;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::combat::Weapon;

    const DT: f32 = 1.0 / 60.0;

    fn zone_world() -> (World, crate::world::EntityId) {
        let mut world = World::new();
        let zone = world.spawn_capture_point(
            1,
            Aabb::new(Vec2::new(-10.0, -10.0), Vec2::new(20.0, 20.0)),
            0.5,
        );
        (world, zone)
    }

    #[test]
    fn lone_team_captures_after_full_time() {
        let (mut world, zone) = zone_world();
        world.spawn_combatant(1, Vec2::ZERO, Weapon::player_sword());

        // 0.5s at 60hz = 30 ticks
        for _ in 0..29 {
            ZoneSystem::update(&mut world, DT);
        }
        assert_eq!(world.zones.get(zone).unwrap().team_id, 0);

        ZoneSystem::update(&mut world, DT);
        let z = world.zones.get(zone).unwrap();
        assert_eq!(z.team_id, 1);
        assert_eq!(z.remaining_time, z.total_time);
    }

    #[test]
    fn contested_zone_holds() {
        let (mut world, zone) = zone_world();
        world.spawn_combatant(1, Vec2::new(-5.0, 0.0), Weapon::player_sword());
        world.spawn_combatant(2, Vec2::new(5.0, 0.0), Weapon::player_sword());

        for _ in 0..120 {
            ZoneSystem::update(&mut world, DT);
        }
        let z = world.zones.get(zone).unwrap();
        assert_eq!(z.team_id, 0);
        assert_eq!(z.remaining_time, z.total_time);
    }

    #[test]
    fn neutral_and_dead_do_not_capture() {
        let (mut world, zone) = zone_world();
        world.spawn_combatant(0, Vec2::ZERO, Weapon::player_sword());
        let dead = world.spawn_combatant(2, Vec2::ZERO, Weapon::player_sword());
        world.combat.get_mut(dead).unwrap().health = 0;

        for _ in 0..120 {
            ZoneSystem::update(&mut world, DT);
        }
        assert_eq!(world.zones.get(zone).unwrap().team_id, 0);
    }

    #[test]
    fn apply_state_overwrites_zone() {
        let (mut world, zone) = zone_world();
        let mut registry = OnlineRegistry::new();
        registry.register(zone, 40).unwrap();

        let packet = CaptureStatePacket {
            zone_id: 1,
            team_id: 2,
            total_time: 30.0,
            remaining_time: 12.5,
            net_id: 40,
        };
        ZoneSystem::apply_state(&mut world, &registry, &packet).unwrap();

        let z = world.zones.get(zone).unwrap();
        assert_eq!(z.team_id, 2);
        assert_eq!(z.remaining_time, 12.5);
    }

    #[test]
    fn apply_state_unknown_ids_are_fatal() {
        let (mut world, zone) = zone_world();
        let mut registry = OnlineRegistry::new();

        let mut packet = CaptureStatePacket {
            zone_id: 1,
            team_id: 2,
            total_time: 30.0,
            remaining_time: 12.5,
            net_id: 40,
        };
        assert_eq!(
            ZoneSystem::apply_state(&mut world, &registry, &packet),
            Err(FatalDesync::UnresolvedNetworkId(40))
        );

        // resolvable net id, but pointing at an entity that is not a zone
        let stray = world.spawn_entity();
        registry.register(stray, 41).unwrap();
        packet.net_id = 41;
        assert_eq!(
            ZoneSystem::apply_state(&mut world, &registry, &packet),
            Err(FatalDesync::UnknownZone(1))
        );
        let _ = zone;
    }
}
