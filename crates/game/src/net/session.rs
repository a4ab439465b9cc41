use glam::Vec2;

use super::registry::{OnlineRegistry, RegistryError};
use super::NetworkId;
use crate::combat::WeaponSet;
use crate::world::{EntityId, World};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Offline,
    Connected,
    /// The engine detected an unrecoverable desync; the session is dead and
    /// the caller should return to a reconnect/offline flow.
    Desynced {
        reason: String,
    },
}

/// Online session lifecycle plus the id registry it owns. All remote player
/// bookkeeping (join, leave, teardown) funnels through here so the registry
/// bijection and the entity store never drift apart.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    registry: OnlineRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_online(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn registry(&self) -> &OnlineRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut OnlineRegistry {
        &mut self.registry
    }

    pub fn connect(&mut self) {
        log::info!("session connected");
        self.state = SessionState::Connected;
    }

    pub fn disconnect(&mut self) {
        log::info!("session closed");
        self.state = SessionState::Offline;
        self.registry.clear();
    }

    /// Terminates the session on a fatal desync. No partial recovery is
    /// attempted; the registry is dropped wholesale.
    pub fn fail(&mut self, reason: impl ToString) {
        let reason = reason.to_string();
        log::error!("session terminated: {reason}");
        self.state = SessionState::Desynced { reason };
        self.registry.clear();
    }

    /// Handles a player-join notification: spawns a combatant with the
    /// standard loadout and binds it to the announced network id.
    pub fn admit_player(
        &mut self,
        world: &mut World,
        net_id: NetworkId,
        team_id: u32,
        spawn: Vec2,
        weapons: &WeaponSet,
    ) -> Result<EntityId, RegistryError> {
        let weapon = weapons
            .clone_weapon("player_sword")
            .unwrap_or_else(crate::combat::Weapon::player_sword);
        let entity = world.spawn_combatant(team_id, spawn, weapon);
        match self.registry.register(entity, net_id) {
            Ok(()) => {
                log::info!("player joined: network id {net_id} as entity {entity}");
                Ok(entity)
            }
            Err(err) => {
                world.despawn(entity);
                Err(err)
            }
        }
    }

    /// Handles a player-leave notification; the entity is despawned and the
    /// binding destroyed.
    pub fn remove_player(
        &mut self,
        world: &mut World,
        net_id: NetworkId,
    ) -> Result<EntityId, RegistryError> {
        let entity = self.registry.unregister(net_id)?;
        world.despawn(entity);
        log::info!("player left: network id {net_id} (entity {entity})");
        Ok(entity)
    }
}
