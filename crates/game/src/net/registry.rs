use std::collections::HashMap;

use super::NetworkId;
use crate::world::EntityId;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("network id {net_id} is already bound to entity {entity}")]
    DuplicateNetworkId { net_id: NetworkId, entity: EntityId },
    #[error("unknown network id {0}")]
    UnknownNetworkId(NetworkId),
}

/// Bijection between server-assigned network ids and local entity ids.
/// Network ids are reused across reconnects, so re-registering an entity
/// under a new id replaces its old binding.
#[derive(Debug, Default)]
pub struct OnlineRegistry {
    by_net: HashMap<NetworkId, EntityId>,
    by_entity: HashMap<EntityId, NetworkId>,
}

impl OnlineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: EntityId, net_id: NetworkId) -> Result<(), RegistryError> {
        match self.by_net.get(&net_id) {
            Some(&bound) if bound == entity => return Ok(()),
            Some(&bound) => {
                return Err(RegistryError::DuplicateNetworkId {
                    net_id,
                    entity: bound,
                });
            }
            None => {}
        }

        if let Some(old) = self.by_entity.insert(entity, net_id) {
            self.by_net.remove(&old);
            log::debug!("entity {entity} rebound from network id {old} to {net_id}");
        }
        self.by_net.insert(net_id, entity);
        Ok(())
    }

    pub fn resolve(&self, net_id: NetworkId) -> Result<EntityId, RegistryError> {
        self.by_net
            .get(&net_id)
            .copied()
            .ok_or(RegistryError::UnknownNetworkId(net_id))
    }

    pub fn network_id_of(&self, entity: EntityId) -> Option<NetworkId> {
        self.by_entity.get(&entity).copied()
    }

    pub fn unregister(&mut self, net_id: NetworkId) -> Result<EntityId, RegistryError> {
        let entity = self
            .by_net
            .remove(&net_id)
            .ok_or(RegistryError::UnknownNetworkId(net_id))?;
        self.by_entity.remove(&entity);
        log::debug!("network id {net_id} unbound from entity {entity}");
        Ok(entity)
    }

    pub fn clear(&mut self) {
        self.by_net.clear();
        self.by_entity.clear();
    }

    pub fn len(&self) -> usize {
        self.by_net.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_net.is_empty()
    }
}
