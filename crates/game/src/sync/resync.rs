use super::Tick;
use super::snapshot::WorldSnapshot;
use crate::combat::{AttackPhase, WeaponSet};
use crate::net::{
    AttackChangePacket, NetworkId, OnlineRegistry, StatePacket, WeaponChangePacket,
};
use crate::simulation::Simulation;

/// Unrecoverable desync: the client's history window or registry has fallen
/// behind the server. The correct reaction is to terminate the online
/// session, not to attempt partial recovery.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum FatalDesync {
    #[error("authoritative snapshot for tick {0} is outside retained history")]
    MissingHistory(Tick),
    #[error("authoritative packet references unknown network id {0}")]
    UnresolvedNetworkId(NetworkId),
    #[error("capture state packet references unknown zone {0}")]
    UnknownZone(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Client runs ahead on local simulation.
    #[default]
    Predicting,
    /// Transient: entered and left within a single `apply_authoritative`.
    Correcting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// Authoritative state matched local history; nothing changed.
    InSync,
    /// History was rewritten from `from` and re-simulated up to `to`.
    Corrected { from: Tick, to: Tick },
}

/// Reconciles server-authoritative snapshots against locally predicted
/// history, correcting and deterministically fast-replaying on mismatch.
#[derive(Debug, Default)]
pub struct ResyncEngine {
    state: SyncState,
}

impl ResyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn apply_authoritative(
        &mut self,
        packet: &StatePacket,
        sim: &mut Simulation,
        registry: &OnlineRegistry,
    ) -> Result<ResyncOutcome, FatalDesync> {
        let authoritative = WorldSnapshot::from_packet(packet, registry)
            .map_err(|_| FatalDesync::UnresolvedNetworkId(first_unresolved(packet, registry)))?;
        let tick = authoritative.tick;

        let local = sim
            .snapshots()
            .get(tick)
            .map_err(|_| FatalDesync::MissingHistory(tick))?;

        if *local == authoritative {
            log::debug!("authoritative snapshot for tick {tick} matches prediction");
            return Ok(ResyncOutcome::InSync);
        }

        self.state = SyncState::Correcting;
        let current = sim.tick();
        log::warn!("prediction diverged at tick {tick}, replaying {tick}..{current}");

        sim.snapshots_mut().replace_from(tick, authoritative.clone());
        authoritative.apply(sim.world_mut());
        sim.set_tick(tick);
        sim.replay_to(current);

        self.state = SyncState::Predicting;
        Ok(ResyncOutcome::Corrected {
            from: tick,
            to: current,
        })
    }

    /// Applies a remote attack-change notification onto the owning entity.
    /// A malformed payload is dropped (recoverable); an unknown network id
    /// is a registry desync and fatal.
    pub fn apply_attack_change(
        &self,
        packet: &AttackChangePacket,
        sim: &mut Simulation,
        registry: &OnlineRegistry,
    ) -> Result<(), FatalDesync> {
        let entity = registry
            .resolve(packet.net_id)
            .map_err(|_| FatalDesync::UnresolvedNetworkId(packet.net_id))?;

        let (phase, frames_left, swing) = match packet.attack_state() {
            Ok(state) => state,
            Err(err) => {
                log::warn!("dropping malformed attack change: {err}");
                return Ok(());
            }
        };
        if let Some(combat) = sim.world_mut().combat.get_mut(entity) {
            combat
                .attack
                .restore(AttackPhase::from(phase), frames_left, swing);
        }
        Ok(())
    }

    /// Applies a remote weapon change. An unknown weapon name is dropped
    /// (the local weapon table may simply lag the server's).
    pub fn apply_weapon_change(
        &self,
        packet: &WeaponChangePacket,
        sim: &mut Simulation,
        registry: &OnlineRegistry,
        weapons: &WeaponSet,
    ) -> Result<(), FatalDesync> {
        let entity = registry
            .resolve(packet.net_id)
            .map_err(|_| FatalDesync::UnresolvedNetworkId(packet.net_id))?;

        let Some(weapon) = weapons.clone_weapon(&packet.weapon) else {
            log::warn!("dropping weapon change to unknown weapon {:?}", packet.weapon);
            return Ok(());
        };
        if let Some(combat) = sim.world_mut().combat.get_mut(entity) {
            combat.attack.set_weapon(weapon);
        }
        Ok(())
    }
}

fn first_unresolved(packet: &StatePacket, registry: &OnlineRegistry) -> NetworkId {
    packet
        .entities
        .iter()
        .map(|record| record.net_id)
        .find(|&net_id| registry.resolve(net_id).is_err())
        .unwrap_or_default()
}
