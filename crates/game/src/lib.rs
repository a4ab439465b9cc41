pub mod combat;
pub mod config;
pub mod geom;
pub mod net;
pub mod physics;
pub mod player;
pub mod simulation;
pub mod sync;
pub mod world;
pub mod zone;

pub use combat::{
    Attack, AttackPhase, CombatComponent, CombatEvent, CombatStats, CombatSystem, Hurtbox, Weapon,
    WeaponSet,
};
pub use config::{ConfigError, Settings};
pub use geom::Aabb;
pub use net::{
    AttackChangePacket, CaptureStatePacket, EntityRecord, NetworkId, OnlineRegistry, Packet,
    PacketError, RegistryError, Session, SessionState, StatePacket, WeaponChangePacket,
};
pub use physics::{Facing, PhysicsComponent, PhysicsSystem};
pub use player::{Buttons, ControllerComponent, PlayerSystem};
pub use simulation::{FixedTimestep, Simulation};
pub use sync::{
    EntitySnapshot, FatalDesync, ResyncEngine, ResyncOutcome, SnapshotStore, StoreError, SyncState,
    Tick, WorldSnapshot,
};
pub use world::{EntityId, Pool, World};
pub use zone::{CapturePoint, ZoneSystem};
