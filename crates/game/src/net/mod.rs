mod protocol;
mod registry;
mod session;

pub type NetworkId = u32;

pub use protocol::{
    AttackChangePacket, CaptureStatePacket, ENTITY_RECORD_SIZE, EntityRecord, KIND_ATTACK_CHANGE,
    KIND_CAPTURE_STATE, KIND_STATE, KIND_WEAPON_CHANGE, Packet, PacketError, StatePacket,
    WeaponChangePacket,
};
pub use registry::{OnlineRegistry, RegistryError};
pub use session::{Session, SessionState};
