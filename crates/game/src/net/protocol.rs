use super::NetworkId;

pub const KIND_STATE: u8 = 0x01;
pub const KIND_ATTACK_CHANGE: u8 = 0x02;
pub const KIND_WEAPON_CHANGE: u8 = 0x03;
pub const KIND_CAPTURE_STATE: u8 = 0x04;

/// Fixed wire size of one entity record in a state packet.
pub const ENTITY_RECORD_SIZE: usize = 56;

/// Decode failure. Every variant is recoverable: the caller drops the packet
/// and keeps receiving; no state is mutated before validation passes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("unknown packet discriminant {0:#04x}")]
    UnknownKind(u8),
    #[error("packet truncated: needed {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },
    #[error("declared payload length {declared} disagrees with buffer ({actual} bytes)")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("string payload is not valid utf-8")]
    BadString,
}

/// One combatant's synchronizable state as it crosses the wire. Field order
/// and widths are the protocol; there is no padding and no delimiters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRecord {
    pub net_id: NetworkId,
    pub pos: [f32; 2],
    pub vel: [f32; 2],
    pub facing: i8,
    pub frozen: u8,
    pub buttons: u8,
    pub move_axis: f32,
    pub health: u32,
    pub stamina: u32,
    pub team_id: u32,
    pub stun_frames: u32,
    pub freeze_frames: u32,
    pub attack_phase: u8,
    pub attack_frames: u32,
    pub attack_swing: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatePacket {
    pub tick: u64,
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackChangePacket {
    pub net_id: NetworkId,
    pub payload: Vec<u8>,
}

impl AttackChangePacket {
    /// Standard payload carried by an attack-change notification: phase,
    /// frames left, swing counter.
    pub fn with_attack(net_id: NetworkId, phase: u8, frames_left: u32, swing: u32) -> Self {
        let mut payload = Vec::with_capacity(9);
        payload.push(phase);
        payload.extend_from_slice(&frames_left.to_le_bytes());
        payload.extend_from_slice(&swing.to_le_bytes());
        Self { net_id, payload }
    }

    pub fn attack_state(&self) -> Result<(u8, u32, u32), PacketError> {
        let mut reader = Reader::new(&self.payload);
        let phase = reader.u8()?;
        let frames_left = reader.u32()?;
        let swing = reader.u32()?;
        reader.finish()?;
        Ok((phase, frames_left, swing))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponChangePacket {
    pub net_id: NetworkId,
    pub weapon: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureStatePacket {
    pub zone_id: u32,
    pub team_id: u32,
    pub total_time: f32,
    pub remaining_time: f32,
    pub net_id: NetworkId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    State(StatePacket),
    AttackChange(AttackChangePacket),
    WeaponChange(WeaponChangePacket),
    CaptureState(CaptureStatePacket),
}

impl Packet {
    pub fn kind(&self) -> u8 {
        match self {
            Packet::State(_) => KIND_STATE,
            Packet::AttackChange(_) => KIND_ATTACK_CHANGE,
            Packet::WeaponChange(_) => KIND_WEAPON_CHANGE,
            Packet::CaptureState(_) => KIND_CAPTURE_STATE,
        }
    }

    /// Encoding never fails: every input is fixed-size or length-prefixed.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.kind());
        match self {
            Packet::State(p) => encode_state(p, &mut out),
            Packet::AttackChange(p) => {
                out.extend_from_slice(&p.net_id.to_le_bytes());
                out.extend_from_slice(&(p.payload.len() as u16).to_le_bytes());
                out.extend_from_slice(&p.payload);
            }
            Packet::WeaponChange(p) => {
                out.extend_from_slice(&p.net_id.to_le_bytes());
                out.extend_from_slice(&(p.weapon.len() as u16).to_le_bytes());
                out.extend_from_slice(p.weapon.as_bytes());
            }
            Packet::CaptureState(p) => {
                out.extend_from_slice(&p.zone_id.to_le_bytes());
                out.extend_from_slice(&p.team_id.to_le_bytes());
                out.extend_from_slice(&p.total_time.to_le_bytes());
                out.extend_from_slice(&p.remaining_time.to_le_bytes());
                out.extend_from_slice(&p.net_id.to_le_bytes());
            }
        }
        out
    }

    /// Validates the whole buffer before returning: wrong declared lengths,
    /// trailing bytes, and unknown discriminants are all rejected.
    pub fn decode(buf: &[u8]) -> Result<Packet, PacketError> {
        let mut reader = Reader::new(buf);
        let kind = reader.u8()?;
        let packet = match kind {
            KIND_STATE => Packet::State(decode_state(&mut reader)?),
            KIND_ATTACK_CHANGE => {
                let net_id = reader.u32()?;
                let declared = reader.u16()? as usize;
                if reader.remaining() != declared {
                    return Err(PacketError::LengthMismatch {
                        declared,
                        actual: reader.remaining(),
                    });
                }
                let payload = reader.bytes(declared)?.to_vec();
                Packet::AttackChange(AttackChangePacket { net_id, payload })
            }
            KIND_WEAPON_CHANGE => {
                let net_id = reader.u32()?;
                let declared = reader.u16()? as usize;
                if reader.remaining() != declared {
                    return Err(PacketError::LengthMismatch {
                        declared,
                        actual: reader.remaining(),
                    });
                }
                let name = reader.bytes(declared)?;
                let weapon = std::str::from_utf8(name)
                    .map_err(|_| PacketError::BadString)?
                    .to_owned();
                Packet::WeaponChange(WeaponChangePacket { net_id, weapon })
            }
            KIND_CAPTURE_STATE => Packet::CaptureState(CaptureStatePacket {
                zone_id: reader.u32()?,
                team_id: reader.u32()?,
                total_time: reader.f32()?,
                remaining_time: reader.f32()?,
                net_id: reader.u32()?,
            }),
            other => return Err(PacketError::UnknownKind(other)),
        };
        reader.finish()?;
        Ok(packet)
    }
}

fn encode_state(packet: &StatePacket, out: &mut Vec<u8>) {
    out.extend_from_slice(&packet.tick.to_le_bytes());
    out.extend_from_slice(&(packet.entities.len() as u16).to_le_bytes());
    for record in &packet.entities {
        out.extend_from_slice(&record.net_id.to_le_bytes());
        out.extend_from_slice(&record.pos[0].to_le_bytes());
        out.extend_from_slice(&record.pos[1].to_le_bytes());
        out.extend_from_slice(&record.vel[0].to_le_bytes());
        out.extend_from_slice(&record.vel[1].to_le_bytes());
        out.push(record.facing as u8);
        out.push(record.frozen);
        out.push(record.buttons);
        out.extend_from_slice(&record.move_axis.to_le_bytes());
        out.extend_from_slice(&record.health.to_le_bytes());
        out.extend_from_slice(&record.stamina.to_le_bytes());
        out.extend_from_slice(&record.team_id.to_le_bytes());
        out.extend_from_slice(&record.stun_frames.to_le_bytes());
        out.extend_from_slice(&record.freeze_frames.to_le_bytes());
        out.push(record.attack_phase);
        out.extend_from_slice(&record.attack_frames.to_le_bytes());
        out.extend_from_slice(&record.attack_swing.to_le_bytes());
    }
}

fn decode_state(reader: &mut Reader) -> Result<StatePacket, PacketError> {
    let tick = reader.u64()?;
    let count = reader.u16()? as usize;

    let declared = count * ENTITY_RECORD_SIZE;
    if reader.remaining() != declared {
        return Err(PacketError::LengthMismatch {
            declared,
            actual: reader.remaining(),
        });
    }

    let mut entities = Vec::with_capacity(count);
    for _ in 0..count {
        entities.push(EntityRecord {
            net_id: reader.u32()?,
            pos: [reader.f32()?, reader.f32()?],
            vel: [reader.f32()?, reader.f32()?],
            facing: reader.u8()? as i8,
            frozen: reader.u8()?,
            buttons: reader.u8()?,
            move_axis: reader.f32()?,
            health: reader.u32()?,
            stamina: reader.u32()?,
            team_id: reader.u32()?,
            stun_frames: reader.u32()?,
            freeze_frames: reader.u32()?,
            attack_phase: reader.u8()?,
            attack_frames: reader.u32()?,
            attack_swing: reader.u32()?,
        });
    }
    Ok(StatePacket { tick, entities })
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], PacketError> {
        if self.remaining() < len {
            return Err(PacketError::Truncated {
                needed: len,
                have: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], PacketError> {
        let slice = self.bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, PacketError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, PacketError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, PacketError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, PacketError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32, PacketError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    /// Trailing bytes mean the declared lengths lied about the payload.
    fn finish(&self) -> Result<(), PacketError> {
        if self.remaining() != 0 {
            return Err(PacketError::LengthMismatch {
                declared: self.pos,
                actual: self.buf.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(net_id: NetworkId) -> EntityRecord {
        EntityRecord {
            net_id,
            pos: [12.5, -3.0],
            vel: [1.0, 0.0],
            facing: -1,
            frozen: 1,
            buttons: 0b0000_1001,
            move_axis: -0.5,
            health: 75,
            stamina: 40,
            team_id: 2,
            stun_frames: 12,
            freeze_frames: 3,
            attack_phase: 2,
            attack_frames: 4,
            attack_swing: 7,
        }
    }

    #[test]
    fn record_size_matches_layout() {
        let packet = Packet::State(StatePacket {
            tick: 0,
            entities: vec![sample_record(1)],
        });
        // kind + tick + count + one record
        assert_eq!(packet.encode().len(), 1 + 8 + 2 + ENTITY_RECORD_SIZE);
    }

    #[test]
    fn state_roundtrip() {
        let packet = Packet::State(StatePacket {
            tick: 123_456_789,
            entities: vec![sample_record(1), sample_record(2)],
        });
        assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn empty_state_roundtrip() {
        let packet = Packet::State(StatePacket {
            tick: 7,
            entities: Vec::new(),
        });
        assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn attack_change_roundtrip() {
        // zero-length and the largest length the u16 prefix can declare
        for payload in [Vec::new(), vec![0xab; u16::MAX as usize]] {
            let packet = Packet::AttackChange(AttackChangePacket {
                net_id: 9,
                payload,
            });
            assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
        }
    }

    #[test]
    fn attack_payload_helpers_roundtrip() {
        let packet = AttackChangePacket::with_attack(3, 2, 5, 11);
        assert_eq!(packet.attack_state().unwrap(), (2, 5, 11));
    }

    #[test]
    fn weapon_change_roundtrip() {
        for name in ["", "player_sword"] {
            let packet = Packet::WeaponChange(WeaponChangePacket {
                net_id: 4,
                weapon: name.to_owned(),
            });
            assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
        }
    }

    #[test]
    fn capture_state_roundtrip() {
        let packet = Packet::CaptureState(CaptureStatePacket {
            zone_id: 3,
            team_id: 1,
            total_time: 60.0,
            remaining_time: 22.25,
            net_id: 17,
        });
        assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
    }

    #[test]
    fn unknown_discriminant_rejected() {
        assert_eq!(
            Packet::decode(&[0xff, 0, 0]),
            Err(PacketError::UnknownKind(0xff))
        );
    }

    #[test]
    fn empty_buffer_rejected() {
        assert!(matches!(
            Packet::decode(&[]),
            Err(PacketError::Truncated { .. })
        ));
    }

    #[test]
    fn declared_length_must_match_buffer() {
        let mut bytes = Packet::AttackChange(AttackChangePacket {
            net_id: 1,
            payload: vec![1, 2, 3],
        })
        .encode();

        // claim 4 payload bytes while carrying 3
        bytes[5] = 4;
        assert_eq!(
            Packet::decode(&bytes),
            Err(PacketError::LengthMismatch {
                declared: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn trailing_garbage_rejected() {
        let mut bytes = Packet::CaptureState(CaptureStatePacket {
            zone_id: 1,
            team_id: 0,
            total_time: 1.0,
            remaining_time: 1.0,
            net_id: 2,
        })
        .encode();
        bytes.push(0);

        assert!(matches!(
            Packet::decode(&bytes),
            Err(PacketError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn truncated_state_rejected() {
        let bytes = Packet::State(StatePacket {
            tick: 1,
            entities: vec![sample_record(1)],
        })
        .encode();

        assert!(matches!(
            Packet::decode(&bytes[..bytes.len() - 1]),
            Err(PacketError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn invalid_utf8_weapon_name_rejected() {
        let mut out = vec![KIND_WEAPON_CHANGE];
        out.extend_from_slice(&4u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&[0xff, 0xfe]);

        assert_eq!(Packet::decode(&out), Err(PacketError::BadString));
    }
}
