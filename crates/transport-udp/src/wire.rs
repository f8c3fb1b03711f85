use rkyv::{rancor, Archive, Deserialize, Serialize};

pub const MAX_PACKET_SIZE: usize = 1200;
pub const PROTOCOL_MAGIC: u32 = 0x52455749; // "REWI"
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
}

impl Default for PacketHeader {
    fn default() -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
        }
    }
}

impl PacketHeader {
    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

/// Fixed-point movement input, the wire counterpart of
/// `rewind_movement::MoveInput`. Mirrors `net/protocol.rs`'s
/// `ClientCommand` move/view scaling (`i8` for axes, `i16` for angles).
#[derive(Debug, Clone, Copy, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WireMoveInput {
    pub forward: i8,
    pub strafe: i8,
    pub yaw: i16,
    pub pitch: i16,
    pub flags: u8,
}

pub fn encode_input(input: &rewind_movement::MoveInput) -> WireMoveInput {
    WireMoveInput {
        forward: (input.forward.clamp(-1.0, 1.0) * 127.0) as i8,
        strafe: (input.strafe.clamp(-1.0, 1.0) * 127.0) as i8,
        yaw: (input.yaw * 10000.0) as i16,
        pitch: (input.pitch * 10000.0) as i16,
        flags: input.flags.bits(),
    }
}

pub fn decode_input(wire: &WireMoveInput) -> rewind_movement::MoveInput {
    rewind_movement::MoveInput {
        forward: wire.forward as f32 / 127.0,
        strafe: wire.strafe as f32 / 127.0,
        yaw: wire.yaw as f32 / 10000.0,
        pitch: wire.pitch as f32 / 10000.0,
        flags: rewind_movement::MoveFlags::from_bits_truncate(wire.flags),
    }
}

/// Fixed-point movement state + transform, the wire counterpart of
/// `StateSnapshot<MovementState>`. Velocity and orientation are scaled into
/// `i16` exactly as `net/protocol.rs`'s `EntityState` does; position stays
/// `f32` since it is unbounded world-space, same choice the teacher makes.
#[derive(Debug, Clone, Copy, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WireStateSnapshot {
    pub tick: u32,
    pub wall_time_ms: u64,
    pub position: [f32; 3],
    pub orientation: [i16; 4],
    pub velocity: [i16; 3],
    pub grounded: bool,
    pub jump_held: bool,
    pub crouch_amount: u8,
    pub strafe_ground_time: f32,
    pub stunned_duration: f32,
}

const MAX_VELOCITY: f32 = 327.67;

pub fn encode_state(
    snapshot: &rewind_core::StateSnapshot<rewind_movement::MovementState>,
) -> WireStateSnapshot {
    let t = &snapshot.transform;
    let s = &snapshot.payload;
    WireStateSnapshot {
        tick: snapshot.tick,
        wall_time_ms: (snapshot.wall_time * 1000.0) as u64,
        position: [t.position.x, t.position.y, t.position.z],
        orientation: [
            (t.rotation.x.clamp(-1.0, 1.0) * 32767.0) as i16,
            (t.rotation.y.clamp(-1.0, 1.0) * 32767.0) as i16,
            (t.rotation.z.clamp(-1.0, 1.0) * 32767.0) as i16,
            (t.rotation.w.clamp(-1.0, 1.0) * 32767.0) as i16,
        ],
        velocity: [
            (s.velocity.x.clamp(-MAX_VELOCITY, MAX_VELOCITY) * 100.0) as i16,
            (s.velocity.y.clamp(-MAX_VELOCITY, MAX_VELOCITY) * 100.0) as i16,
            (s.velocity.z.clamp(-MAX_VELOCITY, MAX_VELOCITY) * 100.0) as i16,
        ],
        grounded: s.grounded,
        jump_held: s.jump_held,
        crouch_amount: (s.crouch_amount.clamp(0.0, 1.0) * 255.0) as u8,
        strafe_ground_time: s.strafe_ground_time,
        stunned_duration: s.stunned_duration,
    }
}

pub fn decode_state(
    wire: &WireStateSnapshot,
) -> rewind_core::StateSnapshot<rewind_movement::MovementState> {
    use glam::{Quat, Vec3};

    rewind_core::StateSnapshot {
        tick: wire.tick,
        wall_time: wire.wall_time_ms as f64 / 1000.0,
        transform: rewind_core::Transform::new(
            Vec3::new(wire.position[0], wire.position[1], wire.position[2]),
            Quat::from_xyzw(
                wire.orientation[0] as f32 / 32767.0,
                wire.orientation[1] as f32 / 32767.0,
                wire.orientation[2] as f32 / 32767.0,
                wire.orientation[3] as f32 / 32767.0,
            )
            .normalize(),
        ),
        payload: rewind_movement::MovementState {
            strafe_ground_time: wire.strafe_ground_time,
            stunned_duration: wire.stunned_duration,
            crouch_amount: wire.crouch_amount as f32 / 255.0,
            velocity: Vec3::new(
                wire.velocity[0] as f32 / 100.0,
                wire.velocity[1] as f32 / 100.0,
                wire.velocity[2] as f32 / 100.0,
            ),
            grounded: wire.grounded,
            jump_held: wire.jump_held,
        },
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum WirePayload {
    /// `ClientInput → Host` (§4.5), carrying the previous tick's input
    /// alongside the current one for redundancy against packet loss.
    ClientInput {
        entity_id: u32,
        controller_id: u32,
        tick: u32,
        input: WireMoveInput,
        previous: Option<(u32, WireMoveInput)>,
    },
    /// `HostAuthoritativeState → Owner/Observers` (§4.5). Which of the two
    /// this is is determined by the `RoutingFilter` the sender used, not
    /// carried on the wire.
    HostState {
        entity_id: u32,
        controller_id: u32,
        state: WireStateSnapshot,
    },
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WirePacket {
    pub header: PacketHeader,
    pub payload: WirePayload,
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
    #[error("packet exceeds MTU ({0} bytes)")]
    TooLarge(usize),
}

impl WirePacket {
    pub fn new(payload: WirePayload) -> Self {
        Self {
            header: PacketHeader::default(),
            payload,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, WireError> {
        let bytes = rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(WireError::Serialize)?;
        if bytes.len() > MAX_PACKET_SIZE {
            return Err(WireError::TooLarge(bytes.len()));
        }
        Ok(bytes)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, WireError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(WireError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_round_trips_within_fixed_point_resolution() {
        let input = rewind_movement::MoveInput {
            forward: 1.0,
            strafe: -0.5,
            yaw: 1.234,
            pitch: -0.5,
            flags: rewind_movement::MoveFlags::JUMP,
        };
        let decoded = decode_input(&encode_input(&input));
        assert!((decoded.forward - input.forward).abs() < 0.01);
        assert!((decoded.strafe - input.strafe).abs() < 0.01);
        assert!((decoded.yaw - input.yaw).abs() < 0.001);
        assert!(decoded.wants_jump());
    }

    #[test]
    fn packet_round_trips_through_rkyv() {
        let packet = WirePacket::new(WirePayload::ClientInput {
            entity_id: 1,
            controller_id: 7,
            tick: 100,
            input: WireMoveInput {
                forward: 127,
                strafe: 0,
                yaw: 0,
                pitch: 0,
                flags: 0,
            },
            previous: None,
        });

        let bytes = packet.serialize().unwrap();
        let decoded = WirePacket::deserialize(&bytes).unwrap();
        assert!(decoded.header.is_valid());
    }
}
