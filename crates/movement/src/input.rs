use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveFlags: u8 {
        const JUMP = 0b0000_0001;
        const CROUCH = 0b0000_0010;
    }
}

/// One tick's worth of sampled movement input. This is the concrete
/// `Simulator::InputPayload` for [`crate::MovementSimulator`]; it plays the
/// role `ClientCommand`'s move/view fields play in the teacher, minus the
/// sequence/ack bookkeeping that belongs to the transport layer instead.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveInput {
    pub forward: f32,
    pub strafe: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub flags: MoveFlags,
}

impl MoveInput {
    pub fn wants_jump(&self) -> bool {
        self.flags.contains(MoveFlags::JUMP)
    }

    pub fn wants_crouch(&self) -> bool {
        self.flags.contains(MoveFlags::CROUCH)
    }
}
