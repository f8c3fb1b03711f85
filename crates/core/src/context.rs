use crate::ids::ConnectionId;

/// Per-frame facts the host engine hands to the coordinator instead of the
/// engine exposing them as global statics (design notes §9: `Time.Now`,
/// `Networking.IsHost`, `Connection.Local` become explicit parameters).
#[derive(Debug, Clone, Copy)]
pub struct RuntimeContext {
    pub local_connection_id: Option<ConnectionId>,
    pub is_host: bool,
    pub wall_now: f64,
    pub frame_delta: f32,
}

impl RuntimeContext {
    pub fn new(local_connection_id: Option<ConnectionId>, is_host: bool, wall_now: f64, frame_delta: f32) -> Self {
        Self {
            local_connection_id,
            is_host,
            wall_now,
            frame_delta,
        }
    }

    pub fn is_local(&self, connection_id: ConnectionId) -> bool {
        self.local_connection_id == Some(connection_id)
    }
}
