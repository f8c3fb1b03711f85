use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub enum ServerEvent {
    ClientConnected {
        addr: SocketAddr,
        entity_id: u32,
    },
    ClientDisconnected {
        entity_id: u32,
        reason: DisconnectReason,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum DisconnectReason {
    Timeout,
    Kicked,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Timeout => "timed out",
            DisconnectReason::Kicked => "kicked",
        }
    }
}
