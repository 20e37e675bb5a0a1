use crate::{ConnectionId, StreamMode, ValidationError};

/// Side effects requested by [`crate::update`]; executed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenConnection {
        connection: ConnectionId,
        mode: StreamMode,
        token: String,
    },
    CloseConnection { connection: ConnectionId },
    /// Serialized outbound record. Fire-and-forget.
    Send { connection: ConnectionId, payload: String },
    /// An operator intent failed validation; nothing was sent.
    Rejected(ValidationError),
}
