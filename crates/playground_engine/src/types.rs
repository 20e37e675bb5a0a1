use std::fmt;

pub type ConnectionId = u64;

/// What the transport reports back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Opened {
        connection: ConnectionId,
    },
    Message {
        connection: ConnectionId,
        text: String,
    },
    Closed {
        connection: ConnectionId,
    },
    Failed {
        connection: ConnectionId,
        error: TransportError,
    },
}

impl EngineEvent {
    pub fn connection(&self) -> ConnectionId {
        match self {
            EngineEvent::Opened { connection }
            | EngineEvent::Message { connection, .. }
            | EngineEvent::Closed { connection }
            | EngineEvent::Failed { connection, .. } => *connection,
        }
    }
}

/// Instruction for a live connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Handshake refused or the server could not be reached.
    Connect,
    /// The socket broke after it was open.
    Stream,
    /// An outbound write failed.
    Send,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Connect => write!(f, "connect failed"),
            FailureKind::Stream => write!(f, "stream error"),
            FailureKind::Send => write!(f, "send failed"),
        }
    }
}
