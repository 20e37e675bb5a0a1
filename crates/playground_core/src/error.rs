use crate::StreamMode;

/// An operation whose precondition does not hold.
///
/// Validation errors are reported to the operator and never reach the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a token is required to connect")]
    EmptyToken,
    #[error("a session is already connecting or connected")]
    AlreadyActive,
    #[error("not connected")]
    NotConnected,
    #[error("add at least one task first")]
    EmptyRegistry,
    #[error("select a task first")]
    NoSelection,
    #[error("task title must not be blank")]
    EmptyTitle,
    #[error("a job uuid is required")]
    EmptyJobUuid,
    #[error("command is not available in {mode} mode")]
    WrongMode { mode: StreamMode },
    #[error("failed to encode command: {0}")]
    Encode(String),
}

/// An inbound payload that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("expected a json object")]
    NotAnObject,
}
