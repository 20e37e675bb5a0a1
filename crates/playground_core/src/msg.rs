use crate::{Command, ConnectionId, StreamMode, TaskUuid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator asked to open a session.
    ConnectRequested { token: String, mode: StreamMode },
    /// Operator asked to close the current session.
    DisconnectRequested,
    /// Operator added a task.
    AddTaskClicked,
    /// Operator saved a new title for a task.
    TaskTitleEdited { uuid: TaskUuid, title: String },
    /// Operator deleted a task.
    DeleteTaskClicked { uuid: TaskUuid },
    /// Operator picked a task.
    TaskSelected { uuid: TaskUuid },
    /// Operator issued a control command.
    CommandIssued(Command),
    /// Transport finished the opening handshake.
    TransportOpened { connection: ConnectionId },
    /// Transport delivered one text message.
    TransportMessage { connection: ConnectionId, raw: String },
    /// Transport closed.
    TransportClosed { connection: ConnectionId },
    /// Transport failed.
    TransportFailed { connection: ConnectionId, message: String },
}
