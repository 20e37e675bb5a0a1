use crate::{Frame, ServerAck, SessionStatus, StatusSnapshot, StreamMode, TaskUuid};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionStatus,
    pub mode: StreamMode,
    pub last_error: Option<String>,
    pub tasks: Vec<TaskRowView>,
    pub selected: Option<TaskUuid>,
    pub frame: Option<Frame>,
    pub current_url: String,
    pub metadata: StatusSnapshot,
    pub last_ack: Option<ServerAck>,
    pub frames_received: u64,
    /// Whether command affordances should be enabled.
    pub can_send: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub uuid: TaskUuid,
    pub title: String,
    pub status: String,
    pub selected: bool,
}
