use crate::protocol::{CommandCode, OutboundMessage};
use crate::{StreamMode, TaskRegistry, ValidationError};

/// Operator-issued control instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadTasks,
    RunAllTasks,
    RunTask,
    Stop,
    Pause,
    Resume,
    Restart,
    /// Live-view only: subscribe to the frame stream of an existing job.
    WatchJob { job_uuid: String },
}

impl Command {
    pub fn code(&self) -> CommandCode {
        match self {
            Command::LoadTasks => CommandCode::LoadTask,
            Command::RunAllTasks => CommandCode::RunAllTasks,
            Command::RunTask => CommandCode::RunTask,
            Command::Stop => CommandCode::Stop,
            Command::Pause => CommandCode::Pause,
            Command::Resume => CommandCode::Resume,
            Command::Restart => CommandCode::Restart,
            Command::WatchJob { .. } => CommandCode::Connect,
        }
    }

    fn allowed_in(&self, mode: StreamMode) -> bool {
        match self {
            Command::WatchJob { .. } => mode == StreamMode::LiveView,
            _ => mode == StreamMode::Playground,
        }
    }
}

/// Builds the outbound record for `command`, checking its registry and mode
/// preconditions. Connection state is checked by the caller.
pub fn encode_command(
    command: &Command,
    registry: &TaskRegistry,
    mode: StreamMode,
) -> Result<OutboundMessage, ValidationError> {
    if !command.allowed_in(mode) {
        return Err(ValidationError::WrongMode { mode });
    }

    let mut message = OutboundMessage::bare(command.code());
    match command {
        Command::LoadTasks | Command::RunAllTasks => {
            if registry.is_empty() {
                return Err(ValidationError::EmptyRegistry);
            }
            message.all_task_data = Some(registry.snapshot());
        }
        Command::RunTask => {
            let selected = registry.selected().ok_or(ValidationError::NoSelection)?;
            message.task_uuid = Some(selected.clone());
            message.all_task_data = Some(registry.snapshot());
        }
        Command::WatchJob { job_uuid } => {
            let job_uuid = job_uuid.trim();
            if job_uuid.is_empty() {
                return Err(ValidationError::EmptyJobUuid);
            }
            message.job_uuid = Some(job_uuid.to_string());
        }
        Command::Stop | Command::Pause | Command::Resume | Command::Restart => {}
    }
    Ok(message)
}
