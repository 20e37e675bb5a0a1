use playground_logging::{pg_debug, pg_trace, pg_warn};

use crate::protocol::{decode_inbound, Frame, Inbound, ServerAck, StatusSnapshot};
use crate::TaskRegistry;

/// Session-scoped state shown to the operator. Cleared whenever the
/// transport closes or fails; the task registry is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub frame: Option<Frame>,
    pub metadata: StatusSnapshot,
    pub last_ack: Option<ServerAck>,
    pub frames_received: u64,
}

impl DisplayState {
    pub fn current_url(&self) -> &str {
        self.frame
            .as_ref()
            .map(|frame| frame.current_url.as_str())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What a single inbound message changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Frame { task_status_applied: bool },
    Ack,
    Ignored,
    Dropped,
}

impl MergeOutcome {
    pub fn changed_state(self) -> bool {
        matches!(self, MergeOutcome::Frame { .. } | MergeOutcome::Ack)
    }
}

/// Decodes `raw` and folds it into display state and the registry.
/// Undecodable payloads are logged and leave everything untouched.
pub fn on_message(
    raw: &str,
    display: &mut DisplayState,
    registry: &mut TaskRegistry,
) -> MergeOutcome {
    match decode_inbound(raw) {
        Ok(inbound) => merge(inbound, display, registry),
        Err(err) => {
            pg_warn!("dropping inbound message ({} bytes): {}", raw.len(), err);
            MergeOutcome::Dropped
        }
    }
}

pub fn merge(
    inbound: Inbound,
    display: &mut DisplayState,
    registry: &mut TaskRegistry,
) -> MergeOutcome {
    match inbound {
        Inbound::BrowserFrame(frame) => {
            let task_uuid = frame.status.task_uuid.clone();
            let task_status = frame.status.task_status.clone();

            display.metadata = frame.status.clone();
            display.frame = Some(frame);
            display.frames_received += 1;

            let task_status_applied =
                !task_uuid.is_empty() && registry.apply_status(&task_uuid, &task_status);
            if !task_uuid.is_empty() && !task_status_applied {
                pg_trace!("status push for unknown task {task_uuid}");
            }
            MergeOutcome::Frame {
                task_status_applied,
            }
        }
        Inbound::Ack(ack) => {
            if ack.is_error() {
                pg_warn!("server error ack {}: {}", ack.code, ack.error);
            } else {
                pg_debug!("server ack {} {}", ack.code, ack.message);
            }
            display.last_ack = Some(ack);
            MergeOutcome::Ack
        }
        Inbound::Ignored { kind } => {
            pg_debug!("ignoring inbound message of type {kind:?}");
            MergeOutcome::Ignored
        }
    }
}
