//! Playground core: session protocol and task orchestration as a pure state
//! machine, plus view-model helpers.
mod command;
mod effect;
mod error;
mod merge;
mod msg;
mod protocol;
mod registry;
mod session;
mod state;
mod update;
mod view_model;

pub use command::{encode_command, Command};
pub use effect::Effect;
pub use error::{DecodeError, ValidationError};
pub use merge::{merge, on_message, DisplayState, MergeOutcome};
pub use msg::Msg;
pub use protocol::{
    decode_inbound, CommandCode, Frame, Inbound, OutboundMessage, ServerAck, StatusSnapshot,
    BROWSER_FRAME_TYPE,
};
pub use registry::{Task, TaskData, TaskRegistry, TaskUuid, DEFAULT_TASK_STATUS};
pub use session::{ConnectionId, Session, SessionStatus, StreamMode};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, TaskRowView};
