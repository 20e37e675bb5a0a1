//! Wire vocabulary of the automation backend's stream.
//!
//! Inbound records are JSON objects tagged by `type` (frames) or `ACK`
//! (acknowledgements). Outbound records are JSON objects tagged by `COMMAND`.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DecodeError, TaskData, TaskUuid};

pub const BROWSER_FRAME_TYPE: &str = "browser_frame";

/// Server-reported execution metadata carried by every frame.
///
/// Absent fields decode as empty strings and overwrite earlier values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub job_uuid: String,
    pub job_status: String,
    pub case_uuid: String,
    pub case_status: String,
    pub task_uuid: String,
    pub task_status: String,
    /// Only sent by the playground endpoint. Display-only.
    pub task_title: String,
}

/// One screenshot plus the page it shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Base64 text exactly as received.
    pub image_base64: String,
    pub current_url: String,
    pub status: StatusSnapshot,
}

impl Frame {
    pub fn has_image(&self) -> bool {
        !self.image_base64.is_empty()
    }

    pub fn image_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(self.image_base64.as_bytes())
    }
}

/// Acknowledgement record (`{"ACK": ..., "message"?, "error"?}`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerAck {
    pub code: String,
    pub message: String,
    pub error: String,
    pub job_uuid: String,
}

impl ServerAck {
    pub fn is_error(&self) -> bool {
        self.code.ends_with("ERROR") || !self.error.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    BrowserFrame(Frame),
    Ack(ServerAck),
    /// Anything else, kept only for logging.
    Ignored { kind: String },
}

/// Parses one raw text message from the stream.
pub fn decode_inbound(raw: &str) -> Result<Inbound, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    if let Some(kind) = fields.get("type") {
        let kind = text(kind);
        if kind == BROWSER_FRAME_TYPE {
            return Ok(Inbound::BrowserFrame(frame_from(&fields)));
        }
        return Ok(Inbound::Ignored { kind });
    }
    if let Some(code) = fields.get("ACK") {
        return Ok(Inbound::Ack(ServerAck {
            code: text(code),
            message: field(&fields, "message"),
            error: field(&fields, "error"),
            job_uuid: field(&fields, "job_uuid"),
        }));
    }
    Ok(Inbound::Ignored {
        kind: String::new(),
    })
}

fn frame_from(fields: &Map<String, Value>) -> Frame {
    Frame {
        image_base64: field(fields, "frame"),
        current_url: field(fields, "current_url"),
        status: StatusSnapshot {
            job_uuid: field(fields, "job_uuid"),
            job_status: field(fields, "job_status"),
            case_uuid: field(fields, "case_uuid"),
            case_status: field(fields, "case_status"),
            task_uuid: field(fields, "task_uuid"),
            task_status: field(fields, "task_status"),
            task_title: field(fields, "task_title"),
        },
    }
}

fn field(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).map(text).unwrap_or_default()
}

// Missing, null and non-string values all read as blank.
fn text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        _ => String::new(),
    }
}

/// Value of the `COMMAND` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandCode {
    #[serde(rename = "C2S_CONNECT")]
    Connect,
    #[serde(rename = "C2S_LOAD_TASK")]
    LoadTask,
    #[serde(rename = "C2S_RUN_ALL_TASKS")]
    RunAllTasks,
    #[serde(rename = "C2S_RUN_TASK")]
    RunTask,
    #[serde(rename = "C2S_STOP")]
    Stop,
    #[serde(rename = "C2S_PAUSE")]
    Pause,
    #[serde(rename = "C2S_RESUME")]
    Resume,
    #[serde(rename = "C2S_RESTART")]
    Restart,
}

/// One outbound control record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "COMMAND")]
    pub command: CommandCode,
    #[serde(rename = "JOB_UUID", default, skip_serializing_if = "Option::is_none")]
    pub job_uuid: Option<String>,
    #[serde(rename = "TASK_UUID", default, skip_serializing_if = "Option::is_none")]
    pub task_uuid: Option<TaskUuid>,
    #[serde(rename = "ALL_TASK_DATA", default, skip_serializing_if = "Option::is_none")]
    pub all_task_data: Option<Vec<TaskData>>,
}

impl OutboundMessage {
    pub fn bare(command: CommandCode) -> Self {
        Self {
            command,
            job_uuid: None,
            task_uuid: None,
            all_task_data: None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
