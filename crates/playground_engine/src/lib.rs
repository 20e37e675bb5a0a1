//! Playground engine: WebSocket transport and frame persistence.
mod endpoint;
mod engine;
mod persist;
mod transport;
mod types;

pub use endpoint::{Endpoint, EndpointError, StreamPath, DEFAULT_BASE_URL};
pub use engine::EngineHandle;
pub use persist::{ensure_frame_dir, image_extension, FrameStore, PersistError, LATEST_FRAME_STEM};
pub use transport::{ChannelEventSink, ConnectSettings, Connector, EventSink, WsConnector};
pub use types::{ConnectionId, EngineEvent, FailureKind, Outgoing, TransportError};
