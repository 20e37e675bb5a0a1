use futures_util::{SinkExt, StreamExt};
use playground_logging::{pg_debug, pg_info, pg_warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::{ConnectionId, EngineEvent, FailureKind, Outgoing, TransportError};

#[derive(Debug, Clone, Default)]
pub struct ConnectSettings {
    /// Upper bound for one inbound message; `None` keeps the library default.
    pub max_message_bytes: Option<usize>,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drives one connection from handshake to close.
///
/// Implementations report exactly one terminal event (`Closed` or `Failed`)
/// per call, preceded by `Opened` if the handshake succeeded.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn run(
        &self,
        connection: ConnectionId,
        url: Url,
        outgoing: UnboundedReceiver<Outgoing>,
        sink: &dyn EventSink,
    );
}

#[derive(Debug, Clone, Default)]
pub struct WsConnector {
    settings: ConnectSettings,
}

impl WsConnector {
    pub fn new(settings: ConnectSettings) -> Self {
        Self { settings }
    }

    fn config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        if let Some(limit) = self.settings.max_message_bytes {
            config.max_message_size = Some(limit);
            config.max_frame_size = Some(limit);
        }
        config
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn run(
        &self,
        connection: ConnectionId,
        url: Url,
        mut outgoing: UnboundedReceiver<Outgoing>,
        sink: &dyn EventSink,
    ) {
        pg_info!("connection {connection}: connecting to {}", redacted(&url));
        let socket =
            tokio_tungstenite::connect_async_with_config(url.as_str(), Some(self.config()), false)
                .await;
        let (stream, _response) = match socket {
            Ok(pair) => pair,
            Err(err) => {
                sink.emit(failed(connection, FailureKind::Connect, err.to_string()));
                return;
            }
        };
        sink.emit(EngineEvent::Opened { connection });
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        sink.emit(EngineEvent::Message { connection, text });
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => sink.emit(EngineEvent::Message { connection, text }),
                        Err(_) => {
                            pg_warn!("connection {connection}: dropping non-utf8 binary message");
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        pg_info!("connection {connection}: server closed ({frame:?})");
                        sink.emit(EngineEvent::Closed { connection });
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        sink.emit(failed(connection, FailureKind::Stream, err.to_string()));
                        return;
                    }
                    None => {
                        sink.emit(EngineEvent::Closed { connection });
                        return;
                    }
                },
                command = outgoing.recv() => match command {
                    Some(Outgoing::Text(text)) => {
                        pg_debug!("connection {connection}: sending {} bytes", text.len());
                        if let Err(err) = write.send(Message::Text(text)).await {
                            sink.emit(failed(connection, FailureKind::Send, err.to_string()));
                            return;
                        }
                    }
                    Some(Outgoing::Close) | None => {
                        if let Err(err) = write.close().await {
                            pg_debug!("connection {connection}: close handshake failed: {err}");
                        }
                        sink.emit(EngineEvent::Closed { connection });
                        return;
                    }
                },
            }
        }
    }
}

fn failed(connection: ConnectionId, kind: FailureKind, message: String) -> EngineEvent {
    let error = TransportError::new(kind, message);
    pg_warn!("connection {connection}: {error}");
    EngineEvent::Failed { connection, error }
}

// Keeps the token out of the log.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
