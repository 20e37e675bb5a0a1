use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use playground_core::{Effect, Msg, StreamMode};
use playground_engine::{ConnectSettings, EngineEvent, EngineHandle, Endpoint, StreamPath};
use playground_logging::{pg_debug, pg_error, pg_info, pg_warn};

use super::console::Input;

/// How long `shutdown` waits for open sockets to finish their close handshake.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Carries controller effects out to the transport engine and engine events
/// back in as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    endpoint: Endpoint,
    tx: mpsc::Sender<Input>,
}

impl EffectRunner {
    pub fn new(
        endpoint: Endpoint,
        settings: ConnectSettings,
        tx: mpsc::Sender<Input>,
    ) -> io::Result<Self> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self {
            engine,
            endpoint,
            tx,
        };
        runner.spawn_event_loop()?;
        Ok(runner)
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::OpenConnection {
                connection,
                mode,
                token,
            } => match self.endpoint.url_for(map_mode(mode), &token) {
                Ok(url) => {
                    pg_info!("OpenConnection connection={connection} mode={mode}");
                    self.engine.connect(connection, url);
                }
                Err(err) => {
                    pg_error!("cannot build stream url: {err}");
                    let _ = self.tx.send(Input::Msg(Msg::TransportFailed {
                        connection,
                        message: err.to_string(),
                    }));
                }
            },
            Effect::CloseConnection { connection } => self.engine.disconnect(connection),
            Effect::Send {
                connection,
                payload,
            } => {
                pg_debug!("Send connection={connection} bytes={}", payload.len());
                self.engine.send(connection, payload);
            }
            // Reported to the operator by the dispatch loop.
            Effect::Rejected(_) => {}
        }
    }

    /// Closes any remaining connection and stops the engine worker.
    pub fn shutdown(&self) {
        self.engine.shutdown(CLOSE_GRACE);
    }

    fn spawn_event_loop(&self) -> io::Result<()> {
        let engine = self.engine.clone();
        let tx = self.tx.clone();
        thread::Builder::new()
            .name("playground-events".to_string())
            .spawn(move || {
                while let Some(event) = engine.recv() {
                    if tx.send(Input::Msg(map_event(event))).is_err() {
                        break;
                    }
                }
                pg_debug!("engine event loop finished");
            })?;
        Ok(())
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Opened { connection } => Msg::TransportOpened { connection },
        EngineEvent::Message { connection, text } => Msg::TransportMessage {
            connection,
            raw: text,
        },
        EngineEvent::Closed { connection } => Msg::TransportClosed { connection },
        EngineEvent::Failed { connection, error } => {
            pg_warn!("connection {connection} failed: {error}");
            Msg::TransportFailed {
                connection,
                message: error.to_string(),
            }
        }
    }
}

pub fn map_mode(mode: StreamMode) -> StreamPath {
    match mode {
        StreamMode::Playground => StreamPath::PlayGround,
        StreamMode::LiveView => StreamPath::LiveStreaming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_engine::{FailureKind, TransportError};
    use pretty_assertions::assert_eq;

    #[test]
    fn engine_events_become_transport_messages() {
        assert_eq!(
            map_event(EngineEvent::Opened { connection: 3 }),
            Msg::TransportOpened { connection: 3 }
        );
        assert_eq!(
            map_event(EngineEvent::Message {
                connection: 3,
                text: "{}".into()
            }),
            Msg::TransportMessage {
                connection: 3,
                raw: "{}".into()
            }
        );
        assert_eq!(
            map_event(EngineEvent::Closed { connection: 4 }),
            Msg::TransportClosed { connection: 4 }
        );
    }

    #[test]
    fn failures_carry_kind_and_message() {
        let msg = map_event(EngineEvent::Failed {
            connection: 9,
            error: TransportError {
                kind: FailureKind::Connect,
                message: "refused".into(),
            },
        });
        match msg {
            Msg::TransportFailed {
                connection,
                message,
            } => {
                assert_eq!(connection, 9);
                assert!(message.contains("refused"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn modes_pick_their_stream_path() {
        assert_eq!(map_mode(StreamMode::Playground), StreamPath::PlayGround);
        assert_eq!(map_mode(StreamMode::LiveView), StreamPath::LiveStreaming);
    }
}
