use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use playground_engine::{
    ConnectSettings, ConnectionId, Connector, EngineEvent, EngineHandle, Endpoint, EventSink,
    Outgoing, StreamPath,
};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Opens immediately and echoes every outbound text back as inbound.
struct EchoConnector;

#[async_trait::async_trait]
impl Connector for EchoConnector {
    async fn run(
        &self,
        connection: ConnectionId,
        _url: Url,
        mut outgoing: UnboundedReceiver<Outgoing>,
        sink: &dyn EventSink,
    ) {
        sink.emit(EngineEvent::Opened { connection });
        while let Some(command) = outgoing.recv().await {
            match command {
                Outgoing::Text(text) => sink.emit(EngineEvent::Message { connection, text }),
                Outgoing::Close => break,
            }
        }
        sink.emit(EngineEvent::Closed { connection });
    }
}

const WAIT: Duration = Duration::from_secs(5);

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine
        .recv_timeout(WAIT)
        .expect("timed out waiting for engine event")
}

fn url() -> Url {
    Endpoint::default()
        .url_for(StreamPath::PlayGround, "t")
        .unwrap()
}

#[test]
fn sends_are_routed_by_connection() {
    let engine = EngineHandle::with_connector(Arc::new(EchoConnector)).unwrap();

    engine.connect(1, url());
    assert_eq!(next_event(&engine), EngineEvent::Opened { connection: 1 });

    engine.send(1, "hello");
    assert_eq!(
        next_event(&engine),
        EngineEvent::Message {
            connection: 1,
            text: "hello".to_string(),
        }
    );

    // Unknown connections swallow sends.
    engine.send(42, "lost");
    engine.disconnect(1);
    assert_eq!(next_event(&engine), EngineEvent::Closed { connection: 1 });
}

#[test]
fn sends_after_disconnect_are_dropped() {
    let engine = EngineHandle::with_connector(Arc::new(EchoConnector)).unwrap();

    engine.connect(1, url());
    assert_eq!(next_event(&engine), EngineEvent::Opened { connection: 1 });
    engine.disconnect(1);
    engine.send(1, "too late");
    assert_eq!(next_event(&engine), EngineEvent::Closed { connection: 1 });

    engine.connect(2, url());
    assert_eq!(next_event(&engine), EngineEvent::Opened { connection: 2 });
    engine.send(2, "fresh");
    assert_eq!(
        next_event(&engine),
        EngineEvent::Message {
            connection: 2,
            text: "fresh".to_string(),
        }
    );
}

#[test]
fn shutdown_waits_for_open_and_closing_connections() {
    let engine = EngineHandle::with_connector(Arc::new(EchoConnector)).unwrap();

    engine.connect(1, url());
    engine.connect(2, url());
    let mut opened = vec![next_event(&engine), next_event(&engine)];
    opened.sort_by_key(EngineEvent::connection);
    assert_eq!(
        opened,
        vec![
            EngineEvent::Opened { connection: 1 },
            EngineEvent::Opened { connection: 2 },
        ]
    );

    engine.disconnect(1);
    engine.shutdown(WAIT);

    let mut closed = vec![next_event(&engine), next_event(&engine)];
    closed.sort_by_key(EngineEvent::connection);
    assert_eq!(
        closed,
        vec![
            EngineEvent::Closed { connection: 1 },
            EngineEvent::Closed { connection: 2 },
        ]
    );
    // Worker gone: the event queue ends and later commands go nowhere.
    assert_eq!(engine.recv(), None);
    engine.connect(3, url());
    assert_eq!(engine.recv_timeout(Duration::from_millis(50)), None);
}

#[test]
fn shutdown_without_connections_returns() {
    let engine = EngineHandle::with_connector(Arc::new(EchoConnector)).unwrap();
    engine.shutdown(WAIT);
    engine.shutdown(WAIT);
    assert_eq!(engine.recv(), None);
}

#[test]
fn real_socket_round_trip() {
    let server_runtime = tokio::runtime::Runtime::new().unwrap();
    let listener = server_runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let server = server_runtime.spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text(r#"{"type":"browser_frame"}"#.to_string()))
            .await
            .unwrap();
        let command = ws.next().await.unwrap().unwrap();
        ws.send(command).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    let engine = EngineHandle::new(ConnectSettings::default()).unwrap();
    let endpoint = Endpoint::parse(&format!("ws://{addr}/agent/")).unwrap();
    engine.connect(7, endpoint.url_for(StreamPath::PlayGround, "t").unwrap());

    assert_eq!(next_event(&engine), EngineEvent::Opened { connection: 7 });
    assert_eq!(
        next_event(&engine),
        EngineEvent::Message {
            connection: 7,
            text: r#"{"type":"browser_frame"}"#.to_string(),
        }
    );
    engine.send(7, r#"{"COMMAND":"C2S_PAUSE"}"#);
    assert_eq!(
        next_event(&engine),
        EngineEvent::Message {
            connection: 7,
            text: r#"{"COMMAND":"C2S_PAUSE"}"#.to_string(),
        }
    );
    engine.disconnect(7);
    assert_eq!(next_event(&engine), EngineEvent::Closed { connection: 7 });

    server_runtime.block_on(server).unwrap();
    engine.shutdown(WAIT);
}
