use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use playground_logging::{pg_debug, pg_info, pg_warn};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;
use url::Url;

use crate::transport::{ChannelEventSink, ConnectSettings, Connector, WsConnector};
use crate::{ConnectionId, EngineEvent, Outgoing};

enum EngineCommand {
    Connect { connection: ConnectionId, url: Url },
    Send { connection: ConnectionId, text: String },
    Disconnect { connection: ConnectionId },
    Shutdown { grace: Duration },
}

/// One spawned connection task. `outgoing` is taken once a close was asked
/// for; the task stays tracked until it finishes.
struct LiveConnection {
    outgoing: Option<UnboundedSender<Outgoing>>,
    task: JoinHandle<()>,
}

/// Handle to the transport worker thread.
///
/// Commands are queued and never block; events come back in the order the
/// connections produced them. Events are meant for a single consumer: a
/// blocked `recv` holds the queue until an event arrives.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    worker: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
}

impl EngineHandle {
    pub fn new(settings: ConnectSettings) -> io::Result<Self> {
        Self::with_connector(Arc::new(WsConnector::new(settings)))
    }

    pub fn with_connector(connector: Arc<dyn Connector>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("playground-engine")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("playground-engine-dispatch".to_string())
            .spawn(move || {
                let mut connections: HashMap<ConnectionId, LiveConnection> = HashMap::new();
                while let Ok(command) = cmd_rx.recv() {
                    if let EngineCommand::Shutdown { grace } = command {
                        close_all(&runtime, &mut connections, grace);
                        break;
                    }
                    dispatch(&runtime, &connector, &event_tx, &mut connections, command);
                }
                pg_debug!("engine dispatch finished; shutting down");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            worker: Arc::new(Mutex::new(Some(worker))),
        })
    }

    pub fn connect(&self, connection: ConnectionId, url: Url) {
        let _ = self.cmd_tx.send(EngineCommand::Connect { connection, url });
    }

    /// Fire-and-forget: dropped if `connection` is gone or closing.
    pub fn send(&self, connection: ConnectionId, text: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Send {
            connection,
            text: text.into(),
        });
    }

    pub fn disconnect(&self, connection: ConnectionId) {
        let _ = self.cmd_tx.send(EngineCommand::Disconnect { connection });
    }

    /// Closes every connection, waits up to `grace` for their close
    /// handshakes, then stops the worker. Later commands are ignored and
    /// `recv` returns `None` once the remaining events are drained.
    pub fn shutdown(&self, grace: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown { grace });
        let worker = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(worker) = worker {
            if worker.join().is_err() {
                pg_warn!("engine dispatch thread panicked");
            }
        }
    }

    /// Blocks until the next event; `None` once the worker is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv().ok()
    }

    /// Like [`recv`](Self::recv) but gives up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

fn dispatch(
    runtime: &Runtime,
    connector: &Arc<dyn Connector>,
    event_tx: &mpsc::Sender<EngineEvent>,
    connections: &mut HashMap<ConnectionId, LiveConnection>,
    command: EngineCommand,
) {
    connections.retain(|_, live| !live.task.is_finished());

    match command {
        EngineCommand::Connect { connection, url } => {
            let (tx, rx) = unbounded_channel();
            let connector = connector.clone();
            let sink = ChannelEventSink::new(event_tx.clone());
            let task = runtime.spawn(async move {
                connector.run(connection, url, rx, &sink).await;
            });
            connections.insert(
                connection,
                LiveConnection {
                    outgoing: Some(tx),
                    task,
                },
            );
        }
        EngineCommand::Send { connection, text } => {
            match connections.get(&connection).and_then(|live| live.outgoing.as_ref()) {
                Some(tx) => {
                    if tx.send(Outgoing::Text(text)).is_err() {
                        pg_debug!("connection {connection} already finished; send dropped");
                    }
                }
                None => pg_debug!("no open connection {connection}; send dropped"),
            }
        }
        EngineCommand::Disconnect { connection } => {
            if let Some(tx) = connections
                .get_mut(&connection)
                .and_then(|live| live.outgoing.take())
            {
                pg_info!("closing connection {connection}");
                let _ = tx.send(Outgoing::Close);
            }
        }
        EngineCommand::Shutdown { .. } => {}
    }
}

fn close_all(
    runtime: &Runtime,
    connections: &mut HashMap<ConnectionId, LiveConnection>,
    grace: Duration,
) {
    let tasks: Vec<JoinHandle<()>> = connections
        .drain()
        .map(|(connection, live)| {
            if let Some(tx) = live.outgoing {
                pg_debug!("closing connection {connection} for shutdown");
                let _ = tx.send(Outgoing::Close);
            }
            live.task
        })
        .collect();
    if tasks.is_empty() {
        return;
    }

    pg_info!("waiting up to {grace:?} for {} connection(s) to close", tasks.len());
    let closed = runtime.block_on(async move {
        tokio::time::timeout(grace, futures_util::future::join_all(tasks)).await
    });
    if closed.is_err() {
        pg_warn!("connections still open after {grace:?}; dropping them");
    }
}
