use std::fmt;

use playground_logging::{pg_debug, pg_info, pg_warn};

use crate::ValidationError;

/// Identifies one transport connection. Each `connect` gets a fresh id so
/// events from an earlier socket can be told apart from the current one.
pub type ConnectionId = u64;

/// Which endpoint the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Interactive playground: task commands are accepted.
    #[default]
    Playground,
    /// View-only stream of an existing job.
    LiveView,
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamMode::Playground => write!(f, "playground"),
            StreamMode::LiveView => write!(f, "live-view"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Transport-free half of the session connection.
///
/// `Disconnected -> Connecting -> Connected -> Disconnected`, with transport
/// errors passing through `Error` before settling in `Disconnected`. There is
/// no automatic reconnect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    status: SessionStatus,
    token: Option<String>,
    mode: StreamMode,
    connection: Option<ConnectionId>,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a connection attempt under `connection`.
    pub fn connect(
        &mut self,
        token: &str,
        mode: StreamMode,
        connection: ConnectionId,
    ) -> Result<(), ValidationError> {
        if token.is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        if matches!(
            self.status,
            SessionStatus::Connecting | SessionStatus::Connected
        ) {
            return Err(ValidationError::AlreadyActive);
        }
        self.status = SessionStatus::Connecting;
        self.token = Some(token.to_string());
        self.mode = mode;
        self.connection = Some(connection);
        self.last_error = None;
        pg_info!("session: connecting ({mode}) as connection {connection}");
        Ok(())
    }

    /// Ends the session eagerly and returns the connection to close.
    pub fn disconnect(&mut self) -> Result<ConnectionId, ValidationError> {
        let connection = match (self.status, self.connection) {
            (SessionStatus::Connecting | SessionStatus::Connected, Some(connection)) => {
                connection
            }
            _ => return Err(ValidationError::NotConnected),
        };
        self.reset();
        pg_info!("session: disconnected connection {connection}");
        Ok(connection)
    }

    /// Gate for every outbound write.
    pub fn ensure_connected(&self) -> Result<ConnectionId, ValidationError> {
        match (self.status, self.connection) {
            (SessionStatus::Connected, Some(connection)) => Ok(connection),
            _ => Err(ValidationError::NotConnected),
        }
    }

    /// Transport reported the socket open. Returns whether it applied.
    pub fn on_open(&mut self, connection: ConnectionId) -> bool {
        if !self.is_current(connection) || self.status != SessionStatus::Connecting {
            pg_debug!("session: ignoring open for connection {connection}");
            return false;
        }
        self.status = SessionStatus::Connected;
        pg_info!("session: connection {connection} open");
        true
    }

    /// Transport reported the socket closed. Returns whether it applied.
    pub fn on_close(&mut self, connection: ConnectionId) -> bool {
        if !self.is_current(connection) {
            pg_debug!("session: ignoring close for connection {connection}");
            return false;
        }
        self.reset();
        pg_info!("session: connection {connection} closed");
        true
    }

    /// Transport reported a failure. The session passes through `Error` and
    /// lands in `Disconnected`, keeping the message as `last_error`.
    pub fn on_error(&mut self, connection: ConnectionId, message: &str) -> bool {
        if !self.is_current(connection) {
            pg_debug!("session: ignoring error for connection {connection}: {message}");
            return false;
        }
        self.status = SessionStatus::Error;
        pg_warn!("session: connection {connection} failed: {message}");
        self.reset();
        self.last_error = Some(message.to_string());
        true
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether inbound data on `connection` belongs to this session.
    pub fn is_live(&self, connection: ConnectionId) -> bool {
        self.status == SessionStatus::Connected && self.is_current(connection)
    }

    fn is_current(&self, connection: ConnectionId) -> bool {
        self.connection == Some(connection)
    }

    fn reset(&mut self) {
        self.status = SessionStatus::Disconnected;
        self.token = None;
        self.connection = None;
    }
}
