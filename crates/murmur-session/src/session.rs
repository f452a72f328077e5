//! The client session: one connection, its state, and the gates on every
//! outgoing command.
//!
//! # Concurrency
//!
//! Two execution contexts touch a session: the caller (connect, login,
//! disconnect, ...) and the background receive loop (login accepted,
//! connection lost). Both go through one `tokio::sync::Mutex<Inner>`, so
//! state and the live link always change together.
//!
//! The socket itself isn't behind that lock. Sends clone the connection
//! handle out of the lock and write after releasing it, so a slow write
//! never blocks the receive loop from updating state.
//!
//! Stop signals aren't behind it either. Each session owns a root
//! [`CancellationToken`]; every handshake and every receive loop gets a
//! child of it. `disconnect` cancels the child it took from `Inner`, and
//! dropping the session cancels the root, which reaches every child
//! without touching the lock.

use std::net::SocketAddr;
use std::sync::Arc;

use murmur_protocol::{ClientCodec, Request, encode};
use murmur_transport::{Connection, ConnectionId, TcpConnection, TransportError};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::correlate::{Correlator, OpcodeCorrelator};
use crate::receiver::receive_loop;
use crate::{EventReceiver, SessionConfig, SessionError, SessionEvent, SessionState};

/// A live connection and the task reading from it.
pub(crate) struct Link {
    pub(crate) conn: Arc<TcpConnection>,
    stop: CancellationToken,
    task: JoinHandle<()>,
}

/// Everything guarded by the session lock.
pub(crate) struct Inner<C> {
    pub(crate) state: SessionState,
    pub(crate) link: Option<Link>,
    pub(crate) correlator: C,
    /// Cancels the handshake of the `connect` in flight, if any.
    pending_connect: Option<CancellationToken>,
}

impl<C> Inner<C> {
    /// Returns `true` if `id` is the connection this session is using now.
    ///
    /// A receive loop checks this before touching state, so a loop left
    /// over from an earlier connection can't disturb a newer one.
    pub(crate) fn is_current(&self, id: ConnectionId) -> bool {
        self.link.as_ref().is_some_and(|link| link.conn.id() == id)
    }
}

/// State shared between the caller-facing [`Session`] and its receive loop.
pub(crate) struct Shared<C> {
    pub(crate) inner: Mutex<Inner<C>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<C> Shared<C> {
    /// Delivers an event to the observer.
    pub(crate) fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("event observer is gone, dropping event");
        }
    }
}

/// Which state a command needs before it may be sent.
#[derive(Clone, Copy)]
enum Gate {
    /// Connected but not yet logged in.
    Unauthenticated,
    /// Logged in.
    Authenticated,
}

/// A chat client session.
///
/// Create one with [`Session::new`], which also hands back the
/// [`EventReceiver`] that the receive loop reports to. The session can be
/// connected and disconnected any number of times; the event stream spans
/// all of them.
///
/// ## Lifecycle
///
/// ```text
/// connect() ──→ login() ──(ack 0)──→ whisper() / join_room() / shout()
///     │                                          │
///     └──────── disconnect() or peer close ──────┘──→ Disconnected
/// ```
///
/// `C` is the strategy for matching acknowledgements to requests; the
/// default matches on opcode alone.
pub struct Session<C: Correlator = OpcodeCorrelator> {
    shared: Arc<Shared<C>>,
    config: SessionConfig,
    closed: CancellationToken,
}

impl Session<OpcodeCorrelator> {
    /// Creates a disconnected session and its event stream.
    pub fn new(config: SessionConfig) -> (Self, EventReceiver) {
        Self::with_correlator(config, OpcodeCorrelator::new())
    }
}

impl<C: Correlator> Session<C> {
    /// Creates a disconnected session using a custom [`Correlator`].
    pub fn with_correlator(
        config: SessionConfig,
        correlator: C,
    ) -> (Self, EventReceiver) {
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: SessionState::Disconnected,
                link: None,
                correlator,
                pending_connect: None,
            }),
            events,
        });
        let session = Self {
            shared,
            config,
            closed: CancellationToken::new(),
        };
        (session, rx)
    }

    /// Returns the current state.
    pub async fn state(&self) -> SessionState {
        self.shared.inner.lock().await.state
    }

    /// Returns `true` while a live socket exists.
    pub async fn is_connected(&self) -> bool {
        self.state().await.is_connected()
    }

    /// Returns `true` once the server has accepted a login.
    pub async fn is_authenticated(&self) -> bool {
        self.state().await.is_authenticated()
    }

    /// Returns the server's address while connected.
    pub async fn peer_addr(&self) -> Option<SocketAddr> {
        let inner = self.shared.inner.lock().await;
        inner.link.as_ref().map(|link| link.conn.peer_addr())
    }

    /// Opens a connection and starts the receive loop.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyConnected`] unless the session is
    ///   disconnected.
    /// - [`SessionError::ConnectError`] if the TCP handshake fails, times
    ///   out, or is abandoned by a concurrent `disconnect`. The session is
    ///   left disconnected.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> Result<(), SessionError> {
        let cancel = {
            let mut inner = self.shared.inner.lock().await;
            if inner.state != SessionState::Disconnected {
                return Err(SessionError::AlreadyConnected);
            }
            // Hold `Connecting` while the handshake runs unlocked, so a
            // second `connect` is rejected instead of racing this one.
            inner.state = SessionState::Connecting;
            let cancel = self.closed.child_token();
            inner.pending_connect = Some(cancel.clone());
            cancel
        };

        let result = tokio::select! {
            result = TcpConnection::connect(
                host,
                port,
                self.config.connect_timeout,
            ) => Some(result),
            _ = cancel.cancelled() => None,
        };

        let mut inner = self.shared.inner.lock().await;
        // A `disconnect` that ran meanwhile cancelled our token and already
        // put the state back; a later `connect` may even own it now.
        let result = match result {
            Some(result) if !cancel.is_cancelled() => result,
            _ => {
                tracing::info!(host, port, "connect abandoned by disconnect");
                return Err(SessionError::ConnectError(
                    TransportError::ConnectionClosed(
                        "connect cancelled by disconnect".into(),
                    ),
                ));
            }
        };
        inner.pending_connect = None;

        let conn = match result {
            Ok(conn) => conn,
            Err(e) => {
                inner.state = SessionState::Disconnected;
                tracing::info!(host, port, error = %e, "connect failed");
                return Err(SessionError::ConnectError(e));
            }
        };

        let conn = Arc::new(
            conn.with_read_buffer_size(self.config.read_buffer_size),
        );
        let conn_id = conn.id();
        let stop = self.closed.child_token();
        let codec =
            ClientCodec::with_max_field_len(self.config.max_inbound_field_len);

        // Spawned while we still hold the lock: the loop can't observe
        // state until the link below is in place.
        let task = tokio::spawn(receive_loop(
            Arc::clone(&self.shared),
            Arc::clone(&conn),
            stop.clone(),
            codec,
        ));

        inner.correlator.reset();
        inner.link = Some(Link { conn, stop, task });
        inner.state = SessionState::Connected;

        tracing::info!(%conn_id, host, port, "connected");
        Ok(())
    }

    /// Sends a login request.
    ///
    /// The session becomes authenticated later, when the receive loop sees
    /// a successful acknowledgement; watch for
    /// [`SessionEvent::Authenticated`] or [`SessionEvent::LoginFailed`].
    ///
    /// # Errors
    /// - [`SessionError::NotConnected`] if disconnected.
    /// - [`SessionError::AlreadyAuthenticated`] if already logged in.
    /// - [`SessionError::Protocol`] if a field is too long.
    /// - [`SessionError::Transport`] if the write fails.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let request = Request::Login {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        self.send(request, Gate::Unauthenticated).await
    }

    /// Sends a private message to `target`.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] unless logged in.
    /// - [`SessionError::Protocol`] if `message` exceeds 256 bytes or
    ///   `target` exceeds 32.
    /// - [`SessionError::Transport`] if the write fails.
    pub async fn whisper(
        &self,
        target: &str,
        message: &str,
    ) -> Result<(), SessionError> {
        let request = Request::Whisper {
            target: target.to_owned(),
            message: message.to_owned(),
        };
        self.send(request, Gate::Authenticated).await
    }

    /// Asks to enter the room named `room`.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] unless logged in.
    /// - [`SessionError::Protocol`] if `room` exceeds 32 bytes.
    /// - [`SessionError::Transport`] if the write fails.
    pub async fn join_room(&self, room: &str) -> Result<(), SessionError> {
        let request = Request::JoinRoom {
            room: room.to_owned(),
        };
        self.send(request, Gate::Authenticated).await
    }

    /// Sends a message to the current room.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] unless logged in.
    /// - [`SessionError::Protocol`] if `message` exceeds 256 bytes.
    /// - [`SessionError::Transport`] if the write fails.
    pub async fn shout(&self, message: &str) -> Result<(), SessionError> {
        let request = Request::Shout {
            message: message.to_owned(),
        };
        self.send(request, Gate::Authenticated).await
    }

    /// Closes the connection and waits for the receive loop to finish.
    ///
    /// Calling this while already disconnected does nothing. No
    /// [`SessionEvent::ConnectionLost`] is emitted for a disconnect the
    /// caller asked for.
    pub async fn disconnect(&self) {
        let link = {
            let mut inner = self.shared.inner.lock().await;
            if inner.state == SessionState::Disconnected {
                return;
            }
            inner.state = SessionState::Disconnected;
            if let Some(pending) = inner.pending_connect.take() {
                pending.cancel();
            }
            inner.link.take()
        };

        // `None` here means we interrupted a `connect` mid-handshake;
        // its token is cancelled and it backs out on its own.
        let Some(link) = link else {
            return;
        };
        let conn_id = link.conn.id();

        // Stop the loop first so it doesn't report the close as a loss.
        link.stop.cancel();

        match tokio::time::timeout(
            self.config.shutdown_timeout,
            link.conn.close(),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "close failed");
            }
            Err(_) => {
                tracing::debug!(%conn_id, "close timed out, dropping socket");
            }
        }

        if let Err(e) = link.task.await {
            tracing::warn!(%conn_id, error = %e, "receive loop panicked");
        }

        tracing::info!(%conn_id, "disconnected");
    }

    /// Checks the gate, encodes, and writes one request.
    async fn send(
        &self,
        request: Request,
        gate: Gate,
    ) -> Result<(), SessionError> {
        let command = request.command();

        let (conn, bytes) = {
            let mut inner = self.shared.inner.lock().await;

            match (gate, inner.state) {
                (Gate::Unauthenticated, SessionState::Connected)
                | (Gate::Authenticated, SessionState::Authenticated) => {}
                (
                    Gate::Unauthenticated,
                    SessionState::Disconnected | SessionState::Connecting,
                ) => return Err(SessionError::NotConnected),
                (Gate::Unauthenticated, SessionState::Authenticated) => {
                    return Err(SessionError::AlreadyAuthenticated);
                }
                (Gate::Authenticated, _) => {
                    return Err(SessionError::NotAuthenticated);
                }
            }

            let bytes = encode(&request)?;
            let Some(link) = inner.link.as_ref() else {
                return Err(SessionError::NotConnected);
            };
            let conn = Arc::clone(&link.conn);
            inner.correlator.request_sent(command);
            (conn, bytes)
        };

        let conn_id = conn.id();
        tracing::debug!(%conn_id, %command, bytes = bytes.len(), "sending request");

        if let Err(e) = conn.send(&bytes).await {
            // The request never reached the server; don't wait for its ack.
            let mut inner = self.shared.inner.lock().await;
            if inner.is_current(conn_id) {
                inner.correlator.request_failed(command);
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// Stops the receive loop if the session is dropped while connected.
///
/// `Drop` can't await, so this only signals the loop. Once the loop exits
/// it releases the shared state, which closes the socket and ends the
/// event stream.
impl<C: Correlator> Drop for Session<C> {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

#[cfg(test)]
mod tests {
    //! State gating without a network. Connected-state behavior is covered
    //! by the integration tests in `tests/`.

    use std::time::Duration;

    use murmur_protocol::Command;
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn session() -> Session {
        Session::new(SessionConfig::default()).0
    }

    /// Connects a fresh session to a local listener and returns the
    /// server's end, which stays silent unless the test writes to it.
    async fn connected() -> (Session, EventReceiver, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (session, events) = Session::new(SessionConfig::default());

        let (connect, accepted) =
            tokio::join!(session.connect("127.0.0.1", port), listener.accept());
        connect.expect("connect should succeed");
        (session, events, accepted.unwrap().0)
    }

    #[tokio::test]
    async fn test_new_session_is_disconnected() {
        let s = session();
        assert_eq!(s.state().await, SessionState::Disconnected);
        assert!(s.peer_addr().await.is_none());
    }

    #[tokio::test]
    async fn test_login_while_disconnected_returns_not_connected() {
        let s = session();
        let result = s.login("alice", "secret").await;
        assert!(matches!(result, Err(SessionError::NotConnected)));
    }

    #[tokio::test]
    async fn test_commands_while_disconnected_return_not_authenticated() {
        let s = session();
        assert!(matches!(
            s.whisper("bob", "hi").await,
            Err(SessionError::NotAuthenticated)
        ));
        assert!(matches!(
            s.join_room("lobby").await,
            Err(SessionError::NotAuthenticated)
        ));
        assert!(matches!(
            s.shout("hello").await,
            Err(SessionError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_gate_is_checked_before_field_bounds() {
        // An oversized message on an unauthenticated session reports the
        // state problem, not the encoding one.
        let s = session();
        let result = s.whisper("bob", &"x".repeat(1000)).await;
        assert!(matches!(result, Err(SessionError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_disconnect_while_disconnected_is_noop() {
        let s = session();
        s.disconnect().await;
        s.disconnect().await;
        assert_eq!(s.state().await, SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_drop_while_lock_held_still_ends_event_stream() {
        let (s, mut events, _server) = connected().await;

        // The receive loop holds this lock while it applies each frame.
        let shared = Arc::clone(&s.shared);
        let guard = shared.inner.lock().await;
        drop(s);
        drop(guard);
        drop(shared);

        let end = tokio::time::timeout(TIMEOUT, events.recv())
            .await
            .expect("event stream should close after the session is dropped");
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_is_not_left_outstanding() {
        let (s, _events, _server) = connected().await;

        s.login("alice", "secret").await.unwrap();
        let conn = {
            let inner = s.shared.inner.lock().await;
            assert_eq!(inner.correlator.outstanding(Command::Login), 1);
            Arc::clone(&inner.link.as_ref().unwrap().conn)
        };

        // Half-close our side so the next write fails.
        conn.close().await.unwrap();
        let result = s.login("alice", "secret").await;
        assert!(matches!(result, Err(SessionError::Transport(_))));

        let inner = s.shared.inner.lock().await;
        assert_eq!(inner.correlator.outstanding(Command::Login), 1);
    }
}
