//! The background receive loop: one task per live connection.
//!
//! The flow is:
//!   1. Wait for either a chunk of bytes or the stop signal
//!   2. Read the chunk into a buffer and decode every complete frame in it
//!   3. Apply each response to session state and emit an event
//!   4. On a zero-length read or socket error, mark the session
//!      disconnected and emit `ConnectionLost`

use std::sync::Arc;

use bytes::BytesMut;
use murmur_protocol::{ClientCodec, Command, Response, ReturnCode};
use murmur_transport::{Connection, ConnectionId, TcpConnection};
use tokio_util::codec::Decoder;
use tokio_util::sync::CancellationToken;

use crate::correlate::{Correlation, Correlator};
use crate::session::Shared;
use crate::{SessionEvent, SessionState};

/// Reads from `conn` until it closes or `stop` is cancelled.
pub(crate) async fn receive_loop<C: Correlator>(
    shared: Arc<Shared<C>>,
    conn: Arc<TcpConnection>,
    stop: CancellationToken,
    mut codec: ClientCodec,
) {
    let conn_id = conn.id();
    let mut buf = BytesMut::new();
    tracing::debug!(%conn_id, "receive loop started");

    let reason = loop {
        let read = tokio::select! {
            biased;
            // Cancelled by `disconnect`, or by dropping the session.
            _ = stop.cancelled() => {
                tracing::debug!(%conn_id, "receive loop stopped");
                return;
            }
            read = conn.recv(&mut buf) => read,
        };

        match read {
            Ok(Some(len)) => {
                tracing::trace!(%conn_id, len, "read chunk");
                drain_frames(&shared, conn_id, &mut codec, &mut buf).await;
            }
            Ok(None) => break "server closed the connection".to_string(),
            Err(e) => break e.to_string(),
        }
    };

    connection_lost(&shared, conn_id, reason).await;
}

/// Decodes and handles every complete frame in `buf`.
///
/// A bad frame is reported and skipped; the frames behind it still run.
async fn drain_frames<C: Correlator>(
    shared: &Shared<C>,
    conn_id: ConnectionId,
    codec: &mut ClientCodec,
    buf: &mut BytesMut,
) {
    loop {
        match codec.decode(buf) {
            Ok(Some(response)) => {
                handle_response(shared, conn_id, response).await;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "discarding frame");
                shared.emit(SessionEvent::FrameDiscarded {
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Applies one response to session state and tells the observer.
async fn handle_response<C: Correlator>(
    shared: &Shared<C>,
    conn_id: ConnectionId,
    response: Response,
) {
    tracing::debug!(%conn_id, opcode = %response.opcode(), "received frame");

    let mut inner = shared.inner.lock().await;
    if !inner.is_current(conn_id) {
        // The session moved on (disconnected, or reconnected elsewhere).
        return;
    }

    if let Some((command, _)) = response.ack() {
        if inner.correlator.response_received(command)
            == Correlation::Unsolicited
        {
            tracing::debug!(%conn_id, %command, "unsolicited acknowledgement");
        }
    }

    let event = match response {
        Response::Login(code) if code.is_success() => {
            if inner.state == SessionState::Connected {
                inner.state = SessionState::Authenticated;
                tracing::info!(%conn_id, "logged in");
            }
            SessionEvent::Authenticated {
                message: code.to_string(),
            }
        }
        Response::Login(code) => {
            tracing::info!(%conn_id, %code, "login rejected");
            SessionEvent::LoginFailed {
                code,
                message: code.to_string(),
            }
        }
        Response::Whisper(code) => command_result(Command::Whisper, code),
        Response::JoinRoom(code) => command_result(Command::JoinRoom, code),
        Response::Shout(code) => command_result(Command::Shout, code),
        Response::WhisperDelivery { sender, message } => {
            SessionEvent::IncomingWhisper { sender, message }
        }
    };

    // Emitted under the lock so events can't overtake the state change
    // they describe.
    shared.emit(event);
}

fn command_result(command: Command, code: ReturnCode) -> SessionEvent {
    SessionEvent::CommandResult {
        command,
        code,
        message: code.to_string(),
    }
}

/// Tears the session down after the connection ended on its own.
///
/// Does nothing if `disconnect` already took this connection away, so the
/// observer hears about a loss at most once, and never for a disconnect
/// it asked for.
async fn connection_lost<C: Correlator>(
    shared: &Shared<C>,
    conn_id: ConnectionId,
    reason: String,
) {
    let mut inner = shared.inner.lock().await;
    if !inner.is_current(conn_id) {
        return;
    }

    // Dropping the link drops our handle to this very task, which just
    // detaches it; the task ends when this function returns.
    inner.link = None;
    inner.state = SessionState::Disconnected;

    tracing::warn!(%conn_id, %reason, "connection lost");
    shared.emit(SessionEvent::ConnectionLost { reason });
}
