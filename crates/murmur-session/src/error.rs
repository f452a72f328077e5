//! Error types for the session layer.

use murmur_protocol::ProtocolError;
use murmur_transport::TransportError;

/// Errors returned synchronously by [`Session`](crate::Session) operations.
///
/// The state-gate variants are raised before anything touches the network.
/// Asynchronous failures (a dropped connection, an undecodable frame)
/// never show up here; they arrive as [`SessionEvent`](crate::SessionEvent)s.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `connect` was called while a connection is open or being opened.
    #[error("already connected")]
    AlreadyConnected,

    /// The operation needs a connection and there isn't one.
    #[error("not connected")]
    NotConnected,

    /// The operation needs a successful login first.
    #[error("not logged in")]
    NotAuthenticated,

    /// `login` was called on a session that is already logged in.
    #[error("already logged in")]
    AlreadyAuthenticated,

    /// The TCP handshake failed. The session stays disconnected.
    #[error("could not connect: {0}")]
    ConnectError(#[source] TransportError),

    /// The request couldn't be encoded (e.g. a field is too long).
    /// Nothing was sent.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Writing the request to the socket failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
