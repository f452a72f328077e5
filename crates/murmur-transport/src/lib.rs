//! Transport layer for Murmur.
//!
//! Provides the [`Connection`] trait, which abstracts a bidirectional byte
//! pipe to the server, and [`TcpConnection`], its TCP implementation.
//!
//! The transport knows nothing about frames. [`Connection::recv`] appends
//! whatever one socket read produced to the caller's buffer; the session
//! layer is responsible for cutting frames out of it.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{DEFAULT_READ_BUFFER_SIZE, TcpConnection};

use std::fmt;

use bytes::BytesMut;

/// Opaque identifier for a connection.
///
/// Every successful connect gets a fresh id, so code holding an id can
/// tell whether "the current connection" is still the one it started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single connection that can send and receive bytes.
///
/// Both methods take `&self` so one task can sit in [`recv`](Self::recv)
/// while another calls [`send`](Self::send). Implementations must keep the
/// two directions independent: a pending receive never blocks a send.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Writes all of `data` to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads the next chunk of bytes from the remote peer, appending it to
    /// `buf`, and returns how many bytes were added.
    ///
    /// Chunk boundaries are arbitrary. Returns `Ok(None)` when the peer
    /// has closed the connection (a zero-length read).
    async fn recv(&self, buf: &mut BytesMut) -> Result<Option<usize>, Self::Error>;

    /// Closes the sending direction, telling the peer we're done.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
