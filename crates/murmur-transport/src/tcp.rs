//! TCP transport implementation using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Most bytes a single socket read may return, unless overridden.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// A TCP connection to the chat server.
///
/// The stream is split into owned read and write halves, each behind its
/// own lock. The receive loop holds the read lock while it waits for data;
/// senders only ever touch the write lock, so they never queue behind it.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
    read_buffer_size: usize,
}

impl TcpConnection {
    /// Opens a TCP connection to `host:port`.
    ///
    /// `host` may be an IP literal or a name to resolve.
    ///
    /// # Errors
    /// - [`TransportError::ConnectTimedOut`] if the handshake takes longer
    ///   than `timeout`.
    /// - [`TransportError::ConnectFailed`] for any other failure.
    pub async fn connect(
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");

        let stream =
            match tokio::time::timeout(timeout, TcpStream::connect((host, port)))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(source)) => {
                    return Err(TransportError::ConnectFailed { addr, source });
                }
                Err(_) => return Err(TransportError::ConnectTimedOut(addr)),
            };

        // Frames are tiny; don't let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not set TCP_NODELAY");
        }

        let peer = stream
            .peer_addr()
            .map_err(|source| TransportError::ConnectFailed {
                addr: addr.clone(),
                source,
            })?;

        let id =
            ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "TCP connection established");

        let (reader, writer) = stream.into_split();
        Ok(Self {
            id,
            peer,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        })
    }

    /// Sets how many bytes a single [`recv`](Connection::recv) may return.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Returns the server's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)
    }

    async fn recv(
        &self,
        buf: &mut BytesMut,
    ) -> Result<Option<usize>, Self::Error> {
        buf.reserve(self.read_buffer_size);
        let mut reader = self.reader.lock().await;
        // `read_buf` is cancel-safe: if this future is dropped mid-wait (the
        // session is disconnecting), no bytes are lost from the stream.
        let n = (&mut *reader)
            .take(self.read_buffer_size as u64)
            .read_buf(buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if n == 0 {
            return Ok(None);
        }
        Ok(Some(n))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
