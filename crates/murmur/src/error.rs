//! Unified error type for the Murmur client.

use std::io;
use std::path::PathBuf;

use murmur_protocol::ProtocolError;
use murmur_session::SessionError;
use murmur_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// Callers of the `murmur` facade deal with this one type instead of
/// importing errors from each layer. `#[from]` on each variant lets `?`
/// convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MurmurError {
    /// A transport-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (field too long, malformed frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (wrong state for the command, connect failed).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The configuration file couldn't be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file isn't valid JSON for [`ClientConfig`].
    ///
    /// [`ClientConfig`]: crate::ClientConfig
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
