//! Session state and configuration.

use std::fmt;
use std::time::Duration;

use murmur_protocol::DEFAULT_MAX_INBOUND_FIELD_LEN;
use murmur_transport::DEFAULT_READ_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a session is in its connection lifecycle.
///
/// ```text
///   Disconnected ──connect()──→ Connecting ──ok──→ Connected ──login ack 0──→ Authenticated
///        ↑                          │                  │                           │
///        └──────────failed──────────┘                  │                           │
///        └────────────── disconnect() / peer closed ───┴───────────────────────────┘
/// ```
///
/// Being one enum rather than two flags makes "authenticated but not
/// connected" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// The TCP handshake is in flight.
    Connecting,
    /// Connected, not logged in.
    Connected,
    /// Connected and logged in.
    Authenticated,
}

impl SessionState {
    /// Returns `true` while a live socket exists.
    pub fn is_connected(self) -> bool {
        matches!(self, SessionState::Connected | SessionState::Authenticated)
    }

    /// Returns `true` once the server has accepted a login.
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Authenticated => "authenticated",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Tunables for a [`Session`](crate::Session).
///
/// Every field has a default, and `#[serde(default)]` lets a config file
/// name only the fields it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long `connect` waits for the TCP handshake.
    pub connect_timeout: Duration,

    /// How long `disconnect` waits to flush and half-close the socket
    /// before giving up on a graceful close.
    pub shutdown_timeout: Duration,

    /// Size of each socket read in the receive loop.
    pub read_buffer_size: usize,

    /// Largest field length the receive loop will believe. A frame that
    /// declares more is discarded as malformed.
    pub max_inbound_field_len: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(1),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_inbound_field_len: DEFAULT_MAX_INBOUND_FIELD_LEN,
        }
    }
}
