//! # Murmur
//!
//! Async client for a small binary chat protocol over TCP.
//!
//! A [`Session`] owns one connection to a chat server. Callers drive it with
//! `connect`, `login`, `whisper`, `join_room`, `shout` and `disconnect`;
//! everything the server says back arrives as a [`SessionEvent`] on the
//! stream handed out alongside the session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use murmur::prelude::*;
//!
//! # async fn run() -> Result<(), MurmurError> {
//! let config = ClientConfig::default();
//! let (session, mut events) = config.connect().await?;
//! session.login("alice", "secret").await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;

pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::MurmurError;

/// Re-exports of the lower layers, for callers that need them directly.
pub use murmur_protocol as protocol;
pub use murmur_session as session;
pub use murmur_transport as transport;

/// Everything needed to write a chat client.
pub mod prelude {
    pub use crate::{ClientConfig, MurmurError};
    pub use murmur_protocol::{Command, ReturnCode};
    pub use murmur_session::{
        EventReceiver, Session, SessionConfig, SessionError, SessionEvent,
        SessionState,
    };
}
