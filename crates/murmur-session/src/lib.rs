//! Client session management for Murmur.
//!
//! This crate owns the client's side of a conversation with the server:
//!
//! 1. **Connection state** — a [`Session`] moves through
//!    [`SessionState`]s and refuses commands its state doesn't allow
//! 2. **Receive loop** — one background task per connection turns bytes
//!    into [`SessionEvent`]s
//! 3. **Correlation** — matching acknowledgements to requests, behind the
//!    [`Correlator`] trait
//!
//! # How it fits in the stack
//!
//! ```text
//! Shell / UI (above)  ← calls Session methods, renders SessionEvents
//!     ↕
//! Session Layer (this crate)  ← state gates, receive loop
//!     ↕
//! Protocol + Transport (below)  ← frames, TCP bytes
//! ```

mod correlate;
mod error;
mod event;
mod receiver;
mod session;
mod state;

pub use correlate::{Correlation, Correlator, OpcodeCorrelator};
pub use error::SessionError;
pub use event::{EventReceiver, SessionEvent};
pub use session::Session;
pub use state::{SessionConfig, SessionState};
