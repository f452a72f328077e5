//! Wire protocol for Murmur.
//!
//! This crate defines the "language" that a chat client and server speak:
//!
//! - **Types** ([`Opcode`], [`Request`], [`Response`], [`ReturnCode`]) —
//!   the messages that travel on the wire.
//! - **Codec** ([`encode`], [`decode`], [`ClientCodec`]) — how those
//!   messages are converted to and from big-endian, length-prefixed bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (connection and login state). It is pure: no sockets, no shared state.
//!
//! ```text
//! Transport (bytes) → Protocol (Response) → Session (state + events)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

pub mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{
    ClientCodec, ServerCodec, DEFAULT_MAX_INBOUND_FIELD_LEN, decode,
    decode_request, encode, encode_response,
};
pub use error::ProtocolError;
pub use types::{
    Command, MAX_MESSAGE_LEN, MAX_PASSWORD_LEN, MAX_ROOM_NAME_LEN,
    MAX_USERNAME_LEN, Opcode, Request, Response, ReturnCode,
};
