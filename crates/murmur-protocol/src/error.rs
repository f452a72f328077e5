//! Error types for the protocol layer.
//!
//! Each crate in Murmur defines its own error enum. When you see a
//! `ProtocolError`, the problem is in building or parsing a frame, not in
//! networking or session state.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A length-bounded field is longer than the protocol allows.
    ///
    /// Raised at construction time, before anything touches the network.
    /// `len` and `max` are UTF-8 byte counts.
    #[error("{field} is {len} bytes, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The bytes don't form a valid frame: truncated header, truncated
    /// field, invalid UTF-8, or a declared length beyond the inbound limit.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The leading opcode is none of the defined values.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),

    /// An I/O error surfaced through a streaming codec.
    ///
    /// `tokio_util`'s `Decoder`/`Encoder` traits require the error type to
    /// be constructible from `std::io::Error`.
    #[error("codec i/o error: {0}")]
    Io(#[from] std::io::Error),
}
