//! Events the receive loop reports to the session's observer.

use murmur_protocol::{Command, ReturnCode};
use tokio::sync::mpsc;

/// Something the server did, or something that happened to the connection.
///
/// Events carry data, not presentation: the observer decides how to show
/// them. `message` fields hold the return-code table text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server accepted our login. The session is now authenticated.
    Authenticated { message: String },

    /// The server rejected our login. The session stays connected.
    LoginFailed { code: ReturnCode, message: String },

    /// The server acknowledged a whisper, join, or shout.
    CommandResult {
        command: Command,
        code: ReturnCode,
        message: String,
    },

    /// Another user's message was pushed to us.
    IncomingWhisper { sender: String, message: String },

    /// A frame couldn't be decoded and was dropped. The connection is
    /// still up.
    FrameDiscarded { reason: String },

    /// The connection ended without us asking. The session is now
    /// disconnected.
    ConnectionLost { reason: String },
}

/// The observer's end of the event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;
