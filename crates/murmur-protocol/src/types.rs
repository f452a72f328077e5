//! Core protocol types for Murmur's binary wire format.
//!
//! This module defines every type that travels "on the wire": the opcodes
//! that tag each frame, the requests a client sends, and the responses a
//! server sends back (or pushes unprompted).
//!
//! Think of this as the "language" that the client and server speak. How
//! these types become bytes lives in [`codec`](crate::codec).

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Field bounds
// ---------------------------------------------------------------------------

/// Maximum UTF-8 byte length of a whispered or shouted message.
pub const MAX_MESSAGE_LEN: usize = 256;

/// Maximum UTF-8 byte length of a room name.
pub const MAX_ROOM_NAME_LEN: usize = 32;

/// Maximum UTF-8 byte length of a username (login or whisper target).
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum UTF-8 byte length of a password.
pub const MAX_PASSWORD_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Opcode
// ---------------------------------------------------------------------------

/// The 16-bit tag at the front of every frame.
///
/// The set is closed: any other value on the wire is an
/// [`UnknownOpcode`](ProtocolError::UnknownOpcode) error. The numeric
/// values are fixed by the server and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Authenticate with a username and password.
    Login,
    /// Send a private message to one user.
    Whisper,
    /// Enter a named room.
    JoinRoom,
    /// Send a message to everyone in the current room.
    Shout,
    /// Server → Client only: a message pushed from another user.
    WhisperDelivery,
}

impl Opcode {
    /// Every opcode, in wire order.
    pub const ALL: [Opcode; 5] = [
        Opcode::Login,
        Opcode::Whisper,
        Opcode::JoinRoom,
        Opcode::Shout,
        Opcode::WhisperDelivery,
    ];

    /// Returns the on-the-wire value of this opcode.
    pub const fn as_u16(self) -> u16 {
        match self {
            Opcode::Login => 200,
            Opcode::Whisper => 201,
            Opcode::JoinRoom => 202,
            Opcode::Shout => 203,
            Opcode::WhisperDelivery => 299,
        }
    }
}

/// `TryFrom` is the fallible sibling of `From`: the conversion can fail,
/// and the failure is the unknown raw value wrapped in a [`ProtocolError`].
impl TryFrom<u16> for Opcode {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(Opcode::Login),
            201 => Ok(Opcode::Whisper),
            202 => Ok(Opcode::JoinRoom),
            203 => Ok(Opcode::Shout),
            299 => Ok(Opcode::WhisperDelivery),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Login => "Login",
            Opcode::Whisper => "Whisper",
            Opcode::JoinRoom => "JoinRoom",
            Opcode::Shout => "Shout",
            Opcode::WhisperDelivery => "WhisperDelivery",
        };
        write!(f, "{name}({})", self.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Command — the request kinds a client can issue
// ---------------------------------------------------------------------------

/// The four request kinds a client can send.
///
/// This is the subset of [`Opcode`] that can be acknowledged with a
/// return code. `WhisperDelivery` is never a command: the server pushes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Login,
    Whisper,
    JoinRoom,
    Shout,
}

impl Command {
    /// Returns the opcode a request of this kind is framed with.
    pub const fn opcode(self) -> Opcode {
        match self {
            Command::Login => Opcode::Login,
            Command::Whisper => Opcode::Whisper,
            Command::JoinRoom => Opcode::JoinRoom,
            Command::Shout => Opcode::Shout,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Login => "login",
            Command::Whisper => "whisper",
            Command::JoinRoom => "join",
            Command::Shout => "shout",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ReturnCode
// ---------------------------------------------------------------------------

/// The signed 16-bit result code carried by an acknowledgement.
///
/// A newtype over `i16` so a return code can't be confused with any other
/// integer. The human-readable meaning comes from one static table shared
/// by every opcode: `0` is success, `1..=4` name the operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnCode(pub i16);

impl ReturnCode {
    /// The only success value.
    pub const SUCCESS: ReturnCode = ReturnCode(0);

    /// Returns `true` for return code `0`.
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Maps the code to its fixed human-readable string.
    ///
    /// Returns `None` for codes outside the table; `Display` falls back
    /// to a generic "Unknown return code" line in that case.
    pub const fn message(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Action successful"),
            1 => Some("Failed to login"),
            2 => Some("Failed to join room"),
            3 => Some("Failed to whisper"),
            4 => Some("Failed to shout"),
            _ => None,
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => f.write_str(msg),
            None => write!(f, "Unknown return code {}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Request — Client → Server
// ---------------------------------------------------------------------------

/// A request frame sent from client to server.
///
/// Every string field is encoded as a big-endian `u32` byte length followed
/// by the UTF-8 bytes, in the order the fields are declared here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Credentials travel in clear text.
    Login { username: String, password: String },

    /// A private message for `target`.
    Whisper { target: String, message: String },

    /// Enter (or create) the named room.
    JoinRoom { room: String },

    /// A message for everyone else in the current room.
    Shout { message: String },
}

impl Request {
    /// Returns which kind of request this is.
    pub fn command(&self) -> Command {
        match self {
            Request::Login { .. } => Command::Login,
            Request::Whisper { .. } => Command::Whisper,
            Request::JoinRoom { .. } => Command::JoinRoom,
            Request::Shout { .. } => Command::Shout,
        }
    }

    /// Returns the opcode this request is framed with.
    pub fn opcode(&self) -> Opcode {
        self.command().opcode()
    }

    /// Returns the string fields in wire order, each paired with its name
    /// and byte limit.
    pub(crate) fn fields(&self) -> Vec<(&'static str, &str, usize)> {
        match self {
            Request::Login { username, password } => vec![
                ("username", username.as_str(), MAX_USERNAME_LEN),
                ("password", password.as_str(), MAX_PASSWORD_LEN),
            ],
            Request::Whisper { target, message } => vec![
                ("target", target.as_str(), MAX_USERNAME_LEN),
                ("message", message.as_str(), MAX_MESSAGE_LEN),
            ],
            Request::JoinRoom { room } => {
                vec![("room", room.as_str(), MAX_ROOM_NAME_LEN)]
            }
            Request::Shout { message } => {
                vec![("message", message.as_str(), MAX_MESSAGE_LEN)]
            }
        }
    }

    /// Checks every field against its byte limit.
    ///
    /// Lengths are measured after UTF-8 encoding (`str::len` is a byte
    /// count), so "é" counts as two.
    ///
    /// # Errors
    /// Returns [`ProtocolError::FieldTooLong`] naming the first field that
    /// exceeds its bound.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for (field, value, max) in self.fields() {
            if value.len() > max {
                return Err(ProtocolError::FieldTooLong {
                    field,
                    len: value.len(),
                    max,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Response — Server → Client
// ---------------------------------------------------------------------------

/// A response frame received from the server.
///
/// One variant per opcode, so decoding ends in an exhaustive `match`
/// rather than a lookup table. The four acknowledgements carry only a
/// [`ReturnCode`]; `WhisperDelivery` is an unsolicited push and answers
/// no request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Login(ReturnCode),
    Whisper(ReturnCode),
    JoinRoom(ReturnCode),
    Shout(ReturnCode),
    WhisperDelivery { sender: String, message: String },
}

impl Response {
    /// Returns the opcode this response is framed with.
    pub fn opcode(&self) -> Opcode {
        match self {
            Response::Login(_) => Opcode::Login,
            Response::Whisper(_) => Opcode::Whisper,
            Response::JoinRoom(_) => Opcode::JoinRoom,
            Response::Shout(_) => Opcode::Shout,
            Response::WhisperDelivery { .. } => Opcode::WhisperDelivery,
        }
    }

    /// For an acknowledgement, returns the command it answers and its code.
    ///
    /// Returns `None` for a pushed `WhisperDelivery`.
    pub fn ack(&self) -> Option<(Command, ReturnCode)> {
        match *self {
            Response::Login(code) => Some((Command::Login, code)),
            Response::Whisper(code) => Some((Command::Whisper, code)),
            Response::JoinRoom(code) => Some((Command::JoinRoom, code)),
            Response::Shout(code) => Some((Command::Shout, code)),
            Response::WhisperDelivery { .. } => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Opcode
    // =====================================================================

    #[test]
    fn test_opcode_wire_values_match_protocol() {
        let values: Vec<u16> = Opcode::ALL.iter().map(|o| o.as_u16()).collect();
        assert_eq!(values, vec![200, 201, 202, 203, 299]);
    }

    #[test]
    fn test_opcode_try_from_accepts_every_known_value() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::try_from(op.as_u16()).unwrap(), op);
        }
    }

    #[test]
    fn test_opcode_try_from_unknown_returns_error() {
        let result = Opcode::try_from(204);
        assert!(matches!(result, Err(ProtocolError::UnknownOpcode(204))));
    }

    #[test]
    fn test_opcode_display_includes_value() {
        assert_eq!(Opcode::WhisperDelivery.to_string(), "WhisperDelivery(299)");
    }

    // =====================================================================
    // ReturnCode
    // =====================================================================

    #[test]
    fn test_return_code_table() {
        assert_eq!(ReturnCode(0).to_string(), "Action successful");
        assert_eq!(ReturnCode(1).to_string(), "Failed to login");
        assert_eq!(ReturnCode(2).to_string(), "Failed to join room");
        assert_eq!(ReturnCode(3).to_string(), "Failed to whisper");
        assert_eq!(ReturnCode(4).to_string(), "Failed to shout");
    }

    #[test]
    fn test_return_code_unknown_falls_back() {
        assert_eq!(ReturnCode(-7).message(), None);
        assert_eq!(ReturnCode(-7).to_string(), "Unknown return code -7");
    }

    #[test]
    fn test_return_code_only_zero_is_success() {
        assert!(ReturnCode::SUCCESS.is_success());
        assert!(!ReturnCode(1).is_success());
    }

    // =====================================================================
    // Request::validate()
    // =====================================================================

    #[test]
    fn test_validate_whisper_at_limit_ok() {
        let req = Request::Whisper {
            target: "bob".into(),
            message: "a".repeat(MAX_MESSAGE_LEN),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_whisper_over_limit_returns_field_too_long() {
        let req = Request::Whisper {
            target: "bob".into(),
            message: "a".repeat(MAX_MESSAGE_LEN + 1),
        };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::FieldTooLong { field: "message", len: 257, max: 256 })
        ));
    }

    #[test]
    fn test_validate_counts_bytes_not_chars() {
        // 17 two-byte characters: 17 chars, 34 bytes.
        let req = Request::JoinRoom { room: "é".repeat(17) };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::FieldTooLong { field: "room", len: 34, .. })
        ));
    }

    #[test]
    fn test_validate_login_password_over_limit() {
        let req = Request::Login {
            username: "alice".into(),
            password: "p".repeat(MAX_PASSWORD_LEN + 1),
        };
        assert!(matches!(
            req.validate(),
            Err(ProtocolError::FieldTooLong { field: "password", .. })
        ));
    }

    #[test]
    fn test_validate_shout_shares_message_limit() {
        let ok = Request::Shout { message: "x".repeat(MAX_MESSAGE_LEN) };
        let too_long = Request::Shout { message: "x".repeat(MAX_MESSAGE_LEN + 1) };
        assert!(ok.validate().is_ok());
        assert!(too_long.validate().is_err());
    }

    // =====================================================================
    // Response
    // =====================================================================

    #[test]
    fn test_response_ack_maps_command() {
        assert_eq!(
            Response::JoinRoom(ReturnCode(2)).ack(),
            Some((Command::JoinRoom, ReturnCode(2)))
        );
        let push = Response::WhisperDelivery {
            sender: "bob".into(),
            message: "hi".into(),
        };
        assert_eq!(push.ack(), None);
        assert_eq!(push.opcode(), Opcode::WhisperDelivery);
    }
}
