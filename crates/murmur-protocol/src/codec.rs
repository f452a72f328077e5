//! Encoding and decoding of Murmur frames.
//!
//! The wire format is big-endian with no padding:
//!
//! ```text
//! request:   opcode:u16 (len:u32 bytes:utf8[len])*
//! ack:       opcode:u16 return_code:i16
//! delivery:  opcode:u16 len:u32 sender:utf8[len] len:u32 message:utf8[len]
//! ```
//!
//! Two layers live here:
//!
//! - Pure functions ([`encode`], [`decode`], and their server-side mirrors
//!   [`decode_request`], [`encode_response`]) that work on exactly one
//!   complete frame and do no I/O.
//! - Streaming codecs ([`ClientCodec`], [`ServerCodec`]) implementing
//!   `tokio_util`'s `Decoder`/`Encoder`. TCP delivers a byte stream, not
//!   messages: one read may hold half a frame or three frames back to back.
//!   The streaming decoders walk the declared length fields to find where
//!   a frame ends and only decode once all of its bytes have arrived.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Opcode, ProtocolError, Request, Response, ReturnCode};

/// Size of the opcode that opens every frame.
const OPCODE_LEN: usize = 2;

/// Size of an acknowledgement frame: opcode + return code.
const ACK_FRAME_LEN: usize = OPCODE_LEN + 2;

/// Size of a string field's length prefix.
const LEN_PREFIX: usize = 4;

/// Default cap on an inbound field's declared length.
///
/// The largest legitimate field is a 256-byte message; anything far past
/// that means the stream is garbage, and trusting it would make us buffer
/// up to 4 GiB waiting for a frame that never completes.
pub const DEFAULT_MAX_INBOUND_FIELD_LEN: u32 = 4096;

// ---------------------------------------------------------------------------
// Client side: Request → bytes, bytes → Response
// ---------------------------------------------------------------------------

/// Serializes a request into one complete frame.
///
/// Fields are written in declaration order, each prefixed by its UTF-8
/// byte length.
///
/// # Errors
/// Returns [`ProtocolError::FieldTooLong`] if any field exceeds its bound.
/// Nothing is produced in that case.
pub fn encode(request: &Request) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    put_request(request, &mut out)?;
    Ok(out)
}

/// Parses exactly one complete response frame.
///
/// # Errors
/// - [`ProtocolError::UnknownOpcode`] if the leading opcode isn't defined.
/// - [`ProtocolError::MalformedFrame`] if there are fewer bytes than the
///   header declares, trailing bytes after the frame, or invalid UTF-8.
pub fn decode(data: &[u8]) -> Result<Response, ProtocolError> {
    let mut buf = data;
    let opcode = get_opcode(&mut buf)?;

    // One arm per opcode, so adding an opcode forces a decision here.
    let response = match opcode {
        Opcode::Login => Response::Login(get_return_code(&mut buf)?),
        Opcode::Whisper => Response::Whisper(get_return_code(&mut buf)?),
        Opcode::JoinRoom => Response::JoinRoom(get_return_code(&mut buf)?),
        Opcode::Shout => Response::Shout(get_return_code(&mut buf)?),
        Opcode::WhisperDelivery => {
            let sender = get_string(&mut buf, "sender")?;
            let message = get_string(&mut buf, "message")?;
            Response::WhisperDelivery { sender, message }
        }
    };

    ensure_consumed(buf, opcode)?;
    Ok(response)
}

// ---------------------------------------------------------------------------
// Server side: bytes → Request, Response → bytes
// ---------------------------------------------------------------------------

/// Parses exactly one complete request frame (the server's view).
///
/// # Errors
/// Same as [`decode`], plus [`ProtocolError::MalformedFrame`] when the
/// opcode is `WhisperDelivery`, which a client never sends.
pub fn decode_request(data: &[u8]) -> Result<Request, ProtocolError> {
    let mut buf = data;
    let opcode = get_opcode(&mut buf)?;

    let request = match opcode {
        Opcode::Login => Request::Login {
            username: get_string(&mut buf, "username")?,
            password: get_string(&mut buf, "password")?,
        },
        Opcode::Whisper => Request::Whisper {
            target: get_string(&mut buf, "target")?,
            message: get_string(&mut buf, "message")?,
        },
        Opcode::JoinRoom => Request::JoinRoom {
            room: get_string(&mut buf, "room")?,
        },
        Opcode::Shout => Request::Shout {
            message: get_string(&mut buf, "message")?,
        },
        Opcode::WhisperDelivery => {
            return Err(ProtocolError::MalformedFrame(format!(
                "{opcode} is not a request"
            )));
        }
    };

    ensure_consumed(buf, opcode)?;
    Ok(request)
}

/// Serializes a response into one complete frame (the server's view).
///
/// # Errors
/// Returns [`ProtocolError::FieldTooLong`] if a delivery field can't be
/// described by a `u32` length prefix.
pub fn encode_response(response: &Response) -> Result<Vec<u8>, ProtocolError> {
    let mut out = Vec::new();
    put_response(response, &mut out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Streaming codecs
// ---------------------------------------------------------------------------

/// Client-side streaming codec: encodes [`Request`]s, decodes [`Response`]s.
///
/// `decode` returns `Ok(None)` until a whole frame is buffered. When a
/// frame is unusable it is consumed and an error returned, so the caller
/// can log it and keep calling `decode` for the frames behind it. If the
/// frame boundary itself can't be trusted (unknown opcode, absurd length)
/// the whole buffer is dropped: there is no way to find the next frame.
#[derive(Debug, Clone, Copy)]
pub struct ClientCodec {
    max_field_len: u32,
}

impl ClientCodec {
    /// Creates a codec with the default inbound field limit.
    pub fn new() -> Self {
        Self::with_max_field_len(DEFAULT_MAX_INBOUND_FIELD_LEN)
    }

    /// Creates a codec that rejects inbound fields declared longer than
    /// `max_field_len` bytes.
    pub fn with_max_field_len(max_field_len: u32) -> Self {
        Self { max_field_len }
    }
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ClientCodec {
    type Item = Response;
    type Error = ProtocolError;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<Response>, ProtocolError> {
        let Some(len) = probe(src, response_field_count, self.max_field_len)?
        else {
            return Ok(None);
        };
        let frame = src.split_to(len);
        decode(&frame).map(Some)
    }
}

impl Encoder<Request> for ClientCodec {
    type Error = ProtocolError;

    fn encode(
        &mut self,
        item: Request,
        dst: &mut BytesMut,
    ) -> Result<(), ProtocolError> {
        put_request(&item, dst)
    }
}

/// Server-side streaming codec: decodes [`Request`]s, encodes [`Response`]s.
///
/// Exists so test servers and tools can speak the protocol; it carries
/// none of the server's chat logic.
#[derive(Debug, Clone, Copy)]
pub struct ServerCodec {
    max_field_len: u32,
}

impl ServerCodec {
    /// Creates a codec with the default inbound field limit.
    pub fn new() -> Self {
        Self {
            max_field_len: DEFAULT_MAX_INBOUND_FIELD_LEN,
        }
    }
}

impl Default for ServerCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ServerCodec {
    type Item = Request;
    type Error = ProtocolError;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> Result<Option<Request>, ProtocolError> {
        let Some(len) = probe(src, request_field_count, self.max_field_len)?
        else {
            return Ok(None);
        };
        let frame = src.split_to(len);
        decode_request(&frame).map(Some)
    }
}

impl Encoder<Response> for ServerCodec {
    type Error = ProtocolError;

    fn encode(
        &mut self,
        item: Response,
        dst: &mut BytesMut,
    ) -> Result<(), ProtocolError> {
        put_response(&item, dst)
    }
}

// ---------------------------------------------------------------------------
// Frame delimiting
// ---------------------------------------------------------------------------

/// How a frame's body is shaped after its opcode.
enum Body {
    /// A fixed two-byte return code.
    ReturnCode,
    /// This many length-prefixed strings.
    Strings(usize),
}

// Every opcode has a response shape, but the signature has to match
// `request_field_count` to share `probe`.
#[allow(clippy::unnecessary_wraps)]
fn response_field_count(opcode: Opcode) -> Result<Body, ProtocolError> {
    Ok(match opcode {
        Opcode::Login | Opcode::Whisper | Opcode::JoinRoom | Opcode::Shout => {
            Body::ReturnCode
        }
        Opcode::WhisperDelivery => Body::Strings(2),
    })
}

fn request_field_count(opcode: Opcode) -> Result<Body, ProtocolError> {
    match opcode {
        Opcode::Login | Opcode::Whisper => Ok(Body::Strings(2)),
        Opcode::JoinRoom | Opcode::Shout => Ok(Body::Strings(1)),
        Opcode::WhisperDelivery => Err(ProtocolError::MalformedFrame(format!(
            "{opcode} is not a request"
        ))),
    }
}

/// Finds the length of the first frame in `src` without consuming it.
///
/// Returns `Ok(None)` if more bytes are needed. On an error that makes the
/// frame boundary unknowable, clears `src` before returning.
fn probe(
    src: &mut BytesMut,
    body: fn(Opcode) -> Result<Body, ProtocolError>,
    max_field_len: u32,
) -> Result<Option<usize>, ProtocolError> {
    match frame_len(src, body, max_field_len) {
        Ok(len) => Ok(len),
        Err(e) => {
            tracing::debug!(
                discarded = src.len(),
                error = %e,
                "dropping unframeable bytes"
            );
            src.clear();
            Err(e)
        }
    }
}

fn frame_len(
    src: &[u8],
    body: fn(Opcode) -> Result<Body, ProtocolError>,
    max_field_len: u32,
) -> Result<Option<usize>, ProtocolError> {
    if src.len() < OPCODE_LEN {
        return Ok(None);
    }
    let opcode = Opcode::try_from(u16::from_be_bytes([src[0], src[1]]))?;

    match body(opcode)? {
        Body::ReturnCode => {
            Ok((src.len() >= ACK_FRAME_LEN).then_some(ACK_FRAME_LEN))
        }
        Body::Strings(count) => {
            let mut offset = OPCODE_LEN;
            for _ in 0..count {
                let Some(prefix) = src.get(offset..offset + LEN_PREFIX) else {
                    return Ok(None);
                };
                let len = u32::from_be_bytes([
                    prefix[0], prefix[1], prefix[2], prefix[3],
                ]);
                if len > max_field_len {
                    return Err(ProtocolError::MalformedFrame(format!(
                        "{opcode} declares a {len}-byte field, limit is {max_field_len}"
                    )));
                }
                offset += LEN_PREFIX + len as usize;
                if src.len() < offset {
                    return Ok(None);
                }
            }
            Ok(Some(offset))
        }
    }
}

// ---------------------------------------------------------------------------
// Primitive readers and writers
// ---------------------------------------------------------------------------

fn put_request(
    request: &Request,
    dst: &mut impl BufMut,
) -> Result<(), ProtocolError> {
    // Validate everything first so a rejected request writes nothing.
    request.validate()?;
    dst.put_u16(request.opcode().as_u16());
    for (_, value, _) in request.fields() {
        // `validate` bounds every field well under u32::MAX.
        dst.put_u32(value.len() as u32);
        dst.put_slice(value.as_bytes());
    }
    Ok(())
}

fn put_response(
    response: &Response,
    dst: &mut impl BufMut,
) -> Result<(), ProtocolError> {
    match response {
        Response::Login(code)
        | Response::Whisper(code)
        | Response::JoinRoom(code)
        | Response::Shout(code) => {
            dst.put_u16(response.opcode().as_u16());
            dst.put_i16(code.0);
        }
        Response::WhisperDelivery { sender, message } => {
            let sender_len = wire_len("sender", sender)?;
            let message_len = wire_len("message", message)?;
            dst.put_u16(response.opcode().as_u16());
            dst.put_u32(sender_len);
            dst.put_slice(sender.as_bytes());
            dst.put_u32(message_len);
            dst.put_slice(message.as_bytes());
        }
    }
    Ok(())
}

fn wire_len(field: &'static str, value: &str) -> Result<u32, ProtocolError> {
    u32::try_from(value.len()).map_err(|_| ProtocolError::FieldTooLong {
        field,
        len: value.len(),
        max: u32::MAX as usize,
    })
}

fn get_opcode(buf: &mut &[u8]) -> Result<Opcode, ProtocolError> {
    if buf.remaining() < OPCODE_LEN {
        return Err(ProtocolError::MalformedFrame(format!(
            "frame is {} bytes, opcode needs {OPCODE_LEN}",
            buf.remaining()
        )));
    }
    Opcode::try_from(buf.get_u16())
}

fn get_return_code(buf: &mut &[u8]) -> Result<ReturnCode, ProtocolError> {
    if buf.remaining() < 2 {
        return Err(ProtocolError::MalformedFrame(
            "acknowledgement is missing its return code".into(),
        ));
    }
    Ok(ReturnCode(buf.get_i16()))
}

fn get_string(
    buf: &mut &[u8],
    field: &'static str,
) -> Result<String, ProtocolError> {
    if buf.remaining() < LEN_PREFIX {
        return Err(ProtocolError::MalformedFrame(format!(
            "{field} is missing its length prefix"
        )));
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(ProtocolError::MalformedFrame(format!(
            "{field} declares {len} bytes, {} available",
            buf.remaining()
        )));
    }
    let value = std::str::from_utf8(&buf[..len])
        .map_err(|e| {
            ProtocolError::MalformedFrame(format!("{field} is not UTF-8: {e}"))
        })?
        .to_owned();
    buf.advance(len);
    Ok(value)
}

fn ensure_consumed(buf: &[u8], opcode: Opcode) -> Result<(), ProtocolError> {
    if buf.is_empty() {
        Ok(())
    } else {
        Err(ProtocolError::MalformedFrame(format!(
            "{} trailing bytes after {opcode}",
            buf.len()
        )))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> Request {
        Request::Login {
            username: "alice".into(),
            password: "secret".into(),
        }
    }

    // =====================================================================
    // encode()
    // =====================================================================

    #[test]
    fn test_encode_login_exact_bytes() {
        let bytes = encode(&login()).unwrap();

        let mut expected = vec![0x00, 0xC8]; // 200
        expected.extend_from_slice(&[0, 0, 0, 5]);
        expected.extend_from_slice(b"alice");
        expected.extend_from_slice(&[0, 0, 0, 6]);
        expected.extend_from_slice(b"secret");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_prefix_is_byte_length_not_char_length() {
        // "héllo" is 5 chars but 6 bytes.
        let bytes = encode(&Request::Shout { message: "héllo".into() }).unwrap();
        assert_eq!(&bytes[..2], &203u16.to_be_bytes());
        assert_eq!(&bytes[2..6], &6u32.to_be_bytes());
        assert_eq!(bytes.len(), 2 + 4 + 6);
    }

    #[test]
    fn test_encode_whisper_257_bytes_returns_field_too_long() {
        let req = Request::Whisper {
            target: "bob".into(),
            message: "m".repeat(257),
        };
        assert!(matches!(
            encode(&req),
            Err(ProtocolError::FieldTooLong { field: "message", .. })
        ));
    }

    #[test]
    fn test_encode_room_33_bytes_returns_field_too_long() {
        let req = Request::JoinRoom { room: "r".repeat(33) };
        assert!(matches!(
            encode(&req),
            Err(ProtocolError::FieldTooLong { field: "room", len: 33, max: 32 })
        ));
    }

    #[test]
    fn test_encode_room_32_bytes_ok() {
        let req = Request::JoinRoom { room: "r".repeat(32) };
        assert_eq!(encode(&req).unwrap().len(), 2 + 4 + 32);
    }

    // =====================================================================
    // decode()
    // =====================================================================

    #[test]
    fn test_decode_login_ack() {
        let resp = decode(&[0x00, 0xC8, 0x00, 0x00]).unwrap();
        assert_eq!(resp, Response::Login(ReturnCode(0)));
    }

    #[test]
    fn test_decode_whisper_ack_failure_code() {
        let resp = decode(&[0x00, 0xC9, 0x00, 0x03]).unwrap();
        assert_eq!(resp, Response::Whisper(ReturnCode(3)));
        assert_eq!(ReturnCode(3).to_string(), "Failed to whisper");
    }

    #[test]
    fn test_decode_return_code_is_signed() {
        let resp = decode(&[0x00, 0xCB, 0xFF, 0xFF]).unwrap();
        assert_eq!(resp, Response::Shout(ReturnCode(-1)));
    }

    #[test]
    fn test_decode_whisper_delivery() {
        let mut frame = vec![0x01, 0x2B]; // 299
        frame.extend_from_slice(&3u32.to_be_bytes());
        frame.extend_from_slice(b"bob");
        frame.extend_from_slice(&2u32.to_be_bytes());
        frame.extend_from_slice(b"hi");

        let resp = decode(&frame).unwrap();
        assert_eq!(
            resp,
            Response::WhisperDelivery {
                sender: "bob".into(),
                message: "hi".into(),
            }
        );
    }

    #[test]
    fn test_decode_truncated_ack_returns_malformed() {
        assert!(matches!(
            decode(&[0x00, 0xC8, 0x00]),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_empty_returns_malformed() {
        assert!(matches!(decode(&[]), Err(ProtocolError::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_truncated_delivery_returns_malformed() {
        let mut frame = vec![0x01, 0x2B];
        frame.extend_from_slice(&10u32.to_be_bytes());
        frame.extend_from_slice(b"bob");
        assert!(matches!(decode(&frame), Err(ProtocolError::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_unknown_opcode() {
        assert!(matches!(
            decode(&[0x00, 0xCC, 0x00, 0x00]),
            Err(ProtocolError::UnknownOpcode(204))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8_returns_malformed() {
        let mut frame = vec![0x01, 0x2B];
        frame.extend_from_slice(&1u32.to_be_bytes());
        frame.push(0xFF);
        frame.extend_from_slice(&0u32.to_be_bytes());
        assert!(matches!(decode(&frame), Err(ProtocolError::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_trailing_bytes_returns_malformed() {
        assert!(matches!(
            decode(&[0x00, 0xC8, 0x00, 0x00, 0x00]),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    // =====================================================================
    // Server view: the request survives the trip to the server, and the
    // server's replies survive the trip back.
    // =====================================================================

    #[test]
    fn test_requests_recovered_by_server() {
        let requests = [
            login(),
            Request::Whisper {
                target: "bob".into(),
                message: "héllo wörld".into(),
            },
            Request::JoinRoom { room: "lobby".into() },
            Request::Shout { message: String::new() },
        ];
        for req in requests {
            let bytes = encode(&req).unwrap();
            assert_eq!(decode_request(&bytes).unwrap(), req);
        }
    }

    #[test]
    fn test_server_echo_of_whisper_recovers_fields() {
        let req = Request::Whisper {
            target: "bob".into(),
            message: "ünïcode ✓".into(),
        };
        let Request::Whisper { target, message } =
            decode_request(&encode(&req).unwrap()).unwrap()
        else {
            panic!("expected whisper");
        };

        let echo = encode_response(&Response::WhisperDelivery {
            sender: target,
            message,
        })
        .unwrap();

        assert_eq!(
            decode(&echo).unwrap(),
            Response::WhisperDelivery {
                sender: "bob".into(),
                message: "ünïcode ✓".into(),
            }
        );
    }

    #[test]
    fn test_decode_request_rejects_delivery_opcode() {
        let bytes = encode_response(&Response::WhisperDelivery {
            sender: "a".into(),
            message: "b".into(),
        })
        .unwrap();
        assert!(matches!(
            decode_request(&bytes),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    // =====================================================================
    // ClientCodec — partial and concatenated frames
    // =====================================================================

    fn delivery_bytes(sender: &str, message: &str) -> Vec<u8> {
        encode_response(&Response::WhisperDelivery {
            sender: sender.into(),
            message: message.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_client_codec_waits_for_complete_frame() {
        let frame = delivery_bytes("bob", "hello there");
        let mut codec = ClientCodec::new();
        let mut buf = BytesMut::new();

        // Feed one byte at a time; nothing decodes until the last byte.
        for (i, byte) in frame.iter().enumerate() {
            buf.put_u8(*byte);
            let out = codec.decode(&mut buf).unwrap();
            if i + 1 < frame.len() {
                assert!(out.is_none(), "decoded early at byte {i}");
            } else {
                assert!(matches!(out, Some(Response::WhisperDelivery { .. })));
            }
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_client_codec_splits_concatenated_frames() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[0x00, 0xC8, 0x00, 0x00]);
        buf.extend_from_slice(&delivery_bytes("bob", "hi"));
        buf.extend_from_slice(&[0x00, 0xCA, 0x00, 0x02]);

        let mut codec = ClientCodec::new();
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Response::Login(ReturnCode(0)))
        );
        assert!(matches!(
            codec.decode(&mut buf).unwrap(),
            Some(Response::WhisperDelivery { .. })
        ));
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Response::JoinRoom(ReturnCode(2)))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_client_codec_unknown_opcode_clears_buffer() {
        let mut buf = BytesMut::from(&[0x00, 0x01, 0xAA, 0xBB, 0xCC][..]);
        let mut codec = ClientCodec::new();

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::UnknownOpcode(1))
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_client_codec_oversized_field_is_rejected_before_buffering() {
        let mut buf = BytesMut::new();
        buf.put_u16(299);
        buf.put_u32(1_000_000);
        let mut codec = ClientCodec::with_max_field_len(64);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::MalformedFrame(_))
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_client_codec_bad_frame_does_not_poison_next_frame() {
        // Invalid UTF-8 inside a well-delimited frame: the frame is
        // consumed and the one behind it still decodes.
        let mut buf = BytesMut::new();
        buf.put_u16(299);
        buf.put_u32(1);
        buf.put_u8(0xFF);
        buf.put_u32(0);
        buf.extend_from_slice(&[0x00, 0xCB, 0x00, 0x00]);

        let mut codec = ClientCodec::new();
        assert!(codec.decode(&mut buf).is_err());
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Response::Shout(ReturnCode(0)))
        );
    }

    // =====================================================================
    // ServerCodec
    // =====================================================================

    #[test]
    fn test_server_codec_decodes_split_login() {
        let bytes = encode(&login()).unwrap();
        let (head, tail) = bytes.split_at(7);
        let mut codec = ServerCodec::new();
        let mut buf = BytesMut::from(head);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(tail);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(login()));
    }

    #[test]
    fn test_client_encoder_matches_encode() {
        let mut codec = ClientCodec::new();
        let mut dst = BytesMut::new();
        codec.encode(login(), &mut dst).unwrap();
        assert_eq!(&dst[..], &encode(&login()).unwrap()[..]);
    }

    #[test]
    fn test_client_encoder_rejection_writes_nothing() {
        let mut codec = ClientCodec::new();
        let mut dst = BytesMut::new();
        let req = Request::JoinRoom { room: "x".repeat(40) };
        assert!(codec.encode(req, &mut dst).is_err());
        assert!(dst.is_empty());
    }
}
