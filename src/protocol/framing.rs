//! Null-Delimited Frame Extraction
//!
//! The wire protocol is a flat request/response exchange: each message is
//! UTF-8 text terminated by a single null byte (0x00). There is no length
//! prefix and no escaping of the delimiter inside a message.
//!
//! ## How Framing Works
//!
//! TCP delivers a byte stream with arbitrary chunk boundaries - a single
//! command may arrive one byte at a time, and several commands may arrive
//! in one read. The caller accumulates incoming data in a buffer and calls
//! [`decode_frame`] to attempt extraction:
//!
//! - `Some((command, consumed))` - a complete frame was found; `consumed`
//!   bytes (delimiter included) should be advanced off the buffer
//! - `None` - no delimiter yet, the frame is incomplete; read more data
//!
//! Only the first frame is extracted per call. Bytes after the first
//! delimiter stay in the caller's buffer and are picked up by the next
//! call, so back-to-back messages in one chunk are never lost or merged.

/// The sentinel byte terminating every protocol message.
pub const FRAME_DELIMITER: u8 = 0x00;

/// Maximum bytes buffered while waiting for a delimiter (1 MiB).
///
/// A peer streaming data with no delimiter would otherwise grow the
/// receive buffer without bound; the connection handler drops the
/// connection when this limit is hit.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Attempts to extract one frame from the buffer.
///
/// Returns the command text (decoded with invalid-UTF-8 replacement, never
/// failure) and the number of bytes consumed including the delimiter, or
/// `None` if the buffer holds no complete frame yet.
pub fn decode_frame(buf: &[u8]) -> Option<(String, usize)> {
    let pos = buf.iter().position(|&b| b == FRAME_DELIMITER)?;
    let command = String::from_utf8_lossy(&buf[..pos]).into_owned();
    Some((command, pos + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_frame() {
        let buf = b"SELECT * FROM users\0";
        let (cmd, consumed) = decode_frame(buf).unwrap();
        assert_eq!(cmd, "SELECT * FROM users");
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn test_incomplete_frame() {
        assert!(decode_frame(b"SELECT * FROM use").is_none());
    }

    #[test]
    fn test_empty_buffer() {
        assert!(decode_frame(b"").is_none());
    }

    #[test]
    fn test_empty_frame() {
        let (cmd, consumed) = decode_frame(b"\0").unwrap();
        assert_eq!(cmd, "");
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_only_first_frame_consumed() {
        let buf = b"first\0second\0";
        let (cmd, consumed) = decode_frame(buf).unwrap();
        assert_eq!(cmd, "first");
        assert_eq!(consumed, 6);

        // The remainder is a complete frame in its own right.
        let (cmd, consumed) = decode_frame(&buf[consumed..]).unwrap();
        assert_eq!(cmd, "second");
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_leftover_partial_frame_retained() {
        let buf = b"done\0parti";
        let (cmd, consumed) = decode_frame(buf).unwrap();
        assert_eq!(cmd, "done");
        assert!(decode_frame(&buf[consumed..]).is_none());
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let buf = b"SELECT \xff\xfe\0";
        let (cmd, _) = decode_frame(buf).unwrap();
        assert_eq!(cmd, "SELECT \u{fffd}\u{fffd}");
    }

    #[test]
    fn test_byte_at_a_time_matches_single_chunk() {
        let text = b"INSERT INTO users VALUES ('meni', 'films')\0";
        let mut buf = Vec::new();
        let mut decoded = None;
        for &b in text.iter() {
            buf.push(b);
            if let Some(frame) = decode_frame(&buf) {
                decoded = Some(frame);
                break;
            }
        }
        let (incremental, _) = decoded.unwrap();
        let (whole, _) = decode_frame(text).unwrap();
        assert_eq!(incremental, whole);
    }
}
