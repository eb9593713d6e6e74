//! Length-prefixed, compressed stream framing.
//!
//! Shared by the environment-side server and the agent-side client so the
//! wire protocol cannot drift between the two sides.
//!
//! # Wire format
//!
//! ```text
//! [4-byte big-endian length][LZ4-compressed bincode payload]
//! ```

use crate::wire::{self, WireError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Maximum frame size, applied to both the compressed body and the
/// decompressed payload.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024; // 1 MiB

/// Errors from framing operations.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("frame too large: {0} bytes")]
    TooLarge(usize),

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl FrameError {
    /// Whether the peer closed the stream before a frame began.
    pub fn is_eof(&self) -> bool {
        matches!(self, FrameError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }

    /// Whether a read timeout expired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(e)
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
        )
    }
}

/// Encode `message`, write it as a length-prefixed frame, and flush.
pub fn write_frame<S: Write, T: Serialize>(stream: &mut S, message: &T) -> Result<(), FrameError> {
    let body = wire::encode(message)?;
    if body.len() > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge(body.len()));
    }
    let len = body.len() as u32;
    stream.write_all(&len.to_be_bytes())?;
    stream.write_all(&body)?;
    stream.flush()?;
    Ok(())
}

/// Read a length-prefixed frame and decode it.
pub fn read_frame<S: Read, T: DeserializeOwned>(
    stream: &mut S,
    max_size: usize,
) -> Result<T, FrameError> {
    let len = read_frame_len(stream, max_size)?;

    let mut body = vec![0u8; len];
    stream.read_exact(&mut body)?;

    Ok(wire::decode(&body, max_size)?)
}

/// Read the 4-byte length prefix and validate against `max_size`.
fn read_frame_len<S: Read>(stream: &mut S, max_size: usize) -> Result<usize, FrameError> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes)?;
    let len = u32::from_be_bytes(len_bytes) as usize;

    if len > max_size {
        return Err(FrameError::TooLarge(len));
    }

    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{GymRequest, GymResponse};
    use std::io::Cursor;

    #[test]
    fn test_write_read_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &GymRequest::RewardAndDone).unwrap();
        write_frame(&mut buf, &GymRequest::Close).unwrap();

        let mut cursor = Cursor::new(buf);
        let first: GymRequest = read_frame(&mut cursor, MAX_FRAME_SIZE).unwrap();
        let second: GymRequest = read_frame(&mut cursor, MAX_FRAME_SIZE).unwrap();
        assert_eq!(first, GymRequest::RewardAndDone);
        assert_eq!(second, GymRequest::Close);
    }

    #[test]
    fn test_read_frame_too_large() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &GymResponse::ExtraInfo("x".repeat(10_000))).unwrap();
        let mut cursor = Cursor::new(buf);
        let result: Result<GymResponse, _> = read_frame(&mut cursor, 8);
        assert!(matches!(result, Err(FrameError::TooLarge(_))));
    }

    #[test]
    fn test_length_prefix_validated_before_body() {
        let large_len = 20 * 1024 * 1024u32;
        let mut cursor = Cursor::new(large_len.to_be_bytes().to_vec());
        let result: Result<GymRequest, _> = read_frame(&mut cursor, MAX_FRAME_SIZE);
        assert!(matches!(result, Err(FrameError::TooLarge(len)) if len == large_len as usize));
    }

    #[test]
    fn test_empty_stream_is_eof() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let result: Result<GymRequest, _> = read_frame(&mut cursor, MAX_FRAME_SIZE);
        assert!(result.unwrap_err().is_eof());
    }

    #[test]
    fn test_truncated_body() {
        let mut buf = 1000u32.to_be_bytes().to_vec();
        buf.extend_from_slice(&[0u8; 10]);
        let mut cursor = Cursor::new(buf);
        let result: Result<GymRequest, _> = read_frame(&mut cursor, MAX_FRAME_SIZE);
        assert!(matches!(result, Err(FrameError::Io(_))));
    }

    #[test]
    fn test_garbage_body() {
        let garbage = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04];
        let mut buf = (garbage.len() as u32).to_be_bytes().to_vec();
        buf.extend_from_slice(&garbage);
        let mut cursor = Cursor::new(buf);
        let result: Result<GymRequest, _> = read_frame(&mut cursor, MAX_FRAME_SIZE);
        assert!(matches!(result, Err(FrameError::Wire(_))));
    }
}
