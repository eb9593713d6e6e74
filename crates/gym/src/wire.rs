//! Wire encoding for gym messages.
//!
//! Messages are bincode-encoded, then LZ4-compressed.
//!
//! # Wire Format
//!
//! ```text
//! [LZ4 compressed bincode with prepended size]
//! ```
//!
//! The size prefix is part of LZ4's framing: a little-endian `u32` holding
//! the uncompressed size so decompression can pre-allocate the output buffer.

use bincode::config;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from wire encoding/decoding.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("decoding failed: {0}")]
    Decode(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("uncompressed size {size} exceeds limit {limit}")]
    Oversized { size: usize, limit: usize },
}

/// Compress data for transmission.
#[inline]
pub fn compress(data: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(data)
}

/// Decompress data received from the peer, refusing payloads that would
/// expand beyond `limit` bytes.
pub fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, WireError> {
    if let Some(size) = uncompressed_size(data) {
        if size > limit {
            return Err(WireError::Oversized { size, limit });
        }
    }
    lz4_flex::decompress_size_prepended(data)
        .map_err(|e| WireError::DecompressionFailed(e.to_string()))
}

fn uncompressed_size(data: &[u8]) -> Option<usize> {
    let prefix: [u8; 4] = data.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(prefix) as usize)
}

/// Serialize and compress a message.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, WireError> {
    let raw = bincode::serde::encode_to_vec(message, config::standard())
        .map_err(|e| WireError::Encode(e.to_string()))?;
    Ok(compress(&raw))
}

/// Decompress and deserialize a message.
pub fn decode<T: DeserializeOwned>(data: &[u8], limit: usize) -> Result<T, WireError> {
    let raw = decompress(data, limit)?;
    let (message, _) = bincode::serde::decode_from_slice(&raw, config::standard())
        .map_err(|e| WireError::Decode(e.to_string()))?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::GymRequest;
    use meshgym_types::{BoxContainer, BoxData};

    const LIMIT: usize = 1024 * 1024;

    #[test]
    fn test_compressible_data() {
        let original = vec![0u8; 10000];
        let compressed = compress(&original);
        assert!(compressed.len() < original.len() / 2);
        assert_eq!(decompress(&compressed, LIMIT).unwrap(), original);
    }

    #[test]
    fn test_invalid_data() {
        let garbage = b"not valid lz4 data";
        assert!(decompress(garbage, LIMIT).is_err());
    }

    #[test]
    fn test_expansion_limit() {
        let compressed = compress(&vec![7u8; 4096]);
        assert!(matches!(
            decompress(&compressed, 1024),
            Err(WireError::Oversized {
                size: 4096,
                limit: 1024
            })
        ));
    }

    #[test]
    fn test_message_survives_encoding() {
        let request = GymRequest::ExecuteAction(BoxContainer::vector(BoxData::U32(vec![
            450, 460, 470, 480, 490, 500,
        ])));
        let bytes = encode(&request).unwrap();
        let decoded: GymRequest = decode(&bytes, LIMIT).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_wrong_message_type_fails_to_decode() {
        let bytes = encode(&"just a string").unwrap();
        assert!(matches!(
            decode::<GymRequest>(&bytes, LIMIT),
            Err(WireError::Decode(_))
        ));
    }
}
