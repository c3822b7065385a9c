//! Value encoding for everything the baseline store persists.
//!
//! Every value is wrapped in a small envelope:
//!
//! ```text
//!   tag:     u8      b'B' = bincode, b'J' = JSON
//!   crc32:   u32 LE  over the payload
//!   payload: [u8]
//! ```
//!
//! Readers pick the decoder from the tag, so a store written with JSON for
//! inspection stays readable by a binary-configured reader and vice versa.

use std::{fmt, str::FromStr};

use bincode::config;
use crc32fast::Hasher;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

const TAG_BINARY: u8 = b'B';
const TAG_JSON: u8 = b'J';
pub const ENVELOPE_HEADER_LEN: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Binary,
    Json,
}

impl Encoding {
    fn tag(self) -> u8 {
        match self {
            Encoding::Binary => TAG_BINARY,
            Encoding::Json => TAG_JSON,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TAG_BINARY => Some(Encoding::Binary),
            TAG_JSON => Some(Encoding::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Binary => f.write_str("binary"),
            Encoding::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" | "bincode" => Ok(Encoding::Binary),
            "json" => Ok(Encoding::Json),
            other => Err(format!("unknown encoding '{other}' (expected binary or json)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("value is {0} bytes, shorter than the envelope header")]
    Truncated(usize),

    #[error("unknown encoding tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Checksum { stored: u32, computed: u32 },

    #[error("bincode encode failed: {0}")]
    BinaryEncode(#[from] bincode::error::EncodeError),

    #[error("bincode decode failed: {0}")]
    BinaryDecode(#[from] bincode::error::DecodeError),

    #[error("trailing {0} byte(s) after bincode payload")]
    TrailingBytes(usize),

    #[error("json codec failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Serialize `value` and wrap it in a tagged, checksummed envelope.
pub fn encode<T>(value: &T, encoding: Encoding) -> Result<Vec<u8>, CodecError>
where
    T: Serialize + ?Sized,
{
    let payload = match encoding {
        Encoding::Binary => bincode::serde::encode_to_vec(value, config::standard())?,
        Encoding::Json => serde_json::to_vec(value)?,
    };

    let mut out = Vec::with_capacity(ENVELOPE_HEADER_LEN + payload.len());
    out.push(encoding.tag());
    out.extend_from_slice(&checksum(&payload).to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Inspect an envelope without decoding its payload.
pub fn peek_encoding(bytes: &[u8]) -> Result<Encoding, CodecError> {
    let tag = *bytes.first().ok_or(CodecError::Truncated(0))?;
    Encoding::from_tag(tag).ok_or(CodecError::UnknownTag(tag))
}

/// Verify and decode an envelope produced by [`encode`].
pub fn decode<T>(bytes: &[u8]) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    if bytes.len() < ENVELOPE_HEADER_LEN {
        return Err(CodecError::Truncated(bytes.len()));
    }

    let encoding = peek_encoding(bytes)?;

    let mut crc_buf = [0u8; 4];
    crc_buf.copy_from_slice(&bytes[1..ENVELOPE_HEADER_LEN]);
    let stored = u32::from_le_bytes(crc_buf);

    let payload = &bytes[ENVELOPE_HEADER_LEN..];
    let computed = checksum(payload);
    if stored != computed {
        return Err(CodecError::Checksum { stored, computed });
    }

    match encoding {
        Encoding::Binary => {
            let (value, read): (T, usize) =
                bincode::serde::decode_from_slice(payload, config::standard())?;
            if read != payload.len() {
                return Err(CodecError::TrailingBytes(payload.len() - read));
            }
            Ok(value)
        }
        Encoding::Json => Ok(serde_json::from_slice(payload)?),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
