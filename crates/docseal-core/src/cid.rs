//! Content addressing: CIDv1 over SHA-256.
//!
//! An identifier is `0x01 || 0x70 || 0x12 || 0x20 || sha256(bytes)` rendered as
//! multibase base32-lower with the `b` prefix. The digest covers the raw bytes;
//! no chunking or UnixFS wrapping is applied.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// CID version byte.
const CID_VERSION: u8 = 0x01;

/// Multicodec for dag-pb.
const DAG_PB: u8 = 0x70;

/// Multihash code for sha2-256.
const SHA2_256: u8 = 0x12;

/// Digest length in bytes.
const DIGEST_LEN: u8 = 0x20;

/// Multibase prefix for base32 lower, unpadded.
const MULTIBASE_BASE32: char = 'b';

/// A content identifier for a byte sequence.
///
/// Identical input bytes always produce an identical identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentIdentifier {
    digest: [u8; 32],
}

impl ContentIdentifier {
    /// Wrap an existing SHA-256 digest.
    pub const fn from_digest(digest: [u8; 32]) -> Self {
        Self { digest }
    }

    /// The SHA-256 digest.
    pub const fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// CID version (always 1).
    pub const fn version(&self) -> u8 {
        CID_VERSION
    }

    /// Multicodec of the addressed content (always dag-pb).
    pub const fn codec(&self) -> u8 {
        DAG_PB
    }

    /// Binary CID: version, codec, multihash header, digest.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut cid_bytes = Vec::with_capacity(36);
        cid_bytes.push(CID_VERSION);
        cid_bytes.push(DAG_PB);
        cid_bytes.push(SHA2_256);
        cid_bytes.push(DIGEST_LEN);
        cid_bytes.extend_from_slice(&self.digest);
        cid_bytes
    }

    /// Self-describing multibase string.
    pub fn to_multibase(&self) -> String {
        format!("{}{}", MULTIBASE_BASE32, base32_encode(&self.to_bytes()))
    }

    /// Digest as hex.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

impl fmt::Display for ContentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_multibase())
    }
}

impl fmt::Debug for ContentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({}...)", &self.digest_hex()[..8])
    }
}

impl FromStr for ContentIdentifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix(MULTIBASE_BASE32)
            .ok_or_else(|| CoreError::InvalidIdentifier("expected base32 multibase prefix 'b'".into()))?;
        let bytes = base32_decode(body)
            .ok_or_else(|| CoreError::InvalidIdentifier("invalid base32 body".into()))?;

        match bytes.as_slice() {
            [CID_VERSION, DAG_PB, SHA2_256, DIGEST_LEN, digest @ ..] if digest.len() == 32 => {
                let mut arr = [0u8; 32];
                arr.copy_from_slice(digest);
                Ok(Self::from_digest(arr))
            }
            _ => Err(CoreError::InvalidIdentifier(
                "expected CIDv1 dag-pb sha2-256".into(),
            )),
        }
    }
}

impl Serialize for ContentIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_multibase())
    }
}

impl<'de> Deserialize<'de> for ContentIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental content addresser for streamed input.
#[derive(Clone, Default)]
pub struct ContentAddresser {
    hasher: Sha256,
}

impl ContentAddresser {
    /// Start a new addresser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finish and produce the identifier.
    pub fn finalize(self) -> ContentIdentifier {
        ContentIdentifier::from_digest(self.hasher.finalize().into())
    }
}

/// Compute the content identifier of a byte sequence.
pub fn identify(bytes: &[u8]) -> ContentIdentifier {
    let mut addresser = ContentAddresser::new();
    addresser.update(bytes);
    addresser.finalize()
}

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

// RFC 4648 Base32 encoding (lowercase, no padding)
fn base32_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in data {
        buffer = (buffer << 8) | u64::from(byte);
        bits_in_buffer += 8;

        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let index = ((buffer >> bits_in_buffer) & 0x1f) as usize;
            result.push(ALPHABET[index] as char);
        }
    }

    if bits_in_buffer > 0 {
        let index = ((buffer << (5 - bits_in_buffer)) & 0x1f) as usize;
        result.push(ALPHABET[index] as char);
    }

    result
}

fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let mut result = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for c in text.bytes() {
        let value = ALPHABET.iter().position(|&a| a == c)? as u64;
        buffer = (buffer << 5) | value;
        bits_in_buffer += 5;

        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push(((buffer >> bits_in_buffer) & 0xff) as u8);
        }
    }

    // Leftover bits are padding and must be zero.
    if bits_in_buffer >= 5 || buffer & ((1 << bits_in_buffer) - 1) != 0 {
        return None;
    }

    Some(result)
}
