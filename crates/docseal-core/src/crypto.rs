//! Cryptographic primitives: secp256k1 signing, Keccak-256, signer addresses.
//!
//! Signatures are recoverable ECDSA over the Keccak-256 digest of the message,
//! serialized as `r || s || v` with `v` in `{27, 28}`.

use secp256k1::{ecdsa, All, Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Compute the Keccak-256 hash of data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A 20-byte signer address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive the address of a public key: last 20 bytes of
    /// keccak256(uncompressed key without the 0x04 tag).
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&hash[12..]);
        Self(arr)
    }

    /// EIP-55 mixed-case checksummed form with `0x` prefix.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = CoreError;

    /// Parse a hex address. Mixed-case input must carry a valid checksum;
    /// all-lowercase or all-uppercase input is accepted as is.
    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(body).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidAddress("expected 20 bytes".into()))?;
        let address = Self(arr);

        let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && &address.to_checksum()[2..] != body {
            return Err(CoreError::InvalidAddress("checksum mismatch".into()));
        }
        Ok(address)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 65-byte recoverable signature (`r || s || v`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature(pub [u8; 65]);

impl RecoverableSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The recovery byte.
    pub const fn v(&self) -> u8 {
        self.0[64]
    }

    /// Convert to hex string (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Convert to `0x`-prefixed hex string.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for RecoverableSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 65]> for RecoverableSignature {
    fn from(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }
}

/// Something that can sign framed messages on behalf of an address.
///
/// The signer receives the complete framed bytes and is responsible for
/// hashing them.
pub trait Signer {
    /// The address signatures recover to.
    fn address(&self) -> Address;

    /// Sign the framed message bytes.
    fn sign(&self, message: &[u8]) -> Result<RecoverableSignature>;
}

/// An in-process secp256k1 signer.
#[derive(Clone)]
pub struct LocalSigner {
    secret: SecretKey,
    secp: Secp256k1<All>,
}

impl LocalSigner {
    /// Create from a 32-byte secret key.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        Ok(Self {
            secret,
            secp: Secp256k1::new(),
        })
    }

    /// Parse a hex secret key, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(body).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CoreError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_secret_bytes(&bytes)
    }

    /// The signer's public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, &self.secret)
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    fn sign(&self, message: &[u8]) -> Result<RecoverableSignature> {
        let digest = Message::from_digest(keccak256(message));
        let signature: ecdsa::RecoverableSignature =
            self.secp.sign_ecdsa_recoverable(&digest, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();

        let v = u8::try_from(recovery_id.to_i32())
            .map_err(|_| CoreError::Signing("recovery id out of range".into()))?;

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = 27 + v;
        Ok(RecoverableSignature(bytes))
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalSigner({})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::ecdsa::RecoveryId;

    // Well-known development key (account #0 of the common test mnemonic).
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn recover(message: &[u8], signature: &RecoverableSignature) -> Address {
        let secp = Secp256k1::new();
        let id = RecoveryId::from_i32(i32::from(signature.v()) - 27).unwrap();
        let sig = ecdsa::RecoverableSignature::from_compact(&signature.0[..64], id).unwrap();
        let digest = Message::from_digest(keccak256(message));
        Address::from_public_key(&secp.recover_ecdsa(&digest, &sig).unwrap())
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_address_from_known_key() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        assert_eq!(signer.address().to_checksum(), DEV_ADDRESS);
    }

    #[test]
    fn test_checksum_vectors() {
        // EIP-55 reference vectors
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let address: Address = expected.to_lowercase().parse().unwrap();
            assert_eq!(address.to_checksum(), expected);
        }
    }

    #[test]
    fn test_address_parse_rejects_bad_checksum() {
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(
            bad.parse::<Address>(),
            Err(CoreError::InvalidAddress(_))
        ));
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn test_sign_recovers_to_address() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        let message = b"\x19Ethereum Signed Message:\n5hello";
        let signature = signer.sign(message).unwrap();

        assert!(signature.v() == 27 || signature.v() == 28);
        assert_eq!(recover(message, &signature), signer.address());

        // Tampered message recovers someone else
        assert_ne!(recover(b"hello", &signature), signer.address());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        let a = signer.sign(b"same").unwrap();
        let b = signer.sign(b"same").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(matches!(
            LocalSigner::from_hex("zz"),
            Err(CoreError::InvalidKey(_))
        ));
        assert!(LocalSigner::from_hex("0x0102").is_err());
        // zero is not a valid secret
        assert!(LocalSigner::from_secret_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let signer = LocalSigner::from_hex(DEV_KEY).unwrap();
        let debug = format!("{:?}", signer);
        assert!(!debug.contains(&DEV_KEY[..16]));
        assert!(debug.contains(DEV_ADDRESS));
    }
}
