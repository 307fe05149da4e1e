//! Signer recovery, the way an external verifier would do it.

use secp256k1::ecdsa::{self, RecoveryId};
use secp256k1::{Message, Secp256k1};

use docseal_core::{keccak256, Address, RecoverableSignature};

/// Recover the address that produced `signature` over the framed `message`.
///
/// Returns `None` if the signature does not parse or does not recover.
pub fn recover_signer(message: &[u8], signature: &RecoverableSignature) -> Option<Address> {
    let recovery_id = RecoveryId::from_i32(i32::from(signature.v()) - 27).ok()?;
    let compact = ecdsa::RecoverableSignature::from_compact(&signature.0[..64], recovery_id).ok()?;
    let digest = Message::from_digest(keccak256(message));
    let public_key = Secp256k1::verification_only()
        .recover_ecdsa(&digest, &compact)
        .ok()?;
    Some(Address::from_public_key(&public_key))
}
