//! Signed message validation
//!
//! A message is valid when its hash equals the truncated blake3 digest of
//! the canonical data bytes and its ed25519 signature over that hash
//! verifies against the signer key.

use ed25519_dalek::{Signature, VerifyingKey};
use prost::Message as _;

use crate::error::DecodeError;
use crate::grpc::proto;

/// Length of the truncated blake3 content hash.
pub const MESSAGE_HASH_LEN: usize = 20;

/// Validate hash and signature of a signed message.
pub fn validate_message(msg: &proto::Message) -> Result<(), DecodeError> {
    let data_bytes = canonical_data_bytes(msg)?;

    match proto::HashScheme::try_from(msg.hash_scheme) {
        Ok(proto::HashScheme::Blake3) => {
            let digest = blake3::hash(&data_bytes);
            if msg.hash.len() != MESSAGE_HASH_LEN
                || msg.hash[..] != digest.as_bytes()[..MESSAGE_HASH_LEN]
            {
                return Err(DecodeError::InvalidMessage("hash mismatch".into()));
            }
        }
        _ => {
            return Err(DecodeError::InvalidMessage(format!(
                "unsupported hash scheme: {}",
                msg.hash_scheme
            )));
        }
    }

    match proto::SignatureScheme::try_from(msg.signature_scheme) {
        Ok(proto::SignatureScheme::Ed25519) => {
            let signer: [u8; 32] = msg
                .signer
                .as_slice()
                .try_into()
                .map_err(|_| DecodeError::InvalidMessage("signer is not 32 bytes".into()))?;
            let key = VerifyingKey::from_bytes(&signer)
                .map_err(|e| DecodeError::InvalidMessage(format!("bad signer key: {e}")))?;
            let signature = Signature::from_slice(&msg.signature)
                .map_err(|e| DecodeError::InvalidMessage(format!("bad signature: {e}")))?;
            key.verify_strict(&msg.hash, &signature)
                .map_err(|_| DecodeError::InvalidMessage("signature verification failed".into()))?;
        }
        _ => {
            return Err(DecodeError::InvalidMessage(format!(
                "unsupported signature scheme: {}",
                msg.signature_scheme
            )));
        }
    }

    Ok(())
}

/// The exact bytes the hash commits to.
///
/// Newer hubs ship `data_bytes` verbatim; older frames carry only the
/// decoded `data` section, which re-encodes deterministically.
pub(crate) fn canonical_data_bytes(msg: &proto::Message) -> Result<Vec<u8>, DecodeError> {
    if let Some(bytes) = &msg.data_bytes {
        if !bytes.is_empty() {
            return Ok(bytes.clone());
        }
    }
    match &msg.data {
        Some(data) => Ok(data.encode_to_vec()),
        None => Err(DecodeError::MissingBody),
    }
}
