//! Message codec
//!
//! Converts signed hub messages into the row shape the store persists:
//! validation of the content hash and signature, epoch-offset timestamp
//! conversion, and per-type structured decoding of the message body.
//!
//! Every failure in this module is permanent: the caller logs, skips the
//! message, and moves on. Nothing here is worth a retry.

mod body;
mod decode;
mod timestamp;
mod validation;

pub use body::{
    AddressProtocol, CastAddBody, CastEmbed, CastParent, CastRef, CastRemoveBody, LinkBody,
    MessageBody, ReactionBody, ReactionTarget, UserDataBody, UsernameProofBody,
    VerificationAddBody, VerificationRemoveBody,
};
pub use decode::decode;
pub use timestamp::{to_unix_millis, to_wall_clock, FARCASTER_EPOCH};
pub use validation::validate_message;

use chrono::{DateTime, Utc};

use crate::grpc::proto;

/// A decoded message in insertable shape.
///
/// Produced by [`decode`] with all lifecycle flags null; the store stamps
/// them according to the operation being applied.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub fid: u64,
    pub message_type: proto::MessageType,
    pub timestamp: DateTime<Utc>,
    pub hash: Vec<u8>,
    pub hash_scheme: proto::HashScheme,
    pub signature_scheme: proto::SignatureScheme,
    pub signer: Vec<u8>,
    /// Full serialized signed message, kept for re-verification
    pub raw: Vec<u8>,
    pub body: MessageBody,
    pub deleted_at: Option<DateTime<Utc>>,
    pub pruned_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}
