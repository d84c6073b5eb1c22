//! Structured message bodies
//!
//! One variant per persisted message type. Bodies are stored as a JSON
//! blob; byte fields are carried in their text encodings (hex, or base58
//! for Solana addresses) so the stored form is self-describing.

use serde::{Deserialize, Serialize};

/// Reference to a cast by author and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRef {
    pub fid: u64,
    /// Hex-encoded message hash
    pub hash: String,
}

/// An embedded item inside a cast: either a url or another cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CastEmbed {
    Url(String),
    Cast(CastRef),
}

/// Parent of a cast: the cast it replies to, or a url channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CastParent {
    Url(String),
    Cast(CastRef),
}

/// Target of a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReactionTarget {
    Url(String),
    Cast(CastRef),
}

/// Address protocol tag for verification messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressProtocol {
    Ethereum,
    Solana,
}

impl AddressProtocol {
    /// Encode raw address bytes in the protocol's text form.
    pub fn encode_address(&self, address: &[u8]) -> String {
        match self {
            AddressProtocol::Ethereum => format!("0x{}", hex::encode(address)),
            AddressProtocol::Solana => bs58::encode(address).into_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastAddBody {
    pub text: String,
    pub embeds: Vec<CastEmbed>,
    pub mentions: Vec<u64>,
    pub mentions_positions: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CastParent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRemoveBody {
    /// Hex-encoded hash of the cast being removed
    pub target_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionBody {
    pub reaction_type: i32,
    pub target: ReactionTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBody {
    pub link_type: String,
    pub target_fid: u64,
    /// Unix milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationAddBody {
    /// Protocol text encoding: `0x…` hex for Ethereum, base58 for Solana
    pub address: String,
    /// Hex-encoded claim signature
    pub claim_signature: String,
    /// Hex-encoded block hash
    pub block_hash: String,
    pub protocol: AddressProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRemoveBody {
    pub address: String,
    pub protocol: AddressProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataBody {
    pub user_data_type: i32,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameProofBody {
    /// Unix seconds
    pub timestamp: i64,
    /// Hex-encoded name bytes
    pub name: String,
    /// Hex-encoded owner address
    pub owner: String,
    /// Hex-encoded proof signature
    pub signature: String,
    pub fid: u64,
    pub proof_type: i32,
}

/// Tagged union of all persisted body shapes.
///
/// Add and remove variants of the same family share a shape (a
/// reaction-remove carries the same fields as a reaction-add); the row's
/// `type` column tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageBody {
    CastAdd(CastAddBody),
    CastRemove(CastRemoveBody),
    Reaction(ReactionBody),
    Link(LinkBody),
    VerificationAdd(VerificationAddBody),
    VerificationRemove(VerificationRemoveBody),
    UserData(UserDataBody),
    UsernameProof(UsernameProofBody),
}
