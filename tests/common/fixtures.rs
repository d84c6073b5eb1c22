//! Builders for signed test messages and hub events
#![allow(dead_code)]

use ed25519_dalek::{Signer, SigningKey};
use prost::Message as _;

use hub_shuttle::grpc::proto;
use hub_shuttle::grpc::proto::hub_event::Body;
use hub_shuttle::grpc::proto::message_data;

/// Deterministic signing key so fixtures are stable across runs.
pub fn test_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

/// Sign a data section into a complete wire message: canonical bytes,
/// truncated blake3 hash, ed25519 signature.
pub fn sign_data(data: proto::MessageData) -> proto::Message {
    sign_data_with(data, &test_key())
}

pub fn sign_data_with(data: proto::MessageData, key: &SigningKey) -> proto::Message {
    let data_bytes = data.encode_to_vec();
    let hash = blake3::hash(&data_bytes).as_bytes()[..20].to_vec();
    let signature = key.sign(&hash).to_bytes().to_vec();

    proto::Message {
        data: Some(data),
        hash,
        hash_scheme: proto::HashScheme::Blake3 as i32,
        signature,
        signature_scheme: proto::SignatureScheme::Ed25519 as i32,
        signer: key.verifying_key().to_bytes().to_vec(),
        data_bytes: Some(data_bytes),
    }
}

fn message_data(
    message_type: proto::MessageType,
    fid: u64,
    timestamp: u32,
    body: message_data::Body,
) -> proto::MessageData {
    proto::MessageData {
        r#type: message_type as i32,
        fid,
        timestamp,
        network: proto::FarcasterNetwork::Mainnet as i32,
        body: Some(body),
    }
}

// ===========================================================================
// Message builders
// ===========================================================================

pub fn cast_add_message(
    fid: u64,
    timestamp: u32,
    text: &str,
    embed_urls: &[&str],
    mentions: &[u64],
    mentions_positions: &[u32],
) -> proto::Message {
    let body = proto::CastAddBody {
        mentions: mentions.to_vec(),
        parent: None,
        text: text.to_string(),
        mentions_positions: mentions_positions.to_vec(),
        embeds: embed_urls
            .iter()
            .map(|url| proto::Embed {
                embed: Some(proto::embed::Embed::Url(url.to_string())),
            })
            .collect(),
    };
    sign_data(message_data(
        proto::MessageType::CastAdd,
        fid,
        timestamp,
        message_data::Body::CastAddBody(body),
    ))
}

pub fn cast_add_with_parent(
    fid: u64,
    timestamp: u32,
    text: &str,
    parent: proto::cast_add_body::Parent,
) -> proto::Message {
    let body = proto::CastAddBody {
        mentions: vec![],
        parent: Some(parent),
        text: text.to_string(),
        mentions_positions: vec![],
        embeds: vec![],
    };
    sign_data(message_data(
        proto::MessageType::CastAdd,
        fid,
        timestamp,
        message_data::Body::CastAddBody(body),
    ))
}

pub fn cast_remove_message(fid: u64, timestamp: u32, target_hash: &[u8]) -> proto::Message {
    let body = proto::CastRemoveBody {
        target_hash: target_hash.to_vec(),
    };
    sign_data(message_data(
        proto::MessageType::CastRemove,
        fid,
        timestamp,
        message_data::Body::CastRemoveBody(body),
    ))
}

pub fn reaction_add_message(
    fid: u64,
    timestamp: u32,
    reaction_type: proto::ReactionType,
    target_fid: u64,
    target_hash: &[u8],
) -> proto::Message {
    let body = proto::ReactionBody {
        r#type: reaction_type as i32,
        target: Some(proto::reaction_body::Target::TargetCastId(proto::CastId {
            fid: target_fid,
            hash: target_hash.to_vec(),
        })),
    };
    sign_data(message_data(
        proto::MessageType::ReactionAdd,
        fid,
        timestamp,
        message_data::Body::ReactionBody(body),
    ))
}

pub fn link_add_message(
    fid: u64,
    timestamp: u32,
    link_type: &str,
    target_fid: u64,
    display_timestamp: Option<u32>,
) -> proto::Message {
    let body = proto::LinkBody {
        r#type: link_type.to_string(),
        display_timestamp,
        target: Some(proto::link_body::Target::TargetFid(target_fid)),
    };
    sign_data(message_data(
        proto::MessageType::LinkAdd,
        fid,
        timestamp,
        message_data::Body::LinkBody(body),
    ))
}

pub fn verification_add_message(
    fid: u64,
    timestamp: u32,
    protocol: proto::Protocol,
    address: &[u8],
) -> proto::Message {
    let body = proto::VerificationAddAddressBody {
        address: address.to_vec(),
        claim_signature: vec![0xAB; 65],
        block_hash: vec![0xCD; 32],
        verification_type: 0,
        chain_id: 0,
        protocol: protocol as i32,
    };
    sign_data(message_data(
        proto::MessageType::VerificationAddAddress,
        fid,
        timestamp,
        message_data::Body::VerificationAddAddressBody(body),
    ))
}

pub fn verification_remove_message(
    fid: u64,
    timestamp: u32,
    protocol: proto::Protocol,
    address: &[u8],
) -> proto::Message {
    let body = proto::VerificationRemoveBody {
        address: address.to_vec(),
        protocol: protocol as i32,
    };
    sign_data(message_data(
        proto::MessageType::VerificationRemove,
        fid,
        timestamp,
        message_data::Body::VerificationRemoveBody(body),
    ))
}

pub fn user_data_message(
    fid: u64,
    timestamp: u32,
    user_data_type: proto::UserDataType,
    value: &str,
) -> proto::Message {
    let body = proto::UserDataBody {
        r#type: user_data_type as i32,
        value: value.to_string(),
    };
    sign_data(message_data(
        proto::MessageType::UserDataAdd,
        fid,
        timestamp,
        message_data::Body::UserDataBody(body),
    ))
}

pub fn username_proof_message(fid: u64, timestamp: u32, name: &[u8]) -> proto::Message {
    let body = proto::UserNameProof {
        timestamp: 1_700_000_000,
        name: name.to_vec(),
        owner: vec![0x11; 20],
        signature: vec![0x22; 65],
        fid,
        r#type: proto::UserNameType::Fname as i32,
    };
    sign_data(message_data(
        proto::MessageType::UsernameProof,
        fid,
        timestamp,
        message_data::Body::UsernameProofBody(body),
    ))
}

// ===========================================================================
// Hub events
// ===========================================================================

pub fn merge_event(id: u64, message: proto::Message) -> proto::HubEvent {
    proto::HubEvent {
        r#type: proto::HubEventType::MergeMessage as i32,
        id,
        body: Some(Body::MergeMessageBody(proto::MergeMessageBody {
            message: Some(message),
            deleted_messages: vec![],
        })),
    }
}

pub fn merge_event_with_displaced(
    id: u64,
    message: proto::Message,
    displaced: Vec<proto::Message>,
) -> proto::HubEvent {
    proto::HubEvent {
        r#type: proto::HubEventType::MergeMessage as i32,
        id,
        body: Some(Body::MergeMessageBody(proto::MergeMessageBody {
            message: Some(message),
            deleted_messages: displaced,
        })),
    }
}
