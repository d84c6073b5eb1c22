//! Message-to-row decoding

use prost::Message as _;

use crate::error::DecodeError;
use crate::grpc::proto;
use crate::grpc::proto::message_data::Body;

use super::body::{
    AddressProtocol, CastAddBody, CastEmbed, CastParent, CastRef, CastRemoveBody, LinkBody,
    MessageBody, ReactionBody, ReactionTarget, UserDataBody, UsernameProofBody,
    VerificationAddBody, VerificationRemoveBody,
};
use super::timestamp::{to_unix_millis, to_wall_clock};
use super::validation::validate_message;
use super::MessageRow;

/// Decode a signed hub message into the insertable row shape.
///
/// Validation, body presence, timestamp conversion, and per-type body
/// construction, in that order. All failures are permanent.
pub fn decode(msg: &proto::Message) -> Result<MessageRow, DecodeError> {
    validate_message(msg)?;

    let data = msg.data.as_ref().ok_or(DecodeError::MissingBody)?;
    let timestamp = to_wall_clock(data.timestamp)?;
    let message_type = proto::MessageType::try_from(data.r#type)
        .map_err(|_| DecodeError::UnknownType(data.r#type))?;
    let body = decode_body(message_type, data)?;

    let hash_scheme = proto::HashScheme::try_from(msg.hash_scheme)
        .map_err(|_| DecodeError::InvalidMessage(format!("hash scheme {}", msg.hash_scheme)))?;
    let signature_scheme = proto::SignatureScheme::try_from(msg.signature_scheme).map_err(|_| {
        DecodeError::InvalidMessage(format!("signature scheme {}", msg.signature_scheme))
    })?;

    Ok(MessageRow {
        fid: data.fid,
        message_type,
        timestamp,
        hash: msg.hash.clone(),
        hash_scheme,
        signature_scheme,
        signer: msg.signer.clone(),
        raw: msg.encode_to_vec(),
        body,
        deleted_at: None,
        pruned_at: None,
        revoked_at: None,
    })
}

fn decode_body(
    message_type: proto::MessageType,
    data: &proto::MessageData,
) -> Result<MessageBody, DecodeError> {
    let raw_type = data.r#type;
    match message_type {
        proto::MessageType::CastAdd => match &data.body {
            Some(Body::CastAddBody(b)) => Ok(MessageBody::CastAdd(decode_cast_add(b))),
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::CastRemove => match &data.body {
            Some(Body::CastRemoveBody(b)) => Ok(MessageBody::CastRemove(CastRemoveBody {
                target_hash: hex::encode(&b.target_hash),
            })),
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::ReactionAdd | proto::MessageType::ReactionRemove => {
            match &data.body {
                Some(Body::ReactionBody(b)) => Ok(MessageBody::Reaction(decode_reaction(b)?)),
                _ => Err(DecodeError::BodyMismatch(raw_type)),
            }
        }
        proto::MessageType::LinkAdd | proto::MessageType::LinkRemove => match &data.body {
            Some(Body::LinkBody(b)) => Ok(MessageBody::Link(decode_link(b)?)),
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::VerificationAddAddress => match &data.body {
            Some(Body::VerificationAddAddressBody(b)) => {
                let protocol = decode_protocol(b.protocol)?;
                Ok(MessageBody::VerificationAdd(VerificationAddBody {
                    address: protocol.encode_address(&b.address),
                    claim_signature: hex::encode(&b.claim_signature),
                    block_hash: hex::encode(&b.block_hash),
                    protocol,
                }))
            }
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::VerificationRemove => match &data.body {
            Some(Body::VerificationRemoveBody(b)) => {
                let protocol = decode_protocol(b.protocol)?;
                Ok(MessageBody::VerificationRemove(VerificationRemoveBody {
                    address: protocol.encode_address(&b.address),
                    protocol,
                }))
            }
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::UserDataAdd => match &data.body {
            Some(Body::UserDataBody(b)) => Ok(MessageBody::UserData(UserDataBody {
                user_data_type: b.r#type,
                value: b.value.clone(),
            })),
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::UsernameProof => match &data.body {
            Some(Body::UsernameProofBody(b)) => {
                Ok(MessageBody::UsernameProof(UsernameProofBody {
                    timestamp: b.timestamp as i64,
                    name: hex::encode(&b.name),
                    owner: hex::encode(&b.owner),
                    signature: hex::encode(&b.signature),
                    fid: b.fid,
                    proof_type: b.r#type,
                }))
            }
            _ => Err(DecodeError::BodyMismatch(raw_type)),
        },
        proto::MessageType::None => Err(DecodeError::UnknownType(raw_type)),
    }
}

fn decode_cast_add(b: &proto::CastAddBody) -> CastAddBody {
    use crate::grpc::proto::cast_add_body::Parent;
    use crate::grpc::proto::embed::Embed;

    let embeds = b
        .embeds
        .iter()
        .filter_map(|e| match &e.embed {
            Some(Embed::Url(url)) => Some(CastEmbed::Url(url.clone())),
            Some(Embed::CastId(cast)) => Some(CastEmbed::Cast(cast_ref(cast))),
            None => None,
        })
        .collect();

    let parent = b.parent.as_ref().map(|p| match p {
        Parent::ParentUrl(url) => CastParent::Url(url.clone()),
        Parent::ParentCastId(cast) => CastParent::Cast(cast_ref(cast)),
    });

    CastAddBody {
        text: b.text.clone(),
        embeds,
        mentions: b.mentions.clone(),
        mentions_positions: b.mentions_positions.clone(),
        parent,
    }
}

fn decode_reaction(b: &proto::ReactionBody) -> Result<ReactionBody, DecodeError> {
    use crate::grpc::proto::reaction_body::Target;

    let target = match &b.target {
        Some(Target::TargetCastId(cast)) => ReactionTarget::Cast(cast_ref(cast)),
        Some(Target::TargetUrl(url)) => ReactionTarget::Url(url.clone()),
        None => return Err(DecodeError::InvalidMessage("reaction has no target".into())),
    };

    Ok(ReactionBody {
        reaction_type: b.r#type,
        target,
    })
}

fn decode_link(b: &proto::LinkBody) -> Result<LinkBody, DecodeError> {
    use crate::grpc::proto::link_body::Target;

    let Some(Target::TargetFid(target_fid)) = &b.target else {
        return Err(DecodeError::InvalidMessage("link has no target fid".into()));
    };

    Ok(LinkBody {
        link_type: b.r#type.clone(),
        target_fid: *target_fid,
        display_timestamp: b.display_timestamp.map(to_unix_millis),
    })
}

fn decode_protocol(protocol: i32) -> Result<AddressProtocol, DecodeError> {
    match proto::Protocol::try_from(protocol) {
        Ok(proto::Protocol::Ethereum) => Ok(AddressProtocol::Ethereum),
        Ok(proto::Protocol::Solana) => Ok(AddressProtocol::Solana),
        Err(_) => Err(DecodeError::InvalidMessage(format!(
            "unknown address protocol: {protocol}"
        ))),
    }
}

fn cast_ref(cast: &proto::CastId) -> CastRef {
    CastRef {
        fid: cast.fid,
        hash: hex::encode(&cast.hash),
    }
}
