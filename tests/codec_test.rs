//! Codec integration tests: validation, timestamps, and per-type bodies

mod common;

use common::*;
use prost::Message as _;

use hub_shuttle::codec::{
    decode, AddressProtocol, CastEmbed, CastParent, MessageBody, FARCASTER_EPOCH,
};
use hub_shuttle::error::DecodeError;
use hub_shuttle::grpc::proto;

// ===========================================================================
// Cast-add
// ===========================================================================

#[test]
fn test_decode_cast_add() {
    let msg = cast_add_message(1, 1000, "hello", &["https://x"], &[1, 2], &[0, 6]);
    let row = decode(&msg).unwrap();

    assert_eq!(row.fid, 1);
    assert_eq!(row.message_type, proto::MessageType::CastAdd);
    assert_eq!(row.timestamp.timestamp(), FARCASTER_EPOCH + 1000);
    assert_eq!(row.hash, msg.hash);
    assert_eq!(row.signer, msg.signer);
    assert_eq!(row.raw, msg.encode_to_vec());
    assert!(row.deleted_at.is_none());
    assert!(row.pruned_at.is_none());
    assert!(row.revoked_at.is_none());

    let MessageBody::CastAdd(body) = &row.body else {
        panic!("expected cast-add body, got {:?}", row.body);
    };
    assert_eq!(body.text, "hello");
    assert_eq!(body.embeds, vec![CastEmbed::Url("https://x".to_string())]);
    assert_eq!(body.mentions, vec![1, 2]);
    assert_eq!(body.mentions_positions, vec![0, 6]);
    assert!(body.parent.is_none());
}

#[test]
fn test_decode_cast_add_with_cast_parent() {
    let parent_hash = vec![0x0F; 20];
    let msg = cast_add_with_parent(
        2,
        50,
        "reply",
        proto::cast_add_body::Parent::ParentCastId(proto::CastId {
            fid: 9,
            hash: parent_hash.clone(),
        }),
    );
    let row = decode(&msg).unwrap();

    let MessageBody::CastAdd(body) = &row.body else {
        panic!("expected cast-add body");
    };
    match &body.parent {
        Some(CastParent::Cast(parent)) => {
            assert_eq!(parent.fid, 9);
            assert_eq!(parent.hash, hex::encode(&parent_hash));
        }
        other => panic!("expected cast parent, got {other:?}"),
    }
}

#[test]
fn test_decode_cast_add_with_url_parent() {
    let msg = cast_add_with_parent(
        2,
        50,
        "channel post",
        proto::cast_add_body::Parent::ParentUrl("https://channel".to_string()),
    );
    let row = decode(&msg).unwrap();

    let MessageBody::CastAdd(body) = &row.body else {
        panic!("expected cast-add body");
    };
    assert_eq!(
        body.parent,
        Some(CastParent::Url("https://channel".to_string()))
    );
}

#[test]
fn test_decode_cast_remove() {
    let target = vec![0xAA; 20];
    let msg = cast_remove_message(3, 77, &target);
    let row = decode(&msg).unwrap();

    assert_eq!(row.message_type, proto::MessageType::CastRemove);
    let MessageBody::CastRemove(body) = &row.body else {
        panic!("expected cast-remove body");
    };
    assert_eq!(body.target_hash, hex::encode(&target));
}

// ===========================================================================
// Reaction / link
// ===========================================================================

#[test]
fn test_decode_reaction_add() {
    let target_hash = vec![0xBB; 20];
    let msg = reaction_add_message(4, 10, proto::ReactionType::Like, 5, &target_hash);
    let row = decode(&msg).unwrap();

    assert_eq!(row.message_type, proto::MessageType::ReactionAdd);
    let MessageBody::Reaction(body) = &row.body else {
        panic!("expected reaction body");
    };
    assert_eq!(body.reaction_type, proto::ReactionType::Like as i32);
    match &body.target {
        hub_shuttle::codec::ReactionTarget::Cast(cast) => {
            assert_eq!(cast.fid, 5);
            assert_eq!(cast.hash, hex::encode(&target_hash));
        }
        other => panic!("expected cast target, got {other:?}"),
    }
}

#[test]
fn test_decode_link_add_converts_display_timestamp_to_unix_millis() {
    let msg = link_add_message(6, 20, "follow", 7, Some(100));
    let row = decode(&msg).unwrap();

    let MessageBody::Link(body) = &row.body else {
        panic!("expected link body");
    };
    assert_eq!(body.link_type, "follow");
    assert_eq!(body.target_fid, 7);
    assert_eq!(body.display_timestamp, Some((FARCASTER_EPOCH + 100) * 1000));
}

#[test]
fn test_decode_link_add_without_display_timestamp() {
    let msg = link_add_message(6, 20, "follow", 7, None);
    let row = decode(&msg).unwrap();

    let MessageBody::Link(body) = &row.body else {
        panic!("expected link body");
    };
    assert!(body.display_timestamp.is_none());
}

// ===========================================================================
// Verifications: protocol-appropriate address encodings
// ===========================================================================

#[test]
fn test_decode_verification_add_ethereum() {
    let address: Vec<u8> = (1..=20).collect();
    let msg = verification_add_message(8, 30, proto::Protocol::Ethereum, &address);
    let row = decode(&msg).unwrap();

    assert_eq!(row.message_type, proto::MessageType::VerificationAddAddress);
    let MessageBody::VerificationAdd(body) = &row.body else {
        panic!("expected verification-add body");
    };
    assert_eq!(body.address, format!("0x{}", hex::encode(&address)));
    assert_eq!(body.protocol, AddressProtocol::Ethereum);
    assert_eq!(body.claim_signature, hex::encode(vec![0xAB; 65]));
    assert_eq!(body.block_hash, hex::encode(vec![0xCD; 32]));
}

#[test]
fn test_decode_verification_add_solana() {
    let address = [0x42u8; 32];
    let msg = verification_add_message(8, 30, proto::Protocol::Solana, &address);
    let row = decode(&msg).unwrap();

    let MessageBody::VerificationAdd(body) = &row.body else {
        panic!("expected verification-add body");
    };
    assert_eq!(body.address, bs58::encode(&address).into_string());
    assert_eq!(body.protocol, AddressProtocol::Solana);
}

#[test]
fn test_decode_verification_remove() {
    let address: Vec<u8> = (1..=20).collect();
    let msg = verification_remove_message(8, 31, proto::Protocol::Ethereum, &address);
    let row = decode(&msg).unwrap();

    assert_eq!(row.message_type, proto::MessageType::VerificationRemove);
    let MessageBody::VerificationRemove(body) = &row.body else {
        panic!("expected verification-remove body");
    };
    assert_eq!(body.address, format!("0x{}", hex::encode(&address)));
}

// ===========================================================================
// User data / username proof
// ===========================================================================

#[test]
fn test_decode_user_data() {
    let msg = user_data_message(9, 40, proto::UserDataType::Display, "alice");
    let row = decode(&msg).unwrap();

    let MessageBody::UserData(body) = &row.body else {
        panic!("expected user-data body");
    };
    assert_eq!(body.user_data_type, proto::UserDataType::Display as i32);
    assert_eq!(body.value, "alice");
}

#[test]
fn test_decode_username_proof_hex_fields() {
    let msg = username_proof_message(10, 60, b"alice");
    let row = decode(&msg).unwrap();

    let MessageBody::UsernameProof(body) = &row.body else {
        panic!("expected username-proof body");
    };
    assert_eq!(body.name, hex::encode(b"alice"));
    assert_eq!(body.owner, hex::encode(vec![0x11; 20]));
    assert_eq!(body.signature, hex::encode(vec![0x22; 65]));
    assert_eq!(body.fid, 10);
    assert_eq!(body.timestamp, 1_700_000_000);
}

// ===========================================================================
// Failure modes (all permanent)
// ===========================================================================

#[test]
fn test_decode_rejects_tampered_hash() {
    let mut msg = cast_add_message(1, 10, "tamper me", &[], &[], &[]);
    msg.hash[0] ^= 0xFF;
    assert!(matches!(
        decode(&msg),
        Err(DecodeError::InvalidMessage(_))
    ));
}

#[test]
fn test_decode_rejects_tampered_signature() {
    let mut msg = cast_add_message(1, 10, "tamper me", &[], &[], &[]);
    msg.signature[0] ^= 0xFF;
    assert!(matches!(
        decode(&msg),
        Err(DecodeError::InvalidMessage(_))
    ));
}

#[test]
fn test_decode_rejects_wrong_signer() {
    let mut msg = cast_add_message(1, 10, "tamper me", &[], &[], &[]);
    let other = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
    msg.signer = other.verifying_key().to_bytes().to_vec();
    assert!(matches!(
        decode(&msg),
        Err(DecodeError::InvalidMessage(_))
    ));
}

#[test]
fn test_decode_rejects_missing_body() {
    let msg = proto::Message {
        data: None,
        hash: vec![0; 20],
        hash_scheme: proto::HashScheme::Blake3 as i32,
        signature: vec![0; 64],
        signature_scheme: proto::SignatureScheme::Ed25519 as i32,
        signer: vec![0; 32],
        data_bytes: None,
    };
    assert!(matches!(decode(&msg), Err(DecodeError::MissingBody)));
}

#[test]
fn test_decode_rejects_unknown_type() {
    let mut msg = cast_add_message(1, 10, "x", &[], &[], &[]);
    // Rewrite the type and re-sign so only the type is at fault.
    let mut data = msg.data.take().unwrap();
    data.r#type = 99;
    msg = sign_data(data);
    assert!(matches!(decode(&msg), Err(DecodeError::UnknownType(99))));
}

#[test]
fn test_decode_rejects_body_type_mismatch() {
    let mut msg = cast_add_message(1, 10, "x", &[], &[], &[]);
    let mut data = msg.data.take().unwrap();
    data.r#type = proto::MessageType::CastRemove as i32;
    msg = sign_data(data);
    assert!(matches!(decode(&msg), Err(DecodeError::BodyMismatch(_))));
}

#[test]
fn test_decode_rejects_unsupported_hash_scheme() {
    let mut msg = cast_add_message(1, 10, "x", &[], &[], &[]);
    msg.hash_scheme = proto::HashScheme::None as i32;
    assert!(matches!(
        decode(&msg),
        Err(DecodeError::InvalidMessage(_))
    ));
}
