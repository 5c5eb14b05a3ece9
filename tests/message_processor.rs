//! Response-matching scenarios for `MessageProcessor`, exercising the
//! ordered cross-check RFC 3412 §4 runs against an incoming Response/Report
//! before delivering it to the caller's handle.

use std::time::Duration;

use bytes::Bytes;
use snmp3_core::ber::EncodeBuf;
use snmp3_core::oid;
use snmp3_core::pdu::{Pdu, RequestPdu};
use snmp3_core::security::{SecurityLevel, SecurityModel, SecurityModule};
use snmp3_core::v3::{
    HeaderData, MessageFlags, MessageProcessor, ScopedPdu, SnmpV3Message, UsmSecurityModule,
    MIN_MSG_MAX_SIZE,
};
use snmp3_core::value::Value;
use snmp3_core::varbind::VarBind;
use snmp3_core::Error;

fn processor_with_users() -> MessageProcessor<UsmSecurityModule> {
    let security = UsmSecurityModule::new(b"local-engine".to_vec());
    security
        .add_user(b"local-engine".to_vec(), "alice", None, None)
        .unwrap();
    security
        .add_user(b"local-engine".to_vec(), "bob", None, None)
        .unwrap();
    security
        .add_user(b"remote-engine".to_vec(), "alice", None, None)
        .unwrap();
    MessageProcessor::new(security)
}

fn encode_response(
    processor: &MessageProcessor<UsmSecurityModule>,
    msg_id: i32,
    engine_id: &[u8],
    security_name: &[u8],
    context_name: &[u8],
    pdu: Pdu,
) -> Bytes {
    let scoped = ScopedPdu::new(engine_id.to_vec(), context_name.to_vec(), pdu);
    let (security_parameters, payload) = processor
        .security()
        .prepare_outgoing(
            engine_id,
            security_name,
            SecurityLevel::NO_AUTH_NO_PRIV,
            &scoped.encode_to_bytes(),
        )
        .unwrap();
    let message = SnmpV3Message {
        header: HeaderData {
            msg_id,
            msg_max_size: MIN_MSG_MAX_SIZE,
            flags: MessageFlags::new(SecurityLevel::NO_AUTH_NO_PRIV, false),
            security_model: SecurityModel::Usm.as_i32(),
        },
        security_parameters,
        data: payload,
    };
    let mut buf = EncodeBuf::new();
    message.encode(&mut buf);
    buf.finish()
}

#[tokio::test]
async fn rejects_response_from_wrong_security_name() {
    let processor = processor_with_users();
    let request = Pdu::GetRequest(RequestPdu::new(1, vec![VarBind::new(oid!(1, 3, 6, 1), Value::Null)]));

    let (_, handle) = processor
        .prepare_outgoing_message(
            request,
            b"local-engine".to_vec(),
            b"alice".to_vec(),
            SecurityLevel::NO_AUTH_NO_PRIV,
            b"".to_vec(),
            Duration::from_secs(5),
        )
        .unwrap();
    let msg_id = handle.msg_id();

    let response = Pdu::Response(RequestPdu::new(1, vec![]));
    let wire = encode_response(&processor, msg_id, b"local-engine", b"bob", b"", response);

    let err = processor.process_incoming_message(&wire).unwrap_err();
    assert!(matches!(err, Error::ResponseMismatch { msg_id: id, .. } if id == msg_id));

    let delivered = handle.recv(Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(delivered, Error::ResponseMismatch { msg_id: id, .. } if id == msg_id));
}

#[tokio::test]
async fn rejects_response_with_mismatched_context_name() {
    let processor = processor_with_users();
    let request = Pdu::GetRequest(RequestPdu::new(1, vec![VarBind::new(oid!(1, 3, 6, 1), Value::Null)]));

    let (_, handle) = processor
        .prepare_outgoing_message(
            request,
            b"local-engine".to_vec(),
            b"alice".to_vec(),
            SecurityLevel::NO_AUTH_NO_PRIV,
            b"context-a".to_vec(),
            Duration::from_secs(5),
        )
        .unwrap();
    let msg_id = handle.msg_id();

    let response = Pdu::Response(RequestPdu::new(1, vec![]));
    let wire = encode_response(&processor, msg_id, b"local-engine", b"alice", b"context-b", response);

    let err = processor.process_incoming_message(&wire).unwrap_err();
    assert!(matches!(err, Error::ResponseMismatch { msg_id: id, .. } if id == msg_id));
}

#[tokio::test]
async fn accepts_report_despite_foreign_engine_id() {
    // A discovery Report legitimately comes from an engine the caller
    // already has a (stale, or locally-assumed) engine ID on file for;
    // RFC 3412 §4's engine/level checks are skipped for Reports, so a
    // mismatch there doesn't block delivery the way it would for a
    // genuine Response.
    let processor = processor_with_users();
    let request = Pdu::GetRequest(RequestPdu::new(1, vec![VarBind::new(oid!(1, 3, 6, 1), Value::Null)]));

    let (_, handle) = processor
        .prepare_outgoing_message(
            request,
            b"local-engine".to_vec(),
            b"alice".to_vec(),
            SecurityLevel::NO_AUTH_NO_PRIV,
            b"".to_vec(),
            Duration::from_secs(5),
        )
        .unwrap();
    let msg_id = handle.msg_id();

    let report = Pdu::Report(RequestPdu::new(1, vec![]));
    let wire = encode_response(&processor, msg_id, b"remote-engine", b"alice", b"", report);

    processor.process_incoming_message(&wire).unwrap();
    let incoming = handle.recv(Duration::from_secs(1)).await.unwrap();
    assert_eq!(incoming.security_engine_id, Bytes::from_static(b"remote-engine"));
}

#[tokio::test]
async fn duplicate_response_is_a_late_response() {
    let processor = processor_with_users();
    let request = Pdu::GetRequest(RequestPdu::new(1, vec![VarBind::new(oid!(1, 3, 6, 1), Value::Null)]));

    let (_, handle) = processor
        .prepare_outgoing_message(
            request,
            b"local-engine".to_vec(),
            b"alice".to_vec(),
            SecurityLevel::NO_AUTH_NO_PRIV,
            b"".to_vec(),
            Duration::from_secs(5),
        )
        .unwrap();
    let msg_id = handle.msg_id();

    let response = Pdu::Response(RequestPdu::new(1, vec![]));
    let wire = encode_response(&processor, msg_id, b"local-engine", b"alice", b"", response);

    processor.process_incoming_message(&wire).unwrap();
    let err = processor.process_incoming_message(&wire).unwrap_err();
    assert!(matches!(err, Error::LateResponse { msg_id: id } if id == msg_id));

    let incoming = handle.recv(Duration::from_secs(1)).await.unwrap();
    assert_eq!(incoming.security_name, Bytes::from_static(b"alice"));
}
