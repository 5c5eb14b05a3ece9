#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp3_core::pdu::Pdu;
use snmp3_core::v3::{ScopedPdu, SnmpV3Message};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Fuzz the SNMPv3 outer envelope decoder
    let _ = SnmpV3Message::decode_from_bytes(bytes.clone());

    // Fuzz scopedPDU decoding directly
    let _ = ScopedPdu::decode_from_bytes(bytes.clone());

    // Fuzz PDU decoder
    let mut decoder = snmp3_core::ber::Decoder::new(bytes.clone());
    let _ = Pdu::decode(&mut decoder);
});
