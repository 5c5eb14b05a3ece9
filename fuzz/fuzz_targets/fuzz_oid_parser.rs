#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmp3_core::ber::Decoder;
use snmp3_core::oid::Oid;

fuzz_target!(|data: &[u8]| {
    // Fuzz OID from BER encoding
    let bytes = Bytes::copy_from_slice(data);
    let mut decoder = Decoder::new(bytes);
    let _ = decoder.read_oid();

    // Fuzz OID from dotted string notation (if data is valid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let _: Result<Oid, _> = s.parse();
    }
});
