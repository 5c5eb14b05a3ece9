//! BER decoding.
//!
//! Mostly permissive, aligned with net-snmp behavior: indefinite lengths and
//! constructed OCTET STRINGs are rejected outright, but otherwise lengths
//! aren't held to DER canonical form. INTEGER encodings are the exception —
//! a redundant leading `0x00` or `0xFF` sign-guard byte is rejected, since
//! accepting it would let semantically distinct wire encodings decode to the
//! same value.
//!
//! [`Decoder`] owns a [`Bytes`], so slicing out a nested SEQUENCE or PDU is a
//! cheap refcount bump rather than a copy, and sub-decoders can be handed
//! around and held past the lifetime of the original buffer.

use bytes::Bytes;

use super::length::decode_length;
use super::tag;
use crate::error::internal::DecodeErrorKind as Kind;
use crate::error::{Error, Result};
use crate::oid::Oid;

/// Cursor over a BER-encoded byte buffer.
///
/// Tracks the absolute offset of its first unread byte (relative to the
/// outermost message) so that decode errors can report where in the wire
/// data they occurred, even when decoding a nested SEQUENCE.
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a decoder over `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            offset: 0,
        }
    }

    fn with_offset(data: Bytes, offset: usize) -> Self {
        Self { data, offset }
    }

    /// Current absolute read offset.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Number of unconsumed bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.data
    }

    fn err(&self, kind: Kind) -> Error {
        Error::decode_internal(self.offset, kind)
    }

    /// Peek the next tag byte without consuming it.
    pub fn peek_tag(&self) -> Result<u8> {
        self.data
            .first()
            .copied()
            .ok_or_else(|| self.err(Kind::TruncatedData))
    }

    /// Split off and return the next `n` bytes, advancing the offset.
    fn advance(&mut self, n: usize) -> Bytes {
        let out = self.data.split_to(n);
        self.offset += n;
        out
    }

    /// Read a tag/length/value triplet whose tag must match `expected`.
    /// Returns the absolute offset at which the contents begin and the
    /// contents themselves.
    fn read_tlv_with_start(&mut self, expected: u8) -> Result<(usize, Bytes)> {
        let actual = self.peek_tag()?;
        if actual != expected {
            return Err(self.err(Kind::UnexpectedTag { expected, actual }));
        }
        self.advance(1);
        self.read_length_and_contents()
    }

    fn read_tlv(&mut self, expected: u8) -> Result<Bytes> {
        self.read_tlv_with_start(expected).map(|(_, data)| data)
    }

    fn read_length_and_contents(&mut self) -> Result<(usize, Bytes)> {
        let (len, consumed) = decode_length(&self.data).map_err(|k| self.err(k))?;
        self.advance(consumed);
        if self.data.len() < len {
            return Err(self.err(Kind::InsufficientData {
                needed: len,
                available: self.data.len(),
            }));
        }
        let start = self.offset;
        Ok((start, self.advance(len)))
    }

    /// Read an arbitrary tag/length/value triplet, returning the raw tag and
    /// contents. Used where the caller dispatches on the tag itself (PDU
    /// selection, varbind exception values).
    pub fn read_raw_tlv(&mut self) -> Result<(u8, Bytes)> {
        let tag = self.peek_tag()?;
        self.advance(1);
        let (_, contents) = self.read_length_and_contents()?;
        Ok((tag, contents))
    }

    /// Read an INTEGER.
    pub fn read_integer(&mut self) -> Result<i32> {
        let data = self.read_tlv(tag::universal::INTEGER)?;
        decode_signed(&data).map_err(|k| self.err(k))
    }

    /// Read a plain INTEGER that must be non-negative (e.g. msgID,
    /// msgMaxSize, securityModel), returning it as `u32`.
    pub fn read_non_negative_integer(&mut self) -> Result<u32> {
        let value = self.read_integer()?;
        u32::try_from(value).map_err(|_| self.err(Kind::IntegerOverflow))
    }

    fn read_unsigned32_tagged(&mut self, expected_tag: u8) -> Result<u32> {
        let data = self.read_tlv(expected_tag)?;
        decode_unsigned(&data, 5)
            .map(|v| v as u32)
            .map_err(|k| self.err(k))
    }

    /// Read a Counter32 (APPLICATION 1).
    pub fn read_counter32(&mut self) -> Result<u32> {
        self.read_unsigned32_tagged(tag::application::COUNTER32)
    }

    /// Read a Gauge32 / Unsigned32 (APPLICATION 2).
    pub fn read_gauge32(&mut self) -> Result<u32> {
        self.read_unsigned32_tagged(tag::application::GAUGE32)
    }

    /// Read a TimeTicks (APPLICATION 3).
    pub fn read_timeticks(&mut self) -> Result<u32> {
        self.read_unsigned32_tagged(tag::application::TIMETICKS)
    }

    /// Read a Counter64 (APPLICATION 6).
    pub fn read_counter64(&mut self) -> Result<u64> {
        let data = self.read_tlv(tag::application::COUNTER64)?;
        decode_unsigned(&data, 9).map_err(|k| self.err(k))
    }

    /// Read an Opaque (APPLICATION 4) as raw bytes.
    pub fn read_opaque(&mut self) -> Result<Bytes> {
        self.read_tlv(tag::application::OPAQUE)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        if self.peek_tag()? == tag::universal::OCTET_STRING_CONSTRUCTED {
            return Err(self.err(Kind::ConstructedOctetString));
        }
        self.read_tlv(tag::universal::OCTET_STRING)
    }

    /// Read a NULL, returning an error if its content is non-empty.
    pub fn read_null(&mut self) -> Result<()> {
        let data = self.read_tlv(tag::universal::NULL)?;
        if !data.is_empty() {
            return Err(self.err(Kind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let data = self.read_tlv(tag::universal::OBJECT_IDENTIFIER)?;
        Oid::from_ber_contents(&data).map_err(|k| self.err(k))
    }

    /// Read an IpAddress (APPLICATION 0), a 4-byte OCTET STRING variant.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let data = self.read_tlv(tag::application::IP_ADDRESS)?;
        data.as_ref()
            .try_into()
            .map_err(|_| self.err(Kind::InvalidIpAddressLength { length: data.len() }))
    }

    /// Read a SEQUENCE, returning a sub-decoder scoped to its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        let (start, contents) = self.read_tlv_with_start(tag::universal::SEQUENCE)?;
        Ok(Decoder::with_offset(contents, start))
    }

    /// Read a constructed value of any tag, returning the tag and a
    /// sub-decoder scoped to its contents. Used for PDU dispatch, where the
    /// tag (GetRequest, Response, Report, ...) picks the PDU variant.
    pub fn read_any_constructed(&mut self) -> Result<(u8, Decoder)> {
        let tag = self.peek_tag()?;
        self.advance(1);
        let (start, contents) = self.read_length_and_contents()?;
        Ok((tag, Decoder::with_offset(contents, start)))
    }

    /// Read a constructed value whose tag must match `expected_tag`,
    /// returning a sub-decoder scoped to its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let (start, contents) = self.read_tlv_with_start(expected_tag)?;
        Ok(Decoder::with_offset(contents, start))
    }
}

/// Decode a minimal two's-complement signed integer (up to 4 bytes).
fn decode_signed(data: &[u8]) -> std::result::Result<i32, Kind> {
    if data.is_empty() {
        return Err(Kind::ZeroLengthInteger);
    }
    if data.len() > 4 {
        return Err(Kind::IntegerOverflow);
    }
    if data.len() > 1 {
        let redundant_zero = data[0] == 0x00 && data[1] & 0x80 == 0;
        let redundant_ff = data[0] == 0xFF && data[1] & 0x80 != 0;
        if redundant_zero || redundant_ff {
            return Err(Kind::NonMinimalInteger);
        }
    }
    let mut value: i32 = if data[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in data {
        value = (value << 8) | i32::from(b);
    }
    Ok(value)
}

/// Decode a non-negative integer (possibly with a leading `0x00` sign-guard
/// byte) of up to `max_bytes` octets.
fn decode_unsigned(data: &[u8], max_bytes: usize) -> std::result::Result<u64, Kind> {
    if data.is_empty() {
        return Err(Kind::ZeroLengthInteger);
    }
    if data.len() > max_bytes {
        return Err(Kind::Integer64TooLong { length: data.len() });
    }
    if data[0] & 0x80 != 0 {
        return Err(Kind::IntegerOverflow);
    }
    let mut value: u64 = 0;
    for &b in data {
        value = (value << 8) | u64::from(b);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::EncodeBuf;

    #[test]
    fn test_decode_integer() {
        let mut buf = EncodeBuf::new();
        buf.push_integer(-129);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_integer().unwrap(), -129);
        assert!(dec.is_empty());
    }

    #[test]
    fn test_decode_integer_rejects_redundant_leading_zero() {
        // INTEGER, length 2, 0x00 0x7F — 0x7F alone already encodes 127
        // unambiguously, so the leading 0x00 is non-minimal.
        let bytes = Bytes::from_static(&[0x02, 0x02, 0x00, 0x7F]);
        let mut dec = Decoder::new(bytes);
        assert!(matches!(
            dec.read_integer(),
            Err(Error::Decode {
                kind: crate::error::DecodeErrorKind::NonMinimalInteger,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_integer_rejects_redundant_leading_ff() {
        // INTEGER, length 2, 0xFF 0x80 — 0x80 alone already encodes -128
        // unambiguously, so the leading 0xFF is non-minimal.
        let bytes = Bytes::from_static(&[0x02, 0x02, 0xFF, 0x80]);
        let mut dec = Decoder::new(bytes);
        assert!(matches!(
            dec.read_integer(),
            Err(Error::Decode {
                kind: crate::error::DecodeErrorKind::NonMinimalInteger,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_integer_accepts_required_leading_zero() {
        // INTEGER, length 2, 0x00 0x80 — the leading 0x00 is required here
        // to keep the value non-negative (0x80 alone would mean -128).
        let bytes = Bytes::from_static(&[0x02, 0x02, 0x00, 0x80]);
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_integer().unwrap(), 128);
    }

    #[test]
    fn test_decode_octet_string() {
        let mut buf = EncodeBuf::new();
        buf.push_octet_string(b"public");
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(&dec.read_octet_string().unwrap()[..], b"public");
    }

    #[test]
    fn test_decode_constructed_octet_string_rejected() {
        let bytes = Bytes::from_static(&[0x24, 0x00]);
        let mut dec = Decoder::new(bytes);
        assert!(matches!(
            dec.read_octet_string(),
            Err(Error::Decode {
                kind: crate::error::DecodeErrorKind::ConstructedOctetString,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_null() {
        let mut buf = EncodeBuf::new();
        buf.push_null();
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        dec.read_null().unwrap();
    }

    #[test]
    fn test_decode_null_nonzero_length_rejected() {
        let bytes = Bytes::from_static(&[0x05, 0x01, 0x00]);
        let mut dec = Decoder::new(bytes);
        assert!(dec.read_null().is_err());
    }

    #[test]
    fn test_decode_oid() {
        let oid = crate::oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
        let mut buf = EncodeBuf::new();
        buf.push_oid(&oid);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_oid().unwrap(), oid);
    }

    #[test]
    fn test_decode_sequence_nested() {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_integer(2);
            buf.push_integer(1);
        });
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        let mut seq = dec.read_sequence().unwrap();
        let a = seq.read_integer().unwrap();
        let b = seq.read_integer().unwrap();
        assert_eq!((a, b), (1, 2));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_decode_unexpected_tag_reports_offset() {
        let bytes = Bytes::from_static(&[0x30, 0x02, 0x02, 0x01]);
        let mut dec = Decoder::new(bytes);
        let err = dec.read_octet_string().unwrap_err();
        match err {
            Error::Decode { offset, .. } => assert_eq!(offset, 0),
            _ => panic!("expected decode error"),
        }
    }

    #[test]
    fn test_decode_nested_offset_is_absolute() {
        // SEQUENCE { INTEGER 1, OCTET STRING "x" } followed by a bad tag
        // inside the inner sequence: offset should point into the nested
        // region, not restart at 0.
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_octet_string(b"x");
            buf.push_integer(1);
        });
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        let mut seq = dec.read_sequence().unwrap();
        let _ = seq.read_integer().unwrap();
        let offset_before = seq.position();
        let err = seq.read_integer().unwrap_err();
        match err {
            Error::Decode { offset, .. } => assert_eq!(offset, offset_before),
            _ => panic!("expected decode error"),
        }
        assert!(offset_before > 0);
    }

    #[test]
    fn test_decode_truncated_length() {
        let bytes = Bytes::from_static(&[0x04, 0x05, 0x01]);
        let mut dec = Decoder::new(bytes);
        assert!(dec.read_octet_string().is_err());
    }

    #[test]
    fn test_decode_counter64() {
        let mut buf = EncodeBuf::new();
        buf.push_integer64(u64::MAX);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_counter64().unwrap(), u64::MAX);
    }

    #[test]
    fn test_decode_ip_address() {
        let mut buf = EncodeBuf::new();
        buf.push_ip_address([192, 0, 2, 1]);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_ip_address().unwrap(), [192, 0, 2, 1]);
    }
}
