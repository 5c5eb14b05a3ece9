//! BER length encoding/decoding (X.690 §8.1.3).
//!
//! Only the definite form is supported, matching SNMP's use of BER (the
//! indefinite form is a DER/CER-incompatible feature SNMP never emits).

use crate::error::internal::DecodeErrorKind;

/// Maximum number of length octets we will read in the long form. SNMP
/// messages fit comfortably in 32 bits; 4 octets covers lengths up to 4 GiB.
const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a length for prepending into a reverse-order [`super::EncodeBuf`].
///
/// Returns a fixed-size array holding the length bytes in the order they
/// must be pushed (most-significant byte pushed last, i.e. the array is
/// already reversed for a reverse buffer) along with how many bytes are
/// valid.
pub(crate) fn encode_length(len: usize) -> ([u8; 5], usize) {
    if len < 128 {
        return ([len as u8, 0, 0, 0, 0], 1);
    }

    let bytes = (len as u32).to_be_bytes();
    let mut start = 0;
    while start < 3 && bytes[start] == 0 {
        start += 1;
    }
    let num_len_bytes = 4 - start;

    // Reverse buffer: the caller pushes each of these bytes individually
    // (one `buf.push` per byte, no internal re-reversal), so the final
    // forward output is this array's *reverse*. We want the forward output
    // to read `0x80|num_len_bytes` followed by the big-endian length bytes,
    // so the push order is the length bytes least-significant-first,
    // followed by the count byte last.
    let mut out = [0u8; 5];
    for i in 0..num_len_bytes {
        out[i] = bytes[3 - i];
    }
    out[num_len_bytes] = 0x80 | (num_len_bytes as u8);
    (out, num_len_bytes + 1)
}

/// Decode a BER length field. Returns `(length, bytes_consumed)`.
pub(crate) fn decode_length(data: &[u8]) -> Result<(usize, usize), DecodeErrorKind> {
    let first = *data.first().ok_or(DecodeErrorKind::TruncatedData)?;

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let octets = (first & 0x7F) as usize;
    if octets == 0 {
        // 0x80 alone is the indefinite-length marker; not supported.
        return Err(DecodeErrorKind::IndefiniteLength);
    }
    if octets > MAX_LENGTH_OCTETS {
        return Err(DecodeErrorKind::LengthTooLong { octets });
    }
    if data.len() < 1 + octets {
        return Err(DecodeErrorKind::TruncatedData);
    }

    let mut value: u64 = 0;
    for &b in &data[1..1 + octets] {
        value = (value << 8) | u64::from(b);
    }

    if value > usize::MAX as u64 {
        return Err(DecodeErrorKind::LengthExceedsMax {
            length: value as usize,
            max: usize::MAX,
        });
    }

    Ok((value as usize, 1 + octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_to_vec(len: usize) -> Vec<u8> {
        let (arr, count) = encode_length(len);
        // arr[0] is the first byte pushed (prepended first => ends up last
        // in forward order among these bytes)... easiest to just verify
        // round-trip through decode rather than hand-reverse here.
        let mut buf = crate::ber::EncodeBuf::new();
        for b in arr.iter().take(count) {
            buf.push_byte(*b);
        }
        let mut bytes = buf.finish_vec();
        bytes.reverse();
        bytes
    }

    #[test]
    fn test_length_short_form() {
        assert_eq!(decode_length(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode_length(&[0x7F]).unwrap(), (127, 1));
    }

    #[test]
    fn test_length_long_form() {
        assert_eq!(decode_length(&[0x81, 0x80]).unwrap(), (128, 2));
        assert_eq!(decode_length(&[0x82, 0x01, 0x00]).unwrap(), (256, 3));
        assert_eq!(decode_length(&[0x84, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap(), (0xFFFF_FFFF, 5));
    }

    #[test]
    fn test_length_indefinite_rejected() {
        assert!(matches!(
            decode_length(&[0x80]),
            Err(DecodeErrorKind::IndefiniteLength)
        ));
    }

    #[test]
    fn test_length_truncated() {
        assert!(matches!(
            decode_length(&[0x82, 0x01]),
            Err(DecodeErrorKind::TruncatedData)
        ));
        assert!(matches!(decode_length(&[]), Err(DecodeErrorKind::TruncatedData)));
    }

    #[test]
    fn test_length_roundtrip() {
        for &len in &[0usize, 1, 127, 128, 255, 256, 65535, 65536, 1_000_000] {
            let bytes = encode_to_vec(len);
            let (decoded, consumed) = decode_length(&bytes).unwrap();
            assert_eq!(decoded, len);
            assert_eq!(consumed, bytes.len());
        }
    }
}
