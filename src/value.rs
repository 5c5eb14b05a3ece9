//! SNMP variable values.
//!
//! Covers the SMIv2 base types (RFC 2578 §7) plus the three context-tagged
//! exception values a GETNEXT/GETBULK response can carry in place of a real
//! value (RFC 3416 §3).

use bytes::Bytes;

use crate::ber::{tag, Decoder, EncodeBuf};
use crate::error::internal::DecodeErrorKind as Kind;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::util::HexBytes;

/// The value half of a [`crate::varbind::VarBind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// INTEGER.
    Integer(i32),
    /// OCTET STRING.
    OctetString(Bytes),
    /// NULL, used for GET/GETNEXT request varbinds and for columns with no
    /// meaningful scalar value.
    Null,
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// IpAddress (APPLICATION 0): a 4-byte address in network byte order.
    IpAddress([u8; 4]),
    /// Counter32 (APPLICATION 1): monotonically increasing, wraps at 2^32.
    Counter32(u32),
    /// Gauge32 / Unsigned32 (APPLICATION 2): non-negative, may go up or down.
    Gauge32(u32),
    /// TimeTicks (APPLICATION 3): hundredths of a second since some epoch.
    TimeTicks(u32),
    /// Opaque (APPLICATION 4): arbitrary ASN.1-wrapped data, carried opaque.
    Opaque(Bytes),
    /// Counter64 (APPLICATION 6).
    Counter64(u64),
    /// noSuchObject exception value (CONTEXT 0).
    NoSuchObject,
    /// noSuchInstance exception value (CONTEXT 1).
    NoSuchInstance,
    /// endOfMibView exception value (CONTEXT 2).
    EndOfMibView,
}

impl Value {
    /// Whether this is one of the three RFC 3416 exception values rather
    /// than a real value.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => {
                buf.push_bytes(data);
                buf.push_length(data.len());
                buf.push_tag(tag::application::OPAQUE);
            }
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::NoSuchObject => push_exception(buf, tag::context::NO_SUCH_OBJECT),
            Value::NoSuchInstance => push_exception(buf, tag::context::NO_SUCH_INSTANCE),
            Value::EndOfMibView => push_exception(buf, tag::context::END_OF_MIB_VIEW),
        }
    }

    /// Decode from BER, dispatching on the leading tag.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let observed_tag = decoder.peek_tag()?;
        match observed_tag {
            tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer()?)),
            tag::universal::NULL => {
                decoder.read_null()?;
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decoder.read_oid()?))
            }
            tag::application::IP_ADDRESS => Ok(Value::IpAddress(decoder.read_ip_address()?)),
            tag::application::COUNTER32 => Ok(Value::Counter32(decoder.read_counter32()?)),
            tag::application::GAUGE32 => Ok(Value::Gauge32(decoder.read_gauge32()?)),
            tag::application::TIMETICKS => Ok(Value::TimeTicks(decoder.read_timeticks()?)),
            tag::application::OPAQUE => Ok(Value::Opaque(decoder.read_opaque()?)),
            tag::application::COUNTER64 => Ok(Value::Counter64(decoder.read_counter64()?)),
            tag::context::NO_SUCH_OBJECT => {
                read_exception(decoder, tag::context::NO_SUCH_OBJECT)?;
                Ok(Value::NoSuchObject)
            }
            tag::context::NO_SUCH_INSTANCE => {
                read_exception(decoder, tag::context::NO_SUCH_INSTANCE)?;
                Ok(Value::NoSuchInstance)
            }
            tag::context::END_OF_MIB_VIEW => {
                read_exception(decoder, tag::context::END_OF_MIB_VIEW)?;
                Ok(Value::EndOfMibView)
            }
            _ if observed_tag == tag::universal::OCTET_STRING_CONSTRUCTED => {
                Err(Error::decode_internal(
                    decoder.position(),
                    Kind::ConstructedOctetString,
                ))
            }
            tag::universal::OCTET_STRING => Ok(Value::OctetString(decoder.read_octet_string()?)),
            other => Err(Error::decode_internal(
                decoder.position(),
                Kind::UnexpectedTag {
                    expected: tag::universal::OCTET_STRING,
                    actual: other,
                },
            )),
        }
    }
}

fn push_exception(buf: &mut EncodeBuf, tag: u8) {
    buf.push_length(0);
    buf.push_tag(tag);
}

fn read_exception(decoder: &mut Decoder, expected: u8) -> Result<()> {
    let (observed, contents) = decoder.read_raw_tlv()?;
    debug_assert_eq!(observed, expected);
    if !contents.is_empty() {
        return Err(Error::decode_internal(decoder.position(), Kind::InvalidNull));
    }
    Ok(())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    if s.chars().all(|c| !c.is_control() || c == '\t') {
                        return write!(f, "{:?}", s);
                    }
                }
                write!(f, "{}", HexBytes(data))
            }
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Value::Counter32(v) => write!(f, "{}", v),
            Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Opaque(data) => write!(f, "Opaque({})", HexBytes(data)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}
