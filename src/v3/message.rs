//! The outer SNMPv3 message envelope (RFC 3412 §6): `msgVersion`,
//! `msgGlobalData` (the `HeaderData` SEQUENCE), `msgSecurityParameters`, and
//! the `scopedPduData` that the security model produces or consumes.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::internal::DecodeErrorKind as Kind;
use crate::error::{Error, Result};
use crate::pdu::Pdu;
use crate::security::SecurityLevel;
use crate::version::Version;

/// RFC 3412 §6's minimum `msgMaxSize`: 484 octets, the smallest a
/// conformant implementation may advertise.
pub const MIN_MSG_MAX_SIZE: i32 = 484;

/// `msgFlags`, a single octet of bit flags (RFC 3412 §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageFlags {
    byte: u8,
}

impl MessageFlags {
    const AUTH_FLAG: u8 = 0x01;
    const PRIV_FLAG: u8 = 0x02;
    const REPORTABLE_FLAG: u8 = 0x04;
    const ALL_FLAGS: u8 = Self::AUTH_FLAG | Self::PRIV_FLAG | Self::REPORTABLE_FLAG;

    pub fn new(security_level: SecurityLevel, reportable: bool) -> Self {
        let mut byte = 0u8;
        if security_level.auth() {
            byte |= Self::AUTH_FLAG;
        }
        if security_level.priv_() {
            byte |= Self::PRIV_FLAG;
        }
        if reportable {
            byte |= Self::REPORTABLE_FLAG;
        }
        Self { byte }
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            byte: byte & Self::ALL_FLAGS,
        }
    }

    pub fn as_byte(self) -> u8 {
        self.byte
    }

    pub fn auth_flag(self) -> bool {
        self.byte & Self::AUTH_FLAG != 0
    }

    pub fn priv_flag(self) -> bool {
        self.byte & Self::PRIV_FLAG != 0
    }

    pub fn reportable_flag(self) -> bool {
        self.byte & Self::REPORTABLE_FLAG != 0
    }

    /// Derive the requested [`SecurityLevel`], rejecting the
    /// priv-without-auth combination (RFC 3412 §6.3: "if the privFlag is
    /// set to 1 and the authFlag is set to 0, then the message is
    /// discarded").
    pub fn security_level(self) -> Option<SecurityLevel> {
        SecurityLevel::new(self.auth_flag(), self.priv_flag())
    }
}

/// `msgGlobalData`, RFC 3412 §6.3: `(msgID, msgMaxSize, msgFlags,
/// msgSecurityModel)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderData {
    pub msg_id: i32,
    pub msg_max_size: i32,
    pub flags: MessageFlags,
    pub security_model: i32,
}

impl HeaderData {
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_integer(self.security_model);
            buf.push_octet_string(&[self.flags.as_byte()]);
            buf.push_integer(self.msg_max_size);
            buf.push_integer(self.msg_id);
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let msg_id = seq.read_integer()?;
        if msg_id < 0 {
            return Err(Error::decode_internal(seq.position(), Kind::InvalidMsgId { value: msg_id }));
        }
        let msg_max_size = seq.read_integer()?;
        if msg_max_size < MIN_MSG_MAX_SIZE {
            return Err(Error::decode_internal(
                seq.position(),
                Kind::MsgMaxSizeTooSmall {
                    value: msg_max_size,
                    minimum: MIN_MSG_MAX_SIZE,
                },
            ));
        }
        let flags_bytes = seq.read_octet_string()?;
        if flags_bytes.is_empty() {
            return Err(Error::decode_internal(seq.position(), Kind::TruncatedData));
        }
        let flags = MessageFlags::from_byte(flags_bytes[0]);
        if flags.priv_flag() && !flags.auth_flag() {
            return Err(Error::decode_internal(seq.position(), Kind::InvalidMsgFlags));
        }
        let security_model = seq.read_integer()?;
        if security_model < 1 {
            return Err(Error::decode_internal(
                seq.position(),
                Kind::UnknownSecurityModel(security_model),
            ));
        }
        Ok(Self {
            msg_id,
            msg_max_size,
            flags,
            security_model,
        })
    }
}

/// `scopedPDU`, RFC 3412 §6.3.2: `(contextEngineID, contextName, pdu)`,
/// carried in the clear or encrypted depending on `msgFlags.privFlag`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedPdu {
    pub context_engine_id: Bytes,
    pub context_name: Bytes,
    pub pdu: Pdu,
}

impl ScopedPdu {
    pub fn new(context_engine_id: impl Into<Bytes>, context_name: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            context_engine_id: context_engine_id.into(),
            context_name: context_name.into(),
            pdu,
        }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.context_name);
            buf.push_octet_string(&self.context_engine_id);
        });
    }

    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let context_engine_id = seq.read_octet_string()?;
        let context_name = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;
        Ok(Self {
            context_engine_id,
            context_name,
            pdu,
        })
    }

    pub fn decode_from_bytes(bytes: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        Self::decode(&mut decoder)
    }
}

/// A fully decoded SNMPv3 message, up to (but not including) unwrapping the
/// security layer: `msgSecurityParameters` and `scopedPduData` are still
/// opaque bytes at this stage, handed to the appropriate
/// [`crate::security::SecurityModule`].
#[derive(Debug, Clone, PartialEq)]
pub struct SnmpV3Message {
    pub header: HeaderData,
    /// The security model's own parameters, an opaque OCTET STRING here.
    pub security_parameters: Bytes,
    /// Either a cleartext SEQUENCE (scopedPDU) or ciphertext, depending on
    /// `header.flags.priv_flag()`.
    pub data: Bytes,
}

impl SnmpV3Message {
    /// Encode the outer envelope. `data` is written as an OCTET STRING when
    /// `header.flags.priv_flag()` is set (the caller is responsible for
    /// having already encrypted it), and inline as-is otherwise (a cleartext
    /// scopedPDU is carried as a bare SEQUENCE, not wrapped).
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            if self.header.flags.priv_flag() {
                buf.push_octet_string(&self.data);
            } else {
                buf.push_bytes_raw(&self.data);
            }
            buf.push_octet_string(&self.security_parameters);
            self.header.encode(buf);
            buf.push_integer(Version::V3.as_i32());
        });
    }

    /// Decode the outer envelope. `data` is left exactly as carried on the
    /// wire: a BER SEQUENCE when cleartext, ciphertext bytes when encrypted;
    /// callers distinguish using `header.flags.priv_flag()`.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let version = seq.read_integer()?;
        if Version::from_i32(version) != Some(Version::V3) {
            return Err(Error::decode_internal(seq.position(), Kind::UnknownVersion(version)));
        }
        let header = HeaderData::decode(&mut seq)?;
        let security_parameters = seq.read_octet_string()?;
        let data = if header.flags.priv_flag() {
            seq.read_octet_string()?
        } else {
            let (tag, contents) = seq.read_raw_tlv()?;
            let mut rewrap = EncodeBuf::new();
            rewrap.push_constructed(tag, |buf| buf.push_bytes_raw(&contents));
            rewrap.finish()
        };
        Ok(Self {
            header,
            security_parameters,
            data,
        })
    }

    pub fn decode_from_bytes(bytes: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        Self::decode(&mut decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::RequestPdu;
    use crate::value::Value;
    use crate::varbind::VarBind;

    #[test]
    fn test_message_flags_roundtrip() {
        let flags = MessageFlags::new(SecurityLevel::AUTH_PRIV, true);
        assert!(flags.auth_flag());
        assert!(flags.priv_flag());
        assert!(flags.reportable_flag());
        assert_eq!(flags.security_level(), Some(SecurityLevel::AUTH_PRIV));
    }

    #[test]
    fn test_message_flags_masks_unknown_bits() {
        let flags = MessageFlags::from_byte(0xFF);
        assert_eq!(flags.as_byte(), 0x07);
    }

    #[test]
    fn test_header_data_roundtrip() {
        let header = HeaderData {
            msg_id: 42,
            msg_max_size: 1472,
            flags: MessageFlags::new(SecurityLevel::AUTH_NO_PRIV, true),
            security_model: 3,
        };
        let mut buf = EncodeBuf::new();
        header.encode(&mut buf);
        let bytes = buf.finish();
        let mut decoder = Decoder::new(bytes);
        let decoded = HeaderData::decode(&mut decoder).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_data_rejects_undersized_max_size() {
        let header = HeaderData {
            msg_id: 1,
            msg_max_size: 100,
            flags: MessageFlags::default(),
            security_model: 3,
        };
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_integer(header.security_model);
            buf.push_octet_string(&[header.flags.as_byte()]);
            buf.push_integer(header.msg_max_size);
            buf.push_integer(header.msg_id);
        });
        let bytes = buf.finish();
        let mut decoder = Decoder::new(bytes);
        assert!(HeaderData::decode(&mut decoder).is_err());
    }

    #[test]
    fn test_scoped_pdu_roundtrip() {
        let pdu = Pdu::GetRequest(RequestPdu::new(7, vec![VarBind::new(oid!(1, 3, 6, 1), Value::Null)]));
        let scoped = ScopedPdu::new(b"engine-id".to_vec(), b"".to_vec(), pdu);
        let bytes = scoped.encode_to_bytes();
        let decoded = ScopedPdu::decode_from_bytes(bytes).unwrap();
        assert_eq!(decoded, scoped);
    }

    #[test]
    fn test_message_roundtrip_cleartext() {
        let pdu = Pdu::GetRequest(RequestPdu::new(1, vec![]));
        let scoped = ScopedPdu::new(b"engine".to_vec(), b"".to_vec(), pdu);
        let message = SnmpV3Message {
            header: HeaderData {
                msg_id: 5,
                msg_max_size: 1472,
                flags: MessageFlags::new(SecurityLevel::NO_AUTH_NO_PRIV, true),
                security_model: 3,
            },
            security_parameters: Bytes::new(),
            data: scoped.encode_to_bytes(),
        };
        let mut buf = EncodeBuf::new();
        message.encode(&mut buf);
        let bytes = buf.finish();
        let decoded = SnmpV3Message::decode_from_bytes(bytes).unwrap();
        assert_eq!(decoded.header, message.header);
        let decoded_scoped = ScopedPdu::decode_from_bytes(decoded.data).unwrap();
        assert_eq!(decoded_scoped, scoped);
    }

    #[test]
    fn test_message_rejects_non_v3() {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_octet_string(b"");
            buf.push_octet_string(b"");
            buf.push_sequence(|buf| {
                buf.push_integer(3);
                buf.push_octet_string(&[0]);
                buf.push_integer(1472);
                buf.push_integer(1);
            });
            buf.push_integer(1);
        });
        let bytes = buf.finish();
        assert!(SnmpV3Message::decode_from_bytes(bytes).is_err());
    }
}
