//! SNMP PDU types (RFC 3416).
//!
//! Each PDU is an application-tagged constructed type wrapping
//! `(request-id, error-status, error-index, varbinds)`, except GETBULK,
//! whose middle two fields are reinterpreted as `(non-repeaters,
//! max-repetitions)`.

use crate::ber::{tag, Decoder, EncodeBuf};
use crate::error::internal::DecodeErrorKind as Kind;
use crate::error::{Error, ErrorStatus, Result};
use crate::varbind::{decode_varbind_list, encode_varbind_list, VarBind};

/// Request-id/error-status/error-index/varbinds body shared by every PDU
/// except GETBULK.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPdu {
    pub request_id: i32,
    pub error_status: ErrorStatus,
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl RequestPdu {
    /// Construct a request with `noError`/0 status fields, as used for
    /// outgoing GET/GETNEXT/SET/INFORM/TRAP requests.
    pub fn new(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            varbinds,
        }
    }

    fn encode_body(&self, buf: &mut EncodeBuf) {
        encode_varbind_list(buf, &self.varbinds);
        buf.push_integer(self.error_index);
        buf.push_integer(self.error_status.as_i32());
        buf.push_integer(self.request_id);
    }

    fn decode_body(decoder: &mut Decoder) -> Result<Self> {
        let request_id = decoder.read_integer()?;
        let error_status = ErrorStatus::from_i32(decoder.read_integer()?);
        let error_index = decoder.read_integer()?;
        if error_index < 0 {
            return Err(Error::decode_internal(
                decoder.position(),
                Kind::NegativeErrorIndex { value: error_index },
            ));
        }
        let varbinds = decode_varbind_list(decoder)?;
        if error_index as usize > varbinds.len() {
            return Err(Error::decode_internal(
                decoder.position(),
                Kind::ErrorIndexOutOfBounds {
                    index: error_index,
                    varbind_count: varbinds.len(),
                },
            ));
        }
        Ok(Self {
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }
}

/// GETBULK request body: `(request-id, non-repeaters, max-repetitions,
/// varbinds)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkPdu {
    pub request_id: i32,
    pub non_repeaters: u32,
    pub max_repetitions: u32,
    pub varbinds: Vec<VarBind>,
}

impl BulkPdu {
    pub fn new(request_id: i32, non_repeaters: u32, max_repetitions: u32, varbinds: Vec<VarBind>) -> Self {
        Self {
            request_id,
            non_repeaters,
            max_repetitions,
            varbinds,
        }
    }

    fn encode_body(&self, buf: &mut EncodeBuf) {
        encode_varbind_list(buf, &self.varbinds);
        buf.push_integer(self.max_repetitions as i32);
        buf.push_integer(self.non_repeaters as i32);
        buf.push_integer(self.request_id);
    }

    fn decode_body(decoder: &mut Decoder) -> Result<Self> {
        let request_id = decoder.read_integer()?;
        let non_repeaters = decoder.read_integer()?;
        if non_repeaters < 0 {
            return Err(Error::decode_internal(
                decoder.position(),
                Kind::NegativeNonRepeaters { value: non_repeaters },
            ));
        }
        let max_repetitions = decoder.read_integer()?;
        if max_repetitions < 0 {
            return Err(Error::decode_internal(
                decoder.position(),
                Kind::NegativeMaxRepetitions { value: max_repetitions },
            ));
        }
        let varbinds = decode_varbind_list(decoder)?;
        Ok(Self {
            request_id,
            non_repeaters: non_repeaters as u32,
            max_repetitions: max_repetitions as u32,
            varbinds,
        })
    }
}

/// A decoded SNMP PDU, tagged by its application-specific identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    GetRequest(RequestPdu),
    GetNextRequest(RequestPdu),
    GetBulkRequest(BulkPdu),
    SetRequest(RequestPdu),
    Response(RequestPdu),
    /// SNMPv2c/v3 trap (unconfirmed notification).
    Trap(RequestPdu),
    InformRequest(RequestPdu),
    Report(RequestPdu),
}

impl Pdu {
    fn tag(&self) -> u8 {
        match self {
            Pdu::GetRequest(_) => tag::pdu::GET_REQUEST,
            Pdu::GetNextRequest(_) => tag::pdu::GET_NEXT_REQUEST,
            Pdu::GetBulkRequest(_) => tag::pdu::GET_BULK_REQUEST,
            Pdu::SetRequest(_) => tag::pdu::SET_REQUEST,
            Pdu::Response(_) => tag::pdu::RESPONSE,
            Pdu::Trap(_) => tag::pdu::TRAP_V2,
            Pdu::InformRequest(_) => tag::pdu::INFORM_REQUEST,
            Pdu::Report(_) => tag::pdu::REPORT,
        }
    }

    /// The request-id shared by every PDU variant.
    pub fn request_id(&self) -> i32 {
        match self {
            Pdu::GetBulkRequest(p) => p.request_id,
            Pdu::GetRequest(p)
            | Pdu::GetNextRequest(p)
            | Pdu::SetRequest(p)
            | Pdu::Response(p)
            | Pdu::Trap(p)
            | Pdu::InformRequest(p)
            | Pdu::Report(p) => p.request_id,
        }
    }

    /// The varbind list shared by every PDU variant.
    pub fn varbinds(&self) -> &[VarBind] {
        match self {
            Pdu::GetBulkRequest(p) => &p.varbinds,
            Pdu::GetRequest(p)
            | Pdu::GetNextRequest(p)
            | Pdu::SetRequest(p)
            | Pdu::Response(p)
            | Pdu::Trap(p)
            | Pdu::InformRequest(p)
            | Pdu::Report(p) => &p.varbinds,
        }
    }

    /// Whether this PDU type expects a Response (RFC 3411's "Confirmed"
    /// class): everything except Response/Report/Trap.
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self,
            Pdu::GetRequest(_)
                | Pdu::GetNextRequest(_)
                | Pdu::GetBulkRequest(_)
                | Pdu::SetRequest(_)
                | Pdu::InformRequest(_)
        )
    }

    /// Whether this PDU is generated internally by the engine itself
    /// (a Report), exempt from the usual security-level matching check
    /// applied to genuine responses.
    pub fn is_internal(&self) -> bool {
        matches!(self, Pdu::Report(_))
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        let tag = self.tag();
        buf.push_constructed(tag, |buf| match self {
            Pdu::GetBulkRequest(p) => p.encode_body(buf),
            Pdu::GetRequest(p)
            | Pdu::GetNextRequest(p)
            | Pdu::SetRequest(p)
            | Pdu::Response(p)
            | Pdu::Trap(p)
            | Pdu::InformRequest(p)
            | Pdu::Report(p) => p.encode_body(buf),
        });
    }

    /// Decode from BER, dispatching on the leading application tag.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let (observed_tag, mut body) = decoder.read_any_constructed()?;
        match observed_tag {
            tag::pdu::GET_REQUEST => Ok(Pdu::GetRequest(RequestPdu::decode_body(&mut body)?)),
            tag::pdu::GET_NEXT_REQUEST => {
                Ok(Pdu::GetNextRequest(RequestPdu::decode_body(&mut body)?))
            }
            tag::pdu::GET_BULK_REQUEST => Ok(Pdu::GetBulkRequest(BulkPdu::decode_body(&mut body)?)),
            tag::pdu::SET_REQUEST => Ok(Pdu::SetRequest(RequestPdu::decode_body(&mut body)?)),
            tag::pdu::RESPONSE => Ok(Pdu::Response(RequestPdu::decode_body(&mut body)?)),
            tag::pdu::TRAP_V2 => Ok(Pdu::Trap(RequestPdu::decode_body(&mut body)?)),
            tag::pdu::INFORM_REQUEST => Ok(Pdu::InformRequest(RequestPdu::decode_body(&mut body)?)),
            tag::pdu::REPORT => Ok(Pdu::Report(RequestPdu::decode_body(&mut body)?)),
            other => Err(Error::decode_internal(
                decoder.position(),
                Kind::UnknownPduType(other),
            )),
        }
    }
}
