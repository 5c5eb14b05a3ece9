//! SNMPv3 message processing and the User-based Security Model (USM).
//!
//! This crate implements the wire format and security machinery of SNMPv3:
//! BER/DER encoding ([`ber`]), PDU types ([`pdu`], [`value`], [`varbind`]),
//! object identifiers ([`oid`]), message framing and the request/response
//! cache ([`v3`]), and the abstract security-module interface ([`security`])
//! with USM ([`v3::UsmSecurityModule`]) as its concrete implementation.
//!
//! It does not open sockets. Callers provide their own transport behind the
//! [`transport::Transport`]/[`transport::Listener`] traits and feed received
//! datagrams to [`v3::MessageProcessor::process_incoming_message`].
//!
//! See [`prelude`] for the commonly-used set of re-exports.

pub mod ber;
pub mod error;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod security;
pub mod transport;
mod util;
pub mod v3;
pub mod value;
pub mod varbind;
pub mod version;

pub use error::{Error, Result};
pub use oid::Oid;
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
