//! Prelude module for convenient imports.
//!
//! This module provides a convenient set of commonly-used types and traits
//! for working with this library.
//!
//! # Usage
//!
//! ```rust,no_run
//! use snmp3_core::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Oid`], [`Value`], [`VarBind`], [`Pdu`]
//! - Error handling: [`Error`], [`Result`]
//! - Security types: [`SecurityLevel`], [`SecurityModel`], [`SecurityModule`]
//! - V3 protocols: [`AuthProtocol`], [`PrivProtocol`]
//! - V3 message processing: [`MessageProcessor`], [`RequestHandle`], [`UsmSecurityModule`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::pdu::Pdu;
pub use crate::security::{SecurityLevel, SecurityModel, SecurityModule};
pub use crate::v3::{
    AuthProtocol, MessageProcessor, PrivProtocol, RequestHandle, UsmSecurityModule,
};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
