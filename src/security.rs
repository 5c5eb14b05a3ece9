//! Security abstractions shared by all security models (RFC 3411 §3.2).
//!
//! [`SecurityLevel`] and the [`SecurityModule`] trait are model-agnostic;
//! USM (RFC 3414) is the only [`SecurityModel`] implemented in this crate,
//! in [`crate::v3::usm`].

use bytes::Bytes;

use crate::error::Result;

/// Level of protection applied to a message: authentication and/or privacy.
///
/// Privacy cannot be enabled without authentication, so there are exactly
/// three valid levels: noAuthNoPriv, authNoPriv, authPriv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecurityLevel {
    auth: bool,
    priv_: bool,
}

impl SecurityLevel {
    /// No authentication, no privacy.
    pub const NO_AUTH_NO_PRIV: Self = Self { auth: false, priv_: false };
    /// Authentication, no privacy.
    pub const AUTH_NO_PRIV: Self = Self { auth: true, priv_: false };
    /// Authentication and privacy.
    pub const AUTH_PRIV: Self = Self { auth: true, priv_: true };

    /// Construct a level, rejecting priv-without-auth.
    ///
    /// Returns `None` rather than panicking, since the invalid combination
    /// can arise from untrusted input (decoded msgFlags).
    pub fn new(auth: bool, priv_: bool) -> Option<Self> {
        if priv_ && !auth {
            None
        } else {
            Some(Self { auth, priv_ })
        }
    }

    /// Whether authentication is required.
    pub fn auth(self) -> bool {
        self.auth
    }

    /// Whether privacy is required.
    pub fn priv_(self) -> bool {
        self.priv_
    }
}

impl PartialOrd for SecurityLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// More protection is greater: noAuthNoPriv < authNoPriv < authPriv.
///
/// Not lexicographic on `(auth, priv)` — `(true, false) > (false, false)`
/// but also `(true, true) > (true, false)`, so the three levels form a
/// strict chain rather than the product order of the two booleans.
impl Ord for SecurityLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        if self == other {
            return Ordering::Equal;
        }
        let less = if self.auth {
            other.priv_ && !self.priv_
        } else {
            other.auth
        };
        if less { Ordering::Less } else { Ordering::Greater }
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            if self.auth { "auth" } else { "noAuth" },
            if self.priv_ { "Priv" } else { "NoPriv" }
        )
    }
}

/// Registered security model identifiers (RFC 3411 §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SecurityModel {
    /// User-based Security Model (RFC 3414).
    Usm,
    /// A security model not known to this crate.
    Other(i32),
}

impl SecurityModel {
    /// USM's registered model number.
    pub const USM_ID: i32 = 3;

    /// Construct from the wire-encoded model number.
    pub fn from_i32(value: i32) -> Self {
        match value {
            Self::USM_ID => Self::Usm,
            other => Self::Other(other),
        }
    }

    /// Convert to the wire-encoded model number.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Usm => Self::USM_ID,
            Self::Other(v) => v,
        }
    }
}

/// Identifies the principal (engine, user) a message's security parameters
/// name, independent of which security model produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityParameters {
    /// The authoritative engine's identifier.
    pub security_engine_id: Bytes,
    /// The user/community name within that engine's namespace.
    pub security_name: Bytes,
}

impl SecurityParameters {
    /// Construct from the components decoded off the wire.
    pub fn new(security_engine_id: impl Into<Bytes>, security_name: impl Into<Bytes>) -> Self {
        Self {
            security_engine_id: security_engine_id.into(),
            security_name: security_name.into(),
        }
    }
}

/// Result of successfully unwrapping an incoming message's security layer.
#[derive(Debug, Clone)]
pub struct SecureData {
    /// Who sent it, per the security model's own bookkeeping.
    pub security_engine_id: Bytes,
    /// The user/community name that authenticated (or claimed) the message.
    pub security_name: Bytes,
    /// The level actually achieved (not merely requested).
    pub security_level: SecurityLevel,
    /// The plaintext scopedPDU bytes, decrypted if privacy was in effect.
    pub data: Bytes,
}

/// Per-model security processing: wrapping outgoing messages and unwrapping
/// incoming ones.
///
/// Mirrors RFC 3411's abstract service interface; USM (RFC 3414) is the one
/// implementation in this crate ([`crate::v3::usm::UsmSecurityModule`]).
pub trait SecurityModule {
    /// This model's registered number (e.g. 3 for USM).
    fn model(&self) -> SecurityModel;

    /// Unwrap an incoming message's security parameters and payload.
    ///
    /// `whole_message` is the complete serialized message (needed because
    /// authentication is computed over it), `security_parameters` is the
    /// model-specific OCTET STRING already split out by the caller, and
    /// `data` is the (possibly encrypted) scopedPDU payload.
    fn process_incoming(
        &self,
        whole_message: &[u8],
        security_parameters: &[u8],
        data: &[u8],
        requested_level: SecurityLevel,
    ) -> Result<SecureData>;

    /// Wrap an outgoing message: encrypt `data` if required, compute the
    /// security-parameters OCTET STRING, and return it alongside whatever
    /// authentication placeholder must be patched in after full
    /// serialization (model-specific; USM returns the placeholder offset
    /// via [`crate::v3::usm::UsmSecurityModule::prepare_outgoing`] directly).
    #[allow(clippy::too_many_arguments)]
    fn prepare_outgoing(
        &self,
        engine_id: &[u8],
        security_name: &[u8],
        security_level: SecurityLevel,
        data: &[u8],
    ) -> Result<(Bytes, Bytes)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_level_invalid_combination_rejected() {
        assert!(SecurityLevel::new(false, true).is_none());
    }

    #[test]
    fn test_security_level_valid_combinations() {
        assert!(SecurityLevel::new(false, false).is_some());
        assert!(SecurityLevel::new(true, false).is_some());
        assert!(SecurityLevel::new(true, true).is_some());
    }

    #[test]
    fn test_security_level_ordering() {
        assert!(SecurityLevel::NO_AUTH_NO_PRIV < SecurityLevel::AUTH_NO_PRIV);
        assert!(SecurityLevel::AUTH_NO_PRIV < SecurityLevel::AUTH_PRIV);
        assert!(SecurityLevel::NO_AUTH_NO_PRIV < SecurityLevel::AUTH_PRIV);
        assert_eq!(SecurityLevel::AUTH_NO_PRIV, SecurityLevel::AUTH_NO_PRIV);
    }

    #[test]
    fn test_security_level_display() {
        assert_eq!(SecurityLevel::NO_AUTH_NO_PRIV.to_string(), "noAuthNoPriv");
        assert_eq!(SecurityLevel::AUTH_NO_PRIV.to_string(), "authNoPriv");
        assert_eq!(SecurityLevel::AUTH_PRIV.to_string(), "authPriv");
    }

    #[test]
    fn test_security_model_roundtrip() {
        assert_eq!(SecurityModel::from_i32(3), SecurityModel::Usm);
        assert_eq!(SecurityModel::Usm.as_i32(), 3);
        assert_eq!(SecurityModel::from_i32(7), SecurityModel::Other(7));
    }
}
