//! User-based Security Model (RFC 3414): the wire sub-message, the user
//! directory, and the [`SecurityModule`] implementation that ties key
//! localization, authentication, privacy, and engine bookkeeping together.

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::{Bytes, BytesMut};

use crate::ber::{Decoder, EncodeBuf};
use crate::error::internal::DecodeErrorKind as Kind;
use crate::error::{AuthErrorKind, CryptoErrorKind, Error, Result};
use crate::security::{SecureData, SecurityLevel, SecurityModel, SecurityModule};
use crate::v3::auth::{LocalizedKey, MasterKey};
use crate::v3::engine::EngineCache;
use crate::v3::privacy::PrivKey;
use crate::v3::{AuthProtocol, PrivProtocol};

/// `UsmSecurityParameters`, RFC 3414 §2.4: a BER SEQUENCE carried inside the
/// message's `msgSecurityParameters` OCTET STRING.
#[derive(Debug, Clone, PartialEq)]
pub struct UsmSecurityParams {
    pub authoritative_engine_id: Bytes,
    pub authoritative_engine_boots: i32,
    pub authoritative_engine_time: i32,
    pub user_name: Bytes,
    /// Zero-filled placeholder at signing time; `authProtocol.mac_len()`
    /// bytes on the wire once signed.
    pub auth_parameters: Bytes,
    /// The encryption salt; empty when privacy is not in effect.
    pub priv_parameters: Bytes,
}

impl UsmSecurityParams {
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_octet_string(&self.priv_parameters);
            buf.push_octet_string(&self.auth_parameters);
            buf.push_octet_string(&self.user_name);
            buf.push_integer(self.authoritative_engine_time);
            buf.push_integer(self.authoritative_engine_boots);
            buf.push_octet_string(&self.authoritative_engine_id);
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let authoritative_engine_id = seq.read_octet_string()?;
        let authoritative_engine_boots = seq.read_integer()?;
        if authoritative_engine_boots < 0 {
            return Err(Error::decode_internal(
                seq.position(),
                Kind::InvalidEngineBoots {
                    value: authoritative_engine_boots,
                },
            ));
        }
        let authoritative_engine_time = seq.read_integer()?;
        if authoritative_engine_time < 0 {
            return Err(Error::decode_internal(
                seq.position(),
                Kind::InvalidEngineTime {
                    value: authoritative_engine_time,
                },
            ));
        }
        let user_name = seq.read_octet_string()?;
        let auth_parameters = seq.read_octet_string()?;
        let priv_parameters = seq.read_octet_string()?;
        Ok(Self {
            authoritative_engine_id,
            authoritative_engine_boots,
            authoritative_engine_time,
            user_name,
            auth_parameters,
            priv_parameters,
        })
    }

    /// Encode to a standalone byte string, as stored in the enclosing
    /// message's `msgSecurityParameters` OCTET STRING.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }
}

/// One provisioned USM user, localized to a single authoritative engine.
///
/// RFC 3414 keys every user by `(engineID, userName)`; a user configured for
/// several engines gets one `UsmUser` per engine, each with its own
/// localized keys and (for privacy) its own salt counter.
pub struct UsmUser {
    pub security_name: Bytes,
    auth: Option<LocalizedKey>,
    priv_key: Option<Mutex<PrivKey>>,
}

impl UsmUser {
    /// Build a user entry, localizing auth/priv secrets to `engine_id`.
    ///
    /// `priv_` is only meaningful alongside `auth` (RFC 3414: privacy
    /// implies authentication); the priv key material is derived with the
    /// same password-to-key/localize procedure as the auth key, just run
    /// over `priv_secret` (RFC 3414 §2.6).
    pub fn new(
        security_name: impl Into<Bytes>,
        engine_id: &[u8],
        auth: Option<(AuthProtocol, &[u8])>,
        priv_: Option<(PrivProtocol, &[u8])>,
    ) -> std::result::Result<Self, crate::v3::privacy::PrivacyError> {
        let localized_auth = auth.map(|(protocol, secret)| MasterKey::from_password(protocol, secret).localize(engine_id));

        let priv_key = match (&localized_auth, priv_) {
            (Some(localized_auth), Some((priv_protocol, priv_secret))) => {
                let localized_priv = MasterKey::from_password(localized_auth.protocol(), priv_secret).localize(engine_id);
                Some(Mutex::new(PrivKey::from_localized(priv_protocol, localized_priv.as_bytes())?))
            }
            _ => None,
        };

        Ok(Self {
            security_name: security_name.into(),
            auth: localized_auth,
            priv_key,
        })
    }

    /// The level this user is provisioned to operate at.
    pub fn security_level(&self) -> SecurityLevel {
        match (&self.auth, &self.priv_key) {
            (Some(_), Some(_)) => SecurityLevel::AUTH_PRIV,
            (Some(_), None) => SecurityLevel::AUTH_NO_PRIV,
            (None, _) => SecurityLevel::NO_AUTH_NO_PRIV,
        }
    }
}

impl std::fmt::Debug for UsmUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsmUser")
            .field("security_name", &self.security_name)
            .field("security_level", &self.security_level())
            .finish_non_exhaustive()
    }
}

/// The `(engineID, userName)` directory consulted by [`UsmSecurityModule`].
#[derive(Debug, Default)]
pub struct UsmUserTable {
    users: HashMap<(Bytes, Bytes), UsmUser>,
}

impl UsmUserTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a user for `engine_id`, localizing its keys immediately.
    #[allow(clippy::too_many_arguments)]
    pub fn add_user(
        &mut self,
        engine_id: impl Into<Bytes>,
        user_name: impl Into<Bytes>,
        auth: Option<(AuthProtocol, &[u8])>,
        priv_: Option<(PrivProtocol, &[u8])>,
    ) -> Result<()> {
        let engine_id = engine_id.into();
        let user_name = user_name.into();
        let user = UsmUser::new(user_name.clone(), &engine_id, auth, priv_)
            .map_err(|e| Error::encrypt(None, e.to_crypto_kind()))?;
        self.users.insert((engine_id, user_name), user);
        Ok(())
    }

    pub fn get(&self, engine_id: &[u8], user_name: &[u8]) -> Option<&UsmUser> {
        self.users.get(&(Bytes::copy_from_slice(engine_id), Bytes::copy_from_slice(user_name)))
    }
}

/// RFC 3414's User-based Security Model, the sole [`SecurityModule`]
/// implementation in this crate.
pub struct UsmSecurityModule {
    users: Mutex<UsmUserTable>,
    engines: Mutex<EngineCache>,
    local_engine_id: Bytes,
}

impl UsmSecurityModule {
    pub fn new(local_engine_id: impl Into<Bytes>) -> Self {
        Self {
            users: Mutex::new(UsmUserTable::new()),
            engines: Mutex::new(EngineCache::new()),
            local_engine_id: local_engine_id.into(),
        }
    }

    pub fn add_user(
        &self,
        engine_id: impl Into<Bytes>,
        user_name: impl Into<Bytes>,
        auth: Option<(AuthProtocol, &[u8])>,
        priv_: Option<(PrivProtocol, &[u8])>,
    ) -> Result<()> {
        self.users.lock().unwrap().add_user(engine_id, user_name, auth, priv_)
    }

    pub fn engines(&self) -> &Mutex<EngineCache> {
        &self.engines
    }

    pub fn local_engine_id(&self) -> &[u8] {
        &self.local_engine_id
    }
}

impl SecurityModule for UsmSecurityModule {
    fn model(&self) -> SecurityModel {
        SecurityModel::Usm
    }

    fn process_incoming(
        &self,
        whole_message: &[u8],
        security_parameters: &[u8],
        data: &[u8],
        requested_level: SecurityLevel,
    ) -> Result<SecureData> {
        let mut decoder = Decoder::new(Bytes::copy_from_slice(security_parameters));
        let params = UsmSecurityParams::decode(&mut decoder)?;

        let users = self.users.lock().unwrap();
        let user = users
            .get(&params.authoritative_engine_id, &params.user_name)
            .ok_or_else(|| Error::auth(None, AuthErrorKind::NoUser))?;

        if requested_level > user.security_level() {
            return Err(Error::UnsupportedSecLevel);
        }

        if requested_level.auth() {
            let auth_key = user.auth.as_ref().ok_or_else(|| Error::auth(None, AuthErrorKind::NoAuthKey))?;
            let expected_len = auth_key.protocol().mac_len();
            if params.auth_parameters.len() != expected_len {
                return Err(Error::auth(
                    None,
                    AuthErrorKind::WrongMacLength {
                        expected: expected_len,
                        actual: params.auth_parameters.len(),
                    },
                ));
            }
            let zeroed = zero_auth_parameters(whole_message, &params.auth_parameters)
                .ok_or_else(|| Error::auth(None, AuthErrorKind::AuthParamsNotFound))?;
            auth_key.verify(&zeroed, &params.auth_parameters)?;

            let mut engines = self.engines.lock().unwrap();
            match engines.get(&params.authoritative_engine_id) {
                Some(state) => {
                    if !state.is_in_time_window(params.authoritative_engine_boots, params.authoritative_engine_time) {
                        return Err(Error::NotInTimeWindow { target: None });
                    }
                }
                None => {
                    engines.record(
                        params.authoritative_engine_id.clone(),
                        params.authoritative_engine_boots,
                        params.authoritative_engine_time,
                    );
                }
            }
        }

        let plaintext = if requested_level.priv_() {
            let priv_key = user.priv_key.as_ref().ok_or_else(|| Error::decrypt(None, CryptoErrorKind::NoPrivKey))?;
            let priv_key = priv_key.lock().unwrap();
            priv_key
                .decrypt(
                    data,
                    params.authoritative_engine_boots,
                    params.authoritative_engine_time,
                    &params.priv_parameters,
                )
                .map_err(|e| Error::decrypt(None, e.to_crypto_kind()))?
        } else {
            data.to_vec()
        };

        Ok(SecureData {
            security_engine_id: params.authoritative_engine_id,
            security_name: user.security_name.clone(),
            security_level: requested_level,
            data: Bytes::from(plaintext),
        })
    }

    fn prepare_outgoing(
        &self,
        engine_id: &[u8],
        security_name: &[u8],
        security_level: SecurityLevel,
        data: &[u8],
    ) -> Result<(Bytes, Bytes)> {
        let users = self.users.lock().unwrap();
        let user = users
            .get(engine_id, security_name)
            .ok_or_else(|| Error::auth(None, AuthErrorKind::NoUser))?;

        if security_level > user.security_level() {
            return Err(Error::UnsupportedSecLevel);
        }

        let (engine_boots, engine_time) = match self.engines.lock().unwrap().get(engine_id) {
            Some(state) => (state.engine_boots, state.estimated_engine_time()),
            None => (0, 0),
        };

        let (payload, priv_parameters) = if security_level.priv_() {
            let priv_key = user.priv_key.as_ref().ok_or_else(|| Error::encrypt(None, CryptoErrorKind::NoPrivKey))?;
            let (ciphertext, salt) = priv_key
                .lock()
                .unwrap()
                .encrypt(data, engine_boots, engine_time)
                .map_err(|e| Error::encrypt(None, e.to_crypto_kind()))?;
            (Bytes::from(ciphertext), Bytes::from(salt))
        } else {
            (Bytes::copy_from_slice(data), Bytes::new())
        };

        let auth_len = user.auth.as_ref().map(|k| k.protocol().mac_len()).unwrap_or(0);
        let params = UsmSecurityParams {
            authoritative_engine_id: Bytes::copy_from_slice(engine_id),
            authoritative_engine_boots: engine_boots,
            authoritative_engine_time: engine_time,
            user_name: Bytes::copy_from_slice(security_name),
            auth_parameters: Bytes::from(vec![0u8; auth_len]),
            priv_parameters,
        };

        Ok((params.to_bytes(), payload))
    }
}

/// Zero out the `msgAuthenticationParameters` bytes inside a fully
/// serialized message, as required before recomputing the HMAC (RFC 3414
/// §6.3.1 step 2). Locates the parameters by their (unique, non-empty)
/// byte content; returns `None` if the slice can't be found.
fn zero_auth_parameters(whole_message: &[u8], auth_parameters: &[u8]) -> Option<Vec<u8>> {
    if auth_parameters.is_empty() {
        return Some(whole_message.to_vec());
    }
    let pos = whole_message
        .windows(auth_parameters.len())
        .position(|window| window == auth_parameters)?;
    let mut out = BytesMut::from(whole_message);
    out[pos..pos + auth_parameters.len()].fill(0);
    Some(out.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_params_roundtrip() {
        let params = UsmSecurityParams {
            authoritative_engine_id: Bytes::from_static(b"engine-id"),
            authoritative_engine_boots: 3,
            authoritative_engine_time: 12345,
            user_name: Bytes::from_static(b"alice"),
            auth_parameters: Bytes::from(vec![0u8; 12]),
            priv_parameters: Bytes::from_static(b"salt1234"),
        };
        let bytes = params.to_bytes();
        let mut decoder = Decoder::new(bytes);
        let decoded = UsmSecurityParams::decode(&mut decoder).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_decode_rejects_negative_engine_boots() {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_octet_string(b"");
            buf.push_octet_string(b"");
            buf.push_octet_string(b"");
            buf.push_integer(0);
            buf.push_integer(-1);
            buf.push_octet_string(b"engine");
        });
        let bytes = buf.finish();
        let mut decoder = Decoder::new(bytes);
        assert!(UsmSecurityParams::decode(&mut decoder).is_err());
    }

    #[test]
    fn test_usm_user_no_auth_no_priv() {
        let user = UsmUser::new("alice", b"engine", None, None).unwrap();
        assert_eq!(user.security_level(), SecurityLevel::NO_AUTH_NO_PRIV);
    }

    #[test]
    fn test_usm_user_auth_no_priv() {
        let user = UsmUser::new("alice", b"engine", Some((AuthProtocol::Sha256, b"secret")), None).unwrap();
        assert_eq!(user.security_level(), SecurityLevel::AUTH_NO_PRIV);
    }

    #[test]
    fn test_usm_user_auth_priv() {
        let user = UsmUser::new(
            "alice",
            b"engine",
            Some((AuthProtocol::Sha1, b"authsecret")),
            Some((PrivProtocol::Aes128, b"privsecret")),
        )
        .unwrap();
        assert_eq!(user.security_level(), SecurityLevel::AUTH_PRIV);
    }

    #[test]
    fn test_usm_module_prepare_and_process_roundtrip_noauth() {
        let module = UsmSecurityModule::new(b"local-engine".to_vec());
        module.add_user(b"local-engine".to_vec(), "alice", None, None).unwrap();

        let (sec_params, payload) = module
            .prepare_outgoing(b"local-engine", b"alice", SecurityLevel::NO_AUTH_NO_PRIV, b"hello")
            .unwrap();

        let secure = module
            .process_incoming(b"whole-message-unused", &sec_params, &payload, SecurityLevel::NO_AUTH_NO_PRIV)
            .unwrap();
        assert_eq!(&secure.data[..], b"hello");
        assert_eq!(secure.security_name, Bytes::from_static(b"alice"));
    }

    #[test]
    fn test_usm_module_rejects_unknown_user() {
        let module = UsmSecurityModule::new(b"local-engine".to_vec());
        let (sec_params, _) = {
            module.add_user(b"local-engine".to_vec(), "alice", None, None).unwrap();
            module
                .prepare_outgoing(b"local-engine", b"alice", SecurityLevel::NO_AUTH_NO_PRIV, b"x")
                .unwrap()
        };
        let module2 = UsmSecurityModule::new(b"local-engine".to_vec());
        let err = module2.process_incoming(b"", &sec_params, b"x", SecurityLevel::NO_AUTH_NO_PRIV);
        assert!(err.is_err());
    }

    #[test]
    fn test_usm_module_rejects_unprovisioned_level() {
        let module = UsmSecurityModule::new(b"local-engine".to_vec());
        module.add_user(b"local-engine".to_vec(), "alice", None, None).unwrap();
        let err = module.prepare_outgoing(b"local-engine", b"alice", SecurityLevel::AUTH_PRIV, b"x");
        assert!(matches!(err, Err(Error::UnsupportedSecLevel)));
    }
}
