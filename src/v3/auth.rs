//! USM key localization and HMAC authentication (RFC 3414 §A.2, RFC 7860).
//!
//! Two steps turn a human passphrase into a per-engine authentication key:
//! `password_to_key` stretches the password over a 1 MiB buffer and hashes
//! it (`Ku`), then `localize` folds in the authoritative engine's ID
//! (`Kul = H(Ku || engineID || Ku)`). The same algorithm, run over the
//! privacy passphrase, produces the key material for the privacy protocol
//! (RFC 3414 §2.6).

use digest::Digest;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{AuthErrorKind, Error, Result};
use crate::v3::AuthProtocol;

/// RFC 3414 §A.2's password expansion length: password repeated cyclically
/// to fill exactly 1,048,576 bytes before hashing.
const PASSWORD_BUFFER_LEN: usize = 1_048_576;

fn password_to_key_generic<D: Digest>(password: &[u8]) -> Vec<u8> {
    let mut hasher = D::new();
    if password.is_empty() {
        // Degenerate case (empty secret): the cycling buffer is all zeros.
        let zeros = [0u8; 64];
        let mut produced = 0;
        while produced < PASSWORD_BUFFER_LEN {
            hasher.update(zeros);
            produced += zeros.len();
        }
        return hasher.finalize().to_vec();
    }

    let mut chunk = [0u8; 64];
    let mut cursor = 0usize;
    let mut produced = 0usize;
    while produced < PASSWORD_BUFFER_LEN {
        for b in chunk.iter_mut() {
            *b = password[cursor % password.len()];
            cursor += 1;
        }
        hasher.update(chunk);
        produced += chunk.len();
    }
    hasher.finalize().to_vec()
}

fn localize_generic<D: Digest>(ku: &[u8], engine_id: &[u8]) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(ku);
    hasher.update(engine_id);
    hasher.update(ku);
    hasher.finalize().to_vec()
}

fn hmac_generic<D>(key: &[u8], message: &[u8]) -> Vec<u8>
where
    D: Digest,
    Hmac<D>: Mac,
{
    let mut mac = <Hmac<D> as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    Mac::update(&mut mac, message);
    mac.finalize().into_bytes().to_vec()
}

fn password_to_key(protocol: AuthProtocol, password: &[u8]) -> Vec<u8> {
    match protocol {
        AuthProtocol::Md5 => password_to_key_generic::<Md5>(password),
        AuthProtocol::Sha1 => password_to_key_generic::<Sha1>(password),
        AuthProtocol::Sha224 => password_to_key_generic::<Sha224>(password),
        AuthProtocol::Sha256 => password_to_key_generic::<Sha256>(password),
        AuthProtocol::Sha384 => password_to_key_generic::<Sha384>(password),
        AuthProtocol::Sha512 => password_to_key_generic::<Sha512>(password),
    }
}

fn localize(protocol: AuthProtocol, ku: &[u8], engine_id: &[u8]) -> Vec<u8> {
    match protocol {
        AuthProtocol::Md5 => localize_generic::<Md5>(ku, engine_id),
        AuthProtocol::Sha1 => localize_generic::<Sha1>(ku, engine_id),
        AuthProtocol::Sha224 => localize_generic::<Sha224>(ku, engine_id),
        AuthProtocol::Sha256 => localize_generic::<Sha256>(ku, engine_id),
        AuthProtocol::Sha384 => localize_generic::<Sha384>(ku, engine_id),
        AuthProtocol::Sha512 => localize_generic::<Sha512>(ku, engine_id),
    }
}

fn hmac(protocol: AuthProtocol, key: &[u8], message: &[u8]) -> Vec<u8> {
    match protocol {
        AuthProtocol::Md5 => hmac_generic::<Md5>(key, message),
        AuthProtocol::Sha1 => hmac_generic::<Sha1>(key, message),
        AuthProtocol::Sha224 => hmac_generic::<Sha224>(key, message),
        AuthProtocol::Sha256 => hmac_generic::<Sha256>(key, message),
        AuthProtocol::Sha384 => hmac_generic::<Sha384>(key, message),
        AuthProtocol::Sha512 => hmac_generic::<Sha512>(key, message),
    }
}

/// A passphrase-derived key (`Ku`) not yet localized to a particular engine.
///
/// Holding the un-localized master key lets a single configured user
/// authenticate to multiple engines (each localization is cheap and
/// produces a distinct [`LocalizedKey`]).
pub struct MasterKey {
    protocol: AuthProtocol,
    key: Zeroizing<Vec<u8>>,
}

impl MasterKey {
    /// Derive `Ku` from a passphrase (RFC 3414 §A.2.1).
    pub fn from_password(protocol: AuthProtocol, password: &[u8]) -> Self {
        Self {
            protocol,
            key: Zeroizing::new(password_to_key(protocol, password)),
        }
    }

    /// Wrap an already-derived `Ku` (e.g. loaded from a key file rather than
    /// a human passphrase).
    pub fn from_raw_key(protocol: AuthProtocol, key: Vec<u8>) -> Self {
        Self {
            protocol,
            key: Zeroizing::new(key),
        }
    }

    /// The hash algorithm this key was derived for.
    pub fn protocol(&self) -> AuthProtocol {
        self.protocol
    }

    /// Fold in an authoritative engine ID to produce the per-engine key.
    pub fn localize(&self, engine_id: &[u8]) -> LocalizedKey {
        LocalizedKey {
            protocol: self.protocol,
            key: Zeroizing::new(localize(self.protocol, &self.key, engine_id)),
        }
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

/// A pair of master keys (authentication and privacy), as configured for a
/// USM user. RFC 3414 allows distinct authPassword/privPassword, so the two
/// are independent even though both use `authProtocol`'s hash.
#[derive(Debug)]
pub struct MasterKeys {
    pub auth: Option<MasterKey>,
    pub priv_: Option<MasterKey>,
}

impl MasterKeys {
    pub fn new(auth: Option<MasterKey>, priv_: Option<MasterKey>) -> Self {
        Self { auth, priv_ }
    }
}

/// An authentication key localized to one authoritative engine (`Kul`).
pub struct LocalizedKey {
    protocol: AuthProtocol,
    key: Zeroizing<Vec<u8>>,
}

impl LocalizedKey {
    /// Wrap an already-localized key directly (mainly for test vectors).
    pub fn from_bytes(protocol: AuthProtocol, key: Vec<u8>) -> Self {
        Self {
            protocol,
            key: Zeroizing::new(key),
        }
    }

    pub fn protocol(&self) -> AuthProtocol {
        self.protocol
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Compute the truncated HMAC over `message`, returning `mac_len()`
    /// bytes ready to be patched into `msgAuthenticationParameters`.
    ///
    /// The caller is responsible for having zeroed the placeholder bytes in
    /// `message` before calling this (RFC 3414 §6.3.1 step 2).
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let digest = hmac(self.protocol, &self.key, message);
        digest[..self.protocol.mac_len()].to_vec()
    }

    /// Verify a received truncated HMAC in constant time.
    pub fn verify(&self, message: &[u8], received: &[u8]) -> Result<()> {
        let expected = self.sign(message);
        if expected.len() != received.len() || expected.ct_eq(received).unwrap_u8() != 1 {
            return Err(Error::auth(None, AuthErrorKind::HmacMismatch));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LocalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizedKey")
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}
