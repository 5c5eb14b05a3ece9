//! USM privacy protocols: DES-CBC (RFC 3414 §8.3) and AES-128-CFB (RFC 3826).
//!
//! Both share the same external shape: `encrypt` produces ciphertext plus
//! an 8-byte salt to carry in `msgPrivacyParameters`; `decrypt` consumes
//! that salt back into the IV. The salt's *contents* differ per protocol.

use aes::Aes128;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit as CfbKeyIvInit};
use des::Des;
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit as CbcKeyIvInit};

use crate::error::CryptoErrorKind;
use crate::v3::PrivProtocol;

const DES_BLOCK_LEN: usize = 8;
const DES_SALT_LEN: usize = 4;
const AES_SALT_LEN: usize = 8;

/// Errors specific to privacy-protocol key handling and (de)cryption,
/// independent of the crate's public [`crate::error::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivacyError {
    InvalidKeyLength { expected: usize, actual: usize },
    InvalidCiphertextLength { length: usize, block_size: usize },
    InvalidSaltLength { expected: usize, actual: usize },
    UnsupportedProtocol(PrivProtocol),
}

pub type PrivacyResult<T> = std::result::Result<T, PrivacyError>;

impl PrivacyError {
    /// Map to the public crate's crypto error taxonomy.
    pub fn to_crypto_kind(&self) -> CryptoErrorKind {
        match self {
            Self::InvalidKeyLength { .. } => CryptoErrorKind::InvalidKeyLength,
            Self::InvalidCiphertextLength { length, block_size } => {
                CryptoErrorKind::InvalidCiphertextLength {
                    length: *length,
                    block_size: *block_size,
                }
            }
            Self::InvalidSaltLength { expected, actual } => CryptoErrorKind::InvalidPrivParamsLength {
                expected: *expected,
                actual: *actual,
            },
            Self::UnsupportedProtocol(_) => CryptoErrorKind::UnsupportedProtocol,
        }
    }
}

impl std::fmt::Display for PrivacyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeyLength { expected, actual } => {
                write!(f, "privacy key must be at least {} bytes, got {}", expected, actual)
            }
            Self::InvalidCiphertextLength { length, block_size } => {
                write!(f, "ciphertext length {} not a multiple of block size {}", length, block_size)
            }
            Self::InvalidSaltLength { expected, actual } => {
                write!(f, "salt must be {} bytes, got {}", expected, actual)
            }
            Self::UnsupportedProtocol(p) => write!(f, "privacy protocol {} not implemented", p),
        }
    }
}

impl std::error::Error for PrivacyError {}

/// A monotone, wrapping per-user salt counter, seeded from randomness so
/// concurrent engines restarting don't reuse a peer's salt sequence.
///
/// Held as a full 64 bits internally; DES only consumes the low 32 (its
/// salt is `engineBoots ‖ counter`, 4 bytes each), AES consumes all 8 as
/// the salt outright (RFC 3826 §3.1.2.1: "Salt is 8 bytes from the local
/// counter").
#[derive(Debug, Clone, Copy)]
pub struct SaltCounter(u64);

impl SaltCounter {
    /// Seed from the system RNG.
    pub fn new_random() -> Self {
        let mut buf = [0u8; 8];
        getrandom::fill(&mut buf).expect("system RNG unavailable");
        Self(u64::from_be_bytes(buf))
    }

    /// Construct from an explicit seed (mainly for deterministic tests).
    pub fn from_seed(seed: u64) -> Self {
        Self(seed)
    }

    /// Advance and return the new value truncated to 32 bits, for DES's
    /// 4-byte counter half.
    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_add(1);
        self.0 as u32
    }

    /// Advance and return the new value, for AES's full 8-byte salt.
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    pub fn current(self) -> u64 {
        self.0
    }
}

/// A privacy key localized to one user, ready to encrypt/decrypt scopedPDU
/// payloads.
pub enum PrivKey {
    /// DES-CBC: 8-byte key, 8-byte pre-IV, both taken from a 16-byte
    /// localized key.
    Des {
        key: [u8; 8],
        pre_iv: [u8; 8],
        salt: SaltCounter,
    },
    /// AES-128-CFB: 16-byte key.
    Aes128 { key: [u8; 16], salt: SaltCounter },
    /// A protocol this crate does not implement encryption for.
    Unsupported(PrivProtocol),
}

impl PrivKey {
    /// Slice a localized key (RFC 3414 key-localization output, or its
    /// Blumenthal/Reeder extension) into protocol-specific key material.
    pub fn from_localized(protocol: PrivProtocol, key_material: &[u8]) -> PrivacyResult<Self> {
        let other = match protocol {
            PrivProtocol::Des | PrivProtocol::Aes128 => None,
            other => Some(other),
        };
        if let Some(other) = other {
            return Ok(Self::Unsupported(other));
        }

        let needed = protocol.key_len();
        if key_material.len() < needed {
            return Err(PrivacyError::InvalidKeyLength {
                expected: needed,
                actual: key_material.len(),
            });
        }
        match protocol {
            PrivProtocol::Des => Ok(Self::Des {
                key: key_material[..8].try_into().unwrap(),
                pre_iv: key_material[8..16].try_into().unwrap(),
                salt: SaltCounter::new_random(),
            }),
            PrivProtocol::Aes128 => Ok(Self::Aes128 {
                key: key_material[..16].try_into().unwrap(),
                salt: SaltCounter::new_random(),
            }),
            PrivProtocol::Des3 | PrivProtocol::Aes192 | PrivProtocol::Aes256 => unreachable!(),
        }
    }

    pub fn protocol(&self) -> PrivProtocol {
        match self {
            Self::Des { .. } => PrivProtocol::Des,
            Self::Aes128 { .. } => PrivProtocol::Aes128,
            Self::Unsupported(p) => *p,
        }
    }

    /// Encrypt a scopedPDU payload, advancing the salt counter and
    /// returning `(ciphertext, salt)`.
    pub fn encrypt(&mut self, plaintext: &[u8], engine_boots: u32, engine_time: u32) -> PrivacyResult<(Vec<u8>, Vec<u8>)> {
        match self {
            Self::Des { key, pre_iv, salt } => {
                let counter = salt.next_u32();
                let mut salt_bytes = [0u8; DES_BLOCK_LEN];
                salt_bytes[..4].copy_from_slice(&engine_boots.to_be_bytes());
                salt_bytes[4..].copy_from_slice(&counter.to_be_bytes());
                let iv = xor_iv(pre_iv, &salt_bytes);

                let padded_len = plaintext.len().div_ceil(DES_BLOCK_LEN) * DES_BLOCK_LEN;
                let mut buf = vec![0u8; padded_len];
                buf[..plaintext.len()].copy_from_slice(plaintext);

                let ct = cbc::Encryptor::<Des>::new(key.into(), (&iv).into())
                    .encrypt_padded_mut::<NoPadding>(&mut buf, plaintext.len())
                    .expect("buffer sized to a multiple of the block size");
                Ok((ct.to_vec(), salt_bytes.to_vec()))
            }
            Self::Aes128 { key, salt } => {
                let counter = salt.next_u64();
                let salt_bytes = counter.to_be_bytes();
                let iv = pack_aes_iv(engine_boots, engine_time, &salt_bytes);

                let mut buf = plaintext.to_vec();
                cfb_mode::Encryptor::<Aes128>::new(key.into(), (&iv).into()).encrypt(&mut buf);
                Ok((buf, salt_bytes.to_vec()))
            }
            Self::Unsupported(p) => Err(PrivacyError::UnsupportedProtocol(*p)),
        }
    }

    /// Decrypt a scopedPDU payload using the carried salt.
    pub fn decrypt(&self, ciphertext: &[u8], engine_boots: u32, engine_time: u32, salt: &[u8]) -> PrivacyResult<Vec<u8>> {
        match self {
            Self::Des { key, pre_iv, .. } => {
                if salt.len() != DES_BLOCK_LEN {
                    return Err(PrivacyError::InvalidSaltLength {
                        expected: DES_BLOCK_LEN,
                        actual: salt.len(),
                    });
                }
                if !ciphertext.len().is_multiple_of(DES_BLOCK_LEN) || ciphertext.is_empty() {
                    return Err(PrivacyError::InvalidCiphertextLength {
                        length: ciphertext.len(),
                        block_size: DES_BLOCK_LEN,
                    });
                }
                let _ = DES_SALT_LEN; // salt composition documented, not re-split on decrypt
                let iv = xor_iv(pre_iv, salt);
                let mut buf = ciphertext.to_vec();
                cbc::Decryptor::<Des>::new(key.into(), (&iv).into())
                    .decrypt_padded_mut::<NoPadding>(&mut buf)
                    .map_err(|_| PrivacyError::InvalidCiphertextLength {
                        length: ciphertext.len(),
                        block_size: DES_BLOCK_LEN,
                    })?;
                Ok(buf)
            }
            Self::Aes128 { key, .. } => {
                if salt.len() != AES_SALT_LEN {
                    return Err(PrivacyError::InvalidSaltLength {
                        expected: AES_SALT_LEN,
                        actual: salt.len(),
                    });
                }
                let iv = pack_aes_iv(engine_boots, engine_time, salt);
                let mut buf = ciphertext.to_vec();
                cfb_mode::Decryptor::<Aes128>::new(key.into(), (&iv).into()).decrypt(&mut buf);
                Ok(buf)
            }
            Self::Unsupported(p) => Err(PrivacyError::UnsupportedProtocol(*p)),
        }
    }
}

fn xor_iv(pre_iv: &[u8; 8], salt: &[u8]) -> [u8; 8] {
    let mut iv = *pre_iv;
    for (b, s) in iv.iter_mut().zip(salt) {
        *b ^= s;
    }
    iv
}

fn pack_aes_iv(engine_boots: u32, engine_time: u32, salt: &[u8]) -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[..4].copy_from_slice(&engine_boots.to_be_bytes());
    iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
    iv[8..].copy_from_slice(salt);
    iv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_des_roundtrip() {
        let key_material = [0x11u8; 16];
        let mut priv_key = PrivKey::from_localized(PrivProtocol::Des, &key_material).unwrap();
        let plaintext = b"a scoped PDU payload..."; // not block-aligned on purpose
        let (ciphertext, salt) = priv_key.encrypt(plaintext, 1, 0).unwrap();
        let decrypted = priv_key.decrypt(&ciphertext, 1, 0, &salt).unwrap();
        assert_eq!(&decrypted[..plaintext.len()], plaintext);
        assert!(decrypted[plaintext.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_aes128_roundtrip() {
        let key_material = [0x22u8; 16];
        let mut priv_key = PrivKey::from_localized(PrivProtocol::Aes128, &key_material).unwrap();
        let plaintext = b"another scoped PDU";
        let (ciphertext, salt) = priv_key.encrypt(plaintext, 5, 1000).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());
        let decrypted = priv_key.decrypt(&ciphertext, 5, 1000, &salt).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_salt_counter_advances_and_wraps() {
        let mut counter = SaltCounter::from_seed(u64::MAX);
        assert_eq!(counter.next_u64(), 0);
        assert_eq!(counter.next_u64(), 1);
    }

    #[test]
    fn test_salt_counter_u32_half_wraps_independently() {
        let mut counter = SaltCounter::from_seed(u32::MAX as u64);
        assert_eq!(counter.next_u32(), 0);
        assert_eq!(counter.next_u32(), 1);
    }

    #[test]
    fn test_des_rejects_short_key() {
        assert!(PrivKey::from_localized(PrivProtocol::Des, &[0u8; 4]).is_err());
    }

    #[test]
    fn test_des_rejects_non_block_aligned_ciphertext() {
        let priv_key = PrivKey::from_localized(PrivProtocol::Des, &[0x33u8; 16]).unwrap();
        let err = priv_key.decrypt(&[0u8; 5], 1, 0, &[0u8; 8]).unwrap_err();
        assert!(matches!(err, PrivacyError::InvalidCiphertextLength { .. }));
    }

    #[test]
    fn test_unsupported_protocol_reports_error() {
        let mut priv_key = PrivKey::from_localized(PrivProtocol::Aes256, &[0u8; 32]).unwrap();
        assert!(priv_key.encrypt(b"x", 0, 0).is_err());
    }
}
