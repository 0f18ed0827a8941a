//! HKDF-SHA256 key schedule.
//!
//! Extract compresses input keying material under a salt into a
//! pseudorandom key; expand stretches that key, mixed with an `info` label,
//! to the requested length. Keys that serve different roles MUST be expanded
//! under different `info` labels, otherwise the roles share a key.

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::channel::KEY_SIZE;
use crate::error::CryptoError;

/// SHA-256 output size.
pub const HASH_LEN: usize = 32;

/// Largest output HKDF-SHA256 can produce (RFC 5869: 255 blocks).
pub const MAX_OUTPUT_LEN: usize = 255 * HASH_LEN;

/// Variable-length derived key material. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(Vec<u8>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DerivedKey({} bytes, [REDACTED])", self.0.len())
    }
}

/// A 32-byte symmetric key, the size both AEAD suites take.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl ConstantTimeEq for SymmetricKey {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SymmetricKey {}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// The result of the extract step, ready to be expanded under any number of
/// `info` labels.
pub struct KeySchedule {
    hkdf: Hkdf<Sha256>,
}

impl KeySchedule {
    /// HKDF-Extract(`salt`, `ikm`).
    pub fn extract(salt: &[u8], ikm: &[u8]) -> Self {
        Self {
            hkdf: Hkdf::<Sha256>::new(Some(salt), ikm),
        }
    }

    /// HKDF-Expand under `info` to `output_len` bytes.
    pub fn expand(&self, info: &[u8], output_len: usize) -> Result<DerivedKey, CryptoError> {
        check_output_len(output_len)?;
        let mut okm = DerivedKey(vec![0u8; output_len]);
        self.hkdf
            .expand(info, &mut okm.0)
            .map_err(|_| CryptoError::DerivationLengthExceeded {
                requested: output_len,
                maximum: MAX_OUTPUT_LEN,
            })?;
        trace!(info_len = info.len(), output_len, "Expanded HKDF output");
        Ok(okm)
    }

    /// Expand a single 32-byte key under `info`.
    pub fn expand_key(&self, info: &[u8]) -> Result<SymmetricKey, CryptoError> {
        let mut key = SymmetricKey([0u8; KEY_SIZE]);
        self.hkdf
            .expand(info, &mut key.0)
            .map_err(|_| CryptoError::DerivationLengthExceeded {
                requested: KEY_SIZE,
                maximum: MAX_OUTPUT_LEN,
            })?;
        Ok(key)
    }
}

fn check_output_len(output_len: usize) -> Result<(), CryptoError> {
    if output_len > MAX_OUTPUT_LEN {
        return Err(CryptoError::DerivationLengthExceeded {
            requested: output_len,
            maximum: MAX_OUTPUT_LEN,
        });
    }
    Ok(())
}

/// Derive `output_len` bytes from `ikm` bound to `(salt, info)`.
///
/// Deterministic: two parties holding the same shared secret derive the same
/// bytes without further communication. The length is checked before any
/// hashing happens.
pub fn derive(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<DerivedKey, CryptoError> {
    check_output_len(output_len)?;
    KeySchedule::extract(salt, ikm).expand(info, output_len)
}

/// Derive a 32-byte key from `ikm` bound to `(salt, info)`.
pub fn derive_key(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<SymmetricKey, CryptoError> {
    KeySchedule::extract(salt, ikm).expand_key(info)
}
