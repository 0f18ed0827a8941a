//! Randomness source shared by key generation and nonce generation.
//!
//! Everything that needs random bytes goes through [`EntropySource`] so the
//! failure path is explicit and tests can substitute a source.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::CryptoError;

/// A cryptographically secure source of random bytes.
///
/// Implementations must be safe to read from several threads at once and
/// must fail rather than block indefinitely or hand back weak bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CryptoError::RandomnessFailure(e.to_string()))
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &E {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        (**self).fill(buf)
    }
}

/// Fill `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsEntropy.fill(buf)
}

/// An entropy source that always fails. Used to exercise error paths.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEntropy;

#[cfg(any(test, feature = "test-utils"))]
impl EntropySource for FailingEntropy {
    fn fill(&self, _buf: &mut [u8]) -> Result<(), CryptoError> {
        Err(CryptoError::RandomnessFailure(
            "entropy source unavailable".into(),
        ))
    }
}

/// An entropy source that repeats a single byte. Deterministic, never secure.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, Copy)]
pub struct FixedEntropy(pub u8);

#[cfg(any(test, feature = "test-utils"))]
impl EntropySource for FixedEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        buf.fill(self.0);
        Ok(())
    }
}
