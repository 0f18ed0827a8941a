//! X25519 key agreement.
//!
//! Each party generates a key pair, sends its public point to the peer, and
//! multiplies its private scalar with the peer's point. Both sides arrive at
//! the same 32-byte shared secret. Scalar arithmetic is `x25519-dalek`'s.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::entropy::{EntropySource, OsEntropy};
use crate::error::CryptoError;
use crate::kdf::{self, SymmetricKey};

/// Size of X25519 scalars, public points and shared secrets.
pub const X25519_KEY_SIZE: usize = 32;

/// An X25519 key pair owned by one party.
pub struct KeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public.as_bytes()))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl KeyPair {
    /// Generate a new key pair from the operating system CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::generate_with(&OsEntropy)
    }

    /// Generate a new key pair drawing the private scalar from `entropy`.
    ///
    /// Clamping happens inside `x25519-dalek`, so any 32 random bytes are a
    /// valid scalar.
    pub fn generate_with<E: EntropySource + ?Sized>(entropy: &E) -> Result<Self, CryptoError> {
        let mut scalar = [0u8; X25519_KEY_SIZE];
        if let Err(e) = entropy.fill(&mut scalar) {
            scalar.zeroize();
            return Err(e);
        }
        let keypair = Self::from_scalar(scalar);
        scalar.zeroize();
        debug!(public = %hex::encode(keypair.public.as_bytes()), "Generated X25519 key pair");
        Ok(keypair)
    }

    /// Reconstruct from raw 32-byte private scalar bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut scalar = to_key_array(bytes)?;
        let keypair = Self::from_scalar(scalar);
        scalar.zeroize();
        Ok(keypair)
    }

    fn from_scalar(scalar: [u8; X25519_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(scalar);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public point as raw bytes.
    pub fn public_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        *self.public.as_bytes()
    }

    /// Get the private scalar as raw bytes. Handle with care.
    pub fn secret_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Colon-separated SHA-256 fingerprint of the public point.
    pub fn fingerprint(&self) -> String {
        fingerprint_of(self.public.as_bytes())
    }

    /// Compute the shared secret with a peer's 32-byte public point.
    pub fn diffie_hellman(&self, remote_public: &[u8]) -> Result<SharedSecret, CryptoError> {
        let remote = PublicKey::from(to_key_array(remote_public)?);
        agree(&self.secret, &remote)
    }
}

/// Compute `ScalarMult(private_scalar, remote_public)`.
///
/// Rejects a remote point that yields an all-zero output.
pub fn compute_shared_secret(
    private_scalar: &[u8; X25519_KEY_SIZE],
    remote_public: &[u8; X25519_KEY_SIZE],
) -> Result<SharedSecret, CryptoError> {
    let secret = StaticSecret::from(*private_scalar);
    agree(&secret, &PublicKey::from(*remote_public))
}

fn agree(secret: &StaticSecret, remote: &PublicKey) -> Result<SharedSecret, CryptoError> {
    let shared = secret.diffie_hellman(remote);
    if !shared.was_contributory() {
        warn!("Rejected degenerate X25519 public key");
        return Err(CryptoError::InvalidPoint);
    }
    Ok(SharedSecret(shared.to_bytes()))
}

fn to_key_array(bytes: &[u8]) -> Result<[u8; X25519_KEY_SIZE], CryptoError> {
    <[u8; X25519_KEY_SIZE]>::try_from(bytes).map_err(|_| CryptoError::InvalidKeyLength {
        expected: X25519_KEY_SIZE,
        actual: bytes.len(),
    })
}

/// Raw X25519 output. Zeroized on drop; compared in constant time.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; X25519_KEY_SIZE]);

impl SharedSecret {
    /// Get the raw bytes (input keying material for derivation).
    pub const fn as_bytes(&self) -> &[u8; X25519_KEY_SIZE] {
        &self.0
    }

    /// Derive a 32-byte key bound to `(salt, info)` from this secret.
    pub fn derive_key(&self, salt: &[u8], info: &[u8]) -> Result<SymmetricKey, CryptoError> {
        kdf::derive_key(&self.0, salt, info)
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// Compute a colon-separated hex fingerprint from raw public key bytes.
pub fn fingerprint_of(pubkey_bytes: &[u8; X25519_KEY_SIZE]) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(pubkey_bytes);
    hash.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
