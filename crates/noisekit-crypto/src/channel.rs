//! AEAD sealing and opening.
//!
//! Two interchangeable suites, AES-256-GCM and ChaCha20-Poly1305, share one
//! framing: `nonce (12) || ciphertext || tag (16)`. Every seal draws a fresh
//! random nonce; nonces are never counters here.

use std::fmt;
use std::str::FromStr;

use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use chacha20poly1305::aead::consts::U12;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, Nonce, Payload};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entropy::{EntropySource, OsEntropy};
use crate::error::CryptoError;

/// Key size for both suites.
pub const KEY_SIZE: usize = 32;

/// Nonce size for both suites (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size for both suites.
pub const TAG_SIZE: usize = 16;

/// AEAD cipher suite. Sender and receiver agree on it out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CipherSuite {
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl CipherSuite {
    pub const ALL: [Self; 2] = [Self::Aes256Gcm, Self::ChaCha20Poly1305];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes256Gcm => "aes-256-gcm",
            Self::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }

    pub const fn key_len(self) -> usize {
        KEY_SIZE
    }

    pub const fn nonce_len(self) -> usize {
        NONCE_SIZE
    }

    pub const fn tag_len(self) -> usize {
        TAG_SIZE
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a cipher suite name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown cipher suite: {0} (expected aes-256-gcm or chacha20-poly1305)")]
pub struct UnknownCipherSuite(pub String);

impl FromStr for CipherSuite {
    type Err = UnknownCipherSuite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes-256-gcm" | "aes256gcm" | "aes" => Ok(Self::Aes256Gcm),
            "chacha20-poly1305" | "chacha20poly1305" | "chacha" => Ok(Self::ChaCha20Poly1305),
            _ => Err(UnknownCipherSuite(s.to_string())),
        }
    }
}

/// `nonce || ciphertext || tag` as one contiguous buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage(Vec<u8>);

impl SealedMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_SIZE]
    }

    /// Ciphertext with the tag still appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.0[NONCE_SIZE..]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for SealedMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<SealedMessage> for Vec<u8> {
    fn from(sealed: SealedMessage) -> Self {
        sealed.0
    }
}

enum Backend {
    Aes(Box<Aes256Gcm>),
    ChaCha(ChaCha20Poly1305),
}

/// A keyed AEAD channel. Stateless apart from the key, so it can be shared
/// across threads and used for any number of messages.
pub struct SecureChannel<E = OsEntropy> {
    suite: CipherSuite,
    backend: Backend,
    entropy: E,
}

impl SecureChannel<OsEntropy> {
    /// Key a channel drawing nonces from the operating system CSPRNG.
    pub fn new(suite: CipherSuite, key: &[u8]) -> Result<Self, CryptoError> {
        Self::with_entropy(suite, key, OsEntropy)
    }
}

impl<E: EntropySource> SecureChannel<E> {
    /// Key a channel drawing nonces from `entropy`.
    pub fn with_entropy(suite: CipherSuite, key: &[u8], entropy: E) -> Result<Self, CryptoError> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }
        let backend = match suite {
            CipherSuite::Aes256Gcm => Backend::Aes(Box::new(
                Aes256Gcm::new_from_slice(key).map_err(|_| invalid_key(key))?,
            )),
            CipherSuite::ChaCha20Poly1305 => Backend::ChaCha(
                ChaCha20Poly1305::new_from_slice(key).map_err(|_| invalid_key(key))?,
            ),
        };
        Ok(Self {
            suite,
            backend,
            entropy,
        })
    }

    pub const fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn seal(
        &self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<SealedMessage, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        self.entropy.fill(&mut nonce)?;

        let payload = Payload {
            msg: plaintext,
            aad: associated_data.unwrap_or_default(),
        };
        let ciphertext = match &self.backend {
            Backend::Aes(cipher) => encrypt_with(&**cipher, &nonce, payload),
            Backend::ChaCha(cipher) => encrypt_with(cipher, &nonce, payload),
        }?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        debug!(
            suite = %self.suite,
            plaintext_len = plaintext.len(),
            sealed_len = sealed.len(),
            "Sealed message"
        );
        Ok(SealedMessage(sealed))
    }

    /// Verify and decrypt a sealed message.
    ///
    /// Any verification failure is reported as the same opaque
    /// [`CryptoError::AuthenticationFailure`].
    pub fn open(
        &self,
        sealed: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_SIZE {
            return Err(CryptoError::MessageTooShort {
                minimum: NONCE_SIZE,
                actual: sealed.len(),
            });
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        let payload = Payload {
            msg: ciphertext,
            aad: associated_data.unwrap_or_default(),
        };
        let result = match &self.backend {
            Backend::Aes(cipher) => decrypt_with(&**cipher, nonce, payload),
            Backend::ChaCha(cipher) => decrypt_with(cipher, nonce, payload),
        };
        match &result {
            Ok(plaintext) => {
                debug!(suite = %self.suite, plaintext_len = plaintext.len(), "Opened message");
            }
            Err(_) => {
                debug!(suite = %self.suite, sealed_len = sealed.len(), "Rejected sealed message");
            }
        }
        result
    }
}

fn invalid_key(key: &[u8]) -> CryptoError {
    CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.len(),
    }
}

fn encrypt_with<A>(
    cipher: &A,
    nonce: &[u8; NONCE_SIZE],
    payload: Payload<'_, '_>,
) -> Result<Vec<u8>, CryptoError>
where
    A: Aead + AeadCore<NonceSize = U12>,
{
    cipher
        .encrypt(Nonce::<A>::from_slice(nonce), payload)
        .map_err(|_| CryptoError::EncryptionFailed)
}

fn decrypt_with<A>(
    cipher: &A,
    nonce: &[u8],
    payload: Payload<'_, '_>,
) -> Result<Vec<u8>, CryptoError>
where
    A: Aead + AeadCore<NonceSize = U12>,
{
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::AuthenticationFailure);
    }
    cipher
        .decrypt(Nonce::<A>::from_slice(nonce), payload)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

/// Seal `plaintext` under `key` with `suite`, drawing the nonce from the OS.
pub fn seal(
    suite: CipherSuite,
    key: &[u8],
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<SealedMessage, CryptoError> {
    SecureChannel::new(suite, key)?.seal(plaintext, associated_data)
}

/// Open a message produced by [`seal`] with the same suite and key.
pub fn open(
    suite: CipherSuite,
    key: &[u8],
    sealed: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    SecureChannel::new(suite, key)?.open(sealed, associated_data)
}
