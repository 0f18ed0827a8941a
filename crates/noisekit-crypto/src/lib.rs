//! `noisekit` secure-channel bootstrap
//!
//! Two parties agree on a key with X25519, derive purpose-bound subkeys with
//! HKDF-SHA256, and protect messages with an AEAD cipher.
//!
//! ## Crypto primitives
//!
//! - **Agreement**: X25519 key pairs and ECDH, rejecting degenerate peer keys
//! - **Derivation**: HKDF-SHA256 extract-and-expand, domain-separated by `info`
//! - **Channel**: AES-256-GCM or ChaCha20-Poly1305, `nonce(12) || ciphertext || tag(16)`
//!   with a fresh random nonce per message
//! - **Session**: ephemeral ECDH → HKDF → one key per direction
//!
//! Derive keys before use. [`channel::seal`] accepts any 32-byte key, but a
//! raw Diffie-Hellman output should go through [`kdf`] (or [`Session`]) first.

pub mod agreement;
pub mod channel;
pub mod entropy;
pub mod error;
pub mod kdf;
pub mod session;

pub use agreement::{KeyPair, SharedSecret, X25519_KEY_SIZE, compute_shared_secret, fingerprint_of};
pub use channel::{
    CipherSuite, KEY_SIZE, NONCE_SIZE, SealedMessage, SecureChannel, TAG_SIZE, UnknownCipherSuite,
    open, seal,
};
pub use entropy::{EntropySource, OsEntropy, fill_random};
pub use error::CryptoError;
pub use kdf::{DerivedKey, KeySchedule, MAX_OUTPUT_LEN, SymmetricKey, derive, derive_key};
#[cfg(any(test, feature = "test-utils"))]
pub use session::perform_key_exchange;
pub use session::{Handshake, Role, Session, SessionParams};
