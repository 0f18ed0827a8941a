//! Crypto error types.

/// Errors from cryptographic operations.
///
/// No variant ever carries key material or plaintext.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The entropy source could not supply the requested bytes.
    #[error("Randomness failure: {0}")]
    RandomnessFailure(String),

    /// The remote public key is a low-order or otherwise degenerate point.
    #[error("Invalid public key: Diffie-Hellman output is degenerate")]
    InvalidPoint,

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Message too short: need at least {minimum} bytes, got {actual}")]
    MessageTooShort { minimum: usize, actual: usize },

    /// Tag verification failed. Deliberately carries no detail.
    #[error("Authentication failed")]
    AuthenticationFailure,

    #[error("Requested {requested} bytes of derived key material, maximum is {maximum}")]
    DerivationLengthExceeded { requested: usize, maximum: usize },

    #[error("Encryption failed")]
    EncryptionFailed,
}
