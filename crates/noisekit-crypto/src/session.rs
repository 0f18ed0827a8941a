//! Two-party session bootstrap.
//!
//! Each side generates an ephemeral X25519 key pair, exchanges public keys,
//! performs ECDH, and runs the shared secret through HKDF-SHA256 to get one
//! key per direction. The initiator seals with the initiator->responder key
//! and opens with the responder->initiator key; the responder does the
//! opposite. The raw shared secret is never used as a cipher key here.

use tracing::debug;

use crate::agreement::{KeyPair, SharedSecret};
use crate::channel::{CipherSuite, SealedMessage, SecureChannel};
use crate::error::CryptoError;
use crate::kdf::KeySchedule;

/// HKDF info label for keys protecting initiator-to-responder traffic.
pub const INITIATOR_TO_RESPONDER_INFO: &[u8] = b"noisekit initiator->responder v1";

/// HKDF info label for keys protecting responder-to-initiator traffic.
pub const RESPONDER_TO_INITIATOR_INFO: &[u8] = b"noisekit responder->initiator v1";

/// Default HKDF salt.
pub const DEFAULT_KDF_SALT: &[u8] = b"noisekit-hkdf-salt-v1";

/// Which side of the exchange this party plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Initiator,
    Responder,
}

impl Role {
    pub const fn peer(self) -> Self {
        match self {
            Self::Initiator => Self::Responder,
            Self::Responder => Self::Initiator,
        }
    }

    const fn send_info(self) -> &'static [u8] {
        match self {
            Self::Initiator => INITIATOR_TO_RESPONDER_INFO,
            Self::Responder => RESPONDER_TO_INITIATOR_INFO,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initiator => f.write_str("initiator"),
            Self::Responder => f.write_str("responder"),
        }
    }
}

/// Parameters both sides must agree on out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub suite: CipherSuite,
    pub kdf_salt: Vec<u8>,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            suite: CipherSuite::default(),
            kdf_salt: DEFAULT_KDF_SALT.to_vec(),
        }
    }
}

impl SessionParams {
    pub fn new(suite: CipherSuite) -> Self {
        Self {
            suite,
            ..Self::default()
        }
    }
}

/// State of a key exchange in progress.
#[derive(Debug)]
pub struct Handshake {
    role: Role,
    ephemeral: KeyPair,
}

impl Handshake {
    /// Start a new exchange by generating an ephemeral key pair.
    pub fn new(role: Role) -> Result<Self, CryptoError> {
        Ok(Self::with_keypair(role, KeyPair::generate()?))
    }

    /// Start a new exchange with an existing key pair.
    pub const fn with_keypair(role: Role, ephemeral: KeyPair) -> Self {
        Self { role, ephemeral }
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    /// Our ephemeral public key bytes to send to the peer.
    pub fn public_bytes(&self) -> [u8; 32] {
        self.ephemeral.public_bytes()
    }

    pub fn fingerprint(&self) -> String {
        self.ephemeral.fingerprint()
    }

    /// Complete the exchange with the peer's public key.
    ///
    /// Consumes the handshake so the ephemeral private scalar is dropped,
    /// and zeroized, as soon as the session keys exist.
    pub fn complete(
        self,
        peer_public: &[u8],
        params: &SessionParams,
    ) -> Result<Session, CryptoError> {
        let shared = self.ephemeral.diffie_hellman(peer_public)?;
        Session::from_shared_secret(self.role, &shared, params)
    }
}

/// An established session with one AEAD channel per direction.
pub struct Session {
    role: Role,
    suite: CipherSuite,
    sender: SecureChannel,
    receiver: SecureChannel,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Derive both directional keys from a shared secret.
    pub fn from_shared_secret(
        role: Role,
        shared: &SharedSecret,
        params: &SessionParams,
    ) -> Result<Self, CryptoError> {
        let schedule = KeySchedule::extract(&params.kdf_salt, shared.as_bytes());
        let send_key = schedule.expand_key(role.send_info())?;
        let recv_key = schedule.expand_key(role.peer().send_info())?;

        let sender = SecureChannel::new(params.suite, send_key.as_bytes())?;
        let receiver = SecureChannel::new(params.suite, recv_key.as_bytes())?;
        debug!(%role, suite = %params.suite, "Established session");

        Ok(Self {
            role,
            suite: params.suite,
            sender,
            receiver,
        })
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Seal a message for the peer.
    pub fn seal(
        &self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<SealedMessage, CryptoError> {
        self.sender.seal(plaintext, associated_data)
    }

    /// Open a message sealed by the peer.
    pub fn open(
        &self,
        sealed: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        self.receiver.open(sealed, associated_data)
    }
}

/// Perform a complete exchange and return (initiator, responder) sessions.
///
/// Mainly useful for tests and demos. In a real deployment each side creates
/// a `Handshake`, sends its public bytes, and calls `complete()` with the
/// peer's.
#[cfg(any(test, feature = "test-utils"))]
pub fn perform_key_exchange(params: &SessionParams) -> Result<(Session, Session), CryptoError> {
    let initiator = Handshake::new(Role::Initiator)?;
    let responder = Handshake::new(Role::Responder)?;

    let initiator_pub = initiator.public_bytes();
    let responder_pub = responder.public_bytes();

    let initiator_session = initiator.complete(&responder_pub, params)?;
    let responder_session = responder.complete(&initiator_pub, params)?;

    Ok((initiator_session, responder_session))
}
