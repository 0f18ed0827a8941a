//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use noisekit_core::Config;
use noisekit_crypto::CipherSuite;

#[derive(Parser, Debug)]
#[command(name = "noisekit")]
#[command(version, about = "X25519 + HKDF + AEAD secure-channel toolkit", long_about = None)]
pub struct Cli {
    /// AEAD cipher suite: aes-256-gcm or chacha20-poly1305
    #[arg(long, global = true)]
    pub suite: Option<CipherSuite>,

    /// HKDF salt used when deriving session keys
    #[arg(long, global = true)]
    pub kdf_salt: Option<String>,

    /// Directory containing a .noisekit/settings.json project config
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line flags on top of the resolved configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(suite) = self.suite {
            config.channel.cipher_suite = suite;
        }
        if let Some(salt) = &self.kdf_salt {
            config.channel.kdf_salt.clone_from(salt);
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if self.log_json {
            config.logging.json = true;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an X25519 key pair
    Keygen {
        /// Also print the private scalar
        #[arg(long)]
        show_secret: bool,
    },
    /// Run an X25519 exchange between two fresh key pairs and compare results
    Exchange,
    /// Derive keys with HKDF-SHA256, one per --info label
    Derive {
        /// Input keying material (hex)
        #[arg(long)]
        ikm: String,
        /// Salt (UTF-8); defaults to the configured KDF salt
        #[arg(long)]
        salt: Option<String>,
        /// Context label (UTF-8); repeat for several keys
        #[arg(long, required = true)]
        info: Vec<String>,
        /// Output length in bytes
        #[arg(long, default_value_t = 32)]
        length: usize,
    },
    /// Seal a UTF-8 message under a 32-byte hex key
    Seal {
        /// Key (64 hex characters)
        #[arg(long)]
        key: String,
        /// Associated data (UTF-8)
        #[arg(long)]
        aad: Option<String>,
        /// Message to seal
        plaintext: String,
    },
    /// Open a hex-encoded sealed message
    Open {
        /// Key (64 hex characters)
        #[arg(long)]
        key: String,
        /// Associated data (UTF-8)
        #[arg(long)]
        aad: Option<String>,
        /// Sealed message: nonce || ciphertext || tag, hex
        sealed: String,
    },
    /// Initiator and responder exchange "ping" and "pong" over derived keys
    PingPong {
        /// Suite for the reply; defaults to the other suite
        #[arg(long)]
        reply_suite: Option<CipherSuite>,
    },
}
