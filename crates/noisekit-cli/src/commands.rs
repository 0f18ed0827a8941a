//! Subcommand execution.
//!
//! User-facing output uses writeln! to the supplied writer (this is a CLI
//! binary, not debug output).

use std::io::Write;

use tracing::info;
use zeroize::Zeroizing;

use noisekit_core::Config;
use noisekit_crypto::{
    CipherSuite, KeyPair, Role, Session, SessionParams, derive, fingerprint_of, open, seal,
};

use crate::cli::Command;
use crate::hexio;

/// Execute one subcommand, writing results to `out`.
pub fn run(command: Command, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Keygen { show_secret } => keygen(show_secret, out),
        Command::Exchange => exchange(out),
        Command::Derive {
            ikm,
            salt,
            info,
            length,
        } => {
            let salt = salt.unwrap_or_else(|| config.channel.kdf_salt.clone());
            derive_keys(&ikm, &salt, &info, length, out)
        }
        Command::Seal {
            key,
            aad,
            plaintext,
        } => {
            let key = hexio::decode_key("key", &key)?;
            let sealed = seal(
                config.channel.cipher_suite,
                key.as_slice(),
                plaintext.as_bytes(),
                aad.as_deref().map(str::as_bytes),
            )?;
            writeln!(out, "{}", hex::encode(sealed.as_bytes()))?;
            Ok(())
        }
        Command::Open { key, aad, sealed } => {
            let key = hexio::decode_key("key", &key)?;
            let sealed = hexio::decode("sealed message", &sealed)?;
            let plaintext = Zeroizing::new(open(
                config.channel.cipher_suite,
                key.as_slice(),
                &sealed,
                aad.as_deref().map(str::as_bytes),
            )?);
            writeln!(out, "{}", String::from_utf8_lossy(&plaintext))?;
            Ok(())
        }
        Command::PingPong { reply_suite } => {
            let ping_suite = config.channel.cipher_suite;
            let reply_suite = reply_suite.unwrap_or_else(|| other_suite(ping_suite));
            ping_pong(&config.channel.kdf_salt, ping_suite, reply_suite, out)
        }
    }
}

fn keygen(show_secret: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;
    writeln!(out, "public:      {}", hex::encode(keypair.public_bytes()))?;
    writeln!(out, "fingerprint: {}", keypair.fingerprint())?;
    if show_secret {
        let secret = Zeroizing::new(keypair.secret_bytes());
        writeln!(out, "secret:      {}", hex::encode(secret.as_slice()))?;
    }
    Ok(())
}

fn exchange(out: &mut impl Write) -> anyhow::Result<()> {
    let initiator = KeyPair::generate()?;
    let responder = KeyPair::generate()?;

    let at_initiator = initiator.diffie_hellman(&responder.public_bytes())?;
    let at_responder = responder.diffie_hellman(&initiator.public_bytes())?;

    writeln!(out, "initiator public: {}", hex::encode(initiator.public_bytes()))?;
    writeln!(out, "responder public: {}", hex::encode(responder.public_bytes()))?;
    writeln!(out, "DH at initiator:  {}", hex::encode(at_initiator.as_bytes()))?;
    writeln!(out, "DH at responder:  {}", hex::encode(at_responder.as_bytes()))?;
    writeln!(out, "equal:            {}", at_initiator == at_responder)?;
    Ok(())
}

fn derive_keys(
    ikm_hex: &str,
    salt: &str,
    labels: &[String],
    length: usize,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let ikm = Zeroizing::new(hexio::decode("ikm", ikm_hex)?);
    for label in labels {
        let key = derive(&ikm, salt.as_bytes(), label.as_bytes(), length)?;
        writeln!(out, "{label:?}: {}", hex::encode(key.as_bytes()))?;
    }
    Ok(())
}

const fn other_suite(suite: CipherSuite) -> CipherSuite {
    match suite {
        CipherSuite::Aes256Gcm => CipherSuite::ChaCha20Poly1305,
        CipherSuite::ChaCha20Poly1305 => CipherSuite::Aes256Gcm,
    }
}

fn ping_pong(
    salt: &str,
    ping_suite: CipherSuite,
    pong_suite: CipherSuite,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let initiator = KeyPair::generate()?;
    let responder = KeyPair::generate()?;
    writeln!(out, "initiator: {}", fingerprint_of(&initiator.public_bytes()))?;
    writeln!(out, "responder: {}", fingerprint_of(&responder.public_bytes()))?;

    let at_initiator = initiator.diffie_hellman(&responder.public_bytes())?;
    let at_responder = responder.diffie_hellman(&initiator.public_bytes())?;

    let ping_params = SessionParams {
        suite: ping_suite,
        kdf_salt: salt.as_bytes().to_vec(),
    };
    let pong_params = SessionParams {
        suite: pong_suite,
        ..ping_params.clone()
    };

    let sender = Session::from_shared_secret(Role::Initiator, &at_initiator, &ping_params)?;
    let receiver = Session::from_shared_secret(Role::Responder, &at_responder, &ping_params)?;
    let ping = sender.seal(b"ping", None)?;
    let got = receiver.open(ping.as_bytes(), None)?;
    writeln!(
        out,
        "initiator -> responder [{ping_suite}] {} => {}",
        hex::encode(ping.as_bytes()),
        String::from_utf8_lossy(&got)
    )?;

    let sender = Session::from_shared_secret(Role::Responder, &at_responder, &pong_params)?;
    let receiver = Session::from_shared_secret(Role::Initiator, &at_initiator, &pong_params)?;
    let pong = sender.seal(b"pong", None)?;
    let got = receiver.open(pong.as_bytes(), None)?;
    writeln!(
        out,
        "responder -> initiator [{pong_suite}] {} => {}",
        hex::encode(pong.as_bytes()),
        String::from_utf8_lossy(&got)
    )?;

    info!(%ping_suite, %pong_suite, "Ping-pong completed");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn run_to_string(command: Command, config: &Config) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(command, config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn keygen_hides_secret_by_default() {
        let output =
            run_to_string(Command::Keygen { show_secret: false }, &Config::default()).unwrap();
        assert!(output.contains("public:"));
        assert!(output.contains("fingerprint:"));
        assert!(!output.contains("secret:"));
    }

    #[test]
    fn keygen_shows_secret_on_request() {
        let output =
            run_to_string(Command::Keygen { show_secret: true }, &Config::default()).unwrap();
        assert!(output.contains("secret:"));
    }

    #[test]
    fn exchange_reports_equal_secrets() {
        let output = run_to_string(Command::Exchange, &Config::default()).unwrap();
        assert!(output.contains("equal:            true"), "{output}");
    }

    #[test]
    fn derive_prints_one_line_per_label() {
        let output = run_to_string(
            Command::Derive {
                ikm: "00".repeat(32),
                salt: Some("wg-demo-hkdf-salt".into()),
                info: vec!["initiator->responder key".into(), "responder->initiator key".into()],
                length: 32,
            },
            &Config::default(),
        )
        .unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_ne!(lines[0].split(": ").nth(1), lines[1].split(": ").nth(1));
    }

    #[test]
    fn derive_rejects_oversized_length() {
        let result = run_to_string(
            Command::Derive {
                ikm: "00".into(),
                salt: None,
                info: vec!["x".into()],
                length: 255 * 32 + 1,
            },
            &Config::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn seal_then_open_roundtrips_through_hex() {
        let key = "42".repeat(32);
        for suite in CipherSuite::ALL {
            let mut config = Config::default();
            config.channel.cipher_suite = suite;

            let sealed = run_to_string(
                Command::Seal {
                    key: key.clone(),
                    aad: Some("hdr".into()),
                    plaintext: "hello".into(),
                },
                &config,
            )
            .unwrap();
            let opened = run_to_string(
                Command::Open {
                    key: key.clone(),
                    aad: Some("hdr".into()),
                    sealed: sealed.trim().to_string(),
                },
                &config,
            )
            .unwrap();
            assert_eq!(opened.trim(), "hello");
        }
    }

    #[test]
    fn open_with_wrong_aad_fails() {
        let key = "42".repeat(32);
        let config = Config::default();
        let sealed = run_to_string(
            Command::Seal {
                key: key.clone(),
                aad: None,
                plaintext: "hello".into(),
            },
            &config,
        )
        .unwrap();
        let result = run_to_string(
            Command::Open {
                key,
                aad: Some("other".into()),
                sealed: sealed.trim().to_string(),
            },
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn seal_rejects_short_key() {
        let result = run_to_string(
            Command::Seal {
                key: "00".repeat(16),
                aad: None,
                plaintext: "hello".into(),
            },
            &Config::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn ping_pong_uses_both_suites() {
        let output =
            run_to_string(Command::PingPong { reply_suite: None }, &Config::default()).unwrap();
        assert!(output.contains("[aes-256-gcm]"));
        assert!(output.contains("[chacha20-poly1305]"));
        assert!(output.contains("=> ping"));
        assert!(output.contains("=> pong"));
    }

    #[test]
    fn other_suite_flips() {
        for suite in CipherSuite::ALL {
            assert_ne!(other_suite(suite), suite);
            assert_eq!(other_suite(other_suite(suite)), suite);
        }
    }
}
