//! Hex parsing for keys and sealed messages given on the command line.

use zeroize::Zeroizing;

use noisekit_crypto::KEY_SIZE;

/// Errors from decoding command-line hex input.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum HexInputError {
    #[error("{what} is not valid hex: {source}")]
    Invalid {
        what: &'static str,
        source: hex::FromHexError,
    },

    #[error("{what} must be {expected} bytes, got {actual}")]
    WrongLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Decode arbitrary-length hex. Whitespace and an optional `0x` prefix are
/// ignored.
pub fn decode(what: &'static str, input: &str) -> Result<Vec<u8>, HexInputError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    hex::decode(cleaned).map_err(|source| HexInputError::Invalid { what, source })
}

/// Decode a 32-byte key. The decoded bytes are wiped when dropped.
pub fn decode_key(
    what: &'static str,
    input: &str,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, HexInputError> {
    let bytes = Zeroizing::new(decode(what, input)?);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    if bytes.len() != KEY_SIZE {
        return Err(HexInputError::WrongLength {
            what,
            expected: KEY_SIZE,
            actual: bytes.len(),
        });
    }
    key.copy_from_slice(&bytes);
    Ok(key)
}
