//! `btoa` / `atob` with forgiving decoding, plus byte-level helpers.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::{EdkError, Result};

/// Accepts input with or without padding and ignores leftover bits.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Standard alphabet, padded.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

/// Decode base64, ignoring ASCII whitespace and missing padding.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let mut data: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if data.len() % 4 == 0 {
        for _ in 0..2 {
            if data.ends_with('=') {
                data.pop();
            }
        }
    }
    if data.len() % 4 == 1 {
        return Err(EdkError::InvalidBase64(format!(
            "length {} cannot be base64",
            data.len()
        )));
    }
    if let Some(bad) = data
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '+' || *c == '/'))
    {
        return Err(EdkError::InvalidBase64(format!("unexpected character {bad:?}")));
    }

    Ok(FORGIVING.decode(data)?)
}

/// Encode a binary string, where every char stands for one byte.
pub fn btoa(input: &str) -> Result<String> {
    let bytes = input
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| EdkError::InvalidCharacter(format!("{c:?} is outside Latin-1")))
        })
        .collect::<Result<Vec<u8>>>()?;
    Ok(encode(bytes))
}

/// Decode into a binary string, one char per byte.
pub fn atob(input: &str) -> Result<String> {
    Ok(decode(input)?.into_iter().map(char::from).collect())
}
