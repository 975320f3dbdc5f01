//! URL-safe base64 without padding, lenient on decode.

use crate::CipherError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn is_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

pub(super) fn encode(text: &str) -> String {
    URL_SAFE_LENIENT.encode(text.as_bytes())
}

/// characters outside the alphabet are skipped, a trailing partial byte is dropped and invalid
/// UTF-8 sequences become U+FFFD.
pub(super) fn decode(encoded: &str) -> Result<String, CipherError> {
    let mut symbols = encoded.chars().filter(|&c| is_alphabet(c)).collect::<String>();

    // 一个多余的字符只有6位, 凑不成一个字节
    if symbols.len() % 4 == 1 {
        symbols.pop();
    }

    let bytes = URL_SAFE_LENIENT
        .decode(symbols)
        .map_err(|e| CipherError::Corrupt(format!("undecodable payload: {e}")))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
