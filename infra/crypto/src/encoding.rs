//! Text codecs used by the string overloads.
//!
//! Plain text is converted to bytes with the configured [`TextEncoding`] before
//! encryption; ciphertext is rendered as standard, padded Base64.

use crate::error::{CryptoError, CryptoErrorExt};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// String to byte codec for plain text.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    #[strum(to_string = "utf-8", serialize = "utf8")]
    Utf8,
    #[serde(rename = "utf-16le", alias = "utf16le")]
    #[strum(to_string = "utf-16le", serialize = "utf16le")]
    Utf16Le,
    #[serde(rename = "utf-16be", alias = "utf16be")]
    #[strum(to_string = "utf-16be", serialize = "utf16be")]
    Utf16Be,
}

impl TextEncoding {
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    /// # Errors
    /// Returns [`CryptoError::Text`] when `bytes` are not valid in this encoding.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, CryptoError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes).map_err(|e| CryptoError::Text {
                message: e.to_string().into(),
                context: Some("utf-8".into()),
            }),
            Self::Utf16Le => decode_utf16(&bytes, u16::from_le_bytes, "utf-16le"),
            Self::Utf16Be => decode_utf16(&bytes, u16::from_be_bytes, "utf-16be"),
        }
    }
}

fn decode_utf16(
    bytes: &[u8],
    unit: fn([u8; 2]) -> u16,
    label: &'static str,
) -> Result<String, CryptoError> {
    if bytes.len() % 2 != 0 {
        return Err(CryptoError::Text {
            message: format!("odd byte count {}", bytes.len()).into(),
            context: Some(label.into()),
        });
    }

    let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]])).collect();
    String::from_utf16(&units)
        .map_err(|e| CryptoError::Text { message: e.to_string().into(), context: Some(label.into()) })
}

/// Renders ciphertext bytes as Base64 text.
pub(crate) fn armor(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Parses Base64 ciphertext text back into bytes.
pub(crate) fn dearmor(text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD.decode(text.trim()).context("Ciphertext is not valid Base64")
}
