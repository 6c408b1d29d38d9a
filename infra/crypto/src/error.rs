//! # Crypto Errors
//!
//! [`CryptoError`] covers construction failures (missing collections, duplicate
//! credentials), per-call routing misses and the failures bubbled up from the cipher layer.

use std::borrow::Cow;

/// A specialized error enum for credential routing and cipher failures.
#[keyroute_derive::keyroute_error]
pub enum CryptoError {
    /// A required collection was never supplied to a builder.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two credentials share a name, or more than one credential is unnamed.
    #[error("Duplicate credential{}: {name} is registered more than once", format_context(.context))]
    DuplicateCredential { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No credential is registered under the requested name.
    #[error("Credential not found{}: {name}", format_context(.context))]
    CredentialNotFound { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No provider of a composite claims the requested name for this direction.
    #[error("Provider not found{}: no provider can {direction} with {name}", format_context(.context))]
    ProviderNotFound {
        name: Cow<'static, str>,
        direction: crate::provider::Direction,
        context: Option<Cow<'static, str>>,
    },

    /// The key or IV size is not usable with the credential's algorithm.
    #[error("Invalid key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The credential's key factory could not produce key bytes.
    #[error("Key material unavailable{}: {message}", format_context(.context))]
    KeyMaterial { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Encryption error{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Usually a wrong key or tampered data.
    #[error("Decryption error{}: {message}", format_context(.context))]
    Decryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The sealed payload is malformed or too short.
    #[error("Invalid payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Decompression error{}: {message}", format_context(.context))]
    Decompression { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Text ciphertext is not valid Base64.
    #[error("Encoding error{}: {source}", format_context(.context))]
    Encoding { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// Decrypted bytes are not valid in the configured text encoding.
    #[error("Text decoding error{}: {message}", format_context(.context))]
    Text { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Configuration could not be loaded or deserialized.
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Internal crypto error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CryptoError {
    pub(crate) fn credential_not_found(name: Option<&str>) -> Self {
        Self::CredentialNotFound { name: describe_name(name), context: None }
    }

    pub(crate) fn provider_not_found(name: Option<&str>, direction: crate::provider::Direction) -> Self {
        Self::ProviderNotFound { name: describe_name(name), direction, context: None }
    }
}

/// Renders an optional credential name for diagnostics.
pub(crate) fn describe_name(name: Option<&str>) -> Cow<'static, str> {
    name.map_or(Cow::Borrowed("the default credential"), |n| Cow::Owned(format!("credential '{n}'")))
}
