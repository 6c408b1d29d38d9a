//! # Provider Capability
//!
//! [`Crypto`] is the surface shared by every façade: the single-provider
//! [`SymmetricCrypto`](crate::SymmetricCrypto), the routing
//! [`CompositeCrypto`](crate::CompositeCrypto) and anything else that wants to be routed to.
//! Composites hold `Arc<dyn Crypto>` values, so a composite can be nested inside another.

use crate::cipher::{Decryptor, Encryptor};
use crate::error::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use strum_macros::{Display, EnumString};

/// Direction of a transform. Providers are selected per direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Name-keyed encrypt/decrypt capability.
///
/// Every operation takes an optional credential name; `None` addresses the default
/// credential. The transform methods have default implementations that mint a handle,
/// run one transform and release the handle before returning.
pub trait Crypto: Debug + Send + Sync {
    /// Returns `true` if a credential named `name` can be used to encrypt. Never fails.
    fn can_encrypt(&self, name: Option<&str>) -> bool;

    /// Returns `true` if a credential named `name` can be used to decrypt. Never fails.
    fn can_decrypt(&self, name: Option<&str>) -> bool;

    /// Mints an encryptor bound to the resolved credential. The caller owns the handle.
    ///
    /// # Errors
    /// [`CryptoError::CredentialNotFound`], [`CryptoError::ProviderNotFound`] or a key error.
    fn encryptor(&self, name: Option<&str>) -> Result<Encryptor, CryptoError>;

    /// Mints a decryptor bound to the resolved credential. The caller owns the handle.
    ///
    /// # Errors
    /// [`CryptoError::CredentialNotFound`], [`CryptoError::ProviderNotFound`] or a key error.
    fn decryptor(&self, name: Option<&str>) -> Result<Decryptor, CryptoError>;

    /// Encrypts raw bytes.
    ///
    /// # Errors
    /// Resolution errors, or the cipher failure unchanged.
    fn encrypt(&self, plain: &[u8], name: Option<&str>) -> Result<Vec<u8>, CryptoError> {
        self.encryptor(name)?.encrypt(plain)
    }

    /// Decrypts raw bytes.
    ///
    /// # Errors
    /// Resolution errors, or the cipher failure unchanged.
    fn decrypt(&self, sealed: &[u8], name: Option<&str>) -> Result<Vec<u8>, CryptoError> {
        self.decryptor(name)?.decrypt(sealed)
    }

    /// Encrypts text and returns Base64 ciphertext.
    ///
    /// # Errors
    /// Resolution errors, or the cipher failure unchanged.
    fn encrypt_text(&self, plain: &str, name: Option<&str>) -> Result<String, CryptoError> {
        self.encryptor(name)?.encrypt_text(plain)
    }

    /// Decrypts Base64 ciphertext back into text.
    ///
    /// # Errors
    /// Resolution errors, [`CryptoError::Encoding`], [`CryptoError::Text`], or the cipher
    /// failure unchanged.
    fn decrypt_text(&self, sealed: &str, name: Option<&str>) -> Result<String, CryptoError> {
        self.decryptor(name)?.decrypt_text(sealed)
    }
}
