//! # Cipher Boundary
//!
//! A [`CipherProvider`] turns a resolved [`Credential`] into a [`CipherEngine`], the object
//! that actually runs the block cipher. Engines are wrapped in direction-specific handles,
//! [`Encryptor`] and [`Decryptor`], which add the text overloads and release the engine
//! when dropped.
//!
//! The façades never look inside an engine. Any provider that honors the round-trip
//! guarantee (`decrypt(encrypt(x)) == x` under one credential) can be plugged in.

mod aead;

pub use aead::AeadCipherProvider;

use crate::credential::{Credential, CredentialKey};
use crate::encoding::{TextEncoding, armor, dearmor};
use crate::error::CryptoError;
use std::fmt::Debug;
use zeroize::Zeroizing;

/// A keyed cipher instance. Dropping it releases the key schedule.
pub trait CipherEngine: Debug + Send {
    /// Encrypts `plain`. Output is randomized; equal plaintexts need not yield equal ciphertexts.
    ///
    /// # Errors
    /// Returns [`CryptoError::Encryption`] if the cipher fails.
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Reverses [`CipherEngine::encrypt`].
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidPayload`] or [`CryptoError::Decryption`] for malformed
    /// or foreign ciphertext.
    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Produces cipher engines for resolved credentials.
pub trait CipherProvider: Debug + Send + Sync {
    /// Builds an engine keyed with the credential's key material.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidKey`] if the key or IV size does not fit the algorithm,
    /// or the credential's key factory error.
    fn engine(&self, credential: &Credential) -> Result<Box<dyn CipherEngine>, CryptoError>;

    /// Mints an [`Encryptor`] bound to `credential`.
    ///
    /// # Errors
    /// See [`CipherProvider::engine`].
    fn encryptor(
        &self,
        credential: &Credential,
        encoding: TextEncoding,
    ) -> Result<Encryptor, CryptoError> {
        let engine = self.engine(credential)?;
        Ok(Encryptor { engine, encoding, credential: credential.lookup_key().clone() })
    }

    /// Mints a [`Decryptor`] bound to `credential`.
    ///
    /// # Errors
    /// See [`CipherProvider::engine`].
    fn decryptor(
        &self,
        credential: &Credential,
        encoding: TextEncoding,
    ) -> Result<Decryptor, CryptoError> {
        let engine = self.engine(credential)?;
        Ok(Decryptor { engine, encoding, credential: credential.lookup_key().clone() })
    }
}

/// Encrypting handle bound to one credential and one text encoding.
///
/// Reusable for any number of transforms; dropping it releases the cipher.
#[derive(Debug)]
pub struct Encryptor {
    engine: Box<dyn CipherEngine>,
    encoding: TextEncoding,
    credential: CredentialKey,
}

impl Encryptor {
    /// # Errors
    /// The engine failure, unchanged.
    pub fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.engine.encrypt(plain)
    }

    /// Encodes `plain` with the handle's text encoding, encrypts it and returns Base64.
    ///
    /// # Errors
    /// The engine failure, unchanged.
    pub fn encrypt_text(&self, plain: &str) -> Result<String, CryptoError> {
        let bytes = Zeroizing::new(self.encoding.encode(plain));
        Ok(armor(&self.engine.encrypt(&bytes)?))
    }

    #[must_use]
    pub const fn credential(&self) -> &CredentialKey {
        &self.credential
    }

    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }
}

impl Drop for Encryptor {
    fn drop(&mut self) {
        tracing::trace!(credential = %self.credential, "Encryptor released");
    }
}

/// Decrypting handle bound to one credential and one text encoding.
///
/// Reusable for any number of transforms; dropping it releases the cipher.
#[derive(Debug)]
pub struct Decryptor {
    engine: Box<dyn CipherEngine>,
    encoding: TextEncoding,
    credential: CredentialKey,
}

impl Decryptor {
    /// # Errors
    /// The engine failure, unchanged.
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.engine.decrypt(sealed)
    }

    /// Decodes Base64 `sealed`, decrypts it and decodes the text.
    ///
    /// # Errors
    /// [`CryptoError::Encoding`] for bad Base64, [`CryptoError::Text`] when the plaintext is
    /// not valid in the handle's encoding, or the engine failure unchanged.
    pub fn decrypt_text(&self, sealed: &str) -> Result<String, CryptoError> {
        let bytes = dearmor(sealed)?;
        self.encoding.decode(self.engine.decrypt(&bytes)?)
    }

    #[must_use]
    pub const fn credential(&self) -> &CredentialKey {
        &self.credential
    }

    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }
}

impl Drop for Decryptor {
    fn drop(&mut self) {
        tracing::trace!(credential = %self.credential, "Decryptor released");
    }
}
