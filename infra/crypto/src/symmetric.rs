//! # Symmetric Crypto
//!
//! The single-provider façade: a [`CredentialCache`] paired with one [`CipherProvider`]
//! and one [`TextEncoding`].

use crate::cache::CredentialCache;
use crate::cipher::{AeadCipherProvider, CipherProvider, Decryptor, Encryptor};
use crate::credential::Credential;
use crate::encoding::TextEncoding;
use crate::error::CryptoError;
use crate::provider::Crypto;
use std::sync::Arc;

#[derive(Debug)]
struct SymmetricInner {
    credentials: CredentialCache,
    cipher: Arc<dyn CipherProvider>,
    encoding: TextEncoding,
}

/// Name-keyed symmetric encryption over one credential set.
///
/// Cheap to clone and safe to share across threads; the credential set is fixed at
/// construction.
///
/// ### Example
/// ```rust
/// use keyroute_crypto::prelude::*;
///
/// # fn main() -> Result<(), CryptoError> {
/// let crypto = SymmetricCrypto::builder()
///     .credentials([
///         Credential::from_key(Algorithm::Aes, 12, [7u8; 32]),
///         Credential::derived(Algorithm::ChaCha20Poly1305, 12, "secret", "salt", "billing", 32)
///             .named("billing"),
///     ])
///     .build()?;
///
/// let sealed = crypto.encrypt_text("hello", Some("billing"))?;
/// assert_eq!(crypto.decrypt_text(&sealed, Some("billing"))?, "hello");
/// assert!(crypto.can_encrypt(None));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SymmetricCrypto {
    inner: Arc<SymmetricInner>,
}

impl SymmetricCrypto {
    /// Builds a façade over `credentials` with the default AEAD provider and UTF-8 text.
    ///
    /// # Errors
    /// Returns [`CryptoError::DuplicateCredential`] for duplicate names or defaults.
    pub fn new<I>(credentials: I) -> Result<Self, CryptoError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Credential>>,
    {
        Self::builder().credentials(credentials).build()
    }

    #[must_use]
    pub fn builder() -> SymmetricCryptoBuilder {
        SymmetricCryptoBuilder::default()
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialCache {
        &self.inner.credentials
    }

    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.inner.encoding
    }
}

impl Crypto for SymmetricCrypto {
    fn can_encrypt(&self, name: Option<&str>) -> bool {
        self.inner.credentials.probe(name)
    }

    // Any credential that exists can decrypt as well as encrypt.
    fn can_decrypt(&self, name: Option<&str>) -> bool {
        self.inner.credentials.probe(name)
    }

    fn encryptor(&self, name: Option<&str>) -> Result<Encryptor, CryptoError> {
        let credential = self.inner.credentials.resolve(name)?;
        self.inner.cipher.encryptor(&credential, self.inner.encoding)
    }

    fn decryptor(&self, name: Option<&str>) -> Result<Decryptor, CryptoError> {
        let credential = self.inner.credentials.resolve(name)?;
        self.inner.cipher.decryptor(&credential, self.inner.encoding)
    }
}

/// Builder for [`SymmetricCrypto`].
///
/// The credential collection is mandatory (an empty one is fine); the cipher provider
/// defaults to [`AeadCipherProvider`] and the text encoding to UTF-8.
#[derive(Debug, Default)]
pub struct SymmetricCryptoBuilder {
    credentials: Option<Vec<Arc<Credential>>>,
    cipher: Option<Arc<dyn CipherProvider>>,
    encoding: TextEncoding,
}

impl SymmetricCryptoBuilder {
    #[must_use]
    pub fn credentials<I>(mut self, credentials: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Credential>>,
    {
        self.credentials = Some(credentials.into_iter().map(Into::into).collect());
        self
    }

    /// Appends one credential, starting the collection if needed.
    #[must_use]
    pub fn credential(mut self, credential: impl Into<Arc<Credential>>) -> Self {
        self.credentials.get_or_insert_with(Vec::new).push(credential.into());
        self
    }

    #[must_use]
    pub fn cipher(mut self, cipher: impl CipherProvider + 'static) -> Self {
        self.cipher = Some(Arc::new(cipher));
        self
    }

    #[must_use]
    pub fn shared_cipher(mut self, cipher: Arc<dyn CipherProvider>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    #[must_use]
    pub const fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// # Errors
    /// * [`CryptoError::InvalidArgument`] if no credential collection was supplied.
    /// * [`CryptoError::DuplicateCredential`] for duplicate names or defaults.
    pub fn build(self) -> Result<SymmetricCrypto, CryptoError> {
        let credentials = self.credentials.ok_or_else(|| CryptoError::InvalidArgument {
            message: "credentials are required".into(),
            context: Some("SymmetricCrypto".into()),
        })?;

        let inner = SymmetricInner {
            credentials: CredentialCache::new(credentials)?,
            cipher: self.cipher.unwrap_or_else(|| Arc::new(AeadCipherProvider::new())),
            encoding: self.encoding,
        };

        Ok(SymmetricCrypto { inner: Arc::new(inner) })
    }
}
