//! # Composite Crypto
//!
//! Routes each request to the first registered provider that claims the credential
//! name for the requested [`Direction`]. Encrypt and decrypt are selected independently,
//! so a provider that can only encrypt a name never receives decrypt calls for it.
//!
//! Providers may claim overlapping names. That is not an error: registration order is
//! the tie-break and the earliest provider always wins.

use crate::cipher::{Decryptor, Encryptor};
use crate::error::CryptoError;
use crate::provider::{Crypto, Direction};
use std::sync::Arc;

/// Ordered set of providers behind one [`Crypto`] surface.
///
/// ### Example
/// ```rust
/// use keyroute_crypto::prelude::*;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), CryptoError> {
/// let aes = SymmetricCrypto::new([
///     Credential::from_key(Algorithm::Aes, 12, [1u8; 32]).named("orders"),
/// ])?;
/// let chacha = SymmetricCrypto::new([
///     Credential::from_key(Algorithm::ChaCha20Poly1305, 12, [2u8; 32]).named("invoices"),
/// ])?;
///
/// let crypto = CompositeCrypto::builder().provider(aes).provider(chacha).build()?;
///
/// let sealed = crypto.encrypt_text("42", Some("invoices"))?;
/// assert_eq!(crypto.decrypt_text(&sealed, Some("invoices"))?, "42");
/// assert!(!crypto.can_encrypt(Some("payroll")));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CompositeCrypto {
    providers: Arc<[Arc<dyn Crypto>]>,
}

impl CompositeCrypto {
    /// Creates a composite over `providers`, in order. An empty list handles nothing.
    pub fn new(providers: impl IntoIterator<Item = Arc<dyn Crypto>>) -> Self {
        Self { providers: providers.into_iter().collect() }
    }

    #[must_use]
    pub fn builder() -> CompositeCryptoBuilder {
        CompositeCryptoBuilder::default()
    }

    /// Returns the first provider that claims `name` for `direction`.
    ///
    /// # Errors
    /// Returns [`CryptoError::ProviderNotFound`] naming the credential and direction.
    pub fn select(
        &self,
        name: Option<&str>,
        direction: Direction,
    ) -> Result<&Arc<dyn Crypto>, CryptoError> {
        let (index, provider) = self
            .providers
            .iter()
            .enumerate()
            .find(|(_, provider)| match direction {
                Direction::Encrypt => provider.can_encrypt(name),
                Direction::Decrypt => provider.can_decrypt(name),
            })
            .ok_or_else(|| CryptoError::provider_not_found(name, direction))?;

        tracing::debug!(
            credential = name.unwrap_or("<default>"),
            %direction,
            index,
            "Provider selected"
        );
        Ok(provider)
    }

    /// Providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn Crypto>] {
        &self.providers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Crypto for CompositeCrypto {
    fn can_encrypt(&self, name: Option<&str>) -> bool {
        self.providers.iter().any(|p| p.can_encrypt(name))
    }

    fn can_decrypt(&self, name: Option<&str>) -> bool {
        self.providers.iter().any(|p| p.can_decrypt(name))
    }

    fn encryptor(&self, name: Option<&str>) -> Result<Encryptor, CryptoError> {
        self.select(name, Direction::Encrypt)?.encryptor(name)
    }

    fn decryptor(&self, name: Option<&str>) -> Result<Decryptor, CryptoError> {
        self.select(name, Direction::Decrypt)?.decryptor(name)
    }

    fn encrypt(&self, plain: &[u8], name: Option<&str>) -> Result<Vec<u8>, CryptoError> {
        self.select(name, Direction::Encrypt)?.encrypt(plain, name)
    }

    fn decrypt(&self, sealed: &[u8], name: Option<&str>) -> Result<Vec<u8>, CryptoError> {
        self.select(name, Direction::Decrypt)?.decrypt(sealed, name)
    }

    fn encrypt_text(&self, plain: &str, name: Option<&str>) -> Result<String, CryptoError> {
        self.select(name, Direction::Encrypt)?.encrypt_text(plain, name)
    }

    fn decrypt_text(&self, sealed: &str, name: Option<&str>) -> Result<String, CryptoError> {
        self.select(name, Direction::Decrypt)?.decrypt_text(sealed, name)
    }
}

/// Builder for [`CompositeCrypto`].
///
/// A provider collection must be supplied, through [`providers`](Self::providers) or at
/// least one [`provider`](Self::provider) call; an explicitly empty collection is allowed.
#[derive(Debug, Default)]
pub struct CompositeCryptoBuilder {
    providers: Option<Vec<Arc<dyn Crypto>>>,
}

impl CompositeCryptoBuilder {
    /// Appends a provider after the ones already registered.
    #[must_use]
    pub fn provider(mut self, provider: impl Crypto + 'static) -> Self {
        self.providers.get_or_insert_with(Vec::new).push(Arc::new(provider));
        self
    }

    /// Appends an already shared provider.
    #[must_use]
    pub fn shared(mut self, provider: Arc<dyn Crypto>) -> Self {
        self.providers.get_or_insert_with(Vec::new).push(provider);
        self
    }

    /// Replaces the provider collection.
    #[must_use]
    pub fn providers(mut self, providers: impl IntoIterator<Item = Arc<dyn Crypto>>) -> Self {
        self.providers = Some(providers.into_iter().collect());
        self
    }

    /// # Errors
    /// Returns [`CryptoError::InvalidArgument`] if no provider collection was supplied.
    pub fn build(self) -> Result<CompositeCrypto, CryptoError> {
        let providers = self.providers.ok_or_else(|| CryptoError::InvalidArgument {
            message: "providers are required".into(),
            context: Some("CompositeCrypto".into()),
        })?;
        Ok(CompositeCrypto::new(providers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{Algorithm, Credential};
    use crate::symmetric::SymmetricCrypto;

    fn provider(names: &[&str], seed: u8) -> SymmetricCrypto {
        SymmetricCrypto::new(
            names
                .iter()
                .map(|name| Credential::from_key(Algorithm::Aes, 12, [seed; 32]).named(*name)),
        )
        .unwrap()
    }

    #[test]
    fn builder_requires_a_collection() {
        let err = CompositeCrypto::builder().build().unwrap_err();
        assert!(matches!(err, CryptoError::InvalidArgument { .. }));

        let empty = CompositeCrypto::builder().providers([]).build().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn empty_composite_handles_nothing() {
        let crypto = CompositeCrypto::new([]);

        for name in [None, Some("anything"), Some("")] {
            assert!(!crypto.can_encrypt(name));
            assert!(!crypto.can_decrypt(name));
        }
    }

    #[test]
    fn selection_follows_registration_order() {
        let crypto = CompositeCrypto::builder()
            .provider(provider(&["foo"], 1))
            .provider(provider(&["foo", "bar"], 2))
            .build()
            .unwrap();

        assert!(crypto.select(Some("foo"), Direction::Encrypt).is_ok());
        let first = crypto.providers()[0].clone();
        let second = crypto.providers()[1].clone();

        let sealed = crypto.encrypt(b"x", Some("foo")).unwrap();
        assert_eq!(first.decrypt(&sealed, Some("foo")).unwrap(), b"x");
        assert!(second.decrypt(&sealed, Some("foo")).is_err());

        let sealed = crypto.encrypt(b"y", Some("bar")).unwrap();
        assert_eq!(second.decrypt(&sealed, Some("bar")).unwrap(), b"y");
    }

    #[test]
    fn misses_name_the_credential_and_direction() {
        let crypto = CompositeCrypto::new([
            Arc::new(provider(&["foo"], 1)) as Arc<dyn Crypto>,
            Arc::new(provider(&["bar"], 2)) as Arc<dyn Crypto>,
        ]);

        assert!(!crypto.can_encrypt(Some("baz")));
        let err = crypto.encrypt_text("x", Some("baz")).unwrap_err();
        assert!(matches!(err, CryptoError::ProviderNotFound { direction: Direction::Encrypt, .. }));
        assert_eq!(
            err.to_string(),
            "Provider not found: no provider can encrypt with credential 'baz'"
        );

        let err = crypto.decryptor(None).unwrap_err();
        assert!(err.to_string().contains("default credential"));
    }
}
