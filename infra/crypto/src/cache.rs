//! # Credential Cache
//!
//! Indexes a fixed set of credentials by [`CredentialKey`]. At most one credential may be
//! unnamed (the default slot) and names are unique; both rules are checked when the cache
//! is built so a duplicate never silently shadows another credential at lookup time.

use crate::credential::{Credential, CredentialKey};
use crate::error::{CryptoError, describe_name};
use fxhash::FxHashMap;
use std::sync::Arc;

/// Immutable name to credential index with a distinguished default slot.
#[derive(Debug, Default)]
pub struct CredentialCache {
    entries: FxHashMap<CredentialKey, Arc<Credential>>,
    order: Vec<CredentialKey>,
}

impl CredentialCache {
    /// Builds the index.
    ///
    /// # Errors
    /// Returns [`CryptoError::DuplicateCredential`] if two credentials share a name or
    /// more than one credential is unnamed.
    pub fn new<I>(credentials: I) -> Result<Self, CryptoError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Credential>>,
    {
        let mut cache = Self::default();

        for credential in credentials {
            let credential = credential.into();
            let key = credential.lookup_key().clone();
            if cache.entries.contains_key(&key) {
                return Err(CryptoError::DuplicateCredential {
                    name: describe_name(key.name()),
                    context: None,
                });
            }
            cache.order.push(key.clone());
            cache.entries.insert(key, credential);
        }

        tracing::debug!(
            credentials = cache.len(),
            default = cache.has_default(),
            "Credential cache built"
        );
        Ok(cache)
    }

    /// Resolves `name`, or the default credential when `name` is `None`.
    ///
    /// # Errors
    /// Returns [`CryptoError::CredentialNotFound`] naming the requested credential.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<Credential>, CryptoError> {
        self.entries
            .get(&CredentialKey::from(name))
            .cloned()
            .ok_or_else(|| CryptoError::credential_not_found(name))
    }

    /// Same lookup as [`resolve`](Self::resolve) without touching key material.
    #[must_use]
    pub fn probe(&self, name: Option<&str>) -> bool {
        self.entries.contains_key(&CredentialKey::from(name))
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.entries.contains_key(&CredentialKey::Default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &CredentialKey> {
        self.order.iter()
    }

    /// Named credentials in registration order; the default slot is skipped.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().filter_map(CredentialKey::name)
    }

    /// Credentials in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Credential>> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }
}
