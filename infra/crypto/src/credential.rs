//! # Credentials
//!
//! A [`Credential`] describes *how* to obtain key bytes, which [`Algorithm`] they feed
//! and how large the IV is. Key bytes are produced lazily by a key factory the first
//! time a cipher handle is minted and are kept for the credential's lifetime.

use crate::error::CryptoError;
use hkdf::Hkdf;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::sync::{Arc, OnceLock};
use strum_macros::{Display, EnumString};
use zeroize::Zeroizing;

/// Key bytes, wiped on drop.
pub type SecretKey = Zeroizing<Vec<u8>>;

/// Deferred key producer. May be expensive (secret store lookup, derivation).
pub type KeyFactory = Arc<dyn Fn() -> Result<SecretKey, CryptoError> + Send + Sync>;

/// Cipher family a credential is used with.
///
/// The key length and IV size decide the concrete variant, see
/// [`AeadCipherProvider`](crate::cipher::AeadCipherProvider).
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Algorithm {
    /// AES-GCM with a 128-bit or 256-bit key.
    #[default]
    Aes,
    /// ChaCha20-Poly1305 with a 256-bit key.
    #[serde(alias = "chacha")]
    #[strum(to_string = "chacha20_poly1305", serialize = "chacha")]
    ChaCha20Poly1305,
}

impl Algorithm {
    /// Key length used when a key is derived rather than supplied.
    #[must_use]
    pub const fn default_key_len(self) -> usize {
        match self {
            Self::Aes | Self::ChaCha20Poly1305 => 32,
        }
    }

    /// IV length used when none is configured.
    #[must_use]
    pub const fn default_iv_size(self) -> usize {
        match self {
            Self::Aes | Self::ChaCha20Poly1305 => 12,
        }
    }
}

/// Lookup key of a credential inside a [`CredentialCache`](crate::CredentialCache).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    Default,
    Named(String),
}

impl CredentialKey {
    /// Returns the name, `None` for the default slot.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl From<Option<&str>> for CredentialKey {
    fn from(name: Option<&str>) -> Self {
        name.map_or(Self::Default, |n| Self::Named(n.to_owned()))
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("<default>"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Immutable credential descriptor with a lazily materialized key.
///
/// The key factory runs at most once successfully; concurrent first use is serialized
/// so the factory is never raced. A failing factory leaves the credential
/// unmaterialized and the next use tries again.
pub struct Credential {
    key: CredentialKey,
    algorithm: Algorithm,
    iv_size: usize,
    factory: KeyFactory,
    material: OnceLock<SecretKey>,
    init: Mutex<()>,
}

impl Credential {
    /// Creates an unnamed (default) credential backed by `factory`.
    pub fn new<F>(algorithm: Algorithm, iv_size: usize, factory: F) -> Self
    where
        F: Fn() -> Result<SecretKey, CryptoError> + Send + Sync + 'static,
    {
        Self {
            key: CredentialKey::Default,
            algorithm,
            iv_size,
            factory: Arc::new(factory),
            material: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Creates a credential around key bytes that already exist.
    pub fn from_key(algorithm: Algorithm, iv_size: usize, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: CredentialKey::Default,
            algorithm,
            iv_size,
            factory: Arc::new(|| -> Result<SecretKey, CryptoError> {
                Err(CryptoError::Internal {
                    message: "Pre-materialized credential has no key factory".into(),
                    context: None,
                })
            }),
            material: OnceLock::from(Zeroizing::new(key.into())),
            init: Mutex::new(()),
        }
    }

    /// Creates a credential whose key is derived with HKDF-SHA256 on first use.
    ///
    /// # Arguments
    /// * `secret`: Input keying material.
    /// * `salt`: Separates keys across environments.
    /// * `info`: Binds the key to its purpose (typically the credential name).
    /// * `len`: Output key length in bytes.
    pub fn derived(
        algorithm: Algorithm,
        iv_size: usize,
        secret: impl Into<Vec<u8>>,
        salt: impl Into<Vec<u8>>,
        info: impl Into<Vec<u8>>,
        len: usize,
    ) -> Self {
        let secret = Zeroizing::new(secret.into());
        let salt = salt.into();
        let info = info.into();

        Self::new(algorithm, iv_size, move || {
            let hk = Hkdf::<Sha256>::new(Some(salt.as_slice()), &secret);
            let mut okm = Zeroizing::new(vec![0u8; len]);
            hk.expand(&info, &mut okm).map_err(|_| CryptoError::KeyMaterial {
                message: format!("HKDF cannot expand to {len} bytes").into(),
                context: None,
            })?;
            Ok(okm)
        })
    }

    /// Names the credential. Unnamed credentials are the default of their cache.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.key = CredentialKey::Named(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.key.name()
    }

    #[must_use]
    pub const fn lookup_key(&self) -> &CredentialKey {
        &self.key
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn iv_size(&self) -> usize {
        self.iv_size
    }

    /// Returns `true` once key bytes have been produced.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.material.get().is_some()
    }

    /// Returns the key bytes, running the key factory on first use.
    ///
    /// # Errors
    /// Returns [`CryptoError::KeyMaterial`] (or whatever the factory reports) when the
    /// key cannot be produced.
    pub fn key(&self) -> Result<&[u8], CryptoError> {
        if let Some(key) = self.material.get() {
            return Ok(key.as_slice());
        }

        let _guard = self.init.lock();
        if let Some(key) = self.material.get() {
            return Ok(key.as_slice());
        }

        let key = (self.factory)()?;
        tracing::debug!(credential = %self.key, len = key.len(), "Key material produced");
        Ok(self.material.get_or_init(|| key).as_slice())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.key)
            .field("algorithm", &self.algorithm)
            .field("iv_size", &self.iv_size)
            .field("materialized", &self.is_materialized())
            .finish_non_exhaustive()
    }
}
