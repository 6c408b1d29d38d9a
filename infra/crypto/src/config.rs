//! # Configuration
//!
//! Declarative provider and credential setup. A [`CryptoConfig`] lists providers in routing
//! order; each provider owns a set of credentials whose keys come from a [`KeySource`].
//!
//! ```toml
//! [[providers]]
//! label = "primary"
//! compression = true
//!
//! [[providers.credentials]]
//! algorithm = "aes"
//! key = { source = "env", var = "APP_DEFAULT_KEY" }
//!
//! [[providers.credentials]]
//! name = "billing"
//! algorithm = "chacha20_poly1305"
//! key = { source = "derived", secret = "root-secret", salt = "prod" }
//! ```

use crate::cipher::AeadCipherProvider;
use crate::composite::CompositeCrypto;
use crate::credential::{Algorithm, Credential, SecretKey};
use crate::encoding::TextEncoding;
use crate::error::{CryptoError, CryptoErrorExt};
use crate::provider::Crypto;
use crate::symmetric::SymmetricCrypto;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use zeroize::Zeroizing;

/// Loads a configuration file and overlays `KEYROUTE__`-prefixed environment variables.
///
/// Nested keys use double underscores, e.g. `KEYROUTE__LOG__LEVEL` maps to `log.level`.
/// Without a path the loader looks for a `keyroute` file (any supported extension) in the
/// working directory.
///
/// # Errors
/// Returns [`CryptoError::Config`] if the file is missing or does not match `T`.
///
/// # Example
/// ```rust
/// use keyroute_crypto::{CryptoConfig, load_config};
///
/// let cfg: CryptoConfig = load_config(Some("config/local")).unwrap_or_default();
/// assert!(cfg.build().is_ok());
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, CryptoError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from("keyroute"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder().add_source(File::from(path.as_path()).required(true)).add_source(
        Environment::with_prefix("KEYROUTE").separator("__").convert_case(config::Case::Snake),
    );

    info!("Loading config from {}", path.display());

    builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

/// Providers in routing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub providers: Vec<ProviderConfig>,
}

impl CryptoConfig {
    /// Builds a [`CompositeCrypto`] with one [`SymmetricCrypto`] per provider entry.
    ///
    /// Key sources are not touched here; they are read the first time a credential is used.
    ///
    /// # Errors
    /// Returns [`CryptoError::DuplicateCredential`] if a provider repeats a name or has more
    /// than one unnamed credential.
    pub fn build(&self) -> Result<CompositeCrypto, CryptoError> {
        let providers = self
            .providers
            .iter()
            .enumerate()
            .map(|(index, provider)| {
                let crypto = provider.build().context(provider.describe(index))?;
                Ok(Arc::new(crypto) as Arc<dyn Crypto>)
            })
            .collect::<Result<Vec<_>, CryptoError>>()?;

        info!(providers = providers.len(), "Crypto providers configured");
        Ok(CompositeCrypto::new(providers))
    }
}

/// One [`SymmetricCrypto`] entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Shown in diagnostics only.
    pub label: Option<String>,
    pub encoding: TextEncoding,
    /// LZ4-compress plaintext before encryption.
    pub compression: bool,
    pub credentials: Vec<CredentialConfig>,
}

impl ProviderConfig {
    /// # Errors
    /// Returns [`CryptoError::DuplicateCredential`] for repeated names or defaults.
    pub fn build(&self) -> Result<SymmetricCrypto, CryptoError> {
        SymmetricCrypto::builder()
            .credentials(self.credentials.iter().map(CredentialConfig::credential))
            .cipher(AeadCipherProvider::new().compression(self.compression))
            .encoding(self.encoding)
            .build()
    }

    fn describe(&self, index: usize) -> String {
        self.label.as_ref().map_or_else(|| format!("provider #{index}"), |l| format!("provider '{l}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Omit for the provider's default credential.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Defaults to [`Algorithm::default_iv_size`].
    #[serde(default)]
    pub iv_size: Option<usize>,
    pub key: KeySource,
}

impl CredentialConfig {
    /// Turns the entry into a lazily keyed [`Credential`].
    #[must_use]
    pub fn credential(&self) -> Credential {
        let algorithm = self.algorithm;
        let iv_size = self.iv_size.unwrap_or_else(|| algorithm.default_iv_size());

        let credential = match &self.key {
            KeySource::Base64 { value } => {
                let value = Zeroizing::new(value.clone());
                Credential::new(algorithm, iv_size, move || decode_key(&value))
            }
            KeySource::Env { var } => {
                let var = var.clone();
                Credential::new(algorithm, iv_size, move || {
                    let value = Zeroizing::new(std::env::var(&var).map_err(|err| {
                        CryptoError::KeyMaterial {
                            message: format!("{var}: {err}").into(),
                            context: Some("Reading key from environment".into()),
                        }
                    })?);
                    decode_key(&value)
                })
            }
            KeySource::Derived { secret, salt, info, length } => Credential::derived(
                algorithm,
                iv_size,
                secret.as_str(),
                salt.as_str(),
                info.as_deref().or(self.name.as_deref()).unwrap_or_default(),
                length.unwrap_or_else(|| algorithm.default_key_len()),
            ),
        };

        match &self.name {
            Some(name) => credential.named(name.clone()),
            None => credential,
        }
    }
}

/// Where a credential's key bytes come from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum KeySource {
    /// Inline Base64 key.
    Base64 { value: String },
    /// Base64 key read from an environment variable on first use.
    Env { var: String },
    /// HKDF-SHA256 derivation. `info` defaults to the credential name, `length` to the
    /// algorithm's key length.
    Derived {
        secret: String,
        salt: String,
        #[serde(default)]
        info: Option<String>,
        #[serde(default)]
        length: Option<usize>,
    },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 { .. } => f.debug_struct("Base64").finish_non_exhaustive(),
            Self::Env { var } => f.debug_struct("Env").field("var", var).finish(),
            Self::Derived { info, length, .. } => f
                .debug_struct("Derived")
                .field("info", info)
                .field("length", length)
                .finish_non_exhaustive(),
        }
    }
}

fn decode_key(encoded: &str) -> Result<SecretKey, CryptoError> {
    let key = STANDARD.decode(encoded.trim()).context("Key is not valid Base64")?;
    Ok(Zeroizing::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY_32: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

    fn two_providers() -> CryptoConfig {
        serde_json::from_value(serde_json::json!({
            "providers": [
                {
                    "label": "primary",
                    "credentials": [
                        { "key": { "source": "base64", "value": KEY_32 } },
                        {
                            "name": "billing",
                            "algorithm": "chacha",
                            "key": { "source": "derived", "secret": "s", "salt": "prod" }
                        }
                    ]
                },
                {
                    "label": "legacy",
                    "encoding": "utf-16le",
                    "compression": true,
                    "credentials": [
                        { "name": "billing", "iv_size": 16, "key": { "source": "base64", "value": "AAAAAAAAAAAAAAAAAAAAAA==" } },
                        { "name": "archive", "iv_size": 16, "key": { "source": "base64", "value": "AAAAAAAAAAAAAAAAAAAAAA==" } }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg = two_providers();

        let primary = &cfg.providers[0];
        assert_eq!(primary.encoding, TextEncoding::Utf8);
        assert!(!primary.compression);
        assert_eq!(primary.credentials[0].algorithm, Algorithm::Aes);
        assert_eq!(primary.credentials[0].iv_size, None);
        assert_eq!(primary.credentials[1].algorithm, Algorithm::ChaCha20Poly1305);

        let legacy = &cfg.providers[1];
        assert_eq!(legacy.encoding, TextEncoding::Utf16Le);
        assert!(legacy.compression);
    }

    #[test]
    fn builds_providers_in_file_order() {
        let crypto = two_providers().build().unwrap();
        assert_eq!(crypto.len(), 2);

        let sealed = crypto.encrypt_text("invoice", Some("billing")).unwrap();
        assert_eq!(crypto.providers()[0].decrypt_text(&sealed, Some("billing")).unwrap(), "invoice");
        assert!(crypto.providers()[1].decrypt_text(&sealed, Some("billing")).is_err());

        let sealed = crypto.encrypt_text("old", Some("archive")).unwrap();
        assert_eq!(crypto.decrypt_text(&sealed, Some("archive")).unwrap(), "old");
        assert_eq!(crypto.decrypt_text(&crypto.encrypt_text("x", None).unwrap(), None).unwrap(), "x");
    }

    #[test]
    fn duplicate_names_are_reported_with_provider_label() {
        let mut cfg = two_providers();
        let extra = cfg.providers[1].credentials[0].clone();
        cfg.providers[1].credentials.push(extra);

        let err = cfg.build().unwrap_err();
        assert!(matches!(err, CryptoError::DuplicateCredential { .. }));
        assert!(err.to_string().contains("provider 'legacy'"));
    }

    #[test]
    fn bad_inline_keys_fail_on_first_use() {
        let cfg = CredentialConfig {
            name: None,
            algorithm: Algorithm::Aes,
            iv_size: None,
            key: KeySource::Base64 { value: "not base64!".into() },
        };
        let crypto = SymmetricCrypto::new([cfg.credential()]).unwrap();

        assert!(crypto.can_encrypt(None));
        let err = crypto.encrypt(b"x", None).unwrap_err();
        assert!(matches!(err, CryptoError::Encoding { .. }));
    }

    #[test]
    fn env_keys_are_read_lazily() {
        let cfg = CredentialConfig {
            name: Some("env".into()),
            algorithm: Algorithm::ChaCha20Poly1305,
            iv_size: Some(12),
            key: KeySource::Env { var: "KEYROUTE_TEST_UNSET_KEY".into() },
        };
        let crypto = SymmetricCrypto::new([cfg.credential()]).unwrap();
        assert!(crypto.can_encrypt(Some("env")));

        let err = crypto.encrypt(b"x", Some("env")).unwrap_err();
        assert!(matches!(err, CryptoError::KeyMaterial { .. }));
        assert!(err.to_string().contains("KEYROUTE_TEST_UNSET_KEY"));
        assert!(!crypto.credentials().resolve(Some("env")).unwrap().is_materialized());
    }

    #[test]
    fn key_sources_are_redacted_in_debug() {
        let source = KeySource::Derived {
            secret: "hunter2".into(),
            salt: "pepper".into(),
            info: None,
            length: None,
        };
        let rendered = format!("{source:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("pepper"));

        let rendered = format!("{:?}", KeySource::Base64 { value: KEY_32.into() });
        assert!(!rendered.contains(KEY_32));
    }

    #[test]
    fn loads_toml_files() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[providers]]
label = "file"

[[providers.credentials]]
name = "orders"
key = {{ source = "base64", value = "{KEY_32}" }}
"#
        )
        .unwrap();

        let cfg: CryptoConfig = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.providers.len(), 1);
        assert_eq!(cfg.providers[0].label.as_deref(), Some("file"));

        let crypto = cfg.build().unwrap();
        let sealed = crypto.encrypt_text("42", Some("orders")).unwrap();
        assert_eq!(crypto.decrypt_text(&sealed, Some("orders")).unwrap(), "42");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config::<CryptoConfig>(Some(dir.path().join("absent.toml"))).unwrap_err();

        assert!(matches!(err, CryptoError::Config { .. }));
        assert!(err.to_string().contains("Failed to build config"));
    }
}
