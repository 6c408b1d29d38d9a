//! Credential-routed symmetric encryption.
//!
//! Callers encrypt and decrypt by credential *name*. A [`SymmetricCrypto`] resolves the name
//! against its [`CredentialCache`] and hands the credential to a [`cipher::CipherProvider`];
//! a [`CompositeCrypto`] fronts several providers and routes each call to the first one
//! that claims the name for that direction.
//!
//! ## Payload Format
//!
//! The bundled [`cipher::AeadCipherProvider`] emits a versioned binary blob:
//!
//! ```text
//! [V(1)][FLAGS(1)][NONCE(iv_size)][CIPHERTEXT(N)][TAG(16)]
//! ```
//!
//! Text operations wrap that blob in standard Base64.
//!
//! ## Key Material
//!
//! Credentials carry a key factory rather than key bytes. The factory runs at most once
//! per credential, on first use, and the key is kept in zeroizing memory afterwards. A
//! failed factory call is not cached; the next use tries again.
//!
//! ## Examples
//!
//! ### Routing via Prelude
//! ```rust
//! use keyroute_crypto::prelude::*;
//!
//! # fn main() -> Result<(), CryptoError> {
//! let primary = SymmetricCrypto::new([
//!     Credential::from_key(Algorithm::Aes, 12, [9u8; 32]),
//!     Credential::from_key(Algorithm::Aes, 16, [0u8; 16]).named("legacy"),
//! ])?;
//!
//! let crypto = CompositeCrypto::builder().provider(primary).build()?;
//!
//! let sealed = crypto.encrypt_text("hello", Some("legacy"))?;
//! assert_eq!(crypto.decrypt_text(&sealed, Some("legacy"))?, "hello");
//! assert!(crypto.can_decrypt(None));
//! # Ok(())
//! # }
//! ```

mod cache;
pub mod cipher;
mod composite;
mod config;
mod credential;
mod encoding;
mod error;
mod provider;
mod symmetric;

pub use cache::CredentialCache;
pub use composite::{CompositeCrypto, CompositeCryptoBuilder};
pub use crate::config::{CredentialConfig, CryptoConfig, KeySource, ProviderConfig, load_config};
pub use credential::{Algorithm, Credential, CredentialKey, KeyFactory, SecretKey};
pub use encoding::TextEncoding;
pub use error::{CryptoError, CryptoErrorExt};
pub use provider::{Crypto, Direction};
pub use symmetric::{SymmetricCrypto, SymmetricCryptoBuilder};

pub mod prelude {
    pub use crate::cipher::{Decryptor, Encryptor};
    pub use crate::composite::CompositeCrypto;
    pub use crate::credential::{Algorithm, Credential};
    pub use crate::encoding::TextEncoding;
    pub use crate::error::{CryptoError, CryptoErrorExt};
    pub use crate::provider::{Crypto, Direction};
    pub use crate::symmetric::SymmetricCrypto;
}
