use keyroute_crypto::cipher::{Decryptor, Encryptor};
use keyroute_crypto::prelude::*;

/// Single-provider façade with an AES default credential and two named ones.
/// # Panics
/// * If the credential set is rejected.
#[must_use]
pub fn setup_crypto() -> SymmetricCrypto {
    SymmetricCrypto::builder()
        .credential(Credential::from_key(Algorithm::Aes, 16, [0u8; 16]))
        .credential(
            Credential::derived(Algorithm::ChaCha20Poly1305, 12, "master-secret", "salt", "billing", 32)
                .named("billing"),
        )
        .credential(Credential::from_key(Algorithm::Aes, 12, [7u8; 32]).named("reports"))
        .build()
        .expect("Crypto setup failed")
}

/// AES provider holding one credential per name, all keyed with `seed`.
/// # Panics
/// * If `names` contains duplicates.
#[must_use]
pub fn provider_for(names: &[&str], seed: u8) -> SymmetricCrypto {
    SymmetricCrypto::new(
        names.iter().map(|name| Credential::from_key(Algorithm::Aes, 12, [seed; 32]).named(*name)),
    )
    .expect("Provider setup failed")
}

/// Claims its names for encryption only.
#[derive(Debug)]
pub struct EncryptOnly(pub SymmetricCrypto);

impl Crypto for EncryptOnly {
    fn can_encrypt(&self, name: Option<&str>) -> bool {
        self.0.can_encrypt(name)
    }

    fn can_decrypt(&self, _name: Option<&str>) -> bool {
        false
    }

    fn encryptor(&self, name: Option<&str>) -> Result<Encryptor, CryptoError> {
        self.0.encryptor(name)
    }

    fn decryptor(&self, _name: Option<&str>) -> Result<Decryptor, CryptoError> {
        Err("encrypt-only provider".into())
    }
}
