//! AEAD-backed [`CipherProvider`].
//!
//! Sealed payloads share one layout for every algorithm:
//!
//! ```text
//! [V(1)][FLAGS(1)][NONCE(iv_size)][CIPHERTEXT(N)][TAG(16)]
//! ```
//!
//! The nonce is random per encryption. When compression is enabled the plaintext is
//! LZ4-compressed before encryption and `FLAGS` records it, so any provider instance can
//! open any payload regardless of its own compression setting.

use super::{CipherEngine, CipherProvider};
use crate::credential::{Algorithm, Credential};
use crate::error::{CryptoError, describe_name};
use aead::consts::U16;
use aead::inout::InOutBuf;
use aead::{AeadInOut, Key, KeyInit, Nonce, Tag};
use aes_gcm::aes::{Aes128, Aes256};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use chacha20poly1305::ChaCha20Poly1305;
use getrandom::fill;
use std::fmt;

/// AES-128-GCM with a 128-bit nonce.
type Aes128Gcm16 = AesGcm<Aes128, U16>;
/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Payload header version.
const PAYLOAD_VERSION_V1: u8 = 1;

/// Header layout: `[version: u8][flags: u8]`
const HEADER_LEN: usize = 2;

/// Flag bit: plaintext was compressed before encryption.
const FLAG_COMPRESSED: u8 = 1 << 0;

trait AeadCipher: AeadInOut + KeyInit + Send + Sync + 'static {}
impl<T: AeadInOut + KeyInit + Send + Sync + 'static> AeadCipher for T {}

/// Default cipher provider: AES-GCM and ChaCha20-Poly1305.
///
/// | Algorithm            | Key bytes | IV bytes |
/// |----------------------|-----------|----------|
/// | `Aes`                | 16 or 32  | 12 or 16 |
/// | `ChaCha20Poly1305`   | 32        | 12       |
///
/// Any other combination is rejected with [`CryptoError::InvalidKey`] when a handle is minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AeadCipherProvider {
    compression: bool,
}

impl AeadCipherProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self { compression: false }
    }

    /// Toggles LZ4 compression of plaintext before encryption.
    ///
    /// Compression leaks information through ciphertext length when an attacker both
    /// influences the plaintext and observes the output size. Keep it off for
    /// attacker-controlled inputs.
    #[must_use]
    pub const fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    #[must_use]
    pub const fn is_compressing(&self) -> bool {
        self.compression
    }
}

impl CipherProvider for AeadCipherProvider {
    fn engine(&self, credential: &Credential) -> Result<Box<dyn CipherEngine>, CryptoError> {
        let key = credential.key()?;
        let compress = self.compression;

        let engine = match (credential.algorithm(), key.len(), credential.iv_size()) {
            (Algorithm::Aes, 16, 12) => AeadEngine::<Aes128Gcm>::boxed(key, compress, "aes-128-gcm"),
            (Algorithm::Aes, 16, 16) => AeadEngine::<Aes128Gcm16>::boxed(key, compress, "aes-128-gcm"),
            (Algorithm::Aes, 32, 12) => AeadEngine::<Aes256Gcm>::boxed(key, compress, "aes-256-gcm"),
            (Algorithm::Aes, 32, 16) => AeadEngine::<Aes256Gcm16>::boxed(key, compress, "aes-256-gcm"),
            (Algorithm::ChaCha20Poly1305, 32, 12) => {
                AeadEngine::<ChaCha20Poly1305>::boxed(key, compress, "chacha20-poly1305")
            }
            (algorithm, key_len, iv_size) => Err(CryptoError::InvalidKey {
                message: format!(
                    "{algorithm} does not support a {key_len}-byte key with a {iv_size}-byte IV"
                )
                .into(),
                context: Some(describe_name(credential.name())),
            }),
        }?;

        Ok(engine)
    }
}

struct AeadEngine<C: AeadCipher> {
    cipher: C,
    nonce_len: usize,
    tag_len: usize,
    compression: bool,
    label: &'static str,
}

impl<C: AeadCipher> AeadEngine<C> {
    fn boxed(
        key: &[u8],
        compression: bool,
        label: &'static str,
    ) -> Result<Box<dyn CipherEngine>, CryptoError> {
        let key = Key::<C>::try_from(key).map_err(|_| CryptoError::InvalidKey {
            message: format!("Invalid key length {}", key.len()).into(),
            context: Some(label.into()),
        })?;

        Ok(Box::new(Self {
            cipher: C::new(&key),
            nonce_len: Nonce::<C>::default().len(),
            tag_len: Tag::<C>::default().len(),
            compression,
            label,
        }))
    }

    fn next_nonce() -> Result<Nonce<C>, CryptoError> {
        let mut nonce = Nonce::<C>::default();
        fill(&mut nonce).map_err(|e| CryptoError::Encryption {
            message: "System RNG unavailable for nonce generation".into(),
            context: Some(e.to_string().into()),
        })?;
        Ok(nonce)
    }
}

impl<C: AeadCipher> CipherEngine for AeadEngine<C> {
    fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let compressed = if self.compression { lz4_flex::compress_prepend_size(plain) } else { Vec::new() };
        let data = if self.compression { compressed.as_slice() } else { plain };
        let flags = if self.compression { FLAG_COMPRESSED } else { 0 };

        let nonce = Self::next_nonce()?;

        let mut buf = Vec::with_capacity(HEADER_LEN + self.nonce_len + data.len() + self.tag_len);
        buf.push(PAYLOAD_VERSION_V1);
        buf.push(flags);
        buf.extend_from_slice(&nonce);
        buf.extend_from_slice(data);

        let body = &mut buf[HEADER_LEN + self.nonce_len..];
        let tag = self.cipher.encrypt_inout_detached(&nonce, &[], InOutBuf::from(body)).map_err(
            |_| CryptoError::Encryption {
                message: "Encryption failed".into(),
                context: Some(self.label.into()),
            },
        )?;

        buf.extend_from_slice(tag.as_slice());
        Ok(buf)
    }

    fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let min_len = HEADER_LEN + self.nonce_len + self.tag_len;
        if sealed.len() < min_len {
            return Err(CryptoError::InvalidPayload {
                message: format!(
                    "Payload too short ({} bytes). Expected at least {min_len} bytes",
                    sealed.len()
                )
                .into(),
                context: Some(self.label.into()),
            });
        }

        let (version, flags) = (sealed[0], sealed[1]);
        if version != PAYLOAD_VERSION_V1 {
            return Err(CryptoError::InvalidPayload {
                message: "Unsupported payload version".into(),
                context: Some(format!("version={version}").into()),
            });
        }

        let (nonce, rest) = sealed[HEADER_LEN..].split_at(self.nonce_len);
        let (ciphertext, tag) = rest.split_at(rest.len() - self.tag_len);

        let nonce = Nonce::<C>::try_from(nonce).map_err(|_| CryptoError::Decryption {
            message: "Invalid nonce length".into(),
            context: Some(self.label.into()),
        })?;
        let tag = Tag::<C>::try_from(tag).map_err(|_| CryptoError::Decryption {
            message: "Invalid tag length".into(),
            context: Some(self.label.into()),
        })?;

        let mut buf = ciphertext.to_vec();
        self.cipher
            .decrypt_inout_detached(&nonce, &[], InOutBuf::from(buf.as_mut_slice()), &tag)
            .map_err(|_| CryptoError::Decryption {
                message: "Decryption failed".into(),
                context: Some("AEAD authentication failed".into()),
            })?;

        if flags & FLAG_COMPRESSED != 0 {
            buf = lz4_flex::decompress_size_prepended(&buf).map_err(|_| {
                CryptoError::Decompression {
                    message: "Decompression failed".into(),
                    context: Some("LZ4 stream invalid".into()),
                }
            })?;
        }

        Ok(buf)
    }
}

impl<C: AeadCipher> fmt::Debug for AeadEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadEngine")
            .field("cipher", &self.label)
            .field("nonce_len", &self.nonce_len)
            .field("compression", &self.compression)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(algorithm: Algorithm, key_len: usize, iv: usize) -> Box<dyn CipherEngine> {
        let credential = Credential::from_key(algorithm, iv, vec![0x42; key_len]);
        AeadCipherProvider::new().engine(&credential).expect("supported combination")
    }

    #[test]
    fn every_supported_combination_roundtrips() {
        let cases = [
            (Algorithm::Aes, 16, 12),
            (Algorithm::Aes, 16, 16),
            (Algorithm::Aes, 32, 12),
            (Algorithm::Aes, 32, 16),
            (Algorithm::ChaCha20Poly1305, 32, 12),
        ];

        for (algorithm, key_len, iv) in cases {
            let engine = engine(algorithm, key_len, iv);
            let sealed = engine.encrypt(b"payload").unwrap();

            assert_eq!(sealed.len(), HEADER_LEN + iv + b"payload".len() + 16, "{engine:?}");
            assert_eq!(engine.decrypt(&sealed).unwrap(), b"payload");
        }
    }

    #[test]
    fn nonces_are_fresh_per_call() {
        let engine = engine(Algorithm::Aes, 32, 12);
        let first = engine.encrypt(b"same").unwrap();
        let second = engine.encrypt(b"same").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn unsupported_sizes_are_invalid_key() {
        let cases = [
            (Algorithm::Aes, 24, 12),
            (Algorithm::Aes, 32, 8),
            (Algorithm::ChaCha20Poly1305, 16, 12),
            (Algorithm::ChaCha20Poly1305, 32, 16),
        ];

        for (algorithm, key_len, iv) in cases {
            let credential = Credential::from_key(algorithm, iv, vec![0u8; key_len]).named("odd");
            let err = AeadCipherProvider::new().engine(&credential).unwrap_err();

            assert!(matches!(err, CryptoError::InvalidKey { .. }), "{err}");
            assert!(err.to_string().contains("'odd'"));
        }
    }

    #[test]
    fn compressed_payloads_set_flag_and_open_anywhere() {
        let credential = Credential::from_key(Algorithm::ChaCha20Poly1305, 12, vec![9u8; 32]);
        let compressing = AeadCipherProvider::new().compression(true).engine(&credential).unwrap();
        let plain = AeadCipherProvider::new().engine(&credential).unwrap();

        let data = vec![0u8; 512];
        let sealed = compressing.encrypt(&data).unwrap();

        assert_eq!(sealed[1] & FLAG_COMPRESSED, FLAG_COMPRESSED);
        assert!(sealed.len() < data.len());
        assert_eq!(plain.decrypt(&sealed).unwrap(), data);
    }

    #[test]
    fn tampering_is_detected() {
        let engine = engine(Algorithm::Aes, 16, 12);
        let mut sealed = engine.encrypt(b"ledger entry").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;

        assert!(matches!(engine.decrypt(&sealed), Err(CryptoError::Decryption { .. })));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let engine = engine(Algorithm::Aes, 32, 12);

        assert!(matches!(engine.decrypt(&[1, 0, 3]), Err(CryptoError::InvalidPayload { .. })));

        let mut sealed = engine.encrypt(b"x").unwrap();
        sealed[0] = 9;
        assert!(matches!(engine.decrypt(&sealed), Err(CryptoError::InvalidPayload { .. })));
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let sealed = engine(Algorithm::Aes, 32, 12).encrypt(b"secret").unwrap();
        let other = Credential::from_key(Algorithm::Aes, 12, vec![0x43; 32]);
        let other = AeadCipherProvider::new().engine(&other).unwrap();

        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Decryption { .. })));
    }

    const fn wipes_key_on_drop<C: zeroize::ZeroizeOnDrop>() {}

    #[test]
    fn every_cipher_wipes_its_key_schedule() {
        wipes_key_on_drop::<Aes128Gcm>();
        wipes_key_on_drop::<Aes128Gcm16>();
        wipes_key_on_drop::<Aes256Gcm>();
        wipes_key_on_drop::<Aes256Gcm16>();
        wipes_key_on_drop::<ChaCha20Poly1305>();
    }
}
