//! Password-based symmetric encryption with salted key derivation.
//!
//! A [`Crypto`] turns a block cipher and a password into encrypt/decrypt
//! calls over bytes and strings. Two message shapes are supported:
//!
//! - **self-salted**: a fresh random salt and IV travel in front of the
//!   ciphertext (`salt || iv || ciphertext`), so the password is all the
//!   receiver needs.
//! - **externally-salted**: the caller supplies the salt out-of-band, key and
//!   IV are derived from password and salt, and a short random prefix is
//!   mixed into the plaintext so equal inputs still encrypt differently.
//!
//! There is no authentication tag. A wrong password, a wrong salt or a
//! corrupted message shows up as [`CryptoError::PaddingValidationFailed`]
//! in most cases, not in all of them.

mod config;
pub mod crypto;
mod error;
pub mod legacy;
mod storage;

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

pub use crate::config::{CryptoConfig, TextEncoding};
pub use crate::crypto::{
    CipherAlgorithm, CipherParameters, KeyDerivation, OsRandom, Pbkdf2, Prf, RandomSource,
};
pub use crate::error::{CryptoError, CryptoResult};
pub use crate::storage::OutputFile;
use crate::crypto::envelope::{self, Envelope};
use crate::crypto::random::random_bytes;
use crate::crypto::{DerivedKeyMaterial, PASSWORD_HASH_LEN};

/// Encrypts and decrypts with one cipher and one set of KDF settings.
///
/// Holds no per-call state; a single value can be shared between threads.
#[derive(Clone)]
pub struct Crypto {
    config: CryptoConfig,
    rng: Arc<dyn RandomSource>,
    kdf: Arc<dyn KeyDerivation>,
}

impl std::fmt::Debug for Crypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crypto")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Crypto {
    fn default() -> Self {
        Self::new(CipherAlgorithm::default())
    }
}

impl Crypto {
    /// Default settings for `algorithm`: 1000 PBKDF2-HMAC-SHA1 iterations,
    /// 8 byte salt, 4 byte mix prefix, UTF-8 text.
    pub fn new(algorithm: CipherAlgorithm) -> Self {
        let config = CryptoConfig::with_algorithm(algorithm);
        Self {
            config,
            rng: Arc::new(OsRandom),
            kdf: Arc::new(Pbkdf2::new(config.prf())),
        }
    }

    /// Uses `config` with the OS CSPRNG and PBKDF2 over `config.prf()`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameters`] if `config` fails
    /// [`CryptoConfig::validate`].
    pub fn with_config(config: CryptoConfig) -> CryptoResult<Self> {
        Self::with_collaborators(
            config,
            Arc::new(OsRandom),
            Arc::new(Pbkdf2::new(config.prf())),
        )
    }

    /// Uses the given random source and key derivation instead of the OS
    /// CSPRNG and PBKDF2. The `prf` setting of `config` is ignored.
    pub fn with_collaborators(
        config: CryptoConfig,
        rng: Arc<dyn RandomSource>,
        kdf: Arc<dyn KeyDerivation>,
    ) -> CryptoResult<Self> {
        config.validate()?;
        Ok(Self { config, rng, kdf })
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn parameters(&self) -> CipherParameters {
        self.config.algorithm().parameters()
    }

    /// Encrypts into a self-salted envelope: `salt || iv || ciphertext`.
    pub fn encrypt_bytes(&self, plaintext: &[u8], password: &[u8]) -> CryptoResult<Vec<u8>> {
        let salt = random_bytes(self.rng.as_ref(), self.config.salt_size())?;
        let material = self.derive(password, &salt)?;

        let ciphertext = self
            .config
            .algorithm()
            .encrypt(material.key(), material.iv(), plaintext)?;

        let envelope = Envelope::new(salt, material.iv().to_vec(), ciphertext);
        tracing::debug!(
            algorithm = ?self.config.algorithm(),
            plaintext_len = plaintext.len(),
            envelope_len = envelope.len(),
            "encrypted self-salted envelope"
        );
        Ok(envelope.to_bytes())
    }

    /// Decrypts a self-salted envelope.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::EnvelopeTooShort`] if `data` cannot hold salt and IV;
    ///   no key derivation happens in that case.
    /// - [`CryptoError::PaddingValidationFailed`] for a wrong password or
    ///   corrupted data.
    pub fn decrypt_bytes(
        &self,
        data: &[u8],
        password: &[u8],
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let envelope = Envelope::from_bytes(
            data,
            self.config.salt_size(),
            self.parameters().block_len(),
        )?;

        // The IV comes from the envelope, only the key is taken from the KDF.
        let material = self.derive(password, envelope.salt())?;
        let plaintext = self
            .config
            .algorithm()
            .decrypt(material.key(), envelope.iv(), envelope.ciphertext())
            .inspect_err(|e| tracing::debug!(error = %e, "self-salted decrypt failed"))?;

        tracing::debug!(envelope_len = data.len(), "decrypted self-salted envelope");
        Ok(Zeroizing::new(plaintext))
    }

    /// Encrypts with a caller supplied salt. Only the ciphertext is returned;
    /// the same salt must be passed to [`Crypto::decrypt_bytes_with_salt`].
    pub fn encrypt_bytes_with_salt(
        &self,
        plaintext: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let material = self.derive(password, salt)?;

        let mix = Zeroizing::new(random_bytes(self.rng.as_ref(), self.config.mix_size())?);
        let mixed = envelope::prepend_mix(&mix, plaintext);

        let ciphertext = self
            .config
            .algorithm()
            .encrypt(material.key(), material.iv(), &mixed)?;

        tracing::debug!(
            algorithm = ?self.config.algorithm(),
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "encrypted with external salt"
        );
        Ok(ciphertext)
    }

    /// Decrypts ciphertext from [`Crypto::encrypt_bytes_with_salt`] and drops
    /// the random mix prefix.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidParameters`] for an empty salt.
    /// - [`CryptoError::PaddingValidationFailed`] for a wrong password, a wrong
    ///   salt or corrupted data.
    /// - [`CryptoError::CorruptPlaintext`] if the decrypted bytes are shorter
    ///   than the mix prefix.
    pub fn decrypt_bytes_with_salt(
        &self,
        ciphertext: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let material = self.derive(password, salt)?;

        let decrypted = Zeroizing::new(
            self.config
                .algorithm()
                .decrypt(material.key(), material.iv(), ciphertext)
                .inspect_err(|e| tracing::debug!(error = %e, "externally-salted decrypt failed"))?,
        );

        Ok(Zeroizing::new(envelope::strip_mix(&decrypted, self.config.mix_size())?))
    }

    /// Self-salted encryption of text. Returns the envelope as Base64.
    pub fn encrypt_string(&self, input: &str, password: &str) -> CryptoResult<String> {
        let encoding = self.config.encoding();
        let plaintext = Zeroizing::new(encoding.encode(input));
        let password = self.hash_password(password);

        let envelope = self.encrypt_bytes(&plaintext, &password[..])?;
        Ok(STANDARD.encode(envelope))
    }

    /// Decrypts Base64 text from [`Crypto::encrypt_string`].
    ///
    /// # Errors
    ///
    /// Same as [`Crypto::decrypt_bytes`], plus [`CryptoError::Encoding`] for
    /// malformed Base64 or plaintext that is not valid in the configured
    /// encoding.
    pub fn decrypt_string(&self, input: &str, password: &str) -> CryptoResult<Zeroizing<String>> {
        let data = STANDARD.decode(input)?;
        let password = self.hash_password(password);

        let mut plaintext = self.decrypt_bytes(&data, &password[..])?;
        let text = self.config.encoding().decode(std::mem::take(&mut *plaintext))?;
        Ok(Zeroizing::new(text))
    }

    /// Externally-salted encryption of text. Returns the ciphertext as Base64.
    pub fn encrypt_string_with_salt(
        &self,
        input: &str,
        password: &str,
        salt: &str,
    ) -> CryptoResult<String> {
        let encoding = self.config.encoding();
        let plaintext = Zeroizing::new(encoding.encode(input));
        let password = self.hash_password(password);

        let ciphertext =
            self.encrypt_bytes_with_salt(&plaintext, &password[..], &encoding.encode(salt))?;
        Ok(STANDARD.encode(ciphertext))
    }

    /// Decrypts Base64 text from [`Crypto::encrypt_string_with_salt`].
    ///
    /// # Errors
    ///
    /// Same as [`Crypto::decrypt_bytes_with_salt`], plus
    /// [`CryptoError::Encoding`] for malformed Base64 or undecodable text.
    pub fn decrypt_string_with_salt(
        &self,
        input: &str,
        password: &str,
        salt: &str,
    ) -> CryptoResult<Zeroizing<String>> {
        let encoding = self.config.encoding();
        let ciphertext = STANDARD.decode(input)?;
        let password = self.hash_password(password);

        let mut plaintext =
            self.decrypt_bytes_with_salt(&ciphertext, &password[..], &encoding.encode(salt))?;
        let text = encoding.decode(std::mem::take(&mut *plaintext))?;
        Ok(Zeroizing::new(text))
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> CryptoResult<DerivedKeyMaterial> {
        DerivedKeyMaterial::derive(
            self.kdf.as_ref(),
            password,
            salt,
            self.config.iterations(),
            self.parameters(),
        )
    }

    /// String passwords are hashed once before they reach the KDF.
    fn hash_password(&self, password: &str) -> Zeroizing<[u8; PASSWORD_HASH_LEN]> {
        let encoded = Zeroizing::new(self.config.encoding().encode(password));
        let mut out = Zeroizing::new([0u8; PASSWORD_HASH_LEN]);
        out.copy_from_slice(&Sha256::digest(&encoded[..]));
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU8, Ordering};

    use super::*;

    /// Hands out 0, 1, 2, ... so generated salts and mixes are predictable.
    #[derive(Default)]
    struct CountingRandom(AtomicU8);

    impl RandomSource for CountingRandom {
        fn fill(&self, buf: &mut [u8]) -> CryptoResult<()> {
            for b in buf.iter_mut() {
                *b = self.0.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        }
    }

    struct ConstantRandom(u8);

    impl RandomSource for ConstantRandom {
        fn fill(&self, buf: &mut [u8]) -> CryptoResult<()> {
            buf.fill(self.0);
            Ok(())
        }
    }

    struct BrokenRandom;

    impl RandomSource for BrokenRandom {
        fn fill(&self, _buf: &mut [u8]) -> CryptoResult<()> {
            Err(CryptoError::RandomUnavailable)
        }
    }

    fn with_rng(rng: impl RandomSource + 'static) -> Crypto {
        Crypto::with_collaborators(
            CryptoConfig::default(),
            Arc::new(rng),
            Arc::new(Pbkdf2::default()),
        )
        .unwrap()
    }

    #[test]
    fn hello_world_envelope_is_40_bytes() {
        let crypto = with_rng(ConstantRandom(0xAA));

        let envelope = crypto.encrypt_bytes(b"Hello, World!", b"correct horse").unwrap();
        assert_eq!(envelope.len(), 8 + 16 + 16);

        let plaintext = crypto.decrypt_bytes(&envelope, b"correct horse").unwrap();
        assert_eq!(*plaintext, b"Hello, World!");

        assert_eq!(
            crypto.decrypt_bytes(&envelope, b"wrong"),
            Err(CryptoError::PaddingValidationFailed)
        );
    }

    #[test]
    fn envelope_starts_with_generated_salt_and_derived_iv() {
        let crypto = with_rng(CountingRandom::default());
        let envelope = crypto.encrypt_bytes(b"data", b"pw").unwrap();

        assert_eq!(&envelope[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);

        let material = DerivedKeyMaterial::derive(
            &Pbkdf2::default(),
            b"pw",
            &envelope[..8],
            1000,
            crypto.parameters(),
        )
        .unwrap();
        assert_eq!(&envelope[8..24], material.iv());
    }

    #[test]
    fn injected_rng_makes_output_repeatable() {
        let crypto = with_rng(ConstantRandom(0xAA));

        let a = crypto.encrypt_bytes(b"same", b"pw").unwrap();
        let b = crypto.encrypt_bytes(b"same", b"pw").unwrap();
        assert_eq!(a, b);

        let a = crypto.encrypt_bytes_with_salt(b"same", b"pw", b"salt").unwrap();
        let b = crypto.encrypt_bytes_with_salt(b"same", b"pw", b"salt").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rng_failure_propagates() {
        let crypto = with_rng(BrokenRandom);
        assert_eq!(
            crypto.encrypt_bytes(b"data", b"pw"),
            Err(CryptoError::RandomUnavailable)
        );
    }

    #[test]
    fn short_envelope_fails_before_kdf() {
        struct PanickingKdf;

        impl KeyDerivation for PanickingKdf {
            fn derive(
                &self,
                _: &[u8],
                _: &[u8],
                _: u32,
                _: usize,
            ) -> CryptoResult<Zeroizing<Vec<u8>>> {
                panic!("kdf must not run for a short envelope");
            }
        }

        let crypto = Crypto::with_collaborators(
            CryptoConfig::default(),
            Arc::new(OsRandom),
            Arc::new(PanickingKdf),
        )
        .unwrap();

        assert_eq!(
            crypto.decrypt_bytes(&[0u8; 23], b"pw"),
            Err(CryptoError::EnvelopeTooShort {
                expected: 24,
                actual: 23
            })
        );
    }

    #[test]
    fn external_salt_payload_is_ciphertext_only() {
        let crypto = Crypto::default();
        // 4 byte mix + 2 byte text fits one block.
        let ciphertext = crypto.encrypt_bytes_with_salt(b"42", b"pw", b"s1").unwrap();
        assert_eq!(ciphertext.len(), 16);

        let plaintext = crypto.decrypt_bytes_with_salt(&ciphertext, b"pw", b"s1").unwrap();
        assert_eq!(*plaintext, b"42");
    }

    #[test]
    fn wrong_external_salt_fails() {
        let crypto = Crypto::default();
        let encrypted = crypto.encrypt_string_with_salt("42", "pw", "s1").unwrap();

        let result = crypto.decrypt_string_with_salt(&encrypted, "pw", "s2");
        assert!(result.map(|s| *s != "42").unwrap_or(true));
    }

    #[test]
    fn empty_external_salt_is_invalid() {
        let crypto = Crypto::default();
        assert!(matches!(
            crypto.encrypt_string_with_salt("42", "pw", ""),
            Err(CryptoError::InvalidParameters(_))
        ));
    }

    #[test]
    fn truncated_mix_is_corrupt_plaintext() {
        let crypto = Crypto::default();
        let material = crypto.derive(b"pw", b"salt").unwrap();

        // Valid padding around fewer bytes than the mix prefix.
        let ciphertext = CipherAlgorithm::Aes256
            .encrypt(material.key(), material.iv(), &[1, 2])
            .unwrap();

        assert_eq!(
            crypto.decrypt_bytes_with_salt(&ciphertext, b"pw", b"salt"),
            Err(CryptoError::CorruptPlaintext {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn zero_mix_matches_raw_cipher_output() {
        let config = CryptoConfig::new(
            CipherAlgorithm::Aes256,
            1000,
            8,
            0,
            Prf::HmacSha1,
            TextEncoding::Utf8,
        )
        .unwrap();
        let crypto = Crypto::with_config(config).unwrap();
        let material = crypto.derive(b"pw", b"salt").unwrap();

        let expected = CipherAlgorithm::Aes256
            .encrypt(material.key(), material.iv(), b"raw")
            .unwrap();
        assert_eq!(
            crypto.encrypt_bytes_with_salt(b"raw", b"pw", b"salt").unwrap(),
            expected
        );
    }

    #[test]
    fn string_roundtrip_for_every_algorithm() {
        for algorithm in [
            CipherAlgorithm::Aes128,
            CipherAlgorithm::Aes192,
            CipherAlgorithm::Aes256,
            CipherAlgorithm::TripleDes,
        ] {
            let crypto = Crypto::new(algorithm);

            let encrypted = crypto.encrypt_string("grüße", "pw").unwrap();
            assert_eq!(*crypto.decrypt_string(&encrypted, "pw").unwrap(), "grüße");

            let encrypted = crypto.encrypt_string_with_salt("grüße", "pw", "salt").unwrap();
            assert_eq!(
                *crypto.decrypt_string_with_salt(&encrypted, "pw", "salt").unwrap(),
                "grüße"
            );
        }
    }

    #[test]
    fn triple_des_envelope_uses_8_byte_iv() {
        let crypto = Crypto::new(CipherAlgorithm::TripleDes);
        let envelope = crypto.encrypt_bytes(b"abc", b"pw").unwrap();
        assert_eq!(envelope.len(), 8 + 8 + 8);
    }

    #[test]
    fn string_api_hashes_password() {
        let crypto = Crypto::default();
        let encrypted = crypto.encrypt_string("text", "pw").unwrap();
        let envelope = STANDARD.decode(&encrypted).unwrap();

        let hashed = Sha256::digest(b"pw");
        assert_eq!(*crypto.decrypt_bytes(&envelope, &hashed).unwrap(), b"text");
        assert!(crypto.decrypt_bytes(&envelope, b"pw").map(|p| *p != b"text").unwrap_or(true));
    }

    #[test]
    fn utf16_text_roundtrip() {
        let config = CryptoConfig::new(
            CipherAlgorithm::Aes128,
            1000,
            8,
            4,
            Prf::HmacSha256,
            TextEncoding::Utf16Le,
        )
        .unwrap();
        let crypto = Crypto::with_config(config).unwrap();

        let encrypted = crypto.encrypt_string("text", "pw").unwrap();
        assert_eq!(*crypto.decrypt_string(&encrypted, "pw").unwrap(), "text");
    }

    #[test]
    fn malformed_base64_is_encoding_error() {
        let crypto = Crypto::default();
        assert!(matches!(
            crypto.decrypt_string("***", "pw"),
            Err(CryptoError::Encoding(_))
        ));
        assert!(matches!(
            crypto.decrypt_string_with_salt("***", "pw", "salt"),
            Err(CryptoError::Encoding(_))
        ));
    }
}
