use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::cipher::CipherParameters;
use crate::error::{CryptoError, CryptoResult};

/// Password-based key derivation.
///
/// Implementations must be deterministic: identical arguments always yield
/// identical bytes, otherwise externally-salted ciphertext can never be
/// decrypted.
pub trait KeyDerivation: Send + Sync {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        output_len: usize,
    ) -> CryptoResult<Zeroizing<Vec<u8>>>;
}

/// Pseudo-random function used inside PBKDF2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Prf {
    /// Same output as `Rfc2898DeriveBytes` with its default settings.
    #[default]
    HmacSha1,
    HmacSha256,
}

/// PBKDF2 (RFC 8018).
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2 {
    prf: Prf,
}

impl Pbkdf2 {
    pub fn new(prf: Prf) -> Self {
        Self { prf }
    }
}

impl KeyDerivation for Pbkdf2 {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        output_len: usize,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        validate(salt, iterations, output_len)?;

        let mut out = Zeroizing::new(vec![0u8; output_len]);
        match self.prf {
            Prf::HmacSha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut out),
            Prf::HmacSha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out),
        }

        Ok(out)
    }
}

fn validate(salt: &[u8], iterations: u32, output_len: usize) -> CryptoResult<()> {
    if iterations == 0 {
        return Err(CryptoError::InvalidParameters(
            "kdf iterations must be >= 1".into(),
        ));
    }
    if salt.is_empty() {
        return Err(CryptoError::InvalidParameters("salt must not be empty".into()));
    }
    if output_len == 0 {
        return Err(CryptoError::InvalidParameters(
            "kdf output length must be >= 1".into(),
        ));
    }
    Ok(())
}

/// Key and IV for a single operation. Both are wiped on drop.
pub struct DerivedKeyMaterial {
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
}

impl DerivedKeyMaterial {
    /// Derive `key_len + iv_len` bytes in one call and split them key first.
    pub fn derive(
        kdf: &dyn KeyDerivation,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        params: CipherParameters,
    ) -> CryptoResult<Self> {
        let key_len = params.key_len();
        let okm = kdf.derive(password, salt, iterations, key_len + params.block_len())?;
        if okm.len() != key_len + params.block_len() {
            return Err(CryptoError::InvalidParameters(format!(
                "kdf returned {} bytes, expected {}",
                okm.len(),
                key_len + params.block_len()
            )));
        }

        Ok(Self {
            key: Zeroizing::new(okm[..key_len].to_vec()),
            iv: Zeroizing::new(okm[key_len..].to_vec()),
        })
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}
