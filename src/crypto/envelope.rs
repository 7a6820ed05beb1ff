//! Byte layouts of encrypted messages.
//!
//! Self-salted envelope:
//! ```text
//! SALT (salt_size) | IV (block_size / 8) | CIPHERTEXT
//! ```
//!
//! Externally-salted payloads are bare ciphertext. Their plaintext carries a
//! random mix prefix instead:
//! ```text
//! MIX (mix_size) | PLAINTEXT
//! ```

use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// A parsed self-salted envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    salt: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn new(salt: Vec<u8>, iv: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            iv,
            ciphertext,
        }
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Length of the serialized envelope.
    pub fn len(&self) -> usize {
        self.salt.len() + self.iv.len() + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());

        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&self.ciphertext);

        buf
    }

    /// Splits `data` into salt, IV and ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EnvelopeTooShort`] when `data` cannot hold the
    /// salt and the IV, including header lengths that overflow `usize`.
    pub fn from_bytes(data: &[u8], salt_size: usize, iv_len: usize) -> CryptoResult<Self> {
        let header_len = salt_size
            .checked_add(iv_len)
            .filter(|&len| len <= data.len())
            .ok_or(CryptoError::EnvelopeTooShort {
                expected: salt_size.saturating_add(iv_len),
                actual: data.len(),
            })?;

        let (header, ciphertext) = data.split_at(header_len);
        let (salt, iv) = header.split_at(salt_size);

        Ok(Self::new(salt.to_vec(), iv.to_vec(), ciphertext.to_vec()))
    }
}

/// Returns `mix || plaintext`.
pub fn prepend_mix(mix: &[u8], plaintext: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(mix.len() + plaintext.len()));
    buf.extend_from_slice(mix);
    buf.extend_from_slice(plaintext);
    buf
}

/// Drops the first `mix_size` bytes of a decrypted buffer.
pub fn strip_mix(decrypted: &[u8], mix_size: usize) -> CryptoResult<Vec<u8>> {
    if decrypted.len() < mix_size {
        return Err(CryptoError::CorruptPlaintext {
            expected: mix_size,
            actual: decrypted.len(),
        });
    }
    Ok(decrypted[mix_size..].to_vec())
}
