use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{
    BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, block_padding::Pkcs7,
};
use des::TdesEde3;

use crate::error::{CryptoError, CryptoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingMode {
    Pkcs7,
}

/// Sizes of the selected cipher. They decide how many bytes the KDF has to
/// produce and where the IV ends inside a self-salted envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherParameters {
    pub key_size_bits: usize,
    pub block_size_bits: usize,
    pub padding: PaddingMode,
}

impl CipherParameters {
    pub fn key_len(&self) -> usize {
        self.key_size_bits >> 3
    }

    pub fn block_len(&self) -> usize {
        self.block_size_bits >> 3
    }
}

/// Block ciphers available in CBC mode with PKCS#7 padding.
///
/// Every call builds its own transform from the given key and IV, so one
/// algorithm value can be used from any number of threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CipherAlgorithm {
    Aes128,
    Aes192,
    #[default]
    Aes256,
    /// Three-key 3DES (EDE).
    TripleDes,
}

impl CipherAlgorithm {
    pub fn parameters(&self) -> CipherParameters {
        let (key_size_bits, block_size_bits) = match self {
            CipherAlgorithm::Aes128 => (128, 128),
            CipherAlgorithm::Aes192 => (192, 128),
            CipherAlgorithm::Aes256 => (256, 128),
            CipherAlgorithm::TripleDes => (192, 64),
        };
        CipherParameters {
            key_size_bits,
            block_size_bits,
            padding: PaddingMode::Pkcs7,
        }
    }

    /// Pads `plaintext` with PKCS#7 and encrypts it in CBC mode.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameters`] when `key` or `iv` does not
    /// match [`CipherAlgorithm::parameters`].
    pub fn encrypt(&self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        match self {
            CipherAlgorithm::Aes128 => cbc_encrypt::<Aes128>(key, iv, plaintext),
            CipherAlgorithm::Aes192 => cbc_encrypt::<Aes192>(key, iv, plaintext),
            CipherAlgorithm::Aes256 => cbc_encrypt::<Aes256>(key, iv, plaintext),
            CipherAlgorithm::TripleDes => cbc_encrypt::<TdesEde3>(key, iv, plaintext),
        }
    }

    /// Fails with [`CryptoError::PaddingValidationFailed`] when the input is
    /// not a whole number of blocks or the last block is badly padded.
    pub fn decrypt(&self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let block_len = self.parameters().block_len();
        if ciphertext.is_empty() || ciphertext.len() % block_len != 0 {
            return Err(CryptoError::PaddingValidationFailed);
        }

        match self {
            CipherAlgorithm::Aes128 => cbc_decrypt::<Aes128>(key, iv, ciphertext),
            CipherAlgorithm::Aes192 => cbc_decrypt::<Aes192>(key, iv, ciphertext),
            CipherAlgorithm::Aes256 => cbc_decrypt::<Aes256>(key, iv, ciphertext),
            CipherAlgorithm::TripleDes => cbc_decrypt::<TdesEde3>(key, iv, ciphertext),
        }
    }
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let encryptor =
        cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| bad_lengths(key, iv))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let decryptor =
        cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| bad_lengths(key, iv))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::PaddingValidationFailed)
}

fn bad_lengths(key: &[u8], iv: &[u8]) -> CryptoError {
    CryptoError::InvalidParameters(format!(
        "key length {} or iv length {} does not fit the cipher",
        key.len(),
        iv.len()
    ))
}
