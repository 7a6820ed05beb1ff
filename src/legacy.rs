//! MD5-keyed 3DES in ECB mode.
//!
//! Kept only to read data written by older tools. ECB leaks plaintext
//! structure and the output is deterministic; never use this for sensitive
//! data. New data goes through [`crate::Crypto`].

use base64::{Engine, engine::general_purpose::STANDARD};
use des::TdesEde2;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, block_padding::Pkcs7};
use md5::{Digest, Md5};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

fn derive_key(key: &str) -> Zeroizing<[u8; 16]> {
    let mut out = Zeroizing::new([0u8; 16]);
    out.copy_from_slice(&Md5::digest(key.as_bytes()));
    out
}

/// Encrypts `input` and returns Base64 text.
pub fn encrypt(input: &str, key: &str) -> CryptoResult<String> {
    let key = derive_key(key);
    let encryptor = ecb::Encryptor::<TdesEde2>::new_from_slice(&key[..])
        .map_err(|_| CryptoError::InvalidParameters("legacy key must be 16 bytes".into()))?;

    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(input.as_bytes());
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypts Base64 text produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`CryptoError::Encoding`] for malformed Base64 or non UTF-8 output
/// and [`CryptoError::PaddingValidationFailed`] for a wrong key.
pub fn decrypt(input: &str, key: &str) -> CryptoResult<String> {
    let ciphertext = STANDARD.decode(input)?;
    if ciphertext.is_empty() || ciphertext.len() % 8 != 0 {
        return Err(CryptoError::PaddingValidationFailed);
    }

    let key = derive_key(key);
    let decryptor = ecb::Decryptor::<TdesEde2>::new_from_slice(&key[..])
        .map_err(|_| CryptoError::InvalidParameters("legacy key must be 16 bytes".into()))?;

    let plaintext = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::PaddingValidationFailed)?;
    Ok(String::from_utf8(plaintext)?)
}
