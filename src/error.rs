//! Error types for encryption and decryption.

use thiserror::Error;

/// Result type for all crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while encrypting or decrypting.
///
/// No variant is retried internally: a password or salt mismatch cannot
/// succeed without different input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Rejected before any cryptographic work was done.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("envelope too short: expected at least {expected} bytes, got {actual}")]
    EnvelopeTooShort { expected: usize, actual: usize },

    /// The final block did not carry valid PKCS#7 padding. There is no
    /// integrity tag, so this is what a wrong password, a wrong salt or
    /// corrupted ciphertext looks like.
    #[error("padding validation failed: invalid password or corrupted data")]
    PaddingValidationFailed,

    #[error("corrupt plaintext: expected at least {expected} bytes of mix prefix, got {actual}")]
    CorruptPlaintext { expected: usize, actual: usize },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("OS random generator unavailable")]
    RandomUnavailable,
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::Encoding(format!("invalid base64 input: {err}"))
    }
}

impl From<std::string::FromUtf8Error> for CryptoError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        CryptoError::Encoding(format!("invalid UTF-8 text: {err}"))
    }
}
