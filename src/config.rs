use crate::crypto::{
    CipherAlgorithm, DEFAULT_MIX_LEN, DEFAULT_SALT_LEN, MAX_RANDOM_LEN,
    MIN_RECOMMENDED_ITERATIONS, Prf,
};
use crate::error::{CryptoError, CryptoResult};

/// How strings are turned into bytes before encryption and back afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
}

impl TextEncoding {
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    pub fn decode(&self, bytes: Vec<u8>) -> CryptoResult<String> {
        match self {
            TextEncoding::Utf8 => Ok(String::from_utf8(bytes)?),
            TextEncoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(CryptoError::Encoding(
                        "odd number of bytes in UTF-16 text".into(),
                    ));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units)
                    .map_err(|e| CryptoError::Encoding(format!("invalid UTF-16 text: {e}")))
            }
        }
    }
}

/// Settings shared by every call on a [`crate::Crypto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoConfig {
    algorithm: CipherAlgorithm,
    iterations: u32,
    salt_size: usize,
    mix_size: usize,
    prf: Prf,
    encoding: TextEncoding,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            algorithm: CipherAlgorithm::default(),
            iterations: MIN_RECOMMENDED_ITERATIONS,
            salt_size: DEFAULT_SALT_LEN,
            mix_size: DEFAULT_MIX_LEN,
            prf: Prf::default(),
            encoding: TextEncoding::default(),
        }
    }
}

impl CryptoConfig {
    pub fn new(
        algorithm: CipherAlgorithm,
        iterations: u32,
        salt_size: usize,
        mix_size: usize,
        prf: Prf,
        encoding: TextEncoding,
    ) -> CryptoResult<Self> {
        let config = Self {
            algorithm,
            iterations,
            salt_size,
            mix_size,
            prf,
            encoding,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default settings with a different cipher.
    pub fn with_algorithm(algorithm: CipherAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn salt_size(&self) -> usize {
        self.salt_size
    }

    pub fn mix_size(&self) -> usize {
        self.mix_size
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Checks the settings before any key is derived.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameters`] when the iteration count is
    /// zero, or when the salt or mix size is outside `1..=1024` (`0..=1024`
    /// for the mix).
    pub fn validate(&self) -> CryptoResult<()> {
        if self.iterations < 1 {
            return Err(CryptoError::InvalidParameters(
                "iterations must be >= 1".into(),
            ));
        }
        if self.salt_size < 1 {
            return Err(CryptoError::InvalidParameters(
                "salt size must be >= 1".into(),
            ));
        }
        if self.salt_size > MAX_RANDOM_LEN {
            return Err(CryptoError::InvalidParameters(format!(
                "salt size must be <= {MAX_RANDOM_LEN}"
            )));
        }
        if self.mix_size > MAX_RANDOM_LEN {
            return Err(CryptoError::InvalidParameters(format!(
                "mix size must be <= {MAX_RANDOM_LEN}"
            )));
        }
        if self.iterations < MIN_RECOMMENDED_ITERATIONS {
            tracing::warn!(
                iterations = self.iterations,
                recommended = MIN_RECOMMENDED_ITERATIONS,
                "kdf iteration count below recommended minimum"
            );
        }
        Ok(())
    }
}
