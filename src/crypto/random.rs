use crate::error::{CryptoError, CryptoResult};
use getrandom::fill;

/// Source of unpredictable bytes for salts and mix prefixes.
///
/// Implementations are shared between threads, so they must be safe to call
/// concurrently.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` completely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> CryptoResult<()>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> CryptoResult<()> {
        fill(buf).map_err(|_| CryptoError::RandomUnavailable)
    }
}

/// Allocate `len` random bytes from `rng`.
pub fn random_bytes(rng: &dyn RandomSource, len: usize) -> CryptoResult<Vec<u8>> {
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)?;
    Ok(buf)
}
