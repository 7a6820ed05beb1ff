//! Cryptographic building blocks.
//!
//! Provides the CSPRNG source, key derivation, the block cipher strategy and
//! the envelope layout.

pub mod cipher;
pub mod envelope;
pub mod kdf;
pub mod random;

pub use cipher::{CipherAlgorithm, CipherParameters, PaddingMode};
pub use envelope::Envelope;
pub use kdf::{DerivedKeyMaterial, KeyDerivation, Pbkdf2, Prf};
pub use random::{OsRandom, RandomSource};

/// Default PBKDF2 iteration count, and the lowest one used without a warning.
pub const MIN_RECOMMENDED_ITERATIONS: u32 = 1000;
/// Default length of the random salt in self-salted envelopes.
pub const DEFAULT_SALT_LEN: usize = 8;
/// Default length of the random plaintext prefix in externally-salted mode.
pub const DEFAULT_MIX_LEN: usize = 4;
/// Largest accepted salt or mix prefix length.
pub const MAX_RANDOM_LEN: usize = 1024;
/// Length of the SHA-256 digest applied to string passwords.
pub const PASSWORD_HASH_LEN: usize = 32;
