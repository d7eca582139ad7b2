//! Shared secret generation
//!
//! Secrets come from the operating system CSPRNG and are handed back in
//! zeroizing buffers so the raw bytes are wiped once the Base32 form has been
//! produced.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{SharedError, SharedResult};
use crate::utils::base32;

/// Default secret length in bytes (160 bits, the HMAC-SHA1 block-friendly size)
pub const DEFAULT_SECRET_BYTES: usize = 20;

/// Smallest secret length accepted by configuration (128 bits)
pub const MIN_SECRET_BYTES: usize = 16;

/// Generate a fresh 20-byte shared secret
pub fn generate_secret() -> SharedResult<Zeroizing<Vec<u8>>> {
    generate_secret_with_len(DEFAULT_SECRET_BYTES)
}

/// Generate a shared secret of `len` bytes
pub fn generate_secret_with_len(len: usize) -> SharedResult<Zeroizing<Vec<u8>>> {
    let mut secret = Zeroizing::new(vec![0u8; len]);
    OsRng
        .try_fill_bytes(secret.as_mut_slice())
        .map_err(|e| SharedError::RandomSource {
            message: e.to_string(),
        })?;
    Ok(secret)
}

/// Generate a fresh secret and return only its Base32 text form
pub fn generate_base32_secret() -> SharedResult<String> {
    generate_base32_secret_with_len(DEFAULT_SECRET_BYTES)
}

/// Generate a `len`-byte secret and return its Base32 text form
pub fn generate_base32_secret_with_len(len: usize) -> SharedResult<String> {
    let secret = generate_secret_with_len(len)?;
    Ok(base32::encode(&secret))
}
