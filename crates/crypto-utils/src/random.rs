use rand_core::{OsRng, RngCore};

use crate::error::CryptoError;

/// Generates `len` cryptographically secure random bytes.
///
/// Fails if the operating system's entropy source is unavailable; there is
/// no fallback generator.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; len];
    fill(&mut buf)?;
    Ok(buf)
}

/// Generates a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes_fixed<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    fill(&mut buf)?;
    Ok(buf)
}

fn fill(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::RandomUnavailable(e.to_string()))
}
