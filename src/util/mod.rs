//! Utility functions for the aesencryption library

use crate::error::{Error, Result};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

/// Fills a buffer with cryptographically secure random bytes
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::RandomUnavailable(e.to_string()))
}

/// Generates a random byte array of the specified size
pub fn get_rand_bytes(size: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0_u8; size];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Fails if the operating system random source cannot produce bytes
pub fn ensure_random_available() -> Result<()> {
    let mut probe = [0_u8; 16];
    fill_random(&mut probe)
}

/// Compares two byte slices in constant time
///
/// Slices of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
