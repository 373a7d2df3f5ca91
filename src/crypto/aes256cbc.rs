use crate::error::{Error, Result};
use crate::{AES256_KEY_SIZE, AES_BLOCK_SIZE};
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256 in CBC mode with PKCS#7 padding
///
/// The IV is supplied by the caller and must be unique per encryption.
/// Decryption is unauthenticated: a wrong key is only detected when the
/// padding of the last block happens to be invalid.
#[derive(Default, Debug, Clone, Copy)]
pub struct Aes256Cbc;

impl Aes256Cbc {
    /// Creates a new instance of the AES-256-CBC implementation
    pub fn new() -> Self {
        Self
    }

    /// Checks that a key can be used with this cipher
    pub fn check_key(key: &[u8]) -> Result<()> {
        if key.len() != AES256_KEY_SIZE {
            return Err(Error::InvalidKeySize {
                expected: AES256_KEY_SIZE,
                actual: key.len(),
            });
        }
        Ok(())
    }

    /// Encrypts data, returning a ciphertext that is a whole number of blocks
    pub fn encrypt(&self, data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        Self::check_key(key)?;
        if iv.len() != AES_BLOCK_SIZE {
            return Err(Error::Crypto(format!(
                "IV must be {} bytes, got {}",
                AES_BLOCK_SIZE,
                iv.len()
            )));
        }

        let cipher = Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(data))
    }

    /// Decrypts data
    ///
    /// Every failure, whether from the IV, the ciphertext length or the
    /// padding, is reported as [`Error::DecryptionFailed`].
    pub fn decrypt(&self, data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        if iv.len() != AES_BLOCK_SIZE || data.is_empty() || data.len() % AES_BLOCK_SIZE != 0 {
            return Err(Error::DecryptionFailed);
        }

        let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| Error::DecryptionFailed)?;

        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|_| Error::DecryptionFailed)
    }
}
