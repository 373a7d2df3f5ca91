//! The rotation-aware AES encryption service

use crate::config::EncryptionServiceConfig;
use crate::crypto::Aes256Cbc;
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::envelope::EncryptedValue;
use crate::error::{Error, Result};
use crate::key::KeyRegistry;
use crate::util;
use crate::{EncryptionService, AES_BLOCK_SIZE};

use metrics::{counter, histogram};
use std::time::Instant;

/// Encrypts with the current key and decrypts with any key of its registry
///
/// Ciphertexts are tagged with the first alias of the current key. Tagged
/// payloads are decrypted with the key their alias selects; untagged payloads
/// are tried against every key, current first.
#[derive(Debug)]
pub struct AesEncryptionService {
    registry: KeyRegistry,
    cipher: Aes256Cbc,
}

impl AesEncryptionService {
    /// Wraps a validated registry
    ///
    /// Fails if any key is not an AES-256 key or if the operating system
    /// random source is unavailable.
    pub fn new(registry: KeyRegistry) -> Result<Self> {
        for key in registry.decryption_keys() {
            Aes256Cbc::check_key(key.bytes())?;
        }
        util::ensure_random_available()?;

        log::debug!(
            "aes encryption service ready -- encryption key: {:?}, decryption keys: {}",
            registry.current().primary_alias().unwrap_or_default(),
            registry.len()
        );

        Ok(Self {
            registry,
            cipher: Aes256Cbc::new(),
        })
    }

    /// Builds the service from configuration, logging warnings
    pub fn from_config(config: &EncryptionServiceConfig) -> Result<Self> {
        Self::from_config_with_diagnostics(config, &LogDiagnostics)
    }

    /// Builds the service from configuration, reporting warnings to `diagnostics`
    pub fn from_config_with_diagnostics(
        config: &EncryptionServiceConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self> {
        Self::new(KeyRegistry::from_config_with_diagnostics(config, diagnostics)?)
    }

    /// Builds the service from a single decoded encryption key
    ///
    /// `decryption_keys` are tried, after the encryption key, for payloads
    /// without identifier.
    pub fn with_key(
        identifier: impl Into<String>,
        key: Vec<u8>,
        decryption_keys: impl IntoIterator<Item = Vec<u8>>,
    ) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("encryption key must not be empty".into()));
        }

        let registry = KeyRegistry::builder()
            .with_current_key(identifier, key)
            .with_expired_keys(decryption_keys)
            .build()?;

        Self::new(registry)
    }

    /// Builds the service from identified decoded keys
    ///
    /// The entry named `identifier` becomes the encryption key; the other
    /// entries stay addressable by their identifiers for decryption, in
    /// iteration order, followed by `decryption_keys`.
    pub fn with_keys(
        identifier: &str,
        keys: impl IntoIterator<Item = (String, Vec<u8>)>,
        decryption_keys: impl IntoIterator<Item = Vec<u8>>,
    ) -> Result<Self> {
        let mut builder = KeyRegistry::builder();
        for (key_identifier, key) in keys {
            builder = if key_identifier == identifier {
                builder.with_current_key(key_identifier, key)
            } else {
                builder.with_identified_key(key_identifier, key)
            };
        }

        Self::new(builder.with_expired_keys(decryption_keys).build()?)
    }

    /// Returns the key registry
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Returns the identifier written on every ciphertext, possibly empty
    pub fn encryption_key_identifier(&self) -> &str {
        self.registry.current().primary_alias().unwrap_or_default()
    }

    /// Encrypts a payload with the current key and a fresh IV
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedValue> {
        let start = Instant::now();
        counter!("aes.encrypt", 1);

        let iv = util::get_rand_bytes(AES_BLOCK_SIZE)?;

        let current = self.registry.current();
        let ciphertext = self.cipher.encrypt(plaintext, current.bytes(), &iv)?;

        histogram!("aes.encrypt.time", start.elapsed());
        Ok(EncryptedValue::new(
            self.encryption_key_identifier(),
            iv,
            ciphertext,
        ))
    }

    /// Decrypts a tagged ciphertext
    pub fn decrypt(&self, value: &EncryptedValue) -> Result<Vec<u8>> {
        self.decrypt_parts(&value.key_identifier, &value.iv, &value.ciphertext)
    }

    /// Decrypts the parts of a tagged ciphertext
    ///
    /// A non-empty identifier must name a known alias; no other key is tried.
    /// An empty identifier tries every key, current first.
    pub fn decrypt_parts(&self, identifier: &str, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();
        counter!("aes.decrypt", 1);

        let result = if identifier.is_empty() {
            self.decrypt_with_all_keys(iv, ciphertext)
        } else {
            self.decrypt_with_identifier(identifier, iv, ciphertext)
        };

        if result.is_ok() {
            histogram!("aes.decrypt.time", start.elapsed());
        } else {
            counter!("aes.decrypt.failure", 1);
        }
        result
    }

    fn decrypt_with_identifier(&self, identifier: &str, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let key = self
            .registry
            .key_for_alias(identifier)
            .ok_or(Error::UnknownKeyIdentifier)?;

        self.cipher
            .decrypt(ciphertext, key.bytes(), iv)
            .map_err(|_| Error::KeyMismatch)
    }

    fn decrypt_with_all_keys(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        counter!("aes.decrypt.fallback", 1);

        for (position, key) in self.registry.decryption_keys().enumerate() {
            match self.cipher.decrypt(ciphertext, key.bytes(), iv) {
                Ok(plaintext) => {
                    log::debug!("untagged payload decrypted with key at position {}", position);
                    return Ok(plaintext);
                }
                Err(_) => log::debug!("untagged payload rejected by key at position {}", position),
            }
        }

        Err(Error::DecryptionFailed)
    }
}

impl EncryptionService for AesEncryptionService {
    fn encrypt_payload(&self, data: &[u8]) -> Result<EncryptedValue> {
        self.encrypt(data)
    }

    fn decrypt_payload(&self, value: &EncryptedValue) -> Result<Vec<u8>> {
        self.decrypt(value)
    }
}
