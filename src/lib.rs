//! # AES Encryption Service
//!
//! Rotation-aware symmetric encryption for message payloads.
//!
//! `aesencryption` encrypts payloads with one designated *current* key and
//! tags every ciphertext with the identifier of that key. Payloads are
//! decrypted by looking the identifier up among the current key and any number
//! of retained *expired* keys, so keys can be rotated across a fleet of
//! producers and consumers without losing the ability to read older messages.
//! Payloads that carry no identifier are tried against every known key.
//!
//! Key configurations are validated once, when the service is built, and the
//! service is read-only afterwards. It is `Send + Sync` and can be shared
//! between threads without locking.
//!
//! ## Basic Usage
//!
//! ```rust
//! use aesencryption::config::{EncryptionServiceConfig, ExpiredKey};
//! use aesencryption::AesEncryptionService;
//!
//! # fn example() -> Result<(), aesencryption::Error> {
//! let config = EncryptionServiceConfig::new("gdDbqRpqdRbTs3mhdZh9qCaDaxJXl+e6")
//!     .with_identifier("2015-10")
//!     .with_expired_key(
//!         ExpiredKey::new("abDbqRpqdRbTs3mhdZh9qCaDaxJXl+e6").with_identifier("2015-09"),
//!     );
//!
//! let service = AesEncryptionService::from_config(&config)?;
//!
//! let encrypted = service.encrypt(b"secret data")?;
//! assert_eq!(encrypted.key_identifier, "2015-10");
//!
//! let decrypted = service.decrypt(&encrypted)?;
//! assert_eq!(decrypted, b"secret data");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Using Decoded Keys
//!
//! Callers that already hold key bytes can skip the configuration layer:
//!
//! ```rust
//! use aesencryption::AesEncryptionService;
//!
//! # fn example() -> Result<(), aesencryption::Error> {
//! let current = vec![1_u8; 32];
//! let previous = vec![2_u8; 32];
//!
//! let service = AesEncryptionService::with_keys(
//!     "2",
//!     vec![("2".to_string(), current), ("1".to_string(), previous)],
//!     Vec::new(),
//! )?;
//! assert_eq!(service.encryption_key_identifier(), "2");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod crypto;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod key;
pub mod service;
pub mod util;
pub mod validation;

// Re-export key types
pub use crate::config::{EncryptionServiceConfig, ExpiredKey, KeyFormat};
pub use crate::diagnostics::{ConfigWarning, Diagnostics, LogDiagnostics, NoopDiagnostics};
pub use crate::envelope::EncryptedValue;
pub use crate::error::{Error, Result};
pub use crate::key::{
    extract_all_key_material, extract_decryption_keys, parse_key, KeyMaterial, KeyRegistry,
};
pub use crate::service::AesEncryptionService;
pub use crate::validation::{validate, verify_keys};

/// Size of AES-256 key in bytes
pub const AES256_KEY_SIZE: usize = 32;

/// Size of an AES block, and of the IV, in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// Encryption interface used by a message pipeline
pub trait EncryptionService: Send + Sync + std::fmt::Debug {
    /// Encrypts a payload and returns it tagged with its key identifier
    fn encrypt_payload(&self, data: &[u8]) -> Result<EncryptedValue>;

    /// Decrypts a tagged payload and returns the original data
    fn decrypt_payload(&self, value: &EncryptedValue) -> Result<Vec<u8>>;
}
