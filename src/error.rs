use thiserror::Error;

/// Result type for aesencryption operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the aesencryption library
///
/// Construction-time variants abort service creation entirely. Decrypt-time
/// variants (`UnknownKeyIdentifier`, `KeyMismatch`, `DecryptionFailed`) are
/// per call and never describe which part of the ciphertext was rejected.
#[derive(Error, Debug)]
pub enum Error {
    /// The current encryption key is missing or blank
    #[error("The encryption configuration has an empty 'Key' property.")]
    MissingEncryptionKey,

    /// One or more expired keys have a blank raw value
    #[error("The encryption configuration has 'ExpiredKeys' defined however some keys have no 'Key' property set.")]
    InvalidExpiredKey,

    /// The current key also appears among the expired keys
    #[error("The encryption configuration has a 'Key' that is also defined inside the 'ExpiredKeys'.")]
    CurrentKeyAlsoExpired,

    /// Two expired entries share the same raw key value
    #[error("The encryption configuration has overlapping 'ExpiredKeys' defined. Ensure that no keys overlap.")]
    DuplicateExpiredKey,

    /// A key identifier alias is used by more than one key
    #[error("The encryption configuration has duplicate key identifiers: '{0}'. Key identifiers must be unique in the complete configuration.")]
    DuplicateIdentifier(String),

    /// The key format name is not recognised
    #[error("Unsupported key format '{0}'. Supported formats are: ASCII and Base64.")]
    UnsupportedFormat(String),

    /// The raw key text could not be decoded in its declared format
    #[error("Malformed key encoding: {0}")]
    MalformedKeyEncoding(String),

    /// A key does not have the length required by the cipher
    #[error("Invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// A tagged payload references an identifier with no matching key
    #[error("Unknown key identifier")]
    UnknownKeyIdentifier,

    /// A tagged payload could not be decrypted with the key its identifier selects
    #[error("Unable to decrypt payload with the key selected by its identifier")]
    KeyMismatch,

    /// An untagged payload could not be decrypted with any known key
    #[error("Unable to decrypt payload")]
    DecryptionFailed,

    /// Errors related to cryptographic operations
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// No cryptographically secure random source is available
    #[error("Secure random source unavailable: {0}")]
    RandomUnavailable(String),

    /// Errors related to JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns true for errors raised while building a registry or service
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::MissingEncryptionKey
                | Error::InvalidExpiredKey
                | Error::CurrentKeyAlsoExpired
                | Error::DuplicateExpiredKey
                | Error::DuplicateIdentifier(_)
                | Error::UnsupportedFormat(_)
                | Error::MalformedKeyEncoding(_)
                | Error::InvalidKeySize { .. }
                | Error::InvalidArgument(_)
        )
    }
}
