//! Configuration model for the encryption service
//!
//! The host application is responsible for reading configuration from wherever
//! it lives; this module only describes its shape. Field names serialize in
//! PascalCase (`Key`, `KeyIdentifier`, `KeyFormat`, `ExpiredKeys`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The data format in which a raw key is stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyFormat {
    /// Each character of the key is one byte (7-bit ASCII)
    #[default]
    Ascii,
    /// The key is Base64 encoded
    Base64,
}

impl KeyFormat {
    /// Returns the canonical name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyFormat::Ascii => "Ascii",
            KeyFormat::Base64 => "Base64",
        }
    }
}

impl FromStr for KeyFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("ascii") {
            Ok(KeyFormat::Ascii)
        } else if s.eq_ignore_ascii_case("base64") {
            Ok(KeyFormat::Base64)
        } else {
            Err(Error::UnsupportedFormat(s.to_string()))
        }
    }
}

impl TryFrom<String> for KeyFormat {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KeyFormat> for String {
    fn from(format: KeyFormat) -> Self {
        format.as_str().to_string()
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retired key, kept only to decrypt payloads produced before rotation
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiredKey {
    /// The raw key text
    #[serde(rename = "Key")]
    pub key: String,

    /// Optional identifier, possibly several aliases separated by `;`
    #[serde(rename = "KeyIdentifier")]
    pub key_identifier: String,

    /// Format of `key`
    #[serde(rename = "KeyFormat")]
    pub key_format: KeyFormat,
}

impl ExpiredKey {
    /// Creates an ASCII expired key without an identifier
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Sets the key identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.key_identifier = identifier.into();
        self
    }

    /// Sets the key format
    pub fn with_format(mut self, format: KeyFormat) -> Self {
        self.key_format = format;
        self
    }
}

// Raw keys are secrets.
impl fmt::Debug for ExpiredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiredKey")
            .field("key", &"<hidden>")
            .field("key_identifier", &self.key_identifier)
            .field("key_format", &self.key_format)
            .finish()
    }
}

/// Configuration of the current encryption key and its expired predecessors
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionServiceConfig {
    /// The raw text of the current encryption key
    #[serde(rename = "Key")]
    pub key: String,

    /// Identifier of the current key, possibly several aliases separated by `;`
    #[serde(rename = "KeyIdentifier")]
    pub key_identifier: String,

    /// Format of `key`
    #[serde(rename = "KeyFormat")]
    pub key_format: KeyFormat,

    /// Keys retained for decryption only, in configuration order
    #[serde(rename = "ExpiredKeys")]
    pub expired_keys: Vec<ExpiredKey>,
}

impl EncryptionServiceConfig {
    /// Creates a configuration with the given ASCII current key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON
    ///
    /// # Example
    /// ```
    /// use aesencryption::config::{EncryptionServiceConfig, KeyFormat};
    ///
    /// let config = EncryptionServiceConfig::from_json(
    ///     r#"{ "Key": "a2V5MQ==", "KeyIdentifier": "A", "KeyFormat": "Base64" }"#,
    /// ).unwrap();
    /// assert_eq!(config.key_format, KeyFormat::Base64);
    /// assert!(config.expired_keys.is_empty());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        check_key_formats(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Sets the identifier of the current key
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.key_identifier = identifier.into();
        self
    }

    /// Sets the format of the current key
    pub fn with_format(mut self, format: KeyFormat) -> Self {
        self.key_format = format;
        self
    }

    /// Appends an expired key
    pub fn with_expired_key(mut self, expired: ExpiredKey) -> Self {
        self.expired_keys.push(expired);
        self
    }
}

/// Parses every `KeyFormat` field so an unknown format is reported as
/// [`Error::UnsupportedFormat`] rather than a generic JSON error
fn check_key_formats(value: &serde_json::Value) -> Result<()> {
    let expired = value
        .get("ExpiredKeys")
        .and_then(serde_json::Value::as_array)
        .into_iter()
        .flatten();

    for entry in std::iter::once(value).chain(expired) {
        if let Some(format) = entry.get("KeyFormat").and_then(serde_json::Value::as_str) {
            format.parse::<KeyFormat>()?;
        }
    }

    Ok(())
}

impl fmt::Debug for EncryptionServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionServiceConfig")
            .field("key", &"<hidden>")
            .field("key_identifier", &self.key_identifier)
            .field("key_format", &self.key_format)
            .field("expired_keys", &self.expired_keys)
            .finish()
    }
}
