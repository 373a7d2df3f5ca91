//! The tagged ciphertext produced by the encryption service
//!
//! An [`EncryptedValue`] carries everything needed to decrypt a payload: the
//! identifier of the key that encrypted it, the IV and the ciphertext. Hosts
//! may embed it in their own message envelope however they like; the serde
//! representation below keeps the identifier as UTF-8 text and both byte
//! fields as Base64 strings.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Ciphertext tagged with the identifier of its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedValue {
    /// Alias of the key used for encryption, empty for untagged payloads
    #[serde(rename = "KeyIdentifier", default)]
    pub key_identifier: String,

    /// Initialization vector, one cipher block long
    #[serde(rename = "Base64Iv", with = "base64_bytes")]
    pub iv: Vec<u8>,

    /// Ciphertext, a whole number of cipher blocks
    #[serde(rename = "EncryptedBase64Value", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedValue {
    /// Creates a new EncryptedValue
    pub fn new(key_identifier: impl Into<String>, iv: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            key_identifier: key_identifier.into(),
            iv,
            ciphertext,
        }
    }

    /// Returns true if the value names the key that encrypted it
    pub fn is_tagged(&self) -> bool {
        !self.key_identifier.is_empty()
    }

    /// Serializes the value to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a value from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}
