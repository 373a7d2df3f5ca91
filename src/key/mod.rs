//! Key material and key parsing for the encryption service

pub mod registry;

pub use registry::{KeyRegistry, KeyRegistryBuilder};

use crate::config::{EncryptionServiceConfig, ExpiredKey, KeyFormat};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::Zeroizing;

/// Separator between aliases inside a single key identifier
pub const ALIAS_SEPARATOR: char = ';';

/// Splits a key identifier into its non-empty aliases
///
/// `"4;2"` yields `"4"` and `"2"`; `"a;"` yields only `"a"`.
pub fn split_aliases(identifier: &str) -> impl Iterator<Item = &str> {
    identifier
        .split(ALIAS_SEPARATOR)
        .filter(|alias| !alias.is_empty())
}

/// Decodes raw key text according to its format
pub fn parse_key(raw: &str, format: KeyFormat) -> Result<Zeroizing<Vec<u8>>> {
    match format {
        KeyFormat::Ascii => {
            if !raw.is_ascii() {
                return Err(Error::MalformedKeyEncoding(
                    "key contains characters outside 7-bit ASCII".into(),
                ));
            }
            Ok(Zeroizing::new(raw.as_bytes().to_vec()))
        }
        KeyFormat::Base64 => {
            // Whitespace is insignificant in Base64 key text (line-wrapped config values).
            let compact: Zeroizing<String> = Zeroizing::new(
                raw.chars().filter(|c| !c.is_ascii_whitespace()).collect(),
            );
            // The decode error names the offending byte, so it is not propagated.
            STANDARD
                .decode(compact.as_bytes())
                .map(Zeroizing::new)
                .map_err(|_| Error::MalformedKeyEncoding("key is not valid Base64".into()))
        }
    }
}

/// A raw symmetric key together with the identifier it is addressed by
pub struct KeyMaterial {
    identifier: String,
    bytes: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("identifier", &self.identifier)
            .field("bytes", &"<hidden>")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl KeyMaterial {
    /// Creates key material from already decoded bytes
    pub fn new(identifier: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidArgument("key bytes must not be empty".into()));
        }

        Ok(Self {
            identifier: identifier.into(),
            bytes: Zeroizing::new(bytes),
        })
    }

    /// Builds the current key from its configuration
    pub fn from_config(config: &EncryptionServiceConfig) -> Result<Self> {
        Self::decode(&config.key_identifier, &config.key, config.key_format)
            .map_err(|e| match e {
                Error::InvalidArgument(_) => Error::MissingEncryptionKey,
                other => other,
            })
    }

    /// Builds an expired key from its configuration entry
    pub fn from_expired(expired: &ExpiredKey) -> Result<Self> {
        Self::decode(&expired.key_identifier, &expired.key, expired.key_format)
            .map_err(|e| match e {
                Error::InvalidArgument(_) => Error::InvalidExpiredKey,
                other => other,
            })
    }

    fn decode(identifier: &str, raw: &str, format: KeyFormat) -> Result<Self> {
        let mut bytes = parse_key(raw, format)?;
        Self::new(identifier, std::mem::take(&mut *bytes))
    }

    /// Returns the identifier exactly as configured, possibly empty
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the non-empty aliases encoded in the identifier
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        split_aliases(&self.identifier)
    }

    /// Returns the first alias, used to tag ciphertexts produced with this key
    pub fn primary_alias(&self) -> Option<&str> {
        self.aliases().next()
    }

    /// Returns the raw key bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: key material is never empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds the alias lookup index of a configuration
///
/// Only keys with a non-empty identifier contribute. The configuration is
/// expected to have passed [`crate::validation::validate`] already; a
/// colliding alias is still reported as [`Error::DuplicateIdentifier`].
pub fn extract_all_key_material(
    config: &EncryptionServiceConfig,
) -> Result<BTreeMap<String, Zeroizing<Vec<u8>>>> {
    let mut result = BTreeMap::new();

    add_key_identifier_items(&config.key_identifier, &config.key, config.key_format, &mut result)?;

    for expired in &config.expired_keys {
        add_key_identifier_items(
            &expired.key_identifier,
            &expired.key,
            expired.key_format,
            &mut result,
        )?;
    }

    Ok(result)
}

fn add_key_identifier_items(
    identifier: &str,
    raw: &str,
    format: KeyFormat,
    result: &mut BTreeMap<String, Zeroizing<Vec<u8>>>,
) -> Result<()> {
    if identifier.is_empty() {
        return Ok(());
    }

    let key = parse_key(raw, format)?;
    for alias in split_aliases(identifier) {
        if result.contains_key(alias) {
            return Err(Error::DuplicateIdentifier(alias.to_string()));
        }
        result.insert(alias.to_string(), key.clone());
    }

    Ok(())
}

/// Returns every key of a configuration, current first, in configuration order
///
/// Identifiers are ignored; this is the candidate list for decrypting
/// payloads that carry no identifier.
pub fn extract_decryption_keys(
    config: &EncryptionServiceConfig,
) -> Result<Vec<Zeroizing<Vec<u8>>>> {
    let mut keys = Vec::with_capacity(config.expired_keys.len() + 1);
    keys.push(parse_key(&config.key, config.key_format)?);
    for expired in &config.expired_keys {
        keys.push(parse_key(&expired.key, expired.key_format)?);
    }
    Ok(keys)
}
