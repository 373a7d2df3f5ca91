use crate::config::EncryptionServiceConfig;
use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::error::{Error, Result};
use crate::key::KeyMaterial;
use crate::validation;
use std::collections::HashMap;

/// The current key plus the expired keys kept for decryption
///
/// A registry is validated when it is built and is read-only afterwards.
#[derive(Debug)]
pub struct KeyRegistry {
    /// Key used for encryption and decryption
    current: KeyMaterial,

    /// Keys used only for decryption, in configuration order
    expired: Vec<KeyMaterial>,

    /// Alias -> position in `current` (0) followed by `expired` (1..)
    index: HashMap<String, usize>,
}

/// Builder for a [`KeyRegistry`] from already decoded keys
#[derive(Debug, Default)]
pub struct KeyRegistryBuilder {
    current: Option<(String, Vec<u8>)>,
    identified: Vec<(String, Vec<u8>)>,
    expired: Vec<Vec<u8>>,
}

impl KeyRegistryBuilder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current key
    pub fn with_current_key(mut self, identifier: impl Into<String>, key: Vec<u8>) -> Self {
        self.current = Some((identifier.into(), key));
        self
    }

    /// Adds a decryption key addressable by identifier
    pub fn with_identified_key(mut self, identifier: impl Into<String>, key: Vec<u8>) -> Self {
        self.identified.push((identifier.into(), key));
        self
    }

    /// Adds a decryption key without identifier
    pub fn with_expired_key(mut self, key: Vec<u8>) -> Self {
        self.expired.push(key);
        self
    }

    /// Adds several decryption keys without identifier
    pub fn with_expired_keys(mut self, keys: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.expired.extend(keys);
        self
    }

    /// Validates the keys and builds the registry
    ///
    /// Identified keys come before unidentified ones in the expired sequence.
    pub fn build(self) -> Result<KeyRegistry> {
        let (identifier, key) = self.current.ok_or(Error::MissingEncryptionKey)?;
        let current = KeyMaterial::new(identifier, key).map_err(|_| Error::MissingEncryptionKey)?;

        let expired = self
            .identified
            .into_iter()
            .chain(self.expired.into_iter().map(|key| (String::new(), key)))
            .map(|(identifier, key)| {
                KeyMaterial::new(identifier, key).map_err(|_| Error::InvalidExpiredKey)
            })
            .collect::<Result<Vec<_>>>()?;

        validation::validate_key_material(&current, &expired)?;
        KeyRegistry::assemble(current, expired)
    }
}

impl KeyRegistry {
    /// Creates a builder for decoded keys
    pub fn builder() -> KeyRegistryBuilder {
        KeyRegistryBuilder::new()
    }

    /// Validates a configuration and builds its registry
    ///
    /// Warnings are sent to the `log` facade.
    pub fn from_config(config: &EncryptionServiceConfig) -> Result<Self> {
        Self::from_config_with_diagnostics(config, &LogDiagnostics)
    }

    /// Validates a configuration and builds its registry, reporting warnings
    /// to `diagnostics`
    pub fn from_config_with_diagnostics(
        config: &EncryptionServiceConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self> {
        validation::validate(config, diagnostics)?;

        let current = KeyMaterial::from_config(config)?;
        let expired = config
            .expired_keys
            .iter()
            .map(KeyMaterial::from_expired)
            .collect::<Result<Vec<_>>>()?;

        Self::assemble(current, expired)
    }

    fn assemble(current: KeyMaterial, expired: Vec<KeyMaterial>) -> Result<Self> {
        let mut index = HashMap::new();
        for (position, key) in std::iter::once(&current).chain(&expired).enumerate() {
            for alias in key.aliases() {
                if index.insert(alias.to_string(), position).is_some() {
                    return Err(Error::DuplicateIdentifier(alias.to_string()));
                }
            }
        }

        log::debug!(
            "key registry built -- expired keys: {}, aliases: {}",
            expired.len(),
            index.len()
        );

        Ok(Self {
            current,
            expired,
            index,
        })
    }

    /// Returns the current key
    pub fn current(&self) -> &KeyMaterial {
        &self.current
    }

    /// Returns the expired keys in configuration order
    pub fn expired(&self) -> &[KeyMaterial] {
        &self.expired
    }

    /// Looks up a key by a single alias
    pub fn key_for_alias(&self, alias: &str) -> Option<&KeyMaterial> {
        self.index.get(alias).and_then(|&position| match position {
            0 => Some(&self.current),
            n => self.expired.get(n - 1),
        })
    }

    /// Returns every alias in the lookup index, sorted
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.index.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    /// Returns every key, current first, regardless of identifier
    pub fn decryption_keys(&self) -> impl Iterator<Item = &KeyMaterial> {
        std::iter::once(&self.current).chain(self.expired.iter())
    }

    /// Returns the number of keys in the registry
    pub fn len(&self) -> usize {
        self.expired.len() + 1
    }

    /// Always false: a registry holds at least the current key
    pub fn is_empty(&self) -> bool {
        false
    }
}
