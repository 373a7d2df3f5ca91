//! Validation of key configurations
//!
//! Every check is a pure predicate. [`validate`] runs them in a fixed order
//! and stops at the first failure, so the reported error is deterministic.

use crate::config::EncryptionServiceConfig;
use crate::diagnostics::{ConfigWarning, Diagnostics};
use crate::error::{Error, Result};
use crate::key::{split_aliases, KeyMaterial};
use crate::util::constant_time_eq;
use std::collections::HashSet;

/// True if the current key is empty or whitespace only
pub fn has_blank_or_missing_current_key(config: &EncryptionServiceConfig) -> bool {
    is_blank(&config.key)
}

/// True if any expired key is empty or whitespace only
pub fn expired_keys_have_whitespace(config: &EncryptionServiceConfig) -> bool {
    config.expired_keys.iter().any(|x| is_blank(&x.key))
}

/// True if any expired key has no identifier
pub fn one_or_more_expired_keys_have_no_identifier(config: &EncryptionServiceConfig) -> bool {
    config
        .expired_keys
        .iter()
        .any(|x| x.key_identifier.is_empty())
}

/// True if the raw current key equals the raw value of an expired key
pub fn encryption_key_listed_in_expired_keys(config: &EncryptionServiceConfig) -> bool {
    config
        .expired_keys
        .iter()
        .any(|x| constant_time_eq(x.key.as_bytes(), config.key.as_bytes()))
}

/// True if two expired entries share a raw key value
pub fn expired_keys_have_duplicate_keys(config: &EncryptionServiceConfig) -> bool {
    let keys: Vec<&[u8]> = config.expired_keys.iter().map(|x| x.key.as_bytes()).collect();
    has_duplicate_bytes(&keys)
}

/// True if any alias occurs more than once across all identifiers
pub fn configuration_has_duplicate_key_identifiers(config: &EncryptionServiceConfig) -> bool {
    find_duplicate_alias(configured_identifiers(config)).is_some()
}

/// Returns the first alias that occurs more than once across the identifiers
pub fn find_duplicate_alias<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    identifiers
        .into_iter()
        .flat_map(split_aliases)
        .find(|alias| !seen.insert(*alias))
}

fn configured_identifiers(config: &EncryptionServiceConfig) -> impl Iterator<Item = &str> {
    std::iter::once(config.key_identifier.as_str())
        .chain(config.expired_keys.iter().map(|x| x.key_identifier.as_str()))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_duplicate_bytes(values: &[&[u8]]) -> bool {
    values.iter().enumerate().any(|(i, a)| {
        values[i + 1..]
            .iter()
            .any(|b| constant_time_eq(a, b))
    })
}

/// Validates a configuration before any key is decoded
///
/// Checks run in this order: blank current key, blank expired keys, expired
/// keys without identifier (warning only), current key listed as expired,
/// duplicate expired keys, duplicate identifiers. Warnings are passed to
/// `diagnostics` as soon as they are found and also returned.
pub fn validate(
    config: &EncryptionServiceConfig,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<ConfigWarning>> {
    let mut warnings = Vec::new();

    if has_blank_or_missing_current_key(config) {
        return Err(Error::MissingEncryptionKey);
    }
    if expired_keys_have_whitespace(config) {
        return Err(Error::InvalidExpiredKey);
    }
    if one_or_more_expired_keys_have_no_identifier(config) {
        let positions = config
            .expired_keys
            .iter()
            .enumerate()
            .filter(|(_, x)| x.key_identifier.is_empty())
            .map(|(i, _)| i)
            .collect();
        let warning = ConfigWarning::ExpiredKeysWithoutIdentifier { positions };
        diagnostics.warn(&warning);
        warnings.push(warning);
    }
    if encryption_key_listed_in_expired_keys(config) {
        return Err(Error::CurrentKeyAlsoExpired);
    }
    if expired_keys_have_duplicate_keys(config) {
        return Err(Error::DuplicateExpiredKey);
    }
    if let Some(alias) = find_duplicate_alias(configured_identifiers(config)) {
        return Err(Error::DuplicateIdentifier(alias.to_string()));
    }

    Ok(warnings)
}

/// Validates decoded keys supplied programmatically
///
/// The rules of [`validate`] that apply to bytes, in the same order. Empty
/// keys cannot reach this point since [`KeyMaterial::new`] rejects them.
/// Keys without identifier are expected on this path and produce no warning.
pub fn validate_key_material(current: &KeyMaterial, expired: &[KeyMaterial]) -> Result<()> {
    if expired
        .iter()
        .any(|x| constant_time_eq(x.bytes(), current.bytes()))
    {
        return Err(Error::CurrentKeyAlsoExpired);
    }
    let keys: Vec<&[u8]> = expired.iter().map(KeyMaterial::bytes).collect();
    if has_duplicate_bytes(&keys) {
        return Err(Error::DuplicateExpiredKey);
    }
    let identifiers = std::iter::once(current.identifier())
        .chain(expired.iter().map(KeyMaterial::identifier));
    if let Some(alias) = find_duplicate_alias(identifiers) {
        return Err(Error::DuplicateIdentifier(alias.to_string()));
    }

    Ok(())
}

/// Checks a list of raw expired keys for overlaps and blank entries
///
/// Overlap is reported before blank entries. An empty list is valid.
pub fn verify_keys<S: AsRef<str>>(expired_keys: &[S]) -> Result<()> {
    let distinct: HashSet<&str> = expired_keys.iter().map(AsRef::as_ref).collect();
    if distinct.len() != expired_keys.len() {
        return Err(Error::InvalidArgument(
            "Overlapping keys defined. Ensure that no keys overlap.".into(),
        ));
    }

    if let Some(index) = expired_keys.iter().position(|k| is_blank(k.as_ref())) {
        return Err(Error::InvalidArgument(format!(
            "Empty encryption key detected in position {}.",
            index
        )));
    }

    Ok(())
}
