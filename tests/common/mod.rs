// Common test utilities and fixtures shared by the integration tests
#![allow(dead_code)]

use aesencryption::{AesEncryptionService, EncryptionServiceConfig, ExpiredKey, KeyFormat};
use base64::{engine::general_purpose::STANDARD, Engine as _};

// Constants for tests
pub const ORIGINAL_DATA: &str = "somesupersecretstring!hjdkashfjkdashfd";
pub const KEY_2015_10: &str = "gdDbqRpqdRbTs3mhdZh9qCaDaxJXl+e6";
pub const KEY_2015_09: &str = "cnGq3VBdSMlWAp/BEtLR3g7M0eHEUSgb";
pub const KEY_2015_08: &str = "Pw3NLuHh2VNCbcX7mxB0QY1FRyn+BQKq";

// Route library logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// A deterministic 256-bit key as Base64 text
pub fn base64_key(seed: u8) -> String {
    STANDARD.encode([seed; 32])
}

// Configuration for an endpoint that uses a single key
pub fn single_key_config(key: &str, identifier: &str) -> EncryptionServiceConfig {
    EncryptionServiceConfig::new(key).with_identifier(identifier)
}

// Configuration after two rotations: 2015-08 -> 2015-09 -> 2015-10
pub fn rotated_config() -> EncryptionServiceConfig {
    EncryptionServiceConfig::new(KEY_2015_10)
        .with_identifier("2015-10")
        .with_expired_key(ExpiredKey::new(KEY_2015_09).with_identifier("2015-09"))
        .with_expired_key(ExpiredKey::new(base64_key(8)).with_format(KeyFormat::Base64))
}

pub fn create_service(config: &EncryptionServiceConfig) -> AesEncryptionService {
    AesEncryptionService::from_config(config).expect("Failed to create service")
}
