// Tests that follow a key through a rotation between producer and consumer

mod common;

use aesencryption::crypto::Aes256Cbc;
use aesencryption::{
    AesEncryptionService, EncryptedValue, EncryptionServiceConfig, Error, ExpiredKey, KeyFormat,
};
use common::{
    base64_key, create_service, init_logging, rotated_config, single_key_config, KEY_2015_09,
    KEY_2015_10, ORIGINAL_DATA,
};

#[test]
fn test_consumer_reads_messages_from_before_rotation() {
    init_logging();

    let producer = create_service(&single_key_config(KEY_2015_09, "2015-09"));
    let consumer = create_service(&rotated_config());

    let encrypted = producer.encrypt(ORIGINAL_DATA.as_bytes()).unwrap();
    assert_eq!(encrypted.key_identifier, "2015-09");
    assert_eq!(consumer.decrypt(&encrypted).unwrap(), ORIGINAL_DATA.as_bytes());
}

#[test]
fn test_producer_rotates_before_consumer() {
    init_logging();

    // The consumer still runs with 2015-09 as its current key but already
    // knows 2015-10 as an additional identified key.
    let consumer = AesEncryptionService::with_keys(
        "2015-09",
        vec![
            ("2015-09".to_string(), KEY_2015_09.as_bytes().to_vec()),
            ("2015-10".to_string(), KEY_2015_10.as_bytes().to_vec()),
        ],
        Vec::new(),
    )
    .unwrap();
    let producer = create_service(&rotated_config());

    let encrypted = producer.encrypt(ORIGINAL_DATA.as_bytes()).unwrap();
    assert_eq!(consumer.decrypt(&encrypted).unwrap(), ORIGINAL_DATA.as_bytes());
}

#[test]
fn test_untagged_legacy_message_uses_fallback() {
    init_logging();

    let legacy_producer = create_service(
        &EncryptionServiceConfig::new(base64_key(8)).with_format(KeyFormat::Base64),
    );
    let consumer = create_service(&rotated_config());

    // Skip IVs for which an earlier key happens to produce valid padding.
    let earlier = [KEY_2015_10.as_bytes(), KEY_2015_09.as_bytes()];
    let encrypted = (0..32)
        .map(|_| legacy_producer.encrypt(ORIGINAL_DATA.as_bytes()).unwrap())
        .find(|v| {
            earlier
                .iter()
                .all(|key| Aes256Cbc::new().decrypt(&v.ciphertext, key, &v.iv).is_err())
        })
        .unwrap();

    assert!(!encrypted.is_tagged());
    assert_eq!(consumer.decrypt(&encrypted).unwrap(), ORIGINAL_DATA.as_bytes());
}

#[test]
fn test_removed_key_is_unknown_identifier() {
    init_logging();

    let producer = create_service(&single_key_config(KEY_2015_09, "2015-09"));
    let encrypted = producer.encrypt(ORIGINAL_DATA.as_bytes()).unwrap();

    // 2015-09 has been dropped from the consumer's configuration.
    let consumer = create_service(
        &EncryptionServiceConfig::new(KEY_2015_10)
            .with_identifier("2015-10")
            .with_expired_key(ExpiredKey::new(base64_key(8)).with_format(KeyFormat::Base64)),
    );

    let err = consumer.decrypt(&encrypted).unwrap_err();
    assert!(matches!(err, Error::UnknownKeyIdentifier));
    assert_eq!(err.to_string(), "Unknown key identifier");
}

#[test]
fn test_identifier_alias_collision_blocks_startup() {
    let config = EncryptionServiceConfig::new(KEY_2015_10)
        .with_identifier("4;2")
        .with_expired_key(ExpiredKey::new(KEY_2015_09).with_identifier("3;2"));

    assert!(matches!(
        AesEncryptionService::from_config(&config),
        Err(Error::DuplicateIdentifier(alias)) if alias == "2"
    ));
}

#[test]
fn test_current_key_listed_as_expired_blocks_startup() {
    let config = EncryptionServiceConfig::new(KEY_2015_10)
        .with_identifier("2015-10")
        .with_expired_key(ExpiredKey::new(KEY_2015_10).with_identifier("old"));

    assert!(matches!(
        AesEncryptionService::from_config(&config),
        Err(Error::CurrentKeyAlsoExpired)
    ));
}

#[test]
fn test_duplicate_expired_keys_block_startup() {
    let config = EncryptionServiceConfig::new(KEY_2015_10)
        .with_expired_key(ExpiredKey::new(KEY_2015_09).with_identifier("1"))
        .with_expired_key(ExpiredKey::new(KEY_2015_09).with_identifier("2"));

    assert!(matches!(
        AesEncryptionService::from_config(&config),
        Err(Error::DuplicateExpiredKey)
    ));
}

#[test]
fn test_value_survives_host_serialization() {
    let producer = create_service(&rotated_config());
    let consumer = create_service(&rotated_config());

    let json = producer
        .encrypt(ORIGINAL_DATA.as_bytes())
        .unwrap()
        .to_json()
        .unwrap();

    let received = EncryptedValue::from_json(&json).unwrap();
    assert_eq!(received.key_identifier, "2015-10");
    assert_eq!(consumer.decrypt(&received).unwrap(), ORIGINAL_DATA.as_bytes());
}

#[test]
fn test_decrypt_failure_does_not_poison_service() {
    let service = create_service(&rotated_config());

    let mut corrupted = service.encrypt(ORIGINAL_DATA.as_bytes()).unwrap();
    corrupted.ciphertext.truncate(5);
    assert!(matches!(service.decrypt(&corrupted), Err(Error::KeyMismatch)));

    let encrypted = service.encrypt(ORIGINAL_DATA.as_bytes()).unwrap();
    assert_eq!(service.decrypt(&encrypted).unwrap(), ORIGINAL_DATA.as_bytes());
}
