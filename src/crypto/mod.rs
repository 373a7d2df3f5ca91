//! Cryptographic implementations for the aesencryption library

pub mod aes256cbc;

pub use aes256cbc::Aes256Cbc;
