//! Byte-level sealing primitives used by the field codec.
//!
//! This module knows nothing about documents or schemas. It turns byte buffers
//! into storage-safe ciphertext text and back.
//!
//! # Ciphertext format
//!
//! ```text
//! base64std( IV[16] || AES-CFB128( base64std(plaintext) ) )
//! ```
//!
//! Key length picks the AES variant: 16 → AES-128, 24 → AES-192, 32 → AES-256.

pub mod cipher;

pub use cipher::{open, seal, CipherError, BLOCK_SIZE, KEY_SIZES};
