//! AES-CFB sealing and opening of byte buffers into storage-safe text.
//!
//! **Format:** `base64(IV || AES-CFB(key, IV, base64(plaintext)))`, standard
//! alphabet with padding on both layers. The inner encoding exists only so that
//! previously stored ciphertext keeps decoding; it adds no strength.
//!
//! CFB is unauthenticated. A wrong key is detected only because the decrypted
//! inner layer stops being valid base64, not by a MAC.

use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cfb_mode::cipher::{AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use common::CodecError;
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

/// AES block size; also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// Accepted key lengths, selecting AES-128, AES-192 or AES-256.
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is not one of [`KEY_SIZES`] bytes long.
    #[error("invalid key size: {0} bytes")]
    InvalidKeySize(usize),

    /// Outer or inner text encoding is not valid base64.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(&'static str),

    /// Fewer bytes than one IV after outer decoding.
    #[error("ciphertext too short")]
    Truncated,

    /// The OS CSPRNG failed to produce an IV.
    #[error("random source failure: {0}")]
    Rng(String),
}

impl From<CipherError> for CodecError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::InvalidKeySize(n) => CodecError::InvalidKeySize(n),
            CipherError::MalformedCiphertext(why) => CodecError::MalformedCiphertext(why.into()),
            CipherError::Truncated => {
                CodecError::MalformedCiphertext("shorter than one cipher block".into())
            }
            CipherError::Rng(why) => CodecError::Rng(why),
        }
    }
}

/// Check that `key` selects an AES variant.
pub fn check_key(key: &[u8]) -> Result<(), CipherError> {
    if KEY_SIZES.contains(&key.len()) {
        Ok(())
    } else {
        Err(CipherError::InvalidKeySize(key.len()))
    }
}

/// Encrypt `plaintext` into ciphertext text.
///
/// A fresh random IV is drawn from the OS CSPRNG on every call, so sealing the
/// same plaintext twice yields different output.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeySize`] for keys that are not 16/24/32 bytes
/// and [`CipherError::Rng`] if the random source fails.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<String, CipherError> {
    check_key(key)?;

    let mut iv = [0u8; BLOCK_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CipherError::Rng(e.to_string()))?;

    seal_with_iv(key, &iv, plaintext)
}

fn seal_with_iv(key: &[u8], iv: &[u8; BLOCK_SIZE], plaintext: &[u8]) -> Result<String, CipherError> {
    let inner = STANDARD.encode(plaintext);

    let mut buf = Vec::with_capacity(BLOCK_SIZE + inner.len());
    buf.extend_from_slice(iv);
    buf.extend_from_slice(inner.as_bytes());
    keystream_encrypt(key, iv, &mut buf[BLOCK_SIZE..])?;

    Ok(STANDARD.encode(buf))
}

/// Decrypt ciphertext text produced by [`seal`] back to the original bytes.
///
/// # Errors
///
/// - [`CipherError::InvalidKeySize`] for a key of the wrong length.
/// - [`CipherError::MalformedCiphertext`] if either base64 layer is invalid,
///   which is how a wrong key surfaces.
/// - [`CipherError::Truncated`] if the decoded payload is shorter than one block.
pub fn open(key: &[u8], text: &str) -> Result<Vec<u8>, CipherError> {
    check_key(key)?;

    let mut payload = STANDARD
        .decode(text)
        .map_err(|_| CipherError::MalformedCiphertext("outer encoding is not base64"))?;
    if payload.len() < BLOCK_SIZE {
        return Err(CipherError::Truncated);
    }

    let (iv, body) = payload.split_at_mut(BLOCK_SIZE);
    keystream_decrypt(key, iv, body)?;

    STANDARD
        .decode(&*body)
        .map_err(|_| CipherError::MalformedCiphertext("decrypted payload is not base64"))
}

fn keystream_encrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError> {
    match key.len() {
        16 => encrypt_with::<cfb_mode::Encryptor<Aes128>>(key, iv, buf),
        24 => encrypt_with::<cfb_mode::Encryptor<Aes192>>(key, iv, buf),
        32 => encrypt_with::<cfb_mode::Encryptor<Aes256>>(key, iv, buf),
        n => Err(CipherError::InvalidKeySize(n)),
    }
}

fn keystream_decrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError> {
    match key.len() {
        16 => decrypt_with::<cfb_mode::Decryptor<Aes128>>(key, iv, buf),
        24 => decrypt_with::<cfb_mode::Decryptor<Aes192>>(key, iv, buf),
        32 => decrypt_with::<cfb_mode::Decryptor<Aes256>>(key, iv, buf),
        n => Err(CipherError::InvalidKeySize(n)),
    }
}

fn encrypt_with<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError>
where
    C: KeyIvInit + AsyncStreamCipher + BlockEncryptMut,
{
    C::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeySize(key.len()))?
        .encrypt(buf);
    Ok(())
}

fn decrypt_with<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError>
where
    C: KeyIvInit + AsyncStreamCipher + BlockDecryptMut,
{
    C::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeySize(key.len()))?
        .decrypt(buf);
    Ok(())
}
