//! [`FieldKey`]: owned, caller-supplied key material.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{cipher::check_key, CipherError};

/// Key bytes handed to the codec by the caller.
///
/// The length is checked once at construction (16, 24 or 32 bytes). The buffer
/// is overwritten with zeroes on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FieldKey(Vec<u8>);

impl FieldKey {
    /// Take ownership of raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeySize`] if `bytes` is not 16, 24 or 32 bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CipherError> {
        if let Err(e) = check_key(&bytes) {
            let mut bytes = bytes;
            bytes.zeroize();
            return Err(e);
        }
        Ok(Self(bytes))
    }

    /// Decode a standard-base64 key, as supplied through configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedCiphertext`] if `text` is not base64, or
    /// [`CipherError::InvalidKeySize`] if the decoded key has the wrong length.
    pub fn from_base64(text: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|_| CipherError::MalformedCiphertext("key is not base64"))?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for FieldKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldKey([REDACTED])")
    }
}
