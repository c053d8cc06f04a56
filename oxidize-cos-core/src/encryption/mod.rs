//! Decryption hook for encrypted documents, ISO 32000-1 Section 7.6
//!
//! The parser does not implement any cipher. The document loader derives
//! the key material from the encryption dictionary and registers a
//! [`CipherTransformFactory`] on the [`crate::parser::PdfContext`]; the
//! parser then asks it for a [`CipherTransform`] per indirect object and
//! feeds it the raw bytes of every string, hex string and stream body.

use crate::parser::ObjectId;
use thiserror::Error;

/// Errors reported by cipher transforms
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("Ciphertext of {0} bytes is not valid for this cipher")]
    InvalidCiphertext(usize),

    #[error("Decrypted output of {output} bytes is longer than its {input} byte input")]
    OutputTooLong { input: usize, output: usize },

    #[error("No key available for object {0}")]
    MissingKey(ObjectId),

    #[error("Cipher failure: {0}")]
    Cipher(String),
}

/// Decrypts the contents of one indirect object
pub trait CipherTransform {
    /// Return the plaintext for `data`; never longer than `data`
    fn decrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>, EncryptionError>;
}

/// Produces the cipher transform of an indirect object from its identity
///
/// Shared by every parser working on the same document.
pub trait CipherTransformFactory: Send + Sync {
    fn create_cipher_transform(&self, id: ObjectId) -> Box<dyn CipherTransform>;
}

impl<F> CipherTransform for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, EncryptionError>,
{
    fn decrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        self(data)
    }
}

/// Decrypt `data` with the transform `factory` creates for `id`
///
/// Enforces that the plaintext is not longer than the ciphertext.
pub fn decrypt_for(
    factory: &dyn CipherTransformFactory,
    id: ObjectId,
    data: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let transform = factory.create_cipher_transform(id);
    let plain = transform.decrypt_bytes(data)?;
    if plain.len() > data.len() {
        return Err(EncryptionError::OutputTooLong {
            input: data.len(),
            output: plain.len(),
        });
    }
    Ok(plain)
}
