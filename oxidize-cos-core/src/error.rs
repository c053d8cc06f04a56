use crate::encryption::EncryptionError;
use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("Invalid object reference: {0} {1} R")]
    InvalidObjectReference(u32, u16),
}

pub type Result<T> = std::result::Result<T, PdfError>;
