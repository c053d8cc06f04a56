//! # oxidize-cos
//!
//! A pure Rust parser for the COS object layer of PDF files: booleans,
//! numbers, names, literal and hexadecimal strings, arrays, dictionaries,
//! streams and indirect references, read from an in-memory byte buffer.
//!
//! ## Features
//!
//! - **Backtracking parser**: `1 0 R` references and plain numbers are told
//!   apart by lookahead with checkpoint and restore
//! - **Stream recovery**: wrong or missing `/Length` entries fall back to a
//!   nesting-aware scan for `endstream`
//! - **Decryption hook**: strings and stream bodies are decrypted under the
//!   identity of their enclosing indirect object
//! - **Lenient by default**: recoverable problems become [`ParseWarning`]s
//!   attached to the parsed value instead of errors
//!
//! ## Quick Start
//!
//! ```rust
//! use oxidize_cos::{ObjectParser, PdfContext, PdfObject};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut context = PdfContext::new();
//! let mut parser = ObjectParser::for_bytes(
//!     &b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>"[..],
//!     &mut context,
//! );
//!
//! let parsed = parser.parse_object(None)?;
//! let dict = parsed.value.as_dict().unwrap();
//! assert_eq!(dict.get_type(), Some("Pages"));
//! assert_eq!(dict.get("Count"), Some(&PdfObject::Integer(1)));
//! assert!(parsed.warnings.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ### Encrypted documents
//!
//! ```rust
//! use oxidize_cos::encryption::{CipherTransform, CipherTransformFactory, EncryptionError};
//! use oxidize_cos::{ObjectId, ObjectParser, PdfContext};
//! use std::sync::Arc;
//!
//! struct Invert;
//!
//! impl CipherTransformFactory for Invert {
//!     fn create_cipher_transform(&self, _id: ObjectId) -> Box<dyn CipherTransform> {
//!         Box::new(|data: &[u8]| -> Result<Vec<u8>, EncryptionError> {
//!             Ok(data.iter().map(|b| !b).collect())
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut context = PdfContext::with_crypto(Arc::new(Invert));
//! let mut parser = ObjectParser::for_bytes(&b"<B7BAB3B3B0>"[..], &mut context);
//!
//! let parsed = parser.parse_object(Some(ObjectId::new(4, 0)))?;
//! assert_eq!(parsed.value.as_hex_string().unwrap().decode(), b"HELLO");
//! # Ok(())
//! # }
//! ```

pub mod encryption;
pub mod error;
pub mod parser;

pub use error::{PdfError, Result};

// Re-export parsing types
pub use parser::{
    DictRole, ObjectId, ObjectParser, ParseError, ParseOptions, ParseResult, ParseWarning,
    Parsed, PdfArray, PdfContext, PdfDictionary, PdfHexString, PdfName, PdfObject, PdfStream,
    PdfString,
};

/// Current version of oxidize-cos
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
