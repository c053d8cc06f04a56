//! PDF Object Model
//!
//! Values produced by the object parser, per ISO 32000-1 Section 7.3.

use bytes::Bytes;
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

/// Identity of an indirect object: object number and generation number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    pub const fn number(&self) -> u32 {
        self.number
    }

    pub const fn generation(&self) -> u16 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

impl From<(u32, u16)> for ObjectId {
    fn from((number, generation): (u32, u16)) -> Self {
        Self::new(number, generation)
    }
}

/// PDF Name object
///
/// Names coming out of the parser are interned by [`super::PdfContext`], so
/// equal names usually share one allocation and compare by pointer.
#[derive(Debug, Clone, Eq)]
pub struct PdfName(Arc<str>);

impl PdfName {
    /// Create a standalone (not interned) name
    pub fn new(name: &str) -> Self {
        PdfName(Arc::from(name))
    }

    pub(crate) fn from_shared(name: Arc<str>) -> Self {
        PdfName(name)
    }

    pub(crate) fn shared(&self) -> &Arc<str> {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both names point at the same interned allocation
    pub fn ptr_eq(&self, other: &PdfName) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for PdfName {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Hash for PdfName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl Borrow<str> for PdfName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

/// PDF literal string, already un-escaped and decrypted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfString(pub Vec<u8>);

impl PdfString {
    pub fn new(data: Vec<u8>) -> Self {
        PdfString(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get as UTF-8 string if possible
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.0)
    }

    /// Interpret each byte as one Latin-1 character
    pub fn to_latin1(&self) -> String {
        self.0.iter().map(|&b| b as char).collect()
    }
}

/// PDF hexadecimal string
///
/// Holds the hex text found between `<` and `>`. Decryption re-encodes the
/// plaintext as lowercase, zero-padded hex, so the representation is always
/// hex text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfHexString(pub String);

impl PdfHexString {
    pub fn new(hex: impl Into<String>) -> Self {
        PdfHexString(hex.into())
    }

    /// Encode raw bytes as a hex string
    pub fn from_bytes(bytes: &[u8]) -> Self {
        PdfHexString(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the hex text into bytes
    ///
    /// Whitespace is skipped, an odd trailing digit is padded with `0`, and
    /// characters that are not hex digits count as `0`.
    pub fn decode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() / 2 + 1);
        let mut high: Option<u8> = None;

        for ch in self.0.bytes().filter(|b| !b.is_ascii_whitespace()) {
            let nibble = match ch {
                b'0'..=b'9' => ch - b'0',
                b'a'..=b'f' => ch - b'a' + 10,
                b'A'..=b'F' => ch - b'A' + 10,
                _ => 0,
            };
            match high.take() {
                Some(h) => bytes.push((h << 4) | nibble),
                None => high = Some(nibble),
            }
        }
        if let Some(h) = high {
            bytes.push(h << 4);
        }

        bytes
    }
}

/// PDF Array object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfArray(pub Vec<PdfObject>);

impl PdfArray {
    pub fn new() -> Self {
        PdfArray(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PdfObject> {
        self.0.get(index)
    }

    pub fn push(&mut self, obj: PdfObject) {
        self.0.push(obj);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PdfObject> {
        self.0.iter()
    }
}

/// Role of a dictionary, derived from its `/Type` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DictRole {
    /// No recognized `/Type`
    #[default]
    Generic,
    /// Document catalog (`/Type /Catalog`)
    Catalog,
    /// Intermediate page tree node (`/Type /Pages`)
    Pages,
    /// Page tree leaf (`/Type /Page`)
    Page,
}

impl DictRole {
    /// Select the role for a `/Type` value
    pub fn from_type(type_name: Option<&str>) -> Self {
        match type_name {
            Some("Catalog") => DictRole::Catalog,
            Some("Pages") => DictRole::Pages,
            Some("Page") => DictRole::Page,
            _ => DictRole::Generic,
        }
    }
}

/// PDF Dictionary object
///
/// Keys keep their insertion order; inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfDictionary {
    entries: IndexMap<PdfName, PdfObject>,
    role: DictRole,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary, promoting it to a specialized role when its
    /// `/Type` is `Catalog`, `Pages`, or `Page`
    pub fn from_entries(entries: IndexMap<PdfName, PdfObject>) -> Self {
        let role = DictRole::from_type(
            entries
                .get("Type")
                .and_then(PdfObject::as_name)
                .map(PdfName::as_str),
        );
        Self { entries, role }
    }

    pub fn role(&self) -> DictRole {
        self.role
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    /// Insert a key-value pair, returning the previous value
    pub fn insert(&mut self, key: PdfName, value: PdfObject) -> Option<PdfObject> {
        let retype = key.as_str() == "Type";
        let previous = self.entries.insert(key, value);
        if retype {
            self.role = DictRole::from_type(self.get_type());
        }
        previous
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, PdfName, PdfObject> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, PdfName, PdfObject> {
        self.entries.keys()
    }

    /// Get the dictionary type (value of /Type key)
    pub fn get_type(&self) -> Option<&str> {
        self.get("Type")
            .and_then(PdfObject::as_name)
            .map(PdfName::as_str)
    }
}

/// PDF Stream object: dictionary plus raw, still-encoded contents
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    data: Bytes,
    span: Range<usize>,
    decrypted: bool,
}

impl PdfStream {
    /// `span` is the byte window the contents were taken from
    pub fn new(dict: PdfDictionary, data: Bytes, span: Range<usize>) -> Self {
        Self {
            dict,
            data,
            span,
            decrypted: false,
        }
    }

    pub(crate) fn with_decrypted(mut self, data: Vec<u8>) -> Self {
        self.data = Bytes::from(data);
        self.decrypted = true;
        self
    }

    /// Get the raw (possibly compressed) stream data
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the raw data
    pub fn raw_bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Byte window `[start, end)` of the contents in the parsed buffer
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_decrypted(&self) -> bool {
        self.decrypted
    }

    /// Contents as Latin-1 text
    pub fn contents_string(&self) -> String {
        self.data.iter().map(|&b| b as char).collect()
    }
}

/// PDF Object types
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(PdfName),
    String(PdfString),
    HexString(PdfHexString),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    Reference(ObjectId),
}

impl PdfObject {
    pub fn is_null(&self) -> bool {
        matches!(self, PdfObject::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PdfObject::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfObject::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as real number (integers are widened)
    pub fn as_real(&self) -> Option<f64> {
        match self {
            PdfObject::Real(r) => Some(*r),
            PdfObject::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            PdfObject::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            PdfObject::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_hex_string(&self) -> Option<&PdfHexString> {
        match self {
            PdfObject::HexString(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PdfArray> {
        match self {
            PdfObject::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as dictionary (a stream exposes its dictionary)
    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfObject::Dictionary(d) => Some(d),
            PdfObject::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&PdfStream> {
        match self {
            PdfObject::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            PdfObject::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            PdfObject::Null => "null",
            PdfObject::Boolean(_) => "boolean",
            PdfObject::Integer(_) => "integer",
            PdfObject::Real(_) => "real",
            PdfObject::Name(_) => "name",
            PdfObject::String(_) => "string",
            PdfObject::HexString(_) => "hex string",
            PdfObject::Array(_) => "array",
            PdfObject::Dictionary(_) => "dictionary",
            PdfObject::Stream(_) => "stream",
            PdfObject::Reference(_) => "reference",
        }
    }
}

impl From<bool> for PdfObject {
    fn from(b: bool) -> Self {
        PdfObject::Boolean(b)
    }
}

impl From<i64> for PdfObject {
    fn from(i: i64) -> Self {
        PdfObject::Integer(i)
    }
}

impl From<f64> for PdfObject {
    fn from(f: f64) -> Self {
        PdfObject::Real(f)
    }
}

impl From<ObjectId> for PdfObject {
    fn from(id: ObjectId) -> Self {
        PdfObject::Reference(id)
    }
}

impl From<PdfName> for PdfObject {
    fn from(name: PdfName) -> Self {
        PdfObject::Name(name)
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

impl From<PdfArray> for PdfObject {
    fn from(array: PdfArray) -> Self {
        PdfObject::Array(array)
    }
}
