//! Document-wide parsing context
//!
//! The context is threaded explicitly through every parse call. It interns
//! names, keeps the registry of indirect objects the loader has assigned,
//! and supplies the cipher transform factory of encrypted documents.

use super::objects::{ObjectId, PdfName, PdfObject};
use crate::encryption::CipherTransformFactory;
use crate::error::{PdfError, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub struct PdfContext {
    names: FxHashSet<Arc<str>>,
    objects: IndexMap<ObjectId, PdfObject>,
    largest_object_number: u32,
    crypto: Option<Arc<dyn CipherTransformFactory>>,
}

impl PdfContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for an encrypted document
    pub fn with_crypto(crypto: Arc<dyn CipherTransformFactory>) -> Self {
        Self {
            crypto: Some(crypto),
            ..Self::default()
        }
    }

    pub fn set_crypto(&mut self, crypto: Option<Arc<dyn CipherTransformFactory>>) {
        self.crypto = crypto;
    }

    pub fn crypto(&self) -> Option<&Arc<dyn CipherTransformFactory>> {
        self.crypto.as_ref()
    }

    /// Return the shared instance of `name`
    pub fn intern(&mut self, name: &str) -> PdfName {
        if let Some(shared) = self.names.get(name) {
            return PdfName::from_shared(Arc::clone(shared));
        }
        let shared: Arc<str> = Arc::from(name);
        self.names.insert(Arc::clone(&shared));
        PdfName::from_shared(shared)
    }

    /// Whether `name` is the interned instance held by this context
    pub fn is_interned(&self, name: &PdfName) -> bool {
        self.names
            .get(name.as_str())
            .is_some_and(|shared| Arc::ptr_eq(shared, name.shared()))
    }

    pub fn interned_name_count(&self) -> usize {
        self.names.len()
    }

    /// Register an indirect object, replacing any previous one with this id
    pub fn assign(&mut self, id: ObjectId, object: PdfObject) -> Option<PdfObject> {
        self.largest_object_number = self.largest_object_number.max(id.number());
        self.objects.insert(id, object)
    }

    pub fn lookup(&self, id: ObjectId) -> Option<&PdfObject> {
        self.objects.get(&id)
    }

    /// Like [`PdfContext::lookup`], failing for unknown ids
    pub fn resolve(&self, id: ObjectId) -> Result<&PdfObject> {
        self.lookup(id)
            .ok_or(PdfError::InvalidObjectReference(id.number(), id.generation()))
    }

    /// Follow `object` through the registry if it is a reference
    pub fn dereference<'a>(&'a self, object: &'a PdfObject) -> Option<&'a PdfObject> {
        match object {
            PdfObject::Reference(id) => self.lookup(*id),
            other => Some(other),
        }
    }

    /// A fresh identity above every assigned object number
    pub fn next_ref(&mut self) -> ObjectId {
        self.largest_object_number += 1;
        ObjectId::new(self.largest_object_number, 0)
    }

    pub fn largest_object_number(&self) -> u32 {
        self.largest_object_number
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Registered objects in assignment order
    pub fn enumerate(&self) -> impl Iterator<Item = (ObjectId, &PdfObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }
}

impl fmt::Debug for PdfContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfContext")
            .field("names", &self.names.len())
            .field("objects", &self.objects.len())
            .field("largest_object_number", &self.largest_object_number)
            .field("encrypted", &self.crypto.is_some())
            .finish()
    }
}
