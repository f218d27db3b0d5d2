//! In-memory document collections implementing [`Store`].
//!
//! A [`MemoryEngine`] owns named collections; a [`MemoryStore`] binds one of them to the
//! `Store` contract and resolves relations through the engine. Each collection keeps its
//! documents in insertion order behind a `parking_lot::RwLock` that is never held across an
//! `.await`.

use async_trait::async_trait;
use bson::Bson;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::sync::Arc;
use uuid::Uuid;

use super::{Schema, Store, UpdateMode, id_string};
use crate::errors::RestError;
use crate::query::{Filter, SortClause, compare_docs, eval_filter};
use crate::types::{CollectionName, Resource};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

pub struct MemoryCollection {
    name: String,
    id_field: String,
    schema: Schema,
    timestamps: bool,
    docs: RwLock<Vec<Resource>>,
}

impl std::fmt::Debug for MemoryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCollection")
            .field("name", &self.name)
            .field("id_field", &self.id_field)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl MemoryCollection {
    #[must_use]
    pub fn new(name: impl Into<String>, id_field: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            schema,
            timestamps: false,
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Stamp `createdAt` / `updatedAt` on writes.
    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn position(docs: &[Resource], id_field: &str, id: &str) -> Option<usize> {
        docs.iter()
            .position(|d| d.get(id_field).and_then(id_string).is_some_and(|s| s == id))
    }

    /// Inserts a document, assigning a UUID identifier when the body has none.
    ///
    /// # Errors
    /// `DuplicateId` when the identifier is taken, `InvalidId` when it is not a usable id.
    pub fn insert_document(&self, doc: Resource) -> Result<Resource, RestError> {
        self.insert_keyed(&self.id_field, doc)
    }

    /// Same as [`Self::insert_document`], keyed on `id_field` instead of the collection's own.
    ///
    /// # Errors
    /// See [`Self::insert_document`].
    pub fn insert_keyed(&self, id_field: &str, mut doc: Resource) -> Result<Resource, RestError> {
        let id = match doc.get(id_field) {
            Some(v) => id_string(v)
                .ok_or_else(|| RestError::InvalidId(format!("{id_field} must be a string or integer")))?,
            None => {
                let id = Uuid::new_v4().to_string();
                doc.insert(id_field, Bson::String(id.clone()));
                id
            }
        };
        if self.timestamps {
            let now = now_bson();
            doc.insert(CREATED_AT, now.clone());
            doc.insert(UPDATED_AT, now);
        }
        let mut docs = self.docs.write();
        if Self::position(&docs, id_field, &id).is_some() {
            return Err(RestError::DuplicateId(id));
        }
        docs.push(doc.clone());
        Ok(doc)
    }

    #[must_use]
    pub fn find_document(&self, id: &str) -> Option<Resource> {
        self.find_keyed(&self.id_field, id)
    }

    #[must_use]
    pub fn find_keyed(&self, id_field: &str, id: &str) -> Option<Resource> {
        let docs = self.docs.read();
        Self::position(&docs, id_field, id).map(|i| docs[i].clone())
    }

    /// Applies `body` to the document with `id`; the identifier itself never changes.
    pub fn update_document(&self, id: &str, body: Resource, mode: UpdateMode) -> Option<Resource> {
        self.update_keyed(&self.id_field, id, body, mode)
    }

    pub fn update_keyed(
        &self,
        id_field: &str,
        id: &str,
        mut body: Resource,
        mode: UpdateMode,
    ) -> Option<Resource> {
        body.remove(id_field);
        if self.timestamps {
            body.remove(CREATED_AT);
        }
        let mut docs = self.docs.write();
        let i = Self::position(&docs, id_field, id)?;
        let current = &mut docs[i];
        match mode {
            UpdateMode::Replace => {
                let mut next = Resource::new();
                if let Some(idv) = current.get(id_field) {
                    next.insert(id_field, idv.clone());
                }
                for (k, v) in body {
                    next.insert(k, v);
                }
                if self.timestamps
                    && let Some(created) = current.get(CREATED_AT)
                {
                    next.insert(CREATED_AT, created.clone());
                }
                *current = next;
            }
            UpdateMode::Merge => {
                for (k, v) in body {
                    current.insert(k, v);
                }
            }
        }
        if self.timestamps {
            current.insert(UPDATED_AT, now_bson());
        }
        Some(current.clone())
    }

    /// Removes and returns the document with `id`.
    pub fn delete_document(&self, id: &str) -> Option<Resource> {
        self.delete_keyed(&self.id_field, id)
    }

    pub fn delete_keyed(&self, id_field: &str, id: &str) -> Option<Resource> {
        let mut docs = self.docs.write();
        let i = Self::position(&docs, id_field, id)?;
        Some(docs.remove(i))
    }

    /// Filter, stable sort, then skip/take. Insertion order when `sort` is empty.
    #[must_use]
    pub fn query(
        &self,
        filter: &Filter,
        sort: &[SortClause],
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Vec<Resource> {
        let mut out: Vec<Resource> =
            self.docs.read().iter().filter(|d| eval_filter(d, filter)).cloned().collect();
        if !sort.is_empty() {
            out.sort_by(|a, b| compare_docs(a, b, sort));
        }
        out.into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Copy of `doc` without this collection's hidden fields.
    #[must_use]
    pub fn strip_hidden(&self, mut doc: Resource) -> Resource {
        for field in &self.schema.hidden {
            doc.remove(field);
        }
        doc
    }

    #[must_use]
    pub fn get_all_documents(&self) -> Vec<Resource> {
        self.docs.read().clone()
    }

    /// Loads newline-delimited JSON objects; blank lines are skipped.
    ///
    /// # Errors
    /// Fails on I/O errors, malformed lines and identifier conflicts.
    pub fn load_ndjson<R: Read>(&self, reader: R) -> Result<usize, RestError> {
        let mut reader = BufReader::new(reader);
        let mut buf = String::with_capacity(8 * 1024);
        let mut inserted = 0usize;
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                break;
            }
            let line = buf.trim();
            if line.is_empty() {
                continue;
            }
            let doc = crate::utils::json::parse_json_to_resource(line)?;
            self.insert_document(doc)?;
            inserted += 1;
        }
        log::info!("loaded {inserted} documents into {}", self.name);
        Ok(inserted)
    }

    /// Writes every stored document as one JSON line, in storage order.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_ndjson<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut w = BufWriter::new(writer);
        for doc in self.get_all_documents() {
            let v = crate::utils::json::resource_to_json(doc);
            writeln!(w, "{v}")?;
        }
        w.flush()
    }
}

fn now_bson() -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(Utc::now().timestamp_millis()))
}

/// Registry of named in-memory collections.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    collections: RwLock<HashMap<CollectionName, Arc<MemoryCollection>>>,
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a collection, replacing any previous one with the same name.
    pub fn add_collection(&self, collection: MemoryCollection) -> Arc<MemoryCollection> {
        let col = Arc::new(collection);
        let prev = self.collections.write().insert(col.name().to_string(), col.clone());
        if prev.is_some() {
            log::warn!("replaced existing collection {}", col.name());
        }
        col
    }

    pub fn create_collection(&self, name: &str, id_field: &str, schema: Schema) -> Arc<MemoryCollection> {
        self.add_collection(MemoryCollection::new(name, id_field, schema))
    }

    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<MemoryCollection>> {
        self.collections.read().get(name).cloned()
    }

    pub fn delete_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    #[must_use]
    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// A `Store` bound to the named collection.
    ///
    /// # Errors
    /// `NoSuchCollection` when the collection was never registered.
    pub fn store(self: &Arc<Self>, name: &str) -> Result<MemoryStore, RestError> {
        let collection =
            self.get_collection(name).ok_or_else(|| RestError::NoSuchCollection(name.to_string()))?;
        Ok(MemoryStore { engine: Arc::clone(self), collection })
    }
}

/// One collection of a [`MemoryEngine`] seen through the `Store` contract.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    engine: Arc<MemoryEngine>,
    collection: Arc<MemoryCollection>,
}

impl MemoryStore {
    #[must_use]
    pub fn collection(&self) -> &Arc<MemoryCollection> {
        &self.collection
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &str {
        self.collection.name()
    }

    fn schema(&self) -> &Schema {
        self.collection.schema()
    }

    async fn find_many(
        &self,
        filter: &Filter,
        sort: &[SortClause],
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Resource>, RestError> {
        Ok(self.collection.query(filter, sort, limit, offset))
    }

    async fn find_one(&self, id_field: &str, id: &str) -> Result<Option<Resource>, RestError> {
        Ok(self.collection.find_keyed(id_field, id))
    }

    async fn create(&self, id_field: &str, body: Resource) -> Result<Resource, RestError> {
        self.collection.insert_keyed(id_field, body)
    }

    async fn update(
        &self,
        id_field: &str,
        id: &str,
        body: Resource,
        mode: UpdateMode,
    ) -> Result<Option<Resource>, RestError> {
        Ok(self.collection.update_keyed(id_field, id, body, mode))
    }

    async fn delete(&self, id_field: &str, id: &str) -> Result<Option<Resource>, RestError> {
        Ok(self.collection.delete_keyed(id_field, id))
    }

    async fn find_related(&self, field: &str, reference: &Bson) -> Result<Option<Resource>, RestError> {
        let Some(target) = self.collection.schema().relation_target(field) else {
            return Ok(None);
        };
        let target = self
            .engine
            .get_collection(target)
            .ok_or_else(|| RestError::NoSuchCollection(target.to_string()))?;
        let Some(id) = id_string(reference) else {
            return Ok(None);
        };
        Ok(target.find_document(&id).map(|d| target.strip_hidden(d)))
    }
}
