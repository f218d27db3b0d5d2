//! Store collaborator contract and the in-memory reference implementation.

pub mod memory;

use async_trait::async_trait;
use bson::Bson;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::RestError;
use crate::query::{Filter, SortClause};
use crate::types::{CollectionName, Resource};

pub use memory::{MemoryCollection, MemoryEngine, MemoryStore};

/// Visibility and relation introspection for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Fields never returned to callers.
    #[serde(default)]
    pub hidden: BTreeSet<String>,
    /// Reference fields and the collection they point into.
    #[serde(default)]
    pub relations: BTreeMap<String, CollectionName>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hide(mut self, field: impl Into<String>) -> Self {
        self.hidden.insert(field.into());
        self
    }

    #[must_use]
    pub fn relation(mut self, field: impl Into<String>, collection: impl Into<String>) -> Self {
        self.relations.insert(field.into(), collection.into());
        self
    }

    #[must_use]
    pub fn is_hidden(&self, field: &str) -> bool {
        self.hidden.contains(field)
    }

    #[must_use]
    pub fn relation_target(&self, field: &str) -> Option<&str> {
        self.relations.get(field).map(String::as_str)
    }
}

/// How an update body is applied to the stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Every non-identifier field is replaced by the body.
    Replace,
    /// Body fields are set, other fields are kept.
    Merge,
}

/// The document collection the CRUD engine runs against.
///
/// Absence is `Ok(None)`; `Err` is reserved for real failures and is passed to callers as is.
/// Identifier operations are keyed on the field the caller was configured with.
#[async_trait]
pub trait Store: Send + Sync {
    /// Collection name, used in logs.
    fn name(&self) -> &str;

    fn schema(&self) -> &Schema;

    async fn find_many(
        &self,
        filter: &Filter,
        sort: &[SortClause],
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Resource>, RestError>;

    async fn find_one(&self, id_field: &str, id: &str) -> Result<Option<Resource>, RestError>;

    /// Stores `body`, assigning an identifier under `id_field` when it has none.
    async fn create(&self, id_field: &str, body: Resource) -> Result<Resource, RestError>;

    async fn update(
        &self,
        id_field: &str,
        id: &str,
        body: Resource,
        mode: UpdateMode,
    ) -> Result<Option<Resource>, RestError>;

    /// Removes the resource and returns it as it was before removal.
    async fn delete(&self, id_field: &str, id: &str) -> Result<Option<Resource>, RestError>;

    /// Fetches what `reference` in relation `field` points at, with the target's
    /// default visibility applied.
    async fn find_related(&self, field: &str, reference: &Bson) -> Result<Option<Resource>, RestError>;
}

/// Identifier string for a stored id value; `None` for values that cannot be ids.
#[must_use]
pub fn id_string(v: &Bson) -> Option<String> {
    match v {
        Bson::String(s) => Some(s.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::Int32(i) => Some(i.to_string()),
        Bson::Int64(i) => Some(i.to_string()),
        _ => None,
    }
}
