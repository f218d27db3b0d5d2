//! CRUD orchestration over a [`Store`].
//!
//! A [`Crud`] is bound to one store and one identifier field; the field keys every
//! single-resource lookup and mutation. Each call parses the raw
//! parameters, hands the compiled filter and pagination to the store, and projects what
//! comes back. "Not found" resolves to [`Resolution::Absent`] or `None`; only malformed
//! calls and store failures are errors.

use std::time::Instant;

use crate::config::{EngineConfig, effective_limit};
use crate::errors::RestError;
use crate::query::{Coercion, ProjectionSpec, compile_filters, parse_params, project_resource, project_resources};
use crate::store::{Store, UpdateMode};
use crate::types::{RawParams, Resource};
use crate::utils::devlog::bench_line;
use crate::utils::logger::AUDIT_TARGET;
use crate::utils::num::{elapsed_ms, usize_to_u64};

/// Outcome of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    One(Resource),
    Many(Vec<Resource>),
    Absent,
}

impl Resolution {
    #[must_use]
    pub fn into_one(self) -> Option<Resource> {
        match self {
            Self::One(r) => Some(r),
            _ => None,
        }
    }

    /// The list for `Many`, a single-element list for `One`, empty for `Absent`.
    #[must_use]
    pub fn into_many(self) -> Vec<Resource> {
        match self {
            Self::Many(v) => v,
            Self::One(r) => vec![r],
            Self::Absent => Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(v) => v.len(),
            Self::Absent => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct Crud<S: Store> {
    store: S,
    id_field: String,
    coercion: Coercion,
    default_limit: Option<usize>,
    max_limit: Option<usize>,
}

impl<S: Store> Crud<S> {
    pub fn new(store: S, id_field: impl Into<String>) -> Self {
        Self {
            store,
            id_field: id_field.into(),
            coercion: Coercion::default(),
            default_limit: None,
            max_limit: None,
        }
    }

    pub fn from_config(store: S, cfg: &EngineConfig) -> Self {
        Self {
            store,
            id_field: cfg.id_field.clone(),
            coercion: cfg.coercion,
            default_limit: cfg.default_limit,
            max_limit: cfg.max_limit,
        }
    }

    #[must_use]
    pub fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, default_limit: Option<usize>, max_limit: Option<usize>) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Reads one resource when `id` is given, otherwise a filtered, sorted, paginated list.
    ///
    /// On the single-resource path only `columns` and `populate` are honoured.
    ///
    /// # Errors
    /// Store failures, unchanged.
    pub async fn get(&self, id: Option<&str>, params: &RawParams) -> Result<Resolution, RestError> {
        let started = Instant::now();
        let op = if id.is_some() { "get_one" } else { "get_many" };
        log::debug!("{op} {}: received {} params", self.store.name(), params.len());
        let spec = parse_params(params);
        log::debug!("{op} {}: parsed {spec:?}", self.store.name());

        let resolution = match id {
            Some(id) => {
                log::debug!("{op} {}: fetching {id}", self.store.name());
                match self.store.find_one(&self.id_field, id).await? {
                    Some(doc) => Resolution::One(
                        project_resource(&self.store, doc, &spec.projection, &spec.populate, &self.id_field)
                            .await?,
                    ),
                    None => Resolution::Absent,
                }
            }
            None => {
                let filter = compile_filters(&spec.filters, self.coercion);
                let limit = effective_limit(spec.limit, self.default_limit, self.max_limit);
                log::debug!(
                    "{op} {}: fetching filter={filter:?} limit={limit:?} offset={:?}",
                    self.store.name(),
                    spec.offset
                );
                let docs = self.store.find_many(&filter, &spec.sort, limit, spec.offset).await?;
                Resolution::Many(
                    project_resources(&self.store, docs, &spec.projection, &spec.populate, &self.id_field)
                        .await?,
                )
            }
        };
        self.resolved(op, started, resolution.len());
        Ok(resolution)
    }

    /// Creates a resource from `body`.
    ///
    /// # Errors
    /// `MissingBody` when there is no body or it has no fields; store failures otherwise.
    pub async fn post(&self, body: Option<Resource>) -> Result<Resource, RestError> {
        let started = Instant::now();
        let body = match body {
            Some(b) if !b.is_empty() => b,
            _ => return Err(self.rejected("post", RestError::MissingBody("post"))),
        };
        log::debug!("post {}: mutating with {} fields", self.store.name(), body.len());
        let created = self.store.create(&self.id_field, body).await?;
        let out = self.default_view(created);
        log::info!(
            target: AUDIT_TARGET,
            "post collection={} id={}",
            self.store.name(),
            self.id_of(&out)
        );
        self.resolved("post", started, 1);
        Ok(out)
    }

    /// Replaces every non-identifier field of `id`.
    ///
    /// # Errors
    /// `MissingBody` without a body; store failures otherwise.
    pub async fn put(&self, id: &str, body: Option<Resource>) -> Result<Option<Resource>, RestError> {
        self.update("put", id, body, UpdateMode::Replace).await
    }

    /// Merges the top-level fields of `body` into `id`.
    ///
    /// # Errors
    /// `MissingBody` without a body; store failures otherwise.
    pub async fn patch(&self, id: &str, body: Option<Resource>) -> Result<Option<Resource>, RestError> {
        self.update("patch", id, body, UpdateMode::Merge).await
    }

    /// Removes `id`, resolving to the resource as it was just before removal.
    ///
    /// # Errors
    /// Store failures, unchanged.
    pub async fn delete(&self, id: &str) -> Result<Option<Resource>, RestError> {
        let started = Instant::now();
        log::debug!("delete {}: mutating {id}", self.store.name());
        let removed = self.store.delete(&self.id_field, id).await?.map(|d| self.default_view(d));
        if removed.is_some() {
            log::info!(target: AUDIT_TARGET, "delete collection={} id={id}", self.store.name());
        }
        self.resolved("delete", started, usize::from(removed.is_some()));
        Ok(removed)
    }

    async fn update(
        &self,
        op: &'static str,
        id: &str,
        body: Option<Resource>,
        mode: UpdateMode,
    ) -> Result<Option<Resource>, RestError> {
        let started = Instant::now();
        let Some(body) = body else {
            return Err(self.rejected(op, RestError::MissingBody(op)));
        };
        log::debug!("{op} {}: mutating {id} with {} fields", self.store.name(), body.len());
        let updated = self.store.update(&self.id_field, id, body, mode).await?.map(|d| self.default_view(d));
        if updated.is_some() {
            log::info!(target: AUDIT_TARGET, "{op} collection={} id={id}", self.store.name());
        }
        self.resolved(op, started, usize::from(updated.is_some()));
        Ok(updated)
    }

    fn default_view(&self, doc: Resource) -> Resource {
        crate::query::project_fields(doc, &ProjectionSpec::All, self.store.schema(), &self.id_field)
    }

    fn id_of(&self, doc: &Resource) -> String {
        doc.get(&self.id_field)
            .and_then(crate::store::id_string)
            .unwrap_or_default()
    }

    fn rejected(&self, op: &str, err: RestError) -> RestError {
        log::debug!("{op} {}: rejected: {err}", self.store.name());
        err
    }

    fn resolved(&self, op: &str, started: Instant, count: usize) {
        let ms = elapsed_ms(started);
        log::debug!("{op} {}: resolved {count} in {ms} ms", self.store.name());
        crate::dev6!("{}", bench_line(op, self.store.name(), ms, usize_to_u64(count)));
    }
}
