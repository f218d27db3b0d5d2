use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 16;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;

/// Query keys that configure the query itself and never become filters.
pub const RESERVED_KEYS: [&str; 5] = ["columns", "populate", "limit", "offset", "sort"];

#[must_use]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub negate: bool,
    pub value: String,
}

/// Which fields a resolved resource carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionSpec {
    /// Every field the store considers visible.
    #[default]
    All,
    /// Only these fields (plus the identifier).
    Include(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSpec {
    pub field: String,
}

/// Normalized form of one request's query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub filters: Vec<FilterClause>,
    pub sort: Vec<SortClause>,
    pub projection: ProjectionSpec,
    pub populate: Vec<RelationSpec>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// How filter values (always strings on the wire) are matched against typed fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    /// Match the raw string or its boolean/null/numeric reading.
    #[default]
    Lenient,
    /// Match the raw string only.
    Strict,
}

/// Predicate handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    /// Field equals one of `values` (or, for arrays, contains one).
    In { path: String, values: Vec<Bson> },
    /// Field is missing or equals none of `values`.
    Nin { path: String, values: Vec<Bson> },
}
