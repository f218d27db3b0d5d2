// Submodules for separation of concerns
mod compile;
mod eval;
mod parse;
mod project;
mod types;

// Public API re-exports
pub use compile::{candidates, coerce_scalar, compile_clause, compile_filters};
pub use eval::{compare_bson, compare_docs, eval_filter, get_path, values_equal};
pub use parse::{parse_filter_clause, parse_params, parse_sort_token};
pub use project::{populate, project_fields, project_resource, project_resources};
pub use types::{
    Coercion, Direction, Filter, FilterClause, ProjectionSpec, QuerySpec, RESERVED_KEYS,
    RelationSpec, SortClause, is_reserved,
};
