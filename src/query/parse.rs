use crate::types::{ParamValue, RawParams};

use super::types::{
    Direction, FilterClause, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, ProjectionSpec, QuerySpec,
    RelationSpec, SortClause, is_reserved,
};

/// Builds a `QuerySpec` from raw request parameters.
///
/// Parsing is total: malformed values degrade to "absent" instead of failing.
/// - `columns` / `populate`: comma separated, possibly multi-valued.
/// - `sort`: comma or whitespace separated tokens, `-field` for descending.
/// - `limit` / `offset`: non-negative integers; anything else is ignored.
/// - every other key is an equality filter, negated when its value starts with `!`.
#[must_use]
pub fn parse_params(raw: &RawParams) -> QuerySpec {
    let mut spec = QuerySpec::default();
    for (key, value) in raw.iter() {
        if is_reserved(key) {
            apply_reserved(&mut spec, key, value);
        } else if !key.is_empty() {
            spec.filters.extend(value.values().iter().map(|v| parse_filter_clause(key, v)));
        }
    }
    spec
}

fn apply_reserved(spec: &mut QuerySpec, key: &str, value: &ParamValue) {
    match key {
        "columns" => {
            let fields = parse_columns(value);
            spec.projection =
                if fields.is_empty() { ProjectionSpec::All } else { ProjectionSpec::Include(fields) };
        }
        "populate" => {
            spec.populate = split_list(value).into_iter().map(|field| RelationSpec { field }).collect();
        }
        "sort" => spec.sort = parse_sort(value),
        "limit" => spec.limit = value.last().and_then(parse_count),
        "offset" => spec.offset = value.last().and_then(parse_count),
        _ => {}
    }
}

/// Splits a single filter value into its clause; `!` prefix negates.
#[must_use]
pub fn parse_filter_clause(field: &str, raw: &str) -> FilterClause {
    match raw.strip_prefix('!') {
        Some(rest) => FilterClause { field: field.to_string(), negate: true, value: rest.to_string() },
        None => FilterClause { field: field.to_string(), negate: false, value: raw.to_string() },
    }
}

/// Parses one sort token. Returns `None` for tokens with no field name.
#[must_use]
pub fn parse_sort_token(token: &str) -> Option<SortClause> {
    let (field, direction) = match token.strip_prefix('-') {
        Some(rest) => (rest, Direction::Descending),
        None => (token, Direction::Ascending),
    };
    if field.is_empty() {
        return None;
    }
    Some(SortClause { field: field.to_string(), direction })
}

fn parse_sort(value: &ParamValue) -> Vec<SortClause> {
    let clauses: Vec<SortClause> = value
        .values()
        .iter()
        .flat_map(|v| v.split(|c: char| c == ',' || c.is_whitespace()))
        .filter_map(parse_sort_token)
        .collect();
    if clauses.len() > MAX_SORT_FIELDS {
        log::warn!("sort spec too long: {} (keeping {MAX_SORT_FIELDS})", clauses.len());
    }
    clauses.into_iter().take(MAX_SORT_FIELDS).collect()
}

fn parse_columns(value: &ParamValue) -> Vec<String> {
    let fields = split_list(value);
    if fields.len() > MAX_PROJECTION_FIELDS {
        log::warn!("projection too long: {} (keeping {MAX_PROJECTION_FIELDS})", fields.len());
    }
    fields.into_iter().take(MAX_PROJECTION_FIELDS).collect()
}

/// Comma separated list across all values; trimmed, empties dropped, first occurrence wins.
fn split_list(value: &ParamValue) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in value.values().iter().flat_map(|v| v.split(',')) {
        let token = token.trim();
        if token.is_empty() || out.iter().any(|f| f == token) {
            continue;
        }
        out.push(token.to_string());
    }
    out
}

/// Non-negative integer or nothing: "absent" and "invalid" are the same thing here.
fn parse_count(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}
