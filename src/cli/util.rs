use crate::errors::RestError;
use crate::types::{RawParams, Resource};
use crate::utils::json::parse_json_to_resource;

/// Splits `key=value` at the first `=`. A bare `key` gets an empty value.
#[must_use]
pub fn parse_param(s: &str) -> (String, String) {
    match s.split_once('=') {
        Some((k, v)) => (k.to_string(), v.to_string()),
        None => (s.to_string(), String::new()),
    }
}

/// Repeated keys accumulate, as in a query string.
#[must_use]
pub fn params_from_pairs<I: IntoIterator<Item = S>, S: AsRef<str>>(pairs: I) -> RawParams {
    let mut params = RawParams::new();
    for p in pairs {
        let (k, v) = parse_param(p.as_ref());
        params.append(k, v);
    }
    params
}

/// `None` and blank input mean "no body".
///
/// # Errors
/// Malformed JSON or a non-object top level.
pub fn parse_body(s: Option<&str>) -> Result<Option<Resource>, RestError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(json) => parse_json_to_resource(json).map(Some),
    }
}
