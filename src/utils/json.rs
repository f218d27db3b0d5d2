use crate::errors::RestError;
use crate::types::Resource;
use bson::Bson;

/// Convert a `serde_json::Value` that must be an object into a resource.
///
/// # Errors
/// Returns `RestError::InvalidBody` for non-objects and values BSON cannot hold.
pub fn json_value_to_resource(val: &serde_json::Value) -> Result<Resource, RestError> {
    let obj = val
        .as_object()
        .ok_or_else(|| RestError::InvalidBody("expected JSON object".into()))?;
    Resource::try_from(obj.clone()).map_err(|e| RestError::InvalidBody(e.to_string()))
}

/// Parse a JSON string into a resource. The JSON must be a top-level object.
///
/// # Errors
/// Returns an error for malformed JSON or a non-object top level.
pub fn parse_json_to_resource(json: &str) -> Result<Resource, RestError> {
    let val: serde_json::Value = serde_json::from_str(json)?;
    json_value_to_resource(&val)
}

/// Relaxed extended JSON rendering of a resource.
#[must_use]
pub fn resource_to_json(doc: Resource) -> serde_json::Value {
    Bson::Document(doc).into_relaxed_extjson()
}
