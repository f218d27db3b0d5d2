use serde_json::Value;

use super::command::Command;
use crate::crud::{Crud, Resolution};
use crate::errors::RestError;
use crate::query::parse_params;
use crate::store::Store;
use crate::utils::json::resource_to_json;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// One compact JSON value.
    Json,
    /// Indented JSON.
    Pretty,
}

/// Runs `cmd` and returns its result as JSON. Absent resolutions become `null`.
///
/// # Errors
/// Whatever the CRUD call rejects with.
pub async fn run<S: Store>(crud: &Crud<S>, cmd: Command) -> Result<Value, RestError> {
    log::debug!("cli: running {}", cmd.name());
    let out = match cmd {
        Command::Parse { params } => serde_json::to_value(parse_params(&params))?,
        Command::Get { id, params } => match crud.get(id.as_deref(), &params).await? {
            Resolution::One(r) => resource_to_json(r),
            Resolution::Many(rs) => Value::Array(rs.into_iter().map(resource_to_json).collect()),
            Resolution::Absent => Value::Null,
        },
        Command::Post { body } => resource_to_json(crud.post(body).await?),
        Command::Put { id, body } => crud.put(&id, body).await?.map_or(Value::Null, resource_to_json),
        Command::Patch { id, body } => crud.patch(&id, body).await?.map_or(Value::Null, resource_to_json),
        Command::Delete { id } => crud.delete(&id).await?.map_or(Value::Null, resource_to_json),
    };
    Ok(out)
}

#[must_use]
pub fn render(value: &Value, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => value.to_string(),
        OutputMode::Pretty => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}
