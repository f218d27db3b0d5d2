use crate::types::{RawParams, Resource};

/// One CRUD call against the loaded collection.
#[derive(Debug, Clone)]
pub enum Command {
    /// Show the parsed query without touching the store.
    Parse { params: RawParams },
    Get { id: Option<String>, params: RawParams },
    Post { body: Option<Resource> },
    Put { id: String, body: Option<Resource> },
    Patch { id: String, body: Option<Resource> },
    Delete { id: String },
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Get { .. } => "get",
            Self::Post { .. } => "post",
            Self::Put { .. } => "put",
            Self::Patch { .. } => "patch",
            Self::Delete { .. } => "delete",
        }
    }

    /// Whether the command can change the collection.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(self, Self::Post { .. } | Self::Put { .. } | Self::Patch { .. } | Self::Delete { .. })
    }
}
