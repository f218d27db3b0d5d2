//! restlite: turns HTTP-style query parameters into document-store reads and writes.
//!
//! ```text
//! RawParams -> query::parse_params -> QuerySpec
//!           -> query::compile_filters -> Filter ---> Store::find_many / find_one
//!                                                        |
//!           Resolution <- query::project_resources <-----+
//! ```
//!
//! [`Crud`] binds one [`Store`] and one identifier field and exposes `get`, `post`, `put`,
//! `patch` and `delete`. [`store::memory`] provides an in-process store.

pub mod cli;
pub mod config;
pub mod crud;
pub mod errors;
pub mod query;
pub mod store;
pub mod types;
pub mod utils;

pub use config::EngineConfig;
pub use crud::{Crud, Resolution};
pub use errors::RestError;
pub use store::{MemoryEngine, MemoryStore, Schema, Store, UpdateMode};
pub use types::{ParamValue, RawParams, Resource};
