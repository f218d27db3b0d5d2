// Shared fixtures for integration tests.
#![allow(dead_code)]

use bson::{Document, doc};
use restlite::{Crud, MemoryEngine, MemoryStore, RawParams, Schema};
use std::sync::Arc;

pub fn params(pairs: &[(&str, &str)]) -> RawParams {
    let mut p = RawParams::new();
    for (k, v) in pairs {
        p.append(*k, *v);
    }
    p
}

pub fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter().map(|d| d.get_str("_id").unwrap_or_default().to_string()).collect()
}

/// `users` (hidden `password`, relation `team` -> `teams`) and `teams`.
pub fn users_engine() -> Arc<MemoryEngine> {
    let engine = MemoryEngine::new();
    let teams = engine.create_collection("teams", "_id", Schema::new().hide("budget"));
    teams.insert_document(doc! {"_id": "t1", "name": "core", "budget": 10}).unwrap();
    teams.insert_document(doc! {"_id": "t2", "name": "web", "budget": 20}).unwrap();
    let users = engine.create_collection(
        "users",
        "_id",
        Schema::new().hide("password").relation("team", "teams").relation("mentors", "teams"),
    );
    for d in [
        doc! {"_id": "1", "name": "ann", "age": 30, "color": "blue", "team": "t1", "password": "a"},
        doc! {"_id": "2", "name": "bob", "age": 25, "color": "red", "team": "t2", "password": "b"},
        doc! {"_id": "3", "name": "cid", "age": 41, "color": "green", "team": "gone", "password": "c"},
        doc! {"_id": "4", "name": "dee", "age": "30", "mentors": ["t1", "missing", "t2"], "password": "d"},
    ] {
        users.insert_document(d).unwrap();
    }
    engine
}

pub fn users_crud() -> Crud<MemoryStore> {
    let engine = users_engine();
    Crud::new(engine.store("users").unwrap(), "_id")
}

pub fn colors_crud() -> Crud<MemoryStore> {
    let engine = MemoryEngine::new();
    let col = engine.create_collection("c", "_id", Schema::new());
    col.insert_document(doc! {"_id": "1", "color": "blue"}).unwrap();
    col.insert_document(doc! {"_id": "2", "color": "red"}).unwrap();
    Crud::new(engine.store("c").unwrap(), "_id")
}
