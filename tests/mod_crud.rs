mod common;

use bson::{Bson, doc};
use common::{colors_crud, ids, params, users_crud};
use restlite::{RawParams, Resolution, RestError};

#[tokio::test]
async fn negated_filter_returns_the_other_resource() {
    let crud = colors_crud();
    let got = crud.get(None, &params(&[("color", "!blue")])).await.unwrap().into_many();
    assert_eq!(ids(&got), vec!["2"]);
}

#[tokio::test]
async fn delete_returns_snapshot_then_absent() {
    let crud = colors_crud();
    let snap = crud.delete("1").await.unwrap().unwrap();
    assert_eq!(snap, doc! {"_id": "1", "color": "blue"});
    let after = crud.get(Some("1"), &RawParams::new()).await.unwrap();
    assert_eq!(after, Resolution::Absent);
    assert!(crud.delete("1").await.unwrap().is_none());
}

#[tokio::test]
async fn post_then_get_round_trip() {
    let crud = colors_crud();
    let body = doc! {"color": "teal", "size": 3, "tags": ["a", "b"]};
    let created = crud.post(Some(body.clone())).await.unwrap();
    let id = created.get_str("_id").unwrap().to_string();
    let fetched = crud.get(Some(&id), &RawParams::new()).await.unwrap().into_one().unwrap();
    for (k, v) in &body {
        assert_eq!(fetched.get(k), Some(v));
    }
}

#[tokio::test]
async fn post_keeps_given_id_and_rejects_duplicates() {
    let crud = colors_crud();
    let created = crud.post(Some(doc! {"_id": "9", "color": "x"})).await.unwrap();
    assert_eq!(created.get_str("_id").unwrap(), "9");
    let err = crud.post(Some(doc! {"_id": "9"})).await.unwrap_err();
    assert!(matches!(err, RestError::DuplicateId(_)));
    assert!(!err.is_usage());
}

#[tokio::test]
async fn post_without_body_is_usage_error() {
    let crud = colors_crud();
    assert!(crud.post(None).await.unwrap_err().is_usage());
    assert!(crud.post(Some(doc! {})).await.unwrap_err().is_usage());
}

#[tokio::test]
async fn put_replaces_and_patch_merges() {
    let crud = users_crud();
    let put = crud.put("2", Some(doc! {"_id": "zzz", "name": "bo"})).await.unwrap().unwrap();
    assert_eq!(put, doc! {"_id": "2", "name": "bo"});

    let patched = crud.patch("1", Some(doc! {"age": 31})).await.unwrap().unwrap();
    assert_eq!(patched.get_i32("age").unwrap(), 31);
    assert_eq!(patched.get_str("name").unwrap(), "ann");
    assert!(patched.get("password").is_none());

    let unchanged = crud.patch("3", Some(doc! {})).await.unwrap().unwrap();
    assert_eq!(unchanged.get_str("name").unwrap(), "cid");
}

#[tokio::test]
async fn mutations_on_missing_ids_are_absent() {
    let crud = users_crud();
    assert!(crud.put("nope", Some(doc! {"a": 1})).await.unwrap().is_none());
    assert!(crud.patch("nope", Some(doc! {"a": 1})).await.unwrap().is_none());
    assert!(crud.delete("nope").await.unwrap().is_none());
    assert!(matches!(crud.put("1", None).await, Err(RestError::MissingBody("put"))));
}

#[tokio::test]
async fn hidden_fields_never_resolve() {
    let crud = users_crud();
    let all = crud.get(None, &params(&[("columns", "name,password")])).await.unwrap().into_many();
    assert_eq!(all.len(), 4);
    for d in &all {
        assert!(d.get("password").is_none());
        assert!(d.get("_id").is_some());
    }
    let one = crud.get(Some("1"), &RawParams::new()).await.unwrap().into_one().unwrap();
    assert!(one.get("password").is_none());
    let removed = crud.delete("1").await.unwrap().unwrap();
    assert!(removed.get("password").is_none());
}

#[tokio::test]
async fn sort_and_paginate() {
    let crud = users_crud();
    let got = crud
        .get(None, &params(&[("sort", "-name"), ("limit", "2"), ("offset", "1")]))
        .await
        .unwrap()
        .into_many();
    assert_eq!(ids(&got), vec!["3", "2"]);
}

#[tokio::test]
async fn lenient_coercion_matches_number_and_string() {
    let crud = users_crud();
    let got = crud.get(None, &params(&[("age", "30")])).await.unwrap().into_many();
    assert_eq!(ids(&got), vec!["1", "4"]);
    let strict = users_crud().with_coercion(restlite::query::Coercion::Strict);
    let got = strict.get(None, &params(&[("age", "30")])).await.unwrap().into_many();
    assert_eq!(ids(&got), vec!["4"]);
}

#[tokio::test]
async fn multi_valued_filters_and_combine() {
    let crud = users_crud();
    let got = crud
        .get(None, &params(&[("color", "!blue"), ("color", "!red")]))
        .await
        .unwrap()
        .into_many();
    assert_eq!(ids(&got), vec!["3", "4"]);
}

#[tokio::test]
async fn populate_replaces_references() {
    let crud = users_crud();
    let one = crud
        .get(Some("1"), &params(&[("populate", "team")]))
        .await
        .unwrap()
        .into_one()
        .unwrap();
    assert_eq!(one.get_document("team").unwrap(), &doc! {"_id": "t1", "name": "core"});

    let dangling = crud
        .get(Some("3"), &params(&[("populate", "team")]))
        .await
        .unwrap()
        .into_one()
        .unwrap();
    assert_eq!(dangling.get("team"), Some(&Bson::Null));

    let arr = crud
        .get(Some("4"), &params(&[("populate", "mentors,name")]))
        .await
        .unwrap()
        .into_one()
        .unwrap();
    let mentors = arr.get_array("mentors").unwrap();
    assert_eq!(mentors.len(), 2);
    assert_eq!(arr.get_str("name").unwrap(), "dee");
}

#[tokio::test]
async fn populate_skips_fields_dropped_by_projection() {
    let crud = users_crud();
    let got = crud
        .get(None, &params(&[("columns", "name"), ("populate", "team"), ("limit", "1")]))
        .await
        .unwrap()
        .into_many();
    assert_eq!(got, vec![doc! {"_id": "1", "name": "ann"}]);
}

#[tokio::test]
async fn limit_zero_is_empty_and_bad_limit_is_ignored() {
    let crud = users_crud();
    assert!(crud.get(None, &params(&[("limit", "0")])).await.unwrap().is_empty());
    assert_eq!(crud.get(None, &params(&[("limit", "abc")])).await.unwrap().len(), 4);
    assert_eq!(crud.get(None, &params(&[("offset", "-3")])).await.unwrap().len(), 4);
}

#[tokio::test]
async fn engine_identifier_keys_single_resource_calls() {
    let engine = restlite::MemoryEngine::new();
    let col = engine.create_collection("skus", "_id", restlite::Schema::new());
    col.insert_document(doc! {"_id": "1", "sku": "x", "color": "blue"}).unwrap();
    let crud = restlite::Crud::new(engine.store("skus").unwrap(), "sku");

    let one = crud.get(Some("x"), &RawParams::new()).await.unwrap().into_one().unwrap();
    assert_eq!(one.get_str("color").unwrap(), "blue");
    assert!(crud.get(Some("1"), &RawParams::new()).await.unwrap().is_absent());

    let listed = crud.get(None, &params(&[("columns", "color")])).await.unwrap().into_many();
    assert_eq!(listed, vec![doc! {"sku": "x", "color": "blue"}]);

    let patched = crud.patch("x", Some(doc! {"sku": "other", "color": "red"})).await.unwrap().unwrap();
    assert_eq!(patched.get_str("sku").unwrap(), "x");
    assert_eq!(patched.get_str("color").unwrap(), "red");

    let created = crud.post(Some(doc! {"color": "green"})).await.unwrap();
    let sku = created.get_str("sku").unwrap().to_string();
    assert!(crud.get(Some(&sku), &RawParams::new()).await.unwrap().into_one().is_some());

    assert!(crud.delete("x").await.unwrap().is_some());
    assert!(crud.get(Some("x"), &RawParams::new()).await.unwrap().is_absent());
}

#[tokio::test]
async fn object_id_identifiers_sort() {
    use bson::oid::ObjectId;
    let engine = restlite::MemoryEngine::new();
    let col = engine.create_collection("o", "_id", restlite::Schema::new());
    let hi = ObjectId::parse_str("000000000000000000000002").unwrap();
    let lo = ObjectId::parse_str("000000000000000000000001").unwrap();
    col.insert_document(doc! {"_id": hi}).unwrap();
    col.insert_document(doc! {"_id": lo}).unwrap();
    let crud = restlite::Crud::new(engine.store("o").unwrap(), "_id");
    let got = crud.get(None, &params(&[("sort", "_id")])).await.unwrap().into_many();
    let order: Vec<ObjectId> = got.iter().map(|d| d.get_object_id("_id").unwrap()).collect();
    assert_eq!(order, vec![lo, hi]);
    assert!(crud.get(Some(&lo.to_hex()), &RawParams::new()).await.unwrap().into_one().is_some());
}

mod failing_store {
    use super::*;
    use async_trait::async_trait;
    use restlite::query::{Filter, SortClause};
    use restlite::utils::devlog::{drain_bench, enable_thread_sink};
    use restlite::{Crud, Resource, Schema, Store, UpdateMode};

    struct Down(Schema);

    fn down() -> RestError {
        RestError::Store("connection refused".into())
    }

    #[async_trait]
    impl Store for Down {
        fn name(&self) -> &str {
            "down"
        }

        fn schema(&self) -> &Schema {
            &self.0
        }

        async fn find_many(
            &self,
            _filter: &Filter,
            _sort: &[SortClause],
            _limit: Option<usize>,
            _offset: Option<usize>,
        ) -> Result<Vec<Resource>, RestError> {
            Err(down())
        }

        async fn find_one(&self, _id_field: &str, _id: &str) -> Result<Option<Resource>, RestError> {
            Err(down())
        }

        async fn create(&self, _id_field: &str, _body: Resource) -> Result<Resource, RestError> {
            Err(down())
        }

        async fn update(
            &self,
            _id_field: &str,
            _id: &str,
            _body: Resource,
            _mode: UpdateMode,
        ) -> Result<Option<Resource>, RestError> {
            Err(down())
        }

        async fn delete(&self, _id_field: &str, _id: &str) -> Result<Option<Resource>, RestError> {
            Err(down())
        }

        async fn find_related(&self, _field: &str, _reference: &bson::Bson) -> Result<Option<Resource>, RestError> {
            Err(down())
        }
    }

    fn is_store_error(e: &RestError) -> bool {
        matches!(e, RestError::Store(msg) if msg == "connection refused")
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let _g = enable_thread_sink();
        let crud = Crud::new(Down(Schema::new()), "_id");
        assert!(is_store_error(&crud.get(None, &RawParams::new()).await.unwrap_err()));
        assert!(is_store_error(&crud.get(Some("1"), &RawParams::new()).await.unwrap_err()));
        assert!(is_store_error(&crud.post(Some(doc! {"a": 1})).await.unwrap_err()));
        assert!(is_store_error(&crud.put("1", Some(doc! {"a": 1})).await.unwrap_err()));
        assert!(is_store_error(&crud.patch("1", Some(doc! {"a": 1})).await.unwrap_err()));
        let err = crud.delete("1").await.unwrap_err();
        assert!(is_store_error(&err));
        assert!(!err.is_usage());
        assert!(drain_bench().is_empty());
    }
}
