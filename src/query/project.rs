use bson::Bson;

use super::types::{ProjectionSpec, RelationSpec};
use crate::errors::RestError;
use crate::store::{Schema, Store, id_string};
use crate::types::Resource;

/// Applies visibility and the projection mode to one resource.
///
/// Hidden fields are always removed. In inclusion mode only the named top-level fields and
/// the identifier survive.
#[must_use]
pub fn project_fields(doc: Resource, spec: &ProjectionSpec, schema: &Schema, id_field: &str) -> Resource {
    match spec {
        ProjectionSpec::All => {
            if schema.hidden.is_empty() {
                return doc;
            }
            doc.into_iter().filter(|(k, _)| !schema.is_hidden(k)).collect()
        }
        ProjectionSpec::Include(fields) => doc
            .into_iter()
            .filter(|(k, _)| {
                !schema.is_hidden(k) && (k == id_field || fields.iter().any(|f| f == k))
            })
            .collect(),
    }
}

/// Replaces each declared, present relation field with the resource it references.
///
/// Missing single references become `null`; reference arrays keep only resolved entries.
/// Values that cannot be identifiers (embedded documents, `null`, ...) are left as they are.
///
/// # Errors
/// Store failures while fetching related resources.
pub async fn populate<S: Store + ?Sized>(
    store: &S,
    mut doc: Resource,
    relations: &[RelationSpec],
) -> Result<Resource, RestError> {
    for rel in relations {
        if store.schema().relation_target(&rel.field).is_none() {
            log::debug!("populate: {} is not a relation of {}", rel.field, store.name());
            continue;
        }
        let Some(reference) = doc.get(&rel.field).cloned() else {
            continue;
        };
        let expanded = match reference {
            Bson::Array(refs) => {
                let mut out = Vec::with_capacity(refs.len());
                for r in refs {
                    if id_string(&r).is_none() {
                        out.push(r);
                    } else if let Some(related) = store.find_related(&rel.field, &r).await? {
                        out.push(Bson::Document(related));
                    }
                }
                Bson::Array(out)
            }
            single if id_string(&single).is_none() => single,
            single => store
                .find_related(&rel.field, &single)
                .await?
                .map_or(Bson::Null, Bson::Document),
        };
        doc.insert(rel.field.clone(), expanded);
    }
    Ok(doc)
}

/// Projection followed by population, for one resource.
///
/// # Errors
/// Store failures during population.
pub async fn project_resource<S: Store + ?Sized>(
    store: &S,
    doc: Resource,
    spec: &ProjectionSpec,
    relations: &[RelationSpec],
    id_field: &str,
) -> Result<Resource, RestError> {
    let doc = project_fields(doc, spec, store.schema(), id_field);
    if relations.is_empty() {
        return Ok(doc);
    }
    populate(store, doc, relations).await
}

/// Same as [`project_resource`], for every element of a list, keeping order.
///
/// # Errors
/// Store failures during population.
pub async fn project_resources<S: Store + ?Sized>(
    store: &S,
    docs: Vec<Resource>,
    spec: &ProjectionSpec,
    relations: &[RelationSpec],
    id_field: &str,
) -> Result<Vec<Resource>, RestError> {
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        out.push(project_resource(store, doc, spec, relations, id_field).await?);
    }
    Ok(out)
}
