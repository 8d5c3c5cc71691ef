use std::collections::{BTreeSet, HashMap};

use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::Serialize;

use super::schema::{ResourceKind, Schema, View};
use crate::{
    database::EntityStore,
    error::{AppError, StoreError},
};

/// A reference field as rendered on the read path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Linked {
    Resolved { _id: String, name: String },
    Id(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DanglingReference {
    pub field: &'static str,
    pub target: ResourceKind,
    pub _id: ObjectId,
}

/// Display names of the entities referenced by a batch of records.
#[derive(Debug, Default)]
pub struct ReferenceNames {
    names: HashMap<(ResourceKind, ObjectId), String>,
}

impl ReferenceNames {
    pub fn link(&self, target: ResourceKind, _id: &ObjectId) -> Linked {
        match self.names.get(&(target, *_id)) {
            Some(name) => Linked::Resolved {
                _id: _id.to_hex(),
                name: name.clone(),
            },
            None => Linked::Id(_id.to_hex()),
        }
    }
}

fn referenced(
    schema: &Schema,
    document: &Document,
    view: Option<View>,
) -> Vec<(&'static str, ResourceKind, ObjectId)> {
    schema
        .references
        .iter()
        .filter(|reference| view.map_or(true, |view| reference.populate.applies_to(view)))
        .filter_map(|reference| {
            document
                .get_object_id(reference.field)
                .ok()
                .map(|_id| (reference.field, reference.target, _id))
        })
        .collect()
}

async fn lookup(
    store: &dyn EntityStore,
    target: ResourceKind,
    _id: &ObjectId,
) -> Result<Option<Document>, StoreError> {
    store
        .find_one(target.schema().collection, doc! { "_id": _id })
        .await
}

/// Fetches the names needed to populate `documents` for `view`, one lookup
/// per distinct referenced entity.
pub async fn resolve(
    store: &dyn EntityStore,
    schema: &Schema,
    documents: &[Document],
    view: View,
) -> Result<ReferenceNames, StoreError> {
    let wanted: BTreeSet<(ResourceKind, ObjectId)> = documents
        .iter()
        .flat_map(|document| referenced(schema, document, Some(view)))
        .map(|(_, target, _id)| (target, _id))
        .collect();

    let mut names = ReferenceNames::default();
    for (target, _id) in wanted {
        if let Some(found) = lookup(store, target, &_id).await? {
            if let Some(name) = target.schema().display_name(&found) {
                names.names.insert((target, _id), name);
            }
        }
    }
    Ok(names)
}

/// References held by `document` that point at nothing.
pub async fn dangling(
    store: &dyn EntityStore,
    schema: &Schema,
    document: &Document,
) -> Result<Vec<DanglingReference>, StoreError> {
    let mut missing: Vec<DanglingReference> = Vec::new();
    for (field, target, _id) in referenced(schema, document, None) {
        if lookup(store, target, &_id).await?.is_none() {
            missing.push(DanglingReference { field, target, _id });
        }
    }
    Ok(missing)
}

pub async fn ensure_resolved(
    store: &dyn EntityStore,
    schema: &Schema,
    document: &Document,
) -> Result<(), AppError> {
    match dangling(store, schema, document).await?.first() {
        Some(missing) => Err(AppError::invalid(
            missing.field,
            format!("{} {} does not exist", missing.target.schema().label, missing._id),
        )),
        None => Ok(()),
    }
}
