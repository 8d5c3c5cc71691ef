//! Generic controller operations shared by every resource kind.
//!
//! Each request moves through `validate -> resolve -> authorize -> persist
//! -> present`, leaving at the first failing step with the matching
//! [`AppError`]. A kind plugs in by implementing [`Resource`] and declaring
//! a [`Schema`].

use mongodb::bson::{doc, from_document, oid::ObjectId, to_document, DateTime, Document};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    database::EntityStore,
    error::{AppError, StoreError},
    models::user::Principal,
    state::AppState,
};

pub mod fields;
pub mod ownership;
pub mod patch;
pub mod references;
pub mod schema;

pub use patch::Patch;
pub use references::{Linked, ReferenceNames};
pub use schema::{Populate, Reference, ResourceKind, Schema, SortOrder, View};

pub trait Resource: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// Payload accepted by create and update, every field a [`Patch`].
    type Request: DeserializeOwned;
    type Response: Serialize;

    fn schema() -> &'static Schema;

    /// Builds a new entity from a payload that passed `validate_create`.
    fn build(request: Self::Request, principal: &Principal) -> Result<Self, AppError>;

    /// Applies the fields present in `request`.
    fn merge(&mut self, request: Self::Request) -> Result<(), AppError>;

    fn owner(&self) -> Option<ObjectId> {
        None
    }

    fn present(self, names: &ReferenceNames) -> Self::Response;
}

pub fn parse_id(schema: &Schema, raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::NotFound(schema.label))
}

fn decode<T: Resource>(document: Document) -> Result<T, StoreError> {
    Ok(from_document::<T>(document)?)
}

fn request<T: Resource>(payload: Map<String, Value>) -> Result<T::Request, AppError> {
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| AppError::Validation(format!("Invalid payload: {e}")))
}

async fn present_all<T: Resource>(
    store: &dyn EntityStore,
    documents: Vec<Document>,
    view: View,
) -> Result<Vec<T::Response>, AppError> {
    let names = references::resolve(store, T::schema(), &documents, view).await?;
    documents
        .into_iter()
        .map(|document| -> Result<T::Response, AppError> {
            Ok(decode::<T>(document)?.present(&names))
        })
        .collect()
}

async fn present_one<T: Resource>(
    store: &dyn EntityStore,
    document: Document,
    view: View,
) -> Result<T::Response, AppError> {
    let mut presented = present_all::<T>(store, vec![document], view).await?;
    presented
        .pop()
        .ok_or_else(|| AppError::Internal("empty presentation".to_string()))
}

async fn find_document(
    store: &dyn EntityStore,
    schema: &Schema,
    _id: &ObjectId,
) -> Result<Document, AppError> {
    store
        .find_one(schema.collection, doc! { "_id": _id })
        .await?
        .ok_or(AppError::NotFound(schema.label))
}

/// Looks up an entity, treating a malformed id like an unknown one.
pub async fn resolve<T: Resource>(
    store: &dyn EntityStore,
    raw_id: &str,
) -> Result<(ObjectId, T), AppError> {
    let schema = T::schema();
    let _id = parse_id(schema, raw_id)?;
    let document = find_document(store, schema, &_id).await?;
    Ok((_id, decode::<T>(document)?))
}

async fn ensure_unique(
    store: &dyn EntityStore,
    schema: &Schema,
    document: &Document,
    current: Option<&ObjectId>,
) -> Result<(), AppError> {
    for field in schema.unique {
        let Some(value) = document.get(*field) else {
            continue;
        };
        let filter = doc! { *field: value.clone() };
        if let Some(existing) = store.find_one(schema.collection, filter).await? {
            let same = current
                .map_or(false, |_id| existing.get_object_id("_id").ok() == Some(*_id));
            if !same {
                return Err(AppError::Conflict(format!(
                    "{} with this {field} already exists",
                    schema.label
                )));
            }
        }
    }
    Ok(())
}

async fn check_before_write(
    state: &AppState,
    schema: &Schema,
    document: &Document,
    current: Option<&ObjectId>,
) -> Result<(), AppError> {
    let store = state.store.as_ref();
    ensure_unique(store, schema, document, current).await?;
    if state.config.enforce_references {
        references::ensure_resolved(store, schema, document).await?;
    }
    Ok(())
}

/// Lists every entity of the kind, or only the caller's for owned kinds.
pub async fn list<T: Resource>(
    state: &AppState,
    principal: &Principal,
) -> Result<Vec<T::Response>, AppError> {
    let schema = T::schema();
    let filter = match schema.owner {
        Some(field) => doc! { field: principal._id },
        None => doc! {},
    };
    let documents = state
        .store
        .find_many(schema.collection, filter, schema.sort_document())
        .await?;
    present_all::<T>(state.store.as_ref(), documents, View::List).await
}

pub async fn get<T: Resource>(state: &AppState, raw_id: &str) -> Result<T::Response, AppError> {
    let schema = T::schema();
    let _id = parse_id(schema, raw_id)?;
    let document = find_document(state.store.as_ref(), schema, &_id).await?;
    present_one::<T>(state.store.as_ref(), document, View::Get).await
}

pub async fn create<T: Resource>(
    state: &AppState,
    principal: &Principal,
    payload: Map<String, Value>,
) -> Result<T::Response, AppError> {
    let schema = T::schema();
    schema.validate_create(&payload)?;
    let entity = T::build(request::<T>(payload)?, principal)?;

    let mut document = to_document(&entity).map_err(StoreError::from)?;
    let now = DateTime::now();
    document.insert("createdAt", now);
    document.insert("updatedAt", now);
    check_before_write(state, schema, &document, None).await?;

    let _id = state
        .store
        .insert_one(schema.collection, document.clone())
        .await?;
    debug!(kind = ?schema.kind, %_id, "created");

    document.insert("_id", _id);
    present_one::<T>(state.store.as_ref(), document, View::Write).await
}

pub async fn update<T: Resource>(
    state: &AppState,
    principal: &Principal,
    raw_id: &str,
    payload: Map<String, Value>,
) -> Result<T::Response, AppError> {
    let schema = T::schema();
    schema.validate_update(&payload)?;
    let request = request::<T>(payload)?;

    let (_id, mut entity) = resolve::<T>(state.store.as_ref(), raw_id).await?;
    ownership::authorize(principal, &entity)?;
    entity.merge(request)?;

    let mut document = to_document(&entity).map_err(StoreError::from)?;
    document.insert("_id", _id);
    document.insert("updatedAt", DateTime::now());
    check_before_write(state, schema, &document, Some(&_id)).await?;

    if !state
        .store
        .replace_one(schema.collection, &_id, document.clone())
        .await?
    {
        return Err(AppError::NotFound(schema.label));
    }
    debug!(kind = ?schema.kind, %_id, "updated");

    present_one::<T>(state.store.as_ref(), document, View::Write).await
}

pub async fn delete<T: Resource>(
    state: &AppState,
    principal: &Principal,
    raw_id: &str,
) -> Result<(), AppError> {
    let schema = T::schema();
    let (_id, entity) = resolve::<T>(state.store.as_ref(), raw_id).await?;
    ownership::authorize(principal, &entity)?;

    if !state.store.delete_one(schema.collection, &_id).await? {
        return Err(AppError::NotFound(schema.label));
    }
    debug!(kind = ?schema.kind, %_id, "deleted");
    Ok(())
}
