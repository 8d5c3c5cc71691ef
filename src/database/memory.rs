use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{EntityStore, UNIQUE_KEYS};
use crate::error::StoreError;

/// In-process store keeping each collection in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key).unwrap_or(&Bson::Null) == expected)
}

/// Whether `candidate` repeats a unique value held by another document.
fn violates_unique(
    collection: &str,
    documents: &[Document],
    candidate: &Document,
    _id: &ObjectId,
) -> bool {
    UNIQUE_KEYS
        .iter()
        .filter(|(name, _)| *name == collection)
        .any(|(_, field)| {
            let Some(value) = candidate.get(*field) else {
                return false;
            };
            documents.iter().any(|existing| {
                existing.get_object_id("_id").ok() != Some(*_id)
                    && existing.get(*field) == Some(value)
            })
        })
}

fn rank(value: &Bson) -> u8 {
    match value {
        Bson::Null | Bson::Undefined => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
        Bson::String(_) => 2,
        Bson::ObjectId(_) => 3,
        Bson::Boolean(_) => 4,
        Bson::DateTime(_) => 5,
        _ => 6,
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(value) => Some(f64::from(*value)),
        Bson::Int64(value) => Some(*value as f64),
        Bson::Double(value) => Some(*value),
        _ => None,
    }
}

/// Orders values the way MongoDB sorts mixed types: null, numbers, strings,
/// object ids, booleans, then dates.
fn compare(left: &Bson, right: &Bson) -> Ordering {
    match (left, right) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => a.bytes().cmp(&b.bytes()),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
        _ => match (numeric(left), numeric(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => rank(left).cmp(&rank(right)),
        },
    }
}

fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        for (key, direction) in sort.iter() {
            let descending = matches!(numeric(direction), Some(value) if value < 0.0);
            let ordering = compare(
                a.get(key).unwrap_or(&Bson::Null),
                b.get(key).unwrap_or(&Bson::Null),
            );
            let ordering = if descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = sort {
            sort_documents(&mut documents, &sort);
        }
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.lock()?;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| matches(document, &filter))
                .cloned()
        }))
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<ObjectId, StoreError> {
        let _id = match document.get("_id") {
            Some(Bson::ObjectId(_id)) => *_id,
            _ => {
                let _id = ObjectId::new();
                document.insert("_id", _id);
                _id
            }
        };

        let mut collections = self.lock()?;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents
            .iter()
            .any(|existing| existing.get_object_id("_id").ok() == Some(_id))
            || violates_unique(collection, documents, &document, &_id)
        {
            return Err(StoreError::Duplicate);
        }
        documents.push(document);
        Ok(_id)
    }

    async fn replace_one(
        &self,
        collection: &str,
        _id: &ObjectId,
        mut document: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.lock()?;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(position) = documents
            .iter()
            .position(|existing| existing.get_object_id("_id").ok() == Some(*_id))
        else {
            return Ok(false);
        };
        if violates_unique(collection, documents, &document, _id) {
            return Err(StoreError::Duplicate);
        }

        document.insert("_id", *_id);
        documents[position] = document;
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, _id: &ObjectId) -> Result<bool, StoreError> {
        let mut collections = self.lock()?;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|existing| existing.get_object_id("_id").ok() != Some(*_id));
        Ok(documents.len() < before)
    }
}
