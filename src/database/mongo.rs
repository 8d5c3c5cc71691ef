use async_trait::async_trait;
use futures::stream::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};

use super::{EntityStore, UNIQUE_KEYS};
use crate::error::StoreError;

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            db: client.database(database),
        })
    }

    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for (name, field) in UNIQUE_KEYS {
            let index = IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection(name).create_index(index, None).await?;
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl EntityStore for MongoStore {
    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().sort(sort).build();
        let mut cursor = self.collection(collection).find(filter, options).await?;

        let mut documents: Vec<Document> = Vec::new();
        while let Some(document) = cursor.next().await {
            documents.push(document?);
        }
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.collection(collection).find_one(filter, None).await?)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let result = self.collection(collection).insert_one(document, None).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Codec("inserted id is not an ObjectId".to_string()))
    }

    async fn replace_one(
        &self,
        collection: &str,
        _id: &ObjectId,
        document: Document,
    ) -> Result<bool, StoreError> {
        let result = self
            .collection(collection)
            .replace_one(doc! { "_id": _id }, document, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, collection: &str, _id: &ObjectId) -> Result<bool, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": _id }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }
}
