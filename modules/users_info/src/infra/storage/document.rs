//! Persistent store over the document database port.
//!
//! No caching and no retries: every call goes to the database and every
//! failure is returned as-is. Returned users are decoded from what the
//! database acknowledged.

use anyhow::{ensure, Context};
use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::model::{User, UserPatch};
use crate::domain::repo::{UsersRepository, WriteRejected};
use crate::infra::docdb::DocumentStore;
use crate::infra::storage::entity::{UserDocument, UserDocumentPatch};
use crate::infra::storage::mapper::document_to_user;

pub struct DocumentUsersRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentUsersRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UsersRepository for DocumentUsersRepository {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let docs = self
            .store
            .list_documents()
            .await
            .context("list documents failed")?;
        docs.into_iter().map(document_to_user).collect()
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        let doc = self.store.fetch(id).await.context("fetch document failed")?;
        doc.map(document_to_user).transpose()
    }

    async fn insert(&self, u: User) -> anyhow::Result<User> {
        let data = serde_json::to_value(UserDocument::from(&u))?;
        let doc = self
            .store
            .create(&u.id, data)
            .await
            .context("create document failed")?;

        let stored = document_to_user(doc)?;
        ensure!(
            stored.id == u.id,
            "database stored user {} under a different id {}",
            u.id,
            stored.id
        );
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        let data = serde_json::to_value(UserDocumentPatch::from(patch))?;
        let doc = self.store.update(id, data).await.context(WriteRejected)?;
        doc.map(document_to_user).transpose()
    }

    async fn delete(&self, id: &str) -> anyhow::Result<Option<User>> {
        let doc = self
            .store
            .delete(id)
            .await
            .context("delete document failed")?;
        doc.map(document_to_user).transpose()
    }
}
