use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::ports::IdGenerator;
use crate::infra::docdb::DocumentStore;

/// Random UUID v4 ids for the in-memory store.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

#[async_trait]
impl IdGenerator for UuidIdGenerator {
    async fn next_id(&self) -> anyhow::Result<String> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Keys issued by the document database.
pub struct DocumentKeyGenerator {
    store: Arc<dyn DocumentStore>,
}

impl DocumentKeyGenerator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdGenerator for DocumentKeyGenerator {
    async fn next_id(&self) -> anyhow::Result<String> {
        Ok(self.store.generate_key().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn uuid_ids_are_unique_and_parseable() {
        let ids = UuidIdGenerator;
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let id = ids.next_id().await.unwrap();
            assert!(Uuid::parse_str(&id).is_ok());
            assert!(seen.insert(id));
        }
    }
}
