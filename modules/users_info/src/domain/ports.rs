use async_trait::async_trait;

/// Output port: allocate identifiers for new users.
#[async_trait]
pub trait IdGenerator: Send + Sync {
    async fn next_id(&self) -> anyhow::Result<String>;
}
