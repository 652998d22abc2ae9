use crate::contract::model::{User, UserPatch};
use async_trait::async_trait;
use thiserror::Error;

/// Context attached by a store when the backend refused a write, as opposed
/// to the store failing to read back what the backend accepted.
#[derive(Debug, Error)]
#[error("store rejected the write")]
pub struct WriteRejected;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// All users; the in-memory store keeps insertion order.
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    /// Load a user by id.
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    /// Insert a fully-formed domain user.
    ///
    /// Service computes id/timestamps/validation; repo persists and returns
    /// the record as the backing store acknowledged it.
    async fn insert(&self, u: User) -> anyhow::Result<User>;
    /// Sparse-merge `patch` into the stored user. `None` if no user has `id`.
    /// A refused write carries [`WriteRejected`] in its error chain.
    async fn update(&self, id: &str, patch: &UserPatch) -> anyhow::Result<Option<User>>;
    /// Delete by id, returning the removed user. `None` if nothing matched.
    async fn delete(&self, id: &str) -> anyhow::Result<Option<User>>;
}
