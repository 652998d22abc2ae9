use async_trait::async_trait;

use crate::contract::{
    error::UsersInfoError,
    model::{NewUser, User, UserPatch},
};

/// Public API trait for the users_info module that other modules can use
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// List every user
    async fn list_users(&self) -> Result<Vec<User>, UsersInfoError>;

    /// Get a user by ID
    async fn get_user(&self, id: &str) -> Result<User, UsersInfoError>;

    /// Create a new user; id and creation time are assigned by the module
    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersInfoError>;

    /// Update a user with partial data
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, UsersInfoError>;

    /// Delete a user by ID, returning the removed record
    async fn delete_user(&self, id: &str) -> Result<User, UsersInfoError>;
}
