use std::sync::Arc;

use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::ports::IdGenerator;
use crate::domain::repo::{UsersRepository, WriteRejected};
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

/// Domain service with business rules for user management.
/// Depends only on the repository and id-generator ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    ids: Arc<dyn IdGenerator>,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn UsersRepository>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repo, ids }
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");

        let users = self.repo.list().await.map_err(|e| {
            error!(error = %e, "Failed to list users");
            DomainError::database(e.to_string())
        })?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load user");
                DomainError::database(e.to_string())
            })?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self),
        fields(name = %new_user.name)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        self.validate_new_user(&new_user)?;

        // The id must exist before anything is written.
        let id = self.ids.next_id().await.map_err(|e| {
            error!(error = %e, "Failed to generate user id");
            DomainError::id_generation(e.to_string())
        })?;

        let user = User {
            id,
            name: new_user.name,
            dob: new_user.dob,
            address: new_user.address,
            description: new_user.description,
            created_at: Utc::now(),
        };

        let user = self.repo.insert(user).await.map_err(|e| {
            error!(error = %e, "Failed to persist user");
            DomainError::database(e.to_string())
        })?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.update_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        let patch = patch.normalized();

        let updated = self.repo.update(id, &patch).await.map_err(|e| {
            if e.downcast_ref::<WriteRejected>().is_some() {
                warn!(error = %e, "Update rejected by the store");
                DomainError::update_rejected(id, format!("{e:#}"))
            } else {
                error!(error = %e, "Failed to read back updated user");
                DomainError::database(e.to_string())
            }
        })?;

        let user = updated.ok_or_else(|| DomainError::user_not_found(id))?;
        info!("Successfully updated user");
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.delete_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn delete_user(&self, id: &str) -> Result<User, DomainError> {
        info!("Deleting user");

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to delete user");
                DomainError::database(e.to_string())
            })?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!("Successfully deleted user");
        Ok(deleted)
    }

    // --- validation helpers ---

    fn validate_new_user(&self, new_user: &NewUser) -> Result<(), DomainError> {
        if new_user.name.trim().is_empty() {
            return Err(DomainError::validation("name", "name is required"));
        }
        Ok(())
    }
}
