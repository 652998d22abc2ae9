use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Id generation failed: {message}")]
    IdGeneration { message: String },

    #[error("Update of user {id} rejected: {message}")]
    UpdateRejected { id: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn id_generation(message: impl Into<String>) -> Self {
        Self::IdGeneration {
            message: message.into(),
        }
    }

    pub fn update_rejected(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateRejected {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
