//! Document database adapter.
//!
//! The database is reached only through key-based document CRUD, listing and
//! key generation. [`DocumentStore`] is the port the persistent user store
//! depends on; [`DocumentDbClient`] implements it over HTTP.

pub mod client;
pub mod provision;

pub use client::DocumentDbClient;
pub use provision::{provision_document_db, ProvisionReport, Provisioned, StepOutcome};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A stored document: its key, the commit timestamp, and the user payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "ref")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    pub data: Value,
}

#[derive(Error, Debug)]
pub enum DocDbError {
    #[error("document database unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("document database returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected document database response: {0}")]
    Decode(String),

    #[error("invalid document database URL: {0}")]
    InvalidUrl(String),
}

impl DocDbError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Port over the document database. Absent documents are `None`, never errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ask the database for a fresh, unique document key.
    async fn generate_key(&self) -> Result<String, DocDbError>;

    async fn list_documents(&self) -> Result<Vec<Document>, DocDbError>;

    async fn fetch(&self, key: &str) -> Result<Option<Document>, DocDbError>;

    /// Create a document under `key`, returning what the database stored.
    async fn create(&self, key: &str, data: Value) -> Result<Document, DocDbError>;

    /// Merge `partial` into the document's data.
    async fn update(&self, key: &str, partial: Value) -> Result<Option<Document>, DocDbError>;

    /// Delete a document, returning it as it was before removal.
    async fn delete(&self, key: &str) -> Result<Option<Document>, DocDbError>;
}
