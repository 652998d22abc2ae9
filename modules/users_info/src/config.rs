use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Which store backs the users collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Document,
}

/// Configuration for the users_info module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersInfoConfig {
    #[serde(default)]
    pub store: StoreKind,
    /// Pre-populate the in-memory store with a few sample users.
    #[serde(default)]
    pub seed_demo_users: bool,
    #[serde(default)]
    pub document: DocumentDbConfig,
}

/// Connection settings for the document database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentDbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_index")]
    pub index: String,
    /// Name of the environment variable holding the database secret.
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl UsersInfoConfig {
    /// Check settings that can be verified without contacting the database.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store == StoreKind::Document {
            let url = url::Url::parse(&self.document.base_url).with_context(|| {
                format!("invalid document.base_url '{}'", self.document.base_url)
            })?;
            anyhow::ensure!(
                matches!(url.scheme(), "http" | "https"),
                "document.base_url must be an http(s) URL, got '{}'",
                self.document.base_url
            );
            anyhow::ensure!(
                !self.document.secret_env.trim().is_empty(),
                "document.secret_env must name an environment variable"
            );
        }
        Ok(())
    }
}

impl Default for DocumentDbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            database: default_database(),
            collection: default_collection(),
            index: default_index(),
            secret_env: default_secret_env(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8443".to_string()
}

fn default_database() -> String {
    "users-api".to_string()
}

fn default_collection() -> String {
    "Users".to_string()
}

fn default_index() -> String {
    "users_by_id".to_string()
}

fn default_secret_env() -> String {
    "DOCUMENT_DB_SECRET".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_section_means_memory_store() {
        let cfg: UsersInfoConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.store, StoreKind::Memory);
        assert!(!cfg.seed_demo_users);
        assert_eq!(cfg.document.database, "users-api");
        assert_eq!(cfg.document.collection, "Users");
        assert_eq!(cfg.document.secret_env, "DOCUMENT_DB_SECRET");
    }

    #[test]
    fn document_store_with_partial_settings() {
        let cfg: UsersInfoConfig = serde_json::from_value(json!({
            "store": "document",
            "document": { "base_url": "https://db.example.com", "request_timeout_ms": 250 }
        }))
        .unwrap();
        assert_eq!(cfg.store, StoreKind::Document);
        assert_eq!(cfg.document.base_url, "https://db.example.com");
        assert_eq!(cfg.document.request_timeout_ms, 250);
        assert_eq!(cfg.document.index, "users_by_id");
    }

    #[test]
    fn validate_checks_document_url_only_for_document_store() {
        let mut cfg = UsersInfoConfig::default();
        cfg.document.base_url = "ftp://db".into();
        assert!(cfg.validate().is_ok());

        cfg.store = StoreKind::Document;
        assert!(cfg.validate().is_err());

        cfg.document.base_url = "https://db.example.com".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<UsersInfoConfig, _> =
            serde_json::from_value(json!({ "stor": "memory" }));
        assert!(res.is_err());
    }
}
