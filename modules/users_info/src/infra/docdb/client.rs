use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::instrument;
use url::Url;

use super::provision::Provisioned;
use super::{DocDbError, Document, DocumentStore};
use crate::config::DocumentDbConfig;
use modkit::TracedClient;

#[derive(Deserialize)]
struct KeyResponse {
    id: String,
}

#[derive(Deserialize)]
struct DocumentPage {
    #[serde(default)]
    data: Vec<Document>,
}

/// HTTP adapter for the document database.
///
/// Every request is bearer-authenticated with the database secret and goes
/// through the [`TracedClient`], so it shows up as an `outgoing_http` span.
pub struct DocumentDbClient {
    http: TracedClient,
    base: Url,
    database: String,
    collection: String,
    secret: String,
    timeout: Duration,
}

impl DocumentDbClient {
    pub fn new(
        http: TracedClient,
        cfg: &DocumentDbConfig,
        secret: impl Into<String>,
    ) -> Result<Self, DocDbError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| DocDbError::InvalidUrl(format!("{}: {e}", cfg.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(DocDbError::InvalidUrl(cfg.base_url.clone()));
        }

        Ok(Self {
            http,
            base,
            database: cfg.database.clone(),
            collection: cfg.collection.clone(),
            secret: secret.into(),
            timeout: Duration::from_millis(cfg.request_timeout_ms),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// `POST {base}/databases`
    pub async fn create_database(&self) -> Result<Provisioned, DocDbError> {
        let url = self.url(&["databases"])?;
        self.create_resource(url, json!({ "name": self.database }))
            .await
    }

    /// `POST {base}/databases/{db}/collections`
    pub async fn create_collection(&self) -> Result<Provisioned, DocDbError> {
        let url = self.url(&["databases", &self.database, "collections"])?;
        self.create_resource(url, json!({ "name": self.collection }))
            .await
    }

    /// `POST {base}/databases/{db}/indexes`, indexing documents by `data.id`.
    pub async fn create_index(&self, name: &str) -> Result<Provisioned, DocDbError> {
        let url = self.url(&["databases", &self.database, "indexes"])?;
        let body = json!({
            "name": name,
            "source": self.collection,
            "terms": [{ "field": ["data", "id"] }],
        });
        self.create_resource(url, body).await
    }

    // --- helpers ---

    fn url(&self, segments: &[&str]) -> Result<Url, DocDbError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DocDbError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn document_url(&self, key: &str) -> Result<Url, DocDbError> {
        self.url(&[
            "databases",
            &self.database,
            "collections",
            &self.collection,
            "documents",
            key,
        ])
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, DocDbError> {
        let mut builder = self
            .http
            .request(method, url.as_str())
            .bearer_auth(&self.secret)
            .timeout(self.timeout);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(self.http.send(builder).await?)
    }

    async fn create_resource(&self, url: Url, body: Value) -> Result<Provisioned, DocDbError> {
        let response = self.send(Method::POST, url, Some(&body)).await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(Provisioned::AlreadyExists);
        }
        ensure_success(response).await?;
        Ok(Provisioned::Created)
    }

    /// Like [`Self::send`] but maps 404 to `None`.
    async fn send_optional(
        &self,
        method: Method,
        key: &str,
        body: Option<&Value>,
    ) -> Result<Option<Document>, DocDbError> {
        let response = self.send(method, self.document_url(key)?, body).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        decode(response).await.map(Some)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DocDbError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DocDbError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DocDbError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| DocDbError::Decode(e.to_string()))
}

#[async_trait]
impl DocumentStore for DocumentDbClient {
    #[instrument(name = "users_info.docdb.generate_key", skip_all, fields(db = %self.database))]
    async fn generate_key(&self) -> Result<String, DocDbError> {
        let url = self.url(&["databases", &self.database, "ids"])?;
        let response = ensure_success(self.send(Method::POST, url, None).await?).await?;
        let key: KeyResponse = decode(response).await?;
        if key.id.is_empty() {
            return Err(DocDbError::Decode("empty key in id response".into()));
        }
        Ok(key.id)
    }

    #[instrument(name = "users_info.docdb.list", skip_all, fields(collection = %self.collection))]
    async fn list_documents(&self) -> Result<Vec<Document>, DocDbError> {
        let url = self.url(&[
            "databases",
            &self.database,
            "collections",
            &self.collection,
            "documents",
        ])?;
        let response = ensure_success(self.send(Method::GET, url, None).await?).await?;
        let page: DocumentPage = decode(response).await?;
        Ok(page.data)
    }

    #[instrument(name = "users_info.docdb.fetch", skip(self))]
    async fn fetch(&self, key: &str) -> Result<Option<Document>, DocDbError> {
        self.send_optional(Method::GET, key, None).await
    }

    #[instrument(name = "users_info.docdb.create", skip(self, data))]
    async fn create(&self, key: &str, data: Value) -> Result<Document, DocDbError> {
        let body = json!({ "data": data });
        let response = self
            .send(Method::POST, self.document_url(key)?, Some(&body))
            .await?;
        decode(ensure_success(response).await?).await
    }

    #[instrument(name = "users_info.docdb.update", skip(self, partial))]
    async fn update(&self, key: &str, partial: Value) -> Result<Option<Document>, DocDbError> {
        let body = json!({ "data": partial });
        self.send_optional(Method::PATCH, key, Some(&body)).await
    }

    #[instrument(name = "users_info.docdb.delete", skip(self))]
    async fn delete(&self, key: &str) -> Result<Option<Document>, DocDbError> {
        self.send_optional(Method::DELETE, key, None).await
    }
}
