//! Persistent store behavior against an in-process fake of the document database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use users_info::{
    contract::model::{NewUser, UserPatch},
    domain::error::DomainError,
    infra::docdb::{DocDbError, Document, DocumentStore},
    infra::ids::DocumentKeyGenerator,
    infra::storage::DocumentUsersRepository,
    UsersInfo,
};

#[derive(Default)]
struct FakeDocumentDb {
    docs: Mutex<BTreeMap<String, Value>>,
    next_key: AtomicU64,
    fail_keys: AtomicBool,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FakeDocumentDb {
    fn unavailable() -> DocDbError {
        DocDbError::Status {
            status: 503,
            body: "unavailable".into(),
        }
    }

    fn doc(key: &str, data: &Value) -> Document {
        Document {
            key: key.to_string(),
            ts: Some(1),
            data: data.clone(),
        }
    }

    fn len(&self) -> usize {
        self.docs.lock().len()
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentDb {
    async fn generate_key(&self) -> Result<String, DocDbError> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(format!("{}", 1000 + self.next_key.fetch_add(1, Ordering::SeqCst)))
    }

    async fn list_documents(&self) -> Result<Vec<Document>, DocDbError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self
            .docs
            .lock()
            .iter()
            .map(|(k, v)| Self::doc(k, v))
            .collect())
    }

    async fn fetch(&self, key: &str) -> Result<Option<Document>, DocDbError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.docs.lock().get(key).map(|v| Self::doc(key, v)))
    }

    async fn create(&self, key: &str, data: Value) -> Result<Document, DocDbError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.docs.lock().insert(key.to_string(), data.clone());
        Ok(Self::doc(key, &data))
    }

    async fn update(&self, key: &str, partial: Value) -> Result<Option<Document>, DocDbError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut docs = self.docs.lock();
        let Some(current) = docs.get_mut(key) else {
            return Ok(None);
        };
        if let (Some(target), Some(changes)) = (current.as_object_mut(), partial.as_object()) {
            for (field, value) in changes {
                target.insert(field.clone(), value.clone());
            }
        }
        Ok(Some(Self::doc(key, current)))
    }

    async fn delete(&self, key: &str) -> Result<Option<Document>, DocDbError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.docs.lock().remove(key).map(|v| Self::doc(key, &v)))
    }
}

fn persistent_module(db: Arc<FakeDocumentDb>) -> UsersInfo {
    let store: Arc<dyn DocumentStore> = db;
    UsersInfo::from_parts(
        Arc::new(DocumentUsersRepository::new(store.clone())),
        Arc::new(DocumentKeyGenerator::new(store)),
    )
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn crud_through_document_store_uses_database_keys() {
    let db = Arc::new(FakeDocumentDb::default());
    let svc = persistent_module(db.clone()).service();

    let created = svc
        .create_user(NewUser {
            name: "Test User".into(),
            address: "Canada".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, "1000");
    assert_eq!(db.len(), 1);
    assert_eq!(svc.get_user("1000").await.unwrap(), created);

    let updated = svc
        .update_user(
            "1000",
            UserPatch {
                name: Some("Renamed".into()),
                address: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.address, "Canada");
    assert_eq!(updated.created_at, created.created_at);

    assert_eq!(svc.list_users().await.unwrap(), vec![updated.clone()]);
    assert_eq!(svc.delete_user("1000").await.unwrap(), updated);
    assert!(matches!(
        svc.get_user("1000").await,
        Err(DomainError::UserNotFound { .. })
    ));
    assert!(matches!(
        svc.delete_user("1000").await,
        Err(DomainError::UserNotFound { .. })
    ));
}

#[tokio::test]
async fn failed_remote_create_returns_500_and_stores_nothing() {
    let db = Arc::new(FakeDocumentDb::default());
    db.fail_writes.store(true, Ordering::SeqCst);
    let router = persistent_module(db.clone()).register_rest(Router::new());

    let (status, body) = call(&router, "POST", "/api/users", Some(json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_DB");
    assert!(body.get("id").is_none());
    assert_eq!(db.len(), 0);
}

#[tokio::test]
async fn failed_key_generation_returns_500_before_any_write() {
    let db = Arc::new(FakeDocumentDb::default());
    db.fail_keys.store(true, Ordering::SeqCst);
    let router = persistent_module(db.clone()).register_rest(Router::new());

    let (status, body) = call(&router, "POST", "/api/users", Some(json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "USERS_ID_GENERATION");
    assert_eq!(body["message"], "unable to generate an id for the user");
    assert_eq!(db.len(), 0);
}

#[tokio::test]
async fn rejected_update_maps_to_404() {
    let db = Arc::new(FakeDocumentDb::default());
    let module = persistent_module(db.clone());
    let router = module.register_rest(Router::new());

    let (_, created) = call(&router, "POST", "/api/users", Some(json!({ "name": "A" }))).await;
    let uri = format!("/api/users/{}", created["id"].as_str().unwrap());

    db.fail_writes.store(true, Ordering::SeqCst);
    let (status, body) = call(&router, "PATCH", &uri, Some(json!({ "name": "B" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USERS_UPDATE_REJECTED");
}

#[tokio::test]
async fn accepted_update_that_cannot_be_decoded_is_a_500() {
    let db = Arc::new(FakeDocumentDb::default());
    db.docs
        .lock()
        .insert("bad".into(), json!({ "something": "else" }));
    let router = persistent_module(db.clone()).register_rest(Router::new());

    let (status, body) = call(&router, "PATCH", "/api/users/bad", Some(json!({ "name": "B" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_DB");
    assert_eq!(db.docs.lock()["bad"]["name"], "B");
}

#[tokio::test]
async fn backend_read_failures_return_500() {
    let db = Arc::new(FakeDocumentDb::default());
    db.fail_reads.store(true, Ordering::SeqCst);
    let router = persistent_module(db).register_rest(Router::new());

    let (status, _) = call(&router, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = call(&router, "GET", "/api/users/1000", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn undecodable_documents_surface_as_errors() {
    let db = Arc::new(FakeDocumentDb::default());
    db.docs
        .lock()
        .insert("bad".into(), json!({ "something": "else" }));
    let svc = persistent_module(db).service();

    assert!(matches!(
        svc.get_user("bad").await,
        Err(DomainError::Database { .. })
    ));
}
