use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use modkit::TracedClient;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::{StoreKind, UsersInfoConfig};
use crate::contract::client::UsersInfoApi;
use crate::domain::ports::IdGenerator;
use crate::domain::repo::UsersRepository;
use crate::domain::service::Service;
use crate::gateways::local::UsersInfoLocalClient;
use crate::infra::docdb::{provision_document_db, DocumentDbClient, DocumentStore};
use crate::infra::ids::{DocumentKeyGenerator, UuidIdGenerator};
use crate::infra::storage::{demo_users, DocumentUsersRepository, InMemoryUsersRepository};

/// The users module: owns the domain service wired to the configured store.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
}

impl UsersInfo {
    /// Build the module from its configuration section.
    ///
    /// For the document store this reads the secret from the configured
    /// environment variable and provisions the database before returning.
    pub async fn init(cfg: &UsersInfoConfig) -> anyhow::Result<Self> {
        info!("Initializing users_info module");
        debug!("Loaded users_info config: store={:?}", cfg.store);
        cfg.validate()?;

        let (repo, ids): (Arc<dyn UsersRepository>, Arc<dyn IdGenerator>) = match cfg.store {
            StoreKind::Memory => {
                let repo = if cfg.seed_demo_users {
                    info!("Seeding in-memory store with demo users");
                    InMemoryUsersRepository::with_users(demo_users())
                } else {
                    InMemoryUsersRepository::new()
                };
                (Arc::new(repo), Arc::new(UuidIdGenerator))
            }
            StoreKind::Document => {
                let doc = &cfg.document;
                let secret = std::env::var(&doc.secret_env)
                    .ok()
                    .filter(|s| !s.is_empty())
                    .with_context(|| {
                        format!("document database secret not set (env {})", doc.secret_env)
                    })?;

                let client = DocumentDbClient::new(TracedClient::default(), doc, secret)
                    .context("invalid document database settings")?;
                let report = provision_document_db(&client, &doc.index)
                    .await
                    .with_context(|| format!("cannot reach document database at {}", doc.base_url))?;
                debug!(?report, "Document database provisioned");

                let store: Arc<dyn DocumentStore> = Arc::new(client);
                (
                    Arc::new(DocumentUsersRepository::new(store.clone())),
                    Arc::new(DocumentKeyGenerator::new(store)),
                )
            }
        };

        Ok(Self::from_parts(repo, ids))
    }

    /// Wire the module from already-built ports.
    pub fn from_parts(repo: Arc<dyn UsersRepository>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            service: Arc::new(Service::new(repo, ids)),
        }
    }

    /// A module over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(InMemoryUsersRepository::new()),
            Arc::new(UuidIdGenerator),
        )
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn UsersInfoApi> {
        Arc::new(UsersInfoLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering users_info REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
