use tracing::{debug, info, warn};

use super::{DocDbError, DocumentDbClient};

/// Result of creating a database, collection or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

/// What happened to one provisioning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Created,
    AlreadyExists,
    /// The database answered with an unexpected status; startup continues.
    Failed { status: Option<u16>, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub database: StepOutcome,
    pub collection: StepOutcome,
    pub index: StepOutcome,
}

/// Create the database, the users collection and the by-id index.
///
/// Safe to run on every start: existing resources are reported, not errors.
/// Only an unreachable database (or an unusable URL) aborts provisioning.
pub async fn provision_document_db(
    client: &DocumentDbClient,
    index_name: &str,
) -> Result<ProvisionReport, DocDbError> {
    let database = step("database", client.database(), client.create_database().await)?;
    let collection = step(
        "collection",
        client.collection(),
        client.create_collection().await,
    )?;
    let index = step("index", index_name, client.create_index(index_name).await)?;

    Ok(ProvisionReport {
        database,
        collection,
        index,
    })
}

fn step(
    kind: &str,
    name: &str,
    result: Result<Provisioned, DocDbError>,
) -> Result<StepOutcome, DocDbError> {
    match result {
        Ok(Provisioned::Created) => {
            info!(kind, resource = name, "Provisioned document database resource");
            Ok(StepOutcome::Created)
        }
        Ok(Provisioned::AlreadyExists) => {
            debug!(kind, resource = name, "Document database resource already exists");
            Ok(StepOutcome::AlreadyExists)
        }
        Err(e @ (DocDbError::Transport(_) | DocDbError::InvalidUrl(_))) => Err(e),
        Err(e) => {
            warn!(
                kind,
                resource = name,
                error = %e,
                "Failed to provision document database resource"
            );
            Ok(StepOutcome::Failed {
                status: e.status_code(),
                message: e.to_string(),
            })
        }
    }
}
