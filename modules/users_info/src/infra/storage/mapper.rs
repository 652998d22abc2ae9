use anyhow::Context;

use crate::contract::model::{User, UserPatch};
use crate::infra::docdb::Document;
use crate::infra::storage::entity::{UserDocument, UserDocumentPatch};

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            dob: d.dob,
            address: d.address,
            description: d.description,
            created_at: d.created_at,
        }
    }
}

impl From<&User> for UserDocument {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            dob: u.dob,
            address: u.address.clone(),
            description: u.description.clone(),
            created_at: u.created_at,
        }
    }
}

impl From<&UserPatch> for UserDocumentPatch {
    fn from(p: &UserPatch) -> Self {
        Self {
            name: p.name.clone(),
            dob: p.dob,
            address: p.address.clone(),
            description: p.description.clone(),
        }
    }
}

/// Decode a stored document into a user. A missing `data.id` falls back to the document key.
pub fn document_to_user(doc: Document) -> anyhow::Result<User> {
    let mut entity: UserDocument = serde_json::from_value(doc.data)
        .with_context(|| format!("document {} is not a user", doc.key))?;
    if entity.id.is_empty() {
        entity.id = doc.key;
    }
    Ok(entity.into())
}
