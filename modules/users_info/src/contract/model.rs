use chrono::{DateTime, Utc};

/// Pure user model for inter-module communication (no serde).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub dob: Option<DateTime<Utc>>,
    pub address: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user. `id` and `created_at` are server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub name: String,
    pub dob: Option<DateTime<Utc>>,
    pub address: String,
    pub description: String,
}

/// Partial update data for a user.
///
/// `None` leaves a field untouched; so does an empty string once the patch
/// is [normalized](UserPatch::normalized).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub dob: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub description: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UserPatch {
    /// Drop empty-string fields so that only real changes remain.
    pub fn normalized(self) -> Self {
        Self {
            name: non_empty(self.name),
            dob: self.dob,
            address: non_empty(self.address),
            description: non_empty(self.description),
        }
    }
}

impl User {
    /// Sparse merge: overwrite every field the patch carries.
    /// Expects a normalized patch.
    pub fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(dob) = patch.dob {
            self.dob = Some(dob);
        }
        if let Some(address) = &patch.address {
            self.address.clone_from(address);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
    }
}
