//! Ephemeral store: an insertion-ordered list of users behind a lock.

use anyhow::bail;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::contract::model::{User, UserPatch};
use crate::domain::repo::UsersRepository;

/// In-memory users repository. Each instance owns its own collection.
#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `users` already stored, in the given order.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.read().clone())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, u: User) -> anyhow::Result<User> {
        let mut users = self.users.write();
        if users.iter().any(|existing| existing.id == u.id) {
            bail!("user with id {} already exists", u.id);
        }
        users.push(u.clone());
        Ok(u)
    }

    async fn update(&self, id: &str, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.apply_patch(patch);
            u.clone()
        }))
    }

    async fn delete(&self, id: &str) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write();
        Ok(users
            .iter()
            .position(|u| u.id == id)
            .map(|idx| users.remove(idx)))
    }
}

/// Three sample users for demos and manual testing.
pub fn demo_users() -> Vec<User> {
    let now = Utc::now();
    let user = |name: &str, dob: (i32, u32, u32), address: &str, description: &str| User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        dob: Utc.with_ymd_and_hms(dob.0, dob.1, dob.2, 0, 0, 0).single(),
        address: address.to_string(),
        description: description.to_string(),
        created_at: now,
    };

    vec![
        user("Ada Lovelace", (1815, 12, 10), "London", "Wrote the first program"),
        user("Alan Turing", (1912, 6, 23), "Manchester", "Asked whether machines can think"),
        user("Grace Hopper", (1906, 12, 9), "Arlington", "Built the first compiler"),
    ]
}
