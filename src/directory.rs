//! User-identity lookup consumed by chat formatting.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::config::DirectoryEntry;
use crate::protocol::UserId;

/// Display identity of a user, as cached from the platform's account store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub name: String,
    pub role: String,
}

/// Identity lookup keyed by numeric user id. The persistent account store is
/// out of scope; the server consumes whatever implementation it is handed.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, user_id: UserId) -> Option<UserIdentity>;
}

/// In-memory directory, seeded from configuration or populated by tests.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<UserId, UserIdentity>,
}

impl InMemoryUserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(entries: &[DirectoryEntry]) -> Self {
        let directory = Self::new();
        for entry in entries {
            directory.insert(
                entry.id,
                UserIdentity {
                    name: entry.name.clone(),
                    role: entry.role.clone(),
                },
            );
        }
        directory
    }

    pub fn insert(&self, user_id: UserId, identity: UserIdentity) {
        self.users.insert(user_id, identity);
    }

    pub fn remove(&self, user_id: UserId) {
        self.users.remove(&user_id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup(&self, user_id: UserId) -> Option<UserIdentity> {
        self.users.get(&user_id).map(|entry| entry.value().clone())
    }
}
