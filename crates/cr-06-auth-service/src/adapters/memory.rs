//! In-process account storage.

use crate::ports::{RepositoryError, UserRecord, UserRepository};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::UserId;
use std::collections::BTreeMap;

#[derive(Default)]
struct Table {
    rows: BTreeMap<UserId, UserRecord>,
    next_id: u64,
}

impl Table {
    /// Uniqueness of email and login against every row but `except`.
    fn check_unique(&self, record: &UserRecord, except: Option<UserId>) -> Result<(), RepositoryError> {
        for other in self.rows.values().filter(|r| Some(r.user.id) != except) {
            if other.user.email.eq_ignore_ascii_case(&record.user.email) {
                return Err(RepositoryError::Conflict("user with this email already exists".into()));
            }
            if other.user.login == record.user.login {
                return Err(RepositoryError::Conflict("user with this login already exists".into()));
            }
        }
        Ok(())
    }
}

/// `UserRepository` over a locked ordered map.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> Result<UserId, RepositoryError> {
        let mut table = self.table.write();
        table.next_id += 1;
        Ok(UserId(table.next_id))
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError> {
        let mut table = self.table.write();
        if table.rows.contains_key(&record.user.id) {
            return Err(RepositoryError::Conflict(format!("user id {} already taken", record.user.id)));
        }
        table.check_unique(&record, None)?;
        table.rows.insert(record.user.id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.table.read().rows.values().find(|r| r.user.login == login).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn update(&self, record: UserRecord) -> Result<UserRecord, RepositoryError> {
        let mut table = self.table.write();
        if !table.rows.contains_key(&record.user.id) {
            return Err(RepositoryError::NotFound(record.user.id));
        }
        table.check_unique(&record, Some(record.user.id))?;
        table.rows.insert(record.user.id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: UserId) -> Result<UserRecord, RepositoryError> {
        self.table.write().rows.remove(&id).ok_or(RepositoryError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Role, User};

    fn record(id: u64, login: &str, email: &str) -> UserRecord {
        UserRecord {
            user: User {
                id: UserId(id),
                login: login.into(),
                email: email.into(),
                profile_id: None,
                roles: vec![Role::User],
            },
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn test_reserved_ids_are_unique() {
        let repo = InMemoryUserRepository::new();
        let a = repo.next_id().await.unwrap();
        let b = repo.next_id().await.unwrap();
        assert_ne!(a, b);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_insert_enforces_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.insert(record(1, "neo", "neo@matrix.io")).await.unwrap();

        let same_email = repo.insert(record(2, "trinity", "NEO@matrix.io")).await.unwrap_err();
        assert_eq!(same_email, RepositoryError::Conflict("user with this email already exists".into()));

        let same_login = repo.insert(record(3, "neo", "other@matrix.io")).await.unwrap_err();
        assert_eq!(same_login, RepositoryError::Conflict("user with this login already exists".into()));

        assert!(repo.insert(record(1, "x", "x@y.z")).await.is_err());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_lookups_and_delete() {
        let repo = InMemoryUserRepository::new();
        repo.insert(record(1, "neo", "neo@matrix.io")).await.unwrap();

        assert!(repo.find_by_email("Neo@Matrix.io").await.unwrap().is_some());
        assert!(repo.find_by_login("neo").await.unwrap().is_some());
        assert!(repo.find_by_login("Neo").await.unwrap().is_none());

        let removed = repo.delete(UserId(1)).await.unwrap();
        assert_eq!(removed.user.login, "neo");
        assert_eq!(repo.delete(UserId(1)).await, Err(RepositoryError::NotFound(UserId(1))));
    }

    #[tokio::test]
    async fn test_update_keeps_own_values_but_not_others() {
        let repo = InMemoryUserRepository::new();
        repo.insert(record(1, "neo", "neo@matrix.io")).await.unwrap();
        repo.insert(record(2, "trinity", "trinity@matrix.io")).await.unwrap();

        // Re-saving unchanged values is not a conflict with itself
        assert!(repo.update(record(1, "neo", "neo@matrix.io")).await.is_ok());
        assert!(repo.update(record(1, "trinity", "neo@matrix.io")).await.is_err());
        assert_eq!(
            repo.update(record(9, "smith", "smith@matrix.io")).await,
            Err(RepositoryError::NotFound(UserId(9)))
        );
    }
}
