//! Outbound (Driven) ports for the auth service.

use async_trait::async_trait;
use shared_types::{CommandError, Profile, ProfileFields, ProfileId, User, UserId};
use std::fmt;
use thiserror::Error;

/// An account as stored: the public user plus its password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Storage failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Email or login already held by another account.
    #[error("{0}")]
    Conflict(String),

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for CommandError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => CommandError::conflict(message),
            RepositoryError::NotFound(_) => CommandError::not_found(err.to_string()),
            RepositoryError::Unavailable(_) => CommandError::internal(err.to_string()),
        }
    }
}

/// Account storage. Email and login are unique (email case-insensitively).
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Reserve an id for an account about to be inserted.
    async fn next_id(&self) -> Result<UserId, RepositoryError>;

    /// Store a new account under its reserved id.
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, RepositoryError>;

    async fn find(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// All accounts ordered by id.
    async fn list(&self) -> Result<Vec<UserRecord>, RepositoryError>;

    /// Replace a stored account.
    async fn update(&self, record: UserRecord) -> Result<UserRecord, RepositoryError>;

    /// Remove an account and return what was stored.
    async fn delete(&self, id: UserId) -> Result<UserRecord, RepositoryError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub String);

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// `true` if `password` matches `hash`. An unreadable hash never matches.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Failure of a call to the profile service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileDirectoryError {
    /// The profile service answered with an error.
    #[error("profile service rejected the call: {0}")]
    Rejected(CommandError),

    /// No usable answer (timeout, transport, unreadable reply). The remote
    /// side effect may or may not have happened.
    #[error("profile service unavailable: {0}")]
    Unavailable(String),
}

impl From<ProfileDirectoryError> for CommandError {
    fn from(err: ProfileDirectoryError) -> Self {
        match err {
            ProfileDirectoryError::Rejected(inner) => inner,
            ProfileDirectoryError::Unavailable(_) => CommandError::internal(err.to_string()),
        }
    }
}

/// The profile service, as seen from the auth service.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Create the profile owned by `owner`.
    async fn create_profile(&self, owner: UserId, fields: ProfileFields) -> Result<Profile, ProfileDirectoryError>;

    async fn delete_profile(&self, id: ProfileId) -> Result<(), ProfileDirectoryError>;
}

#[cfg(test)]
pub mod mocks {
    //! Test doubles for the outbound ports.

    use super::*;
    use parking_lot::Mutex;

    /// Reversible "hash" for fast tests.
    pub struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, HashError> {
            Ok(format!("plain${password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash.strip_prefix("plain$") == Some(password)
        }
    }

    /// In-memory profile service with switchable failures.
    #[derive(Default)]
    pub struct MockProfileDirectory {
        pub profiles: Mutex<Vec<Profile>>,
        pub deleted: Mutex<Vec<ProfileId>>,
        pub fail_create: Mutex<Option<ProfileDirectoryError>>,
    }

    impl MockProfileDirectory {
        pub fn failing(err: ProfileDirectoryError) -> Self {
            let mock = Self::default();
            *mock.fail_create.lock() = Some(err);
            mock
        }

        pub fn live_count(&self) -> usize {
            self.profiles.lock().len()
        }
    }

    #[async_trait]
    impl ProfileDirectory for MockProfileDirectory {
        async fn create_profile(&self, owner: UserId, fields: ProfileFields) -> Result<Profile, ProfileDirectoryError> {
            if let Some(err) = self.fail_create.lock().clone() {
                return Err(err);
            }
            let mut profiles = self.profiles.lock();
            let profile = Profile {
                id: ProfileId(100 + profiles.len() as u64 + self.deleted.lock().len() as u64),
                name: fields.name,
                surname: fields.surname,
                phone_number: fields.phone_number,
                address: fields.address,
                user_id: Some(owner),
            };
            profiles.push(profile.clone());
            Ok(profile)
        }

        async fn delete_profile(&self, id: ProfileId) -> Result<(), ProfileDirectoryError> {
            let mut profiles = self.profiles.lock();
            let before = profiles.len();
            profiles.retain(|p| p.id != id);
            if profiles.len() == before {
                return Err(ProfileDirectoryError::Rejected(CommandError::not_found(format!(
                    "profile {id} not found"
                ))));
            }
            self.deleted.lock().push(id);
            Ok(())
        }
    }
}
