//! # Inbound Port - AuthApi

use async_trait::async_trait;
use shared_types::{
    CommandError, Deleted, EditUserRequest, LoginRequest, RegistrationRequest, TokenResponse, User, UserId,
};

/// One method per auth command.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `login`. Email, login and password must all belong to one account.
    ///
    /// # Errors
    /// - `InvalidCredentials`: any mismatch, without saying which
    async fn login(&self, request: LoginRequest) -> Result<TokenResponse, CommandError>;

    /// `registration`. Creates the account and its profile, returns a token.
    ///
    /// # Errors
    /// - `ValidationFailed`: bad email, password or profile field
    /// - `DomainConflict`: email or login already registered
    async fn registration(&self, request: RegistrationRequest) -> Result<TokenResponse, CommandError>;

    /// `get-all-users`.
    async fn get_all_users(&self) -> Result<Vec<User>, CommandError>;

    /// `get-user`.
    async fn get_user(&self, id: UserId) -> Result<User, CommandError>;

    /// `edit-user`. Only the fields present in the update change.
    ///
    /// # Errors
    /// - `NotFound`, `ValidationFailed`
    /// - `DomainConflict`: new email or login belongs to another account
    async fn edit_user(&self, request: EditUserRequest) -> Result<User, CommandError>;

    /// `delete-user`. Also removes the linked profile.
    async fn delete_user(&self, id: UserId) -> Result<Deleted<UserId>, CommandError>;
}
