//! `AuthApi` over the outbound ports.

use crate::config::AuthSettings;
use crate::domain::credentials::{credential_matches, validate_email, validate_login, validate_password};
use crate::ports::{
    AuthApi, PasswordHasher, ProfileDirectory, ProfileDirectoryError, RepositoryError, UserRecord, UserRepository,
};
use async_trait::async_trait;
use cr_01_identity::TokenIssuer;
use shared_types::{
    CommandError, Deleted, EditUserRequest, ErrorKind, LoginRequest, RegistrationRequest, TokenResponse, User, UserId,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The auth service's business logic. Collaborators are passed in
/// explicitly; nothing here knows about queues.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    profiles: Arc<dyn ProfileDirectory>,
    issuer: TokenIssuer,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        profiles: Arc<dyn ProfileDirectory>,
        issuer: TokenIssuer,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            hasher,
            profiles,
            issuer,
            settings,
        }
    }

    fn token_for(&self, user: &User) -> Result<TokenResponse, CommandError> {
        let token = self.issuer.issue(user).map_err(|e| {
            error!(user_id = %user.id, error = %e, "Token issue failed");
            CommandError::internal("could not issue token")
        })?;
        Ok(TokenResponse { token })
    }

    fn hash(&self, password: &str) -> Result<String, CommandError> {
        self.hasher.hash(password).map_err(|e| {
            error!(error = %e, "Password hashing failed");
            CommandError::internal("could not store password")
        })
    }

    async fn load(&self, id: UserId) -> Result<UserRecord, CommandError> {
        self.users
            .find(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id).into())
    }
}

#[async_trait]
impl AuthApi for AuthService {
    async fn login(&self, request: LoginRequest) -> Result<TokenResponse, CommandError> {
        let Some(record) = self.users.find_by_email(&request.email).await? else {
            debug!("Login refused: unknown email");
            return Err(CommandError::invalid_credentials());
        };

        let password_ok = self.hasher.verify(&request.password, &record.password_hash);
        let login_ok = credential_matches(&request.login, &record.user.login);
        if !(password_ok && login_ok) {
            warn!(user_id = %record.user.id, "Login refused: credential mismatch");
            return Err(CommandError::invalid_credentials());
        }

        info!(user_id = %record.user.id, "User logged in");
        self.token_for(&record.user)
    }

    async fn registration(&self, request: RegistrationRequest) -> Result<TokenResponse, CommandError> {
        validate_login(&request.login)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(CommandError::conflict("user with this email already exists"));
        }
        if self.users.find_by_login(&request.login).await?.is_some() {
            return Err(CommandError::conflict("user with this login already exists"));
        }

        let password_hash = self.hash(&request.password)?;
        let id = self.users.next_id().await?;

        let profile = match self.profiles.create_profile(id, request.profile_fields()).await {
            Ok(profile) => profile,
            Err(ProfileDirectoryError::Unavailable(reason)) => {
                // The profile may exist without an account
                warn!(user_id = %id, reason = %reason, "Registration aborted: profile service gave no answer");
                return Err(ProfileDirectoryError::Unavailable(reason).into());
            }
            Err(e) => return Err(e.into()),
        };

        let user = User {
            id,
            login: request.login,
            email: request.email.clone(),
            profile_id: Some(profile.id),
            roles: self.settings.roles_for(&request.email),
        };
        let record = UserRecord { user, password_hash };

        let record = match self.users.insert(record).await {
            Ok(record) => record,
            Err(insert_err) => {
                warn!(user_id = %id, profile_id = %profile.id, error = %insert_err, "User insert failed, removing profile");
                if let Err(e) = self.profiles.delete_profile(profile.id).await {
                    error!(profile_id = %profile.id, error = %e, "Compensating profile delete failed");
                }
                return Err(insert_err.into());
            }
        };

        info!(user_id = %record.user.id, profile_id = %profile.id, "User registered");
        self.token_for(&record.user)
    }

    async fn get_all_users(&self) -> Result<Vec<User>, CommandError> {
        Ok(self.users.list().await?.into_iter().map(|r| r.user).collect())
    }

    async fn get_user(&self, id: UserId) -> Result<User, CommandError> {
        Ok(self.load(id).await?.user)
    }

    async fn edit_user(&self, request: EditUserRequest) -> Result<User, CommandError> {
        let mut record = self.load(request.id).await?;
        let update = request.user;

        if let Some(login) = update.login {
            validate_login(&login)?;
            record.user.login = login;
        }
        if let Some(email) = update.email {
            validate_email(&email)?;
            record.user.roles = self.settings.roles_for(&email);
            record.user.email = email;
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            record.password_hash = self.hash(&password)?;
        }

        let record = self.users.update(record).await?;
        debug!(user_id = %record.user.id, "User updated");
        Ok(record.user)
    }

    async fn delete_user(&self, id: UserId) -> Result<Deleted<UserId>, CommandError> {
        let record = self.users.delete(id).await?;
        info!(user_id = %id, "User deleted");

        if let Some(profile_id) = record.user.profile_id {
            match self.profiles.delete_profile(profile_id).await {
                Ok(()) => debug!(user_id = %id, profile_id = %profile_id, "Linked profile deleted"),
                Err(ProfileDirectoryError::Rejected(e)) if e.kind == ErrorKind::NotFound => {
                    debug!(user_id = %id, profile_id = %profile_id, "Linked profile already gone");
                }
                Err(e) => warn!(user_id = %id, profile_id = %profile_id, error = %e, "Linked profile not deleted"),
            }
        }

        Ok(Deleted::new(id))
    }
}
