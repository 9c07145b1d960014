use std::sync::Arc;

use async_trait::async_trait;
use auth::AccessTokenIssuer;
use chrono::Utc;

use crate::auth_domain::errors::AuthError;
use crate::auth_domain::models::AuthenticatedSession;
use crate::auth_domain::models::RegisterUserCommand;
use crate::auth_domain::models::Role;
use crate::auth_domain::models::User;
use crate::auth_domain::models::UserId;
use crate::auth_domain::models::UserProfile;
use crate::auth_domain::ports::AuthServicePort;
use crate::auth_domain::ports::ConfirmationTokenStore;
use crate::auth_domain::ports::Mailer;
use crate::auth_domain::ports::RefreshTokenStore;
use crate::auth_domain::ports::UserRepository;
use crate::auth_domain::tokens::ConfirmationTokenManager;
use crate::auth_domain::tokens::RefreshTokenManager;

/// Domain service orchestrating the credential lifecycle.
///
/// Coordinates the password hasher, token managers, and access-token issuer
/// behind the per-endpoint operations of [`AuthServicePort`]. Holds no
/// mutable state of its own; the stores are the single source of truth.
pub struct AuthService<UR, CS, RS, M>
where
    UR: UserRepository,
    CS: ConfirmationTokenStore,
    RS: RefreshTokenStore,
    M: Mailer,
{
    users: Arc<UR>,
    confirmation_tokens: ConfirmationTokenManager<CS, UR>,
    refresh_tokens: RefreshTokenManager<RS>,
    mailer: Arc<M>,
    access_tokens: Arc<AccessTokenIssuer>,
    password_hasher: auth::PasswordHasher,
}

impl<UR, CS, RS, M> AuthService<UR, CS, RS, M>
where
    UR: UserRepository,
    CS: ConfirmationTokenStore,
    RS: RefreshTokenStore,
    M: Mailer,
{
    /// Create a new auth service with injected dependencies.
    pub fn new(
        users: Arc<UR>,
        confirmation_store: Arc<CS>,
        refresh_store: Arc<RS>,
        mailer: Arc<M>,
        access_tokens: Arc<AccessTokenIssuer>,
    ) -> Self {
        Self {
            confirmation_tokens: ConfirmationTokenManager::new(
                confirmation_store,
                Arc::clone(&users),
            ),
            refresh_tokens: RefreshTokenManager::new(refresh_store),
            users,
            mailer,
            access_tokens,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))
    }

    async fn session_for(
        &self,
        user: &User,
        refresh_token: String,
    ) -> Result<AuthenticatedSession, AuthError> {
        let access_token = self.access_tokens.issue(user.email.as_str())?;

        Ok(AuthenticatedSession {
            access_token,
            refresh_token,
            user: UserProfile::from(user),
        })
    }
}

#[async_trait]
impl<UR, CS, RS, M> AuthServicePort for AuthService<UR, CS, RS, M>
where
    UR: UserRepository,
    CS: ConfirmationTokenStore,
    RS: RefreshTokenStore,
    M: Mailer,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError> {
        if self.users.exists_by_email(command.email.as_str()).await? {
            return Err(AuthError::UserAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            enabled: false,
            role: Role::User,
            created_at: Utc::now(),
        };

        let user = self.users.create(user).await?;

        let token = self.confirmation_tokens.issue(&user).await?;
        self.mailer
            .send_confirmation_email(user.email.as_str(), &token.token)
            .await?;

        tracing::info!(user_id = %user.id, "User registered, confirmation email sent");

        Ok(user)
    }

    async fn confirm_email(&self, token: &str) -> Result<(), AuthError> {
        let user = self.confirmation_tokens.redeem(token).await?;

        tracing::info!(user_id = %user.id, "Email confirmed, account enabled");

        Ok(())
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AuthError> {
        let user = self.find_user_by_email(email).await?;

        if !user.enabled {
            return Err(AuthError::UserNotEnabled(email.to_string()));
        }

        if !self.password_hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        // Replaces any existing session for this user
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "Login succeeded, session issued");

        self.session_for(&user, refresh_token.token).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthenticatedSession, AuthError> {
        let token = self.refresh_tokens.find_by_token(refresh_token).await?;
        let token = self.refresh_tokens.verify(token).await?;

        let user = self
            .users
            .find_by_id(&token.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(token.user_id.to_string()))?;

        // The refresh token string is not rotated; it stays valid until its
        // original expiry.
        self.session_for(&user, token.token).await
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let user = self.find_user_by_email(email).await?;

        let token = self.confirmation_tokens.issue(&user).await?;
        self.mailer
            .send_password_reset_email(user.email.as_str(), &token.token)
            .await?;

        tracing::info!(user_id = %user.id, "Password reset email sent");

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let confirmation = self.confirmation_tokens.lookup(token).await?;

        if confirmation.is_confirmed() {
            return Err(AuthError::TokenAlreadyUsed);
        }

        if confirmation.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        let mut user = self
            .users
            .find_by_id(&confirmation.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(confirmation.user_id.to_string()))?;

        user.password_hash = self.password_hasher.hash(new_password)?;
        let user = self.users.update(user).await?;

        // Consume marks the token confirmed but leaves the enabled flag
        // alone; only the confirm-email path enables accounts.
        self.confirmation_tokens.consume(token).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");

        Ok(())
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token = self.refresh_tokens.find_by_token(refresh_token).await?;
        self.refresh_tokens.revoke_all(&token.user_id).await?;

        tracing::info!(user_id = %token.user_id, "Logged out, sessions revoked");

        Ok(())
    }

    async fn get_profile(&self, email: &str) -> Result<UserProfile, AuthError> {
        let user = self.find_user_by_email(email).await?;
        Ok(UserProfile::from(&user))
    }
}
