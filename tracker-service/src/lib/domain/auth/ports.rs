use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::auth_domain::errors::AuthError;
use crate::auth_domain::errors::MailerError;
use crate::auth_domain::models::AuthenticatedSession;
use crate::auth_domain::models::ConfirmationToken;
use crate::auth_domain::models::RefreshToken;
use crate::auth_domain::models::RegisterUserCommand;
use crate::auth_domain::models::User;
use crate::auth_domain::models::UserId;
use crate::auth_domain::models::UserProfile;

/// Port for authentication service operations, one per HTTP endpoint.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new, disabled user and send a confirmation email.
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Email is already registered
    /// * `Email` - Confirmation email could not be handed off
    /// * `Database` - Storage operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError>;

    /// Redeem a confirmation token, enabling the owning account.
    ///
    /// # Errors
    /// * `TokenNotFound` - No such token
    /// * `TokenAlreadyUsed` - Token was already redeemed
    /// * `TokenExpired` - Token is past its 15-minute window
    async fn confirm_email(&self, token: &str) -> Result<(), AuthError>;

    /// Authenticate with email and password.
    ///
    /// Issues an access token and a refresh token; issuing the refresh token
    /// replaces any prior session for the user.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this email
    /// * `UserNotEnabled` - Account not yet confirmed
    /// * `InvalidCredentials` - Password mismatch
    async fn login(&self, email: &str, password: &str)
        -> Result<AuthenticatedSession, AuthError>;

    /// Mint a new access token for the session behind a refresh token.
    ///
    /// The refresh token string is not rotated; it stays valid until its
    /// original expiry.
    ///
    /// # Errors
    /// * `TokenNotFound` - No such refresh token
    /// * `TokenExpired` - Session expired (the token is deleted)
    async fn refresh(&self, refresh_token: &str) -> Result<AuthenticatedSession, AuthError>;

    /// Issue a password-reset token and send it by email.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this email
    /// * `Email` - Reset email could not be handed off
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Consume a reset token and replace the owner's password.
    ///
    /// Marks the token confirmed without touching the enabled flag; only the
    /// confirm-email path enables accounts.
    ///
    /// # Errors
    /// * `TokenNotFound` / `TokenAlreadyUsed` / `TokenExpired`
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// End the session behind a refresh token, revoking every refresh token
    /// of its owner.
    ///
    /// # Errors
    /// * `TokenNotFound` - No such refresh token
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Public profile of the user behind an email address.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this email
    async fn get_profile(&self, email: &str) -> Result<UserProfile, AuthError>;
}

/// Persistence operations for the user aggregate.
///
/// The tracker's application/document tables hang off the same users table
/// but are owned by other services; this port only covers the auth fields.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Email unique constraint violated
    /// * `Database` - Storage operation failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve a user by identifier (None if not found).
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;

    /// Retrieve a user by email, case-sensitive (None if not found).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Check whether a user with this email exists.
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    /// Update an existing user (enabled flag, password hash).
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Database` - Storage operation failed
    async fn update(&self, user: User) -> Result<User, AuthError>;
}

/// Durable storage for confirmation tokens.
///
/// Rows are never deleted; expired and confirmed tokens remain for audit.
#[async_trait]
pub trait ConfirmationTokenStore: Send + Sync + 'static {
    /// Persist a newly issued token.
    async fn insert(&self, token: ConfirmationToken) -> Result<ConfirmationToken, AuthError>;

    /// Retrieve a token by its string (None if not found). Does not check
    /// expiry; callers decide.
    async fn find_by_token(&self, token: &str) -> Result<Option<ConfirmationToken>, AuthError>;

    /// Set the confirmed-at timestamp of a token.
    async fn mark_confirmed(
        &self,
        id: Uuid,
        confirmed_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;
}

/// Durable storage for refresh tokens.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Delete every token owned by `token.user_id`, then insert `token`, as
    /// one atomic unit. Two concurrent calls for the same user must leave
    /// exactly one surviving row.
    async fn replace_for_user(&self, token: RefreshToken) -> Result<RefreshToken, AuthError>;

    /// Retrieve a token by its string (None if not found).
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError>;

    /// Delete a single token by id. Succeeds even if already gone.
    async fn delete(&self, id: Uuid) -> Result<(), AuthError>;

    /// Delete every token owned by a user. Idempotent.
    async fn delete_by_user(&self, user_id: &UserId) -> Result<(), AuthError>;
}

/// Outbound email delivery. Fire-and-forget: failures surface as a generic
/// delivery error and are not retried here.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send the account-confirmation link carrying `token`.
    async fn send_confirmation_email(&self, to: &str, token: &str) -> Result<(), MailerError>;

    /// Send the password-reset link carrying `token`.
    async fn send_password_reset_email(&self, to: &str, token: &str) -> Result<(), MailerError>;
}
