use std::sync::Arc;

use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::auth_domain::errors::AuthError;
use crate::auth_domain::models::ConfirmationToken;
use crate::auth_domain::models::RefreshToken;
use crate::auth_domain::models::User;
use crate::auth_domain::models::UserId;
use crate::auth_domain::ports::ConfirmationTokenStore;
use crate::auth_domain::ports::RefreshTokenStore;
use crate::auth_domain::ports::UserRepository;

/// Redemption window for confirmation and password-reset tokens.
const CONFIRMATION_TOKEN_TTL_MINUTES: i64 = 15;

/// Session lifetime; fixed at issue time, no sliding expiry.
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Issues and redeems single-use, time-boxed confirmation tokens.
///
/// A token moves from issued to confirmed exactly once; expiry is detected
/// lazily at redemption and never transitioned eagerly. Expired rows stay in
/// the store for audit.
pub struct ConfirmationTokenManager<CS, UR>
where
    CS: ConfirmationTokenStore,
    UR: UserRepository,
{
    store: Arc<CS>,
    users: Arc<UR>,
}

impl<CS, UR> ConfirmationTokenManager<CS, UR>
where
    CS: ConfirmationTokenStore,
    UR: UserRepository,
{
    pub fn new(store: Arc<CS>, users: Arc<UR>) -> Self {
        Self { store, users }
    }

    /// Issue a fresh token for a user, valid for 15 minutes.
    pub async fn issue(&self, user: &User) -> Result<ConfirmationToken, AuthError> {
        let token = ConfirmationToken {
            id: Uuid::new_v4(),
            token: auth::generate_opaque_token(),
            expires_at: Utc::now() + Duration::minutes(CONFIRMATION_TOKEN_TTL_MINUTES),
            confirmed_at: None,
            user_id: user.id,
        };

        self.store.insert(token).await
    }

    /// Retrieve a token by its string without checking expiry.
    ///
    /// # Errors
    /// * `TokenNotFound` - No matching record
    pub async fn lookup(&self, token_string: &str) -> Result<ConfirmationToken, AuthError> {
        self.store
            .find_by_token(token_string)
            .await?
            .ok_or(AuthError::TokenNotFound)
    }

    /// Redeem a token, enabling the owning account.
    ///
    /// This is the only path that flips a user's enabled flag.
    ///
    /// # Errors
    /// * `TokenNotFound` - No matching record
    /// * `TokenAlreadyUsed` - Confirmed-at already set
    /// * `TokenExpired` - Past the 15-minute window
    pub async fn redeem(&self, token_string: &str) -> Result<User, AuthError> {
        let token = self.lookup(token_string).await?;
        let now = Utc::now();

        if token.is_confirmed() {
            return Err(AuthError::TokenAlreadyUsed);
        }

        if token.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        self.store.mark_confirmed(token.id, now).await?;

        let mut user = self
            .users
            .find_by_id(&token.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(token.user_id.to_string()))?;

        user.enabled = true;
        self.users.update(user).await
    }

    /// Mark a token confirmed without touching the owning user.
    ///
    /// Used by the password-reset flow, where the account is expected to be
    /// enabled already.
    ///
    /// # Errors
    /// * `TokenNotFound` / `TokenAlreadyUsed` / `TokenExpired`
    pub async fn consume(&self, token_string: &str) -> Result<ConfirmationToken, AuthError> {
        let token = self.lookup(token_string).await?;
        let now = Utc::now();

        if token.is_confirmed() {
            return Err(AuthError::TokenAlreadyUsed);
        }

        if token.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        self.store.mark_confirmed(token.id, now).await?;

        Ok(token)
    }
}

/// Issues, validates, and revokes long-lived session tokens.
///
/// Enforces the single-session invariant: at most one refresh token exists
/// per user, and issuing a new one replaces the old atomically.
pub struct RefreshTokenManager<RS>
where
    RS: RefreshTokenStore,
{
    store: Arc<RS>,
}

impl<RS> RefreshTokenManager<RS>
where
    RS: RefreshTokenStore,
{
    pub fn new(store: Arc<RS>) -> Self {
        Self { store }
    }

    /// Issue a new session token for a user, replacing any existing one.
    pub async fn issue(&self, user_id: UserId) -> Result<RefreshToken, AuthError> {
        let token = RefreshToken {
            id: Uuid::new_v4(),
            token: auth::generate_opaque_token(),
            expires_at: Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            user_id,
        };

        // delete-then-insert happens atomically inside the store
        self.store.replace_for_user(token).await
    }

    /// Retrieve a token by its string.
    ///
    /// # Errors
    /// * `TokenNotFound` - No matching record
    pub async fn find_by_token(&self, token_string: &str) -> Result<RefreshToken, AuthError> {
        self.store
            .find_by_token(token_string)
            .await?
            .ok_or(AuthError::TokenNotFound)
    }

    /// Check a token's expiry, deleting it if the session has lapsed.
    ///
    /// # Errors
    /// * `TokenExpired` - Expiry passed; the row has been deleted
    pub async fn verify(&self, token: RefreshToken) -> Result<RefreshToken, AuthError> {
        if token.is_expired(Utc::now()) {
            self.store.delete(token.id).await?;
            return Err(AuthError::TokenExpired);
        }

        Ok(token)
    }

    /// Delete every session token of a user. Idempotent.
    pub async fn revoke_all(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.store.delete_by_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::auth_domain::models::EmailAddress;
    use crate::auth_domain::models::Role;

    /// In-memory stores so the tests can observe surviving rows directly.
    #[derive(Default)]
    struct InMemoryRefreshTokenStore {
        rows: Mutex<Vec<RefreshToken>>,
    }

    #[async_trait]
    impl RefreshTokenStore for InMemoryRefreshTokenStore {
        async fn replace_for_user(&self, token: RefreshToken) -> Result<RefreshToken, AuthError> {
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|t| t.user_id != token.user_id);
            rows.push(token.clone());
            Ok(token)
        }

        async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|t| t.token == token).cloned())
        }

        async fn delete(&self, id: Uuid) -> Result<(), AuthError> {
            self.rows.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }

        async fn delete_by_user(&self, user_id: &UserId) -> Result<(), AuthError> {
            self.rows.lock().unwrap().retain(|t| t.user_id != *user_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct InMemoryConfirmationTokenStore {
        rows: Mutex<Vec<ConfirmationToken>>,
    }

    #[async_trait]
    impl ConfirmationTokenStore for InMemoryConfirmationTokenStore {
        async fn insert(&self, token: ConfirmationToken) -> Result<ConfirmationToken, AuthError> {
            self.rows.lock().unwrap().push(token.clone());
            Ok(token)
        }

        async fn find_by_token(
            &self,
            token: &str,
        ) -> Result<Option<ConfirmationToken>, AuthError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|t| t.token == token).cloned())
        }

        async fn mark_confirmed(
            &self,
            id: Uuid,
            confirmed_at: DateTime<Utc>,
        ) -> Result<(), AuthError> {
            let mut rows = self.rows.lock().unwrap();
            for row in rows.iter_mut() {
                if row.id == id {
                    row.confirmed_at = Some(confirmed_at);
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct InMemoryUserRepository {
        rows: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn create(&self, user: User) -> Result<User, AuthError> {
            self.rows.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|u| u.id == *id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|u| u.email.as_str() == email).cloned())
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
            Ok(self.find_by_email(email).await?.is_some())
        }

        async fn update(&self, user: User) -> Result<User, AuthError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| AuthError::UserNotFound(user.id.to_string()))?;
            *row = user.clone();
            Ok(user)
        }
    }

    fn test_user(enabled: bool) -> User {
        User {
            id: UserId::new(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            enabled,
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_refresh_issue_twice_leaves_only_the_second() {
        let store = Arc::new(InMemoryRefreshTokenStore::default());
        let manager = RefreshTokenManager::new(Arc::clone(&store));
        let user_id = UserId::new();

        let first = manager.issue(user_id).await.unwrap();
        let second = manager.issue(user_id).await.unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].token, second.token);
        assert_ne!(rows[0].token, first.token);
    }

    #[tokio::test]
    async fn test_refresh_issue_does_not_touch_other_users() {
        let store = Arc::new(InMemoryRefreshTokenStore::default());
        let manager = RefreshTokenManager::new(Arc::clone(&store));

        manager.issue(UserId::new()).await.unwrap();
        manager.issue(UserId::new()).await.unwrap();

        assert_eq!(store.rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_verify_expired_deletes_the_row() {
        let store = Arc::new(InMemoryRefreshTokenStore::default());
        let manager = RefreshTokenManager::new(Arc::clone(&store));
        let user_id = UserId::new();

        let mut token = manager.issue(user_id).await.unwrap();
        token.expires_at = Utc::now() - Duration::seconds(1);

        let token_string = token.token.clone();
        let result = manager.verify(token).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));

        // Lazy deletion: the row is gone after the failed verify
        let result = manager.find_by_token(&token_string).await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_refresh_verify_valid_returns_unchanged() {
        let store = Arc::new(InMemoryRefreshTokenStore::default());
        let manager = RefreshTokenManager::new(Arc::clone(&store));

        let token = manager.issue(UserId::new()).await.unwrap();
        let expires_at = token.expires_at;

        let verified = manager.verify(token).await.unwrap();
        // No sliding expiry
        assert_eq!(verified.expires_at, expires_at);
    }

    #[tokio::test]
    async fn test_revoke_all_is_idempotent() {
        let store = Arc::new(InMemoryRefreshTokenStore::default());
        let manager = RefreshTokenManager::new(Arc::clone(&store));
        let user_id = UserId::new();

        manager.issue(user_id).await.unwrap();
        manager.revoke_all(&user_id).await.unwrap();
        manager.revoke_all(&user_id).await.unwrap();

        assert!(store.rows.lock().unwrap().is_empty());
    }

    fn confirmation_manager() -> (
        Arc<InMemoryConfirmationTokenStore>,
        Arc<InMemoryUserRepository>,
        ConfirmationTokenManager<InMemoryConfirmationTokenStore, InMemoryUserRepository>,
    ) {
        let store = Arc::new(InMemoryConfirmationTokenStore::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let manager = ConfirmationTokenManager::new(Arc::clone(&store), Arc::clone(&users));
        (store, users, manager)
    }

    #[tokio::test]
    async fn test_confirmation_issue_sets_fifteen_minute_window() {
        let (_, users, manager) = confirmation_manager();
        let user = users.create(test_user(false)).await.unwrap();

        let before = Utc::now();
        let token = manager.issue(&user).await.unwrap();

        let ttl = token.expires_at - before;
        assert!(ttl <= Duration::minutes(15));
        assert!(ttl > Duration::minutes(14));
        assert!(token.confirmed_at.is_none());
    }

    #[tokio::test]
    async fn test_redeem_enables_user() {
        let (_, users, manager) = confirmation_manager();
        let user = users.create(test_user(false)).await.unwrap();

        let token = manager.issue(&user).await.unwrap();
        let redeemed = manager.redeem(&token.token).await.unwrap();

        assert!(redeemed.enabled);
        assert!(users.find_by_id(&user.id).await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn test_redeem_twice_fails_already_used() {
        let (_, users, manager) = confirmation_manager();
        let user = users.create(test_user(false)).await.unwrap();

        let token = manager.issue(&user).await.unwrap();
        manager.redeem(&token.token).await.unwrap();

        let result = manager.redeem(&token.token).await;
        assert!(matches!(result, Err(AuthError::TokenAlreadyUsed)));
    }

    #[tokio::test]
    async fn test_redeem_expired_fails_even_if_never_confirmed() {
        let (store, users, manager) = confirmation_manager();
        let user = users.create(test_user(false)).await.unwrap();

        let token = manager.issue(&user).await.unwrap();
        store.rows.lock().unwrap()[0].expires_at = Utc::now() - Duration::seconds(1);

        let result = manager.redeem(&token.token).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));

        // Rejected, not deleted: the row is kept for audit
        assert_eq!(store.rows.lock().unwrap().len(), 1);
        assert!(!users.find_by_id(&user.id).await.unwrap().unwrap().enabled);
    }

    #[tokio::test]
    async fn test_redeem_unknown_token_fails_not_found() {
        let (_, _, manager) = confirmation_manager();

        let result = manager.redeem("no-such-token").await;
        assert!(matches!(result, Err(AuthError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_lookup_does_not_check_expiry() {
        let (store, users, manager) = confirmation_manager();
        let user = users.create(test_user(false)).await.unwrap();

        let token = manager.issue(&user).await.unwrap();
        store.rows.lock().unwrap()[0].expires_at = Utc::now() - Duration::seconds(1);

        assert!(manager.lookup(&token.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_consume_marks_confirmed_without_enabling() {
        let (_, users, manager) = confirmation_manager();
        let user = users.create(test_user(false)).await.unwrap();

        let token = manager.issue(&user).await.unwrap();
        manager.consume(&token.token).await.unwrap();

        // Token is spent for both flows, user stays disabled
        assert!(!users.find_by_id(&user.id).await.unwrap().unwrap().enabled);
        let result = manager.redeem(&token.token).await;
        assert!(matches!(result, Err(AuthError::TokenAlreadyUsed)));
    }
}
