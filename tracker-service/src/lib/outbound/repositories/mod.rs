pub mod confirmation_token;
pub mod refresh_token;
pub mod user;

pub use confirmation_token::PostgresConfirmationTokenStore;
pub use refresh_token::PostgresRefreshTokenStore;
pub use user::PostgresUserRepository;
