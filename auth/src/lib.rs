//! Authentication primitives library
//!
//! Provides reusable credential infrastructure for services:
//! - Password hashing (Argon2id)
//! - Short-lived access token issuing and validation (JWT)
//! - Opaque random token generation for server-stored credentials
//!
//! Service crates own their token persistence and lifecycle rules; this crate
//! only covers the cryptographic pieces.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest));
//! assert!(!hasher.verify("other_password", &digest));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::AccessTokenIssuer;
//!
//! let issuer = AccessTokenIssuer::new(b"secret_key_at_least_32_bytes_long!", 15);
//! let token = issuer.issue("alice@example.com").unwrap();
//! let claims = issuer.decode(&token).unwrap();
//! assert_eq!(claims.sub, "alice@example.com");
//! ```
//!
//! ## Opaque Tokens
//! ```
//! let token = auth::generate_opaque_token();
//! assert_ne!(token, auth::generate_opaque_token());
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use issuer::AccessTokenIssuer;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::generate_opaque_token;
