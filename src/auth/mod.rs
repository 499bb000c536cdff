pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthSession;
pub use middleware::AuthGuard;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};

/// Header carrying the session token, both on inbound requests and on the
/// responses that issue a fresh token (signup and login).
pub const X_AUTH: &str = "x-auth";

/// Credentials submitted for signup and login.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    /// User's email address. Must be a valid email shape.
    #[validate(email)]
    pub email: String,
    /// Plaintext password. Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}
