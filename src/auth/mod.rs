pub mod access;
pub mod extractors;
pub mod guard;
pub mod password;
pub mod signup;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use access::{can_access, ensure_access, AccessMode};
pub use extractors::AuthenticatedUser;
pub use guard::Authenticator;
pub use password::{hash_password, hash_password_async, verify_password, verify_password_async};
pub use token::{Claims, TokenService};

/// Form fields posted to `/token` (OAuth2 password grant style).
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Response body of a successful `/token` call.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Plain `{"message": ...}` acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
