use chrono::Duration;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::auth::guard::Authenticator;
use crate::auth::password::hash_password_async;
use crate::auth::token::TokenService;
use crate::config::Config;
use crate::error::AppError;
use crate::store::Store;

const DUMMY_PASSWORD: &str = "taskvault-dummy-password";

/// Everything a request handler needs, built once at startup and shared
/// read-only between workers through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub bcrypt_cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn Store>) -> Self {
        let tokens = TokenService::new(
            config.jwt_secret.as_bytes(),
            Duration::minutes(config.token_ttl_minutes),
        );
        Self::new(store, tokens, config.bcrypt_cost)
    }

    /// A bcrypt hash at the configured cost that no real password matches.
    /// Logins for unknown usernames are verified against it so they take as
    /// long as a wrong password. Computed on first use and shared by clones.
    pub async fn dummy_hash(&self) -> Result<&str, AppError> {
        let cost = self.bcrypt_cost;
        self.dummy_hash
            .get_or_try_init(|| hash_password_async(DUMMY_PASSWORD.to_string(), cost))
            .await
            .map(String::as_str)
    }

    /// True once `dummy_hash` has been computed.
    pub fn dummy_hash_ready(&self) -> bool {
        self.dummy_hash.initialized()
    }

    pub fn authenticator(&self) -> Authenticator<'_> {
        Authenticator::new(&self.tokens, self.store.as_ref())
    }
}
