use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

/// Resolves a bearer token to the user it was issued to.
///
/// Every token failure, whatever the cause, surfaces as
/// `AppError::Unauthenticated`; the cause is only written to the debug log.
/// A store error during the subject lookup is not a token failure and is
/// returned as is.
pub struct Authenticator<'a> {
    tokens: &'a TokenService,
    store: &'a dyn Store,
}

impl<'a> Authenticator<'a> {
    pub fn new(tokens: &'a TokenService, store: &'a dyn Store) -> Self {
        Self { tokens, store }
    }

    pub async fn resolve(&self, token: Option<&str>) -> Result<User, AppError> {
        let token = match token {
            Some(token) if !token.is_empty() => token,
            _ => {
                log::debug!("Rejecting request: no bearer token");
                return Err(AppError::Unauthenticated);
            }
        };

        let username = self.tokens.validate(token).map_err(|e| {
            log::debug!("Rejecting request: {}", e);
            AppError::Unauthenticated
        })?;

        match self.store.find_user_by_username(&username).await? {
            Some(user) => Ok(user),
            None => {
                log::debug!("Rejecting request: token subject no longer exists");
                Err(AppError::Unauthenticated)
            }
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    } else {
        None
    }
}
