use actix_web::dev::Payload;
use actix_web::{http::header, web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::guard::bearer_token;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The user behind the request's bearer token.
///
/// Taking this as a handler argument makes the route protected: extraction runs
/// the authentication guard and fails the request with a uniform 401 when the
/// token is missing, invalid, expired, or belongs to a user that no longer exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_owned);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered".into())
            })?;
            let user = state.authenticator().resolve(token.as_deref()).await?;
            Ok(AuthenticatedUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenService;
    use crate::models::NewUser;
    use crate::store::{MemoryStore, Store};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Duration;
    use std::sync::Arc;

    async fn state_with_alice() -> web::Data<AppState> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_user(NewUser {
                username: "alice".into(),
                hashed_password: "hash".into(),
            })
            .await
            .unwrap();
        let tokens = TokenService::new(b"extractor-secret", Duration::minutes(30));
        web::Data::new(AppState::new(store, tokens, 4))
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let state = state_with_alice().await;
        let token = state.tokens.issue("alice", None).unwrap();
        let req = test::TestRequest::default()
            .app_data(state)
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let mut payload = Payload::None;
        let user = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(user.0.username, "alice");
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let state = state_with_alice().await;
        let req = test::TestRequest::default()
            .app_data(state)
            .to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
