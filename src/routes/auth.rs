use crate::{
    auth::{
        password::verify_password_async, signup::register, AuthenticatedUser, MessageResponse,
        TokenRequest, TokenResponse,
    },
    error::AppError,
    models::UserInput,
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Rejects a taken username (406) or a username/password that breaks one of
/// the signup rules (417, with the rule in the message).
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    let user = register(
        state.store.as_ref(),
        user_data.into_inner(),
        state.bcrypt_cost,
    )
    .await?;

    log::info!("Registered user {} ({})", user.username, user.id);
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "You are registered now. Please log in",
    )))
}

/// Issue an access token
///
/// Accepts `username` and `password` as form fields. An unknown username and a
/// wrong password produce the same 401, and both pay for one bcrypt check.
#[post("/token")]
pub async fn token(
    state: web::Data<AppState>,
    form: web::Form<TokenRequest>,
) -> Result<impl Responder, AppError> {
    let TokenRequest { username, password } = form.into_inner();
    let user = state.store.find_user_by_username(&username).await?;

    let hashed_password = match &user {
        Some(user) => user.hashed_password.clone(),
        None => state.dummy_hash().await?.to_string(),
    };
    let verified = verify_password_async(password, hashed_password).await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            log::info!("Failed login attempt for {}", username);
            return Err(AppError::InvalidCredentials);
        }
    };

    let access_token = state.tokens.issue(&user.username, None)?;
    log::info!("Issued token for {}", user.username);
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token)))
}

/// The authenticated user's own record, without the password hash.
#[get("/users/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signup::{PASSWORD_TOO_SHORT, USERNAME_ALL_DIGITS, USERNAME_TOO_SHORT};
    use crate::auth::{password::MIN_BCRYPT_COST, TokenService};
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(
            Arc::new(MemoryStore::new()),
            TokenService::new(b"routes-auth-secret", Duration::minutes(30)),
            MIN_BCRYPT_COST,
        ))
    }

    #[actix_rt::test]
    async fn test_signup_validation() {
        let app = test::init_service(App::new().app_data(state()).service(signup)).await;

        for (username, password, expected) in [
            ("abc", "longenoughpw", USERNAME_TOO_SHORT),
            ("123456", "longenoughpw", USERNAME_ALL_DIGITS),
            ("alice", "short", PASSWORD_TOO_SHORT),
        ] {
            let req = test::TestRequest::post()
                .uri("/signup")
                .set_json(json!({ "username": username, "password": password }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::EXPECTATION_FAILED);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], expected);
        }
    }

    #[actix_rt::test]
    async fn test_login_validation() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .service(signup)
                .service(token),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(json!({ "username": "alice", "password": "longenoughpw" }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        // Wrong password and unknown user look the same
        for (username, password) in [("alice", "wrongpassword"), ("nobody", "longenoughpw")] {
            let req = test::TestRequest::post()
                .uri("/token")
                .set_form([("username", username), ("password", password)])
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], crate::error::INVALID_CREDENTIALS_MESSAGE);
        }
    }

    #[actix_rt::test]
    async fn test_unknown_user_is_checked_against_dummy_hash() {
        let state = state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(signup)
                .service(token),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/signup")
            .set_json(json!({ "username": "alice", "password": "longenoughpw" }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        // A wrong password for a real account verifies against its stored hash
        let req = test::TestRequest::post()
            .uri("/token")
            .set_form([("username", "alice"), ("password", "wrongpassword")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
        assert!(!state.dummy_hash_ready());

        // An unknown username verifies against the dummy hash instead
        let req = test::TestRequest::post()
            .uri("/token")
            .set_form([("username", "nobody"), ("password", "longenoughpw")])
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
        assert!(state.dummy_hash_ready());

        let dummy = state.dummy_hash().await.unwrap();
        assert!(dummy.starts_with(&format!("$2b${:02}$", MIN_BCRYPT_COST)));
        assert!(!crate::auth::verify_password("longenoughpw", dummy));
    }
}
