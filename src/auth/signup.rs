use crate::auth::password::hash_password_async;
use crate::error::AppError;
use crate::models::{NewUser, User, UserInput};
use crate::store::Store;

pub const USERNAME_TOO_SHORT: &str = "username should have more than 3 characters";
pub const USERNAME_ALL_DIGITS: &str = "username should not have all numbers";
pub const PASSWORD_TOO_SHORT: &str = "password should have more than 7 characters";

/// Checks the username/password rules that do not need the store, in order.
/// Lengths are counted in characters.
pub fn check_credentials_format(username: &str, password: &str) -> Result<(), AppError> {
    if username.chars().count() <= 3 {
        return Err(AppError::ValidationFailed(USERNAME_TOO_SHORT.into()));
    }
    if username.chars().all(char::is_numeric) {
        return Err(AppError::ValidationFailed(USERNAME_ALL_DIGITS.into()));
    }
    if password.chars().count() <= 7 {
        return Err(AppError::ValidationFailed(PASSWORD_TOO_SHORT.into()));
    }
    Ok(())
}

/// Registers a new account.
///
/// The duplicate check runs first, then the format rules; the first failing
/// rule is reported. The store's own uniqueness guarantee catches a duplicate
/// that slips in between the check and the insert.
pub async fn register(store: &dyn Store, input: UserInput, cost: u32) -> Result<User, AppError> {
    if store.find_user_by_username(&input.username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }
    check_credentials_format(&input.username, &input.password)?;

    let UserInput { username, password } = input;
    let hashed_password = hash_password_async(password, cost).await?;
    store
        .insert_user(NewUser {
            username,
            hashed_password,
        })
        .await
}
