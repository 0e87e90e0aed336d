use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

/// Lowest work factor bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Hashes `password` with a fresh random salt. The salt and cost are embedded
/// in the returned string, so two calls with the same input never match.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt hash.
///
/// The comparison inside bcrypt is constant-time. A stored value that is not a
/// well-formed bcrypt hash is treated as a mismatch rather than an error.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// Runs `hash_password` on the blocking thread pool so the async worker is
/// free to serve other requests while bcrypt runs.
pub async fn hash_password_async(password: String, cost: u32) -> Result<String, AppError> {
    web::block(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password hashing was cancelled: {}", e)))?
}

/// Runs `verify_password` on the blocking thread pool.
pub async fn verify_password_async(password: String, hashed_password: String) -> Result<bool, AppError> {
    web::block(move || verify_password(&password, &hashed_password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password check was cancelled: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password, MIN_BCRYPT_COST).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("longenoughpw", MIN_BCRYPT_COST).unwrap();
        let second = hash_password("longenoughpw", MIN_BCRYPT_COST).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("longenoughpw", &first));
        assert!(verify_password("longenoughpw", &second));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        assert!(!verify_password("test_password123", "invalidhashformat"));
        assert!(!verify_password("test_password123", ""));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(matches!(
            hash_password("test_password123", MAX_BCRYPT_COST + 1),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[actix_rt::test]
    async fn test_blocking_pool_variants() {
        let hashed = hash_password_async("longenoughpw".into(), MIN_BCRYPT_COST)
            .await
            .unwrap();

        assert!(verify_password_async("longenoughpw".into(), hashed.clone())
            .await
            .unwrap());
        assert!(!verify_password_async("wrongpassword".into(), hashed)
            .await
            .unwrap());
        assert!(matches!(
            hash_password_async("longenoughpw".into(), MAX_BCRYPT_COST + 1).await,
            Err(AppError::InternalServerError(_))
        ));
    }
}
