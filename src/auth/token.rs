use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Signing algorithm for every token this service issues and accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the username it was issued to.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// Issues and validates signed, time-limited bearer tokens.
///
/// Holds the signing keys derived from the configured secret. Built once at
/// startup and shared read-only between workers.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }

    /// Generates a token for `subject` that expires after `ttl`, or after the
    /// configured default when `ttl` is `None`.
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token string and returns its subject claim.
    ///
    /// Fails with `AppError::TokenInvalid` when the signature does not match,
    /// the payload is malformed, a required claim is missing, the subject is
    /// empty, or the expiry has passed.
    pub fn validate(&self, token: &str) -> Result<String, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::TokenInvalid(format!("{:?}", e.kind())))?;

        if claims.sub.is_empty() {
            return Err(AppError::TokenInvalid("empty subject".into()));
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret.as_bytes(), Duration::minutes(30))
    }

    fn token_invalid_reason(result: Result<String, AppError>) -> String {
        match result {
            Err(AppError::TokenInvalid(reason)) => reason,
            Ok(sub) => panic!("Token should have been rejected, got subject {}", sub),
            Err(e) => panic!("Unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service("test_secret_for_gen_verify");
        let token = tokens.issue("alice", None).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "alice");

        let token = tokens.issue("bob", Some(Duration::seconds(5))).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "bob");
    }

    #[test]
    fn test_default_ttl_is_applied() {
        let tokens = service("test_secret_for_ttl");
        let token = tokens.issue("alice", None).unwrap();

        let data = decode::<Claims>(&token, &tokens.decoding_key, &tokens.validation).unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 30 * 60);
        assert_eq!(data.header.alg, TOKEN_ALGORITHM);
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service("test_secret_for_expiration");
        let now = Utc::now().timestamp();
        let expired = tokens
            .sign(&Claims {
                sub: "alice".into(),
                exp: now - 1,
                iat: now - 60,
            })
            .unwrap();

        assert_eq!(token_invalid_reason(tokens.validate(&expired)), "ExpiredSignature");
    }

    #[test]
    fn test_short_lived_token_expires() {
        let tokens = service("test_secret_for_short_ttl");
        let token = tokens.issue("alice", Some(Duration::seconds(1))).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), "alice");

        std::thread::sleep(std::time::Duration::from_millis(2100));

        assert_eq!(token_invalid_reason(tokens.validate(&token)), "ExpiredSignature");
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = service("the_real_secret");
        let verifier = service("a_completely_different_secret");
        let token = issuer.issue("alice", None).unwrap();

        assert_eq!(token_invalid_reason(verifier.validate(&token)), "InvalidSignature");
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let tokens = service("test_secret_for_tamper");
        let token = tokens.issue("alice", None).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[signature_start] = if bytes[signature_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        token_invalid_reason(tokens.validate(&tampered));
    }

    #[test]
    fn test_malformed_and_incomplete_tokens() {
        let tokens = service("test_secret_for_malformed");

        token_invalid_reason(tokens.validate(""));
        token_invalid_reason(tokens.validate("not.a.token"));
        token_invalid_reason(tokens.validate("eyJhbGciOiJIUzI1NiJ9"));

        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
        }
        let exp = Utc::now().timestamp() + 600;
        let without_sub = encode(
            &Header::new(TOKEN_ALGORITHM),
            &NoSubject { exp },
            &tokens.encoding_key,
        )
        .unwrap();
        token_invalid_reason(tokens.validate(&without_sub));

        let empty_sub = tokens
            .sign(&Claims {
                sub: String::new(),
                exp,
                iat: exp - 600,
            })
            .unwrap();
        assert_eq!(token_invalid_reason(tokens.validate(&empty_sub)), "empty subject");
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let tokens = service("test_secret_for_alg");
        let exp = Utc::now().timestamp() + 600;
        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &Claims {
                sub: "alice".into(),
                exp,
                iat: exp - 600,
            },
            &EncodingKey::from_secret(b"test_secret_for_alg"),
        )
        .unwrap();

        token_invalid_reason(tokens.validate(&hs512));
    }
}
