use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Email of the user at issuance time.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies JWTs with a signing secret fixed at startup.
///
/// Constructed once from `Config` and injected into the application as shared
/// state, so no request handler ever reads the secret from the environment.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a fresh token for the given user. Every call produces a new
    /// token with its own issued-at and expiry; prior tokens are never
    /// reused or extended.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token and decodes its claims. The signature is checked
    /// before any embedded claim is trusted.
    ///
    /// Returns `AppError::Unauthorized` for expired, malformed, or
    /// wrongly-signed tokens. The expired case is distinguished internally
    /// but both surface as 401 to the client.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".into()),
                _ => AppError::Unauthorized("Invalid token".into()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> TokenManager {
        TokenManager::new("test_secret_for_token_tests", 24)
    }

    #[test]
    fn test_token_issue_and_verify() {
        let manager = test_manager();
        let user_id = Uuid::new_v4();

        let token = manager.issue(user_id, "test@example.com").unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_every_login_gets_a_fresh_expiry() {
        let manager = test_manager();
        let user_id = Uuid::new_v4();

        let first = manager.issue(user_id, "test@example.com").unwrap();
        let second = manager.issue(user_id, "test@example.com").unwrap();

        let first_claims = manager.verify(&first).unwrap();
        let second_claims = manager.verify(&second).unwrap();
        assert!(second_claims.iat >= first_claims.iat);
        assert!(second_claims.exp >= first_claims.exp);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = test_manager();
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
        };
        // Signed with the same secret, so only the expiry can fail.
        let expired_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_for_token_tests".as_bytes()),
        )
        .unwrap();

        match manager.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token expired"),
            Ok(_) => panic!("Token should have been rejected as expired"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let manager = test_manager();
        let other_manager = TokenManager::new("a_completely_different_secret", 24);

        let token = other_manager
            .issue(Uuid::new_v4(), "test@example.com")
            .unwrap();

        match manager.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid token"),
            Ok(_) => panic!("Token should have been rejected: signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let manager = test_manager();
        assert!(matches!(
            manager.verify("not.a.token"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            manager.verify(""),
            Err(AppError::Unauthorized(_))
        ));
    }
}
