//! HS256 bearer tokens
//!
//! Tokens are minted by the identity service sharing `JWT_SECRET`; this crate
//! only verifies them. [`issue_token`] exists for operators and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use postpilot_core::AppError;
use uuid::Uuid;

use crate::auth::models::JwtClaims;

#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

/// Sign a token for `user_id` valid for `ttl`.
pub fn issue_token(secret: &str, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issued_token_verifies() {
        let user = Uuid::new_v4();
        let token = issue_token(SECRET, user, Duration::hours(1)).unwrap();
        let claims = JwtService::new(SECRET).verify(&token).unwrap();
        assert_eq!(claims.sub, user);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), Duration::hours(1)).unwrap();
        let err = JwtService::new("other-secret").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), Duration::hours(-2)).unwrap();
        assert!(JwtService::new(SECRET).verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(JwtService::new(SECRET).verify("not.a.jwt").is_err());
    }
}
