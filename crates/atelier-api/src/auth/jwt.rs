//! HS256 session tokens
//!
//! Tokens are issued elsewhere (the web frontend's session flow); this
//! service only needs to validate them. `issue` exists for tooling and tests.

use atelier_core::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::models::{JwtClaims, UserRole};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate signature and expiry. Only HS256 is accepted.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    _ => AppError::Unauthorized("Invalid or expired token".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    #[test]
    fn test_issue_then_validate() {
        let service = JwtService::new(SECRET, 1);
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id, UserRole::Member).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "member");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtService::new(SECRET, 1)
            .issue(Uuid::new_v4(), UserRole::Admin)
            .unwrap();
        let other = JwtService::new("another-secret-that-is-also-32-chars-long", 1);
        assert!(matches!(
            other.validate(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new(SECRET, -1);
        let token = service.issue(Uuid::new_v4(), UserRole::Member).unwrap();
        match service.validate(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("expected expiry error, got {:?}", other),
        }
    }
}
