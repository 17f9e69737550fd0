use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::entities::user;
use crate::error::AppError;

/// Payload of the access tokens handed out on login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String, // Internal user id
    pub email: String,
    pub role: String,
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 access tokens with a shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &user::Model) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            uid: user.uid.clone(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: "user-1".into(),
            uid: "uid-1".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "investor".into(),
            profile: serde_json::json!({}),
            is_email_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = TokenIssuer::new("secret", Duration::from_secs(60));
        let token = issuer.issue(&account()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "investor");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let token = TokenIssuer::new("secret", Duration::from_secs(60))
            .issue(&account())
            .unwrap();
        let err = TokenIssuer::new("other", Duration::from_secs(60))
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn rejects_expired_token() {
        let issuer = TokenIssuer::new("secret", Duration::from_secs(60));
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&Claims {
                sub: "user-1".into(),
                email: "ada@example.com".into(),
                role: "user".into(),
                uid: "uid-1".into(),
                iat: now - 120,
                exp: now - 60,
            })
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::Unauthorized(_))));
    }
}
