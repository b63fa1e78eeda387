use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedSubject, Claims};

/// Issues and verifies HS256 bearer tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    leeway: u64,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, leeway: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            leeway: leeway.as_secs(),
        }
    }

    /// Issue a token for `subject` that expires after `ttl`
    pub fn generate_token(&self, subject: &str, ttl: Duration) -> Result<String> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(AppError::Authorization(
                "Cannot issue a token for a blank subject".to_string(),
            ));
        }

        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl.as_secs(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        tracing::info!("Token issued: sub={}, jti={}", claims.sub, claims.jti);
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedSubject> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = self.leeway;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}
