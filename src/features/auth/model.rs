use serde::{Deserialize, Serialize};

/// Claims carried by tokens issued from `/generateToken`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// Caller identity established by the bearer gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub sub: String,
    pub token_id: String,
}

impl From<Claims> for AuthenticatedSubject {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            token_id: claims.jti,
        }
    }
}
