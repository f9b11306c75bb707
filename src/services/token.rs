use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Admin tokens are valid for one day.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdminClaims {
    pub id: i32,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, admin_id: i32, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AdminClaims {
            id: admin_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Checks signature and expiry and returns the decoded claims.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, TokenError> {
        decode::<AdminClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
