//! Stateless session tokens (HS256 JWT).
//!
//! Validity is decided by the signature alone; the session registry is not
//! consulted. Tokens carry no `exp` claim unless a TTL is configured.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // client id
    pub iat: i64,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Creates and verifies session tokens with a symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: None,
        }
    }

    /// Adds an `exp` claim `ttl` after issuance and enforces it on verify.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn sign(&self, subject: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            exp: self.ttl.map(|ttl| now + ttl.as_secs() as i64),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Returns the subject of a valid token, `None` for anything else.
    pub fn verify(&self, token: &str) -> Option<String> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    pub fn decode_claims(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation()) {
            Ok(data) if !data.claims.sub.is_empty() => Some(data.claims),
            Ok(_) => None,
            Err(e) => {
                debug!("token rejected: {}", e);
                None
            }
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        if self.ttl.is_some() {
            validation.set_required_spec_claims(&["sub", "exp"]);
            validation.validate_exp = true;
            validation.leeway = 0;
        } else {
            validation.set_required_spec_claims(&["sub"]);
            validation.validate_exp = false;
        }
        validation
    }
}
