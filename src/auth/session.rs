//! Session data for the signed-in user

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token, sent as the bearer token
    pub access_token: String,

    /// The refresh token, absent when restored from a bare access token
    pub refresh_token: Option<String>,

    /// The user owning every row this session writes
    pub user_id: Uuid,

    /// The user's email, when known
    pub email: Option<String>,

    /// Expiry as a unix timestamp
    pub expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    exp: Option<i64>,
    email: Option<String>,
}

impl Session {
    /// Create a new session expiring `expires_in` seconds from now
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        user_id: Uuid,
        expires_in: Option<i64>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            user_id,
            email: None,
            expires_at: expires_in.map(|secs| Utc::now().timestamp() + secs),
        }
    }

    /// Restore a session from an access token issued by Supabase Auth.
    ///
    /// The signature is not verified: the store verifies it on every request,
    /// this side only needs the `sub` and `exp` claims.
    pub fn from_access_token(token: &str) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|e| Error::auth(format!("Invalid subject claim: {}", e)))?;

        Ok(Self {
            access_token: token.to_string(),
            refresh_token: None,
            user_id,
            email: data.claims.email,
            expires_at: data.claims.exp,
        })
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| Utc::now().timestamp() >= expires_at)
            .unwrap_or(false)
    }
}
