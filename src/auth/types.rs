//! Wire types for the auth endpoints

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::Session;

/// Password grant request body
#[derive(Debug, Serialize)]
pub struct SignInCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// User data returned with a token
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Response of `POST /auth/v1/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub user: User,
}

impl From<TokenResponse> for Session {
    fn from(response: TokenResponse) -> Self {
        let mut session = Session::new(
            response.access_token,
            response.refresh_token,
            response.user.id,
            response.expires_in,
        );
        session.email = response.user.email;
        session
    }
}
