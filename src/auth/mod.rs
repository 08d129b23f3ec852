//! Session handling against Supabase Auth

mod session;
mod types;

use std::sync::{Arc, RwLock};

use reqwest::Client;
use tracing::info;
use uuid::Uuid;

use crate::cache::QueryCache;
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Client for Supabase Authentication
#[derive(Clone)]
pub struct Auth {
    url: String,
    key: String,
    client: Client,
    session: Arc<RwLock<Option<Session>>>,
    options: ClientOptions,
    cache: Option<Arc<QueryCache>>,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(RwLock::new(None)),
            options,
            cache: None,
        }
    }

    /// Clear `cache` whenever the signed-in user changes
    pub(crate) fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Sign in a user with email and password and keep the session
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.get_auth_url("/token?grant_type=password");

        let response = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.options.client_info)
            .json(&SignInCredentials { email, password })?
            .execute::<TokenResponse>()
            .await
            .map_err(|e| match e {
                Error::Api { details, .. } => Error::auth(
                    details
                        .message
                        .unwrap_or_else(|| "Invalid login credentials".to_string()),
                ),
                other => other,
            })?;

        let session = Session::from(response);
        info!(user_id = %session.user_id, "signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Use a session obtained elsewhere, e.g. from a stored access token.
    ///
    /// Switching to a different user, or signing out, drops every cached read.
    pub fn set_session(&self, session: Option<Session>) {
        let user_changed = {
            let mut guard = match self.session.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let previous = guard.as_ref().map(|s| s.user_id);
            let next = session.as_ref().map(|s| s.user_id);
            *guard = session;
            previous != next
        };

        if user_changed {
            if let Some(cache) = &self.cache {
                cache.clear();
            }
        }
    }

    /// Forget the local session
    pub fn sign_out(&self) {
        self.set_session(None);
    }

    /// The current session, if any
    pub fn get_session(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The current session, failing when signed out or expired
    pub fn require_session(&self) -> Result<Session> {
        match self.get_session() {
            Some(session) if session.is_expired() => Err(Error::auth("Session expired")),
            Some(session) => Ok(session),
            None => Err(Error::auth("Not logged in")),
        }
    }

    /// The signed-in user's id
    pub fn user_id(&self) -> Result<Uuid> {
        self.require_session().map(|s| s.user_id)
    }
}
