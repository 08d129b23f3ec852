//! Configuration for the workforce client

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Value sent in the `X-Client-Info` header unless overridden
pub const DEFAULT_CLIENT_INFO: &str = concat!("workforce-rs/", env!("CARGO_PKG_VERSION"));

/// Connection settings for a Supabase project.
/// It's recommended to load these values from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: Url,
    pub anon_key: String,
    pub options: ClientOptions,
}

impl Config {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            options: ClientOptions::default(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;
        Self::new(&url, &anon_key)
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// The project URL without a trailing slash, ready for path joins
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

/// Configuration options for the client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// Sent as `X-Client-Info`
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            db_schema: "public".to_string(),
            client_info: DEFAULT_CLIENT_INFO.to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the client info header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_valid() {
        let config = Config::new("http://localhost:54321", "dummy-anon-key").unwrap();

        // Url::parse adds a trailing slash when the path is empty
        assert_eq!(config.url.as_str(), "http://localhost:54321/");
        assert_eq!(config.base_url(), "http://localhost:54321");
        assert_eq!(config.anon_key, "dummy-anon-key");
        assert_eq!(config.options.db_schema, "public");
        assert!(config.options.request_timeout.is_none());
    }

    #[test]
    fn config_new_invalid_url() {
        match Config::new("not a valid url", "some_anon_key") {
            Err(Error::Url(_)) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
    }

    #[test]
    fn config_new_empty_key() {
        match Config::new("http://localhost:54321", "") {
            Err(Error::Config(msg)) => assert!(msg.contains("anon_key cannot be empty")),
            other => panic!("Expected Config error for empty key, got {:?}", other),
        }
    }

    #[test]
    fn options_builder() {
        let options = ClientOptions::default()
            .with_db_schema("labor")
            .with_request_timeout(Some(Duration::from_secs(5)))
            .with_client_info("tests/1.0");

        assert_eq!(options.db_schema, "labor");
        assert_eq!(options.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.client_info, "tests/1.0");
    }
}
