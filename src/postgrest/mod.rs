//! Database operations through the PostgREST API

mod filter;
mod query;
mod types;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;

use crate::error::Error;

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for database operations on one table
#[derive(Clone)]
pub struct PostgrestClient {
    /// The base URL for the Supabase project
    url: String,

    /// The table or view name
    table: String,

    /// HTTP client
    client: Client,

    /// Headers sent with every request
    headers: HeaderMap,

    /// Non-default schema, sent as Accept-Profile/Content-Profile
    schema: Option<String>,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub fn new(url: &str, key: &str, table: &str, client: Client) -> Self {
        let mut this = Self {
            url: url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            client,
            headers: HeaderMap::new(),
            schema: None,
        };
        this.set_header("apikey", key);
        this
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
    }

    /// Add a header, failing on an invalid name or value
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, Error> {
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| Error::general(format!("Invalid header value for {}", key)))?;
        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::general(format!("Invalid header name: {}", key)))?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Set the bearer token
    pub fn with_auth(self, token: &str) -> Result<Self, Error> {
        self.with_header("Authorization", &format!("Bearer {}", token))
    }

    /// Use a schema other than `public`
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = (schema != "public").then(|| schema.to_string());
        self
    }

    /// Set the `X-Client-Info` header
    pub fn with_client_info(mut self, info: &str) -> Self {
        self.set_header("X-Client-Info", info);
        self
    }

    fn get_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    fn read_headers(&self) -> HeaderMap {
        self.headers_with_profile("Accept-Profile")
    }

    fn write_headers(&self) -> HeaderMap {
        self.headers_with_profile("Content-Profile")
    }

    fn headers_with_profile(&self, profile_header: &'static str) -> HeaderMap {
        let mut headers = self.headers.clone();
        if let Some(schema) = &self.schema {
            if let Ok(value) = HeaderValue::from_str(schema) {
                headers.insert(profile_header, value);
            }
        }
        headers
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(
            self.get_url(),
            self.read_headers(),
            columns,
            self.client.clone(),
        )
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(
            self.get_url(),
            self.write_headers(),
            values,
            self.client.clone(),
        )
    }

    /// Update data in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(
            self.get_url(),
            self.write_headers(),
            values,
            self.client.clone(),
        )
    }

    /// Delete data from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.get_url(), self.write_headers(), self.client.clone())
    }

    /// Call a stored procedure or function
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder<T> {
        let url = format!("{}/rest/v1/rpc/{}", self.url, function);
        RpcBuilder::new(url, self.write_headers(), params, self.client.clone())
    }
}
