//! Query builders for PostgrestClient

use reqwest::{header::HeaderMap, Client};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::postgrest::filter::Filterable;
use crate::postgrest::types::{ReturnOption, SortOrder};

/// Ordered query parameters
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, replacing an earlier one with the same key
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    url: String,
    headers: HeaderMap,
    client: Client,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(url: String, headers: HeaderMap, columns: &str, client: Client) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);

        Self {
            url,
            headers,
            client,
            query,
        }
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        self.query
            .add_param("order", &format!("{}.{}", column, order.as_str()));
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        Fetch::get(&self.client, &self.url)
            .headers(&self.headers)
            .query(self.query.get_params())
            .execute::<Vec<T>>()
            .await
    }
}

impl Filterable for SelectBuilder {
    fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    url: String,
    headers: HeaderMap,
    values: T,
    client: Client,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(url: String, headers: HeaderMap, values: T, client: Client) -> Self {
        Self {
            url,
            headers,
            values,
            client,
        }
    }

    /// Execute the insert; the inserted rows come back as a JSON array
    pub async fn execute(&self) -> Result<Value, Error> {
        Fetch::post(&self.client, &self.url)
            .headers(&self.headers)
            .header("Prefer", ReturnOption::Representation.as_prefer())
            .json(&self.values)?
            .execute_value()
            .await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    url: String,
    headers: HeaderMap,
    values: T,
    client: Client,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(url: String, headers: HeaderMap, values: T, client: Client) -> Self {
        Self {
            url,
            headers,
            values,
            client,
            query: QueryBuilder::new(),
        }
    }

    /// Execute the update
    pub async fn execute(&self) -> Result<Value, Error> {
        if self.query.get_params().is_empty() {
            return Err(Error::database("update requires at least one filter"));
        }

        Fetch::patch(&self.client, &self.url)
            .headers(&self.headers)
            .header("Prefer", ReturnOption::Representation.as_prefer())
            .query(self.query.get_params())
            .json(&self.values)?
            .execute_value()
            .await
    }
}

impl<T: Serialize> Filterable for UpdateBuilder<T> {
    fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    url: String,
    headers: HeaderMap,
    client: Client,
    query: QueryBuilder,
}

impl DeleteBuilder {
    pub(crate) fn new(url: String, headers: HeaderMap, client: Client) -> Self {
        Self {
            url,
            headers,
            client,
            query: QueryBuilder::new(),
        }
    }

    /// Execute the delete without returning the deleted rows
    pub async fn execute(&self) -> Result<(), Error> {
        if self.query.get_params().is_empty() {
            return Err(Error::database("delete requires at least one filter"));
        }

        Fetch::delete(&self.client, &self.url)
            .headers(&self.headers)
            .header("Prefer", ReturnOption::Minimal.as_prefer())
            .query(self.query.get_params())
            .execute_value()
            .await?;
        Ok(())
    }
}

impl Filterable for DeleteBuilder {
    fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }
}

/// Builder for RPC (stored procedure) calls
pub struct RpcBuilder<T: Serialize> {
    url: String,
    headers: HeaderMap,
    params: T,
    client: Client,
}

impl<T: Serialize> RpcBuilder<T> {
    pub(crate) fn new(url: String, headers: HeaderMap, params: T, client: Client) -> Self {
        Self {
            url,
            headers,
            params,
            client,
        }
    }

    /// Execute the RPC call and return the result
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        Fetch::post(&self.client, &self.url)
            .headers(&self.headers)
            .json(&self.params)?
            .execute::<R>()
            .await
    }
}
