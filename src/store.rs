//! The single data-access seam between the coordinator and the hosted backend

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::Auth;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::postgrest::{Filter, Filterable, PostgrestClient, SortOrder};

/// Equality filters plus an optional ordering column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order: Option<(String, SortOrder)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        self.order = Some((column.to_string(), order));
        self
    }
}

/// Request/response access to named collections
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Rows matching `query`
    async fn select(&self, table: &str, query: &ListQuery) -> Result<Vec<Value>>;

    /// Insert one row and return it as stored
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Replace the row with `id` and return it as stored
    async fn update(&self, table: &str, id: Uuid, row: Value) -> Result<Value>;

    /// Delete the row with `id`
    async fn delete(&self, table: &str, id: Uuid) -> Result<()>;

    /// Call a database function
    async fn rpc(&self, function: &str, params: Value) -> Result<Value>;
}

/// [`RemoteStore`] over the PostgREST HTTP API
#[derive(Clone)]
pub struct PostgrestStore {
    url: String,
    key: String,
    client: Client,
    auth: Auth,
    schema: String,
    client_info: String,
}

impl PostgrestStore {
    pub fn new(config: &Config, client: Client, auth: Auth) -> Self {
        Self {
            url: config.base_url(),
            key: config.anon_key.clone(),
            client,
            auth,
            schema: config.options.db_schema.clone(),
            client_info: config.options.client_info.clone(),
        }
    }

    /// Client for `table`, authorized as the signed-in user or anonymously
    pub fn from(&self, table: &str) -> Result<PostgrestClient> {
        let token = self
            .auth
            .get_session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.key.clone());

        PostgrestClient::new(&self.url, &self.key, table, self.client.clone())
            .with_schema(&self.schema)
            .with_client_info(&self.client_info)
            .with_auth(&token)
    }
}

/// The single row a write returned, from a representation array
fn single_row(value: Value, table: &str, action: &str) -> Result<Value> {
    match value {
        Value::Array(rows) => rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::database(format!("No {} row returned after {}", table, action))),
        Value::Null => Err(Error::database(format!(
            "No {} row returned after {}",
            table, action
        ))),
        row => Ok(row),
    }
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn select(&self, table: &str, query: &ListQuery) -> Result<Vec<Value>> {
        let mut builder = self.from(table)?.select("*");
        for filter in &query.filters {
            builder = builder.filter(filter);
        }
        if let Some((column, order)) = &query.order {
            builder = builder.order(column, *order);
        }
        builder.execute::<Value>().await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let inserted = self.from(table)?.insert(vec![row]).execute().await?;
        single_row(inserted, table, "insert")
    }

    async fn update(&self, table: &str, id: Uuid, row: Value) -> Result<Value> {
        let updated = self
            .from(table)?
            .update(row)
            .eq("id", id)
            .execute()
            .await?;
        single_row(updated, table, "update")
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<()> {
        self.from(table)?.delete().eq("id", id).execute().await
    }

    async fn rpc(&self, function: &str, params: Value) -> Result<Value> {
        self.from(function)?
            .rpc(function, params)
            .execute::<Value>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::config::ClientOptions;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> PostgrestStore {
        let config = Config::new(&server.uri(), "anon-key").unwrap();
        let client = Client::new();
        let auth = Auth::new(
            &config.base_url(),
            &config.anon_key,
            client.clone(),
            ClientOptions::default(),
        );
        PostgrestStore::new(&config, client, auth)
    }

    #[tokio::test]
    async fn anonymous_requests_use_anon_key_as_bearer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/workers"))
            .and(header("Authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let rows = store(&mock_server)
            .select("workers", &ListQuery::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn signed_in_requests_use_session_token() {
        let mock_server = MockServer::start().await;
        let store = store(&mock_server);
        store.auth.set_session(Some(Session::new(
            "user-token".into(),
            None,
            Uuid::new_v4(),
            Some(3600),
        )));

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/workers"))
            .and(query_param("id", "eq.00000000-0000-0000-0000-000000000001"))
            .and(header("Authorization", "Bearer user-token"))
            .and(header("Prefer", "return=minimal"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        store.delete("workers", id).await.unwrap();
    }

    #[tokio::test]
    async fn update_matching_nothing_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let err = store(&mock_server)
            .update("tasks", Uuid::new_v4(), json!({ "status": "completed" }))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[tokio::test]
    async fn rpc_posts_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/calculate_task_cost"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(137.5)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cost = store(&mock_server)
            .rpc("calculate_task_cost", json!({ "task_uuid": Uuid::new_v4() }))
            .await
            .unwrap();
        assert_eq!(cost, json!(137.5));
    }
}
