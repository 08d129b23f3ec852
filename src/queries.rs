//! Cached collection reads backing the Workers and Tasks views

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Auth;
use crate::cache::{QueryCache, QueryKey};
use crate::error::{Error, Result};
use crate::models::{Entity, Expense, Task, TaskSummary, TimeEntry, Worker, WorkerStatus};
use crate::postgrest::SortOrder;
use crate::store::{ListQuery, RemoteStore};

/// Database function returning a task's total cost
pub const CALCULATE_TASK_COST: &str = "calculate_task_cost";

#[derive(Clone)]
pub struct Queries {
    store: Arc<dyn RemoteStore>,
    cache: Arc<QueryCache>,
    auth: Auth,
}

impl Queries {
    pub(crate) fn new(store: Arc<dyn RemoteStore>, cache: Arc<QueryCache>, auth: Auth) -> Self {
        Self { store, cache, auth }
    }

    /// Rows of `E` matching `query`, served from `key` while it is fresh
    pub async fn list<E: Entity>(&self, key: &QueryKey, query: ListQuery) -> Result<Vec<E>> {
        let store = &self.store;
        let query = &query;
        self.cache
            .fetch(key, || async move {
                let rows = store.select(E::TABLE, query).await?;
                rows.into_iter()
                    .map(|row| serde_json::from_value::<E>(row).map_err(Error::from))
                    .collect::<Result<Vec<E>>>()
            })
            .await
    }

    /// All workers by name
    pub async fn workers(&self) -> Result<Vec<Worker>> {
        self.list(
            &Worker::collection_key(),
            ListQuery::new().order("name", SortOrder::Ascending),
        )
        .await
    }

    /// Workers available for assignment
    pub async fn active_workers(&self) -> Result<Vec<Worker>> {
        self.list(
            &Worker::collection_key().child(WorkerStatus::Active.as_str()),
            ListQuery::new()
                .eq("status", WorkerStatus::Active.as_str())
                .order("name", SortOrder::Ascending),
        )
        .await
    }

    /// The signed-in user's tasks, newest first, cached under `["tasks", user_id]`
    pub async fn tasks(&self) -> Result<Vec<Task>> {
        let user_id = self.auth.user_id()?;
        self.list(
            &Task::collection_key().child(user_id),
            ListQuery::new()
                .eq("user_id", user_id)
                .order("created_at", SortOrder::Descending),
        )
        .await
    }

    pub async fn time_entries(&self, task_id: Uuid) -> Result<Vec<TimeEntry>> {
        self.list(
            &TimeEntry::collection_key().child(task_id),
            ListQuery::new()
                .eq("task_id", task_id)
                .order("start_time", SortOrder::Descending),
        )
        .await
    }

    pub async fn expenses(&self, task_id: Uuid) -> Result<Vec<Expense>> {
        self.list(
            &Expense::collection_key().child(task_id),
            ListQuery::new()
                .eq("task_id", task_id)
                .order("date", SortOrder::Descending),
        )
        .await
    }

    /// A task with its total hours and cost.
    ///
    /// Hours are summed from the task's time entries; cost comes from the
    /// `calculate_task_cost` database function. The summary lives under the
    /// task key, so any task, time entry or expense mutation refreshes it.
    pub async fn task_summary(&self, task: &Task) -> Result<TaskSummary> {
        let key = Task::collection_key().child(task.id).child("summary");
        let store = &self.store;
        let task_id = task.id;
        let (total_hours, total_cost) = self
            .cache
            .fetch(&key, || async move {
                let entries = store
                    .select(TimeEntry::TABLE, &ListQuery::new().eq("task_id", task_id))
                    .await?;
                let total_hours = entries
                    .iter()
                    .filter_map(|row| row.get("hours_worked").and_then(Value::as_f64))
                    .sum::<f64>();

                let cost = store
                    .rpc(CALCULATE_TASK_COST, json!({ "task_uuid": task_id }))
                    .await?;
                // null when nothing has been logged against the task yet
                let total_cost = match &cost {
                    Value::Null => 0.0,
                    value => value.as_f64().ok_or_else(|| {
                        Error::database(format!(
                            "{} returned a non-numeric cost: {}",
                            CALCULATE_TASK_COST, value
                        ))
                    })?,
                };

                Ok((total_hours, total_cost))
            })
            .await?;

        Ok(TaskSummary {
            task: task.clone(),
            total_hours,
            total_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::config::{ClientOptions, Config};
    use crate::store::PostgrestStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn queries(server: &MockServer) -> (Queries, Arc<QueryCache>) {
        let config = Config::new(&server.uri(), "anon-key").unwrap();
        let client = reqwest::Client::new();
        let cache = Arc::new(QueryCache::new());
        let auth = Auth::new(
            &config.base_url(),
            &config.anon_key,
            client.clone(),
            ClientOptions::default(),
        )
        .with_cache(cache.clone());
        let store = Arc::new(PostgrestStore::new(&config, client, auth.clone()));
        (Queries::new(store, cache.clone(), auth), cache)
    }

    fn worker_row(name: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "name": name,
            "phone": null,
            "hourly_rate": 25.0,
            "skills": ["painting"],
            "status": "active",
            "created_at": "2024-05-01T08:00:00Z",
            "updated_at": "2024-05-01T08:00:00Z"
        })
    }

    fn task(id: Uuid) -> Task {
        serde_json::from_value(json!({
            "id": id,
            "user_id": Uuid::new_v4(),
            "worker_id": null,
            "title": "Paint fence",
            "description": null,
            "status": "pending",
            "priority": "medium",
            "estimated_hours": 4.0,
            "actual_hours": null,
            "start_date": null,
            "end_date": null,
            "created_at": "2024-05-01T08:00:00Z",
            "updated_at": "2024-05-01T08:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn workers_are_served_from_cache_while_fresh() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/workers"))
            .and(query_param("order", "name.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([worker_row("Alice")])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (queries, _) = queries(&mock_server);
        let first = queries.workers().await.unwrap();
        let second = queries.workers().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Alice");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn invalidated_workers_are_fetched_again() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/workers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&mock_server)
            .await;

        let (queries, cache) = queries(&mock_server);
        queries.workers().await.unwrap();
        cache.invalidate(&Worker::collection_key());
        queries.workers().await.unwrap();
    }

    #[tokio::test]
    async fn active_workers_filter_on_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/workers"))
            .and(query_param("status", "eq.active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([worker_row("Bob")])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (queries, cache) = queries(&mock_server);
        let active = queries.active_workers().await.unwrap();
        assert_eq!(active[0].name, "Bob");
        assert!(!cache.is_stale(&QueryKey::new(["workers", "active"])));
    }

    #[tokio::test]
    async fn tasks_need_a_session() {
        let mock_server = MockServer::start().await;
        let (queries, _) = queries(&mock_server);

        let err = queries.tasks().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tasks_are_scoped_to_the_signed_in_user() {
        let mock_server = MockServer::start().await;
        let (queries, _) = queries(&mock_server);
        let user_id = Uuid::new_v4();
        queries.auth.set_session(Some(Session::new(
            "token".into(),
            None,
            user_id,
            Some(3600),
        )));

        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("user_id", format!("eq.{}", user_id)))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(queries.tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn task_summary_totals_hours_and_cost() {
        let mock_server = MockServer::start().await;
        let task_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/time_entries"))
            .and(query_param("task_id", format!("eq.{}", task_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "hours_worked": 1.5 },
                { "hours_worked": 2.0 },
                { "hours_worked": null }
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/calculate_task_cost"))
            .and(body_json(json!({ "task_uuid": task_id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(87.5)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (queries, _) = queries(&mock_server);
        let summary = queries.task_summary(&task(task_id)).await.unwrap();

        assert_eq!(summary.task.id, task_id);
        assert_eq!(summary.total_hours, 3.5);
        assert_eq!(summary.total_cost, 87.5);
    }

    #[tokio::test]
    async fn failed_read_is_not_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/workers"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "code": "XX000",
                "message": "internal error",
                "details": null,
                "hint": null
            })))
            .mount(&mock_server)
            .await;

        let (queries, cache) = queries(&mock_server);
        assert!(queries.workers().await.is_err());
        assert!(cache.is_stale(&Worker::collection_key()));
    }

    #[tokio::test]
    async fn non_numeric_cost_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/time_entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/calculate_task_cost"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cost": "n/a" })))
            .mount(&mock_server)
            .await;

        let (queries, cache) = queries(&mock_server);
        let task_id = Uuid::new_v4();
        let err = queries.task_summary(&task(task_id)).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert!(cache.is_stale(&Task::collection_key().child(task_id).child("summary")));
    }

    #[tokio::test]
    async fn switching_users_drops_cached_tasks() {
        let mock_server = MockServer::start().await;
        let (queries, cache) = queries(&mock_server);
        let first_user = Uuid::new_v4();
        let second_user = Uuid::new_v4();
        let mut first_task = task(Uuid::new_v4());
        first_task.user_id = first_user;

        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("user_id", format!("eq.{}", first_user)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([first_task])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/tasks"))
            .and(query_param("user_id", format!("eq.{}", second_user)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sign_in = |user_id| {
            queries.auth.set_session(Some(Session::new(
                "token".into(),
                None,
                user_id,
                Some(3600),
            )))
        };

        sign_in(first_user);
        let tasks = queries.tasks().await.unwrap();
        assert_eq!(tasks[0].user_id, first_user);

        queries.auth.sign_out();
        assert!(cache.peek::<Vec<Task>>(&Task::collection_key().child(first_user)).is_none());

        sign_in(second_user);
        assert!(queries.tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refreshing_the_same_session_keeps_cache() {
        let mock_server = MockServer::start().await;
        let (queries, cache) = queries(&mock_server);
        let user_id = Uuid::new_v4();
        let key = Worker::collection_key();
        cache.put(key.clone(), Vec::<Worker>::new());

        for token in ["first", "refreshed"] {
            queries.auth.set_session(Some(Session::new(
                token.into(),
                None,
                user_id,
                Some(3600),
            )));
        }
        // signing in from signed-out is a user change, the refresh is not
        assert!(cache.peek::<Vec<Worker>>(&key).is_none());

        cache.put(key.clone(), Vec::<Worker>::new());
        queries.auth.set_session(Some(Session::new(
            "again".into(),
            None,
            user_id,
            Some(3600),
        )));
        assert!(cache.peek::<Vec<Worker>>(&key).is_some());
    }
}
