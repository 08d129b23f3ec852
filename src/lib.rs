//! Workforce client library
//!
//! Data access for a small labor management backend hosted on Supabase:
//! workers, tasks, time entries and expenses. Reads are cached per query key;
//! every write goes through [`Mutations`], which invalidates the affected keys
//! once the backend acknowledges it and reports the outcome as a toast.
//!
//! ```no_run
//! use workforce::prelude::*;
//!
//! # async fn run() -> workforce::error::Result<()> {
//! let app = Workforce::from_env()?;
//! app.auth().sign_in_with_password("owner@example.com", "secret").await?;
//!
//! let workers = app.queries().workers().await?;
//! println!("{} workers", workers.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forms;
pub mod models;
pub mod mutation;
pub mod notify;
pub mod postgrest;
pub mod queries;
pub mod store;

use std::sync::Arc;

use reqwest::Client;

use crate::auth::Auth;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::Entity;
use crate::mutation::Mutations;
use crate::notify::{LogNotifier, Notifier};
use crate::queries::Queries;
use crate::store::{PostgrestStore, RemoteStore};

/// The main entry point, sharing one session, store, cache and notifier
/// between every query and mutation handle it gives out.
#[derive(Clone)]
pub struct Workforce {
    config: Config,
    auth: Auth,
    store: Arc<dyn RemoteStore>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl Workforce {
    /// Create a client talking to the project in `config`
    ///
    /// # Example
    ///
    /// ```
    /// use workforce::{config::Config, Workforce};
    ///
    /// let config = Config::new("https://your-project-url.supabase.co", "your-anon-key").unwrap();
    /// let app = Workforce::new(config).unwrap();
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let cache = Arc::new(QueryCache::new());
        let auth = Auth::new(
            &config.base_url(),
            &config.anon_key,
            http_client.clone(),
            config.options.clone(),
        )
        .with_cache(cache.clone());
        let store = PostgrestStore::new(&config, http_client, auth.clone());

        Ok(Self {
            config,
            auth,
            store: Arc::new(store),
            cache,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Create a client from `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Send toasts somewhere other than the log
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a reference to the auth client for signing in and out
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Create, update and delete rows of `E`
    ///
    /// ```
    /// use workforce::{config::Config, models::Worker, Workforce};
    ///
    /// let app = Workforce::new(Config::new("http://localhost:54321", "anon").unwrap()).unwrap();
    /// let workers = app.mutations::<Worker>();
    /// ```
    pub fn mutations<E: Entity>(&self) -> Mutations<E> {
        Mutations::new(
            self.store.clone(),
            self.cache.clone(),
            self.notifier.clone(),
            self.auth.clone(),
        )
    }

    /// Cached reads
    pub fn queries(&self) -> Queries {
        Queries::new(self.store.clone(), self.cache.clone(), self.auth.clone())
    }
}

pub mod prelude {
    pub use crate::cache::{QueryCache, QueryKey};
    pub use crate::config::{ClientOptions, Config};
    pub use crate::error::Error;
    pub use crate::forms::{
        EntityForm, ExpenseFormValues, FormStatus, FormValues, TaskFormValues,
        TimeEntryFormValues, WorkerFormValues,
    };
    pub use crate::models::{
        Entity, Expense, Task, TaskPriority, TaskStatus, TaskSummary, TimeEntry, Worker,
        WorkerStatus,
    };
    pub use crate::mutation::{Confirm, Mutations};
    pub use crate::notify::{Notifier, Toast, ToastQueue};
    pub use crate::Workforce;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastQueue;
    use std::time::Duration;

    #[test]
    fn handles_share_one_cache() {
        let config = Config::new("http://localhost:54321", "anon").unwrap();
        let app = Workforce::new(config).unwrap();

        let key = crate::cache::QueryKey::root("workers");
        app.cache().put(key.clone(), vec![1u8]);
        let clone = app.clone();
        assert_eq!(clone.cache().get::<Vec<u8>>(&key), Some(vec![1u8]));
    }

    #[test]
    fn timeout_option_is_accepted() {
        let config = Config::new("http://localhost:54321", "anon")
            .unwrap()
            .with_options(
                crate::config::ClientOptions::default()
                    .with_request_timeout(Some(Duration::from_secs(5))),
            );
        let app = Workforce::new(config)
            .unwrap()
            .with_notifier(Arc::new(ToastQueue::new()));
        assert_eq!(
            app.config().options.request_timeout,
            Some(Duration::from_secs(5))
        );
    }
}
