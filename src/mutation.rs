//! Entity mutation coordinator
//!
//! Every create, update and delete goes through [`Mutations`], which issues a
//! single store call and then, only once the store has acknowledged it,
//! invalidates the entity's cache keys. Either way the outcome is reported as a
//! toast. Nothing is retried and nothing is applied optimistically: a failed
//! call leaves the cache exactly as it was.
//!
//! The store call and its settlement run on a spawned task, so a mutation that
//! has started always finishes even when the caller stops waiting for it.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Auth;
use crate::cache::QueryCache;
use crate::error::{Error, Result};
use crate::forms::{EntityForm, FormValues, SubmitGuard, Submission};
use crate::models::Entity;
use crate::notify::{Notifier, Toast};
use crate::store::RemoteStore;

/// Asks the user before a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Action::Create => "created",
            Action::Update => "updated",
            Action::Delete => "deleted",
        }
    }
}

/// Create/update/delete for one entity type
pub struct Mutations<E: Entity> {
    store: Arc<dyn RemoteStore>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    auth: Auth,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Mutations<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            notifier: self.notifier.clone(),
            auth: self.auth.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Mutations<E> {
    pub(crate) fn new(
        store: Arc<dyn RemoteStore>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
        auth: Auth,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
            auth,
            _entity: PhantomData,
        }
    }

    /// Insert a new row built from `draft`
    pub async fn create(&self, draft: E::Draft) -> Result<E> {
        let this = self.clone();
        self.run_to_completion(Action::Create, async move { this.insert_row(draft).await })
            .await
    }

    /// Full-row update keyed by the entity's id
    pub async fn update(&self, entity: &E) -> Result<E> {
        let this = self.clone();
        let entity = entity.clone();
        self.run_to_completion(Action::Update, async move { this.update_row(&entity).await })
            .await
    }

    /// Delete the row with `id` once `confirm` agrees.
    ///
    /// Returns `Ok(false)` without contacting the store when the user declines.
    pub async fn delete<C>(&self, id: Uuid, confirm: &C) -> Result<bool>
    where
        C: Confirm + ?Sized,
    {
        if !confirm.confirm(&E::delete_prompt()) {
            info!(table = E::TABLE, %id, "delete declined");
            return Ok(false);
        }

        let store = self.store.clone();
        self.run_to_completion(Action::Delete, async move { store.delete(E::TABLE, id).await })
            .await
            .map(|()| true)
    }

    /// Validate a form and create or update depending on what it edits.
    ///
    /// Validation failures stay on the form and raise no toast. On success the
    /// form closes; on failure it stays open with its values intact. If this
    /// future is dropped mid-flight the form goes back to idle and the
    /// mutation still completes in the background.
    pub async fn submit<V>(&self, form: &mut EntityForm<V>) -> Result<E>
    where
        V: FormValues<Entity = E>,
    {
        let submission = form.begin_submit()?;
        let guard = SubmitGuard::new(form);
        let result = match submission {
            Submission::Create(draft) => self.create(draft).await,
            Submission::Update(entity) => self.update(&entity).await,
        };
        guard.finish(result.is_ok());
        result
    }

    /// Run `call` and settle its outcome on a task of its own
    async fn run_to_completion<T, F>(&self, action: Action, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            let result = call.await;
            this.settle(action, result)
        })
        .await
        .map_err(|e| Error::general(format!("{} task failed: {}", action.verb(), e)))?
    }

    async fn insert_row(&self, draft: E::Draft) -> Result<E> {
        let mut row = serde_json::to_value(draft)?;
        if E::OWNED {
            let owner = self.auth.user_id()?;
            if let Value::Object(fields) = &mut row {
                fields.insert("user_id".to_string(), Value::String(owner.to_string()));
            }
        }
        let stored = self.store.insert(E::TABLE, row).await?;
        Ok(serde_json::from_value(stored)?)
    }

    async fn update_row(&self, entity: &E) -> Result<E> {
        let row = serde_json::to_value(entity)?;
        let stored = self.store.update(E::TABLE, entity.id(), row).await?;
        Ok(serde_json::from_value(stored)?)
    }

    fn settle<T>(&self, action: Action, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {
                for key in E::invalidation_keys() {
                    self.cache.invalidate(&key);
                }
                info!(table = E::TABLE, action = action.verb(), "mutation succeeded");
                self.notifier.notify(Toast::success(format!(
                    "{} {} successfully",
                    E::NAME,
                    action.past()
                )));
            }
            Err(err) => {
                warn!(table = E::TABLE, action = action.verb(), error = %err, "mutation failed");
                let description = err.user_message().unwrap_or_else(|| {
                    format!("Failed to {} {}", action.verb(), E::NAME.to_lowercase())
                });
                self.notifier.notify(Toast::error(description));
            }
        }
        result
    }
}

impl<E: Entity> std::fmt::Debug for Mutations<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutations").field("table", &E::TABLE).finish()
    }
}
