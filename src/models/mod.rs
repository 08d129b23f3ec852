//! Rows of the labor management schema and the `Entity` seam the
//! mutation coordinator is generic over.

mod expense;
mod task;
mod time_entry;
mod worker;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::cache::QueryKey;

pub use expense::*;
pub use task::*;
pub use time_entry::*;
pub use worker::*;

/// A persisted row type
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// The editable fields: the row minus id, owner and timestamps
    type Draft: Serialize + Clone + fmt::Debug + Send + Sync + 'static;

    /// Table name in the store
    const TABLE: &'static str;

    /// Human name used in notifications, e.g. "Time entry"
    const NAME: &'static str;

    /// Whether rows carry a `user_id` that is filled from the session on insert
    const OWNED: bool;

    fn id(&self) -> Uuid;

    /// This row with the draft's fields written over it, as a full-row update sends it
    fn with_draft(&self, draft: Self::Draft) -> Self;

    /// Key of the collection holding this entity
    fn collection_key() -> QueryKey {
        QueryKey::root(Self::TABLE)
    }

    /// Keys invalidated after a successful mutation
    fn invalidation_keys() -> Vec<QueryKey> {
        vec![Self::collection_key()]
    }

    /// Question shown before a delete is issued
    fn delete_prompt() -> String {
        format!(
            "Are you sure you want to delete this {}?",
            Self::NAME.to_lowercase()
        )
    }
}
