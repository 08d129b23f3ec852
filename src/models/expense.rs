use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, Task};
use crate::cache::QueryKey;

/// Corresponds to the `expenses` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub task_id: Uuid,
    pub worker_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub task_id: Uuid,
    pub worker_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
}

impl Expense {
    pub fn draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            task_id: self.task_id,
            worker_id: self.worker_id,
            amount: self.amount,
            description: self.description.clone(),
            date: self.date,
        }
    }
}

impl Entity for Expense {
    type Draft = ExpenseDraft;

    const TABLE: &'static str = "expenses";
    const NAME: &'static str = "Expense";
    const OWNED: bool = false;

    fn id(&self) -> Uuid {
        self.id
    }

    fn with_draft(&self, draft: ExpenseDraft) -> Self {
        Self {
            task_id: draft.task_id,
            worker_id: draft.worker_id,
            amount: draft.amount,
            description: draft.description,
            date: draft.date,
            ..self.clone()
        }
    }

    fn invalidation_keys() -> Vec<QueryKey> {
        vec![Self::collection_key(), Task::collection_key()]
    }
}
