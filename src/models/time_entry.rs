use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, Task};
use crate::cache::QueryKey;

/// Corresponds to the `time_entries` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub task_id: Uuid,
    pub worker_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryDraft {
    pub task_id: Uuid,
    pub worker_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub hours_worked: Option<f64>,
    pub notes: Option<String>,
}

impl TimeEntry {
    pub fn draft(&self) -> TimeEntryDraft {
        TimeEntryDraft {
            task_id: self.task_id,
            worker_id: self.worker_id,
            start_time: self.start_time,
            end_time: self.end_time,
            hours_worked: self.hours_worked,
            notes: self.notes.clone(),
        }
    }
}

impl Entity for TimeEntry {
    type Draft = TimeEntryDraft;

    const TABLE: &'static str = "time_entries";
    const NAME: &'static str = "Time entry";
    const OWNED: bool = false;

    fn id(&self) -> Uuid {
        self.id
    }

    fn with_draft(&self, draft: TimeEntryDraft) -> Self {
        Self {
            task_id: draft.task_id,
            worker_id: draft.worker_id,
            start_time: draft.start_time,
            end_time: draft.end_time,
            hours_worked: draft.hours_worked,
            notes: draft.notes,
            ..self.clone()
        }
    }

    // Task totals are derived from time entries.
    fn invalidation_keys() -> Vec<QueryKey> {
        vec![Self::collection_key(), Task::collection_key()]
    }
}
