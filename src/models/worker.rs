use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Active => "active",
            WorkerStatus::Inactive => "inactive",
            WorkerStatus::OnLeave => "on_leave",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

/// Corresponds to the `workers` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub hourly_rate: f64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub status: WorkerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable worker fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerDraft {
    pub name: String,
    pub phone: Option<String>,
    pub hourly_rate: f64,
    pub skills: Vec<String>,
    pub status: WorkerStatus,
}

impl Worker {
    pub fn draft(&self) -> WorkerDraft {
        WorkerDraft {
            name: self.name.clone(),
            phone: self.phone.clone(),
            hourly_rate: self.hourly_rate,
            skills: self.skills.clone(),
            status: self.status,
        }
    }
}

impl Entity for Worker {
    type Draft = WorkerDraft;

    const TABLE: &'static str = "workers";
    const NAME: &'static str = "Worker";
    const OWNED: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }

    fn with_draft(&self, draft: WorkerDraft) -> Self {
        Self {
            name: draft.name,
            phone: draft.phone,
            hourly_rate: draft.hourly_rate,
            skills: draft.skills,
            status: draft.status,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_row_with_defaults() {
        let row = json!({
            "id": "6f1c1f43-3a0b-4b9e-9c55-8c0f0c6a1d10",
            "user_id": "0b0f2c1e-9a55-4d6b-8d0e-4f3b2f0e7a11",
            "name": "Alice",
            "phone": null,
            "hourly_rate": 25.0,
            "created_at": "2024-03-01T09:30:00.123456+00:00",
            "updated_at": "2024-03-01T09:30:00+00:00"
        });

        let worker: Worker = serde_json::from_value(row).unwrap();
        assert_eq!(worker.name, "Alice");
        assert!(worker.skills.is_empty());
        assert_eq!(worker.status, WorkerStatus::Active);
    }

    #[test]
    fn status_wire_and_label() {
        assert_eq!(
            serde_json::to_value(WorkerStatus::OnLeave).unwrap(),
            json!("on_leave")
        );
        assert_eq!(WorkerStatus::OnLeave.to_string(), "on leave");
    }

    #[test]
    fn delete_prompt_names_the_entity() {
        assert_eq!(
            Worker::delete_prompt(),
            "Are you sure you want to delete this worker?"
        );
    }
}
