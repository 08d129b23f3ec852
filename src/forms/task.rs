use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{optional_text, FormValues, ValidationErrors};
use crate::models::{Task, TaskDraft, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFormValues {
    pub title: String,
    pub description: String,
    pub worker_id: Option<Uuid>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl FormValues for TaskFormValues {
    type Entity = Task;

    fn from_entity(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            worker_id: task.worker_id,
            status: task.status,
            priority: task.priority,
            estimated_hours: task
                .estimated_hours
                .map(|h| h.to_string())
                .unwrap_or_default(),
            start_date: task.start_date,
            end_date: task.end_date,
        }
    }

    fn validate(&self) -> Result<TaskDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = self.title.trim();
        if title.chars().count() < 2 {
            errors.add("title", "Title must be at least 2 characters");
        }

        let estimated_hours = match self.estimated_hours.trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(hours) if hours.is_finite() => Some(hours),
                _ => {
                    errors.add("estimated_hours", "Must be a number");
                    None
                }
            },
        };

        errors.into_result(TaskDraft {
            title: title.to_string(),
            description: optional_text(&self.description),
            worker_id: self.worker_id,
            status: self.status,
            priority: self.priority,
            estimated_hours,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_pending_and_medium() {
        let values = TaskFormValues {
            title: "Fix roof".into(),
            ..Default::default()
        };
        let draft = values.validate().unwrap();
        assert_eq!(draft.status, TaskStatus::Pending);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.estimated_hours, None);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn estimated_hours_must_be_numeric() {
        let values = TaskFormValues {
            title: "Fix roof".into(),
            estimated_hours: "a few".into(),
            ..Default::default()
        };
        let errors = values.validate().unwrap_err();
        assert_eq!(errors.get("estimated_hours"), Some("Must be a number"));
        assert_eq!(errors.get("title"), None);
    }
}
