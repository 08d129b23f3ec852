use chrono::Utc;
use uuid::Uuid;

use super::{optional_text, positive_number, FormValues, ValidationErrors};
use crate::models::{TimeEntry, TimeEntryDraft};

/// Hours logged against a task by one worker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeEntryFormValues {
    pub task_id: Uuid,
    pub worker_id: Uuid,
    pub hours_worked: String,
    pub notes: String,
}

impl TimeEntryFormValues {
    pub fn for_task(task_id: Uuid, worker_id: Uuid) -> Self {
        Self {
            task_id,
            worker_id,
            ..Default::default()
        }
    }
}

impl FormValues for TimeEntryFormValues {
    type Entity = TimeEntry;

    fn from_entity(entry: &TimeEntry) -> Self {
        Self {
            task_id: entry.task_id,
            worker_id: entry.worker_id,
            hours_worked: entry
                .hours_worked
                .map(|h| h.to_string())
                .unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }

    /// Start and end are both stamped with the submission time.
    fn validate(&self) -> Result<TimeEntryDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let hours_worked = positive_number(&self.hours_worked);
        if hours_worked.is_none() {
            errors.add("hours_worked", "Hours must be a positive number");
        }

        let now = Utc::now();
        errors.into_result(TimeEntryDraft {
            task_id: self.task_id,
            worker_id: self.worker_id,
            start_time: now,
            end_time: Some(now),
            hours_worked,
            notes: optional_text(&self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_now_and_keeps_context() {
        let task_id = Uuid::new_v4();
        let worker_id = Uuid::new_v4();
        let mut values = TimeEntryFormValues::for_task(task_id, worker_id);
        values.hours_worked = "1.5".into();

        let draft = values.validate().unwrap();
        assert_eq!(draft.task_id, task_id);
        assert_eq!(draft.worker_id, worker_id);
        assert_eq!(draft.hours_worked, Some(1.5));
        assert_eq!(draft.end_time, Some(draft.start_time));
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn hours_must_be_positive() {
        let mut values = TimeEntryFormValues::for_task(Uuid::new_v4(), Uuid::new_v4());
        values.hours_worked = "0".into();
        assert!(values.validate().is_err());
    }
}
