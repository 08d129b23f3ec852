use super::{optional_text, positive_number, FormValues, ValidationErrors};
use crate::models::{Worker, WorkerDraft, WorkerStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerFormValues {
    pub name: String,
    pub phone: String,
    pub hourly_rate: String,
    pub status: WorkerStatus,
    pub skills: Vec<String>,
    /// Text of the skill input, moved into `skills` by [`add_skill`](Self::add_skill)
    pub skill: String,
}

impl WorkerFormValues {
    /// Move the pending skill into the list. Blank or duplicate skills are ignored.
    pub fn add_skill(&mut self) -> bool {
        let skill = self.skill.trim().to_string();
        if skill.is_empty() || self.skills.contains(&skill) {
            return false;
        }
        self.skills.push(skill);
        self.skill.clear();
        true
    }

    pub fn remove_skill(&mut self, skill: &str) {
        self.skills.retain(|s| s != skill);
    }
}

impl FormValues for WorkerFormValues {
    type Entity = Worker;

    fn from_entity(worker: &Worker) -> Self {
        Self {
            name: worker.name.clone(),
            phone: worker.phone.clone().unwrap_or_default(),
            hourly_rate: worker.hourly_rate.to_string(),
            status: worker.status,
            skills: worker.skills.clone(),
            skill: String::new(),
        }
    }

    fn validate(&self) -> Result<WorkerDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.chars().count() < 2 {
            errors.add("name", "Name must be at least 2 characters");
        }

        let hourly_rate = positive_number(&self.hourly_rate);
        if hourly_rate.is_none() {
            errors.add("hourly_rate", "Hourly rate must be a positive number");
        }

        errors.into_result(WorkerDraft {
            name: name.to_string(),
            phone: optional_text(&self.phone),
            hourly_rate: hourly_rate.unwrap_or_default(),
            skills: self.skills.clone(),
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_values_build_draft() {
        let values = WorkerFormValues {
            name: " Alice ".into(),
            phone: "  ".into(),
            hourly_rate: "25.00".into(),
            ..Default::default()
        };

        let draft = values.validate().unwrap();
        assert_eq!(draft.name, "Alice");
        assert_eq!(draft.phone, None);
        assert_eq!(draft.hourly_rate, 25.0);
        assert_eq!(draft.status, WorkerStatus::Active);
    }

    #[test]
    fn skills_are_deduplicated() {
        let mut values = WorkerFormValues::default();
        values.skill = "Carpentry".into();
        assert!(values.add_skill());
        values.skill = "Carpentry".into();
        assert!(!values.add_skill());
        values.skill = " ".into();
        assert!(!values.add_skill());
        values.skill = "Plumbing".into();
        assert!(values.add_skill());

        assert_eq!(values.skills, vec!["Carpentry", "Plumbing"]);
        values.remove_skill("Carpentry");
        assert_eq!(values.skills, vec!["Plumbing"]);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let values = WorkerFormValues {
            name: "Bob".into(),
            hourly_rate: "0".into(),
            ..Default::default()
        };
        let errors = values.validate().unwrap_err();
        assert_eq!(
            errors.get("hourly_rate"),
            Some("Hourly rate must be a positive number")
        );
    }
}
