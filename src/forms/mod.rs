//! Typed form values and the per-form submission lifecycle
//!
//! A form holds the raw field values a user is editing. Values are checked by
//! [`FormValues::validate`] before anything reaches the mutation coordinator;
//! failures stay on the form as per-field messages.

mod expense;
mod task;
mod time_entry;
mod worker;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::models::Entity;

pub use expense::*;
pub use task::*;
pub use time_entry::*;
pub use worker::*;

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` when no message was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Raw values of an entity form
pub trait FormValues: Clone + Default + Send {
    type Entity: Entity;

    /// Values pre-populated from an existing row
    fn from_entity(entity: &Self::Entity) -> Self;

    /// Check every field and build the draft sent to the store
    fn validate(&self) -> Result<<Self::Entity as Entity>::Draft, ValidationErrors>;
}

/// Blank text becomes `None`
pub(crate) fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a strictly positive number
pub(crate) fn positive_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
}

/// What a validated form asks the coordinator to do
#[derive(Debug, Clone)]
pub enum Submission<E: Entity> {
    Create(E::Draft),
    Update(E),
}

/// An open create or edit form for one entity type
#[derive(Debug, Clone)]
pub struct EntityForm<V: FormValues> {
    pub values: V,
    editing: Option<V::Entity>,
    open: bool,
    status: FormStatus,
    errors: ValidationErrors,
}

impl<V: FormValues> EntityForm<V> {
    /// A form for a new row, starting from `values`
    pub fn create(values: V) -> Self {
        Self {
            values,
            editing: None,
            open: true,
            status: FormStatus::Idle,
            errors: ValidationErrors::default(),
        }
    }

    /// A form pre-populated from an existing row
    pub fn edit(entity: V::Entity) -> Self {
        Self {
            values: V::from_entity(&entity),
            editing: Some(entity),
            open: true,
            status: FormStatus::Idle,
            errors: ValidationErrors::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        self.open && self.status == FormStatus::Idle
    }

    /// Messages from the last failed validation
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Close without submitting; discards the entered values
    pub fn close(&mut self) {
        self.open = false;
        self.editing = None;
        self.values = V::default();
        self.errors = ValidationErrors::default();
    }

    /// Validate and move to `Submitting`.
    ///
    /// Fails with [`Error::Busy`] while a submission is in flight and with
    /// [`Error::Validation`] when a field is invalid; neither changes the
    /// entered values.
    pub(crate) fn begin_submit(&mut self) -> Result<Submission<V::Entity>, Error> {
        if self.status == FormStatus::Submitting {
            return Err(Error::Busy);
        }
        if !self.open {
            return Err(Error::general("Form is closed"));
        }

        let draft = match self.values.validate() {
            Ok(draft) => draft,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(Error::Validation(errors));
            }
        };

        self.errors = ValidationErrors::default();
        self.status = FormStatus::Submitting;
        Ok(match &self.editing {
            Some(entity) => Submission::Update(entity.with_draft(draft)),
            None => Submission::Create(draft),
        })
    }

    /// Return to `Idle`; closes the form on success and keeps it as it is otherwise
    pub(crate) fn finish_submit(&mut self, succeeded: bool) {
        self.status = FormStatus::Idle;
        if succeeded {
            self.close();
        }
    }
}

/// Holds a form in `Submitting` and returns it to `Idle` when dropped, so a
/// submission that is abandoned part way never leaves the form busy
pub(crate) struct SubmitGuard<'a, V: FormValues> {
    form: &'a mut EntityForm<V>,
    succeeded: bool,
}

impl<'a, V: FormValues> SubmitGuard<'a, V> {
    pub(crate) fn new(form: &'a mut EntityForm<V>) -> Self {
        Self {
            form,
            succeeded: false,
        }
    }

    /// Record the outcome; the form closes on success
    pub(crate) fn finish(mut self, succeeded: bool) {
        self.succeeded = succeeded;
    }
}

impl<V: FormValues> Drop for SubmitGuard<'_, V> {
    fn drop(&mut self) {
        self.form.finish_submit(self.succeeded);
    }
}
