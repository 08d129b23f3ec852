use chrono::NaiveDate;
use uuid::Uuid;

use super::{positive_number, FormValues, ValidationErrors};
use crate::models::{Expense, ExpenseDraft};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFormValues {
    pub task_id: Uuid,
    pub worker_id: Uuid,
    pub amount: String,
    pub description: String,
    pub date: Option<NaiveDate>,
}

impl ExpenseFormValues {
    pub fn for_task(task_id: Uuid, worker_id: Uuid) -> Self {
        Self {
            task_id,
            worker_id,
            ..Default::default()
        }
    }
}

impl FormValues for ExpenseFormValues {
    type Entity = Expense;

    fn from_entity(expense: &Expense) -> Self {
        Self {
            task_id: expense.task_id,
            worker_id: expense.worker_id,
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
            date: Some(expense.date),
        }
    }

    fn validate(&self) -> Result<ExpenseDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let amount = positive_number(&self.amount);
        if amount.is_none() {
            errors.add("amount", "Amount must be a positive number");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required");
        }

        if self.date.is_none() {
            errors.add("date", "Date is required");
        }

        match (amount, self.date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(ExpenseDraft {
                task_id: self.task_id,
                worker_id: self.worker_id,
                amount,
                description: description.to_string(),
                date,
            }),
            _ => Err(errors),
        }
    }
}
