//! Row filters for PostgrestClient

use super::query::QueryBuilder;

/// A single `column=eq.value` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    /// Equality predicate
    pub fn eq(column: &str, value: impl ToString) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    /// The query parameter value, e.g. `eq.active`
    pub fn to_param(&self) -> String {
        format!("eq.{}", self.value)
    }
}

/// Builders that accept row filters
pub trait Filterable: Sized {
    #[doc(hidden)]
    fn query_mut(&mut self) -> &mut QueryBuilder;

    /// Add a prepared filter
    fn filter(mut self, filter: &Filter) -> Self {
        self.query_mut().add_param(&filter.column, &filter.to_param());
        self
    }

    /// Filter rows where column equals a value
    fn eq<V: ToString>(self, column: &str, value: V) -> Self {
        self.filter(&Filter::eq(column, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_params() {
        assert_eq!(Filter::eq("status", "active").to_param(), "eq.active");
        assert_eq!(Filter::eq("hourly_rate", 20).to_param(), "eq.20");
    }
}
