use crate::Value;
use std::sync::Arc;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
    /// Move the value of `name` out of the row, leaving a NULL in its place.
    pub fn take_column(&mut self, name: &str) -> Option<Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| std::mem::take(&mut self.values[i]))
    }
}

/// Heterogeneous items emitted by `Executor::run` combining rows and modify results.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A labeled row.
    Row(RowLabeled),
    /// A modify effect aggregation.
    Affected(RowsAffected),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

impl From<RowLabeled> for QueryResult {
    fn from(value: RowLabeled) -> Self {
        QueryResult::Row(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_affected() {
        let mut total = RowsAffected::default();
        total.extend([
            RowsAffected {
                rows_affected: 2,
                last_affected_id: Some(4),
            },
            RowsAffected {
                rows_affected: 1,
                last_affected_id: None,
            },
        ]);
        assert_eq!(total.rows_affected, 3);
        assert_eq!(total.last_affected_id, Some(4));
    }

    #[test]
    fn row_columns() {
        let mut row = RowLabeled::new(
            ["Id".to_string(), "Name".to_string()].into(),
            [Value::Int64(Some(1)), Value::Varchar(Some("Alice".into()))].into(),
        );
        assert_eq!(row.get_column("Id"), Some(&Value::Int64(Some(1))));
        assert_eq!(row.get_column("id"), None);
        assert_eq!(
            row.take_column("Name"),
            Some(Value::Varchar(Some("Alice".into())))
        );
        assert_eq!(row.get_column("Name"), Some(&Value::Null));
    }
}
