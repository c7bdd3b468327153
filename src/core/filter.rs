use super::{Record, Value};

/// Row predicate used by select, update and delete.
///
/// A row matches only when `matches` returns `true`. Any closure taking a
/// `&Record` and returning `bool` is a filter.
pub trait RowFilter {
    fn matches(&self, row: &Record) -> bool;

    /// Columns this filter reads. The store rejects the call when one of them
    /// is not part of the table schema. Closures report nothing.
    fn referenced_columns(&self) -> Vec<&str> {
        Vec::new()
    }
}

impl<F> RowFilter for F
where
    F: Fn(&Record) -> bool,
{
    fn matches(&self, row: &Record) -> bool {
        self(row)
    }
}

/// Matches rows whose `column` holds exactly `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEquals {
    column: String,
    value: Value,
}

impl ColumnEquals {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl RowFilter for ColumnEquals {
    fn matches(&self, row: &Record) -> bool {
        row.get(&self.column) == Some(&self.value)
    }

    fn referenced_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }
}

/// Conjunction of filters. An empty set matches every row.
#[derive(Default)]
pub struct AllOf {
    filters: Vec<Box<dyn RowFilter>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl RowFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: impl RowFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl RowFilter for AllOf {
    fn matches(&self, row: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches(row))
    }

    fn referenced_columns(&self) -> Vec<&str> {
        self.filters
            .iter()
            .flat_map(|filter| filter.referenced_columns())
            .collect()
    }
}
